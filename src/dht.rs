//! Multi-pin DHT controller: wake sequence, pulse capture, readout cache.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::decode::{self, DecodeEvent};
use crate::error::DhtError;
use crate::platform::{Gpio, Monotonic, PriorityHint};
use crate::reading::{Reading, SensorKind};

/// Upper bound on line pulses recorded per capture.
pub const MAX_PULSES: usize = 100;

/// Pulse train recorded during one capture window, one high-phase duration
/// (in poll iterations) per entry.
pub type PulseTrain = heapless::Vec<u32, MAX_PULSES>;

/// Capture timing parameters.
///
/// The busy-wait bounds are poll-iteration counts, not wall time: reading a
/// clock inside the poll loop would distort the very widths being measured.
/// Their real-time value therefore depends on CPU speed. The defaults suit a
/// Raspberry-Pi-class core, where `pulse_timeout` comfortably exceeds the
/// longest legal pulse; scale them when porting to slower or faster hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Minimum interval between physical reads of one pin. Reads inside the
    /// window return the cached value. The sensors need about 2 s between
    /// conversions; going below that yields stale or corrupt frames.
    pub min_read_interval_ms: u64,
    /// Poll bound while waiting for each half of the sensor acknowledgement.
    pub response_timeout: u32,
    /// Poll bound for each half of a data pulse. Hitting it ends the frame.
    pub pulse_timeout: u32,
    /// How long the line is held high before the start pulse, in
    /// milliseconds. Doubles as the sensor power-up window.
    pub wake_high_ms: u32,
    /// Settle time after the scheduling hint is raised, in milliseconds.
    pub settle_ms: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_read_interval_ms: 2000,
            response_timeout: 100_000,
            pulse_timeout: 50_000,
            wake_high_ms: 10,
            settle_ms: 1,
        }
    }
}

/// Per-pin readout state.
#[derive(Clone, Copy, Debug, Default)]
struct PinRecord {
    /// When the last physical read was attempted. `None` until the first
    /// attempt, so a fresh controller never rate-limits, even on clocks
    /// that start near zero.
    last_attempt_ms: Option<u64>,
    reading: Reading,
}

/// Driver context for up to `PINS` sensors sharing one platform adapter.
///
/// Construction doubles as platform initialization: a live `Dht` value is
/// the proof that [`Gpio::init`] succeeded, so no separate "initialized"
/// flag exists for callers to forget to check. Building a second controller
/// starts over with zeroed readout caches.
///
/// Reads take `&mut self`; sharing a controller across threads requires
/// external mutual exclusion, which also serializes access to the single
/// elevated-priority window.
pub struct Dht<G, D, C, P, const PINS: usize = 32> {
    gpio: G,
    delay: D,
    clock: C,
    priority: P,
    config: CaptureConfig,
    pins: [PinRecord; PINS],
}

impl<G, D, C, P, E, const PINS: usize> Dht<G, D, C, P, PINS>
where
    G: Gpio<Error = E>,
    D: DelayNs,
    C: Monotonic,
    P: PriorityHint,
{
    /// Performs the one-time platform setup and returns a controller with
    /// all readout caches zeroed.
    pub fn initialize(gpio: G, delay: D, clock: C, priority: P) -> Result<Self, DhtError<E>> {
        Self::with_config(gpio, delay, clock, priority, CaptureConfig::default())
    }

    /// Like [`initialize`](Self::initialize) with explicit timing parameters.
    pub fn with_config(
        mut gpio: G,
        delay: D,
        clock: C,
        priority: P,
        config: CaptureConfig,
    ) -> Result<Self, DhtError<E>> {
        gpio.init()?;
        Ok(Self {
            gpio,
            delay,
            clock,
            priority,
            config,
            pins: [PinRecord::default(); PINS],
        })
    }

    /// Reads temperature and humidity from the sensor on `pin`.
    ///
    /// Within [`CaptureConfig::min_read_interval_ms`] of the previous
    /// attempt on the same pin, the cached reading is returned without
    /// touching the hardware. Otherwise the sensor is woken, its pulse
    /// train captured under the raised scheduling hint, and the decoded
    /// reading stored and returned.
    ///
    /// # Errors
    ///
    /// [`Timeout`](DhtError::Timeout) and the frame errors are transient:
    /// electrical noise or a missed edge. Retry after the minimum interval;
    /// the cached reading is left intact.
    /// [`PinOutOfRange`](DhtError::PinOutOfRange) means `pin >= PINS` and
    /// will never succeed.
    pub fn read(&mut self, kind: SensorKind, pin: u8) -> Result<Reading, DhtError<E>> {
        self.read_traced(kind, pin, &mut |_| {})
    }

    /// Reads like [`read`](Self::read), reporting decode checkpoints to
    /// `trace`.
    pub fn read_traced(
        &mut self,
        kind: SensorKind,
        pin: u8,
        trace: &mut impl FnMut(DecodeEvent),
    ) -> Result<Reading, DhtError<E>> {
        let slot = usize::from(pin);
        if slot >= PINS {
            return Err(DhtError::PinOutOfRange);
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.pins[slot].last_attempt_ms
            && now.saturating_sub(last) < self.config.min_read_interval_ms
        {
            return Ok(self.pins[slot].reading);
        }
        // Failed attempts also re-arm the limiter: the sensor needs the
        // full interval to recover from an aborted transfer.
        self.pins[slot].last_attempt_ms = Some(now);

        let pulses = self.capture(kind, pin)?;
        let frame = decode::decode_frame_traced(&pulses, trace).map_err(DhtError::from_decode)?;
        let reading = Reading::from_frame(kind, frame);
        self.pins[slot].reading = reading;
        Ok(reading)
    }

    /// Last cached reading for `pin`, or `None` when the pin is out of
    /// range. Zeroed until the pin's first successful read.
    pub fn last_reading(&self, pin: u8) -> Option<Reading> {
        self.pins.get(usize::from(pin)).map(|record| record.reading)
    }

    /// Consumes the controller and hands the platform adapter parts back.
    pub fn release(self) -> (G, D, C, P) {
        (self.gpio, self.delay, self.clock, self.priority)
    }

    /// Wakes the sensor on `pin` and records its pulse train.
    ///
    /// The scheduling hint is held for the whole window and dropped on
    /// every exit path, timeouts included.
    fn capture(&mut self, kind: SensorKind, pin: u8) -> Result<PulseTrain, DhtError<E>> {
        let Self {
            gpio,
            delay,
            priority,
            config,
            ..
        } = self;
        let _window = PriorityWindow::raise(priority);
        delay.delay_ms(config.settle_ms);

        // Wake sequence: hold the line high through the power-up window,
        // drive the variant's start pulse, then hand the line to the sensor.
        gpio.set_output(pin)?;
        gpio.write(pin, PinState::High)?;
        delay.delay_ms(config.wake_high_ms);
        gpio.write(pin, PinState::Low)?;
        delay.delay_us(kind.start_pulse_us());
        gpio.write(pin, PinState::High)?;
        gpio.set_input(pin)?;

        // The sensor acknowledges by pulling the line low, then high.
        wait_while(gpio, pin, PinState::Low, config.response_timeout)?.ok_or(DhtError::Timeout)?;
        wait_while(gpio, pin, PinState::High, config.response_timeout)?.ok_or(DhtError::Timeout)?;

        // One pulse per iteration: the low phase is pacing, the high phase
        // width is the symbol. A bound hit on either half is the bus going
        // back to idle.
        let mut pulses = PulseTrain::new();
        while !pulses.is_full() {
            if wait_while(gpio, pin, PinState::Low, config.pulse_timeout)?.is_none() {
                break;
            }
            match wait_while(gpio, pin, PinState::High, config.pulse_timeout)? {
                Some(width) => {
                    let _ = pulses.push(width);
                }
                None => break,
            }
        }
        Ok(pulses)
    }
}

/// Busy-waits while the line holds `level`, up to `bound` polls.
///
/// Returns the number of polls spent at `level`, or `None` when the bound
/// was reached with the line unchanged.
fn wait_while<G: Gpio>(
    gpio: &mut G,
    pin: u8,
    level: PinState,
    bound: u32,
) -> Result<Option<u32>, DhtError<G::Error>> {
    for spent in 0..bound {
        if gpio.read(pin)? != level {
            return Ok(Some(spent));
        }
    }
    Ok(None)
}

/// Keeps the platform scheduling hint raised; restores it on drop so early
/// returns cannot leave the process in the elevated class.
struct PriorityWindow<'a, P: PriorityHint> {
    priority: &'a mut P,
}

impl<'a, P: PriorityHint> PriorityWindow<'a, P> {
    fn raise(priority: &'a mut P) -> Self {
        priority.raise();
        Self { priority }
    }
}

impl<P: PriorityHint> Drop for PriorityWindow<'_, P> {
    fn drop(&mut self) {
        self.priority.restore();
    }
}
