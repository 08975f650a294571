//! Platform capability traits.
//!
//! The driver core never touches hardware directly. An adapter supplies line
//! control, a millisecond clock, and an optional scheduling hint through the
//! traits in this module; the capture and decode logic stays portable across
//! anything that can toggle a pin fast enough.

use embedded_hal::digital::PinState;

/// Direct control of sensor data lines, addressed by pin number.
///
/// Every call is expected to complete in at most a few microseconds; the
/// capture loop counts raw poll iterations, so a buffered transport (I/O
/// expander, USB bridge) will stretch every measured pulse and break the
/// bit threshold.
pub trait Gpio {
    /// Adapter-specific error for line access.
    type Error;

    /// One-time hardware setup (mapping registers, opening the GPIO
    /// character device, claiming peripherals). Called once by
    /// [`Dht::initialize`](crate::Dht::initialize) before any line access.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Configures `pin` as a push-pull output.
    fn set_output(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Configures `pin` as an input. The sensor line needs a pull-up so the
    /// idle state reads high.
    fn set_input(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Drives `pin` to `level`. Only valid while the pin is an output.
    fn write(&mut self, pin: u8, level: PinState) -> Result<(), Self::Error>;

    /// Samples the current level of `pin`.
    fn read(&mut self, pin: u8) -> Result<PinState, Self::Error>;
}

/// Monotonic millisecond clock.
///
/// Used only for rate limiting between captures, never for pulse timing:
/// reading a clock inside the poll loop would distort the very durations
/// being measured, so pulses are timed in loop-iteration counts instead.
pub trait Monotonic {
    /// Milliseconds from an arbitrary fixed origin, non-decreasing.
    fn now_ms(&mut self) -> u64;
}

/// Best-effort scheduling hint held across a capture window.
///
/// A Linux adapter would switch the process to a run-to-completion class at
/// maximum priority and pin its pages resident (`SCHED_FIFO` plus
/// `mlockall`) in [`raise`](PriorityHint::raise), and undo both in
/// [`restore`](PriorityHint::restore). Both calls are infallible: without
/// the privilege the capture simply runs at reduced timing fidelity, and
/// the frame checksum catches the bits that jitter destroys.
///
/// The driver pairs every `raise` with exactly one `restore` on every exit
/// path, including timeout aborts.
pub trait PriorityHint {
    /// Requests the most latency-favorable scheduling available.
    fn raise(&mut self);

    /// Returns to the normal scheduling class.
    fn restore(&mut self);
}

/// Scheduling hint that does nothing.
///
/// For bare-metal targets, or hosts where the capture jitter is acceptable
/// as-is.
pub struct NoPriorityHint;

impl PriorityHint for NoPriorityHint {
    fn raise(&mut self) {}

    fn restore(&mut self) {}
}
