//! Pulse-train to frame decoding.
//!
//! A capture yields one duration per observed high segment of the data line.
//! The first segment is the sensor's acknowledgement pulse; the 40 that
//! follow carry the payload, where a short high means `0` and a long high
//! means `1`. Absolute pulse widths drift with temperature and supply
//! voltage, so each frame is decoded against its own longest pulse rather
//! than a fixed threshold.

use crate::error::DecodeError;

/// Number of line pulses in a complete transmission: the acknowledgement
/// pulse followed by 40 data bits.
pub const FRAME_PULSES: usize = 41;

/// Checkpoints reported while decoding a pulse train.
///
/// Emitted by [`decode_frame_traced`] so callers can log or record the bit
/// decisions without the decoder knowing anything about their sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent {
    /// The long-pulse reference chosen for this frame.
    Peak {
        /// Longest data-pulse width, in poll iterations.
        width: u32,
    },
    /// One bit decision.
    Bit {
        /// Data-pulse index, 0..40.
        index: usize,
        /// Measured width of this pulse, in poll iterations.
        width: u32,
        /// Whether the pulse decoded as a `1`.
        high: bool,
    },
    /// All five bytes assembled.
    Frame {
        /// The frame as received, checksum byte included.
        bytes: [u8; 5],
        /// Checksum computed over the first four bytes.
        sum: u8,
    },
}

/// Decodes a recorded pulse train into the 5-byte frame.
///
/// # Returns
///
/// * `Ok([u8; 5])` (humidity high/low, temperature high/low, checksum)
///   when the train holds exactly [`FRAME_PULSES`] samples and the checksum
///   matches.
/// * `Err(DecodeError)` otherwise.
pub fn decode_frame(pulses: &[u32]) -> Result<[u8; 5], DecodeError> {
    decode_frame_traced(pulses, &mut |_| {})
}

/// Decodes like [`decode_frame`], reporting [`DecodeEvent`]s to `trace` at
/// each checkpoint.
pub fn decode_frame_traced(
    pulses: &[u32],
    trace: &mut impl FnMut(DecodeEvent),
) -> Result<[u8; 5], DecodeError> {
    if pulses.len() != FRAME_PULSES {
        return Err(DecodeError::TruncatedFrame);
    }

    // Skip the acknowledgement pulse; the peak over the data pulses is the
    // "1" timing reference for this frame.
    let data = &pulses[1..];
    let peak = data.iter().copied().max().unwrap_or(0);
    trace(DecodeEvent::Peak { width: peak });

    let mut frame = [0u8; 5];
    for (index, &width) in data.iter().enumerate() {
        // Closer to the peak than to zero reads as a 1.
        let high = 2 * u64::from(width) > u64::from(peak);
        let byte = &mut frame[index / 8];
        *byte <<= 1;
        if high {
            *byte |= 1;
        }
        trace(DecodeEvent::Bit { index, width, high });
    }

    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    trace(DecodeEvent::Frame { bytes: frame, sum });

    if frame[4] != sum {
        return Err(DecodeError::ChecksumMismatch);
    }
    Ok(frame)
}
