/// Possible errors from the DHT driver.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtError<E> {
    /// Timed out waiting for the sensor to acknowledge the wake sequence.
    Timeout,
    /// Capture ended with a pulse count other than a full frame.
    TruncatedFrame,
    /// Checksum byte did not match the received data.
    ChecksumMismatch,
    /// Pin identifier outside the controller's readout table.
    PinOutOfRange,
    /// Error from the GPIO adapter.
    Pin(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}

impl<E> DhtError<E> {
    pub(crate) fn from_decode(value: DecodeError) -> Self {
        match value {
            DecodeError::TruncatedFrame => Self::TruncatedFrame,
            DecodeError::ChecksumMismatch => Self::ChecksumMismatch,
        }
    }
}

/// Errors from the pulse-train decoder alone.
///
/// [`decode_frame`](crate::decode::decode_frame) is a pure function and does
/// not know about GPIO adapters; the driver folds these into [`DhtError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The pulse train did not hold exactly one acknowledgement pulse plus
    /// 40 data pulses.
    TruncatedFrame,
    /// Checksum byte did not match the received data.
    ChecksumMismatch,
}
