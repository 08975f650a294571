//! DHT Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for DHT-family humidity and
//! temperature sensors (DHT11, DHT22, AM2302). The sensors speak a single-wire,
//! timing-encoded protocol with no UART or clock recovery to lean on: the
//! driver busy-wait polls the data line, records per-pulse durations as raw
//! iteration counts, and reconstructs the 40-bit frame with a peak-relative
//! bit threshold and checksum validation.
//!
//! # Features
//! - Blocking synchronous API, one controller for up to `PINS` sensors
//! - Per-pin readout cache with a minimum re-read interval (the sensors cannot
//!   be sampled faster than every 2 seconds)
//! - Best-effort scheduling-priority hint held across the capture window
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! Hardware access goes through narrow platform traits supplied by an adapter:
//! - [`Gpio`] for direct data-line control
//! - [`Monotonic`] for the millisecond clock behind rate limiting
//! - [`PriorityHint`] for the optional scheduling-class hint
//! - [`DelayNs`] (from `embedded-hal`) for the wake-sequence delays
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod decode;
pub mod dht;
pub mod error;
pub mod platform;
pub mod reading;

pub use decode::{DecodeEvent, FRAME_PULSES, decode_frame, decode_frame_traced};
pub use dht::{CaptureConfig, Dht, MAX_PULSES, PulseTrain};
pub use error::{DecodeError, DhtError};
pub use platform::{Gpio, Monotonic, NoPriorityHint, PriorityHint};
pub use reading::{Reading, SensorKind};
