//! Unified error type for the sensor interface.
//!
//! A single closed enum that every registry operation and driver call
//! returns. All variants are `Copy` so results can be passed between the
//! scheduler task and callers without allocation.

use core::fmt;

/// Outcome of a registry or driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// A zero identifier, or arguments the target device cannot accept
    /// (e.g. a write to a read-only device).
    InvalidArgs,
    /// The slot table is full, or the identifier space is exhausted.
    OverCapacity,
    /// No device with this identifier was ever registered.
    NotFound,
    /// The identifier was registered once but the device has since been
    /// unregistered.
    Invalid,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgs => write!(f, "invalid arguments"),
            Self::OverCapacity => write!(f, "sensor capacity exceeded"),
            Self::NotFound => write!(f, "sensor not found"),
            Self::Invalid => write!(f, "sensor unregistered"),
        }
    }
}

impl std::error::Error for SensorError {}

/// Crate-wide `Result` alias for sensor operations.
pub type SensorResult<T> = core::result::Result<T, SensorError>;
