//! The capability contract every measurement device implements.
//!
//! A device driver is any type implementing [`SensorDriver`]. The registry
//! stores drivers as trait objects, so the set of device types is open:
//! anything satisfying the contract can be plugged in at runtime.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::{SensorError, SensorResult};

/// Maximum number of raw samples one reading can carry.
pub const READING_MAX_VALUES: usize = 8;

/// How a device may be accessed once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// Data can only be read out.
    ReadOnly,
    /// The device additionally accepts configuration writes.
    ReadWrite,
}

/// What shape of data a device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    /// A two-state value (0 or 1) — contact switches, presence detectors.
    Binary,
    /// One sample per reading.
    Single,
    /// Several samples per reading (e.g. temperature + humidity).
    Multi,
}

/// Immutable capability description, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub mode: AccessMode,
    pub kind: SensorKind,
}

/// One captured measurement.
///
/// Produced fresh on every read; ownership of the buffer passes to
/// whoever receives it (the scheduler task, then the outbound queue).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Raw samples, in driver-defined order and units.
    pub values: Vec<i32, READING_MAX_VALUES>,
}

impl Reading {
    /// A reading carrying a single sample.
    pub fn single(value: i32) -> Self {
        let mut values = Vec::new();
        // Capacity is READING_MAX_VALUES >= 1.
        let _ = values.push(value);
        Self { values }
    }

    /// A reading built from a sample slice.
    ///
    /// Returns `InvalidArgs` when the slice exceeds [`READING_MAX_VALUES`].
    pub fn from_samples(samples: &[i32]) -> SensorResult<Self> {
        let values = Vec::from_slice(samples).map_err(|()| SensorError::InvalidArgs)?;
        Ok(Self { values })
    }

    /// Number of samples in this reading.
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

/// The polymorphic surface a measurement device must satisfy.
///
/// `write` and `read` are meaningful only for [`AccessMode::ReadWrite`] /
/// command-driven devices; their default implementations reject the call,
/// so a read-only driver needs to provide `read_default` only.
pub trait SensorDriver: Send {
    /// The device's immutable capability description.
    fn descriptor(&self) -> Descriptor;

    /// Invoked once when the device is registered.
    fn init(&mut self) -> SensorResult<()> {
        Ok(())
    }

    /// Invoked once when the device is unregistered.
    fn shutdown(&mut self) -> SensorResult<()> {
        Ok(())
    }

    /// Write opaque configuration data to the device.
    fn write(&mut self, _args: &[u8]) -> SensorResult<()> {
        Err(SensorError::InvalidArgs)
    }

    /// Read with an opaque control payload (command-driven path).
    fn read(&mut self, _cmd: &[u8]) -> SensorResult<Reading> {
        Err(SensorError::InvalidArgs)
    }

    /// Read without parameters (idle-sweep path).
    fn read_default(&mut self) -> SensorResult<Reading>;
}
