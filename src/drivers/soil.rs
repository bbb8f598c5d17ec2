//! Capacitive soil-moisture sensor with two-point calibration.
//!
//! The default read converts the raw probe value to percent through a
//! dry/wet calibration pair; a command read (`[0x01]`) returns the raw
//! value instead, and `write` installs a new calibration. The raw value
//! comes from an injected atomic: this is a demo device, and a
//! production driver would sample an ADC channel here.

use core::sync::atomic::{AtomicU16, Ordering};

use log::info;

use crate::error::{SensorError, SensorResult};
use crate::sensorif::driver::{AccessMode, Descriptor, Reading, SensorDriver, SensorKind};

static SIM_SOIL_RAW: AtomicU16 = AtomicU16::new(0);

/// Inject the raw probe value the next reads will observe.
pub fn sim_set_raw(raw: u16) {
    SIM_SOIL_RAW.store(raw, Ordering::Relaxed);
}

/// Command byte selecting a raw (uncalibrated) read.
pub const CMD_READ_RAW: u8 = 0x01;

/// Two-point calibration: probe value in air (dry) and in water (wet).
/// Capacitive probes read *lower* when wet.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub dry_raw: u16,
    pub wet_raw: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dry_raw: 2600,
            wet_raw: 950,
        }
    }
}

#[derive(Debug, Default)]
pub struct SoilMoistureSensor {
    cal: Calibration,
}

impl SoilMoistureSensor {
    pub fn new() -> Self {
        Self::default()
    }

    fn raw(&self) -> u16 {
        SIM_SOIL_RAW.load(Ordering::Relaxed)
    }

    fn raw_to_percent(&self, raw: u16) -> i32 {
        let Calibration { dry_raw, wet_raw } = self.cal;
        if dry_raw <= wet_raw {
            return 0;
        }
        let span = i32::from(dry_raw) - i32::from(wet_raw);
        let depth = i32::from(dry_raw) - i32::from(raw);
        (depth * 100 / span).clamp(0, 100)
    }
}

impl SensorDriver for SoilMoistureSensor {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            mode: AccessMode::ReadWrite,
            kind: SensorKind::Single,
        }
    }

    fn init(&mut self) -> SensorResult<()> {
        info!("soil: registered (dry={}, wet={})", self.cal.dry_raw, self.cal.wet_raw);
        Ok(())
    }

    /// Install a calibration pair: 4 bytes, `[dry_lo, dry_hi, wet_lo,
    /// wet_hi]` little-endian.
    fn write(&mut self, args: &[u8]) -> SensorResult<()> {
        let [dry_lo, dry_hi, wet_lo, wet_hi] = *args else {
            return Err(SensorError::InvalidArgs);
        };
        let dry_raw = u16::from_le_bytes([dry_lo, dry_hi]);
        let wet_raw = u16::from_le_bytes([wet_lo, wet_hi]);
        if dry_raw <= wet_raw {
            return Err(SensorError::InvalidArgs);
        }
        self.cal = Calibration { dry_raw, wet_raw };
        info!("soil: calibration set (dry={dry_raw}, wet={wet_raw})");
        Ok(())
    }

    fn read(&mut self, cmd: &[u8]) -> SensorResult<Reading> {
        match cmd {
            [CMD_READ_RAW] => Ok(Reading::single(i32::from(self.raw()))),
            _ => Err(SensorError::InvalidArgs),
        }
    }

    fn read_default(&mut self) -> SensorResult<Reading> {
        Ok(Reading::single(self.raw_to_percent(self.raw())))
    }
}
