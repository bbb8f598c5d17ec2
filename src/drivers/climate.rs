//! Climate sensor producing a temperature + humidity pair per reading.
//!
//! Values are injected atomics (demo device), reported in centi-units so
//! no floats cross the wire: `[temperature_c * 100, humidity_pct * 100]`.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::error::SensorResult;
use crate::sensorif::driver::{AccessMode, Descriptor, Reading, SensorDriver, SensorKind};

static SIM_TEMP_CENTI: AtomicI32 = AtomicI32::new(0);
static SIM_HUMIDITY_CENTI: AtomicI32 = AtomicI32::new(0);

/// Inject the values the next reads will observe (centi-units).
pub fn sim_set_climate(temp_centi: i32, humidity_centi: i32) {
    SIM_TEMP_CENTI.store(temp_centi, Ordering::Relaxed);
    SIM_HUMIDITY_CENTI.store(humidity_centi, Ordering::Relaxed);
}

#[derive(Debug, Default)]
pub struct ClimateSensor;

impl ClimateSensor {
    pub fn new() -> Self {
        Self
    }
}

impl SensorDriver for ClimateSensor {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            mode: AccessMode::ReadOnly,
            kind: SensorKind::Multi,
        }
    }

    fn read_default(&mut self) -> SensorResult<Reading> {
        Reading::from_samples(&[
            SIM_TEMP_CENTI.load(Ordering::Relaxed),
            SIM_HUMIDITY_CENTI.load(Ordering::Relaxed),
        ])
    }
}
