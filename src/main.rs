//! Meshsense firmware — main entry point.
//!
//! Boot order: ESP-IDF bootstrap, logger, peripherals, demo sensor
//! registration, then the sensor pipeline thread. Mesh formation,
//! smartconfig provisioning and the real uplink adapter are external
//! collaborators; they talk to the core only through the command and
//! reading channels.

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;

use meshsense::config::SystemConfig;
use meshsense::drivers::climate::ClimateSensor;
use meshsense::drivers::contact::ContactSensor;
use meshsense::drivers::soil::{SoilMoistureSensor, CMD_READ_RAW};
use meshsense::sensorif::channels::submit_command;
use meshsense::sensorif::registry::{Registry, SensorId};
use meshsense::sensorif::task;
use meshsense::uplink::LogSink;

static REGISTRY: Registry = Registry::new();

/// How often the demo loop requests an on-demand raw soil read.
const DEMO_COMMAND_PERIOD_SECS: u64 = 30;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("meshsense v{} starting", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let config = SystemConfig::default();

    // Demo devices, one per sensor kind. Registration failures degrade
    // the node but never stop boot.
    let lid = ContactSensor::new("lid", PinDriver::input(peripherals.pins.gpio4)?);
    if let Err(e) = REGISTRY.register(Box::new(lid)) {
        warn!("registering lid contact failed: {e}");
    }
    let soil_id = match REGISTRY.register(Box::new(SoilMoistureSensor::new())) {
        Ok(id) => id,
        Err(e) => {
            warn!("registering soil moisture failed: {e}");
            SensorId::INVALID
        }
    };
    if let Err(e) = REGISTRY.register(Box::new(ClimateSensor::new())) {
        warn!("registering climate failed: {e}");
    }
    info!("{}/{} sensor slots in use", REGISTRY.count(), REGISTRY.capacity());

    // The pipeline thread owns the scheduler loop and the uplink
    // forwarder. LogSink stands in for the mesh adapter.
    let pipeline = task::spawn_pipeline(&REGISTRY, config, LogSink::new());

    // Stand-in for the mesh control task: periodically request an
    // on-demand raw soil reading through the command queue.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(DEMO_COMMAND_PERIOD_SECS));
        if soil_id.is_valid() {
            submit_command(soil_id, &[CMD_READ_RAW]);
        }
        if pipeline.is_finished() {
            anyhow::bail!("sensor pipeline thread exited unexpectedly");
        }
    }
}
