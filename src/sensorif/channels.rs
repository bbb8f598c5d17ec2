//! Inter-task channels for the sensor pipeline.
//!
//! Two bounded `embassy-sync` MPMC channels form the core's entire
//! external boundary. Producers (mesh control, provisioning, tests) push
//! commands in; the uplink forwarder drains readings out.
//!
//! ```text
//! ┌──────────────┐ SensorCommand ┌──────────────┐  Reading  ┌──────────┐
//! │ mesh control │──────────────▶│  scheduler   │──────────▶│  uplink  │
//! │ provisioning │               │  task        │           │ forwarder│
//! └──────────────┘               └──────────────┘           └──────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use crate::sensorif::driver::Reading;
use crate::sensorif::registry::SensorId;

/// Maximum opaque control payload per command.
pub const COMMAND_PAYLOAD_MAX: usize = 16;

/// Depth of the inbound (command) queue.
pub const COMMAND_QUEUE_DEPTH: usize = 5;

/// Depth of the outbound (reading) queue.
pub const READING_QUEUE_DEPTH: usize = 5;

/// An on-demand read request naming a target device.
#[derive(Debug, Clone)]
pub struct SensorCommand {
    /// Which registration the command is aimed at.
    pub target: SensorId,
    /// Opaque control data handed to the device's `read(cmd)`.
    pub payload: Vec<u8, COMMAND_PAYLOAD_MAX>,
}

impl SensorCommand {
    /// Build a command. Returns `None` when the payload exceeds
    /// [`COMMAND_PAYLOAD_MAX`].
    pub fn new(target: SensorId, payload: &[u8]) -> Option<Self> {
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self { target, payload })
    }
}

pub type CommandChannel = Channel<CriticalSectionRawMutex, SensorCommand, COMMAND_QUEUE_DEPTH>;
pub type ReadingChannel = Channel<CriticalSectionRawMutex, Reading, READING_QUEUE_DEPTH>;

/// Inbound command channel: external producers → scheduler task.
pub static COMMAND_CHANNEL: CommandChannel = Channel::new();

/// Outbound reading channel: scheduler task → uplink forwarder.
pub static READING_CHANNEL: ReadingChannel = Channel::new();

/// Submit a command without waiting. Returns `false` (and logs) when the
/// queue is full or the payload is oversized; the caller's retry point
/// is its own next cycle.
pub fn submit_command(target: SensorId, payload: &[u8]) -> bool {
    let Some(cmd) = SensorCommand::new(target, payload) else {
        warn!("sensorif: oversized command payload for sensor {target}, dropped");
        return false;
    };
    if COMMAND_CHANNEL.try_send(cmd).is_err() {
        warn!("sensorif: command queue full, dropping command for sensor {target}");
        return false;
    }
    true
}

/// Non-blocking drain of one outbound reading, for synchronous consumers.
pub fn try_recv_reading() -> Option<Reading> {
    READING_CHANNEL.try_receive().ok()
}
