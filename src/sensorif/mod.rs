//! Sensor abstraction and inter-task data pipeline.
//!
//! The subsystem has four layers, leaves first:
//!
//! - [`driver`] — the capability contract every measurement device
//!   implements, plus the [`Reading`](driver::Reading) value type.
//! - [`registry`] — the fixed-capacity slot table and the operations
//!   over it, the only code that touches the table.
//! - [`channels`] — the two bounded queues forming the external boundary.
//! - [`task`] — the scheduler loop consuming commands and sweeping idle
//!   slots, the only consumer of the command queue.

pub mod channels;
pub mod driver;
pub mod registry;
pub mod task;

pub use channels::{SensorCommand, COMMAND_CHANNEL, READING_CHANNEL};
pub use driver::{AccessMode, Descriptor, Reading, SensorDriver, SensorKind};
pub use registry::{Registry, SensorId, SENSOR_SLOT_MAX};
