//! Bundled demo sensor drivers and thread-spawn helpers.
//!
//! One driver per [`SensorKind`](crate::sensorif::SensorKind). These are
//! demonstration devices in the spirit of the board's bring-up firmware:
//! [`contact`] samples a real input pin through `embedded-hal`, while
//! [`soil`] and [`climate`] read injected values so the whole pipeline
//! runs unmodified on host and target.

pub mod climate;
pub mod contact;
pub mod soil;
pub mod task_pin;
