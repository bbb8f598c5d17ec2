//! System configuration parameters.
//!
//! Tunable timings for the sensor pipeline. Values can be overridden at
//! startup (e.g. from provisioning) before the scheduler task is spawned.

use serde::{Deserialize, Serialize};

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Scheduler task ---
    /// How long the scheduler waits on the command queue before falling
    /// back to an idle sweep (milliseconds).
    pub command_wait_ms: u32,
    /// Pause between consecutive slots during an idle sweep, spreading
    /// bus/radio load instead of bursting (milliseconds).
    pub sweep_pause_ms: u32,
    /// Whether idle sweeps run at all. With this off, only explicit
    /// commands produce readings.
    pub idle_sweep: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            command_wait_ms: 1000,
            sweep_pause_ms: 100,
            idle_sweep: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.command_wait_ms > 0);
        assert!(c.sweep_pause_ms > 0);
        assert!(c.idle_sweep);
    }

    #[test]
    fn sweep_pause_shorter_than_command_wait() {
        let c = SystemConfig::default();
        assert!(
            c.sweep_pause_ms < c.command_wait_ms,
            "a full sweep pause must not starve the command queue check"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.command_wait_ms, c2.command_wait_ms);
        assert_eq!(c.sweep_pause_ms, c2.sweep_pause_ms);
        assert_eq!(c.idle_sweep, c2.idle_sweep);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.command_wait_ms, c2.command_wait_ms);
        assert_eq!(c.idle_sweep, c2.idle_sweep);
    }
}
