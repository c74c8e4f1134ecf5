//! Link configuration.
//!
//! Everything the original cockpit rig hard-coded is a field here: the
//! serial device, the polling tiers, the acquisition pacing knobs and the
//! firmware's message-id table. Defaults reproduce that rig (INAV over
//! `/dev/ttyS0` at 115200 baud, attitude at 30 Hz, navigation and
//! electrical data at 15 Hz), so `LinkConfig::default()` is a working
//! setup and deployment YAML only needs to state what differs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::msp::MessageTable;
use crate::scheduler::RequestClass;
use crate::{Result, TelemetryError};

/// Configuration for one telemetry link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial device path.
    pub port: String,
    /// Serial line rate in bits per second.
    pub baud_rate: u32,

    /// Polling frequency of the fast class (attitude).
    pub fast_hz: u32,
    /// Polling frequency of the slow class (altitude, GPS, analog, home).
    pub slow_hz: u32,

    /// Upper bound on a single transport read.
    pub read_timeout_ms: u64,
    /// Upper bound on one iteration's inbound drain slice.
    pub drain_budget_ms: u64,
    /// Sleep between acquisition iterations.
    pub idle_delay_ms: u64,

    /// Wire message ids, per firmware protocol revision.
    pub messages: MessageTable,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS0".to_string(),
            baud_rate: 115_200,
            fast_hz: 30,
            slow_hz: 15,
            read_timeout_ms: 10,
            drain_budget_ms: 5,
            idle_delay_ms: 5,
            messages: MessageTable::default(),
        }
    }
}

impl LinkConfig {
    /// Parse deployment YAML. Omitted fields keep their defaults; the
    /// result is validated before it is returned.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|err| TelemetryError::config(format!("invalid link config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the acquisition loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(TelemetryError::config("port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(TelemetryError::config("baud rate must be nonzero"));
        }
        if self.fast_hz == 0 || self.slow_hz == 0 {
            return Err(TelemetryError::config("polling rates must be nonzero"));
        }
        if self.fast_hz < self.slow_hz {
            return Err(TelemetryError::config(format!(
                "fast class ({} Hz) must not poll slower than the slow class ({} Hz)",
                self.fast_hz, self.slow_hz
            )));
        }
        self.messages.validate()
    }

    /// The request classes this configuration polls, priority order.
    pub fn request_classes(&self) -> Vec<RequestClass> {
        vec![
            RequestClass::at_hz("fast", self.fast_hz, vec![self.messages.attitude]),
            RequestClass::at_hz(
                "slow",
                self.slow_hz,
                vec![
                    self.messages.altitude,
                    self.messages.raw_gps,
                    self.messages.analog,
                    self.messages.comp_gps,
                ],
            ),
        ]
    }

    /// Rate snapshots are published at, for subscription pacing.
    pub fn source_hz(&self) -> f64 {
        f64::from(self.fast_hz)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn drain_budget(&self) -> Duration {
        Duration::from_millis(self.drain_budget_ms)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}
