use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::error::TelemetryError;
use crate::pipeline::encode::BatchEncoder;
use crate::pipeline::sample::AxisSet;
use crate::pipeline::topic::NodeIdentity;

/// Everything the node needs to run, read once at startup and immutable
/// afterwards. No runtime reconfiguration: the device reboots to change.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub server_url: String,
    pub user: String,
    pub password: String,
    pub node_id: String,
    pub chip_id: String,
    #[serde(default = "defaults::app_version")]
    pub app_version: String,
    #[serde(default = "defaults::axes")]
    pub axes: AxisSet,
    #[serde(default = "defaults::flush_threshold")]
    pub flush_threshold: usize,
    #[serde(default = "defaults::buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "defaults::payload_ceiling")]
    pub payload_ceiling: usize,
    #[serde(default = "defaults::sample_period_ms")]
    pub sample_period_ms: u64,
    #[serde(default = "defaults::status_period_ms")]
    pub status_period_ms: u64,
    #[serde(default = "defaults::reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

mod defaults {
    use crate::pipeline::sample::AxisSet;

    pub fn app_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
    pub fn axes() -> AxisSet {
        AxisSet::Accel
    }
    pub fn flush_threshold() -> usize {
        50
    }
    pub fn buffer_capacity() -> usize {
        2000
    }
    pub fn payload_ceiling() -> usize {
        16 * 1024
    }
    pub fn sample_period_ms() -> u64 {
        20
    }
    pub fn status_period_ms() -> u64 {
        10_000
    }
    pub fn reconnect_backoff_ms() -> u64 {
        1000
    }
}

impl NodeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: NodeConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Environment overrides for the secrets that should not live in a file
    /// checked into the image.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("OSCILLA_URL") {
            self.server_url = url;
        }
        if let Ok(user) = std::env::var("OSCILLA_USER") {
            self.user = user;
        }
        if let Ok(pass) = std::env::var("OSCILLA_PASS") {
            self.password = pass;
        }
    }

    /// Startup validation. Fatal on failure — there is no safe way to run
    /// half-configured.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.server_url.is_empty() || self.user.is_empty() || self.password.is_empty() {
            return Err(TelemetryError::ConfigurationInvalid(
                "server_url, user and password must all be set".to_string(),
            ));
        }
        if self.flush_threshold == 0 || self.flush_threshold > self.buffer_capacity {
            return Err(TelemetryError::ConfigurationInvalid(format!(
                "flush_threshold {} must be in 1..={}",
                self.flush_threshold, self.buffer_capacity
            )));
        }
        if self.sample_period_ms == 0 || self.status_period_ms == 0 {
            return Err(TelemetryError::ConfigurationInvalid(
                "sampling periods must be non-zero".to_string(),
            ));
        }
        // A threshold-sized batch must fit the ceiling, worst case, or every
        // single flush would fail.
        let encoder = BatchEncoder::new(self.axes, self.payload_ceiling);
        let estimated = encoder.estimate_size(self.flush_threshold);
        if estimated > self.payload_ceiling {
            return Err(TelemetryError::ConfigurationInvalid(format!(
                "flush_threshold {} encodes to ~{} bytes, over the {} byte ceiling",
                self.flush_threshold, estimated, self.payload_ceiling
            )));
        }
        // Surfaces TopicTooLong now instead of at first publish.
        NodeIdentity::new(&self.node_id, &self.chip_id)?;
        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn status_period(&self) -> Duration {
        Duration::from_millis(self.status_period_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}
