use crate::error::TelemetryError;

/// Hard bound on a fully qualified topic, matching the transport's fixed
/// buffer budget.
pub const TOPIC_MAX_LEN: usize = 128;

/// Longest channel name the identity check reserves room for. Auxiliary
/// probe channels (16 hex chars) and all built-in channels fit well inside.
pub const CHANNEL_MAX_LEN: usize = 32;

/// Immutable device identity. Length-validated at construction so no
/// truncated or partial topic can ever reach the transport; topics built
/// from a valid identity are total for any channel within budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    node_id: String,
    chip_id: String,
}

impl NodeIdentity {
    pub fn new(
        node_id: impl Into<String>,
        chip_id: impl Into<String>,
    ) -> Result<Self, TelemetryError> {
        let node_id = node_id.into();
        let chip_id = chip_id.into();
        if node_id.is_empty() || chip_id.is_empty() {
            return Err(TelemetryError::ConfigurationInvalid(
                "node_id and chip_id must be non-empty".to_string(),
            ));
        }
        // Reserve room for the widest allowed channel up front.
        let worst = node_id.len() + 1 + chip_id.len() + 1 + CHANNEL_MAX_LEN;
        if worst > TOPIC_MAX_LEN {
            return Err(TelemetryError::TopicTooLong {
                topic: format!("{}/{}/<channel>", node_id, chip_id),
                len: worst,
                max: TOPIC_MAX_LEN,
            });
        }
        Ok(Self { node_id, chip_id })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn chip_id(&self) -> &str {
        &self.chip_id
    }

    /// Transport client id, derived from the chip id.
    pub fn client_id(&self) -> String {
        format!("telemetry_client_{}", self.chip_id)
    }

    /// Fully qualified destination for a logical channel. Deterministic and
    /// computed on demand, never cached.
    pub fn topic(&self, channel: &str) -> Result<String, TelemetryError> {
        let topic = format!("{}/{}/{}", self.node_id, self.chip_id, channel);
        if channel.len() > CHANNEL_MAX_LEN || topic.len() > TOPIC_MAX_LEN {
            return Err(TelemetryError::TopicTooLong {
                len: topic.len(),
                max: TOPIC_MAX_LEN,
                topic,
            });
        }
        Ok(topic)
    }
}

/// Firmware update subscription topic: `a/<app_id>/u/<app_version>`.
/// Not identity-scoped; the collector addresses updates per app/version.
pub fn update_topic(app_id: &str, app_version: &str) -> String {
    format!("a/{}/u/{}", app_id, app_version)
}
