use tracing::{debug, info};

use crate::pipeline::topic::update_topic;

/// External update-payload parser. The pipeline never interprets update
/// bytes; verification and flashing live behind this seam.
pub trait UpdateSink {
    fn payload(&mut self, bytes: &[u8]);
}

/// Firmware-update subscription: listens on `a/<app_id>/u/<app_version>`
/// and forwards payload bytes, opaque, to the sink.
pub struct UpdateChannel {
    topic: String,
    sink: Box<dyn UpdateSink + Send>,
}

impl UpdateChannel {
    pub fn new(app_id: &str, app_version: &str, sink: Box<dyn UpdateSink + Send>) -> Self {
        let topic = update_topic(app_id, app_version);
        info!(topic = %topic, "firmware update channel configured");
        Self { topic, sink }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Routes one inbound message. Returns true if it was an update payload.
    pub fn route(&mut self, topic: &str, payload: &[u8]) -> bool {
        if topic != self.topic {
            return false;
        }
        debug!(bytes = payload.len(), "update payload chunk received");
        self.sink.payload(payload);
        true
    }
}
