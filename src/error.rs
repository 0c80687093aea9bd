use thiserror::Error;

/// Transient sensor failure. Treated as noise: the tick that hit it is
/// skipped and the device keeps sampling. Never escalated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sensor read failed: {reason}")]
pub struct SensorError {
    pub reason: String,
}

impl SensorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure raised by the underlying pub/sub client. The session treats any
/// of these as a disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The sample buffer is at capacity. Policy is fixed-capacity,
    /// drop-newest: the offered sample is discarded, buffered data is kept.
    /// Seeing this means the flush threshold is misconfigured relative to
    /// the buffer capacity.
    #[error("sample buffer full ({capacity} samples), newest sample dropped")]
    Overflow { capacity: usize },

    /// The encoded batch would exceed the transport payload ceiling.
    /// The buffer is left untouched; reduce the flush threshold.
    #[error("encoded batch would be ~{estimated} bytes, payload ceiling is {ceiling}")]
    PayloadTooLarge { estimated: usize, ceiling: usize },

    /// Publish attempted without an established session. The payload is
    /// dropped (at-most-once) and a reconnect attempt is scheduled.
    #[error("session not connected, payload dropped")]
    NotConnected,

    /// Fatal at startup: the device cannot run without a server address
    /// and credentials.
    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// Fatal at startup: identity strings would produce a topic longer
    /// than the transport allows.
    #[error("topic '{topic}' is {len} bytes, budget is {max}")]
    TopicTooLong {
        topic: String,
        len: usize,
        max: usize,
    },
}
