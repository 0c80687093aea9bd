use tokio::sync::mpsc;

use crate::error::TransportError;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Completion and inbound notifications from the pub/sub client. Delivered
/// on the scheduler's event channel and drained once per tick, so all
/// session transitions happen on the single event-processing context.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connect handshake finished (asynchronously).
    ConnectAck { success: bool },
    /// The link dropped after being established.
    Disconnected { reason: String },
    /// Inbound message on a subscribed topic (firmware update channel).
    Message { topic: String, payload: Vec<u8> },
}

/// Seam to the external pub/sub client library. `connect` only *initiates*
/// the handshake; completion arrives later as a `TransportEvent`. `send`
/// returning `Ok` means "accepted by the client", not delivered — the
/// pipeline is at-most-once end to end.
pub trait Transport {
    fn connect(
        &mut self,
        url: &str,
        client_id: &str,
        credentials: &Credentials,
    ) -> Result<(), TransportError>;

    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    fn disconnect(&mut self);
}

/// In-memory transport for tests and the demo harness: records what was
/// sent and acknowledges connects by queuing events on the channel the
/// scheduler drains, mimicking a real client's async completion.
#[derive(Debug)]
pub struct LoopbackTransport {
    events: mpsc::Sender<TransportEvent>,
    pub sent: Vec<(String, Vec<u8>)>,
    pub subscriptions: Vec<String>,
    pub connected: bool,
    /// Make the next handshake complete with failure.
    pub fail_connect: bool,
    /// Make `send` report a transport error.
    pub fail_send: bool,
}

impl LoopbackTransport {
    pub fn new(events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            events,
            sent: Vec::new(),
            subscriptions: Vec::new(),
            connected: false,
            fail_connect: false,
            fail_send: false,
        }
    }
}

impl Transport for LoopbackTransport {
    fn connect(
        &mut self,
        _url: &str,
        _client_id: &str,
        _credentials: &Credentials,
    ) -> Result<(), TransportError> {
        let success = !self.fail_connect;
        self.connected = success;
        self.events
            .try_send(TransportEvent::ConnectAck { success })
            .map_err(|e| TransportError(format!("event channel: {}", e)))
    }

    fn send(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if self.fail_send {
            return Err(TransportError("send refused".to_string()));
        }
        if !self.connected {
            return Err(TransportError("not connected".to_string()));
        }
        self.sent.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError("not connected".to_string()));
        }
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}
