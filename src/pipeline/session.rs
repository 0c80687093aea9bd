use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::encode::Batch;
use super::topic::NodeIdentity;
use crate::error::TelemetryError;
use crate::transport::{Credentials, Transport, TransportEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server_url: String,
    pub credentials: Credentials,
    /// Fixed delay between losing the link and the next connect attempt.
    pub reconnect_backoff: Duration,
}

/// The single logical connection to the collector, modeled as an explicit
/// state machine driven by discrete `TransportEvent`s. Exclusively owned by
/// the scheduler's execution context; no locking, no queuing. A publish
/// that cannot go out is dropped and a reconnect is scheduled — the device
/// retries indefinitely because nobody is around to push the button.
#[derive(Debug)]
pub struct TelemetrySession<T: Transport> {
    state: SessionState,
    transport: T,
    identity: NodeIdentity,
    config: SessionConfig,
    /// Set by `stop()`; blocks reconnect scheduling until `start()`.
    stopped: bool,
    reconnect_at: Option<Instant>,
    published: u64,
    dropped: u64,
}

impl<T: Transport> TelemetrySession<T> {
    pub fn new(transport: T, identity: NodeIdentity, config: SessionConfig) -> Self {
        Self {
            state: SessionState::Disconnected,
            transport,
            identity,
            config,
            stopped: false,
            reconnect_at: None,
            published: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Begins the connect handshake: `Disconnected -> Connecting`. Fails
    /// with `ConfigurationInvalid` (no transition) if the server URL or
    /// credentials are empty. An attempt already in flight is left alone.
    pub fn start(&mut self) -> Result<(), TelemetryError> {
        if self.config.server_url.is_empty()
            || self.config.credentials.user.is_empty()
            || self.config.credentials.password.is_empty()
        {
            return Err(TelemetryError::ConfigurationInvalid(
                "server URL, user and password must all be set".to_string(),
            ));
        }
        self.stopped = false;
        match self.state {
            SessionState::Connecting | SessionState::Connected => return Ok(()),
            SessionState::Disconnected => {}
        }

        self.state = SessionState::Connecting;
        info!(url = %self.config.server_url, client_id = %self.identity.client_id(), "session connecting");
        if let Err(e) = self.transport.connect(
            &self.config.server_url,
            &self.identity.client_id(),
            &self.config.credentials,
        ) {
            warn!("connect initiation failed: {}", e);
            self.state = SessionState::Disconnected;
            self.schedule_reconnect();
        }
        Ok(())
    }

    /// Safe from any state. Drops the link and blocks reconnection until
    /// the next `start()`.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.reconnect_at = None;
        if self.state != SessionState::Disconnected {
            self.transport.disconnect();
        }
        self.state = SessionState::Disconnected;
        info!("session stopped");
    }

    /// Force-drops the link and schedules a fresh attempt after the fixed
    /// back-off.
    pub fn reconnect(&mut self) {
        if self.state != SessionState::Disconnected {
            self.transport.disconnect();
            self.state = SessionState::Disconnected;
        }
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.stopped || self.state == SessionState::Connecting {
            return;
        }
        if self.reconnect_at.is_none() {
            self.reconnect_at = Some(Instant::now() + self.config.reconnect_backoff);
            debug!(
                backoff_ms = self.config.reconnect_backoff.as_millis() as u64,
                "reconnect scheduled"
            );
        }
    }

    /// Called once per scheduler tick: fires the pending reconnect attempt
    /// once its back-off deadline has passed. Returns true if an attempt
    /// was started.
    pub fn poll_reconnect(&mut self, now: Instant) -> bool {
        // An attempt in flight blocks new attempts; the deadline stays
        // pending and matters again only if the handshake fails.
        if self.state == SessionState::Connecting {
            return false;
        }
        match self.reconnect_at {
            Some(at) if now >= at && !self.stopped => {
                self.reconnect_at = None;
                self.state = SessionState::Disconnected;
                // Config was valid when first started; a failure here only
                // means it was never valid, and then there is nothing to do.
                if let Err(e) = self.start() {
                    warn!("reconnect attempt rejected: {}", e);
                }
                true
            }
            _ => false,
        }
    }

    /// Publishes one payload on an identity-scoped channel. Only legal in
    /// `Connected`; otherwise the payload is dropped, `NotConnected` is
    /// returned and a reconnect is scheduled (fire-and-forget, no retry of
    /// the failed publish).
    pub fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), TelemetryError> {
        if self.state != SessionState::Connected {
            self.dropped += 1;
            self.schedule_reconnect();
            return Err(TelemetryError::NotConnected);
        }
        let topic = self.identity.topic(channel)?;
        match self.transport.send(&topic, payload) {
            Ok(()) => {
                self.published += 1;
                Ok(())
            }
            Err(e) => {
                warn!(topic = %topic, "send failed, dropping link: {}", e);
                self.dropped += 1;
                self.transport.disconnect();
                self.state = SessionState::Disconnected;
                self.schedule_reconnect();
                Err(TelemetryError::NotConnected)
            }
        }
    }

    /// Publishes an encoded batch on its channel.
    pub fn publish_batch(&mut self, batch: &Batch) -> Result<(), TelemetryError> {
        debug!(
            batch_id = %batch.id,
            channel = %batch.channel,
            records = batch.records,
            bytes = batch.payload.len(),
            "publishing batch"
        );
        self.publish(&batch.channel, batch.payload.as_bytes())
    }

    /// Human-readable line on the `log` channel. Silently skipped while the
    /// session is down — remote logging is best-effort by nature.
    pub fn log(&mut self, message: &str) -> bool {
        if self.state != SessionState::Connected {
            return false;
        }
        self.publish("log", message.as_bytes()).is_ok()
    }

    /// Device status document on the `monitor` channel, same best-effort
    /// contract as `log`.
    pub fn stat(&mut self, doc: &Value) -> bool {
        if self.state != SessionState::Connected {
            return false;
        }
        self.publish("monitor", doc.to_string().as_bytes()).is_ok()
    }

    /// Subscribes to a raw (non-identity-scoped) topic. Connected only.
    pub fn subscribe(&mut self, topic: &str) -> Result<(), TelemetryError> {
        if self.state != SessionState::Connected {
            return Err(TelemetryError::NotConnected);
        }
        if let Err(e) = self.transport.subscribe(topic) {
            warn!(topic = %topic, "subscribe failed, dropping link: {}", e);
            self.transport.disconnect();
            self.state = SessionState::Disconnected;
            self.schedule_reconnect();
            return Err(TelemetryError::NotConnected);
        }
        Ok(())
    }

    /// Feeds one transport notification through the state machine. Inbound
    /// messages are handed back for routing (firmware update channel);
    /// everything else is consumed here.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<(String, Vec<u8>)> {
        match event {
            TransportEvent::ConnectAck { success: true } => {
                if self.state == SessionState::Connecting {
                    self.state = SessionState::Connected;
                    self.reconnect_at = None;
                    info!("session connected");
                } else {
                    // Stale ack, e.g. stop() raced the handshake.
                    debug!("ignoring connect ack in {:?}", self.state);
                }
                None
            }
            TransportEvent::ConnectAck { success: false } => {
                warn!("connect handshake failed");
                self.state = SessionState::Disconnected;
                self.schedule_reconnect();
                None
            }
            TransportEvent::Disconnected { reason } => {
                warn!(reason = %reason, "transport disconnected");
                self.state = SessionState::Disconnected;
                self.schedule_reconnect();
                None
            }
            TransportEvent::Message { topic, payload } => Some((topic, payload)),
        }
    }
}
