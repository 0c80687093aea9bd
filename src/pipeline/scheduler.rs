use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::buffer::SampleBuffer;
use super::encode::BatchEncoder;
use super::session::{SessionState, TelemetrySession};
use crate::sensor::SensorDriver;
use crate::transport::{Transport, TransportEvent};
use crate::update::UpdateChannel;

/// Channel for batched motion samples.
pub const CHANNEL_ACCEL: &str = "accel";
/// Channel for the device-internal temperature (health reading).
pub const CHANNEL_CPU_TEMP: &str = "cpuTemp";
/// Channel announcing how many probes answered on the bus.
pub const CHANNEL_SENSOR_COUNT: &str = "sensorCount";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Fast tick: one sensor read per period.
    pub sample_period: Duration,
    /// Slow tick: auxiliary probes and device status.
    pub status_period: Duration,
    /// Buffer length at which a flush is attempted.
    pub flush_threshold: usize,
}

/// Drives the whole pipeline from one cooperative context: a fast tick that
/// samples and flushes, a slow tick that reports status, and the transport
/// event drain. Each entry point runs to completion before the next is
/// dispatched, which is what lets the buffer and session go lock-free.
pub struct SamplingScheduler<S: SensorDriver, T: Transport> {
    sensor: S,
    buffer: SampleBuffer,
    encoder: BatchEncoder,
    session: TelemetrySession<T>,
    update: Option<UpdateChannel>,
    config: SchedulerConfig,
    update_subscribed: bool,
}

impl<S: SensorDriver, T: Transport> SamplingScheduler<S, T> {
    pub fn new(
        sensor: S,
        buffer: SampleBuffer,
        encoder: BatchEncoder,
        session: TelemetrySession<T>,
        update: Option<UpdateChannel>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            sensor,
            buffer,
            encoder,
            session,
            update,
            config,
            update_subscribed: false,
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn session(&self) -> &TelemetrySession<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TelemetrySession<T> {
        &mut self.session
    }

    /// Starts the session. Configuration errors are fatal and bubble up.
    pub fn start(&mut self) -> Result<(), crate::error::TelemetryError> {
        self.session.start()
    }

    /// One sampling step: read, append, flush at the threshold. A failed
    /// read skips the tick — transient sensor noise, nothing buffered,
    /// nothing escalated.
    pub fn fast_tick(&mut self) {
        let sample = match self.sensor.read_sample() {
            Ok(s) => s,
            Err(e) => {
                debug!("sample skipped: {}", e);
                return;
            }
        };

        match self.buffer.append(sample) {
            Ok(len) => {
                if len >= self.config.flush_threshold {
                    self.flush();
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    /// Encode, then drain, then publish — in that order. Encoding against
    /// the live buffer means a `PayloadTooLarge` leaves every sample in
    /// place instead of silently losing a drained batch. A failed publish
    /// drops the batch (at-most-once).
    fn flush(&mut self) {
        let batch = match self.encoder.encode(CHANNEL_ACCEL, self.buffer.samples()) {
            Ok(b) => b,
            Err(e) => {
                warn!("flush aborted, buffer kept: {}", e);
                return;
            }
        };
        let drained = self.buffer.drain();
        debug_assert_eq!(drained.len(), batch.records);
        if let Err(e) = self.session.publish_batch(&batch) {
            warn!(batch_id = %batch.id, records = batch.records, "batch dropped: {}", e);
        }
    }

    /// One status step: probe count, each auxiliary probe on its own
    /// channel, then the device health reading. Probe failures are reported
    /// independently; one dead probe never blocks the rest.
    pub fn slow_tick(&mut self) {
        let ids = self.sensor.auxiliary_ids();
        if let Err(e) = self
            .session
            .publish(CHANNEL_SENSOR_COUNT, ids.len().to_string().as_bytes())
        {
            debug!("probe count not published: {}", e);
        }

        for (i, id) in ids.iter().enumerate() {
            match self.sensor.read_auxiliary(id) {
                Ok(temp) => {
                    let reading = format!("{:.2}", temp);
                    if let Err(e) = self.session.publish(&id.channel(), reading.as_bytes()) {
                        debug!(probe = %id.channel(), "reading not published: {}", e);
                    }
                    self.session
                        .log(&format!("sensor {}: {:.2} C", i + 1, temp));
                }
                Err(e) => warn!(probe = %id.channel(), "probe read failed: {}", e),
            }
        }

        match self.sensor.read_internal_temp() {
            Ok(temp) => {
                let reading = format!("{:.2}", temp);
                if let Err(e) = self.session.publish(CHANNEL_CPU_TEMP, reading.as_bytes()) {
                    debug!("health reading not published: {}", e);
                }
            }
            Err(e) => warn!("internal temperature read failed: {}", e),
        }

        let stat = json!({
            "published": self.session.published(),
            "dropped": self.session.dropped(),
            "overflows": self.buffer.overflows(),
        });
        self.session.stat(&stat);
    }

    /// Feeds one transport notification to the session and routes inbound
    /// payloads to the update channel. Re-subscribes after every fresh
    /// connection — the broker forgets us on disconnect.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        let was_connected = self.session.state() == SessionState::Connected;
        if let Some((topic, payload)) = self.session.handle_event(event) {
            if let Some(update) = self.update.as_mut() {
                if update.route(&topic, &payload) {
                    return;
                }
            }
            debug!(topic = %topic, "unexpected inbound message ignored");
            return;
        }

        let connected = self.session.state() == SessionState::Connected;
        if !connected {
            self.update_subscribed = false;
        } else if !was_connected && !self.update_subscribed {
            if let Some(update) = self.update.as_ref() {
                let topic = update.topic().to_string();
                if self.session.subscribe(&topic).is_ok() {
                    self.update_subscribed = true;
                }
            }
        }
    }

    /// Cooperative driver loop. Events are drained at every fast tick, then
    /// the pending reconnect (if any) is polled, then the tick work runs to
    /// completion. Cancellation stops the session before returning.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        shutdown: CancellationToken,
    ) {
        info!(
            sample_ms = self.config.sample_period.as_millis() as u64,
            status_ms = self.config.status_period.as_millis() as u64,
            flush_threshold = self.config.flush_threshold,
            "sampling scheduler started"
        );

        let mut fast = interval(self.config.sample_period);
        fast.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut slow = interval(self.config.status_period);
        slow.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.session.stop();
                    info!("sampling scheduler stopped");
                    return;
                }
                _ = fast.tick() => {
                    while let Ok(event) = events.try_recv() {
                        self.handle_transport_event(event);
                    }
                    self.session.poll_reconnect(Instant::now());
                    self.fast_tick();
                }
                _ = slow.tick() => {
                    self.slow_tick();
                }
            }
        }
    }
}
