use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use oscilla::pipeline::scheduler::{SamplingScheduler, SchedulerConfig};
use oscilla::pipeline::session::{SessionConfig, TelemetrySession};
use oscilla::sensor::SyntheticDriver;
use oscilla::transport::{Credentials, LoopbackTransport};
use oscilla::update::{UpdateChannel, UpdateSink};
use oscilla::{BatchEncoder, NodeConfig, NodeIdentity, SampleBuffer};

/// Demo sink: counts update bytes, flashes nothing.
struct NullUpdateSink {
    received: usize,
}

impl UpdateSink for NullUpdateSink {
    fn payload(&mut self, bytes: &[u8]) {
        self.received += bytes.len();
        info!(total = self.received, "update bytes received (discarded)");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    info!("oscilla sensor node booting");

    let mut config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::from_file("oscilla.json").unwrap_or_else(|_| demo_config()),
    };
    config.apply_env();
    config.validate()?;

    let identity = NodeIdentity::new(&config.node_id, &config.chip_id)?;
    let (events_tx, events_rx) = mpsc::channel(64);

    // The demo harness runs against the loopback transport; a real broker
    // client plugs in behind the same Transport trait.
    let transport = LoopbackTransport::new(events_tx);
    let session = TelemetrySession::new(
        transport,
        identity,
        SessionConfig {
            server_url: config.server_url.clone(),
            credentials: Credentials {
                user: config.user.clone(),
                password: config.password.clone(),
            },
            reconnect_backoff: config.reconnect_backoff(),
        },
    );

    let update = UpdateChannel::new(
        &config.node_id,
        &config.app_version,
        Box::new(NullUpdateSink { received: 0 }),
    );

    let mut scheduler = SamplingScheduler::new(
        SyntheticDriver::new(config.axes),
        SampleBuffer::new(config.buffer_capacity),
        BatchEncoder::new(config.axes, config.payload_ceiling),
        session,
        Some(update),
        SchedulerConfig {
            sample_period: config.sample_period(),
            status_period: config.status_period(),
            flush_threshold: config.flush_threshold,
        },
    );
    scheduler.start()?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
        signal.cancel();
    });

    scheduler.run(events_rx, shutdown).await;
    Ok(())
}

fn demo_config() -> NodeConfig {
    serde_json::from_value(serde_json::json!({
        "server_url": "broker.local:1883",
        "user": "demo",
        "password": "demo",
        "node_id": "oscilla",
        "chip_id": "deadbeef",
    }))
    .expect("demo config is well-formed")
}
