pub mod config;
pub mod error;
pub mod pipeline;
pub mod sensor;
pub mod transport;
pub mod update;

// Re-export the pieces callers wire together at startup.
pub use config::NodeConfig;
pub use error::{SensorError, TelemetryError, TransportError};
pub use pipeline::buffer::SampleBuffer;
pub use pipeline::encode::{Batch, BatchEncoder};
pub use pipeline::sample::{AxisSet, Sample};
pub use pipeline::scheduler::{SamplingScheduler, SchedulerConfig};
pub use pipeline::session::{SessionConfig, SessionState, TelemetrySession};
pub use pipeline::topic::NodeIdentity;
