//! The telemetry buffering-and-publish pipeline.
//!
//! Samples flow one way: the fast tick reads the sensor and appends to the
//! [`buffer::SampleBuffer`]; at the flush threshold the
//! [`encode::BatchEncoder`] turns the run into one bounded message, which
//! the [`session::TelemetrySession`] publishes on an identity-scoped topic.
//! Everything runs on a single cooperative context — see
//! [`scheduler::SamplingScheduler`].

pub mod buffer;
pub mod encode;
pub mod sample;
pub mod scheduler;
pub mod session;
pub mod topic;
