use serde_json::{json, Value};
use uuid::Uuid;

use super::sample::{AxisSet, Sample};
use crate::error::TelemetryError;

// Worst-case token widths for serde_json's shortest-roundtrip (ryu) output.
// f64 bottoms out around "-2.2250738585072014e-308". Axis values budget the
// same width: serde_json stores numbers as f64, so an f32 like 0.1 widens to
// 0.10000000149011612 before printing.
const F64_TOKEN_MAX: usize = 25;
const F32_TOKEN_MAX: usize = F64_TOKEN_MAX;
const ENVELOPE_OVERHEAD: usize = "{\"data\":[]}".len();

/// An encoded, ready-to-publish snapshot of a drained buffer. Lives exactly
/// as long as the publish attempt: batches are never retried.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: Uuid,
    pub channel: String,
    pub payload: String,
    pub records: usize,
}

/// Turns a run of samples into the self-describing wire form: a top-level
/// `data` array, one object per sample, each carrying `timestamp` plus one
/// field per configured axis.
#[derive(Debug, Clone)]
pub struct BatchEncoder {
    axes: AxisSet,
    ceiling: usize,
}

impl BatchEncoder {
    pub fn new(axes: AxisSet, ceiling: usize) -> Self {
        Self { axes, ceiling }
    }

    pub fn axes(&self) -> AxisSet {
        self.axes
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Worst-case encoded size for `records` samples. Deliberately
    /// pessimistic so the check runs before any JSON is built.
    pub fn estimate_size(&self, records: usize) -> usize {
        let mut per_record = 2; // braces
        per_record += "\"timestamp\":".len() + F64_TOKEN_MAX;
        for name in self.axes.names() {
            // ,"name":<value>
            per_record += 1 + name.len() + 3 + F32_TOKEN_MAX;
        }
        let commas = records.saturating_sub(1);
        ENVELOPE_OVERHEAD + records * per_record + commas
    }

    /// Encodes `samples` for `channel`. Fails with `PayloadTooLarge` before
    /// constructing anything if the worst-case size exceeds the ceiling, so
    /// a doomed encode costs nothing and loses nothing.
    pub fn encode(&self, channel: &str, samples: &[Sample]) -> Result<Batch, TelemetryError> {
        let estimated = self.estimate_size(samples.len());
        if estimated > self.ceiling {
            return Err(TelemetryError::PayloadTooLarge {
                estimated,
                ceiling: self.ceiling,
            });
        }

        let names = self.axes.names();
        let mut data = Vec::with_capacity(samples.len());
        for sample in samples {
            let mut record = serde_json::Map::new();
            record.insert("timestamp".to_string(), json!(sample.timestamp()));
            for (name, value) in names.iter().zip(sample.values()) {
                record.insert((*name).to_string(), json!(value));
            }
            data.push(Value::Object(record));
        }

        let payload = json!({ "data": data }).to_string();
        Ok(Batch {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            payload,
            records: samples.len(),
        })
    }
}
