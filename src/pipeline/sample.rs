use serde::{Deserialize, Serialize};

/// Which motion axes the configured sensor reports. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSet {
    /// Accelerometer only: x, y, z.
    Accel,
    /// Accelerometer + gyroscope: x, y, z, pitch, roll, yaw.
    AccelGyro,
}

impl AxisSet {
    pub fn count(&self) -> usize {
        match self {
            AxisSet::Accel => 3,
            AxisSet::AccelGyro => 6,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        match self {
            AxisSet::Accel => &["x", "y", "z"],
            AxisSet::AccelGyro => &["x", "y", "z", "pitch", "roll", "yaw"],
        }
    }
}

/// One timestamped multi-axis reading. Immutable once built; timestamps are
/// seconds on the device's monotonic clock, so consecutive samples never go
/// backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    timestamp: f64,
    values: Vec<f32>,
}

impl Sample {
    pub fn new(timestamp: f64, values: Vec<f32>) -> Self {
        Self { timestamp, values }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
