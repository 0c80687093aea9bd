use std::time::Instant;

use crate::error::SensorError;
use crate::pipeline::sample::{AxisSet, Sample};

/// Identity of a discrete probe on the shared bus (8-byte bus address).
/// Its telemetry channel is the address rendered as lower-case hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxSensorId {
    address: [u8; 8],
}

impl AuxSensorId {
    pub fn new(address: [u8; 8]) -> Self {
        Self { address }
    }

    pub fn channel(&self) -> String {
        self.address.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Hardware seam. Register-level I/O lives behind this trait; the pipeline
/// only sees timestamped samples and scalar probe readings. Any failure is
/// transient by contract.
pub trait SensorDriver {
    /// One motion sample, stamped from the device's monotonic clock.
    fn read_sample(&mut self) -> Result<Sample, SensorError>;

    /// Probes currently visible on the shared bus.
    fn auxiliary_ids(&mut self) -> Vec<AuxSensorId>;

    /// One reading (degrees C) from a discrete probe.
    fn read_auxiliary(&mut self, id: &AuxSensorId) -> Result<f32, SensorError>;

    /// Device-internal temperature, for the health channel.
    fn read_internal_temp(&mut self) -> Result<f32, SensorError>;
}

/// Deterministic waveform generator standing in for the real accelerometer.
/// Used by the demo binary; real hardware plugs in through `SensorDriver`.
#[derive(Debug)]
pub struct SyntheticDriver {
    epoch: Instant,
    axes: AxisSet,
    probes: Vec<AuxSensorId>,
}

impl SyntheticDriver {
    pub fn new(axes: AxisSet) -> Self {
        Self {
            epoch: Instant::now(),
            axes,
            probes: vec![AuxSensorId::new([0x28, 0xff, 0x64, 0x1e, 0x0f, 0x00, 0x00, 0x01])],
        }
    }
}

impl SensorDriver for SyntheticDriver {
    fn read_sample(&mut self) -> Result<Sample, SensorError> {
        let t = self.epoch.elapsed().as_secs_f64();
        let values = (0..self.axes.count())
            .map(|axis| {
                let phase = t * 2.0 * std::f64::consts::PI + axis as f64;
                (phase.sin() * 9.81) as f32
            })
            .collect();
        Ok(Sample::new(t, values))
    }

    fn auxiliary_ids(&mut self) -> Vec<AuxSensorId> {
        self.probes.clone()
    }

    fn read_auxiliary(&mut self, _id: &AuxSensorId) -> Result<f32, SensorError> {
        let t = self.epoch.elapsed().as_secs_f64();
        Ok(21.5 + (t / 60.0).sin() as f32)
    }

    fn read_internal_temp(&mut self) -> Result<f32, SensorError> {
        Ok(38.2)
    }
}
