use super::sample::Sample;
use crate::error::TelemetryError;

/// Append-only, bounded, insertion-ordered store for samples awaiting a
/// flush. Single writer: only the fast sampling tick touches it, so no
/// locking. Capacity is a hard bound — on overflow the offered sample is
/// dropped (drop-newest) and the event counted, never grown unbounded.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    overflows: u64,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            overflows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Overflow events since startup. Nonzero means the flush threshold is
    /// misconfigured relative to capacity.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Buffered samples in insertion order, without draining. Lets the
    /// encoder size-check a batch before the buffer commits to losing it.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Appends one sample, returning the new length. At capacity the sample
    /// is dropped and `Overflow` returned; already-buffered data is intact.
    pub fn append(&mut self, sample: Sample) -> Result<usize, TelemetryError> {
        if self.samples.len() >= self.capacity {
            self.overflows += 1;
            return Err(TelemetryError::Overflow {
                capacity: self.capacity,
            });
        }
        self.samples.push(sample);
        Ok(self.samples.len())
    }

    /// Takes every buffered sample in insertion order and resets the buffer
    /// to empty. In the single-writer tick model this is atomic with respect
    /// to `append`: no sample is lost or duplicated across the boundary.
    pub fn drain(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.samples)
    }
}
