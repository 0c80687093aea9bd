use oscilla::{Sample, SampleBuffer, TelemetryError};

fn sample(t: f64) -> Sample {
    Sample::new(t, vec![1.0, 2.0, 3.0])
}

#[test]
fn drain_returns_appended_samples_in_insertion_order() {
    let mut buffer = SampleBuffer::new(8);
    for i in 0..5 {
        buffer.append(sample(i as f64 * 0.02)).unwrap();
    }
    assert_eq!(buffer.len(), 5);

    let drained = buffer.drain();
    assert_eq!(drained.len(), 5);
    for (i, s) in drained.iter().enumerate() {
        assert_eq!(s.timestamp(), i as f64 * 0.02, "insertion order preserved");
    }
    assert!(buffer.is_empty(), "buffer must be empty right after drain");
}

#[test]
fn buffer_is_reusable_after_drain() {
    let mut buffer = SampleBuffer::new(4);
    buffer.append(sample(0.0)).unwrap();
    let _ = buffer.drain();

    buffer.append(sample(1.0)).unwrap();
    let drained = buffer.drain();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].timestamp(), 1.0, "no leftovers from the previous run");
}

#[test]
fn append_beyond_capacity_drops_newest_and_keeps_existing() {
    let mut buffer = SampleBuffer::new(3);
    for i in 0..3 {
        buffer.append(sample(i as f64)).unwrap();
    }

    let err = buffer.append(sample(99.0)).unwrap_err();
    assert!(
        matches!(err, TelemetryError::Overflow { capacity: 3 }),
        "expected Overflow, got {err:?}"
    );
    assert_eq!(buffer.overflows(), 1);

    // Existing samples are not corrupted and the rejected one never landed.
    let drained = buffer.drain();
    assert_eq!(drained.len(), 3);
    assert_eq!(drained[2].timestamp(), 2.0);
}

#[test]
fn drain_on_empty_buffer_yields_nothing() {
    let mut buffer = SampleBuffer::new(4);
    assert!(buffer.drain().is_empty());
    assert_eq!(buffer.overflows(), 0);
}
