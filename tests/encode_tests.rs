use oscilla::{AxisSet, BatchEncoder, Sample, TelemetryError};
use serde_json::Value;

fn samples(count: usize, axes: AxisSet) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let values = (0..axes.count()).map(|a| (i * 10 + a) as f32).collect();
            Sample::new(i as f64 * 0.02, values)
        })
        .collect()
}

fn parse_data(payload: &str) -> Vec<Value> {
    let doc: Value = serde_json::from_str(payload).expect("payload is valid JSON");
    doc["data"].as_array().expect("top-level data array").clone()
}

#[test]
fn three_axis_batch_has_one_record_per_sample_with_four_fields() {
    let encoder = BatchEncoder::new(AxisSet::Accel, 16 * 1024);
    let batch = encoder.encode("accel", &samples(7, AxisSet::Accel)).unwrap();

    assert_eq!(batch.records, 7);
    assert_eq!(batch.channel, "accel");

    let data = parse_data(&batch.payload);
    assert_eq!(data.len(), 7);
    for record in &data {
        let obj = record.as_object().unwrap();
        assert_eq!(obj.len(), 4, "timestamp + x,y,z");
        for field in ["timestamp", "x", "y", "z"] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
    }
}

#[test]
fn six_axis_batch_carries_gyro_field_names() {
    let encoder = BatchEncoder::new(AxisSet::AccelGyro, 16 * 1024);
    let batch = encoder
        .encode("accel", &samples(3, AxisSet::AccelGyro))
        .unwrap();

    let data = parse_data(&batch.payload);
    assert_eq!(data.len(), 3);
    for record in &data {
        let obj = record.as_object().unwrap();
        assert_eq!(obj.len(), 7, "timestamp + 6 axes");
        for field in ["timestamp", "x", "y", "z", "pitch", "roll", "yaw"] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
    }
}

#[test]
fn encoding_is_deterministic() {
    let encoder = BatchEncoder::new(AxisSet::Accel, 16 * 1024);
    let input = samples(10, AxisSet::Accel);
    let a = encoder.encode("accel", &input).unwrap();
    let b = encoder.encode("accel", &input).unwrap();
    assert_eq!(a.payload, b.payload, "same samples must encode identically");
}

#[test]
fn size_estimate_is_an_upper_bound_on_the_real_payload() {
    let encoder = BatchEncoder::new(AxisSet::AccelGyro, 1024 * 1024);
    for count in [0, 1, 5, 50] {
        let input = samples(count, AxisSet::AccelGyro);
        let batch = encoder.encode("accel", &input).unwrap();
        assert!(
            encoder.estimate_size(count) >= batch.payload.len(),
            "estimate for {count} records must cover the encoded size"
        );
    }
}

#[test]
fn size_estimate_covers_fractional_values_and_long_timestamps() {
    // 0.1f32 widens through f64 to 0.10000000149011612 on the wire, and a
    // long-uptime monotonic timestamp prints near the full f64 width. The
    // estimate must still dominate the real payload.
    let encoder = BatchEncoder::new(AxisSet::AccelGyro, 1024 * 1024);
    let input: Vec<Sample> = (0..10)
        .map(|i| Sample::new(1024.235_587_234_948_3 + i as f64 * 0.02, vec![0.1_f32; 6]))
        .collect();

    let batch = encoder.encode("accel", &input).unwrap();
    assert!(
        encoder.estimate_size(input.len()) >= batch.payload.len(),
        "estimate {} must cover the {} byte payload",
        encoder.estimate_size(input.len()),
        batch.payload.len()
    );

    // A ceiling set exactly to the estimate must never let a larger payload
    // through: whatever encode accepts fits the transport.
    let tight = BatchEncoder::new(AxisSet::AccelGyro, encoder.estimate_size(input.len()));
    let batch = tight.encode("accel", &input).unwrap();
    assert!(batch.payload.len() <= tight.ceiling());
}

#[test]
fn oversized_batch_is_rejected_before_encoding() {
    // 100 six-axis samples against a few-KB ceiling cannot fit.
    let encoder = BatchEncoder::new(AxisSet::AccelGyro, 4096);
    let err = encoder
        .encode("accel", &samples(100, AxisSet::AccelGyro))
        .unwrap_err();
    match err {
        TelemetryError::PayloadTooLarge { estimated, ceiling } => {
            assert_eq!(ceiling, 4096);
            assert!(estimated > ceiling);
        }
        other => panic!("expected PayloadTooLarge, got {other:?}"),
    }
}

#[test]
fn empty_batch_encodes_to_an_empty_data_array() {
    let encoder = BatchEncoder::new(AxisSet::Accel, 4096);
    let batch = encoder.encode("accel", &[]).unwrap();
    assert_eq!(batch.records, 0);
    assert!(parse_data(&batch.payload).is_empty());
}
