use oscilla::{AxisSet, NodeConfig, TelemetryError};

fn base_config() -> NodeConfig {
    serde_json::from_value(serde_json::json!({
        "server_url": "broker.local:1883",
        "user": "node",
        "password": "secret",
        "node_id": "oscilla",
        "chip_id": "deadbeef",
    }))
    .unwrap()
}

#[test]
fn defaults_produce_a_valid_configuration() {
    let config = base_config();
    config.validate().expect("defaults must be coherent");
    assert_eq!(config.flush_threshold, 50);
    assert_eq!(config.sample_period_ms, 20);
    assert_eq!(config.status_period_ms, 10_000);
    assert!(matches!(config.axes, AxisSet::Accel));
}

#[test]
fn missing_credentials_fail_validation() {
    let mut config = base_config();
    config.password.clear();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, TelemetryError::ConfigurationInvalid(_)));
}

#[test]
fn flush_threshold_must_fit_the_buffer() {
    let mut config = base_config();
    config.buffer_capacity = 10;
    config.flush_threshold = 11;
    assert!(config.validate().is_err());
}

#[test]
fn flush_threshold_must_encode_under_the_payload_ceiling() {
    let mut config = base_config();
    config.axes = AxisSet::AccelGyro;
    config.payload_ceiling = 1024;
    // 50 six-axis records cannot fit one KB, worst case.
    let err = config.validate().unwrap_err();
    assert!(matches!(err, TelemetryError::ConfigurationInvalid(_)));
}

#[test]
fn oversized_identity_is_rejected_at_validation() {
    let mut config = base_config();
    config.node_id = "n".repeat(200);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, TelemetryError::TopicTooLong { .. }));
}

#[test]
fn config_loads_from_a_json_file() {
    let path = std::env::temp_dir().join("oscilla_config_test.json");
    std::fs::write(
        &path,
        r#"{
            "server_url": "broker.local:1883",
            "user": "node",
            "password": "secret",
            "node_id": "oscilla",
            "chip_id": "deadbeef",
            "axes": "accel_gyro",
            "flush_threshold": 25
        }"#,
    )
    .unwrap();

    let config = NodeConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(matches!(config.axes, AxisSet::AccelGyro));
    assert_eq!(config.flush_threshold, 25);
    config.validate().unwrap();
}
