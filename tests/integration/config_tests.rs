//! Configuration loading from files and variables

use logflow::Config;
use logflow::config::{BufferBackend, PipelineConfig};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_yaml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let file = write_yaml(
        r#"
server:
  port: 9090
worker:
  batch_size: 10
processing:
  per_char_delay_ms: 0
"#,
    );

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.server().port, 9090);
    assert_eq!(config.server().host, "0.0.0.0");
    assert_eq!(config.worker().batch_size, 10);
    assert_eq!(config.processing().per_char_delay_ms, 0);
    assert_eq!(config.buffer().backend, BufferBackend::Memory);
    assert_eq!(config.ingest().tenant_header, "x-tenant-id");
}

#[tokio::test]
async fn test_file_with_impossible_budget_is_rejected() {
    let file = write_yaml(
        r#"
buffer:
  visibility_timeout_secs: 60
worker:
  batch_timeout_ms: 120000
"#,
    );

    let err = Config::from_file(file.path()).await.unwrap_err();
    assert!(err.to_string().contains("visibility timeout"));
}

#[tokio::test]
async fn test_oversized_batch_is_rejected() {
    let file = write_yaml("worker:\n  batch_size: 11\n");
    assert!(Config::from_file(file.path()).await.is_err());
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.yaml"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_variables_override_file_values() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("LOGFLOW_PORT", "7000"),
        ("LOGFLOW_BATCH_SIZE", "3"),
        ("LOGFLOW_TENANT_HEADER", "x-org"),
    ]);
    let mut pipeline: PipelineConfig =
        serde_yaml::from_str("server:\n  port: 9090\nworker:\n  batch_size: 10\n").unwrap();

    pipeline
        .apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(pipeline.server.port, 7000);
    assert_eq!(pipeline.worker.batch_size, 3);
    assert_eq!(pipeline.ingest.tenant_header, "x-org");
}

#[test]
fn test_unparseable_variable_names_the_key() {
    let mut pipeline = PipelineConfig::default();
    let err = pipeline
        .apply_overrides_from(|key| (key == "LOGFLOW_PORT").then(|| "eighty".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("LOGFLOW_PORT"));
}

#[test]
fn test_yaml_round_trip_preserves_settings() {
    let mut config = Config::default();
    config.pipeline.worker.record_concurrency = 2;
    let yaml = config.to_yaml().unwrap();
    let parsed: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.worker.record_concurrency, 2);
}
