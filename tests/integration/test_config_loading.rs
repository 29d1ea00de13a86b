use pipeshift::core::config::PipeshiftConfig;
use pipeshift::core::types::{Dialect, ErrorCategory};
use pipeshift::logging::config::LoggingConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_explicit_config_loads_all_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeshift.toml");
    fs::write(
        &path,
        r#"
[translate]
default_dialect = "groovy-pipeline"

[rules]
bundle = "team-rules.yaml"

[logging]
default_level = "debug"
enable_file = false
"#,
    )
    .unwrap();

    let config = PipeshiftConfig::load(Some(&path)).unwrap();
    assert_eq!(config.translate.default_dialect, Dialect::GroovyPipeline);
    assert_eq!(config.rules.bundle, Some(PathBuf::from("team-rules.yaml")));

    let logging = LoggingConfig::load(Some(&path)).unwrap();
    assert_eq!(logging.default_level, "debug");
    assert!(!logging.enable_file);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let err = PipeshiftConfig::load(Some(std::path::Path::new("/nonexistent/pipeshift.toml")))
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::IoError);
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeshift.toml");
    fs::write(&path, "[rules]\nbundle = \"only-rules.yaml\"\n").unwrap();

    let config = PipeshiftConfig::load(Some(&path)).unwrap();
    assert_eq!(config.translate.default_dialect, Dialect::WorkflowYaml);
    assert_eq!(config.rules.bundle, Some(PathBuf::from("only-rules.yaml")));
}

#[test]
fn test_invalid_dialect_in_config_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeshift.toml");
    fs::write(&path, "[translate]\ndefault_dialect = \"makefile\"\n").unwrap();

    let err = PipeshiftConfig::load(Some(&path)).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
}

#[test]
fn test_logging_defaults_without_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let logging = LoggingConfig::load(Some(&path)).unwrap();
    assert_eq!(logging.default_level, "info");
    assert!(!logging.enable_file);
    assert!(logging.log_dir.is_none());
}

#[test]
fn test_logging_rejects_invalid_directive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeshift.toml");
    fs::write(&path, "[logging]\ndefault_level = \"not a directive!!\"\n").unwrap();
    assert!(LoggingConfig::load(Some(&path)).is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = PipeshiftConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    let parsed: PipeshiftConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(
        parsed.translate.default_dialect,
        config.translate.default_dialect
    );
}
