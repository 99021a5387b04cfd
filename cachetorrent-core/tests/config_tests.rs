use cachetorrent_core::{error::ElectionError, Config};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.election.quorum_limit, 100);
    assert_eq!(config.election.leader_percent, 10);
    assert_eq!(config.election.layers, 1);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn test_load_from_toml() {
    let toml_content = r#"
[election]
quorum_limit = 250
leader_percent = 25
layers = 3

[logging]
level = "warn"
format = "json"
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml_content.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.election.quorum_limit, 250);
    assert_eq!(config.election.leader_percent, 25);
    assert_eq!(config.election.layers, 3);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_invalid_values_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[election]\nleader_percent = 150\n").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ElectionError::InvalidConfiguration { .. }));
}

#[test]
fn test_malformed_toml() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[election\nquorum_limit = 1\n").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ElectionError::TomlError(_)));
}

#[test]
fn test_missing_file() {
    let err = Config::from_file("/nonexistent/cachetorrent.toml").unwrap_err();
    assert!(matches!(err, ElectionError::ConfigError(_)));
}

#[test]
fn test_shipped_example_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../cachetorrent/config/example.toml");
    let config = Config::from_toml_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.election, cachetorrent_core::ElectionConfig::default());
}
