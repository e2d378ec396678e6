//! Configuration loading from files and environment overrides

use medstock::config::{AppConfig, AuthMode, CONFIG_PATH_VAR, StorageBackend};
use medstock::core::error::ConfigError;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes()).expect("Failed to write config");
    file
}

fn lookup(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<&'static str, String> = pairs.into_iter().collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_full_file() {
    let file = write_config(
        r#"
server:
  host: 0.0.0.0
  port: 8088
storage:
  backend: mongodb
  uri: mongodb://db.internal:27017
  database: clinic
  seed_demo_data: false
auth:
  mode: demo
  demo_user:
    id: field-lead
    name: Field Lead
    email: lead@jsf.org
    role: coordinator
dashboard:
  expiry_window_days: 14
  recent_limit: 8
"#,
    );

    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.server.address(), "0.0.0.0:8088");
    assert_eq!(config.storage.backend, StorageBackend::Mongodb);
    assert_eq!(config.storage.database, "clinic");
    assert!(!config.storage.seed_demo_data);
    assert_eq!(config.auth.demo_user.id, "field-lead");
    assert_eq!(config.auth.demo_user.role.as_str(), "coordinator");
    assert_eq!(config.dashboard.settings().recent_limit, 8);
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config("server:\n  port: 8088\nauth:\n  mode: demo\n");
    let path = file.path().to_str().unwrap().to_string();

    let config = AppConfig::load_with(lookup(vec![
        (CONFIG_PATH_VAR, path),
        ("MEDSTOCK_PORT", "9999".to_string()),
        ("MEDSTOCK_AUTH_MODE", "trusted_headers".to_string()),
    ]))
    .unwrap();

    assert_eq!(config.server.port, 9999);
    assert_eq!(config.auth.mode, AuthMode::TrustedHeaders);
}

#[test]
fn test_parse_error_names_the_file() {
    let file = write_config("server: [oops");
    let path = file.path().to_str().unwrap().to_string();

    match AppConfig::from_yaml_file(&path).unwrap_err() {
        ConfigError::ParseError { file, .. } => assert_eq!(file, Some(path)),
        other => panic!("expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_unknown_backend_in_file_is_rejected() {
    let file = write_config("storage:\n  backend: postgres\n");

    let err = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_unknown_auth_mode_in_environment_is_rejected() {
    let err = AppConfig::load_with(lookup(vec![("MEDSTOCK_AUTH_MODE", "oauth".to_string())]))
        .unwrap_err();

    match err {
        ConfigError::InvalidValue { field, value, .. } => {
            assert_eq!(field, "MEDSTOCK_AUTH_MODE");
            assert_eq!(value, "oauth");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_mongodb_without_uri_is_rejected() {
    let err = AppConfig::from_yaml_str("storage:\n  backend: mongodb\n  uri: \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
