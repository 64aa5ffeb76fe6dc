use demo_core::config::{AppConfig, DEFAULT_AGENT_PORT, LogLevel};
use demo_core::error::config::ConfigError;

use log::LevelFilter;
use tempfile::TempDir;

#[test]
fn given_missing_file_when_loaded_then_defaults_are_returned() {
    let dir = TempDir::new().unwrap();

    let config = AppConfig::load(dir.path()).unwrap();

    assert_eq!(config.version, 1);
    assert_eq!(config.agent.listen_address, "0.0.0.0");
    assert_eq!(config.agent.port, DEFAULT_AGENT_PORT);
    assert!(config.agent.auth_token.is_none());
    assert!(config.worker.binary_path.is_none());
    assert_eq!(LevelFilter::from(config.logging.level), LevelFilter::Info);
}

#[test]
fn given_saved_config_when_loaded_then_values_survive() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.agent.port = 12000;
    config.agent.auth_token = Some(String::from("shared-secret"));
    config.logging.level = LogLevel::Debug;

    config.save(dir.path()).unwrap();
    let loaded = AppConfig::load(dir.path()).unwrap();

    assert_eq!(loaded.agent.port, 12000);
    assert_eq!(
        loaded.agent.auth_token().map(|token| token.as_str().to_string()),
        Some(String::from("shared-secret"))
    );
    assert_eq!(LevelFilter::from(loaded.logging.level), LevelFilter::Debug);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn given_partial_json_when_loaded_then_missing_sections_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "agent": { "auth_token": "abc" }, "logging": { "level": "trace" } }"#,
    )
    .unwrap();

    let config = AppConfig::load(dir.path()).unwrap();

    assert_eq!(config.agent.port, DEFAULT_AGENT_PORT);
    assert_eq!(config.agent.auth_token.as_deref(), Some("abc"));
    assert_eq!(LevelFilter::from(config.logging.level), LevelFilter::Trace);
}

#[test]
fn given_invalid_json_when_loaded_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    assert!(matches!(
        AppConfig::load(dir.path()),
        Err(ConfigError::ParseError { .. })
    ));
}

/// **VALUE**: Verifies that values the agent cannot run with are rejected up front.
///
/// **BUG THIS CATCHES**: An empty token would otherwise reach the listener, which then
/// refuses every controller without saying why.
#[test]
fn given_invalid_values_when_validated_then_validation_error() {
    let cases: Vec<Box<dyn Fn(&mut AppConfig)>> = vec![
        Box::new(|c| c.version = 0),
        Box::new(|c| c.version = 99),
        Box::new(|c| c.agent.listen_address = String::from("  ")),
        Box::new(|c| c.agent.port = 0),
        Box::new(|c| c.agent.auth_token = Some(String::new())),
        Box::new(|c| c.worker.binary_path = Some(std::path::PathBuf::new())),
    ];

    for mutate in cases {
        let mut config = AppConfig::default();
        mutate(&mut config);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

#[test]
fn given_invalid_config_when_saved_then_nothing_is_written() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.agent.port = 0;

    assert!(config.save(dir.path()).is_err());
    assert!(!dir.path().join("config.json").exists());
}
