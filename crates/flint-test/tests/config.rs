//! Engine configuration loaded from files.

use std::time::Duration;

use flint_common::{EngineConfig, FlintError};
use flint_session::Engine;
use flint_test::fixtures::{self, people};
use tempfile::TempDir;

#[test]
fn test_engine_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flint.toml");

    let config = EngineConfig::builder()
        .batch_size(2)
        .case_sensitive(true)
        .slow_query_threshold(Duration::from_millis(250))
        .build();
    config.save(&path).unwrap();

    let loaded = EngineConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let engine = Engine::new(loaded).unwrap();
    let session = engine.create_session();
    session.create_or_replace_temp_view("people", people()).unwrap();
    assert_eq!(
        session.execute_direct(&fixtures::group_count()).unwrap().to_string(),
        "[0,2],[1,3]"
    );

    session.create_or_replace_temp_view("People", people()).unwrap();
    assert_eq!(session.temp_view_names().unwrap(), vec!["People", "people"]);
}

#[test]
fn test_partial_config_file() {
    let config = EngineConfig::from_toml_str(
        r#"
        query_logging = true
        slow_query_threshold = "2s"

        [execution]
        batch_size = 16
        "#,
    )
    .unwrap();
    assert_eq!(config.execution.batch_size, 16);
    assert_eq!(config.slow_query_threshold, Duration::from_secs(2));
    assert!(!config.catalog.case_sensitive);
    assert!(Engine::new(config).is_ok());
}

#[test]
fn test_invalid_config_rejected() {
    assert!(EngineConfig::from_toml_str("[execution]\nbatch_size = 0\n").is_err());

    let mut config = EngineConfig::default();
    config.execution.batch_size = 0;
    assert!(matches!(
        Engine::new(config),
        Err(FlintError::InvalidConfig { .. })
    ));
}
