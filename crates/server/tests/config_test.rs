//! # Configuration Tests
//!
//! Loading `AppConfig` from YAML files and environment variables. The tests
//! touch process-wide environment variables and therefore run serially.

use prodmatch_server::config::{get_config, ConfigError};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

const TEST_VARS: &[&str] = &[
    "PORT",
    "DB_URL",
    "PRODMATCH_TEST_VISION_KEY",
    "PRODMATCH_EBAY__APP_ID",
    "PRODMATCH_MATCHING__RESULT_LIMIT",
];

/// Clears every variable these tests set, before and after each test.
fn clear_env_vars() {
    for var in TEST_VARS {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yml");
    fs::write(&path, content).expect("write config");
    let path = path.to_str().expect("utf-8 path").to_string();
    (dir, path)
}

#[test]
#[serial]
fn test_defaults_fill_missing_sections() {
    clear_env_vars();
    let (_dir, path) = write_config("db_url: \"test.db\"\n");

    let config = get_config(Some(&path)).expect("Configuration should load successfully");

    assert_eq!(config.port, 9090);
    assert_eq!(config.db_url, "test.db");
    assert_eq!(config.media_root, "media");
    assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(
        config.vision.api_url,
        "https://vision.googleapis.com/v1/images:annotate"
    );
    assert_eq!(config.ebay.global_id, "EBAY-US");
    assert!(config.ebay.oauth_token.is_none());
    assert_eq!(config.matching.query.top_n, 3);
    assert_eq!(config.matching.query.min_confidence, 0.8);
    assert_eq!(config.matching.result_limit, 10);
    assert_eq!(config.matching.sort_order, "BestMatch");
    assert_eq!(config.report.options.max_similar_images, 5);
    assert_eq!(config.report.reachability_timeout_ms, 3000);
    clear_env_vars();
}

#[test]
#[serial]
fn test_placeholders_are_substituted_from_env() {
    clear_env_vars();
    env::set_var("PRODMATCH_TEST_VISION_KEY", "secret-key");
    let (_dir, path) = write_config(
        r#"
vision:
  api_key: "${PRODMATCH_TEST_VISION_KEY}"
ebay:
  app_id: "${PRODMATCH_TEST_UNSET_VAR}"
"#,
    );

    let config = get_config(Some(&path)).expect("Configuration should load successfully");

    assert_eq!(config.vision.api_key, "secret-key");
    assert_eq!(config.ebay.app_id, "");
    clear_env_vars();
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env_vars();
    env::set_var("PORT", "9999");
    env::set_var("DB_URL", "from-env.db");
    env::set_var("PRODMATCH_EBAY__APP_ID", "env-app");
    env::set_var("PRODMATCH_MATCHING__RESULT_LIMIT", "25");
    let (_dir, path) = write_config(
        r#"
port: 8080
db_url: "from-file.db"
ebay:
  app_id: "file-app"
matching:
  result_limit: 5
  sort_order: "PricePlusShippingLowest"
"#,
    );

    let config = get_config(Some(&path)).expect("Configuration should load successfully");

    assert_eq!(config.port, 9999);
    assert_eq!(config.db_url, "from-env.db");
    assert_eq!(config.ebay.app_id, "env-app");
    assert_eq!(config.matching.result_limit, 25);
    assert_eq!(config.matching.sort_order, "PricePlusShippingLowest");
    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_not_found() {
    clear_env_vars();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.yml");

    let result = get_config(path.to_str());

    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("absent.yml"));
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    clear_env_vars();
    env::set_var("PORT", "not-a-number");
    let (_dir, path) = write_config("db_url: \"test.db\"\n");

    let err = get_config(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::General(_)));
    assert!(err.to_string().starts_with("Configuration error: "));
    clear_env_vars();
}
