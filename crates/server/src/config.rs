//! # Application Configuration
//!
//! This module defines the configuration structure for the `prodmatch-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use prodmatch::{MatchOptions, ReportOptions};
use prodmatch_ebay::{DEFAULT_FINDING_URL, DEFAULT_SHOPPING_URL};
use prodmatch_vision::DEFAULT_API_URL as DEFAULT_VISION_URL;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Directory uploaded product photos are written under.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// Upper bound for multipart request bodies, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub ebay: EbayConfig,
    /// Query and search settings for `POST /upload`.
    #[serde(default)]
    pub matching: MatchOptions,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    "db/prodmatch.db".to_string()
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Settings for the image-recognition service.
#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    #[serde(default = "default_vision_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
}

fn default_vision_url() -> String {
    DEFAULT_VISION_URL.to_string()
}

fn default_vision_timeout() -> u64 {
    30
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: default_vision_url(),
            api_key: String::new(),
            timeout_secs: default_vision_timeout(),
        }
    }
}

/// Settings for the eBay Finding and Shopping APIs.
#[derive(Debug, Deserialize, Clone)]
pub struct EbayConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default = "default_finding_url")]
    pub finding_url: String,
    #[serde(default = "default_shopping_url")]
    pub shopping_url: String,
    #[serde(default = "default_global_id")]
    pub global_id: String,
    #[serde(default = "default_site_id")]
    pub site_id: String,
    /// Optional user token sent with Shopping API calls.
    #[serde(default)]
    pub oauth_token: Option<String>,
    #[serde(default = "default_ebay_timeout")]
    pub timeout_secs: u64,
}

fn default_finding_url() -> String {
    DEFAULT_FINDING_URL.to_string()
}

fn default_shopping_url() -> String {
    DEFAULT_SHOPPING_URL.to_string()
}

fn default_global_id() -> String {
    "EBAY-US".to_string()
}

fn default_site_id() -> String {
    "0".to_string()
}

fn default_ebay_timeout() -> u64 {
    15
}

impl Default for EbayConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            finding_url: default_finding_url(),
            shopping_url: default_shopping_url(),
            global_id: default_global_id(),
            site_id: default_site_id(),
            oauth_token: None,
            timeout_secs: default_ebay_timeout(),
        }
    }
}

/// Settings for `POST /test-vision`.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub options: ReportOptions,
    /// Timeout for the HEAD request made per similar image.
    #[serde(default = "default_reachability_timeout")]
    pub reachability_timeout_ms: u64,
}

fn default_reachability_timeout() -> u64 {
    3000
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            options: ReportOptions::default(),
            reachability_timeout_ms: default_reachability_timeout(),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded_content = ENV_PLACEHOLDER.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - An explicit path must exist. Without one, `config.yml` next to the server
///   manifest is used when present, otherwise only defaults and env apply.
/// - `${VAR}` placeholders in the file are replaced from the environment.
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `PRODMATCH_...` variables (e.g., `PRODMATCH_EBAY__APP_ID`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            if let Some(content) = read_and_substitute(&default_path)? {
                info!("Loading configuration from '{default_path}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{default_path}' not found. Using defaults and environment only.");
            }
        }
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("PRODMATCH")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
