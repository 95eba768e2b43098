//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! database provider and the external service clients, making them
//! accessible to all request handlers.

use crate::config::AppConfig;
use prodmatch::providers::{
    db::sqlite::SqliteProvider, HttpReachabilityChecker, ItemDetailsProvider, MarketplaceSearch,
    ReachabilityChecker, VisionProvider,
};
use prodmatch_ebay::{FindingClient, ShoppingClient};
use prodmatch_vision::GoogleVisionProvider;
use std::{path::PathBuf, sync::Arc, time::Duration};

/// The external services a request handler talks to.
#[derive(Clone, Debug)]
pub struct Collaborators {
    pub vision: Box<dyn VisionProvider>,
    pub marketplace: Box<dyn MarketplaceSearch>,
    pub item_details: Box<dyn ItemDetailsProvider>,
    pub reachability: Box<dyn ReachabilityChecker>,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    pub sqlite_provider: Arc<SqliteProvider>,
    pub collaborators: Arc<Collaborators>,
}

impl AppState {
    /// Assembles a state from already constructed parts.
    pub fn new(
        config: AppConfig,
        sqlite_provider: SqliteProvider,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sqlite_provider: Arc::new(sqlite_provider),
            collaborators: Arc::new(collaborators),
        }
    }

    /// Directory holding uploaded product photos.
    pub fn product_image_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.media_root).join("product_images")
    }
}

/// Builds the Google Vision and eBay clients described by the configuration.
pub fn build_collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    if config.vision.api_key.is_empty() {
        return Err(anyhow::anyhow!(
            "vision.api_key is required. Set GOOGLE_VISION_API_KEY in your .env file."
        ));
    }
    if config.ebay.app_id.is_empty() {
        return Err(anyhow::anyhow!(
            "ebay.app_id is required. Set EBAY_APP_ID in your .env file."
        ));
    }

    let vision = GoogleVisionProvider::new(
        config.vision.api_url.clone(),
        config.vision.api_key.clone(),
        Duration::from_secs(config.vision.timeout_secs),
    )?;
    let ebay_timeout = Duration::from_secs(config.ebay.timeout_secs);
    let marketplace = FindingClient::new(
        config.ebay.finding_url.clone(),
        config.ebay.app_id.clone(),
        config.ebay.global_id.clone(),
        ebay_timeout,
    )?;
    let item_details = ShoppingClient::new(
        config.ebay.shopping_url.clone(),
        config.ebay.app_id.clone(),
        config.ebay.site_id.clone(),
        config.ebay.oauth_token.clone(),
        ebay_timeout,
    )?;
    let reachability = HttpReachabilityChecker::new(Duration::from_millis(
        config.report.reachability_timeout_ms,
    ))?;

    Ok(Collaborators {
        vision: Box::new(vision),
        marketplace: Box::new(marketplace),
        item_details: Box::new(item_details),
        reachability: Box::new(reachability),
    })
}

/// Builds the shared application state from the configuration.
///
/// This opens the SQLite database, brings its schema up to date and
/// instantiates every external service client.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let collaborators = build_collaborators(&config)?;

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    tracing::info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    sqlite_provider.initialize_schema().await?;

    Ok(AppState::new(config, sqlite_provider, collaborators))
}
