//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port, backed by a temporary
//! SQLite database and media directory, with mock collaborators standing in
//! for Google Vision and eBay.

// Not every test binary uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use prodmatch::providers::db::sqlite::SqliteProvider;
use prodmatch_server::{
    config, router,
    state::{AppState, Collaborators},
};
use prodmatch_test_utils::{
    sample_search_item, sample_vision_result, MockItemDetails, MockMarketplace,
    MockReachability, MockVisionProvider,
};
use reqwest::{multipart, Client};
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// The mocks a `TestApp` was built with, kept for assertions.
#[derive(Clone, Debug)]
pub struct Mocks {
    pub vision: MockVisionProvider,
    pub marketplace: MockMarketplace,
    pub item_details: MockItemDetails,
    pub reachability: MockReachability,
}

impl Default for Mocks {
    /// Mocks that answer every call with the toy cat fixtures.
    fn default() -> Self {
        Self {
            vision: MockVisionProvider::new(sample_vision_result()),
            marketplace: MockMarketplace::new(vec![
                sample_search_item("111111111111", "12.99"),
                sample_search_item("222222222222", "8.50"),
            ]),
            item_details: MockItemDetails::new(),
            reachability: MockReachability::with_reachable(&["https://img.example.com/a.jpg"]),
        }
    }
}

impl Mocks {
    fn collaborators(&self) -> Collaborators {
        Collaborators {
            vision: Box::new(self.vision.clone()),
            marketplace: Box::new(self.marketplace.clone()),
            item_details: Box::new(self.item_details.clone()),
            reachability: Box::new(self.reachability.clone()),
        }
    }
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mocks: Mocks,
    pub app_state: AppState,
    pub media_root: PathBuf,
    _work_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the default mocks.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Mocks::default()).await
    }

    /// Spawns the application server with the given mocks.
    pub async fn spawn_with(mocks: Mocks) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let work_dir = tempdir()?;
        let db_path = work_dir.path().join("prodmatch.db");
        let media_root = work_dir.path().join("media");
        let config_path = work_dir.path().join("config.yml");

        let config_content = format!(
            r#"
port: 0
db_url: "{}"
media_root: "{}"
vision:
  api_key: "unused"
ebay:
  app_id: "unused"
"#,
            db_path.display(),
            media_root.display()
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(config_path.to_str())?;
        let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
        sqlite_provider.initialize_schema().await?;
        let app_state = AppState::new(config, sqlite_provider, mocks.collaborators());
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mocks,
            app_state: app_state_for_harness,
            media_root,
            _work_dir: work_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Posts `bytes` as the `image` field of a multipart form.
    pub async fn post_image(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<reqwest::Response> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);
        Ok(self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?)
    }

    /// Names of the files currently stored under `media_root/product_images`.
    pub fn stored_images(&self) -> Vec<String> {
        let dir = self.media_root.join("product_images");
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
