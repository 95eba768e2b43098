use crate::{errors::MatchError, providers::ReachabilityChecker};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client as ReqwestClient};
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single HEAD probe.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Checks image URLs with a HEAD request.
///
/// A URL is reachable when the response is 2xx and its `Content-Type`
/// starts with `image/`.
#[derive(Clone, Debug)]
pub struct HttpReachabilityChecker {
    client: ReqwestClient,
}

impl HttpReachabilityChecker {
    pub fn new(timeout: Duration) -> Result<Self, MatchError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(MatchError::ReqwestClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReachabilityChecker for HttpReachabilityChecker {
    async fn is_reachable_image(&self, url: &str) -> bool {
        let response = match self.client.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("HEAD {url} failed: {e}");
                return false;
            }
        };

        if !response.status().is_success() {
            debug!("HEAD {url} returned {}", response.status());
            return false;
        }

        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}
