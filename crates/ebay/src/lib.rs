//! # prodmatch-ebay: eBay Marketplace Providers
//!
//! Two clients for the eBay application-id based APIs:
//! - `FindingClient` runs `findItemsByKeywords` and implements `MarketplaceSearch`.
//! - `ShoppingClient` runs `GetSingleItem` and implements `ItemDetailsProvider`.

pub mod finding;
pub mod shopping;

pub use finding::FindingClient;
pub use shopping::ShoppingClient;

use prodmatch::errors::MatchError;
use thiserror::Error;

pub const DEFAULT_FINDING_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";
pub const DEFAULT_SHOPPING_URL: &str = "https://open.api.ebay.com/shopping";

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum EbayError {
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("eBay API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("eBay API call was not acknowledged: {0}")]
    Api(String),
    #[error("Failed to decode eBay response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<EbayError> for MatchError {
    fn from(err: EbayError) -> Self {
        MatchError::Marketplace(err.to_string())
    }
}

/// Reads the status and body of a response, failing on non-2xx.
async fn response_text(response: reqwest::Response) -> Result<String, EbayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(EbayError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
