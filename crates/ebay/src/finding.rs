//! Keyword search through the eBay Finding API.
//!
//! The JSON flavour of this API wraps every field, scalar or not, in a
//! one-element array, so the wire structs below are all `Vec`s.

use crate::{response_text, EbayError};
use async_trait::async_trait;
use prodmatch::{
    errors::MatchError,
    providers::{validate_search_request, MarketplaceSearch},
    types::{SearchItem, SearchRequest},
};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

// --- Finding-specific response structures ---

#[derive(Deserialize, Debug)]
struct FindingEnvelope {
    #[serde(rename = "findItemsByKeywordsResponse", default)]
    response: Vec<FindingResponse>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FindingResponse {
    #[serde(default)]
    ack: Vec<String>,
    #[serde(default)]
    error_message: Vec<ErrorMessage>,
    #[serde(default)]
    search_result: Vec<SearchResult>,
}

#[derive(Deserialize, Debug)]
struct ErrorMessage {
    #[serde(default)]
    error: Vec<ErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    #[serde(default)]
    message: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    #[serde(default)]
    item: Vec<FindingItem>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FindingItem {
    #[serde(default)]
    item_id: Vec<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "viewItemURL", default)]
    view_item_url: Vec<String>,
    #[serde(default)]
    location: Vec<String>,
    #[serde(default)]
    selling_status: Vec<SellingStatus>,
    #[serde(default)]
    condition: Vec<Condition>,
    #[serde(default)]
    seller_info: Vec<SellerInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SellingStatus {
    #[serde(default)]
    current_price: Vec<Amount>,
}

#[derive(Deserialize, Debug)]
struct Amount {
    #[serde(rename = "__value__")]
    value: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Condition {
    #[serde(default)]
    condition_display_name: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SellerInfo {
    #[serde(default)]
    seller_user_name: Vec<String>,
}

fn first(values: &[String]) -> Option<String> {
    values.first().cloned()
}

impl From<FindingItem> for SearchItem {
    fn from(item: FindingItem) -> Self {
        SearchItem {
            item_id: first(&item.item_id).unwrap_or_default(),
            title: first(&item.title).unwrap_or_default(),
            current_price: item
                .selling_status
                .first()
                .and_then(|s| s.current_price.first())
                .map(|a| a.value.clone()),
            url: first(&item.view_item_url).unwrap_or_default(),
            condition: item
                .condition
                .first()
                .and_then(|c| first(&c.condition_display_name)),
            location: first(&item.location),
            seller: item
                .seller_info
                .first()
                .and_then(|s| first(&s.seller_user_name)),
        }
    }
}

// --- Finding Client implementation ---

/// A client for `findItemsByKeywords`.
#[derive(Clone, Debug)]
pub struct FindingClient {
    client: ReqwestClient,
    api_url: String,
    app_id: String,
    global_id: String,
}

impl FindingClient {
    pub fn new(
        api_url: String,
        app_id: String,
        global_id: String,
        timeout: Duration,
    ) -> Result<Self, MatchError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(MatchError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            app_id,
            global_id,
        })
    }

    async fn find_items(&self, request: &SearchRequest) -> Result<Vec<SearchItem>, EbayError> {
        let limit = request.limit.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("OPERATION-NAME", "findItemsByKeywords"),
                ("SERVICE-VERSION", "1.13.0"),
                ("SECURITY-APPNAME", self.app_id.as_str()),
                ("GLOBAL-ID", self.global_id.as_str()),
                ("RESPONSE-DATA-FORMAT", "JSON"),
                ("REST-PAYLOAD", ""),
                ("keywords", request.keywords.trim()),
                ("paginationInput.entriesPerPage", limit.as_str()),
                ("sortOrder", request.sort_order.as_str()),
                ("outputSelector(0)", "SellerInfo"),
                ("outputSelector(1)", "PictureURLSuperSize"),
            ])
            .send()
            .await?;

        let body = response_text(response).await?;
        let envelope: FindingEnvelope = serde_json::from_str(&body)?;
        let response = envelope
            .response
            .into_iter()
            .next()
            .ok_or_else(|| EbayError::Api("empty findItemsByKeywordsResponse".to_string()))?;

        let ack = first(&response.ack).unwrap_or_default();
        if ack != "Success" && ack != "Warning" {
            let message = response
                .error_message
                .iter()
                .flat_map(|m| m.error.iter())
                .filter_map(|e| first(&e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EbayError::Api(format!("{ack}: {message}")));
        }
        if ack == "Warning" {
            warn!("findItemsByKeywords acknowledged with a warning.");
        }

        Ok(response
            .search_result
            .into_iter()
            .flat_map(|r| r.item)
            .map(SearchItem::from)
            .collect())
    }
}

#[async_trait]
impl MarketplaceSearch for FindingClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchItem>, MatchError> {
        validate_search_request(request)?;
        info!("Searching eBay for '{}'", request.keywords);
        let items = self.find_items(request).await?;
        Ok(items)
    }
}
