//! Single-item lookup through the eBay Shopping API.

use crate::{response_text, EbayError};
use async_trait::async_trait;
use prodmatch::{
    assemble::parse_price,
    errors::MatchError,
    providers::ItemDetailsProvider,
    types::ItemDetails,
};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Error code the Shopping API uses for an unknown or expired item id.
const INVALID_ITEM_ERROR_CODE: &str = "10.12";

// --- Shopping-specific response structures ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct GetSingleItemResponse {
    #[serde(default)]
    ack: String,
    #[serde(default)]
    errors: Vec<ShoppingError>,
    #[serde(default)]
    item: Option<ShoppingItem>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ShoppingError {
    #[serde(default)]
    short_message: String,
    #[serde(default)]
    error_code: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ShoppingItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    current_price: Option<Price>,
    #[serde(default)]
    condition_display_name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(rename = "ViewItemURLForNaturalSearch", default)]
    view_item_url: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Price {
    /// Sent as a JSON number; kept raw so it can be parsed as a decimal.
    value: Value,
    #[serde(rename = "CurrencyID", default)]
    currency_id: Option<String>,
}

impl From<ShoppingItem> for ItemDetails {
    fn from(item: ShoppingItem) -> Self {
        let (price, currency) = match item.current_price {
            Some(p) => {
                let raw = match &p.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (parse_price(&raw), p.currency_id)
            }
            None => (None, None),
        };
        ItemDetails {
            title: item.title,
            price,
            currency,
            condition: item.condition_display_name,
            location: item.location,
            url: item.view_item_url,
        }
    }
}

// --- Shopping Client implementation ---

/// A client for `GetSingleItem`.
#[derive(Clone, Debug)]
pub struct ShoppingClient {
    client: ReqwestClient,
    api_url: String,
    app_id: String,
    site_id: String,
    oauth_token: Option<String>,
}

impl ShoppingClient {
    pub fn new(
        api_url: String,
        app_id: String,
        site_id: String,
        oauth_token: Option<String>,
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
            site_id,
            oauth_token,
        })
    }

    async fn get_single_item(&self, item_id: &str) -> Result<Option<ItemDetails>, EbayError> {
        let mut request_builder = self.client.get(&self.api_url).query(&[
            ("callname", "GetSingleItem"),
            ("responseencoding", "JSON"),
            ("appid", self.app_id.as_str()),
            ("siteid", self.site_id.as_str()),
            ("version", "967"),
            ("ItemID", item_id),
            ("IncludeSelector", "Details,ItemSpecifics"),
        ]);
        if let Some(token) = self.oauth_token.as_deref().filter(|t| !t.is_empty()) {
            request_builder = request_builder.header("X-EBAY-API-IAF-TOKEN", token);
        }

        let body = response_text(request_builder.send().await?).await?;
        let response: GetSingleItemResponse = serde_json::from_str(&body)?;

        if response.ack == "Success" || response.ack == "Warning" {
            return Ok(response.item.map(ItemDetails::from));
        }

        if response
            .errors
            .iter()
            .any(|e| e.error_code == INVALID_ITEM_ERROR_CODE)
        {
            debug!("eBay reports item {item_id} as invalid.");
            return Ok(None);
        }

        let message = response
            .errors
            .iter()
            .map(|e| e.short_message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(EbayError::Api(format!("{}: {message}", response.ack)))
    }
}

#[async_trait]
impl ItemDetailsProvider for ShoppingClient {
    async fn item_details(&self, item_id: &str) -> Result<Option<ItemDetails>, MatchError> {
        info!("Looking up eBay item {item_id}");
        Ok(self.get_single_item(item_id).await?)
    }
}
