use prodmatch::{
    pipeline::VisionReport,
    providers::db::records::{ProductImage, StoredListing},
    types::{ListingCandidate, SearchQuery},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- API Payloads ---

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub image_id: i64,
    pub query: SearchQuery,
    pub listings: Vec<ListingCandidate>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResultsResponse {
    pub image: ProductImage,
    pub listings: Vec<StoredListing>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TestVisionResponse {
    pub call_id: i64,
    pub duration_ms: i64,
    #[serde(flatten)]
    pub report: VisionReport,
}

#[derive(Deserialize, Debug)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}
