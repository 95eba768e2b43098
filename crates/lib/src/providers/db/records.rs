//! Rows persisted by the storage provider.

use crate::types::{Annotation, ListingCandidate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An uploaded product photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    /// Path of the stored file, relative to the media root.
    pub image_path: String,
    pub original_name: Option<String>,
    /// Hex md5 of the file contents.
    pub checksum: String,
    pub uploaded_at: String,
}

/// A marketplace listing recognized for a product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredListing {
    pub id: i64,
    pub product_image_id: i64,
    #[serde(flatten)]
    pub listing: ListingCandidate,
    pub created_at: String,
}

/// The data recorded for one vision-service invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisionCall {
    pub image_name: String,
    pub search_query: String,
    pub annotations: Vec<Annotation>,
    pub listings: Vec<ListingCandidate>,
    pub raw_response: Value,
    pub duration_ms: i64,
}

/// A recorded vision-service invocation, kept for history display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionCall {
    pub id: i64,
    pub image_name: String,
    pub search_query: String,
    pub annotations: Vec<Annotation>,
    pub listings: Vec<ListingCandidate>,
    pub raw_response: Value,
    pub duration_ms: i64,
    pub created_at: String,
}
