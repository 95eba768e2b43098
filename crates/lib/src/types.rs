//! # Domain Types
//!
//! Plain data passed between the vision collaborator, the heuristics in this
//! crate, and the marketplace collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Annotations ---

/// The vision list an annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationCategory {
    Label,
    WebEntity,
    Object,
    Text,
}

impl fmt::Display for AnnotationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationCategory::Label => "label",
            AnnotationCategory::WebEntity => "web_entity",
            AnnotationCategory::Object => "object",
            AnnotationCategory::Text => "text",
        };
        f.write_str(name)
    }
}

/// A single labeled observation with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub category: AnnotationCategory,
    pub text: String,
    pub confidence: f32,
}

impl Annotation {
    pub fn new(category: AnnotationCategory, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            category,
            text: text.into(),
            confidence,
        }
    }
}

/// The keyword query derived from a set of annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub raw: String,
}

impl SearchQuery {
    /// An empty query must never be sent to the marketplace.
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

// --- Vision Collaborator Response ---

/// An entry from a scored vision list (labels, web entities, localized objects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub description: String,
    #[serde(default)]
    pub score: Option<f32>,
}

impl ScoredEntity {
    pub fn new(description: impl Into<String>, score: f32) -> Self {
        Self {
            description: description.into(),
            score: Some(score),
        }
    }
}

/// An OCR text span. Text detection carries no confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: Option<f32>,
}

/// A web page that contains the uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPage {
    pub url: String,
    #[serde(default)]
    pub page_title: Option<String>,
}

/// An image the vision service considers visually similar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebDetection {
    #[serde(default)]
    pub web_entities: Vec<ScoredEntity>,
    #[serde(default)]
    pub pages_with_matching_images: Vec<MatchingPage>,
    #[serde(default)]
    pub visually_similar_images: Vec<SimilarImage>,
}

/// Everything the vision collaborator reports for one image.
///
/// Each list is in the order the service returned it, which is
/// confidence-descending for the scored lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionResult {
    #[serde(default)]
    pub labels: Vec<ScoredEntity>,
    #[serde(default)]
    pub web_detection: WebDetection,
    #[serde(default)]
    pub objects: Vec<ScoredEntity>,
    #[serde(default)]
    pub texts: Vec<TextAnnotation>,
}

// --- Marketplace Collaborators ---

/// A keyword search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    pub limit: u32,
    pub sort_order: String,
}

impl SearchRequest {
    pub fn new(keywords: impl Into<String>, limit: u32, sort_order: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            limit,
            sort_order: sort_order.into(),
        }
    }
}

/// One item returned by the keyword search collaborator.
///
/// `current_price` is kept as the raw currency-value string the service sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub item_id: String,
    pub title: String,
    pub current_price: Option<String>,
    pub url: String,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub seller: Option<String>,
}

/// The result of an item-detail lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub title: String,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}

// --- Listings ---

/// A normalized, possibly partial marketplace listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub url: String,
    pub title: String,
    pub item_id: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub seller: Option<String>,
}

impl ListingCandidate {
    /// A candidate carrying only what a matching web page provides.
    pub fn from_page(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}
