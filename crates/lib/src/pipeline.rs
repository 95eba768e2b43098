//! # Matching Pipelines
//!
//! The two request flows, stitched from the pure heuristics and the external
//! collaborators. Each collaborator call is awaited in turn; nothing here
//! touches storage or the filesystem.
//!
//! - **Keyword match**: vision → collect → build query → marketplace search → assemble.
//! - **Reverse image**: vision → matching pages → identify + item details → assemble,
//!   plus a display report of labels, entities, text and reachable similar images.

use crate::{
    annotations::collect,
    assemble::{assemble_from_pages, assemble_from_search},
    errors::MatchError,
    providers::{ItemDetailsProvider, MarketplaceSearch, ReachabilityChecker, VisionProvider},
    query::{build_query, QueryOptions},
    types::{
        Annotation, ListingCandidate, ScoredEntity, SearchQuery, SearchRequest, SimilarImage,
        VisionResult,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// --- Keyword Match ---

/// Options for the keyword-search flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    #[serde(default)]
    pub query: QueryOptions,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_result_limit() -> u32 {
    10
}

fn default_sort_order() -> String {
    "BestMatch".to_string()
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            query: QueryOptions::default(),
            result_limit: default_result_limit(),
            sort_order: default_sort_order(),
        }
    }
}

/// The outcome of the keyword-search flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub vision: VisionResult,
    pub annotations: Vec<Annotation>,
    pub query: SearchQuery,
    pub listings: Vec<ListingCandidate>,
}

/// Annotates an image, derives a keyword query and searches the marketplace.
///
/// An empty query skips the search and yields no listings.
pub async fn keyword_match(
    vision: &dyn VisionProvider,
    marketplace: &dyn MarketplaceSearch,
    image: &[u8],
    options: &MatchOptions,
) -> Result<KeywordMatch, MatchError> {
    if image.is_empty() {
        return Err(MatchError::InvalidInput("image is empty".to_string()));
    }

    let vision_result = vision.annotate(image).await?;
    let annotations = collect(&vision_result);
    let query = build_query(&annotations, &options.query);
    info!(terms = ?query.terms, "Built marketplace query.");

    let listings = if query.is_empty() {
        warn!("No annotation cleared the confidence threshold; skipping marketplace search.");
        Vec::new()
    } else {
        let request =
            SearchRequest::new(query.raw.clone(), options.result_limit, options.sort_order.clone());
        let items = marketplace.search(&request).await?;
        info!("Marketplace returned {} items.", items.len());
        assemble_from_search(items)
    };

    Ok(KeywordMatch {
        vision: vision_result,
        annotations,
        query,
        listings,
    })
}

// --- Reverse Image Report ---

/// Options for the reverse-image flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default)]
    pub query: QueryOptions,
    #[serde(default = "default_max_entries")]
    pub max_similar_images: usize,
    #[serde(default = "default_max_entries")]
    pub max_pages: usize,
}

fn default_max_entries() -> usize {
    5
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            query: QueryOptions::default(),
            max_similar_images: default_max_entries(),
            max_pages: default_max_entries(),
        }
    }
}

/// A vision term with its score rendered as a percentage, e.g. `"97.00%"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredTerm {
    pub description: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    pub title: String,
}

/// What the reverse-image flow shows to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionReport {
    pub labels: Vec<ScoredTerm>,
    pub web_entities: Vec<ScoredTerm>,
    /// The full-image OCR text, when any was found.
    pub text: Option<String>,
    pub query: SearchQuery,
    pub marketplace_listings: Vec<ListingCandidate>,
    pub similar_images: Vec<SimilarImage>,
    pub pages: Vec<PageLink>,
}

/// The report together with the raw material used to build it.
#[derive(Debug, Clone)]
pub struct ReverseImageMatch {
    pub vision: VisionResult,
    pub annotations: Vec<Annotation>,
    pub report: VisionReport,
}

/// Annotates an image and identifies marketplace listings among the pages
/// that contain it.
///
/// Detail lookups and reachability checks degrade per entry and never fail
/// the whole report.
pub async fn reverse_image_report(
    vision: &dyn VisionProvider,
    details: &dyn ItemDetailsProvider,
    reachability: &dyn ReachabilityChecker,
    image: &[u8],
    options: &ReportOptions,
) -> Result<ReverseImageMatch, MatchError> {
    if image.is_empty() {
        return Err(MatchError::InvalidInput("image is empty".to_string()));
    }

    let vision_result = vision.annotate(image).await?;
    let annotations = collect(&vision_result);
    let query = build_query(&annotations, &options.query);
    let web = &vision_result.web_detection;

    let marketplace_listings = assemble_from_pages(&web.pages_with_matching_images, details).await;
    info!(
        "Identified {} marketplace pages out of {} matches.",
        marketplace_listings.len(),
        web.pages_with_matching_images.len()
    );

    let mut similar_images = Vec::new();
    for similar in web.visually_similar_images.iter().take(options.max_similar_images) {
        if reachability.is_reachable_image(&similar.url).await {
            similar_images.push(similar.clone());
        }
    }

    let pages = web
        .pages_with_matching_images
        .iter()
        .take(options.max_pages)
        .filter_map(|p| {
            p.page_title
                .as_ref()
                .filter(|t| !t.trim().is_empty())
                .map(|title| PageLink {
                    url: p.url.clone(),
                    title: title.clone(),
                })
        })
        .collect();

    let report = VisionReport {
        labels: scored_terms(&vision_result.labels),
        web_entities: scored_terms(&web.web_entities),
        text: vision_result.texts.first().map(|t| t.description.clone()),
        query,
        marketplace_listings,
        similar_images,
        pages,
    };

    Ok(ReverseImageMatch {
        vision: vision_result,
        annotations,
        report,
    })
}

fn scored_terms(entries: &[ScoredEntity]) -> Vec<ScoredTerm> {
    entries
        .iter()
        .map(|e| ScoredTerm {
            description: e.description.clone(),
            score: format_percent(e.score.unwrap_or(0.0)),
        })
        .collect()
}

/// Formats a `[0, 1]` score as a percentage with two decimals.
pub fn format_percent(score: f32) -> String {
    format!("{:.2}%", f64::from(score) * 100.0)
}
