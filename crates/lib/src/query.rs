//! # Query Builder
//!
//! Turns vision annotations into a marketplace keyword query:
//! 1.  OCR text is never used as a search term.
//! 2.  Within each remaining category, entries keep their source order, are
//!     filtered to `confidence > min_confidence`, and the first `top_n` survive.
//! 3.  Survivors are concatenated in the order label, object, web entity.
//! 4.  Terms are deduplicated case-insensitively, first occurrence wins.

use crate::types::{Annotation, AnnotationCategory, SearchQuery};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Category order used when concatenating terms.
const CATEGORY_ORDER: [AnnotationCategory; 3] = [
    AnnotationCategory::Label,
    AnnotationCategory::Object,
    AnnotationCategory::WebEntity,
];

/// Tuning knobs for `build_query`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Maximum number of terms taken from each category.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Annotations must score strictly above this to be used.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_top_n() -> usize {
    3
}

fn default_min_confidence() -> f32 {
    0.8
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// Builds a `SearchQuery` from annotations.
///
/// Returns an empty query when nothing clears the threshold. Callers must
/// check `SearchQuery::is_empty` and skip the marketplace search in that case.
pub fn build_query(annotations: &[Annotation], options: &QueryOptions) -> SearchQuery {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for category in CATEGORY_ORDER {
        let selected = annotations
            .iter()
            .filter(|a| a.category == category)
            .filter(|a| a.confidence > options.min_confidence)
            .map(|a| a.text.trim())
            .filter(|text| !text.is_empty())
            .take(options.top_n);

        for text in selected {
            if seen.insert(text.to_lowercase()) {
                terms.push(text.to_string());
            }
        }
    }

    let raw = terms.join(" ");
    SearchQuery { terms, raw }
}
