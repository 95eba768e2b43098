//! # Product Photo to Marketplace Listings
//!
//! This crate turns the annotations an image-recognition service reports for a
//! product photo into a marketplace keyword query, recognizes marketplace item
//! pages among reverse-image search results, and normalizes both kinds of
//! result into `ListingCandidate`s.
//!
//! The heuristics (`annotations`, `query`, `listing`, `assemble`) are plain
//! functions over plain data. External services sit behind the traits in
//! `providers`, and `pipeline` wires the two together for request handlers.

pub mod annotations;
pub mod assemble;
pub mod errors;
pub mod listing;
pub mod pipeline;
pub mod providers;
pub mod query;
pub mod types;

pub use annotations::collect;
pub use assemble::{assemble_from_pages, assemble_from_search};
pub use errors::{ErrorKind, MatchError};
pub use listing::{identify, is_marketplace_url};
pub use pipeline::{keyword_match, reverse_image_report, MatchOptions, ReportOptions};
pub use query::{build_query, QueryOptions};
pub use types::{Annotation, AnnotationCategory, ListingCandidate, SearchQuery, VisionResult};
