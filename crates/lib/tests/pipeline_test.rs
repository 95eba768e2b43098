//! # Pipeline Tests
//!
//! Runs both request flows against mock collaborators.

mod common;

use crate::common::setup_tracing;
use prodmatch::{
    errors::ErrorKind,
    keyword_match, reverse_image_report,
    types::{ScoredEntity, VisionResult},
    MatchOptions, ReportOptions,
};
use prodmatch_test_utils::{
    sample_item_details, sample_search_item, sample_vision_result, MockItemDetails,
    MockMarketplace, MockReachability, MockVisionProvider,
};

const IMAGE: &[u8] = b"\x89PNG fake image bytes";

#[tokio::test]
async fn test_keyword_match_searches_with_built_query() {
    setup_tracing();
    let vision = MockVisionProvider::new(sample_vision_result());
    let marketplace = MockMarketplace::new(vec![sample_search_item("111111111111", "12.00")]);

    let result = keyword_match(&vision, &marketplace, IMAGE, &MatchOptions::default())
        .await
        .expect("keyword match should succeed");

    assert_eq!(result.query.raw, "cat dog toy toycat");
    assert_eq!(result.listings.len(), 1);
    assert_eq!(result.annotations.len(), 6);

    let requests = marketplace.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].keywords, "cat dog toy toycat");
    assert_eq!(requests[0].limit, 10);
    assert_eq!(requests[0].sort_order, "BestMatch");
}

#[tokio::test]
async fn test_keyword_match_skips_search_for_empty_query() {
    setup_tracing();
    let vision = MockVisionProvider::new(VisionResult {
        labels: vec![ScoredEntity::new("blurry", 0.3)],
        ..Default::default()
    });
    let marketplace = MockMarketplace::failing();

    let result = keyword_match(&vision, &marketplace, IMAGE, &MatchOptions::default())
        .await
        .expect("empty query is not an error");

    assert!(result.query.is_empty());
    assert!(result.listings.is_empty());
    assert!(marketplace.requests().is_empty());
}

#[tokio::test]
async fn test_keyword_match_propagates_upstream_failures() {
    setup_tracing();
    let marketplace = MockMarketplace::new(Vec::new());
    let err = keyword_match(
        &MockVisionProvider::failing(),
        &marketplace,
        IMAGE,
        &MatchOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);

    let vision = MockVisionProvider::new(sample_vision_result());
    let err = keyword_match(
        &vision,
        &MockMarketplace::failing(),
        IMAGE,
        &MatchOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
}

#[tokio::test]
async fn test_empty_image_rejected_before_vision_call() {
    setup_tracing();
    let vision = MockVisionProvider::new(sample_vision_result());
    let marketplace = MockMarketplace::new(Vec::new());

    let err = keyword_match(&vision, &marketplace, &[], &MatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_reverse_image_report() {
    setup_tracing();
    let vision = MockVisionProvider::new(sample_vision_result());
    let details = MockItemDetails::new();
    details.add_item("123456789012", sample_item_details("Toy Cat Plush", 1500));
    let reachability = MockReachability::with_reachable(&["https://img.example.com/a.jpg"]);

    let result = reverse_image_report(
        &vision,
        &details,
        &reachability,
        IMAGE,
        &ReportOptions::default(),
    )
    .await
    .expect("report should succeed");
    let report = result.report;

    assert_eq!(report.marketplace_listings.len(), 1);
    assert_eq!(report.marketplace_listings[0].title, "Toy Cat Plush");

    assert_eq!(report.similar_images.len(), 1);
    assert_eq!(report.similar_images[0].url, "https://img.example.com/a.jpg");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.labels[0].description, "cat");
    assert_eq!(report.labels[0].score, "95.00%");
    assert_eq!(report.web_entities[0].score, "99.00%");
    assert_eq!(report.text.as_deref(), Some("MEOW"));
    assert_eq!(report.query.terms, vec!["cat", "dog", "toy", "toycat"]);
}
