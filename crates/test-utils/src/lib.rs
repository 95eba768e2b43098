use anyhow::Result;
use async_trait::async_trait;
use prodmatch::{
    errors::MatchError,
    providers::{
        db::sqlite::SqliteProvider, ItemDetailsProvider, MarketplaceSearch, ReachabilityChecker,
        VisionProvider,
    },
    types::{
        ItemDetails, MatchingPage, ScoredEntity, SearchItem, SearchRequest, SimilarImage,
        TextAnnotation, VisionResult, WebDetection,
    },
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let provider = SqliteProvider::new(":memory:").await?;
        provider.initialize_schema().await?;
        Ok(Self { provider })
    }
}

// --- Mock Vision Provider ---

/// Returns a fixed `VisionResult`, or fails every call when built with `failing`.
#[derive(Clone, Debug)]
pub struct MockVisionProvider {
    result: Option<VisionResult>,
    calls: Arc<Mutex<usize>>,
}

impl MockVisionProvider {
    pub fn new(result: VisionResult) -> Self {
        Self {
            result: Some(result),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn annotate(&self, _image: &[u8]) -> Result<VisionResult, MatchError> {
        *self.calls.lock().unwrap() += 1;
        self.result
            .clone()
            .ok_or_else(|| MatchError::Vision("MockVisionProvider: quota exceeded".to_string()))
    }
}

// --- Mock Marketplace Search ---

#[derive(Clone, Debug)]
pub struct MockMarketplace {
    items: Option<Vec<SearchItem>>,
    requests: Arc<Mutex<Vec<SearchRequest>>>,
}

impl MockMarketplace {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self {
            items: Some(items),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            items: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded requests for assertion.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketplaceSearch for MockMarketplace {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchItem>, MatchError> {
        prodmatch::providers::validate_search_request(request)?;
        self.requests.lock().unwrap().push(request.clone());
        self.items
            .clone()
            .ok_or_else(|| MatchError::Marketplace("MockMarketplace: service unavailable".to_string()))
    }
}

// --- Mock Item Details ---

/// Serves programmed item details; ids marked as failing return an error and
/// unknown ids return `Ok(None)`.
#[derive(Clone, Debug, Default)]
pub struct MockItemDetails {
    details: Arc<Mutex<HashMap<String, ItemDetails>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockItemDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&self, item_id: &str, details: ItemDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(item_id.to_string(), details);
    }

    pub fn fail_item(&self, item_id: &str) {
        self.failing.lock().unwrap().insert(item_id.to_string());
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemDetailsProvider for MockItemDetails {
    async fn item_details(&self, item_id: &str) -> Result<Option<ItemDetails>, MatchError> {
        self.lookups.lock().unwrap().push(item_id.to_string());
        if self.failing.lock().unwrap().contains(item_id) {
            return Err(MatchError::Marketplace(format!(
                "MockItemDetails: lookup failed for {item_id}"
            )));
        }
        Ok(self.details.lock().unwrap().get(item_id).cloned())
    }
}

// --- Mock Reachability ---

/// Treats only the programmed URLs as reachable images.
#[derive(Clone, Debug, Default)]
pub struct MockReachability {
    reachable: Arc<Mutex<HashSet<String>>>,
}

impl MockReachability {
    pub fn with_reachable(urls: &[&str]) -> Self {
        Self {
            reachable: Arc::new(Mutex::new(urls.iter().map(|u| u.to_string()).collect())),
        }
    }
}

#[async_trait]
impl ReachabilityChecker for MockReachability {
    async fn is_reachable_image(&self, url: &str) -> bool {
        self.reachable.lock().unwrap().contains(url)
    }
}

// --- Fixtures ---

/// A vision result resembling a photo of a toy cat.
pub fn sample_vision_result() -> VisionResult {
    VisionResult {
        labels: vec![
            ScoredEntity::new("cat", 0.95),
            ScoredEntity::new("dog", 0.81),
            ScoredEntity::new("fish", 0.5),
        ],
        web_detection: WebDetection {
            web_entities: vec![ScoredEntity::new("toycat", 0.99)],
            pages_with_matching_images: vec![
                MatchingPage {
                    url: "https://www.ebay.com/itm/Toy-Cat/123456789012".to_string(),
                    page_title: Some("Toy Cat | eBay".to_string()),
                },
                MatchingPage {
                    url: "https://blog.example.com/cats/123456789012".to_string(),
                    page_title: Some("My cat blog".to_string()),
                },
            ],
            visually_similar_images: vec![
                SimilarImage {
                    url: "https://img.example.com/a.jpg".to_string(),
                },
                SimilarImage {
                    url: "https://img.example.com/dead.jpg".to_string(),
                },
            ],
        },
        objects: vec![ScoredEntity::new("toy", 0.9)],
        texts: vec![TextAnnotation {
            description: "MEOW".to_string(),
            score: None,
        }],
    }
}

/// A keyword-search item with every field populated.
pub fn sample_search_item(item_id: &str, price: &str) -> SearchItem {
    SearchItem {
        item_id: item_id.to_string(),
        title: format!("Toy cat {item_id}"),
        current_price: Some(price.to_string()),
        url: format!("https://www.ebay.com/itm/{item_id}"),
        condition: Some("New".to_string()),
        location: Some("Portland, OR".to_string()),
        seller: Some("cat_toys_4u".to_string()),
    }
}

/// Item details as the detail collaborator would return them.
pub fn sample_item_details(title: &str, cents: i64) -> ItemDetails {
    ItemDetails {
        title: title.to_string(),
        price: Some(Decimal::new(cents, 2)),
        currency: Some("USD".to_string()),
        condition: Some("Used".to_string()),
        location: Some("Austin, TX".to_string()),
        url: Some("https://www.ebay.com/itm/123456789012".to_string()),
    }
}
