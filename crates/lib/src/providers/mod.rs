pub mod db;
pub mod reachability;

use crate::{
    errors::MatchError,
    types::{ItemDetails, SearchItem, SearchRequest, VisionResult},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use reachability::HttpReachabilityChecker;
use std::fmt::Debug;

/// A trait for image-recognition services.
///
/// Implementations send the raw image bytes to the service and return every
/// list it reports. Any transport, quota or auth failure is returned as
/// `MatchError::Vision` and is fatal for the current request.
#[async_trait]
pub trait VisionProvider: Send + Sync + Debug + DynClone {
    async fn annotate(&self, image: &[u8]) -> Result<VisionResult, MatchError>;
}

dyn_clone::clone_trait_object!(VisionProvider);

/// A trait for marketplace keyword search.
#[async_trait]
pub trait MarketplaceSearch: Send + Sync + Debug + DynClone {
    /// Runs a keyword search.
    ///
    /// Blank keywords are an invalid request and must be rejected with
    /// `MatchError::InvalidInput` without contacting the service.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchItem>, MatchError>;
}

dyn_clone::clone_trait_object!(MarketplaceSearch);

/// A trait for looking up a single marketplace item by id.
#[async_trait]
pub trait ItemDetailsProvider: Send + Sync + Debug + DynClone {
    /// Returns `Ok(None)` when the item does not exist.
    async fn item_details(&self, item_id: &str) -> Result<Option<ItemDetails>, MatchError>;
}

dyn_clone::clone_trait_object!(ItemDetailsProvider);

/// A trait for cheap existence checks on image URLs.
#[async_trait]
pub trait ReachabilityChecker: Send + Sync + Debug + DynClone {
    /// Any failure counts as unreachable.
    async fn is_reachable_image(&self, url: &str) -> bool;
}

dyn_clone::clone_trait_object!(ReachabilityChecker);

/// Rejects blank keywords before a search request leaves the process.
pub fn validate_search_request(request: &SearchRequest) -> Result<(), MatchError> {
    if request.keywords.trim().is_empty() {
        return Err(MatchError::InvalidInput(
            "search keywords must not be empty".to_string(),
        ));
    }
    Ok(())
}
