//! # Result Assembler
//!
//! Normalizes keyword-search items and reverse-image page matches into
//! `ListingCandidate`s ready for storage or display.

use crate::{
    listing::{identify, is_marketplace_url},
    providers::ItemDetailsProvider,
    types::{ItemDetails, ListingCandidate, MatchingPage, SearchItem},
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// Condition used when the marketplace omits one.
pub const UNSPECIFIED: &str = "Not specified";

/// Title used for matching pages that carry none.
pub const DEFAULT_PAGE_TITLE: &str = "eBay Listing";

/// Maps each keyword-search item to a candidate, one-to-one.
///
/// The item id comes from the listing url, falling back to the numeric
/// `itemId` the search reported.
pub fn assemble_from_search(items: Vec<SearchItem>) -> Vec<ListingCandidate> {
    items.into_iter().map(candidate_from_search_item).collect()
}

fn candidate_from_search_item(item: SearchItem) -> ListingCandidate {
    let price = item.current_price.as_deref().and_then(parse_price);
    if price.is_none() {
        debug!(item_id = %item.item_id, raw = ?item.current_price, "Search item has no usable price");
    }

    ListingCandidate {
        item_id: identify(&item.url).or_else(|| numeric_id(&item.item_id)),
        url: item.url,
        title: item.title,
        price,
        currency: None,
        condition: Some(item.condition.unwrap_or_else(|| UNSPECIFIED.to_string())),
        location: item.location,
        seller: item.seller,
    }
}

/// Builds candidates from reverse-image page matches.
///
/// Pages outside the marketplace domain are dropped. When an item id can be
/// extracted, the detail lookup fills in price, condition and location and
/// overrides the page title and url. A failed or empty lookup keeps the
/// partial candidate with only `url` and `title` set.
pub async fn assemble_from_pages(
    pages: &[MatchingPage],
    details: &dyn ItemDetailsProvider,
) -> Vec<ListingCandidate> {
    let mut candidates = Vec::new();

    for page in pages.iter().filter(|p| is_marketplace_url(&p.url)) {
        let title = page
            .page_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_PAGE_TITLE);
        let mut candidate = ListingCandidate::from_page(page.url.clone(), title);

        if let Some(item_id) = identify(&page.url) {
            match details.item_details(&item_id).await {
                Ok(Some(found)) => {
                    merge_details(&mut candidate, found);
                    candidate.item_id = Some(item_id);
                }
                Ok(None) => debug!("No item details for {item_id}"),
                Err(e) => warn!("Item detail lookup for {item_id} failed: {e}"),
            }
        }

        candidates.push(candidate);
    }

    candidates
}

fn merge_details(candidate: &mut ListingCandidate, details: ItemDetails) {
    if !details.title.trim().is_empty() {
        candidate.title = details.title;
    }
    if let Some(url) = details.url.filter(|u| !u.trim().is_empty()) {
        candidate.url = url;
    }
    candidate.price = details.price;
    candidate.currency = details.currency;
    candidate.condition = Some(details.condition.unwrap_or_else(|| UNSPECIFIED.to_string()));
    candidate.location = Some(details.location.unwrap_or_else(|| UNSPECIFIED.to_string()));
}

/// Parses a currency value such as `"19.99"` into a decimal.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

fn numeric_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then(|| id.to_string())
}
