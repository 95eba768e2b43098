//! # Listing Identifier Tests

use prodmatch::{identify, is_marketplace_url};

#[test]
fn test_itm_with_slug() {
    assert_eq!(
        identify("https://www.ebay.com/itm/Widget/123456789012").as_deref(),
        Some("123456789012")
    );
}

#[test]
fn test_item_query_parameter() {
    assert_eq!(
        identify("https://x.example.com/item=4455").as_deref(),
        Some("4455")
    );
    assert_eq!(
        identify("https://cgi.ebay.com/ws/eBayISAPI.dll?ViewItem&item=2233445566").as_deref(),
        Some("2233445566")
    );
}

#[test]
fn test_item_id_query_parameter() {
    assert_eq!(
        identify("https://offer.ebay.com/ws/eBayISAPI.dll?BinConfirm&ItemId=998877").as_deref(),
        Some("998877")
    );
}

#[test]
fn test_twelve_digit_path_segment() {
    assert_eq!(
        identify("https://random.site/path/123456789012").as_deref(),
        Some("123456789012")
    );
    assert_eq!(
        identify("https://random.site/123456789012/details?ref=1").as_deref(),
        Some("123456789012")
    );
}

#[test]
fn test_eleven_and_thirteen_digit_segments_do_not_match() {
    assert_eq!(identify("https://random.site/path/12345678901"), None);
    assert_eq!(identify("https://random.site/path/1234567890123"), None);
    assert_eq!(identify("https://random.site/p-123456789012"), None);
}

#[test]
fn test_twelve_digits_in_query_string_are_not_a_segment() {
    assert_eq!(identify("https://random.site/search?u=/123456789012"), None);
}

#[test]
fn test_non_listing_page() {
    assert_eq!(identify("https://www.ebay.com/b/Cat-Toys/bn_7000259"), None);
    assert_eq!(identify(""), None);
}

#[test]
fn test_identify_is_deterministic() {
    let urls = [
        "https://www.ebay.com/itm/Widget/123456789012",
        "https://x.example.com/item=4455",
        "https://www.ebay.com/b/Cat-Toys/bn_7000259",
    ];
    for url in urls {
        let first = identify(url);
        for _ in 0..5 {
            assert_eq!(identify(url), first);
        }
    }
}

#[test]
fn test_marketplace_predicate() {
    assert!(is_marketplace_url("https://www.ebay.com/itm/1"));
    assert!(is_marketplace_url("https://www.eBay.de/itm/1"));
    assert!(!is_marketplace_url("https://random.site/path/123456789012"));
}
