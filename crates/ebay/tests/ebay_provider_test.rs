//! # eBay Provider Tests
//!
//! Drives `FindingClient` and `ShoppingClient` against `wiremock` servers.

use prodmatch::{
    errors::ErrorKind,
    providers::{ItemDetailsProvider, MarketplaceSearch},
    types::SearchRequest,
};
use prodmatch_ebay::{FindingClient, ShoppingClient};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

fn finding(server: &MockServer) -> FindingClient {
    FindingClient::new(
        format!("{}/services/search/FindingService/v1", server.uri()),
        "app-123".to_string(),
        "EBAY-US".to_string(),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

fn shopping(server: &MockServer, token: Option<&str>) -> ShoppingClient {
    ShoppingClient::new(
        format!("{}/shopping", server.uri()),
        "app-123".to_string(),
        "0".to_string(),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

#[tokio::test]
async fn test_search_maps_finding_items() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/search/FindingService/v1"))
        .and(query_param("OPERATION-NAME", "findItemsByKeywords"))
        .and(query_param("SECURITY-APPNAME", "app-123"))
        .and(query_param("keywords", "cat toy"))
        .and(query_param("paginationInput.entriesPerPage", "10"))
        .and(query_param("sortOrder", "BestMatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "findItemsByKeywordsResponse": [{
                "ack": ["Success"],
                "searchResult": [{
                    "@count": "2",
                    "item": [
                        {
                            "itemId": ["123456789012"],
                            "title": ["Plush cat toy"],
                            "viewItemURL": ["https://www.ebay.com/itm/123456789012"],
                            "location": ["Portland,OR,USA"],
                            "sellingStatus": [{
                                "currentPrice": [{ "@currencyId": "USD", "__value__": "12.99" }]
                            }],
                            "condition": [{ "conditionDisplayName": ["New"] }],
                            "sellerInfo": [{ "sellerUserName": ["cat_toys_4u"] }]
                        },
                        {
                            "itemId": ["210987654321"],
                            "title": ["Cat toy lot"],
                            "viewItemURL": ["https://www.ebay.com/itm/210987654321"]
                        }
                    ]
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchRequest::new("cat toy", 10, "BestMatch");
    let items = finding(&server).search(&request).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_id, "123456789012");
    assert_eq!(items[0].title, "Plush cat toy");
    assert_eq!(items[0].current_price.as_deref(), Some("12.99"));
    assert_eq!(items[0].condition.as_deref(), Some("New"));
    assert_eq!(items[0].location.as_deref(), Some("Portland,OR,USA"));
    assert_eq!(items[0].seller.as_deref(), Some("cat_toys_4u"));
    assert_eq!(items[1].current_price, None);
    assert_eq!(items[1].condition, None);
    assert_eq!(items[1].seller, None);
}

#[tokio::test]
async fn test_search_without_results_is_empty() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "findItemsByKeywordsResponse": [{
                "ack": ["Success"],
                "searchResult": [{ "@count": "0" }]
            }]
        })))
        .mount(&server)
        .await;

    let request = SearchRequest::new("nothing matches", 10, "BestMatch");
    let items = finding(&server).search(&request).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_search_failure_ack_is_upstream_failure() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "findItemsByKeywordsResponse": [{
                "ack": ["Failure"],
                "errorMessage": [{
                    "error": [{ "message": ["Invalid Application ID."] }]
                }]
            }]
        })))
        .mount(&server)
        .await;

    let request = SearchRequest::new("cat", 10, "BestMatch");
    let err = finding(&server).search(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(err.to_string().contains("Invalid Application ID."));
}

#[tokio::test]
async fn test_search_http_error_is_upstream_failure() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let request = SearchRequest::new("cat", 10, "BestMatch");
    let err = finding(&server).search(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
}

#[tokio::test]
async fn test_blank_keywords_rejected_without_request() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = SearchRequest::new("   ", 10, "BestMatch");
    let err = finding(&server).search(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_item_details_maps_single_item() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shopping"))
        .and(query_param("callname", "GetSingleItem"))
        .and(query_param("ItemID", "123456789012"))
        .and(query_param("appid", "app-123"))
        .and(header("X-EBAY-API-IAF-TOKEN", "token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Ack": "Success",
            "Item": {
                "ItemID": "123456789012",
                "Title": "Toy Cat Plush",
                "CurrentPrice": { "Value": 12.5, "CurrencyID": "USD" },
                "ConditionDisplayName": "Used",
                "Location": "Austin, Texas",
                "ViewItemURLForNaturalSearch": "https://www.ebay.com/itm/Toy-Cat-Plush/123456789012"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let details = shopping(&server, Some("token-abc"))
        .item_details("123456789012")
        .await
        .unwrap()
        .expect("item should be found");

    assert_eq!(details.title, "Toy Cat Plush");
    assert_eq!(details.price, Some(Decimal::new(125, 1)));
    assert_eq!(details.currency.as_deref(), Some("USD"));
    assert_eq!(details.condition.as_deref(), Some("Used"));
    assert_eq!(details.location.as_deref(), Some("Austin, Texas"));
    assert_eq!(
        details.url.as_deref(),
        Some("https://www.ebay.com/itm/Toy-Cat-Plush/123456789012")
    );
}

#[tokio::test]
async fn test_item_details_optional_fields_absent() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shopping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Ack": "Success",
            "Item": { "Title": "Bare listing" }
        })))
        .mount(&server)
        .await;

    let details = shopping(&server, None)
        .item_details("123456789012")
        .await
        .unwrap()
        .expect("item should be found");

    assert_eq!(details.title, "Bare listing");
    assert_eq!(details.price, None);
    assert_eq!(details.currency, None);
    assert_eq!(details.condition, None);
    assert_eq!(details.url, None);
}

#[tokio::test]
async fn test_invalid_item_is_not_found() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shopping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Ack": "Failure",
            "Errors": [{
                "ShortMessage": "Invalid item ID.",
                "ErrorCode": "10.12",
                "SeverityCode": "Error"
            }]
        })))
        .mount(&server)
        .await;

    let details = shopping(&server, None)
        .item_details("999999999999")
        .await
        .unwrap();
    assert!(details.is_none());
}

#[tokio::test]
async fn test_other_failures_are_upstream_failure() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shopping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Ack": "Failure",
            "Errors": [{
                "ShortMessage": "Token not available in request.",
                "ErrorCode": "1.33"
            }]
        })))
        .mount(&server)
        .await;

    let err = shopping(&server, None)
        .item_details("123456789012")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(err.to_string().contains("Token not available"));
}
