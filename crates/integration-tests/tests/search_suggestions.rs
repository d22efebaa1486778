//! Integration tests for search suggestions and stale response handling.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use cartwheel_client::{CatalogGateway, SuggestionTracker, fetch_suggestions};
use cartwheel_core::Product;
use cartwheel_integration_tests::{Call, InMemoryGateway, product};

fn gateway() -> InMemoryGateway {
    let gateway = InMemoryGateway::default();
    gateway.set_catalog(vec![
        product("p1", "Green Tea", 450),
        product("p2", "Green Coffee", 900),
        product("p3", "Black Tea", 400),
    ]);
    gateway
}

fn suggest_calls(gateway: &InMemoryGateway) -> usize {
    gateway.count(|call| matches!(call, Call::Suggest(_)))
}

#[tokio::test]
async fn test_current_ticket_shows_results() {
    let gateway = gateway();
    let mut tracker = SuggestionTracker::new(2);

    let ticket = tracker.begin("green").unwrap();
    let results = fetch_suggestions(&gateway, &ticket, Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    assert!(tracker.complete(&ticket, results));

    let names: Vec<_> = tracker.suggestions().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Green Tea", "Green Coffee"]);
}

#[tokio::test]
async fn test_short_query_makes_no_request() {
    let gateway = gateway();
    let mut tracker = SuggestionTracker::new(2);

    assert!(tracker.begin("g").is_none());
    assert!(tracker.begin("   ").is_none());
    assert_eq!(suggest_calls(&gateway), 0);
}

#[tokio::test]
async fn test_keystroke_during_debounce_skips_request() {
    let gateway = gateway();
    let mut tracker = SuggestionTracker::new(2);
    let first = tracker.begin("gr").unwrap();

    let (result, second) = tokio::join!(
        fetch_suggestions(&gateway, &first, Duration::from_millis(80)),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tracker.begin("gre").unwrap()
        }
    );

    assert!(result.unwrap().is_none());
    assert_eq!(suggest_calls(&gateway), 0);
    assert!(second.is_current());
}

#[tokio::test]
async fn test_slow_response_for_older_query_is_discarded() {
    let gateway = gateway();
    gateway.delay_suggest("gr", Duration::from_millis(100));
    let mut tracker = SuggestionTracker::new(2);

    let first = tracker.begin("gr").unwrap();
    let (stale, second) = tokio::join!(
        fetch_suggestions(&gateway, &first, Duration::ZERO),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tracker.begin("black").unwrap()
        }
    );
    // The request went out, but its answer arrived after a newer keystroke
    assert!(stale.unwrap().is_none());
    assert_eq!(suggest_calls(&gateway), 1);

    let fresh = fetch_suggestions(&gateway, &second, Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    assert!(tracker.complete(&second, fresh));
    assert_eq!(tracker.suggestions().len(), 1);
    assert_eq!(tracker.query(), "black");
}

#[tokio::test]
async fn test_late_completion_cannot_overwrite_newer_results() {
    let gateway = gateway();
    let mut tracker = SuggestionTracker::new(2);

    let older = tracker.begin("green").unwrap();
    let older_results = gateway_results(&gateway, "green").await;
    let newer = tracker.begin("tea").unwrap();
    let newer_results = gateway_results(&gateway, "tea").await;

    assert!(tracker.complete(&newer, newer_results));
    assert!(!tracker.complete(&older, older_results));

    let names: Vec<_> = tracker.suggestions().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Green Tea", "Black Tea"]);
}

#[tokio::test]
async fn test_gateway_error_leaves_suggestions() {
    let gateway = gateway();
    let mut tracker = SuggestionTracker::new(2);
    let ticket = tracker.begin("tea").unwrap();
    let results = fetch_suggestions(&gateway, &ticket, Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    tracker.complete(&ticket, results);

    gateway.fail_op("suggest");
    let ticket = tracker.begin("teas").unwrap();
    assert!(fetch_suggestions(&gateway, &ticket, Duration::ZERO).await.is_err());
    assert_eq!(tracker.suggestions().len(), 2);
}

async fn gateway_results(gateway: &InMemoryGateway, query: &str) -> Vec<Product> {
    gateway.suggest_products(query).await.unwrap()
}
