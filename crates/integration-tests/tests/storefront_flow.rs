//! Integration tests for the storefront session container.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use cartwheel_client::{
    CachePolicy, CategoryView, ClientConfig, ClientError, CommitError, PageSource, Storefront,
};
use cartwheel_core::{CategoryId, LineSyncState, Price, SortMode};
use cartwheel_integration_tests::{Call, Failure, InMemoryGateway, item, line, product};
use rust_decimal::Decimal;
use url::Url;

fn config() -> ClientConfig {
    ClientConfig::new(Url::parse("http://shop.test/api").unwrap())
        .with_cache_policy(CachePolicy::Unbounded)
        .with_search_debounce(Duration::ZERO)
}

fn store_with(lines: Vec<cartwheel_core::CartLine>) -> Storefront<InMemoryGateway> {
    let gateway = InMemoryGateway::with_cart(lines);
    gateway.set_settings(Decimal::new(15, 0), "SAR");
    Storefront::new(gateway, &config())
}

#[tokio::test]
async fn test_edit_totals_and_save() {
    let mut store = store_with(vec![line("a", 1000, 1, 3), line("b", 250, 4, 10)]);
    store.refresh_cart().await.unwrap();
    store.load_settings().await.unwrap();

    // Increment uses the line's own stock
    for _ in 0..5 {
        store.increment(&item("a"));
    }
    store.decrement(&item("b"));
    assert_eq!(store.cart().effective_quantity(&item("a")), Some(3));
    assert!(store.has_unsaved_changes());

    let totals = store.cart_totals();
    assert_eq!(totals.subtotal, Price::from_minor(3750));
    assert_eq!(totals.tax, Price::from_minor(563));
    assert_eq!(totals.total, Price::from_minor(4313));

    let summary = store.save_cart().await.unwrap();
    assert_eq!(summary.updated, 2);
    assert!(!store.has_unsaved_changes());
    assert_eq!(store.gateway().server_quantity("a"), Some(3));
    assert_eq!(store.gateway().server_quantity("b"), Some(3));
    assert_eq!(store.line_state(&item("a")), Some(LineSyncState::Synced));
}

#[tokio::test]
async fn test_totals_without_settings_have_no_tax() {
    let mut store = store_with(vec![line("a", 1000, 2, 3)]);
    store.refresh_cart().await.unwrap();

    let totals = store.cart_totals();
    assert_eq!(totals.subtotal, Price::from_minor(2000));
    assert_eq!(totals.tax, Price::ZERO);
    assert_eq!(totals.total, totals.subtotal);
}

#[tokio::test]
async fn test_unknown_line_edits_are_ignored() {
    let mut store = store_with(vec![line("a", 1000, 1, 3)]);
    store.refresh_cart().await.unwrap();

    assert_eq!(store.increment(&item("ghost")), None);
    assert_eq!(store.decrement(&item("ghost")), None);
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_failed_save_is_reported_and_kept() {
    let mut store = store_with(vec![line("a", 1000, 1, 3)]);
    store.refresh_cart().await.unwrap();
    store.gateway().fail_update("a", Failure::Auth);
    store.increment(&item("a"));

    let err = store.save_cart().await.unwrap_err();
    assert!(matches!(err, ClientError::Commit(CommitError::Update { .. })));
    assert!(!err.is_retryable());
    assert_eq!(store.cart().effective_quantity(&item("a")), Some(2));
    assert_eq!(store.line_state(&item("a")), Some(LineSyncState::Dirty));
}

#[tokio::test]
async fn test_remove_line_reloads_cart() {
    let mut store = store_with(vec![line("a", 1000, 1, 3), line("b", 500, 1, 3)]);
    store.refresh_cart().await.unwrap();
    store.increment(&item("b"));

    store.remove_line(&item("a")).await.unwrap();

    assert!(store.cart().line(&item("a")).is_none());
    // Reloading drops unsaved edits
    assert!(!store.has_unsaved_changes());
    assert_eq!(store.cart().lines().len(), 1);
}

#[tokio::test]
async fn test_removing_missing_line_still_reloads() {
    let mut store = store_with(vec![line("a", 1000, 1, 3)]);
    store.refresh_cart().await.unwrap();
    store.gateway().drop_line("a");

    store.remove_line(&item("a")).await.unwrap();
    assert!(store.cart().lines().is_empty());
    assert_eq!(store.gateway().calls().last(), Some(&Call::FetchCart));
}

#[tokio::test]
async fn test_clear_cart() {
    let mut store = store_with(vec![line("a", 1000, 1, 3), line("b", 500, 1, 3)]);
    store.refresh_cart().await.unwrap();

    store.clear_cart().await.unwrap();
    assert!(store.cart().lines().is_empty());
    assert_eq!(store.cart_totals().total, Price::ZERO);
}

#[tokio::test]
async fn test_refresh_failure_keeps_snapshot() {
    let mut store = store_with(vec![line("a", 1000, 1, 3)]);
    store.refresh_cart().await.unwrap();
    store.increment(&item("a"));
    store.gateway().fail_op("fetch_cart");

    let err = store.refresh_cart().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(store.cart().effective_quantity(&item("a")), Some(2));
}

#[tokio::test]
async fn test_category_browsing_through_store() {
    let mut store = store_with(vec![]);
    store.gateway().add_category(
        "cat1",
        "Tea",
        vec![product("p1", "Green", 100), product("p2", "Black", 200)],
    );
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    let first = store.load_category(&mut view).await.unwrap();
    let again = store.load_category(&mut view).await.unwrap();
    assert_eq!(first.source, PageSource::Network);
    assert_eq!(again.source, PageSource::Cache);

    view.set_sort(Some(SortMode::PriceDesc));
    let sorted = store.load_category(&mut view).await.unwrap();
    assert_eq!(sorted.source, PageSource::Network);
    assert_eq!(sorted.page.products.first().unwrap().name, "Black");
    assert_eq!(store.gateway().category_fetches(), 2);
}

#[tokio::test]
async fn test_search_through_store() {
    let mut store = store_with(vec![]);
    store
        .gateway()
        .set_catalog(vec![product("p1", "Green Tea", 100), product("p2", "Oolong", 200)]);

    let shown = store.search("tea").await.unwrap();
    assert_eq!(shown.len(), 1);

    let shown = store.search("t").await.unwrap();
    assert!(shown.is_empty());
    assert_eq!(
        store
            .gateway()
            .count(|call| matches!(call, Call::Suggest(_))),
        1
    );

    store.search("oolong").await.unwrap();
    store.clear_search();
    assert!(store.search_tracker().suggestions().is_empty());
}
