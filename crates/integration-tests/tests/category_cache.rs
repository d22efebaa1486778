//! Integration tests for cache-first category browsing.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use cartwheel_client::{CachePolicy, CatalogBrowser, CategoryView, GatewayError, PageSource};
use cartwheel_core::{CategoryId, SortMode};
use cartwheel_integration_tests::{Call, InMemoryGateway, product};

fn tea_gateway() -> InMemoryGateway {
    let gateway = InMemoryGateway::default();
    gateway.add_category(
        "cat1",
        "Tea",
        (1..=5)
            .map(|n| product(&format!("p{n}"), &format!("Tea {n}"), 100 * (6 - n)))
            .collect(),
    );
    gateway
}

#[tokio::test]
async fn test_second_load_of_same_key_hits_cache() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    let first = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(first.source, PageSource::Network);
    assert_eq!(gateway.category_fetches(), 1);

    let second = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(second.source, PageSource::Cache);
    assert_eq!(gateway.category_fetches(), 1);
    assert!(Arc::ptr_eq(&first.page, &second.page));

    assert!(view.next_page());
    let third = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(third.source, PageSource::Network);
    assert_eq!(gateway.category_fetches(), 2);
    assert_eq!(
        gateway.calls().last(),
        Some(&Call::FetchCategory {
            category_id: CategoryId::new("cat1"),
            page: 2,
            limit: 2,
            sort: Some(SortMode::Newest),
        })
    );
}

#[tokio::test]
async fn test_repeated_hits_never_touch_gateway() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));
    let first = browser.load_page(&gateway, &mut view).await.unwrap();

    for _ in 0..5 {
        let again = browser.load_page(&gateway, &mut view).await.unwrap();
        assert_eq!(*again.page, *first.page);
    }
    assert_eq!(gateway.category_fetches(), 1);
}

#[tokio::test]
async fn test_sort_modes_are_cached_separately() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1")).with_sort(Some(SortMode::PriceAsc));

    view.set_page(2);
    let asc = browser.load_page(&gateway, &mut view).await.unwrap();

    view.set_sort(Some(SortMode::PriceDesc));
    assert_eq!(view.page(), 1);
    let desc = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(desc.source, PageSource::Network);
    assert_ne!(asc.page.products, desc.page.products);

    let cache = browser.cache();
    let cat = CategoryId::new("cat1");
    assert!(cache.get_page(&cat, 2, Some(SortMode::PriceAsc)).is_some());
    assert!(cache.get_page(&cat, 2, Some(SortMode::PriceDesc)).is_none());
    assert!(cache.get_page(&cat, 1, Some(SortMode::PriceAsc)).is_none());
    assert_eq!(gateway.category_fetches(), 2);
}

#[tokio::test]
async fn test_failed_fetch_caches_nothing() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    gateway.fail_op("category");
    let err = browser.load_page(&gateway, &mut view).await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
    assert_eq!(browser.cache().page_count(), 0);
    assert!(browser.cache().category_info(&CategoryId::new("cat1")).is_none());

    gateway.heal_op("category");
    let loaded = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(loaded.source, PageSource::Network);
    assert_eq!(gateway.category_fetches(), 2);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("nope"));

    let err = browser.load_page(&gateway, &mut view).await.unwrap_err();
    assert!(err.requires_refresh());
}

#[tokio::test]
async fn test_category_info_comes_from_first_page() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    browser.load_page(&gateway, &mut view).await.unwrap();
    // Renamed on the server after the first page was loaded
    gateway.add_category("cat1", "Herbal Tea", vec![product("p9", "Mint", 300)]);
    view.next_page();
    let loaded = browser.load_page(&gateway, &mut view).await.unwrap();

    assert_eq!(loaded.info.unwrap().name, "Tea");
}

#[tokio::test]
async fn test_pagination_bounds_follow_loaded_pages() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Unbounded, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(view.total_pages(), Some(3));

    view.set_page(3);
    let last = browser.load_page(&gateway, &mut view).await.unwrap();
    assert_eq!(last.page.products.len(), 1);
    assert!(!last.page.pagination.has_next_page());
    assert!(!view.next_page());
}

#[tokio::test]
async fn test_lru_policy_refetches_evicted_pages() {
    let gateway = tea_gateway();
    let mut browser = CatalogBrowser::new(CachePolicy::Lru { max_pages: 1 }, 2);
    let mut view = CategoryView::new(CategoryId::new("cat1"));

    browser.load_page(&gateway, &mut view).await.unwrap();
    view.next_page();
    browser.load_page(&gateway, &mut view).await.unwrap();
    view.next_page();
    browser.load_page(&gateway, &mut view).await.unwrap();

    assert!(browser.cache().page_count() <= 1);
    assert_eq!(gateway.category_fetches(), 3);
}
