//! Remote service boundary.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts, categories, and settings
//! - The core only ever talks to it through [`CartGateway`] and [`CatalogGateway`]
//! - [`RestGateway`] implements both traits against the storefront REST API
//!
//! Gateway calls are opaque, potentially slow, and potentially failing. Callers
//! treat every error as leaving remote state unknown and local state untouched.

mod rest;

pub use rest::RestGateway;

use std::future::Future;

use cartwheel_core::{
    CartItemId, CartLine, CategoryId, CategoryInfo, CategoryPage, Product, SortMode,
    StoreSettings,
};
use thiserror::Error;

/// Errors that can occur when calling the remote backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure, timeout, or server error. Retryable.
    #[error("Network error: {0}")]
    Network(String),

    /// Request rejected as invalid (e.g. quantity exceeds stock).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced cart line or category no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session missing or expired.
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but lacked required data.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether local state is stale and should be refetched rather than retried.
    #[must_use]
    pub const fn requires_refresh(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Category metadata plus one page of its products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCategoryPage {
    /// Category metadata.
    pub category: CategoryInfo,
    /// The requested page.
    pub page: CategoryPage,
}

/// Cart operations against the backend.
pub trait CartGateway {
    /// Fetch the authoritative cart snapshot.
    fn fetch_cart_snapshot(
        &self,
    ) -> impl Future<Output = Result<Vec<CartLine>, GatewayError>> + Send;

    /// Set the quantity of one cart line.
    fn update_cart_line(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Remove one cart line.
    fn remove_cart_line(
        &self,
        item_id: &CartItemId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Remove every line from the cart.
    fn clear_cart(&self) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Catalog and store-wide reads against the backend.
pub trait CatalogGateway {
    /// Fetch one page of a category listing.
    fn fetch_category_page(
        &self,
        category_id: &CategoryId,
        page: u32,
        limit: u32,
        sort: Option<SortMode>,
    ) -> impl Future<Output = Result<FetchedCategoryPage, GatewayError>> + Send;

    /// Fetch product suggestions for a partial search query.
    fn suggest_products(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    /// Fetch store-wide settings (VAT rate, currency symbol).
    fn fetch_store_settings(
        &self,
    ) -> impl Future<Output = Result<StoreSettings, GatewayError>> + Send;
}
