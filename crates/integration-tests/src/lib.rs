//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_reconciliation` - Pending quantities, commits, stale snapshots
//! - `category_cache` - Page cache hits, misses, and sort/page keys
//! - `search_suggestions` - Generation tokens and stale response discard
//! - `storefront_flow` - The session container end to end
//! - `rest_gateway` - The REST gateway against a mock HTTP server
//!
//! Everything except `rest_gateway` runs against [`InMemoryGateway`], a
//! backend held in memory that records every call and can be told to fail.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use cartwheel_client::{CartGateway, CatalogGateway, FetchedCategoryPage, GatewayError};
use cartwheel_core::{
    CartItemId, CartLine, CategoryId, CategoryInfo, CategoryPage, Pagination, Price, Product,
    ProductId, SortMode, StoreSettings,
};
use rust_decimal::Decimal;

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchCart,
    Update(CartItemId, u32),
    Remove(CartItemId),
    Clear,
    FetchCategory {
        category_id: CategoryId,
        page: u32,
        limit: u32,
        sort: Option<SortMode>,
    },
    Suggest(String),
    FetchSettings,
}

/// Which error an injected failure produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Validation,
    NotFound,
    Auth,
}

impl Failure {
    fn to_error(self, context: &str) -> GatewayError {
        match self {
            Self::Network => GatewayError::Network(format!("{context}: connection reset")),
            Self::Validation => GatewayError::Validation(format!("{context}: rejected")),
            Self::NotFound => GatewayError::NotFound(format!("{context}: not found")),
            Self::Auth => GatewayError::Auth(format!("{context}: session expired")),
        }
    }
}

#[derive(Default)]
struct Backend {
    cart: Vec<CartLine>,
    categories: HashMap<CategoryId, (CategoryInfo, Vec<Product>)>,
    catalog: Vec<Product>,
    settings: StoreSettings,
    calls: Vec<Call>,
    update_failures: HashMap<CartItemId, Failure>,
    failing_ops: HashSet<&'static str>,
    suggest_delays: HashMap<String, Duration>,
}

/// In-memory backend implementing both gateway traits.
///
/// Updates validate against stock the way the real backend does: a quantity
/// above stock is a validation error, an unknown line is not found.
#[derive(Default)]
pub struct InMemoryGateway {
    backend: Mutex<Backend>,
}

impl InMemoryGateway {
    /// A backend holding the given cart.
    #[must_use]
    pub fn with_cart(lines: Vec<CartLine>) -> Self {
        let gateway = Self::default();
        gateway.backend.lock().unwrap().cart = lines;
        gateway
    }

    /// Add a category with its full product listing.
    pub fn add_category(&self, id: &str, name: &str, products: Vec<Product>) {
        self.backend.lock().unwrap().categories.insert(
            CategoryId::new(id),
            (
                CategoryInfo {
                    name: name.to_string(),
                    image: None,
                },
                products,
            ),
        );
    }

    /// Products searched by `suggest_products` (case-insensitive name match).
    pub fn set_catalog(&self, products: Vec<Product>) {
        self.backend.lock().unwrap().catalog = products;
    }

    /// Store settings returned by `fetch_store_settings`.
    pub fn set_settings(&self, vat_percent: Decimal, currency_symbol: &str) {
        self.backend.lock().unwrap().settings = StoreSettings {
            vat_percent,
            currency_symbol: currency_symbol.to_string(),
        };
    }

    /// Make updates of one line fail.
    pub fn fail_update(&self, item_id: &str, failure: Failure) {
        self.backend
            .lock()
            .unwrap()
            .update_failures
            .insert(CartItemId::new(item_id), failure);
    }

    /// Stop failing updates of one line.
    pub fn heal_update(&self, item_id: &str) {
        self.backend
            .lock()
            .unwrap()
            .update_failures
            .remove(&CartItemId::new(item_id));
    }

    /// Make every call of an operation fail with a network error.
    ///
    /// Operations: `fetch_cart`, `update`, `remove`, `clear`, `category`,
    /// `suggest`, `settings`. Use [`Self::fail_update`] to fail one line.
    pub fn fail_op(&self, op: &'static str) {
        self.backend.lock().unwrap().failing_ops.insert(op);
    }

    /// Stop failing an operation.
    pub fn heal_op(&self, op: &'static str) {
        self.backend.lock().unwrap().failing_ops.remove(op);
    }

    /// Delay the suggestion response for one query.
    pub fn delay_suggest(&self, query: &str, delay: Duration) {
        self.backend
            .lock()
            .unwrap()
            .suggest_delays
            .insert(query.to_string(), delay);
    }

    /// Remove a line behind the client's back.
    pub fn drop_line(&self, item_id: &str) {
        self.backend
            .lock()
            .unwrap()
            .cart
            .retain(|line| line.item_id.as_str() != item_id);
    }

    /// Server-side quantity of a line.
    #[must_use]
    pub fn server_quantity(&self, item_id: &str) -> Option<u32> {
        self.backend
            .lock()
            .unwrap()
            .cart
            .iter()
            .find(|line| line.item_id.as_str() == item_id)
            .map(|line| line.quantity)
    }

    /// Current server-side cart, without recording a call.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.backend.lock().unwrap().cart.clone()
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.backend.lock().unwrap().calls.clone()
    }

    /// Update calls so far, in order.
    #[must_use]
    pub fn update_calls(&self) -> Vec<(String, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(id, quantity) => Some((id.into_inner(), quantity)),
                _ => None,
            })
            .collect()
    }

    /// Number of category page fetches so far.
    #[must_use]
    pub fn category_fetches(&self) -> usize {
        self.count(|call| matches!(call, Call::FetchCategory { .. }))
    }

    /// Number of calls matching a predicate.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.backend
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| pred(call))
            .count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&self) {
        self.backend.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call, op: &'static str) -> Result<(), GatewayError> {
        let mut backend = self.backend.lock().unwrap();
        backend.calls.push(call);
        if backend.failing_ops.contains(op) {
            return Err(Failure::Network.to_error(op));
        }
        Ok(())
    }
}

impl CartGateway for InMemoryGateway {
    async fn fetch_cart_snapshot(&self) -> Result<Vec<CartLine>, GatewayError> {
        self.record(Call::FetchCart, "fetch_cart")?;
        Ok(self.backend.lock().unwrap().cart.clone())
    }

    async fn update_cart_line(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let mut backend = self.backend.lock().unwrap();
        backend.calls.push(Call::Update(item_id.clone(), quantity));

        if backend.failing_ops.contains("update") {
            return Err(Failure::Network.to_error("update"));
        }
        if let Some(failure) = backend.update_failures.get(item_id) {
            return Err(failure.to_error(item_id.as_str()));
        }
        let Some(line) = backend.cart.iter_mut().find(|line| &line.item_id == item_id) else {
            return Err(GatewayError::NotFound(format!("cart line {item_id}")));
        };
        if quantity == 0 || quantity > line.stock {
            return Err(GatewayError::Validation(format!(
                "quantity {quantity} outside 1..={}",
                line.stock
            )));
        }
        line.quantity = quantity;
        Ok(())
    }

    async fn remove_cart_line(&self, item_id: &CartItemId) -> Result<(), GatewayError> {
        self.record(Call::Remove(item_id.clone()), "remove")?;
        let mut backend = self.backend.lock().unwrap();
        let before = backend.cart.len();
        backend.cart.retain(|line| &line.item_id != item_id);
        if backend.cart.len() == before {
            return Err(GatewayError::NotFound(format!("cart line {item_id}")));
        }
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), GatewayError> {
        self.record(Call::Clear, "clear")?;
        self.backend.lock().unwrap().cart.clear();
        Ok(())
    }
}

impl CatalogGateway for InMemoryGateway {
    async fn fetch_category_page(
        &self,
        category_id: &CategoryId,
        page: u32,
        limit: u32,
        sort: Option<SortMode>,
    ) -> Result<FetchedCategoryPage, GatewayError> {
        self.record(
            Call::FetchCategory {
                category_id: category_id.clone(),
                page,
                limit,
                sort,
            },
            "category",
        )?;

        let backend = self.backend.lock().unwrap();
        let Some((info, products)) = backend.categories.get(category_id) else {
            return Err(GatewayError::NotFound(format!("category {category_id}")));
        };

        let mut products = products.clone();
        match sort {
            Some(SortMode::PriceAsc) => products.sort_by_key(|p| p.price),
            Some(SortMode::PriceDesc) => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
            Some(SortMode::Newest) | None => {}
        }

        let limit = limit.max(1) as usize;
        let total_count = products.len();
        let total_pages = total_count.div_ceil(limit).max(1);
        let start = (page.max(1) as usize - 1) * limit;
        let page_products = products.into_iter().skip(start).take(limit).collect();

        Ok(FetchedCategoryPage {
            category: info.clone(),
            page: CategoryPage {
                products: page_products,
                pagination: Pagination {
                    page,
                    total_pages: u32::try_from(total_pages).unwrap(),
                    total_count: total_count as u64,
                },
            },
        })
    }

    async fn suggest_products(&self, query: &str) -> Result<Vec<Product>, GatewayError> {
        self.record(Call::Suggest(query.to_string()), "suggest")?;

        let delay = self
            .backend
            .lock()
            .unwrap()
            .suggest_delays
            .get(query)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let needle = query.to_lowercase();
        Ok(self
            .backend
            .lock()
            .unwrap()
            .catalog
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_store_settings(&self) -> Result<StoreSettings, GatewayError> {
        self.record(Call::FetchSettings, "settings")?;
        Ok(self.backend.lock().unwrap().settings.clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A cart line priced in minor units.
#[must_use]
pub fn line(id: &str, price_minor: i64, quantity: u32, stock: u32) -> CartLine {
    CartLine {
        item_id: CartItemId::new(id),
        product_id: ProductId::new(format!("prod-{id}")),
        name: format!("Item {id}"),
        unit_price: Price::from_minor(price_minor),
        stock,
        quantity,
        selections: vec![],
        image: None,
    }
}

/// A product priced in minor units.
#[must_use]
pub fn product(id: &str, name: &str, price_minor: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_minor(price_minor),
        compare_price: None,
        images: vec![],
    }
}

/// Shorthand for a cart item ID.
#[must_use]
pub fn item(id: &str) -> CartItemId {
    CartItemId::new(id)
}
