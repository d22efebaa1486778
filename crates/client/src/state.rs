//! Application state for one storefront session.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use cartwheel_core::{CartItemId, CartLine, LineSyncState, Product, StoreSettings};
use rust_decimal::Decimal;

use crate::cart::{CartTotals, CommitSummary, QuantityReconciler};
use crate::catalog::{CatalogBrowser, CategoryView, LoadedPage};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{CartGateway, CatalogGateway, GatewayError};
use crate::search::{SuggestionTracker, fetch_suggestions};

/// Everything a storefront session holds: the gateway, the cart reconciler,
/// the category page cache, and the search tracker.
///
/// Nothing is global; drop the value and the session is gone.
#[derive(Debug)]
pub struct Storefront<G> {
    gateway: G,
    cart: QuantityReconciler,
    catalog: CatalogBrowser,
    search: SuggestionTracker,
    settings: Option<StoreSettings>,
    search_debounce: Duration,
}

impl<G> Storefront<G>
where
    G: CartGateway + CatalogGateway,
{
    /// Create a session over a gateway.
    #[must_use]
    pub fn new(gateway: G, config: &ClientConfig) -> Self {
        Self {
            gateway,
            cart: QuantityReconciler::new(),
            catalog: CatalogBrowser::new(config.cache_policy, config.page_limit),
            search: SuggestionTracker::new(config.search_min_chars),
            settings: None,
            search_debounce: config.search_debounce,
        }
    }

    /// The gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The cart reconciler.
    #[must_use]
    pub const fn cart(&self) -> &QuantityReconciler {
        &self.cart
    }

    /// The category browser and its cache.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogBrowser {
        &self.catalog
    }

    /// The search tracker.
    #[must_use]
    pub const fn search_tracker(&self) -> &SuggestionTracker {
        &self.search
    }

    /// Store settings, if loaded.
    #[must_use]
    pub const fn settings(&self) -> Option<&StoreSettings> {
        self.settings.as_ref()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Reload the cart from the backend, discarding unsaved edits.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the current snapshot is kept.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&mut self) -> Result<&[CartLine], ClientError> {
        let lines = self.gateway.fetch_cart_snapshot().await?;
        self.cart.initialize(lines);
        Ok(self.cart.lines())
    }

    /// Add one unit to a line, up to its stock.
    ///
    /// Returns the new pending quantity, or `None` for an unknown line.
    pub fn increment(&mut self, item_id: &CartItemId) -> Option<u32> {
        let stock = self.cart.line(item_id)?.stock;
        self.cart.increment(item_id, stock)
    }

    /// Remove one unit from a line, down to 1.
    ///
    /// Returns the new pending quantity, or `None` for an unknown line.
    pub fn decrement(&mut self, item_id: &CartItemId) -> Option<u32> {
        self.cart.decrement(item_id)
    }

    /// Sync state of one line.
    #[must_use]
    pub fn line_state(&self, item_id: &CartItemId) -> Option<LineSyncState> {
        self.cart.line_state(item_id)
    }

    /// Whether there are unsaved quantity edits.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.cart.is_dirty()
    }

    /// Send every unsaved edit and reload the cart.
    ///
    /// # Errors
    ///
    /// See [`QuantityReconciler::commit`].
    pub async fn save_cart(&mut self) -> Result<CommitSummary, ClientError> {
        Ok(self.cart.commit(&self.gateway).await?)
    }

    /// Remove a line and reload the cart.
    ///
    /// A line that is already gone still triggers the reload.
    ///
    /// # Errors
    ///
    /// Returns the removal or reload error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_line(&mut self, item_id: &CartItemId) -> Result<(), ClientError> {
        match self.gateway.remove_cart_line(item_id).await {
            Ok(()) => {}
            Err(GatewayError::NotFound(message)) => {
                warn!(message = %message, "Cart line already removed");
            }
            Err(err) => return Err(err.into()),
        }
        self.refresh_cart().await?;
        Ok(())
    }

    /// Empty the cart and reload it.
    ///
    /// # Errors
    ///
    /// Returns the clear or reload error.
    #[instrument(skip(self))]
    pub async fn clear_cart(&mut self) -> Result<(), ClientError> {
        self.gateway.clear_cart().await?;
        self.refresh_cart().await?;
        Ok(())
    }

    /// Totals at the pending quantities, using the loaded VAT rate (zero if
    /// settings are not loaded).
    #[must_use]
    pub fn cart_totals(&self) -> CartTotals {
        let vat = self
            .settings
            .as_ref()
            .map_or(Decimal::ZERO, |settings| settings.vat_percent);
        CartTotals::compute(&self.cart, vat)
    }

    /// Fetch store settings.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; previously loaded settings are kept.
    pub async fn load_settings(&mut self) -> Result<&StoreSettings, ClientError> {
        let settings = self.gateway.fetch_store_settings().await?;
        debug!(vat = %settings.vat_percent, "Store settings loaded");
        Ok(&*self.settings.insert(settings))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Load the page a view points at, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns the gateway error on a cache miss that fails to fetch.
    pub async fn load_category(
        &mut self,
        view: &mut CategoryView,
    ) -> Result<LoadedPage, ClientError> {
        Ok(self.catalog.load_page(&self.gateway, view).await?)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Record a keystroke and fetch suggestions for it.
    ///
    /// Returns the suggestions now shown. A query below the minimum length
    /// clears them without a request.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; shown suggestions are unchanged.
    pub async fn search(&mut self, query: &str) -> Result<&[Product], ClientError> {
        let Some(ticket) = self.search.begin(query) else {
            return Ok(self.search.suggestions());
        };
        if let Some(results) =
            fetch_suggestions(&self.gateway, &ticket, self.search_debounce).await?
        {
            self.search.complete(&ticket, results);
        }
        Ok(self.search.suggestions())
    }

    /// Drop the current query and suggestions.
    pub fn clear_search(&mut self) {
        self.search.clear();
    }
}
