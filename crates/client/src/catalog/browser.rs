//! Cache-first category page loading.

use std::sync::Arc;

use tracing::{debug, instrument};

use cartwheel_core::{CategoryInfo, CategoryPage};

use super::cache::{CachePolicy, CategoryPageCache};
use super::view::CategoryView;
use crate::gateway::{CatalogGateway, GatewayError};

/// Where a loaded page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// Served from the page cache without a network call.
    Cache,
    /// Fetched from the gateway and stored.
    Network,
}

/// A page ready for display.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Category metadata (first stored value for the category).
    pub info: Option<CategoryInfo>,
    /// The page itself.
    pub page: Arc<CategoryPage>,
    /// Whether the page was a cache hit.
    pub source: PageSource,
}

/// Loads category pages through a [`CategoryPageCache`].
///
/// A cached `(category, page, sort)` is never fetched again. A failed fetch
/// stores nothing, so the next attempt goes back to the network.
#[derive(Debug)]
pub struct CatalogBrowser {
    cache: CategoryPageCache,
    page_limit: u32,
}

impl CatalogBrowser {
    /// Create a browser with its own cache.
    #[must_use]
    pub fn new(policy: CachePolicy, page_limit: u32) -> Self {
        Self {
            cache: CategoryPageCache::new(policy),
            page_limit: page_limit.max(1),
        }
    }

    /// The underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &CategoryPageCache {
        &self.cache
    }

    /// Products requested per page.
    #[must_use]
    pub const fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Load the page a view points at, from cache when possible.
    ///
    /// Updates the view's known page range from the loaded pagination.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error unchanged on a failed fetch. The cache is
    /// not modified in that case.
    #[instrument(skip(self, gateway, view), fields(category_id = %view.category_id(), key = %view.key()))]
    pub async fn load_page<G: CatalogGateway>(
        &mut self,
        gateway: &G,
        view: &mut CategoryView,
    ) -> Result<LoadedPage, GatewayError> {
        let category_id = view.category_id().clone();

        if let Some(page) = self.cache.get_page(&category_id, view.page(), view.sort()) {
            debug!("Cache hit for category page");
            view.observe(&page.pagination);
            return Ok(LoadedPage {
                info: self.cache.category_info(&category_id).cloned(),
                page,
                source: PageSource::Cache,
            });
        }

        let fetched = gateway
            .fetch_category_page(&category_id, view.page(), self.page_limit, view.sort())
            .await?;

        let page = self.cache.put_page(
            &category_id,
            view.page(),
            view.sort(),
            fetched.category,
            fetched.page,
        );
        view.observe(&page.pagination);

        Ok(LoadedPage {
            info: self.cache.category_info(&category_id).cloned(),
            page,
            source: PageSource::Network,
        })
    }
}
