//! Category page cache.
//!
//! Pages are keyed by `(category, page, sort)`; category metadata is kept
//! once per category. Reads and writes are separate operations so a lookup
//! can never start a fetch on its own.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use thiserror::Error;
use tracing::debug;

use cartwheel_core::{CategoryId, CategoryInfo, CategoryPage, PageKey, SortMode};

/// How the page cache gives entries up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Keep every page for the lifetime of the session.
    #[default]
    Unbounded,
    /// Keep at most `max_pages` pages, evicting the least recently used.
    Lru {
        /// Page capacity.
        max_pages: u64,
    },
    /// Drop pages once they are older than `ttl`.
    Ttl {
        /// Time to live per page.
        ttl: Duration,
    },
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Lru { max_pages } => write!(f, "lru:{max_pages}"),
            Self::Ttl { ttl } => write!(f, "ttl:{}", ttl.as_secs()),
        }
    }
}

/// Error returned when parsing a cache policy string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cache policy '{0}' (expected unbounded, lru:<pages>, or ttl:<secs>)")]
pub struct CachePolicyError(pub String);

impl FromStr for CachePolicy {
    type Err = CachePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CachePolicyError(s.to_string());
        let (kind, arg) = s.split_once(':').map_or((s, None), |(k, a)| (k, Some(a)));

        match (kind.to_ascii_lowercase().as_str(), arg) {
            ("unbounded" | "none", None) => Ok(Self::Unbounded),
            ("lru", Some(n)) => match n.parse::<u64>() {
                Ok(max_pages) if max_pages > 0 => Ok(Self::Lru { max_pages }),
                _ => Err(invalid()),
            },
            ("ttl", Some(secs)) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Self::Ttl {
                    ttl: Duration::from_secs(secs),
                }),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

type PageCacheKey = (CategoryId, PageKey);

/// Session-scoped cache of category listing pages.
///
/// Under [`CachePolicy::Unbounded`] a stored page is never dropped. Category
/// metadata is first-writer-wins and survives page eviction.
pub struct CategoryPageCache {
    policy: CachePolicy,
    info: HashMap<CategoryId, CategoryInfo>,
    pages: Cache<PageCacheKey, Arc<CategoryPage>>,
}

impl fmt::Debug for CategoryPageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryPageCache")
            .field("policy", &self.policy)
            .field("categories", &self.info.len())
            .field("pages", &self.pages.entry_count())
            .finish()
    }
}

impl Default for CategoryPageCache {
    fn default() -> Self {
        Self::new(CachePolicy::Unbounded)
    }
}

impl CategoryPageCache {
    /// Create a cache with the given eviction policy.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        let pages = match policy {
            CachePolicy::Unbounded => Cache::builder().build(),
            CachePolicy::Lru { max_pages } => Cache::builder()
                .max_capacity(max_pages)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            CachePolicy::Ttl { ttl } => Cache::builder().time_to_live(ttl).build(),
        };

        Self {
            policy,
            info: HashMap::new(),
            pages,
        }
    }

    /// The configured eviction policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up a cached page. Never fetches.
    #[must_use]
    pub fn get_page(
        &self,
        category_id: &CategoryId,
        page: u32,
        sort: Option<SortMode>,
    ) -> Option<Arc<CategoryPage>> {
        let key = (category_id.clone(), PageKey::new(page, sort));
        let hit = self.pages.get(&key);
        debug!(
            category_id = %category_id,
            key = %key.1,
            hit = hit.is_some(),
            "Category page lookup"
        );
        hit
    }

    /// Store a page, and the category metadata if none is stored yet.
    ///
    /// The page at `(category, page, sort)` is overwritten; metadata already
    /// present for the category is left untouched.
    pub fn put_page(
        &mut self,
        category_id: &CategoryId,
        page: u32,
        sort: Option<SortMode>,
        info: CategoryInfo,
        data: CategoryPage,
    ) -> Arc<CategoryPage> {
        self.info.entry(category_id.clone()).or_insert(info);

        let key = PageKey::new(page, sort);
        let data = Arc::new(data);
        self.pages
            .insert((category_id.clone(), key), Arc::clone(&data));
        debug!(category_id = %category_id, key = %key, "Cached category page");
        data
    }

    /// Cached metadata for a category.
    #[must_use]
    pub fn category_info(&self, category_id: &CategoryId) -> Option<&CategoryInfo> {
        self.info.get(category_id)
    }

    /// Number of cached pages.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.pages.run_pending_tasks();
        self.pages.entry_count()
    }

    /// Drop every page and all category metadata.
    pub fn clear(&mut self) {
        self.info.clear();
        self.pages.invalidate_all();
        self.pages.run_pending_tasks();
    }
}
