//! Category browsing: page cache, browsing cursor, and cache-first loader.

mod browser;
mod cache;
mod view;

pub use browser::{CatalogBrowser, LoadedPage, PageSource};
pub use cache::{CachePolicy, CachePolicyError, CategoryPageCache};
pub use view::CategoryView;
