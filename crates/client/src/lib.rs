//! Cartwheel client library.
//!
//! Client-side state for a storefront backed by a remote REST API:
//!
//! - [`cart`] - Optimistic cart quantity edits with deferred, sequential commits
//! - [`catalog`] - Category page cache keyed by (category, page, sort)
//! - [`search`] - Search suggestions with generation tokens for stale results
//! - [`gateway`] - The remote service boundary and its REST implementation
//! - [`state`] - Application-state container tying the pieces together
//!
//! # Architecture
//!
//! The backend is the source of truth. Nothing here persists state; the
//! reconciler and the page cache live for one session and are mutated only
//! through their own operations. Network calls go through the
//! [`CartGateway`] and [`CatalogGateway`] traits so the state machines can be
//! exercised without a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_client::{ClientConfig, RestGateway, Storefront};
//!
//! let config = ClientConfig::from_env()?;
//! let gateway = RestGateway::new(&config)?;
//! let mut store = Storefront::new(gateway, &config);
//!
//! store.refresh_cart().await?;
//! store.increment(&item_id);
//! store.save_cart().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod search;
pub mod state;

pub use cart::{
    CartTotals, CommitBatch, CommitError, CommitOutcome, CommitReport, CommitSummary,
    LineUpdate, QuantityReconciler, SnapshotVersion,
};
pub use catalog::{
    CachePolicy, CachePolicyError, CatalogBrowser, CategoryPageCache, CategoryView, LoadedPage,
    PageSource,
};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use gateway::{CartGateway, CatalogGateway, FetchedCategoryPage, GatewayError, RestGateway};
pub use search::{SuggestionTicket, SuggestionTracker, fetch_suggestions};
pub use state::Storefront;
