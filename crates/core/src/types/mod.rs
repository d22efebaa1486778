//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for common storefront concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;
pub mod status;
pub mod store;

pub use cart::{CartLine, Selection};
pub use catalog::{
    CategoryInfo, CategoryPage, PageKey, Pagination, Product, SortMode, SortModeError,
};
pub use id::*;
pub use price::Price;
pub use status::LineSyncState;
pub use store::StoreSettings;
