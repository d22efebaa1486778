//! Catalog types: products, category metadata, and paginated pages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Price, ProductId};

/// Product ordering offered by category listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Most recently added first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

impl SortMode {
    /// All sort modes, in menu order.
    pub const ALL: [Self; 3] = [Self::Newest, Self::PriceAsc, Self::PriceDesc];

    /// The query-string value the backend expects.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "priceAsc",
            Self::PriceDesc => "priceDesc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort mode: {0}")]
pub struct SortModeError(pub String);

impl FromStr for SortMode {
    type Err = SortModeError;

    /// Accepts both the backend's camelCase names and kebab-case CLI names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "priceAsc" | "price-asc" => Ok(Self::PriceAsc),
            "priceDesc" | "price-desc" => Ok(Self::PriceDesc),
            other => Err(SortModeError(other.to_string())),
        }
    }
}

/// Cache key for one page of a category listing.
///
/// Renders as `page:sort`, with `default` standing in for an unspecified
/// sort. The sort component is an enum so the key space stays bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    /// 1-based page number.
    pub page: u32,
    /// Sort mode, or `None` for the backend default.
    pub sort: Option<SortMode>,
}

impl PageKey {
    /// Create a new page key.
    #[must_use]
    pub const fn new(page: u32, sort: Option<SortMode>) -> Self {
        Self { page, sort }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sort {
            Some(sort) => write!(f, "{}:{sort}", self.page),
            None => write!(f, "{}:default", self.page),
        }
    }
}

/// Category metadata shown above a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Display name.
    pub name: String,
    /// Header image URL.
    pub image: Option<String>,
}

/// A product as it appears in a listing or suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Current price.
    pub price: Price,
    /// Original price if on sale.
    pub compare_price: Option<Price>,
    /// Image URLs, primary first.
    pub images: Vec<String>,
}

impl Product {
    /// The primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product is currently discounted.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_price.is_some_and(|compare| compare > self.price)
    }
}

/// Pagination details for a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of products across all pages.
    #[serde(alias = "total")]
    pub total_count: u64,
}

impl Pagination {
    /// Whether a page exists after this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page exists before this one.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}

/// One page of products for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPage {
    /// Products on this page, in listing order.
    pub products: Vec<Product>,
    /// Pagination details.
    pub pagination: Pagination,
}
