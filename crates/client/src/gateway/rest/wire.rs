//! Wire types for the storefront REST API and their conversions.
//!
//! The backend wraps every payload in `{ success, message, data }`. Field
//! names are camelCase and product IDs arrive as `_id`.

use cartwheel_core::{
    CartItemId, CartLine, CategoryInfo, CategoryPage, Pagination, Price, Product, ProductId,
    Selection, StoreSettings,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gateway::FetchedCategoryPage;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body returned with non-success status codes.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CartData {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub item_id: String,
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    pub quantity: i64,
    #[serde(default)]
    pub selections: Vec<CartSelection>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartSelection {
    pub name: String,
    pub value: String,
}

/// Body of `PUT /cart/update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartBody<'a> {
    pub item_id: &'a str,
    pub quantity: u32,
}

/// Clamp a signed wire integer into `u32`.
fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl From<CartItem> for CartLine {
    fn from(item: CartItem) -> Self {
        Self {
            item_id: CartItemId::new(item.item_id),
            product_id: ProductId::new(item.product_id),
            name: item.name,
            unit_price: Price::new(item.price),
            stock: to_u32(item.stock),
            // A line always holds at least one unit
            quantity: to_u32(item.quantity).max(1),
            selections: item
                .selections
                .into_iter()
                .map(|s| Selection::new(s.name, s.value))
                .collect(),
            image: item.image,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPageData {
    pub category: Option<Category>,
    #[serde(default)]
    pub products: Vec<WireProduct>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            image: category.image.map(|img| img.url),
        }
    }
}

impl From<WireProduct> for Product {
    fn from(product: WireProduct) -> Self {
        Self {
            id: ProductId::new(product.id),
            name: product.name,
            price: Price::new(product.price),
            compare_price: product.compare_price.map(Price::new),
            images: product.images.into_iter().map(|img| img.url).collect(),
        }
    }
}

/// Convert a category page payload, filling in the page number the backend
/// omitted and naming the category after its ID when metadata is missing.
pub fn convert_category_page(
    data: CategoryPageData,
    requested_page: u32,
    fallback_name: &str,
) -> FetchedCategoryPage {
    let mut pagination = data.pagination;
    if pagination.page == 0 {
        pagination.page = requested_page;
    }

    let category = data.category.map_or_else(
        || CategoryInfo {
            name: fallback_name.to_string(),
            image: None,
        },
        CategoryInfo::from,
    );

    FetchedCategoryPage {
        category,
        page: CategoryPage {
            products: data.products.into_iter().map(Product::from).collect(),
            pagination,
        },
    }
}

// =============================================================================
// Store settings
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SetupData {
    #[serde(default)]
    pub config: SetupConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetupConfig {
    #[serde(default)]
    pub vat: Decimal,
    /// Currency symbol ("simple" in the backend's schema).
    #[serde(default, rename = "simple")]
    pub currency_symbol: String,
}

impl From<SetupData> for StoreSettings {
    fn from(data: SetupData) -> Self {
        Self {
            vat_percent: data.config.vat.max(Decimal::ZERO),
            currency_symbol: data.config.currency_symbol,
        }
    }
}
