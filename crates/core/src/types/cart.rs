//! Cart line types.

use serde::{Deserialize, Serialize};

use crate::{CartItemId, Price, ProductId};

/// A chosen value for one product attribute (e.g. `Size: Large`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Attribute name (e.g. "Size", "Color").
    pub name: String,
    /// Chosen value (e.g. "Large", "Blue").
    pub value: String,
}

impl Selection {
    /// Create a new selection.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One line of a cart snapshot, as last confirmed by the server.
///
/// The same product with different selections forms a different line, so
/// `item_id` (not `product_id`) identifies the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID, unique within one snapshot.
    pub item_id: CartItemId,
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Price per unit.
    pub unit_price: Price,
    /// Maximum purchasable quantity.
    pub stock: u32,
    /// Server-confirmed quantity (at least 1).
    pub quantity: u32,
    /// Attribute selections, in display order.
    pub selections: Vec<Selection>,
    /// Image URL for display.
    pub image: Option<String>,
}

impl CartLine {
    /// Line price at the server-confirmed quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Whether the server quantity already sits at the stock ceiling.
    #[must_use]
    pub const fn at_stock_limit(&self) -> bool {
        self.quantity >= self.stock
    }
}
