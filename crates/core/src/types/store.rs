//! Store-wide settings published by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settings that affect how cart totals are computed and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreSettings {
    /// VAT rate as a percentage (e.g. `15` for 15%).
    pub vat_percent: Decimal,
    /// Currency symbol appended to displayed amounts.
    pub currency_symbol: String,
}
