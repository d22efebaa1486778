//! Cart totals over pending quantities.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use cartwheel_core::Price;

use super::reconciler::QuantityReconciler;

/// Subtotal, VAT, and grand total for the quantities currently shown.
///
/// Computed from pending quantities, so unsaved edits are reflected
/// immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    /// Sum of unit price times quantity.
    pub subtotal: Price,
    /// VAT on the subtotal, rounded to cents (half away from zero).
    pub tax: Price,
    /// Subtotal plus tax.
    pub total: Price,
}

impl CartTotals {
    /// Compute totals for a reconciler's lines at a VAT percentage.
    #[must_use]
    pub fn compute(reconciler: &QuantityReconciler, vat_percent: Decimal) -> Self {
        let subtotal: Price = reconciler
            .lines()
            .iter()
            .map(|line| {
                let quantity = reconciler
                    .effective_quantity(&line.item_id)
                    .unwrap_or(line.quantity);
                line.unit_price.times(quantity)
            })
            .sum();

        let tax = (subtotal.amount() * vat_percent / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let tax = Price::new(tax);

        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cartwheel_core::{CartItemId, CartLine, ProductId};

    fn line(id: &str, minor: i64, quantity: u32) -> CartLine {
        CartLine {
            item_id: CartItemId::new(id),
            product_id: ProductId::new(id),
            name: id.to_string(),
            unit_price: Price::from_minor(minor),
            stock: 10,
            quantity,
            selections: vec![],
            image: None,
        }
    }

    #[test]
    fn test_totals_use_pending_quantities() {
        let mut rec = QuantityReconciler::new();
        rec.initialize(vec![line("a", 1000, 1), line("b", 550, 2)]);
        rec.increment(&CartItemId::new("a"), 10);

        let totals = CartTotals::compute(&rec, Decimal::new(15, 0));
        assert_eq!(totals.subtotal, Price::from_minor(3100));
        assert_eq!(totals.tax, Price::from_minor(465));
        assert_eq!(totals.total, Price::from_minor(3565));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let mut rec = QuantityReconciler::new();
        // 0.10 * 5% = 0.005 -> 0.01
        rec.initialize(vec![line("a", 10, 1)]);

        let totals = CartTotals::compute(&rec, Decimal::new(5, 0));
        assert_eq!(totals.tax, Price::from_minor(1));
    }

    #[test]
    fn test_empty_cart_is_zero() {
        let rec = QuantityReconciler::new();
        assert_eq!(CartTotals::compute(&rec, Decimal::new(15, 0)), CartTotals::default());
    }
}
