//! Price breakdown of a cart.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::domain::cart::LineItem;

/// Figures supplied by a prior server validation. They only ever replace the voucher discount
/// and the shipping charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingOverrides {
    pub voucher_discount: Option<Decimal>,
    pub shipping: Option<Decimal>,
    pub free_shipping: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub promotion_discount: Decimal,
    pub voucher_discount: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Subtotal after promotions, the base a voucher applies to.
    pub fn merchandise_total(&self) -> Decimal {
        self.subtotal - self.promotion_discount
    }
}

/// Sum of list prices.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::list_total).sum()
}

/// Difference between list and effective prices, never negative.
pub fn promotion_discount(items: &[LineItem]) -> Decimal {
    let charged: Decimal = items.iter().map(LineItem::effective_total).sum();
    (subtotal(items) - charged).max(Decimal::ZERO)
}

/// One flat fee per distinct shop. Lines with no known shop count as one shop together.
pub fn shipping_for(items: &[LineItem], fee_per_shop: Decimal) -> Decimal {
    let shops: BTreeSet<_> = items.iter().map(|item| item.shop_id).collect();
    fee_per_shop * Decimal::from(shops.len())
}

/// Computes the breakdown fresh from the cart. Subtotal and promotion discount always come
/// from the line items, whatever the overrides say.
pub fn compute_breakdown(
    items: &[LineItem],
    overrides: &PricingOverrides,
    fee_per_shop: Decimal,
) -> PriceBreakdown {
    let subtotal = subtotal(items);
    let promotion_discount = promotion_discount(items);

    let voucher_discount = overrides
        .voucher_discount
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
        .floor();

    let shipping = if items.is_empty() || overrides.free_shipping {
        Decimal::ZERO
    } else {
        overrides
            .shipping
            .unwrap_or_else(|| shipping_for(items, fee_per_shop))
            .max(Decimal::ZERO)
            .floor()
    };

    let total = (subtotal - promotion_discount - voucher_discount + shipping)
        .max(Decimal::ZERO)
        .floor();

    PriceBreakdown {
        subtotal,
        promotion_discount,
        voucher_discount,
        shipping,
        total,
    }
}

//-------------------------- Tests -------------------------------
