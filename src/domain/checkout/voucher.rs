//! Vouchers and the pricing overrides they produce.

use rust_decimal::Decimal;

use super::PricingOverrides;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherKind {
    Fixed(Decimal),
    Percent {
        percent: Decimal,
        max_discount: Option<Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    pub code: String,
    pub kind: VoucherKind,
    pub min_order_value: Decimal,
    pub free_shipping: bool,
}

impl Voucher {
    /// Client side estimate of the discount on the merchandise total (after promotions).
    pub fn estimate_discount(&self, merchandise_total: Decimal) -> Decimal {
        if merchandise_total <= Decimal::ZERO || merchandise_total < self.min_order_value {
            return Decimal::ZERO;
        }
        let discount = match &self.kind {
            VoucherKind::Fixed(amount) => *amount,
            VoucherKind::Percent {
                percent,
                max_discount,
            } => {
                let raw = (merchandise_total * *percent / Decimal::ONE_HUNDRED).floor();
                max_discount.map_or(raw, |cap| raw.min(cap))
            }
        };
        discount.max(Decimal::ZERO).min(merchandise_total)
    }
}

/// Figures the server returned when it validated the voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct VoucherConfirmation {
    pub discount: Decimal,
    #[serde(default)]
    pub is_free_shipping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedVoucher {
    pub voucher: Voucher,
    pub confirmation: Option<VoucherConfirmation>,
}

impl AppliedVoucher {
    pub fn estimated(voucher: Voucher) -> Self {
        Self {
            voucher,
            confirmation: None,
        }
    }

    pub fn confirmed(voucher: Voucher, confirmation: VoucherConfirmation) -> Self {
        Self {
            voucher,
            confirmation: Some(confirmation),
        }
    }

    pub fn code(&self) -> &str {
        &self.voucher.code
    }

    /// A server confirmation wins over the client estimate. Only voucher discount and shipping
    /// are ever overridden.
    pub fn overrides(&self, merchandise_total: Decimal) -> PricingOverrides {
        match self.confirmation {
            Some(confirmation) => PricingOverrides {
                voucher_discount: Some(confirmation.discount),
                shipping: None,
                free_shipping: confirmation.is_free_shipping,
            },
            None => PricingOverrides {
                voucher_discount: Some(self.voucher.estimate_discount(merchandise_total)),
                shipping: None,
                free_shipping: self.voucher.free_shipping
                    && merchandise_total >= self.voucher.min_order_value,
            },
        }
    }
}
