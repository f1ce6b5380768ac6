//! Order submission: validate, build payload, dispatch, branch on the response.

use rust_decimal::Decimal;
use strum_macros::{Display, EnumString};
use tracing::{error, info, instrument, warn};

use crate::domain::cart::{AddressId, CartMode, CartStore, GuestCartRecord, LineItem};

use super::{
    AddressForm, AddressSelection, AppliedVoucher, CheckoutError, ManualAddress, OrderId,
    PriceBreakdown, PricingOverrides, compute_breakdown, order_id, pricing, redirect_url,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, serde::Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery, confirmed immediately.
    Cod,
    Vnpay,
    Momo,
}

//------------------------- Payloads ----------------------------

/// Body of `POST /nologin`. The server holds no guest cart, so the lines travel inline.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GuestOrderPayload {
    pub payment_method: PaymentMethod,
    pub address_manual: ManualAddress,
    pub cart_items: Vec<GuestCartRecord>,
    /// Guests cannot redeem vouchers; always sent as `null`.
    pub voucher_code: Option<String>,
}

/// Body of `POST /dathang`. The server already has the cart.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AuthenticatedOrderPayload {
    pub payment_method: PaymentMethod,
    pub voucher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_manual: Option<ManualAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub payment_method: PaymentMethod,
    pub address: AddressForm,
    pub voucher_code: Option<String>,
}

/// Terminal state of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Accepted without a payment redirect. The id is absent when the response carried none.
    Placed { order_id: Option<OrderId> },
    /// The browser must continue at the payment gateway.
    Redirected { url: String },
    /// Nothing was changed; the cart is intact and the order can be retried.
    Failed(CheckoutError),
}

//------------------------- Engine ----------------------------

#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    fee_per_shop: Decimal,
}

impl CheckoutEngine {
    pub fn new(fee_per_shop: Decimal) -> Self {
        Self { fee_per_shop }
    }

    /// Computed fresh on every call; callers re-run it after each cart or voucher change.
    pub fn breakdown(&self, items: &[LineItem], voucher: Option<&AppliedVoucher>) -> PriceBreakdown {
        let overrides = voucher
            .map(|applied| {
                let merchandise_total =
                    pricing::subtotal(items) - pricing::promotion_discount(items);
                applied.overrides(merchandise_total)
            })
            .unwrap_or_default();
        self.breakdown_with(items, &overrides)
    }

    pub fn breakdown_with(&self, items: &[LineItem], overrides: &PricingOverrides) -> PriceBreakdown {
        compute_breakdown(items, overrides, self.fee_per_shop)
    }

    /// Places an order for the store's cart. The cart is cleared only when the backend accepts
    /// the order.
    #[instrument(skip(self, store, request), fields(payment_method = %request.payment_method))]
    pub async fn submit_order(&self, store: &mut CartStore, request: OrderRequest) -> OrderOutcome {
        let selection = match AddressSelection::try_from(request.address) {
            Ok(selection) => selection,
            Err(e) => return OrderOutcome::Failed(e.into()),
        };

        // A degraded cart is the unsynced guest cart. It must reach the server before `/dathang`.
        if store.mode() == CartMode::Degraded {
            info!("Retrying the server cart before placing the order.");
            store.load().await;
            if store.mode() == CartMode::Degraded {
                warn!("Server cart still unavailable, order not sent.");
                return OrderOutcome::Failed(CheckoutError::CartNotSynced);
            }
        }

        let credential = match store.mode() {
            CartMode::Authenticated => store.credential().cloned(),
            CartMode::Guest | CartMode::Degraded => None,
        };

        let response = match credential {
            None => {
                let AddressSelection::Manual(address_manual) = selection else {
                    return OrderOutcome::Failed(CheckoutError::SavedAddressRequiresLogin);
                };
                if store.is_empty() {
                    return OrderOutcome::Failed(CheckoutError::EmptyCart);
                }
                let payload = GuestOrderPayload {
                    payment_method: request.payment_method,
                    address_manual,
                    cart_items: store.items().iter().map(GuestCartRecord::from).collect(),
                    voucher_code: None,
                };
                store.api().place_guest_order(&payload).await
            }
            Some(credential) => {
                let (address_id, address_manual) = match selection {
                    AddressSelection::Saved(id) => (Some(id), None),
                    AddressSelection::Manual(address) => (None, Some(address)),
                };
                let payload = AuthenticatedOrderPayload {
                    payment_method: request.payment_method,
                    voucher_code: request
                        .voucher_code
                        .map(|code| code.trim().to_owned())
                        .filter(|code| !code.is_empty()),
                    address_id,
                    address_manual,
                };
                store.api().place_order(&credential, &payload).await
            }
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!("Order could not be placed: {e}");
                return OrderOutcome::Failed(CheckoutError::from(&e));
            }
        };

        if let Some(url) = redirect_url(&response) {
            info!("Order accepted, continuing at payment gateway.");
            store.clear();
            return OrderOutcome::Redirected { url };
        }

        let order_id = order_id(&response);
        match &order_id {
            Some(id) => info!("Order {id} placed."),
            None => warn!("Order placed but the response carried no order id: {response}"),
        }
        store.clear();
        OrderOutcome::Placed { order_id }
    }
}

//-------------------------- Tests -------------------------------
