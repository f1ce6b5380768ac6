mod errors;
mod guest_cart;
mod ids;
mod line_item;
mod notify;
mod reconcile;
mod store;

pub use errors::CartError;
pub use guest_cart::{GuestCart, GuestCartRecord};
pub use ids::*;
pub use line_item::{
    ItemKey, LineItem, NewLineItem, PriceSource, ServerCartItem, ServerProduct, ServerVariant,
    clamp_quantity,
};
pub use notify::{CartChanged, CartNotifier, ChangeReason};
pub use reconcile::{FailedPush, ReconcileReport, plan_reconciliation, reconcile};
pub use store::{CartMode, CartStore, LoadOutcome, StoreOptions};
