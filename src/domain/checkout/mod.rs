mod address;
mod errors;
mod order_response;
pub mod pricing;
mod submit_order;
mod voucher;

pub use address::{AddressError, AddressForm, AddressSelection, ManualAddress};
pub use errors::CheckoutError;
pub use order_response::{OrderId, order_id, redirect_url};
pub use pricing::{PriceBreakdown, PricingOverrides, compute_breakdown, shipping_for};
pub use submit_order::{
    AuthenticatedOrderPayload, CheckoutEngine, GuestOrderPayload, OrderOutcome, OrderRequest,
    PaymentMethod,
};
pub use voucher::{AppliedVoucher, Voucher, VoucherConfirmation, VoucherKind};
