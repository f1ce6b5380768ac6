use crate::infra::ClientError;

use super::AddressError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] AddressError),
    #[error("Saved addresses are only available when signed in.")]
    SavedAddressRequiresLogin,
    #[error("Cannot place an order with an empty cart.")]
    EmptyCart,
    /// Signed in, but the cart on this device could not be moved to the account yet.
    #[error("Your cart could not be synchronised with your account. Please try again.")]
    CartNotSynced,
    /// The backend's own explanation, shown as is.
    #[error("{message}")]
    Rejected { message: String },
    #[error("Could not place the order. Please try again.")]
    Unavailable,
}

impl CheckoutError {
    /// Failures that were caught before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_)
                | CheckoutError::SavedAddressRequiresLogin
                | CheckoutError::EmptyCart
        )
    }
}

impl From<&ClientError> for CheckoutError {
    fn from(error: &ClientError) -> Self {
        match error.server_message() {
            Some(message) => CheckoutError::Rejected {
                message: message.to_owned(),
            },
            None => CheckoutError::Unavailable,
        }
    }
}
