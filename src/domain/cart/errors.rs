use crate::infra::{ClientError, StorageError};

use super::LineItemId;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Cart item {0} does not exist.")]
    ItemNotFound(LineItemId),
    #[error("Cart could not be saved on this device.")]
    Storage(#[from] StorageError),
    #[error("Cart could not be updated: {0}")]
    Network(#[from] ClientError),
    #[error("Cart was updated but could not be refreshed. Reload the cart.")]
    RefreshFailed(#[source] ClientError),
}
