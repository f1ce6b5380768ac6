//! Merge of the guest cart into the authenticated cart at login.

use std::collections::HashSet;

use futures::{StreamExt, stream};
use tracing::{info, warn};

use crate::infra::{AddToCartRequest, Credential, MarketplaceApi};

use super::{ItemKey, LineItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub pushed: Vec<ItemKey>,
    pub duplicates: Vec<ItemKey>,
    pub failed: Vec<FailedPush>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPush {
    pub key: ItemKey,
    pub message: String,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Splits local items into those to push and those already in the server cart.
/// A key is pushed at most once even if the guest cart lists it twice.
pub fn plan_reconciliation<'a>(
    local: &'a [LineItem],
    server: &[LineItem],
) -> (Vec<&'a LineItem>, Vec<ItemKey>) {
    let mut seen: HashSet<ItemKey> = server.iter().map(LineItem::key).collect();
    let mut to_push = Vec::new();
    let mut duplicates = Vec::new();

    for item in local {
        let key = item.key();
        if seen.contains(&key) {
            duplicates.push(key);
        } else {
            seen.insert(key);
            to_push.push(item);
        }
    }

    (to_push, duplicates)
}

/// Pushes guest items missing from the server cart, at most `concurrency` at a time.
/// A failed push is recorded and does not stop the others.
pub async fn reconcile(
    api: &dyn MarketplaceApi,
    credential: &Credential,
    local: &[LineItem],
    server: &[LineItem],
    concurrency: usize,
) -> ReconcileReport {
    let (to_push, duplicates) = plan_reconciliation(local, server);

    let results: Vec<(ItemKey, Result<(), String>)> = stream::iter(to_push)
        .map(|item| async move {
            let request = AddToCartRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                replace_quantity: false,
                variant_id: item.variant_id,
            };
            let result = api
                .add_to_cart(credential, &request)
                .await
                .map_err(|e| {
                    e.server_message()
                        .map_or_else(|| e.to_string(), ToOwned::to_owned)
                });
            (item.key(), result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = ReconcileReport {
        duplicates,
        ..Default::default()
    };
    for (key, result) in results {
        match result {
            Ok(()) => report.pushed.push(key),
            Err(message) => {
                warn!("Could not move guest cart item {key} to the server cart: {message}");
                report.failed.push(FailedPush { key, message });
            }
        }
    }
    report.pushed.sort();
    report.failed.sort_by(|a, b| a.key.cmp(&b.key));

    info!(
        "Guest cart reconciled: {} pushed, {} already present, {} failed.",
        report.pushed.len(),
        report.duplicates.len(),
        report.failed.len()
    );
    report
}

//-------------------------- Tests -------------------------------
