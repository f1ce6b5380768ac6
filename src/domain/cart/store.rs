//! The single owner of the active cart.

use std::{sync::Arc, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use strum_macros::Display;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::infra::{AddToCartRequest, ClientError, Credential, MarketplaceApi};

use super::{
    CartChanged, CartError, CartNotifier, ChangeReason, GuestCart, LineItem, LineItemId,
    NewLineItem, ReconcileReport, line_item::clamp_quantity, reconcile,
};

/// Which backing store mutations are written through to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CartMode {
    Guest,
    Authenticated,
    /// Signed in, but the server cart could not be fetched. The guest cart is served instead.
    Degraded,
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub fetch_retries: usize,
    pub reconcile_concurrency: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fetch_retries: 2,
            reconcile_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub mode: CartMode,
    pub reconciliation: Option<ReconcileReport>,
}

/// A staged copy of the line items. It replaces the cart only once the write through succeeds,
/// dropping it is the rollback.
#[derive(Debug)]
struct Tentative {
    items: Vec<LineItem>,
    reason: ChangeReason,
}

enum ServerWrite {
    Update { id: LineItemId, quantity: u32 },
    Remove(LineItemId),
}

pub struct CartStore {
    api: Arc<dyn MarketplaceApi>,
    guest: GuestCart,
    credential: Option<Credential>,
    items: Vec<LineItem>,
    mode: CartMode,
    notifier: CartNotifier,
    options: StoreOptions,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("mode", &self.mode)
            .field("credential", &self.credential)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        guest: GuestCart,
        credential: Option<Credential>,
        options: StoreOptions,
    ) -> Self {
        Self {
            api,
            guest,
            credential,
            items: Vec::new(),
            mode: CartMode::Guest,
            notifier: CartNotifier::default(),
            options,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn mode(&self) -> CartMode {
        self.mode
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn api(&self) -> &dyn MarketplaceApi {
        self.api.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.notifier.subscribe()
    }

    //------------------------- Loading ----------------------------

    /// Loads the cart for the current credential. Never fails: when the server cart cannot be
    /// fetched the guest cart is served instead.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> LoadOutcome {
        let local = self.guest.load();

        let Some(credential) = self.credential.clone() else {
            return self.finish_load(local, CartMode::Guest, None);
        };

        let mut items = match self.fetch_server_cart(&credential).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Serving the guest cart because the server cart could not be fetched: {e}");
                return self.finish_load(local, CartMode::Degraded, None);
            }
        };

        if local.is_empty() {
            return self.finish_load(items, CartMode::Authenticated, None);
        }

        let report = reconcile(
            self.api.as_ref(),
            &credential,
            &local,
            &items,
            self.options.reconcile_concurrency,
        )
        .await;

        if !report.pushed.is_empty() {
            match self.fetch_server_cart(&credential).await {
                Ok(refreshed) => items = refreshed,
                Err(e) => warn!("Server cart could not be refreshed after reconciliation: {e}"),
            }
        }

        if let Err(e) = self.guest.clear() {
            warn!("Guest cart could not be cleared after reconciliation: {e}");
        }

        self.finish_load(items, CartMode::Authenticated, Some(report))
    }

    /// Switches to the authenticated cart. This is the moment the guest cart is reconciled.
    pub async fn login(&mut self, credential: Credential) -> LoadOutcome {
        self.credential = Some(credential);
        self.load().await
    }

    pub async fn logout(&mut self) -> LoadOutcome {
        self.credential = None;
        self.load().await
    }

    fn finish_load(
        &mut self,
        items: Vec<LineItem>,
        mode: CartMode,
        reconciliation: Option<ReconcileReport>,
    ) -> LoadOutcome {
        info!("Cart loaded in {mode} mode with {} lines.", items.len());
        self.items = items;
        self.mode = mode;
        self.notifier.notify(&self.items, ChangeReason::Loaded);
        LoadOutcome {
            mode,
            reconciliation,
        }
    }

    async fn fetch_server_cart(&self, credential: &Credential) -> Result<Vec<LineItem>, ClientError> {
        let api = &self.api;
        (|| async move { api.fetch_cart(credential).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(self.options.fetch_retries),
            )
            .when(ClientError::is_retryable)
            .sleep(tokio::time::sleep)
            .notify(|err, dur| warn!("Retrying GET /cart after {dur:?} due to: {err}"))
            .await
    }

    //------------------------ Mutations ---------------------------

    /// Adds an item, merging with an existing line of the same identity.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add(&mut self, mut item: NewLineItem) -> Result<(), CartError> {
        item.quantity = item.quantity.max(1);

        if let (CartMode::Authenticated, Some(credential)) = (self.mode, self.credential.clone()) {
            let request = AddToCartRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                replace_quantity: false,
                variant_id: item.variant_id,
            };
            self.api.add_to_cart(&credential, &request).await?;

            let items = self
                .fetch_server_cart(&credential)
                .await
                .map_err(CartError::RefreshFailed)?;
            self.commit(Tentative {
                items,
                reason: ChangeReason::Added,
            });
            return Ok(());
        }

        let mut tentative = self.stage(ChangeReason::Added);
        let key = item.key();
        match tentative.items.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => {
                let next_id = tentative
                    .items
                    .iter()
                    .map(|existing| existing.id.get())
                    .max()
                    .unwrap_or(0)
                    + 1;
                tentative.items.push(item.into_line_item(LineItemId::new(next_id)));
            }
        }
        self.guest.save(&tentative.items)?;
        self.commit(tentative);
        Ok(())
    }

    /// Sets a line's quantity. Values below one are written as one.
    #[instrument(skip(self))]
    pub async fn update_quantity(&mut self, id: LineItemId, quantity: i64) -> Result<(), CartError> {
        let quantity = clamp_quantity(quantity);
        let mut tentative = self.stage(ChangeReason::QuantityChanged);
        let line = tentative
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))?;
        line.quantity = quantity;

        self.write_through(tentative, ServerWrite::Update { id, quantity })
            .await
    }

    /// Removes a line. Guest removals are optimistic, authenticated ones wait for the server.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: LineItemId) -> Result<(), CartError> {
        let mut tentative = self.stage(ChangeReason::Removed);
        let before = tentative.items.len();
        tentative.items.retain(|item| item.id != id);
        if tentative.items.len() == before {
            return Err(CartError::ItemNotFound(id));
        }

        self.write_through(tentative, ServerWrite::Remove(id)).await
    }

    /// Empties the cart in memory and on this device. The server empties its own cart when an
    /// order is placed.
    pub fn clear(&mut self) {
        if let Err(e) = self.guest.clear() {
            warn!("Guest cart could not be cleared from local storage: {e}");
        }
        self.commit(Tentative {
            items: Vec::new(),
            reason: ChangeReason::Cleared,
        });
    }

    fn stage(&self, reason: ChangeReason) -> Tentative {
        Tentative {
            items: self.items.clone(),
            reason,
        }
    }

    fn commit(&mut self, tentative: Tentative) {
        self.items = tentative.items;
        self.notifier.notify(&self.items, tentative.reason);
    }

    async fn write_through(
        &mut self,
        tentative: Tentative,
        write: ServerWrite,
    ) -> Result<(), CartError> {
        match (self.mode, self.credential.clone()) {
            (CartMode::Authenticated, Some(credential)) => {
                match write {
                    ServerWrite::Update { id, quantity } => {
                        self.api.update_cart_item(&credential, id, quantity).await?
                    }
                    ServerWrite::Remove(id) => self.api.remove_cart_item(&credential, id).await?,
                }
                self.commit(tentative);
            }
            _ => {
                self.guest.save(&tentative.items)?;
                self.commit(tentative);
            }
        }
        Ok(())
    }
}

//-------------------------- Tests -------------------------------
