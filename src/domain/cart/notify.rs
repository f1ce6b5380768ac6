use strum_macros::Display;
use tokio::sync::broadcast;

use super::LineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChangeReason {
    Loaded,
    Added,
    QuantityChanged,
    Removed,
    Cleared,
}

/// Broadcast after every mutation that changes the cart's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChanged {
    /// Sum of quantities, the figure shown on the header badge.
    pub item_count: u32,
    pub line_count: usize,
    pub reason: ChangeReason,
}

#[derive(Debug, Clone)]
pub struct CartNotifier {
    sender: broadcast::Sender<CartChanged>,
}

impl CartNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.sender.subscribe()
    }

    pub fn notify(&self, items: &[LineItem], reason: ChangeReason) {
        let change = CartChanged {
            item_count: items.iter().map(|i| i.quantity).sum(),
            line_count: items.len(),
            reason,
        };
        // No subscribers is fine.
        let _ = self.sender.send(change);
    }
}

impl Default for CartNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}
