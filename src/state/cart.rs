use tracing::debug;

use super::data::{CartItem, Product};

/// Outcome of a quantity change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No entry for that product; nothing happened
    Missing,
    /// Entry kept with the new quantity
    Updated(u32),
    /// Quantity dropped to zero or below and the entry was removed
    Removed,
}

/// The Cart Ledger: one entry per product, in the order first added.
///
/// Each entry holds a snapshot of the product taken when it was first
/// added, so later catalog or image changes never reach existing entries.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    items: Vec<CartItem>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`. Returns the entry's new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            debug!(product = %product.id, quantity = item.quantity, "cart quantity incremented");
            return item.quantity;
        }

        self.items.push(CartItem {
            product: product.clone(),
            quantity: 1,
        });
        debug!(product = %product.id, "cart entry added");
        1
    }

    /// Apply `delta` to the entry for `id`, removing it once it reaches zero
    pub fn change_quantity(&mut self, id: &str, delta: i64) -> QuantityChange {
        let Some(index) = self.items.iter().position(|item| item.product.id == id) else {
            debug!(product = id, delta, "quantity change for missing cart entry ignored");
            return QuantityChange::Missing;
        };

        let next = i64::from(self.items[index].quantity).saturating_add(delta);
        if next <= 0 {
            self.items.remove(index);
            debug!(product = id, "cart entry removed");
            return QuantityChange::Removed;
        }

        let quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.items[index].quantity = quantity;
        debug!(product = id, quantity, "cart quantity changed");
        QuantityChange::Updated(quantity)
    }

    /// Sum of price * quantity over all entries
    pub fn total(&self) -> u64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Sum of quantities over all entries
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
