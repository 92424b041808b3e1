use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bigdecimal::BigDecimal;
use tracing::{debug, info};

use crate::models::cart_item::{CartItem, CartState, ItemDisplayInfo};
use crate::store::subscription::{ListenerRegistry, Subscription};

/// In-memory cart: the panel visibility flag plus the line items.
///
/// Every operation is total. Listeners are notified synchronously after any
/// mutation that changes the state; no-op calls (removing an absent id,
/// setting the flag to its current value) notify nobody.
#[derive(Default)]
pub struct CartStore {
    state: Mutex<CartState>,
    listeners: Arc<ListenerRegistry>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` under the lock and, if it reports a change,
    /// notifies listeners once the lock is released.
    fn mutate<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut CartState) -> bool,
    {
        let changed = change(&mut *self.lock());
        if !changed {
            return false;
        }

        self.listeners.notify(|| self.snapshot());
        true
    }

    /// Registers `listener` and calls it right away with the current state.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartState) + Send + Sync + 'static,
    {
        let listener: Arc<dyn Fn(&CartState) + Send + Sync> = Arc::new(listener);
        let subscription = self.listeners.register(Arc::clone(&listener));
        let snapshot = self.snapshot();
        listener(&snapshot);
        subscription
    }

    /// Registers `listener` for future changes only.
    pub fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartState) + Send + Sync + 'static,
    {
        self.listeners.register(Arc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn add_item(&self, info: ItemDisplayInfo) {
        let id = info.id.clone();
        let mut quantity = 1;

        self.mutate(|state| {
            match state.items.get_mut(&info.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(1);
                    quantity = existing.quantity;
                }
                None => {
                    state
                        .items
                        .insert(info.id.clone(), CartItem::from_display_info(info));
                }
            }
            debug!("Cart after add: {:?}", state.items.values().collect::<Vec<_>>());
            true
        });

        info!("Added '{}' to cart (quantity {})", id, quantity);
    }

    pub fn remove_item(&self, id: &str) {
        let removed = self.mutate(|state| state.items.shift_remove(id).is_some());

        if removed {
            info!("Removed '{}' from cart", id);
        } else {
            debug!("Remove ignored, '{}' is not in the cart", id);
        }
    }

    /// Sets the quantity of an existing line. Zero or negative removes it.
    pub fn update_quantity(&self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let updated = self.mutate(|state| match state.items.get_mut(id) {
            Some(existing) if existing.quantity != quantity => {
                existing.quantity = quantity;
                true
            }
            _ => false,
        });

        if updated {
            debug!("Quantity of '{}' set to {}", id, quantity);
        }
    }

    pub fn clear(&self) {
        if self.mutate(|state| {
            let had_items = !state.items.is_empty();
            state.items.clear();
            had_items
        }) {
            info!("Cart cleared");
        }
    }

    pub fn set_open(&self, open: bool) {
        if self.mutate(|state| std::mem::replace(&mut state.is_open, open) != open) {
            debug!("Cart panel open flag set to {}", open);
        }
    }

    /// Flips the visibility flag and returns the new value.
    pub fn toggle_open(&self) -> bool {
        let open = !self.is_open();
        self.set_open(open);
        open
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn total(&self) -> BigDecimal {
        self.lock().total()
    }

    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }

    pub fn item(&self, id: &str) -> Option<CartItem> {
        self.lock().items.get(id).cloned()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.lock().items.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> CartState {
        self.lock().clone()
    }
}
