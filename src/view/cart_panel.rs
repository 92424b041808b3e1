use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bigdecimal::BigDecimal;
use tracing::{debug, info};

use crate::{
    models::cart_item::CartState,
    store::{CartStore, Subscription},
    view::{
        launcher::{LaunchError, OrderLauncher},
        order_message::{MessagingTarget, OrderMessage, OrderTemplate},
    },
};

pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Hidden,
    Open,
    /// Exit transition running; the store still reports the panel open.
    Closing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub image_src: String,
    pub price: BigDecimal,
    pub quantity: u32,
    pub line_total: BigDecimal,
}

/// Everything a renderer needs to draw the panel once.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelFrame {
    pub phase: PanelPhase,
    pub total_items: u64,
    pub total_price: BigDecimal,
    pub lines: Vec<LineView>,
}

impl PanelFrame {
    fn from_state(state: &CartState, phase: PanelPhase) -> Self {
        let lines = state
            .items()
            .enumerate()
            .map(|(index, item)| LineView {
                position: index + 1,
                id: item.id.clone(),
                name: item.name.clone(),
                image_src: item.image_src.clone(),
                price: item.price.clone(),
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect();

        Self {
            phase,
            total_items: state.item_count(),
            total_price: state.total(),
            lines,
        }
    }

    /// True when the empty-cart placeholder should be shown.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub trait PanelRenderer: Send + Sync {
    fn render(&self, frame: &PanelFrame);
}

#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub close_delay: Duration,
    pub target: MessagingTarget,
    pub template: OrderTemplate,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            close_delay: DEFAULT_CLOSE_DELAY,
            target: MessagingTarget::default(),
            template: OrderTemplate::default(),
        }
    }
}

/// Proof that `begin_close` started an exit transition. Consumed by
/// `finalize_close`, so each close is finalized exactly once.
#[must_use = "a pending close must be passed to CartPanel::finalize_close"]
#[derive(Debug)]
pub struct PendingClose {
    _private: (),
}

#[derive(Debug)]
pub enum OrderOutcome {
    /// Nothing to order; no link was opened.
    EmptyCart,
    Dispatched { url: String, message: OrderMessage },
}

#[derive(Debug, Default)]
struct PanelState {
    was_open: bool,
    visible: bool,
}

impl PanelState {
    fn phase(&self, is_open: bool) -> PanelPhase {
        match (is_open, self.visible) {
            (false, _) => PanelPhase::Hidden,
            (true, true) => PanelPhase::Open,
            (true, false) => PanelPhase::Closing,
        }
    }
}

fn lock(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sidebar view over a `CartStore`.
///
/// Renders on every store notification and forwards user actions back into
/// the store.
pub struct CartPanel {
    store: Arc<CartStore>,
    renderer: Arc<dyn PanelRenderer>,
    state: Arc<Mutex<PanelState>>,
    settings: PanelSettings,
    _subscription: Subscription,
}

impl CartPanel {
    pub fn new(
        store: Arc<CartStore>,
        renderer: Arc<dyn PanelRenderer>,
        settings: PanelSettings,
    ) -> Self {
        let state = Arc::new(Mutex::new(PanelState::default()));

        let listener_state = Arc::clone(&state);
        let listener_renderer = Arc::clone(&renderer);
        let subscription = store.subscribe(move |cart| {
            let phase = {
                let mut panel = lock(&listener_state);
                if cart.is_open && !panel.was_open {
                    panel.visible = true;
                } else if !cart.is_open {
                    panel.visible = false;
                }
                panel.was_open = cart.is_open;
                panel.phase(cart.is_open)
            };
            listener_renderer.render(&PanelFrame::from_state(cart, phase));
        });

        Self {
            store,
            renderer,
            state,
            settings,
            _subscription: subscription,
        }
    }

    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }

    pub fn phase(&self) -> PanelPhase {
        let is_open = self.store.is_open();
        lock(&self.state).phase(is_open)
    }

    pub fn frame(&self) -> PanelFrame {
        let cart = self.store.snapshot();
        let phase = lock(&self.state).phase(cart.is_open);
        PanelFrame::from_state(&cart, phase)
    }

    pub fn open(&self) {
        self.store.set_open(true);
    }

    /// Starts the exit transition. Returns `None` if the panel is hidden or
    /// already closing.
    pub fn begin_close(&self) -> Option<PendingClose> {
        let cart = self.store.snapshot();
        let phase = {
            let mut panel = lock(&self.state);
            if panel.phase(cart.is_open) != PanelPhase::Open {
                return None;
            }
            panel.visible = false;
            panel.phase(cart.is_open)
        };

        debug!("Cart panel closing");
        self.renderer.render(&PanelFrame::from_state(&cart, phase));
        Some(PendingClose { _private: () })
    }

    /// Completes a close started by `begin_close`.
    pub fn finalize_close(&self, _pending: PendingClose) {
        self.store.set_open(false);
        debug!("Cart panel closed");
    }

    /// Runs both close phases with the configured delay in between.
    pub async fn close(&self) -> bool {
        let Some(pending) = self.begin_close() else {
            return false;
        };
        tokio::time::sleep(self.settings.close_delay).await;
        self.finalize_close(pending);
        true
    }

    pub fn increment(&self, id: &str) {
        if let Some(item) = self.store.item(id) {
            self.store.update_quantity(id, i64::from(item.quantity) + 1);
        }
    }

    pub fn decrement(&self, id: &str) {
        if let Some(item) = self.store.item(id) {
            self.store.update_quantity(id, i64::from(item.quantity) - 1);
        }
    }

    pub fn remove(&self, id: &str) {
        self.store.remove_item(id);
    }

    pub fn order_message(&self) -> Option<OrderMessage> {
        OrderMessage::build(&self.settings.template, &self.store.items())
    }

    /// Sends the cart as an order message. An empty cart opens nothing.
    pub fn place_order(&self, launcher: &dyn OrderLauncher) -> Result<OrderOutcome, LaunchError> {
        let Some(message) = self.order_message() else {
            info!("Order skipped, cart is empty");
            return Ok(OrderOutcome::EmptyCart);
        };

        let url = message.link(&self.settings.target);
        launcher.launch(&url)?;

        info!(
            "Order dispatched to {} with {} items",
            self.settings.target.recipient,
            message.total_items()
        );
        Ok(OrderOutcome::Dispatched { url, message })
    }
}
