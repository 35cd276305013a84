//! # Cart Store
//!
//! The live cart for one terminal session, with durability bolted on:
//! every mutation writes a fresh snapshot, and startup rehydrates from
//! the last one.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     Cart Store Lifecycle                       │
//! │                                                                │
//! │  startup ──► load snapshot ──► Cart (or empty on any failure)  │
//! │                                                                │
//! │  add / remove / quantity / discount / clear                    │
//! │        │                                                       │
//! │        ├──► mutate in-memory Cart (tally-core semantics)       │
//! │        └──► save snapshot (failure logged, never surfaced)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of the mutating operations can fail from the caller's side. A
//! persistence error costs durability until the next successful save,
//! not the sale in progress.

use tracing::{debug, warn};

use crate::repository::snapshot::CartSnapshotRepository;
use tally_core::{compute_totals, Cart, CartTotals, CatalogItem, TaxRate};

/// The terminal session's cart, persisted across reloads.
#[derive(Debug, Clone)]
pub struct CartStore {
    terminal_id: String,
    cart: Cart,
    snapshots: CartSnapshotRepository,
}

impl CartStore {
    /// Rehydrates the cart for a terminal.
    ///
    /// A missing, corrupt or unreadable snapshot all degrade to an empty
    /// cart; this constructor cannot fail.
    pub async fn load(terminal_id: impl Into<String>, snapshots: CartSnapshotRepository) -> Self {
        let terminal_id = terminal_id.into();

        let cart = match snapshots.load(&terminal_id).await {
            Ok(Some(cart)) => {
                debug!(terminal = %terminal_id, lines = cart.line_count(), "cart rehydrated");
                cart
            }
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!(terminal = %terminal_id, error = %err, "snapshot load failed, starting empty");
                Cart::new()
            }
        };

        CartStore {
            terminal_id,
            cart,
            snapshots,
        }
    }

    /// The current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn terminal_id(&self) -> &str {
        &self.terminal_id
    }

    /// Totals for the current cart at the given flat tax rate.
    pub fn totals(&self, tax_rate: TaxRate) -> CartTotals {
        compute_totals(&self.cart, tax_rate)
    }

    /// Adds one unit of an item (incrementing an existing line).
    pub async fn add_item(&mut self, item: &CatalogItem) {
        self.cart.add_item(item);
        self.persist().await;
    }

    /// Removes a line outright. No-op if absent.
    pub async fn remove_line(&mut self, item_id: &str) {
        self.cart.remove_line(item_id);
        self.persist().await;
    }

    /// Applies a quantity delta; hitting zero removes the line.
    pub async fn change_quantity(&mut self, item_id: &str, delta: i64) {
        self.cart.change_quantity(item_id, delta);
        self.persist().await;
    }

    /// Sets a per-unit discount from raw input (coerced, clamped).
    pub async fn set_line_discount(&mut self, item_id: &str, raw: &str) {
        self.cart.set_line_discount(item_id, raw);
        self.persist().await;
    }

    /// Empties the cart.
    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(err) = self.snapshots.save(&self.terminal_id, &self.cart).await {
            warn!(
                terminal = %self.terminal_id,
                error = %err,
                "cart snapshot save failed, cart remains in memory only"
            );
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
