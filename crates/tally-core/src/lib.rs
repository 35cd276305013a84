//! # tally-core: Cart & Checkout Engine for Tally POS
//!
//! Pure business logic for the point-of-sale checkout flow: the cart
//! container, the pricing fold, and the payment state machine that
//! settles a sale against cash, card and a customer's running loan
//! balance.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Tally POS Data Flow                        │
//! │                                                                  │
//! │   Catalog snapshot ──► Cart (lines) ──► Pricing (totals)         │
//! │                                             │                    │
//! │                          customer loan ─────┤                    │
//! │                                             ▼                    │
//! │                                    Checkout state machine        │
//! │                                             │                    │
//! │                                             ▼                    │
//! │                                    Settlement ──► ledger commit  │
//! │                                                 (tally-store)    │
//! │                                                                  │
//! │   NO I/O HERE: persistence and the ledger live in tally-store    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money type (no floating point)
//! - [`types`] - Domain types (CatalogItem, Customer, Settlement, ...)
//! - [`cart`] - The cart container and its mutation semantics
//! - [`pricing`] - Pure totals computation
//! - [`checkout`] - The payment state machine
//! - [`error`] - Checkout domain errors
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output, no side effects
//! 2. **No I/O**: database and network access are forbidden here
//! 3. **Integer money**: all monetary values are cents (i64)
//! 4. **Coerce, don't crash**: cashier input is normalized to safe
//!    defaults; only the checkout machine carries hard validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{Checkout, CheckoutEvent, CheckoutOutcome, CheckoutState, PaymentDraft};
pub use error::{CheckoutError, CheckoutResult};
pub use money::Money;
pub use pricing::{compute_totals, grand_total, CartTotals};
pub use types::{CashPaymentType, CatalogItem, Customer, PaymentMethod, Settlement, TaxRate};
