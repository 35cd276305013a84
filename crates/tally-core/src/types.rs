//! # Domain Types
//!
//! Core domain types for the cart and checkout engine.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                                │
//! │                                                                    │
//! │  ┌───────────────┐   ┌───────────────┐   ┌──────────────────┐     │
//! │  │  CatalogItem  │   │   Customer    │   │   Settlement     │     │
//! │  │  ───────────  │   │  ───────────  │   │  ──────────────  │     │
//! │  │  id           │   │  id           │   │  method          │     │
//! │  │  name         │   │  name         │   │  due_now_cents   │     │
//! │  │  unit_price   │   │  loan_balance │   │  deferred_cents  │     │
//! │  │  stock        │   │               │   │  customer_id     │     │
//! │  └───────────────┘   └───────────────┘   └──────────────────┘     │
//! │                                                                    │
//! │  CatalogItem ──add──► CartLine (cart.rs) ──totals──► Settlement    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Flat tax rate in basis points (1 bp = 0.01%).
///
/// The engine carries a single flat-rate placeholder; the default rate is
/// zero, so totals are untaxed unless a terminal configures otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points (825 = 8.25%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage, for display only.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A sellable product as seen by the cart at add-time.
///
/// This is an immutable snapshot: the cart copies the unit price when a
/// line is created, so a later catalog edit never reprices an open sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogItem {
    /// Opaque unique identifier.
    pub id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Unit price in cents. Non-negative.
    pub unit_price_cents: i64,

    /// Current stock level. Informational only: the engine never
    /// hard-blocks overselling, the stock figure is for the cashier.
    pub available_stock: i64,

    /// Suggested per-unit discount in cents, if the catalog carries one.
    /// A hint for the cashier; new lines always start at zero discount.
    pub discount_hint_cents: Option<i64>,

    /// Whether the item is active (soft delete).
    pub is_active: bool,
}

impl CatalogItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Whether the requested quantity is covered by stock on hand.
    /// Advisory only.
    pub fn stock_covers(&self, quantity: i64) -> bool {
        self.available_stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a running credit ("loan") balance.
///
/// The loan balance is the amount owed to the store from prior
/// unpaid or partially-paid transactions. Only the settlement ledger
/// updates it; the cart reads it to build the grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// Amount currently owed, in cents. Never negative.
    pub loan_balance_cents: i64,
}

impl Customer {
    /// Returns the loan balance as Money.
    #[inline]
    pub fn loan_balance(&self) -> Money {
        Money::from_cents(self.loan_balance_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a checkout is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash, full or partial.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Entire grand total deferred to the customer's loan balance.
    /// Only selectable when a customer is attached to the sale.
    Loan,
}

impl PaymentMethod {
    /// Stable lowercase name, used in the sales ledger rows.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Loan => "loan",
        }
    }
}

/// Whether a cash payment covers the whole grand total or part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashPaymentType {
    /// Pay the entire grand total now.
    #[default]
    Full,
    /// Pay a keyed-in amount now; the shortfall carries to the loan.
    Partial,
}

// =============================================================================
// Settlement
// =============================================================================

/// The finalized split of a grand total at the moment checkout completes.
///
/// Ephemeral: produced once per settled checkout, handed to the ledger,
/// then discarded. Invariant: `amount_due_now_cents +
/// amount_deferred_to_loan_cents == grand_total_cents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub method: PaymentMethod,

    /// Amount collected now (cash in drawer or card capture), in cents.
    pub amount_due_now_cents: i64,

    /// Amount carried forward onto the customer's loan, in cents.
    pub amount_deferred_to_loan_cents: i64,

    /// Grand total being settled (sale total plus prior loan), in cents.
    pub grand_total_cents: i64,

    /// Attached customer, if any. Required whenever any amount is
    /// deferred.
    pub customer_id: Option<String>,
}

impl Settlement {
    /// Returns the amount due now as Money.
    #[inline]
    pub fn amount_due_now(&self) -> Money {
        Money::from_cents(self.amount_due_now_cents)
    }

    /// Returns the deferred amount as Money.
    #[inline]
    pub fn amount_deferred_to_loan(&self) -> Money {
        Money::from_cents(self.amount_deferred_to_loan_cents)
    }

    /// Checks the conservation invariant: due-now plus deferred must
    /// reconstruct the grand total exactly.
    pub fn is_conserved(&self) -> bool {
        self.amount_due_now_cents + self.amount_deferred_to_loan_cents == self.grand_total_cents
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
