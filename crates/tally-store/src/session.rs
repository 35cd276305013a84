//! # Checkout Session
//!
//! Orchestrates one terminal's sale: the persisted cart, the attached
//! customer, the checkout state machine, and the settlement commit.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Session Flow                           │
//! │                                                                      │
//! │  add_item_from(catalog) ──► CartStore ──► totals                     │
//! │  attach_customer_from(catalog) ──► loan balance ──► grand total      │
//! │                                                                      │
//! │  begin_checkout ──► machine: MethodSelection                         │
//! │  select_method / select_cash_type / enter_amount                     │
//! │  submit_payment ──► machine: Processing                              │
//! │        │                                                             │
//! │        ├── ledger.commit_settlement ── ok ──► ConfirmPayment,        │
//! │        │                                      clear cart, detach     │
//! │        └────────────────────────────── err ─► PaymentFailed,         │
//! │                                               cart kept for retry    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed ledger commit is surfaced to the caller and the cart stays
//! intact; the payment step drops back to method selection for a retry.
//! (The checkout is never reported settled on a failed commit.)

use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::repository::catalog::CatalogAccess;
use crate::repository::ledger::{CommittedSale, SettlementLedger};
use crate::store::CartStore;
use tally_core::{
    grand_total, CartTotals, CashPaymentType, Checkout, CheckoutEvent, CheckoutOutcome, Customer,
    Money, PaymentMethod, TaxRate,
};

/// One terminal's sale in progress, from first scan to settlement.
#[derive(Debug)]
pub struct CheckoutSession<L: SettlementLedger> {
    store: CartStore,
    ledger: L,
    checkout: Checkout,
    customer: Option<Customer>,
    tax_rate: TaxRate,
}

impl<L: SettlementLedger> CheckoutSession<L> {
    pub fn new(store: CartStore, ledger: L, tax_rate: TaxRate) -> Self {
        CheckoutSession {
            store,
            ledger,
            checkout: Checkout::new(),
            customer: None,
            tax_rate,
        }
    }

    // -------------------------------------------------------------------------
    // Cart access
    // -------------------------------------------------------------------------

    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Direct cart access for line edits (quantity, discounts, removal).
    pub fn store_mut(&mut self) -> &mut CartStore {
        &mut self.store
    }

    /// Fetches an item and adds one unit of it to the cart.
    ///
    /// Returns whether a line was added. A fetch failure or unknown id
    /// is logged and leaves the cart exactly as it was; the terminal
    /// keeps running on the snapshots it already holds.
    pub async fn add_item_from<C: CatalogAccess>(&mut self, catalog: &C, item_id: &str) -> bool {
        match catalog.fetch_catalog_item(item_id).await {
            Ok(Some(item)) => {
                self.store.add_item(&item).await;
                true
            }
            Ok(None) => {
                warn!(item_id = %item_id, "catalog item not found, cart unchanged");
                false
            }
            Err(err) => {
                warn!(item_id = %item_id, error = %err, "catalog fetch failed, cart unchanged");
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Customer attachment
    // -------------------------------------------------------------------------

    /// Attaches an already-fetched customer to the sale.
    pub fn attach_customer(&mut self, customer: Customer) {
        debug!(customer = %customer.id, loan = customer.loan_balance_cents, "customer attached");
        self.customer = Some(customer);
    }

    /// Fetches a customer and attaches them. Returns whether it worked;
    /// on failure the sale simply continues without a customer (loan
    /// balance zero).
    pub async fn attach_customer_from<C: CatalogAccess>(
        &mut self,
        catalog: &C,
        customer_id: &str,
    ) -> bool {
        match catalog.fetch_customer(customer_id).await {
            Ok(Some(customer)) => {
                self.attach_customer(customer);
                true
            }
            Ok(None) => {
                warn!(customer_id = %customer_id, "customer not found");
                false
            }
            Err(err) => {
                warn!(customer_id = %customer_id, error = %err, "customer fetch failed");
                false
            }
        }
    }

    pub fn detach_customer(&mut self) {
        self.customer = None;
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    pub fn totals(&self) -> CartTotals {
        self.store.totals(self.tax_rate)
    }

    /// Sale total plus the attached customer's loan balance.
    pub fn grand_total(&self) -> Money {
        grand_total(&self.totals(), self.customer.as_ref())
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Opens the payment step over the current cart and customer.
    pub fn begin_checkout(&mut self) -> StoreResult<()> {
        if self.store.cart().is_empty() {
            return Err(crate::error::StoreError::EmptyCart);
        }

        let grand_total_cents = self.grand_total().cents();
        self.checkout.apply(CheckoutEvent::Begin {
            grand_total_cents,
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
        })?;

        debug!(grand_total = grand_total_cents, "checkout opened");
        Ok(())
    }

    pub fn select_method(&mut self, method: PaymentMethod) -> StoreResult<()> {
        self.checkout.apply(CheckoutEvent::SelectMethod(method))?;
        Ok(())
    }

    pub fn select_cash_type(&mut self, cash_type: CashPaymentType) -> StoreResult<()> {
        self.checkout.apply(CheckoutEvent::SelectCashType(cash_type))?;
        Ok(())
    }

    pub fn enter_amount(&mut self, raw: impl Into<String>) -> StoreResult<()> {
        self.checkout.apply(CheckoutEvent::EnterAmount(raw.into()))?;
        Ok(())
    }

    /// Abandons the payment step. Swallowed while a commit is in flight.
    pub fn cancel_checkout(&mut self) -> StoreResult<()> {
        self.checkout.apply(CheckoutEvent::Cancel)?;
        Ok(())
    }

    /// Submits the payment and, on a successful ledger commit, settles
    /// the checkout: the cart is cleared, the customer detached, and the
    /// receipt handle returned.
    ///
    /// Returns `Ok(None)` when the submit was swallowed by the
    /// re-entrancy guard (an identical submit is already in flight).
    /// On a commit error the cart is untouched and the payment step
    /// returns to method selection for a retry.
    pub async fn submit_payment(&mut self) -> StoreResult<Option<CommittedSale>> {
        if let CheckoutOutcome::Ignored = self.checkout.apply(CheckoutEvent::Submit)? {
            debug!("duplicate submit ignored");
            return Ok(None);
        }

        // Processing now; the draft is the settlement to commit.
        let Some(settlement) = self.checkout.preview_settlement() else {
            return Ok(None);
        };

        let totals = self.totals();
        let commit = self
            .ledger
            .commit_settlement(
                self.store.terminal_id(),
                &settlement,
                self.store.cart(),
                &totals,
            )
            .await;

        match commit {
            Ok(committed) => {
                let outcome = self.checkout.apply(CheckoutEvent::ConfirmPayment)?;
                debug_assert!(matches!(
                    outcome,
                    CheckoutOutcome::Settled(ref s) if s.is_conserved()
                ));

                self.store.clear().await;
                self.customer = None;

                info!(
                    receipt = %committed.receipt_number,
                    grand_total = committed.grand_total_cents,
                    "checkout settled"
                );
                Ok(Some(committed))
            }
            Err(err) => {
                warn!(error = %err, "settlement commit failed, cart kept for retry");
                self.checkout.apply(CheckoutEvent::PaymentFailed)?;
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
