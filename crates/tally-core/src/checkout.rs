//! # Checkout State Machine
//!
//! Drives the payment step from "awaiting method selection" to a settled
//! transaction, producing exactly one [`Settlement`] per checkout.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        Checkout States                               │
//! │                                                                      │
//! │            Begin                SelectMethod(Cash)                   │
//! │   Idle ───────────► MethodSelection ───────────► AmountEntry         │
//! │    ▲                │        ▲                       │               │
//! │    │         Submit │        │ SelectMethod          │ Submit        │
//! │    │   (card, loan) │        │ (Card/Loan)           │ (cash)        │
//! │    │                ▼        │                       │               │
//! │    │              Processing ◄───────────────────────┘               │
//! │    │                │    │                                           │
//! │    │ ConfirmPayment │    │ PaymentFailed (back to MethodSelection)   │
//! │    └────────────────┘    │                                           │
//! │      emits Settlement    ▼                                           │
//! │                                                                      │
//! │  Cancel from any non-Processing state returns to Idle.               │
//! │  Submit while Processing is ignored (no double-charge).              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state lives in one tagged union and every transition goes through
//! [`Checkout::apply`], so the machine is testable with no rendering or
//! storage layer in sight.

use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::money::Money;
use crate::types::{CashPaymentType, PaymentMethod, Settlement};

// =============================================================================
// Payment Draft
// =============================================================================

/// The in-flight payment parameters, carried by every non-idle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    /// The combined amount due: sale total plus attached customer's loan.
    pub grand_total_cents: i64,

    /// Customer attached to the sale, if any. Gates the loan method.
    pub customer_id: Option<String>,

    /// Currently selected payment method.
    pub method: PaymentMethod,

    /// Full or partial, meaningful only while method is cash.
    pub cash_type: CashPaymentType,

    /// The raw keyed-in amount, preserved verbatim for display. The
    /// parsed value (zero when unparseable) is what arithmetic uses.
    pub amount_raw: String,
}

impl PaymentDraft {
    fn new(grand_total_cents: i64, customer_id: Option<String>) -> Self {
        PaymentDraft {
            grand_total_cents,
            customer_id,
            method: PaymentMethod::Cash,
            cash_type: CashPaymentType::Full,
            amount_raw: String::new(),
        }
    }

    /// The amount that would be collected now, given the current method
    /// and entered amount.
    pub fn amount_paid(&self) -> Money {
        match (self.method, self.cash_type) {
            (PaymentMethod::Loan, _) => Money::zero(),
            (PaymentMethod::Cash, CashPaymentType::Partial) => {
                Money::parse_or_zero(&self.amount_raw).clamp_non_negative()
            }
            // Card, and full cash: the whole grand total
            _ => Money::from_cents(self.grand_total_cents),
        }
    }

    /// Builds the settlement split for this draft.
    ///
    /// The deferred amount is computed first and the due-now amount as
    /// the exact remainder, so `due_now + deferred == grand_total` holds
    /// to the cent, including when a partial payment overshoots the
    /// grand total.
    pub fn settlement(&self) -> Settlement {
        let grand_total = Money::from_cents(self.grand_total_cents);
        let deferred = (grand_total - self.amount_paid()).clamp_non_negative();
        let due_now = grand_total - deferred;

        Settlement {
            method: self.method,
            amount_due_now_cents: due_now.cents(),
            amount_deferred_to_loan_cents: deferred.cents(),
            grand_total_cents: self.grand_total_cents,
            customer_id: self.customer_id.clone(),
        }
    }
}

// =============================================================================
// States, Events, Outcomes
// =============================================================================

/// The checkout's tagged-union state.
///
/// "Settled" is momentary rather than a stored variant: confirming a
/// payment emits the settlement and drops straight back to `Idle`,
/// because a settled checkout has nothing left to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "stage")]
pub enum CheckoutState {
    /// No checkout in progress.
    Idle,
    /// Choosing between card, cash and loan-to-account.
    MethodSelection(PaymentDraft),
    /// Cash selected; choosing full vs partial and keying the amount.
    AmountEntry(PaymentDraft),
    /// Payment submitted, awaiting the confirmation signal.
    Processing(PaymentDraft),
}

impl CheckoutState {
    fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::MethodSelection(_) => "method_selection",
            CheckoutState::AmountEntry(_) => "amount_entry",
            CheckoutState::Processing(_) => "processing",
        }
    }
}

/// Everything that can happen to a checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    /// Open the payment step for the given grand total.
    Begin {
        grand_total_cents: i64,
        customer_id: Option<String>,
    },
    /// Pick a payment method. Resets cash type and entered amount.
    SelectMethod(PaymentMethod),
    /// Switch between full and partial cash.
    SelectCashType(CashPaymentType),
    /// Key in (or correct) the partial cash amount.
    EnterAmount(String),
    /// Submit the payment for processing.
    Submit,
    /// The payment confirmation signal arrived.
    ConfirmPayment,
    /// The payment could not be committed; return to method selection.
    PaymentFailed,
    /// Abandon the payment step.
    Cancel,
}

impl CheckoutEvent {
    fn name(&self) -> &'static str {
        match self {
            CheckoutEvent::Begin { .. } => "begin",
            CheckoutEvent::SelectMethod(_) => "select_method",
            CheckoutEvent::SelectCashType(_) => "select_cash_type",
            CheckoutEvent::EnterAmount(_) => "enter_amount",
            CheckoutEvent::Submit => "submit",
            CheckoutEvent::ConfirmPayment => "confirm_payment",
            CheckoutEvent::PaymentFailed => "payment_failed",
            CheckoutEvent::Cancel => "cancel",
        }
    }
}

/// What a transition produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The state advanced.
    Transitioned,
    /// The event was deliberately swallowed (duplicate submit, cancel
    /// with nothing in progress).
    Ignored,
    /// Terminal success: the one settlement for this checkout.
    Settled(Settlement),
}

// =============================================================================
// The Machine
// =============================================================================

/// The checkout state machine. One per terminal session.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    state: CheckoutState,
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Idle
    }
}

impl Checkout {
    pub fn new() -> Self {
        Checkout {
            state: CheckoutState::Idle,
        }
    }

    /// Current state, for display.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The in-flight draft, if a checkout is open.
    pub fn draft(&self) -> Option<&PaymentDraft> {
        match &self.state {
            CheckoutState::Idle => None,
            CheckoutState::MethodSelection(d)
            | CheckoutState::AmountEntry(d)
            | CheckoutState::Processing(d) => Some(d),
        }
    }

    /// The split that submitting right now would produce, for display.
    pub fn preview_settlement(&self) -> Option<Settlement> {
        self.draft().map(PaymentDraft::settlement)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, CheckoutState::Processing(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, CheckoutState::Idle)
    }

    /// The authoritative transition function.
    ///
    /// Rejected transitions leave the state untouched; every path through
    /// a checkout emits at most one [`CheckoutOutcome::Settled`].
    pub fn apply(&mut self, event: CheckoutEvent) -> Result<CheckoutOutcome, CheckoutError> {
        use CheckoutEvent as Ev;
        use CheckoutOutcome as Out;
        use CheckoutState as St;

        let state = std::mem::take(&mut self.state);

        let (next, outcome) = match (state, event) {
            // Opening the payment step. Method defaults to cash-full with
            // no amount keyed in yet.
            (
                St::Idle,
                Ev::Begin {
                    grand_total_cents,
                    customer_id,
                },
            ) => (
                St::MethodSelection(PaymentDraft::new(grand_total_cents, customer_id)),
                Ok(Out::Transitioned),
            ),

            // Method selection. Loan is structurally gated on an attached
            // customer: the transition is rejected, not silently dropped,
            // and the rejecting state is restored as-is. Every method
            // change resets the cash split to full and wipes the keyed
            // amount, so a stale partial figure cannot leak across
            // methods.
            (St::MethodSelection(d), Ev::SelectMethod(method)) => {
                select_method(d, method, St::MethodSelection)
            }
            (St::AmountEntry(d), Ev::SelectMethod(method)) => {
                select_method(d, method, St::AmountEntry)
            }

            (St::AmountEntry(mut d), Ev::SelectCashType(cash_type)) => {
                d.cash_type = cash_type;
                if cash_type == CashPaymentType::Full {
                    d.amount_raw.clear();
                }
                (St::AmountEntry(d), Ok(Out::Transitioned))
            }

            (St::AmountEntry(mut d), Ev::EnterAmount(raw)) => {
                d.amount_raw = raw;
                (St::AmountEntry(d), Ok(Out::Transitioned))
            }

            // Submit. The single hard validation rule of the flow: a
            // partial cash payment must carry a positive amount.
            (St::MethodSelection(d) | St::AmountEntry(d), Ev::Submit) => {
                if d.method == PaymentMethod::Cash
                    && d.cash_type == CashPaymentType::Partial
                    && d.amount_paid().cents() <= 0
                {
                    let entered = d.amount_raw.clone();
                    (
                        St::AmountEntry(d),
                        Err(CheckoutError::InvalidPaymentAmount { entered }),
                    )
                } else {
                    (St::Processing(d), Ok(Out::Transitioned))
                }
            }

            // Re-entrancy guard: a second submit while processing must not
            // produce a second settlement.
            (St::Processing(d), Ev::Submit) => (St::Processing(d), Ok(Out::Ignored)),

            (St::Processing(d), Ev::ConfirmPayment) => {
                let settlement = d.settlement();
                (St::Idle, Ok(Out::Settled(settlement)))
            }

            // Commit failed downstream: the cart is untouched, the payment
            // step restarts clean for a retry.
            (St::Processing(d), Ev::PaymentFailed) => (
                St::MethodSelection(PaymentDraft::new(d.grand_total_cents, d.customer_id)),
                Ok(Out::Transitioned),
            ),

            // Cancellation: anywhere except mid-processing.
            (St::Processing(d), Ev::Cancel) => (St::Processing(d), Ok(Out::Ignored)),
            (St::Idle, Ev::Cancel) => (St::Idle, Ok(Out::Ignored)),
            (St::MethodSelection(_) | St::AmountEntry(_), Ev::Cancel) => {
                (St::Idle, Ok(Out::Transitioned))
            }

            (state, event) => {
                let err = CheckoutError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                };
                (state, Err(err))
            }
        };

        self.state = next;
        outcome
    }
}

/// Applies a method choice to the draft, or rejects it with the original
/// state (rebuilt by `restore`) untouched.
fn select_method(
    mut d: PaymentDraft,
    method: PaymentMethod,
    restore: fn(PaymentDraft) -> CheckoutState,
) -> (CheckoutState, Result<CheckoutOutcome, CheckoutError>) {
    if method == PaymentMethod::Loan && d.customer_id.is_none() {
        return (restore(d), Err(CheckoutError::LoanRequiresCustomer));
    }

    d.method = method;
    d.cash_type = CashPaymentType::Full;
    d.amount_raw.clear();

    let next = if method == PaymentMethod::Cash {
        CheckoutState::AmountEntry(d)
    } else {
        CheckoutState::MethodSelection(d)
    };
    (next, Ok(CheckoutOutcome::Transitioned))
}

// =============================================================================
// Unit Tests
// =============================================================================
