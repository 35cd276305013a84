//! # Error Types
//!
//! Domain errors for the checkout engine.
//!
//! The error surface is deliberately narrow. Cart edits and amount entry
//! never fail: bad input is coerced to a safe default instead. What
//! remains are the structural rejections of the checkout state machine.

use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Rejected checkout transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The loan method settles against a customer's account; with no
    /// customer attached there is no account to defer to. The UI
    /// disables the option, the machine rejects it regardless.
    #[error("loan settlement requires an attached customer")]
    LoanRequiresCustomer,

    /// A partial cash payment was submitted with a missing, zero or
    /// negative amount. The one hard validation rule in the flow.
    #[error("partial payment amount must be positive (entered: {entered:?})")]
    InvalidPaymentAmount { entered: String },

    /// The event makes no sense in the current state, e.g. confirming a
    /// payment that was never submitted.
    #[error("cannot {event} while checkout is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Convenience alias for checkout results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            CheckoutError::LoanRequiresCustomer.to_string(),
            "loan settlement requires an attached customer"
        );

        let err = CheckoutError::InvalidTransition {
            state: "idle",
            event: "submit",
        };
        assert_eq!(err.to_string(), "cannot submit while checkout is idle");
    }
}
