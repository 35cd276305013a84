//! # Storage Error Types
//!
//! Errors for the storage layer, wrapping sqlx failures with enough
//! context to be actionable.
//!
//! Error flow: `sqlx::Error` is categorized into [`StoreError`] here;
//! checkout rejections from tally-core pass through unchanged so a
//! caller can tell "the till said no" apart from "the disk said no".

use thiserror::Error;

use tally_core::CheckoutError;

/// Storage and orchestration errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found where one was required.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Checkout was opened over an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Database connection failed (missing file, permissions, disk).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A migration could not be applied.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A UNIQUE or FOREIGN KEY constraint fired.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// The settlement transaction could not be committed.
    #[error("settlement commit failed: {0}")]
    CommitFailed(String),

    /// Cart snapshot payload could not be encoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A checkout transition was rejected (passed through from the
    /// engine).
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Maps sqlx errors onto the storage taxonomy.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("UNIQUE constraint failed")
                    || msg.contains("FOREIGN KEY constraint failed")
                    || msg.contains("CHECK constraint failed")
                {
                    StoreError::Constraint(msg)
                } else {
                    StoreError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => {
                StoreError::ConnectionFailed("connection pool is closed".to_string())
            }

            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = StoreError::not_found("Customer", "cus-9");
        assert_eq!(err.to_string(), "Customer not found: cus-9");
    }

    #[test]
    fn checkout_errors_pass_through() {
        let err: StoreError = CheckoutError::LoanRequiresCustomer.into();
        assert_eq!(
            err.to_string(),
            "loan settlement requires an attached customer"
        );
    }
}
