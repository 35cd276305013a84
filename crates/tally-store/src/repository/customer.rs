//! # Customer Repository
//!
//! Customers and their running loan balances. The balance is only ever
//! written here by the settlement ledger (and by seeding); the checkout
//! engine reads it to build the grand total.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use tally_core::Customer;

/// Repository for customer rows.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, loan_balance_cents
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts or replaces a customer.
    pub async fn upsert(&self, customer: &Customer) -> StoreResult<()> {
        debug!(id = %customer.id, name = %customer.name, "upserting customer");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, loan_balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                loan_balance_cents = excluded.loan_balance_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.loan_balance_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrites a customer's loan balance.
    ///
    /// Used by the settlement ledger: the committed settlement already
    /// folded the previous balance into its grand total, so the new
    /// balance is exactly the deferred amount, not an increment.
    pub async fn set_loan_balance(&self, id: &str, loan_balance_cents: i64) -> StoreResult<()> {
        debug!(id = %id, balance = %loan_balance_cents, "setting loan balance");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET loan_balance_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(loan_balance_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn customer(id: &str, loan_cents: i64) -> Customer {
        Customer {
            id: id.to_string(),
            name: format!("Customer {}", id),
            loan_balance_cents: loan_cents,
        }
    }

    #[tokio::test]
    async fn upsert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.upsert(&customer("cus-1", 5000)).await.unwrap();

        let fetched = repo.get_by_id("cus-1").await.unwrap().unwrap();
        assert_eq!(fetched.loan_balance_cents, 5000);
        assert!(repo.get_by_id("cus-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_loan_balance_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.upsert(&customer("cus-1", 5000)).await.unwrap();
        repo.set_loan_balance("cus-1", 13000).await.unwrap();

        let fetched = repo.get_by_id("cus-1").await.unwrap().unwrap();
        assert_eq!(fetched.loan_balance_cents, 13000);
    }

    #[tokio::test]
    async fn set_loan_balance_on_unknown_customer_errors() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.customers().set_loan_balance("cus-9", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
