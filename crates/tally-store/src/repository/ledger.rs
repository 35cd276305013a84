//! # Settlement Ledger
//!
//! The one write the checkout engine performs against the outside world:
//! committing a settled sale. Everything happens in a single SQL
//! transaction so a half-written sale can never exist:
//!
//! ```text
//! commit_settlement
//!   ├── INSERT sales            (totals + due-now/deferred split)
//!   ├── INSERT sale_lines       (frozen name/price snapshots)
//!   ├── UPDATE catalog_items    (decrement stock, may go negative)
//!   └── UPDATE customers        (loan balance := deferred amount)
//! ```

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::pool::Database;
use tally_core::{Cart, CartTotals, Settlement};

// =============================================================================
// Committed Sale
// =============================================================================

/// Receipt handle for a committed settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedSale {
    pub sale_id: String,
    pub receipt_number: String,
    pub grand_total_cents: i64,
}

// =============================================================================
// Ledger Seam
// =============================================================================

/// The external ledger a settled checkout is committed to.
///
/// Object-safe so the checkout session can be driven against a mock in
/// tests (including a failing one: commit failure must leave the cart
/// intact).
#[async_trait]
pub trait SettlementLedger: Send + Sync {
    /// Persists the settlement and its cart atomically.
    async fn commit_settlement(
        &self,
        terminal_id: &str,
        settlement: &Settlement,
        cart: &Cart,
        totals: &CartTotals,
    ) -> StoreResult<CommittedSale>;
}

#[async_trait]
impl SettlementLedger for Database {
    async fn commit_settlement(
        &self,
        terminal_id: &str,
        settlement: &Settlement,
        cart: &Cart,
        totals: &CartTotals,
    ) -> StoreResult<CommittedSale> {
        // A deferred amount with nobody to owe it is a caller bug the
        // ledger refuses to record.
        if settlement.amount_deferred_to_loan_cents > 0 && settlement.customer_id.is_none() {
            return Err(StoreError::CommitFailed(
                "deferred amount with no customer attached".to_string(),
            ));
        }

        let sale_id = Uuid::new_v4().to_string();
        let receipt_number = generate_receipt_number(terminal_id);
        let now = Utc::now();

        debug!(sale_id = %sale_id, receipt = %receipt_number, "committing settlement");

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_number, terminal_id, customer_id, method,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                grand_total_cents, due_now_cents, deferred_to_loan_cents,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale_id)
        .bind(&receipt_number)
        .bind(terminal_id)
        .bind(&settlement.customer_id)
        .bind(settlement.method.as_str())
        .bind(totals.subtotal_cents)
        .bind(totals.discount_cents)
        .bind(totals.tax_cents)
        .bind(totals.total_cents)
        .bind(settlement.grand_total_cents)
        .bind(settlement.amount_due_now_cents)
        .bind(settlement.amount_deferred_to_loan_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &cart.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    id, sale_id, item_id, name_snapshot, unit_price_cents,
                    quantity, line_discount_cents, line_net_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale_id)
            .bind(&line.item_id)
            .bind(&line.name)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.line_discount_cents)
            .bind(line.line_net().cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            // Stock is advisory and may go negative; a sale is never
            // blocked on it.
            sqlx::query(
                r#"
                UPDATE catalog_items
                SET available_stock = available_stock - ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&line.item_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(customer_id) = &settlement.customer_id {
            // The grand total already folded the old balance in, so the
            // new balance is exactly what was deferred.
            let result = sqlx::query(
                r#"
                UPDATE customers
                SET loan_balance_cents = ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(settlement.amount_deferred_to_loan_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Customer", customer_id));
            }
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            receipt = %receipt_number,
            method = settlement.method.as_str(),
            due_now = settlement.amount_due_now_cents,
            deferred = settlement.amount_deferred_to_loan_cents,
            "settlement committed"
        );

        Ok(CommittedSale {
            sale_id,
            receipt_number,
            grand_total_cents: settlement.grand_total_cents,
        })
    }
}

/// Generates a receipt number: `YYMMDD-HHMMSS-TT-NNN`.
///
/// TT is the last two characters of the terminal id; NNN is derived from
/// sub-second time to keep rapid consecutive sales distinct.
fn generate_receipt_number(terminal_id: &str) -> String {
    let now = Utc::now();

    let tail: String = terminal_id
        .chars()
        .rev()
        .take(2)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let terminal_code = if tail.len() < 2 { "00".to_string() } else { tail };

    let seq = (now.timestamp_subsec_micros() % 1000) as u32;

    format!("{}-{}-{:03}", now.format("%y%m%d-%H%M%S"), terminal_code, seq)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use tally_core::{compute_totals, CatalogItem, Customer, PaymentMethod, TaxRate};

    fn item(id: &str, price_cents: i64, stock: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            unit_price_cents: price_cents,
            available_stock: stock,
            discount_hint_cents: None,
            is_active: true,
        }
    }

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog().upsert(&item("itm-1", 10000, 5)).await.unwrap();
        db.customers()
            .upsert(&Customer {
                id: "cus-1".to_string(),
                name: "Walk-in Regular".to_string(),
                loan_balance_cents: 5000,
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn commit_writes_sale_stock_and_loan() {
        let db = seeded_db().await;

        let mut cart = Cart::new();
        cart.add_item(&item("itm-1", 10000, 5));
        cart.change_quantity("itm-1", 1); // qty 2
        let totals = compute_totals(&cart, TaxRate::zero());

        // Partial cash on a 25000-cent grand total (20000 sale + 5000 loan)
        let settlement = Settlement {
            method: PaymentMethod::Cash,
            amount_due_now_cents: 10000,
            amount_deferred_to_loan_cents: 15000,
            grand_total_cents: 25000,
            customer_id: Some("cus-1".to_string()),
        };

        let committed = db
            .commit_settlement("term-01", &settlement, &cart, &totals)
            .await
            .unwrap();
        assert_eq!(committed.grand_total_cents, 25000);

        // Loan balance replaced by the deferred amount
        let customer = db.customers().get_by_id("cus-1").await.unwrap().unwrap();
        assert_eq!(customer.loan_balance_cents, 15000);

        // Stock decremented by the sold quantity
        let stocked = db.catalog().get_by_id("itm-1").await.unwrap().unwrap();
        assert_eq!(stocked.available_stock, 3);

        // One sale row, one line row
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!((sales, lines), (1, 1));
    }

    #[tokio::test]
    async fn stock_may_go_negative() {
        let db = seeded_db().await;

        let mut cart = Cart::new();
        cart.add_item(&item("itm-1", 10000, 5));
        cart.change_quantity("itm-1", 7); // qty 8 > stock 5
        let totals = compute_totals(&cart, TaxRate::zero());

        let settlement = Settlement {
            method: PaymentMethod::Card,
            amount_due_now_cents: totals.total_cents,
            amount_deferred_to_loan_cents: 0,
            grand_total_cents: totals.total_cents,
            customer_id: None,
        };

        db.commit_settlement("term-01", &settlement, &cart, &totals)
            .await
            .unwrap();

        let stocked = db.catalog().get_by_id("itm-1").await.unwrap().unwrap();
        assert_eq!(stocked.available_stock, -3);
    }

    #[tokio::test]
    async fn deferred_amount_without_customer_is_refused() {
        let db = seeded_db().await;

        let mut cart = Cart::new();
        cart.add_item(&item("itm-1", 10000, 5));
        let totals = compute_totals(&cart, TaxRate::zero());

        let settlement = Settlement {
            method: PaymentMethod::Cash,
            amount_due_now_cents: 4000,
            amount_deferred_to_loan_cents: 6000,
            grand_total_cents: 10000,
            customer_id: None,
        };

        let err = db
            .commit_settlement("term-01", &settlement, &cart, &totals)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed(_)));

        // Nothing was written
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
    }

    #[tokio::test]
    async fn unknown_customer_rolls_back_the_whole_sale() {
        let db = seeded_db().await;

        let mut cart = Cart::new();
        cart.add_item(&item("itm-1", 10000, 5));
        let totals = compute_totals(&cart, TaxRate::zero());

        let settlement = Settlement {
            method: PaymentMethod::Loan,
            amount_due_now_cents: 0,
            amount_deferred_to_loan_cents: 10000,
            grand_total_cents: 10000,
            customer_id: Some("cus-ghost".to_string()),
        };

        // The FK on sales.customer_id fires at the sale insert
        let err = db
            .commit_settlement("term-01", &settlement, &cart, &totals)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Constraint(_) | StoreError::NotFound { .. }
        ));

        // The transaction rolled back: no sale row, stock untouched
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
        let stocked = db.catalog().get_by_id("itm-1").await.unwrap().unwrap();
        assert_eq!(stocked.available_stock, 5);
    }

    #[test]
    fn receipt_number_shape() {
        let receipt = generate_receipt_number("term-01");
        // YYMMDD-HHMMSS-01-NNN
        assert_eq!(receipt.len(), 20);
        assert!(receipt.contains("-01-"));

        let short = generate_receipt_number("x");
        assert!(short.contains("-00-"));
    }
}
