//! # Catalog Repository
//!
//! Read/write access to sellable items, and the read-only seam the
//! checkout session uses to look up items and customers.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use crate::pool::Database;
use tally_core::{CatalogItem, Customer};

// =============================================================================
// Catalog Access Seam
// =============================================================================

/// Read-only view of the product catalog and customer records.
///
/// The checkout session consumes the catalog only through this trait, so
/// tests can drive it against a canned or failing source. A fetch
/// failure is survivable by design: the cart keeps operating on the
/// snapshots it already copied, and a missing customer means a loan
/// balance of zero.
#[async_trait]
pub trait CatalogAccess: Send + Sync {
    /// Looks up a sellable item. `Ok(None)` when unknown.
    async fn fetch_catalog_item(&self, id: &str) -> StoreResult<Option<CatalogItem>>;

    /// Looks up a customer with their current loan balance.
    async fn fetch_customer(&self, id: &str) -> StoreResult<Option<Customer>>;
}

#[async_trait]
impl CatalogAccess for Database {
    async fn fetch_catalog_item(&self, id: &str) -> StoreResult<Option<CatalogItem>> {
        self.catalog().get_by_id(id).await
    }

    async fn fetch_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        self.customers().get_by_id(id).await
    }
}

// =============================================================================
// Catalog Repository
// =============================================================================

/// Repository for catalog item rows.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets an item by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<CatalogItem>> {
        let item = sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, name, unit_price_cents, available_stock,
                   discount_hint_cents, is_active
            FROM catalog_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists active items in name order.
    pub async fn list_active(&self, limit: i64) -> StoreResult<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(
            r#"
            SELECT id, name, unit_price_cents, available_stock,
                   discount_hint_cents, is_active
            FROM catalog_items
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts or replaces an item.
    pub async fn upsert(&self, item: &CatalogItem) -> StoreResult<()> {
        debug!(id = %item.id, name = %item.name, "upserting catalog item");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, name, unit_price_cents, available_stock,
                discount_hint_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                unit_price_cents = excluded.unit_price_cents,
                available_stock = excluded.available_stock,
                discount_hint_cents = excluded.discount_hint_cents,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.unit_price_cents)
        .bind(item.available_stock)
        .bind(item.discount_hint_cents)
        .bind(item.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
