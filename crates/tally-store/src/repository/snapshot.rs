//! # Cart Snapshot Repository
//!
//! The durable copy of the in-progress cart, one row per terminal,
//! written after every cart mutation and read back at startup.
//!
//! The payload is the cart serialized as JSON (an ordered list of line
//! records). Loading is deliberately forgiving: a missing row or a
//! payload that no longer parses yields `None`, never an error. The
//! worst outcome of a corrupt snapshot is an empty cart, not a terminal
//! that refuses to start.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::StoreResult;
use tally_core::Cart;

/// Repository for per-terminal cart snapshots.
#[derive(Debug, Clone)]
pub struct CartSnapshotRepository {
    pool: SqlitePool,
}

impl CartSnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartSnapshotRepository { pool }
    }

    /// Saves the full cart for a terminal, replacing any prior snapshot.
    /// Last writer wins; there is no locking because a terminal has
    /// exactly one writer.
    pub async fn save(&self, terminal_id: &str, cart: &Cart) -> StoreResult<()> {
        let payload = serde_json::to_string(cart)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (terminal_id, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (terminal_id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(terminal_id)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(terminal = %terminal_id, lines = cart.line_count(), "cart snapshot saved");
        Ok(())
    }

    /// Loads the cart snapshot for a terminal.
    ///
    /// `Ok(None)` covers both "no snapshot yet" and "snapshot does not
    /// parse"; the unparseable case is logged and the row left in place
    /// for post-mortems (the next save overwrites it anyway).
    pub async fn load(&self, terminal_id: &str) -> StoreResult<Option<Cart>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM cart_snapshots WHERE terminal_id = ?1")
                .bind(terminal_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<Cart>(&payload) {
            Ok(cart) => {
                debug!(terminal = %terminal_id, lines = cart.line_count(), "cart snapshot loaded");
                Ok(Some(cart))
            }
            Err(err) => {
                warn!(
                    terminal = %terminal_id,
                    error = %err,
                    "cart snapshot is corrupt, treating as empty"
                );
                Ok(None)
            }
        }
    }

    /// Deletes a terminal's snapshot. No-op if absent.
    pub async fn delete(&self, terminal_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM cart_snapshots WHERE terminal_id = ?1")
            .bind(terminal_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
