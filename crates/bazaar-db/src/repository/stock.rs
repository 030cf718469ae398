//! # Stock Repository
//!
//! On-hand queries plus the real [`StockLedger`] implementation.
//!
//! ## Delta Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ Absolute update (read-modify-write races across sessions)          │
//! │     UPDATE stock SET quantity = 7 WHERE ...                            │
//! │                                                                         │
//! │  ✅ Delta update (atomic per row)                                      │
//! │     UPDATE stock SET quantity = quantity - 3 WHERE ...                 │
//! │                                                                         │
//! │  Adjustments are a single upsert; a transfer wraps both row updates    │
//! │  and the audit insert in one transaction so the pair is atomic.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::{CoreError, CoreResult, StockLedger};

/// One warehouse's share of an item's stock.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct StockLevel {
    pub warehouse_id: String,
    pub quantity: i64,
}

/// A recorded warehouse-to-warehouse movement.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct StockTransferRecord {
    pub id: String,
    pub item_id: String,
    pub from_warehouse_id: String,
    pub to_warehouse_id: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

/// Repository for stock levels. Reads return plain `DbResult`s; the write
/// path is the [`StockLedger`] implementation below, whose failures map to
/// `CoreError::RemoteOperationFailed`.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// On-hand quantity of an item at one warehouse (0 when no row exists).
    pub async fn on_hand(&self, item_id: &str, warehouse_id: &str) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock WHERE item_id = ?1 AND warehouse_id = ?2",
        )
        .bind(item_id)
        .bind(warehouse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Per-warehouse stock rows for an item.
    pub async fn levels_for_item(&self, item_id: &str) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            "SELECT warehouse_id, quantity FROM stock WHERE item_id = ?1 ORDER BY warehouse_id",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Total on-hand quantity of an item across all warehouses.
    ///
    /// This is the figure the threshold classification
    /// (`Item::stock_status`) runs against.
    pub async fn total_on_hand(&self, item_id: &str) -> DbResult<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM stock WHERE item_id = ?1")
                .bind(item_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0))
    }

    /// Lists recorded transfers, newest first.
    pub async fn list_transfers(&self, limit: u32) -> DbResult<Vec<StockTransferRecord>> {
        let transfers = sqlx::query_as::<_, StockTransferRecord>(
            "SELECT id, item_id, from_warehouse_id, to_warehouse_id, quantity, note, created_at \
             FROM stock_transfers ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(transfers)
    }
}

// =============================================================================
// Stock Ledger Implementation
// =============================================================================

#[async_trait]
impl StockLedger for StockRepository {
    /// Applies a signed delta to one (item, warehouse) row.
    ///
    /// A single upsert, atomic per row. The quantity is allowed to go
    /// negative here: the delta contract mirrors the original stock-update
    /// procedure, and oversells are a reporting concern, not a write error.
    async fn adjust(
        &self,
        item_id: &str,
        warehouse_id: &str,
        quantity_delta: i64,
    ) -> CoreResult<()> {
        debug!(item_id = %item_id, warehouse_id = %warehouse_id, delta = %quantity_delta, "Adjusting stock");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO stock (item_id, warehouse_id, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (item_id, warehouse_id)
            DO UPDATE SET quantity = quantity + excluded.quantity,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(item_id)
        .bind(warehouse_id)
        .bind(quantity_delta)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::remote("Stock adjustment", e.to_string()))?;

        Ok(())
    }

    /// Moves quantity between two warehouses as one transaction.
    ///
    /// Checks the source balance inside the transaction, applies both row
    /// updates and writes the audit row; any failure rolls the whole
    /// transfer back, so a half-applied transfer cannot be observed.
    async fn transfer(
        &self,
        item_id: &str,
        from_warehouse_id: &str,
        to_warehouse_id: &str,
        quantity: i64,
        note: Option<&str>,
    ) -> CoreResult<()> {
        debug!(
            item_id = %item_id,
            from = %from_warehouse_id,
            to = %to_warehouse_id,
            quantity = %quantity,
            "Transferring stock"
        );

        let remote = |e: sqlx::Error| CoreError::remote("Stock transfer", e.to_string());

        let mut tx = self.pool.begin().await.map_err(remote)?;

        let available: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock WHERE item_id = ?1 AND warehouse_id = ?2",
        )
        .bind(item_id)
        .bind(from_warehouse_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(remote)?;

        let available = available.unwrap_or(0);
        if available < quantity {
            // Dropping tx rolls back; both rows stay untouched
            return Err(CoreError::remote(
                "Stock transfer",
                format!(
                    "insufficient stock at source: {} available, {} requested",
                    available, quantity
                ),
            ));
        }

        let now = Utc::now();

        sqlx::query(
            "UPDATE stock SET quantity = quantity - ?3, updated_at = ?4 \
             WHERE item_id = ?1 AND warehouse_id = ?2",
        )
        .bind(item_id)
        .bind(from_warehouse_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(remote)?;

        sqlx::query(
            r#"
            INSERT INTO stock (item_id, warehouse_id, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (item_id, warehouse_id)
            DO UPDATE SET quantity = quantity + excluded.quantity,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(item_id)
        .bind(to_warehouse_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(remote)?;

        sqlx::query(
            r#"
            INSERT INTO stock_transfers (id, item_id, from_warehouse_id, to_warehouse_id,
                                         quantity, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(item_id)
        .bind(from_warehouse_id)
        .bind(to_warehouse_id)
        .bind(quantity)
        .bind(note)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(remote)?;

        tx.commit().await.map_err(remote)?;

        Ok(())
    }
}
