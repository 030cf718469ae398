//! # Return Repository
//!
//! Database operations for returns (both directions) and their line items.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{ReturnItem, ReturnRecord};

const RETURN_COLUMNS: &str =
    "id, return_number, kind, customer_id, supplier_id, worker_id, total_cents, created_at";

const RETURN_ITEM_COLUMNS: &str =
    "id, return_id, item_id, warehouse_id, name_snapshot, quantity, unit_price_cents, total_cents";

/// Repository for return database operations.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    /// Creates a new ReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// The highest stored return number starting with `prefix`, if any.
    pub async fn highest_number(&self, prefix: &str) -> DbResult<Option<String>> {
        let number: Option<String> = sqlx::query_scalar(
            "SELECT return_number FROM returns WHERE return_number LIKE ?1 \
             ORDER BY return_number DESC LIMIT 1",
        )
        .bind(format!("{prefix}%"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    /// Inserts a return and all of its line items in one transaction.
    pub async fn insert(&self, record: &ReturnRecord, items: &[ReturnItem]) -> DbResult<()> {
        debug!(id = %record.id, return_number = %record.return_number, lines = items.len(), "Inserting return");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO returns (
                id, return_number, kind, customer_id, supplier_id,
                worker_id, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.return_number)
        .bind(record.kind)
        .bind(&record.customer_id)
        .bind(&record.supplier_id)
        .bind(&record.worker_id)
        .bind(record.total_cents)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO return_items (
                    id, return_id, item_id, warehouse_id,
                    name_snapshot, quantity, unit_price_cents, total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.return_id)
            .bind(&item.item_id)
            .bind(&item.warehouse_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets a return by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ReturnRecord>> {
        let record = sqlx::query_as::<_, ReturnRecord>(&format!(
            "SELECT {RETURN_COLUMNS} FROM returns WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets all line items of a return.
    pub async fn items(&self, return_id: &str) -> DbResult<Vec<ReturnItem>> {
        let items = sqlx::query_as::<_, ReturnItem>(&format!(
            "SELECT {RETURN_ITEM_COLUMNS} FROM return_items WHERE return_id = ?1 ORDER BY id"
        ))
        .bind(return_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
