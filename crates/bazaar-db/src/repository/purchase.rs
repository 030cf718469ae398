//! # Purchase Repository
//!
//! Database operations for purchases and their line items.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Purchase, PurchaseItem};

const PURCHASE_COLUMNS: &str =
    "id, invoice_number, supplier_id, worker_id, total_cents, paid_cents, created_at";

const PURCHASE_ITEM_COLUMNS: &str =
    "id, purchase_id, item_id, warehouse_id, name_snapshot, quantity, unit_price_cents, total_cents";

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// The highest stored invoice number starting with `prefix`, if any.
    ///
    /// Descending scan over the UNIQUE-indexed column, limit 1. This is the
    /// read half of sequence allocation; the UNIQUE constraint is the
    /// backstop for raced writers.
    pub async fn highest_number(&self, prefix: &str) -> DbResult<Option<String>> {
        let number: Option<String> = sqlx::query_scalar(
            "SELECT invoice_number FROM purchases WHERE invoice_number LIKE ?1 \
             ORDER BY invoice_number DESC LIMIT 1",
        )
        .bind(format!("{prefix}%"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    /// Inserts a purchase and all of its line items in one transaction.
    pub async fn insert(&self, purchase: &Purchase, items: &[PurchaseItem]) -> DbResult<()> {
        debug!(id = %purchase.id, invoice_number = %purchase.invoice_number, lines = items.len(), "Inserting purchase");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, invoice_number, supplier_id, worker_id,
                total_cents, paid_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.invoice_number)
        .bind(&purchase.supplier_id)
        .bind(&purchase.worker_id)
        .bind(purchase.total_cents)
        .bind(purchase.paid_cents)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (
                    id, purchase_id, item_id, warehouse_id,
                    name_snapshot, quantity, unit_price_cents, total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.purchase_id)
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

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Gets all line items of a purchase.
    pub async fn items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(&format!(
            "SELECT {PURCHASE_ITEM_COLUMNS} FROM purchase_items WHERE purchase_id = ?1 ORDER BY id"
        ))
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a supplier's purchases, newest first.
    pub async fn list_for_supplier(&self, supplier_id: &str, limit: u32) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE supplier_id = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(supplier_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}
