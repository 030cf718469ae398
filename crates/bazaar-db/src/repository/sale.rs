//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! A sale and its lines are inserted in one transaction: the document is
//! either fully stored or not stored at all. Stock posting and balance
//! bookkeeping happen outside, in the submission service, and are
//! deliberately NOT part of this transaction (see `service`).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Sale, SaleItem};

/// A typed list filter.
///
/// Every variant contributes one parameterized clause; values are always
/// bound, never spliced into the SQL text, so a filter cannot inject and a
/// typo'd column name cannot exist.
#[derive(Debug, Clone)]
pub enum SaleFilter {
    /// created_at within [from, to).
    CreatedBetween {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Sales of one customer.
    CustomerIs { customer_id: String },
    /// Total at or above a threshold.
    TotalAtLeast { cents: i64 },
}

impl SaleFilter {
    fn clause(&self) -> &'static str {
        match self {
            SaleFilter::CreatedBetween { .. } => "created_at >= ? AND created_at < ?",
            SaleFilter::CustomerIs { .. } => "customer_id = ?",
            SaleFilter::TotalAtLeast { .. } => "total_cents >= ?",
        }
    }
}

const SALE_COLUMNS: &str =
    "id, invoice_number, customer_id, worker_id, total_cents, paid_cents, created_at";

const SALE_ITEM_COLUMNS: &str =
    "id, sale_id, item_id, warehouse_id, name_snapshot, quantity, unit_price_cents, total_cents";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale and all of its line items in one transaction.
    ///
    /// Fails with `DbError::UniqueViolation` when another session raced to
    /// the same invoice number.
    pub async fn insert(&self, sale: &Sale, items: &[SaleItem]) -> DbResult<()> {
        debug!(id = %sale.id, invoice_number = %sale.invoice_number, lines = items.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, customer_id, worker_id,
                total_cents, paid_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(&sale.customer_id)
        .bind(&sale.worker_id)
        .bind(sale.total_cents)
        .bind(sale.paid_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, item_id, warehouse_id,
                    name_snapshot, quantity, unit_price_cents, total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
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

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale =
            sqlx::query_as::<_, Sale>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(sale)
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE invoice_number = ?1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items of a sale.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales matching all given filters, newest first.
    ///
    /// Used by the reporting views (daily sales, per-customer history,
    /// large-ticket listings).
    pub async fn list_filtered(&self, filters: &[SaleFilter], limit: u32) -> DbResult<Vec<Sale>> {
        let mut sql = format!("SELECT {SALE_COLUMNS} FROM sales");
        if !filters.is_empty() {
            let clauses: Vec<&str> = filters.iter().map(SaleFilter::clause).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, Sale>(&sql);
        for filter in filters {
            query = match filter {
                SaleFilter::CreatedBetween { from, to } => query.bind(from).bind(to),
                SaleFilter::CustomerIs { customer_id } => query.bind(customer_id),
                SaleFilter::TotalAtLeast { cents } => query.bind(cents),
            };
        }
        let sales = query.bind(limit as i64).fetch_all(&self.pool).await?;

        Ok(sales)
    }

    /// Lists a customer's sales, newest first.
    pub async fn list_for_customer(&self, customer_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE customer_id = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(customer_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}
