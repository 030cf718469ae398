//! # Payment Repository
//!
//! Database operations for standalone payments against party balances.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::Payment;

const PAYMENT_COLUMNS: &str = "id, payment_number, party, customer_id, supplier_id, worker_id, \
     amount_cents, method, direction, notes, created_at";

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// The highest stored payment number starting with `prefix`, if any.
    pub async fn highest_number(&self, prefix: &str) -> DbResult<Option<String>> {
        let number: Option<String> = sqlx::query_scalar(
            "SELECT payment_number FROM payments WHERE payment_number LIKE ?1 \
             ORDER BY payment_number DESC LIMIT 1",
        )
        .bind(format!("{prefix}%"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    /// Inserts a payment.
    ///
    /// Fails with `DbError::UniqueViolation` when another session raced to
    /// the same payment number.
    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(id = %payment.id, payment_number = %payment.payment_number, amount = %payment.amount_cents, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, payment_number, party, customer_id, supplier_id,
                worker_id, amount_cents, method, direction, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.payment_number)
        .bind(payment.party)
        .bind(&payment.customer_id)
        .bind(&payment.supplier_id)
        .bind(&payment.worker_id)
        .bind(payment.amount_cents)
        .bind(payment.method)
        .bind(payment.direction)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Lists payments, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
