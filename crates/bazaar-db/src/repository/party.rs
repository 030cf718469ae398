//! # Party Repository
//!
//! Database operations for customers and suppliers, including the running
//! balance bookkeeping.
//!
//! Balances move as deltas (`balance_cents = balance_cents + ?`), never as
//! absolute writes, so each change is one atomic row update.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{Customer, Supplier};

const CUSTOMER_COLUMNS: &str = "id, name, phone, city, balance_cents, created_at";
const SUPPLIER_COLUMNS: &str = "id, name, phone, city, balance_cents, created_at";

/// Repository for customer and supplier operations.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    /// Creates a new PartyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Inserts a new customer.
    pub async fn insert_customer(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone, city, balance_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.city)
        .bind(customer.balance_cents)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers sorted by name.
    pub async fn list_customers(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Applies a signed delta to a customer's balance.
    ///
    /// Positive: the customer owes more (unpaid sale remainder).
    /// Negative: the customer paid some of it off.
    pub async fn adjust_customer_balance(&self, id: &str, delta_cents: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta_cents, "Adjusting customer balance");

        let result =
            sqlx::query("UPDATE customers SET balance_cents = balance_cents + ?2 WHERE id = ?1")
                .bind(id)
                .bind(delta_cents)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Inserts a new supplier.
    pub async fn insert_supplier(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, name, phone, city, balance_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.city)
        .bind(supplier.balance_cents)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a supplier by ID.
    pub async fn get_supplier(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists suppliers sorted by name.
    pub async fn list_suppliers(&self, limit: u32) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Applies a signed delta to a supplier's balance.
    ///
    /// Positive: we owe the supplier more (unpaid purchase remainder).
    /// Negative: we paid some of it off.
    pub async fn adjust_supplier_balance(&self, id: &str, delta_cents: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta_cents, "Adjusting supplier balance");

        let result =
            sqlx::query("UPDATE suppliers SET balance_cents = balance_cents + ?2 WHERE id = ?1")
                .bind(id)
                .bind(delta_cents)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}
