//! # Domain Types
//!
//! Core domain types used throughout Bazaar POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog / reference          Documents                                 │
//! │  ───────────────────          ─────────                                 │
//! │  Item        Warehouse        Sale      + SaleItem                      │
//! │  Customer    Supplier         Purchase  + PurchaseItem                  │
//! │  Worker                       ReturnRecord + ReturnItem                 │
//! │                               Payment   Expense                         │
//! │                                                                         │
//! │  Every document carries a human-readable document number               │
//! │  (see `numbering`); every line item snapshots name and unit price      │
//! │  at posting time.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where applicable (invoice_number, payment_number, ...) -
//!   human-readable, unique per table

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// A catalog item that can be bought, sold, stocked and transferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on documents.
    pub name: String,

    /// Brand label, if any.
    pub brand: Option<String>,

    /// Price paid to suppliers, in minor units.
    pub purchase_price_cents: i64,

    /// Price charged to customers, in minor units.
    pub retail_price_cents: i64,

    /// At or below this total on-hand quantity the item counts as low stock.
    pub min_stock_level: i64,

    /// At or above this total on-hand quantity the item counts as overstocked.
    pub max_stock_level: i64,

    /// Whether the item is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the purchase price as a Money type.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the retail price as a Money type.
    #[inline]
    pub fn retail_price(&self) -> Money {
        Money::from_cents(self.retail_price_cents)
    }

    /// Classifies this item's stock position given its total on-hand quantity
    /// across all warehouses.
    pub fn stock_status(&self, total_on_hand: i64) -> StockStatus {
        StockStatus::classify(total_on_hand, self.min_stock_level, self.max_stock_level)
    }
}

// =============================================================================
// Stock Status
// =============================================================================

/// Threshold classification of an item's total on-hand stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing on hand anywhere.
    Out,
    /// At or below the item's minimum stock level.
    Low,
    /// Between the thresholds.
    Normal,
    /// At or above the item's maximum stock level.
    Over,
}

impl StockStatus {
    /// Classifies a total on-hand quantity against min/max thresholds.
    ///
    /// Zero wins over `Low` even when `min_stock_level` is zero; `Low`
    /// wins over `Over` when the thresholds are inverted.
    pub fn classify(total_on_hand: i64, min_level: i64, max_level: i64) -> Self {
        if total_on_hand == 0 {
            StockStatus::Out
        } else if total_on_hand <= min_level {
            StockStatus::Low
        } else if total_on_hand >= max_level {
            StockStatus::Over
        } else {
            StockStatus::Normal
        }
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// A stock location. Transfers move quantity between two of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Parties
// =============================================================================

/// A customer account with a running balance.
///
/// The balance grows by the unpaid remainder of each sale and shrinks when
/// a payment is received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    /// What the customer currently owes, in minor units.
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// A supplier account with a running balance (what we owe the supplier).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    /// What we currently owe the supplier, in minor units.
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// Which side of the ledger a payment touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Customer,
    Supplier,
}

/// A staff member referenced by documents. Inert reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Timestamp-based invoice number (`INV-<millis>`, see `numbering`).
    pub invoice_number: String,
    pub customer_id: String,
    pub worker_id: String,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Unpaid remainder. Negative when the customer overpaid.
    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.total_cents - self.paid_cents)
    }
}

/// A line of a sale, one row per (item, warehouse) allocation.
/// Uses snapshot pattern to freeze item data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    pub warehouse_id: String,
    /// Item name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in minor units at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub total_cents: i64,
}

// =============================================================================
// Purchase
// =============================================================================

/// A completed purchase from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    /// Date-sequenced invoice number (`PUR-YYYYMMDD-NNN`).
    pub invoice_number: String,
    pub supplier_id: String,
    pub worker_id: String,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Unpaid remainder owed to the supplier.
    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.total_cents - self.paid_cents)
    }
}

/// A line of a purchase, one row per (item, warehouse) allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub item_id: String,
    pub warehouse_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Return
// =============================================================================

/// Direction of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// A customer brings goods back; stock re-enters.
    Customer,
    /// We send goods back to a supplier; stock leaves.
    Supplier,
}

/// A completed return in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnRecord {
    pub id: String,
    /// Date-sequenced return number (`RET-YYYYMMDD-NNN`).
    pub return_number: String,
    pub kind: ReturnKind,
    /// Set when `kind` is `Customer`.
    pub customer_id: Option<String>,
    /// Set when `kind` is `Supplier`.
    pub supplier_id: Option<String>,
    pub worker_id: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A line of a return, one row per (item, warehouse) allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnItem {
    pub id: String,
    pub return_id: String,
    pub item_id: String,
    pub warehouse_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Payment
// =============================================================================

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Money received (typically from a customer).
    Received,
    /// Money paid out (typically to a supplier).
    Paid,
}

/// How a payment or expense was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Cheque,
}

/// A standalone payment against a customer or supplier balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    /// Date-sequenced payment number (`PAY-YYYYMMDD-NNN`).
    pub payment_number: String,
    pub party: PartyKind,
    pub customer_id: Option<String>,
    pub supplier_id: Option<String>,
    pub worker_id: Option<String>,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub direction: PaymentDirection,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    /// Month-sequenced expense number (`EXP-YYYYMM-NNNN`).
    pub expense_number: String,
    pub category: Option<String>,
    pub worker_id: Option<String>,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
    /// The day the money was spent (may differ from the row's creation day).
    pub spent_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the expense amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_classify() {
        // min 10, max 100
        assert_eq!(StockStatus::classify(0, 10, 100), StockStatus::Out);
        assert_eq!(StockStatus::classify(5, 10, 100), StockStatus::Low);
        assert_eq!(StockStatus::classify(10, 10, 100), StockStatus::Low);
        assert_eq!(StockStatus::classify(11, 10, 100), StockStatus::Normal);
        assert_eq!(StockStatus::classify(99, 10, 100), StockStatus::Normal);
        assert_eq!(StockStatus::classify(100, 10, 100), StockStatus::Over);
        assert_eq!(StockStatus::classify(250, 10, 100), StockStatus::Over);
    }

    #[test]
    fn test_stock_status_zero_min() {
        // With a zero minimum, an empty shelf is still Out, not Low
        assert_eq!(StockStatus::classify(0, 0, 50), StockStatus::Out);
        assert_eq!(StockStatus::classify(1, 0, 50), StockStatus::Normal);
    }

    #[test]
    fn test_sale_remaining() {
        let sale = Sale {
            id: "s1".to_string(),
            invoice_number: "INV-1717243800000".to_string(),
            customer_id: "c1".to_string(),
            worker_id: "w1".to_string(),
            total_cents: 40_000,
            paid_cents: 25_000,
            created_at: Utc::now(),
        };
        assert_eq!(sale.remaining().cents(), 15_000);
    }

    #[test]
    fn test_sale_overpayment_is_negative() {
        let sale = Sale {
            id: "s1".to_string(),
            invoice_number: "INV-1717243800001".to_string(),
            customer_id: "c1".to_string(),
            worker_id: "w1".to_string(),
            total_cents: 10_000,
            paid_cents: 12_000,
            created_at: Utc::now(),
        };
        assert!(sale.remaining().is_negative());
        assert_eq!(sale.remaining().cents(), -2_000);
    }
}
