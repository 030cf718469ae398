//! # Cart Ledger
//!
//! The transient accumulator that turns picked items into totals before a
//! submission.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Lifecycle                                     │
//! │                                                                         │
//! │  Cart::new(kind) ──► add_line / remove_line ──► compute_totals(paid)   │
//! │        │                                              │                 │
//! │        │                                              ▼                 │
//! │        │                               submission service posts the    │
//! │        │                               document + stock movements      │
//! │        │                                              │                 │
//! │        └──────────────── clear() on success ◄─────────┘                 │
//! │                                                                         │
//! │  The cart is a plain value owned by the calling session. There is no   │
//! │  module-level shared cart; concurrent UI flows each own their own.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - A line's unit price is frozen when the line is added; later catalog
//!   price changes do not touch it
//! - Every stored allocation quantity is > 0 (non-positive input rows are
//!   dropped; a set with no positive row is rejected)
//! - `remaining = total - paid` may go negative (overpayment) and is
//!   surfaced as-is, never clamped

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Item;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Kind
// =============================================================================

/// The transaction direction a cart is being built for.
///
/// Decides which catalog price seeds a line when the operator does not
/// override it, and which way stock moves when the cart is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    /// Selling to a customer: retail price, stock leaves.
    Sale,
    /// Buying from a supplier: purchase price, stock enters.
    Purchase,
    /// Customer brings goods back: retail price, stock enters.
    CustomerReturn,
    /// Sending goods back to a supplier: purchase price, stock leaves.
    SupplierReturn,
}

impl CartKind {
    /// The catalog price used when no override is supplied.
    pub fn catalog_price(&self, item: &Item) -> Money {
        match self {
            CartKind::Sale | CartKind::CustomerReturn => item.retail_price(),
            CartKind::Purchase | CartKind::SupplierReturn => item.purchase_price(),
        }
    }

    /// Sign of the stock delta a posted allocation produces.
    pub const fn stock_sign(&self) -> i64 {
        match self {
            CartKind::Sale | CartKind::SupplierReturn => -1,
            CartKind::Purchase | CartKind::CustomerReturn => 1,
        }
    }
}

// =============================================================================
// Allocations
// =============================================================================

/// One (warehouse, quantity) row as collected from the UI.
///
/// `available` is the on-hand quantity the UI knew at selection time. It is
/// an advisory guard only - the store remains authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub warehouse_id: String,
    pub quantity: i64,
    pub available: Option<i64>,
}

impl AllocationInput {
    /// Convenience constructor without an availability bound.
    pub fn new(warehouse_id: impl Into<String>, quantity: i64) -> Self {
        AllocationInput {
            warehouse_id: warehouse_id.into(),
            quantity,
            available: None,
        }
    }

    /// Constructor with a known availability bound.
    pub fn bounded(warehouse_id: impl Into<String>, quantity: i64, available: i64) -> Self {
        AllocationInput {
            warehouse_id: warehouse_id.into(),
            quantity,
            available: Some(available),
        }
    }
}

/// A validated (warehouse, quantity) allocation stored on a cart line.
/// Quantity is always > 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub warehouse_id: String,
    pub quantity: i64,
}

// =============================================================================
// Cart Line
// =============================================================================

/// A pending line: one item at a frozen unit price, spread over one or more
/// warehouse allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    /// Item name at time of adding (frozen).
    pub item_name: String,
    /// Unit price in minor units at time of adding (frozen).
    pub unit_price_cents: i64,
    pub allocations: Vec<Allocation>,
}

impl CartLine {
    /// Total quantity across all allocations.
    pub fn total_quantity(&self) -> i64 {
        self.allocations.iter().map(|a| a.quantity).sum()
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × total quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.total_quantity())
    }
}

// =============================================================================
// Totals
// =============================================================================

/// The total/paid/remaining triple a submission reports back to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_cents: i64,
    pub paid_cents: i64,
    /// total - paid; negative means overpayment.
    pub remaining_cents: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered list of pending lines for one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    kind: CartKind,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart for the given transaction direction.
    pub fn new(kind: CartKind) -> Self {
        Cart {
            kind,
            lines: Vec::new(),
        }
    }

    /// The transaction direction this cart is for.
    #[inline]
    pub fn kind(&self) -> CartKind {
        self.kind
    }

    /// The lines in insertion order.
    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line for `item`.
    ///
    /// ## Price Resolution
    /// `price_override` wins when given; otherwise the kind's catalog price
    /// (retail for sale/customer-return, purchase for the supplier-facing
    /// kinds). Whatever is resolved here is frozen on the line.
    ///
    /// ## Validation
    /// - at least one allocation quantity must be positive; non-positive
    ///   rows are dropped, positive rows kept
    /// - a positive quantity must not exceed its `available` bound when the
    ///   UI knew one
    /// - per-allocation quantity cap and line-count cap
    pub fn add_line(
        &mut self,
        item: &Item,
        price_override: Option<Money>,
        allocations: Vec<AllocationInput>,
    ) -> CoreResult<&CartLine> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let kept: Vec<AllocationInput> = allocations
            .into_iter()
            .filter(|a| a.quantity > 0)
            .collect();

        if kept.is_empty() {
            return Err(CoreError::invalid_allocation(
                "no allocation has a positive quantity",
            ));
        }

        for allocation in &kept {
            if allocation.quantity > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: allocation.quantity,
                    max: MAX_LINE_QUANTITY,
                });
            }
            if let Some(available) = allocation.available {
                if allocation.quantity > available {
                    return Err(CoreError::invalid_allocation(format!(
                        "requested {} exceeds available {} at warehouse {}",
                        allocation.quantity, available, allocation.warehouse_id
                    )));
                }
            }
        }

        let unit_price = price_override.unwrap_or_else(|| self.kind.catalog_price(item));
        if unit_price.is_negative() {
            return Err(CoreError::invalid_allocation("unit price must not be negative"));
        }

        self.lines.push(CartLine {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            unit_price_cents: unit_price.cents(),
            allocations: kept
                .into_iter()
                .map(|a| Allocation {
                    warehouse_id: a.warehouse_id,
                    quantity: a.quantity,
                })
                .collect(),
        });

        Ok(self.lines.last().expect("line just pushed"))
    }

    /// Removes and returns the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfRange { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Clears all lines (after a successful submission).
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// Sum of all line totals in minor units.
    #[inline]
    pub fn total_cents(&self) -> i64 {
        self.total().cents()
    }

    /// Derives the total/paid/remaining triple for a paid amount.
    ///
    /// Pure and deterministic: no side effects, same cart and paid amount
    /// always yield the same triple.
    pub fn compute_totals(&self, paid: Money) -> CartTotals {
        let total = self.total();
        CartTotals {
            total_cents: total.cents(),
            paid_cents: paid.cents(),
            remaining_cents: (total - paid).cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
