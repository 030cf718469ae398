//! # Stock Movements
//!
//! Shapes and validates the requests handed to the stock-mutation service.
//!
//! This module never executes anything. It builds a `StockMovement` value
//! that an implementation of [`StockLedger`] applies - the real one over
//! the store, an in-memory fake in tests. The ledger is assumed atomic per
//! (item, warehouse) row for adjustments and atomic across both rows for a
//! transfer; this module's checks are a client-side guard in front of that
//! authoritative enforcement.
//!
//! No retries live here. A failed application surfaces as
//! `RemoteOperationFailed` and the user decides whether to retry; earlier
//! movements of the same submission stay applied.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Stock Movement
// =============================================================================

/// A validated request for the stock-mutation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StockMovement {
    /// A signed quantity change on one (item, warehouse) pair.
    /// Negative = stock leaves, positive = stock enters.
    Adjustment {
        item_id: String,
        warehouse_id: String,
        quantity_delta: i64,
    },
    /// A paired decrement/increment across two warehouses for one item.
    Transfer {
        item_id: String,
        from_warehouse_id: String,
        to_warehouse_id: String,
        quantity: i64,
        note: Option<String>,
    },
}

/// Builds a signed stock adjustment.
///
/// A zero delta is rejected - it would be a no-op call against the store.
pub fn build_adjustment(
    item_id: impl Into<String>,
    warehouse_id: impl Into<String>,
    quantity_delta: i64,
) -> CoreResult<StockMovement> {
    if quantity_delta == 0 {
        return Err(CoreError::invalid_allocation(
            "adjustment quantity must not be zero",
        ));
    }
    Ok(StockMovement::Adjustment {
        item_id: item_id.into(),
        warehouse_id: warehouse_id.into(),
        quantity_delta,
    })
}

/// Builds a warehouse-to-warehouse transfer.
///
/// ## Arguments
/// * `available_at_source` - on-hand quantity at the source as known to the
///   caller, when known. Advisory: the store's own check is authoritative.
///
/// ## Errors
/// `InvalidTransfer` when source equals destination, quantity is not
/// positive, or quantity exceeds the known source stock.
pub fn build_transfer(
    item_id: impl Into<String>,
    from_warehouse_id: impl Into<String>,
    to_warehouse_id: impl Into<String>,
    quantity: i64,
    available_at_source: Option<i64>,
    note: Option<String>,
) -> CoreResult<StockMovement> {
    let from = from_warehouse_id.into();
    let to = to_warehouse_id.into();

    if from == to {
        return Err(CoreError::invalid_transfer(
            "source and destination are the same warehouse",
        ));
    }
    if quantity <= 0 {
        return Err(CoreError::invalid_transfer("quantity must be positive"));
    }
    if let Some(available) = available_at_source {
        if quantity > available {
            return Err(CoreError::invalid_transfer(format!(
                "requested {} exceeds available {} at source",
                quantity, available
            )));
        }
    }

    Ok(StockMovement::Transfer {
        item_id: item_id.into(),
        from_warehouse_id: from,
        to_warehouse_id: to,
        quantity,
        note,
    })
}

/// Expands a cart into the adjustments its posting produces.
///
/// One adjustment per (line, allocation), signed by the cart kind: sale and
/// supplier-return decrement, purchase and customer-return increment.
pub fn cart_movements(cart: &Cart) -> Vec<StockMovement> {
    let sign = cart.kind().stock_sign();
    cart.lines()
        .iter()
        .flat_map(|line| {
            line.allocations.iter().map(move |allocation| {
                StockMovement::Adjustment {
                    item_id: line.item_id.clone(),
                    warehouse_id: allocation.warehouse_id.clone(),
                    quantity_delta: sign * allocation.quantity,
                }
            })
        })
        .collect()
}

// =============================================================================
// Ledger Capability
// =============================================================================

/// Write access to stock levels.
///
/// Implementations must be atomic per (item, warehouse) row for `adjust`
/// and atomic across both rows for `transfer`. Failures map to
/// `CoreError::RemoteOperationFailed`; callers do not retry automatically.
#[async_trait]
pub trait StockLedger {
    /// Applies a signed quantity change to one (item, warehouse) pair.
    async fn adjust(
        &self,
        item_id: &str,
        warehouse_id: &str,
        quantity_delta: i64,
    ) -> CoreResult<()>;

    /// Moves quantity between two warehouses as one atomic operation.
    async fn transfer(
        &self,
        item_id: &str,
        from_warehouse_id: &str,
        to_warehouse_id: &str,
        quantity: i64,
        note: Option<&str>,
    ) -> CoreResult<()>;

    /// Dispatches a built movement to the matching method.
    async fn apply(&self, movement: &StockMovement) -> CoreResult<()>
    where
        Self: Sync,
    {
        match movement {
            StockMovement::Adjustment {
                item_id,
                warehouse_id,
                quantity_delta,
            } => self.adjust(item_id, warehouse_id, *quantity_delta).await,
            StockMovement::Transfer {
                item_id,
                from_warehouse_id,
                to_warehouse_id,
                quantity,
                note,
            } => {
                self.transfer(
                    item_id,
                    from_warehouse_id,
                    to_warehouse_id,
                    *quantity,
                    note.as_deref(),
                )
                .await
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{AllocationInput, CartKind};
    use crate::types::Item;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory ledger: (item, warehouse) → quantity. No backend needed.
    #[derive(Default)]
    struct MemoryLedger {
        levels: Mutex<HashMap<(String, String), i64>>,
    }

    impl MemoryLedger {
        fn on_hand(&self, item_id: &str, warehouse_id: &str) -> i64 {
            *self
                .levels
                .lock()
                .unwrap()
                .get(&(item_id.to_string(), warehouse_id.to_string()))
                .unwrap_or(&0)
        }
    }

    #[async_trait]
    impl StockLedger for MemoryLedger {
        async fn adjust(
            &self,
            item_id: &str,
            warehouse_id: &str,
            quantity_delta: i64,
        ) -> CoreResult<()> {
            let mut levels = self.levels.lock().unwrap();
            *levels
                .entry((item_id.to_string(), warehouse_id.to_string()))
                .or_insert(0) += quantity_delta;
            Ok(())
        }

        async fn transfer(
            &self,
            item_id: &str,
            from_warehouse_id: &str,
            to_warehouse_id: &str,
            quantity: i64,
            _note: Option<&str>,
        ) -> CoreResult<()> {
            let mut levels = self.levels.lock().unwrap();
            let source = levels
                .entry((item_id.to_string(), from_warehouse_id.to_string()))
                .or_insert(0);
            if *source < quantity {
                return Err(CoreError::remote("Stock transfer", "insufficient stock"));
            }
            *source -= quantity;
            *levels
                .entry((item_id.to_string(), to_warehouse_id.to_string()))
                .or_insert(0) += quantity;
            Ok(())
        }
    }

    fn test_item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {}", id),
            brand: None,
            purchase_price_cents: 800,
            retail_price_cents: 1_000,
            min_stock_level: 10,
            max_stock_level: 1000,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_transfer_rejects_same_warehouse() {
        // Same warehouse is invalid regardless of quantity
        for quantity in [1, 50, -3] {
            let err = build_transfer("item-1", "wh-1", "wh-1", quantity, None, None).unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransfer { .. }));
        }
    }

    #[test]
    fn test_build_transfer_rejects_non_positive_quantity() {
        for quantity in [0, -1] {
            let err = build_transfer("item-1", "wh-1", "wh-2", quantity, None, None).unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransfer { .. }));
        }
    }

    #[test]
    fn test_build_transfer_rejects_quantity_over_source_stock() {
        let err = build_transfer("item-1", "wh-1", "wh-2", 10, Some(7), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransfer { .. }));

        // At the bound is fine, and so is an unknown bound
        build_transfer("item-1", "wh-1", "wh-2", 7, Some(7), None).unwrap();
        build_transfer("item-1", "wh-1", "wh-2", 10, None, None).unwrap();
    }

    #[test]
    fn test_build_transfer_carries_note() {
        let movement =
            build_transfer("item-1", "wh-1", "wh-2", 5, None, Some("restock".to_string()))
                .unwrap();
        match movement {
            StockMovement::Transfer { quantity, note, .. } => {
                assert_eq!(quantity, 5);
                assert_eq!(note.as_deref(), Some("restock"));
            }
            _ => panic!("expected transfer"),
        }
    }

    #[test]
    fn test_build_adjustment_rejects_zero() {
        let err = build_adjustment("item-1", "wh-1", 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAllocation { .. }));

        build_adjustment("item-1", "wh-1", -5).unwrap();
        build_adjustment("item-1", "wh-1", 5).unwrap();
    }

    #[tokio::test]
    async fn test_apply_dispatches_to_the_right_method() {
        let ledger = MemoryLedger::default();
        ledger.adjust("item-1", "wh-1", 10).await.unwrap();

        let sale_posting = build_adjustment("item-1", "wh-1", -3).unwrap();
        ledger.apply(&sale_posting).await.unwrap();
        assert_eq!(ledger.on_hand("item-1", "wh-1"), 7);

        let restock = build_transfer("item-1", "wh-1", "wh-2", 5, Some(7), None).unwrap();
        ledger.apply(&restock).await.unwrap();
        assert_eq!(ledger.on_hand("item-1", "wh-1"), 2);
        assert_eq!(ledger.on_hand("item-1", "wh-2"), 5);
    }

    #[tokio::test]
    async fn test_posting_a_cart_against_the_fake_ledger() {
        let ledger = MemoryLedger::default();
        ledger.adjust("item-1", "wh-1", 20).await.unwrap();

        let item = test_item("item-1");
        let mut cart = Cart::new(CartKind::Sale);
        cart.add_line(
            &item,
            None,
            vec![
                AllocationInput::new("wh-1", 3),
                AllocationInput::new("wh-2", 2),
            ],
        )
        .unwrap();

        for movement in cart_movements(&cart) {
            ledger.apply(&movement).await.unwrap();
        }

        assert_eq!(ledger.on_hand("item-1", "wh-1"), 17);
        // Oversell at an unstocked warehouse is the store's concern, not
        // the builder's; the fake mirrors the delta contract
        assert_eq!(ledger.on_hand("item-1", "wh-2"), -2);
    }

    #[test]
    fn test_movement_wire_shape() {
        // The UI layer dispatches on the "type" tag
        let movement = build_adjustment("item-1", "wh-1", -3).unwrap();
        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "adjustment");
        assert_eq!(json["quantity_delta"], -3);

        let movement = build_transfer("item-1", "wh-1", "wh-2", 5, None, None).unwrap();
        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["quantity"], 5);
    }

    #[test]
    fn test_cart_movements_signs() {
        let item = test_item("item-1");

        let mut sale = Cart::new(CartKind::Sale);
        sale.add_line(
            &item,
            None,
            vec![
                AllocationInput::new("wh-1", 3),
                AllocationInput::new("wh-2", 2),
            ],
        )
        .unwrap();

        let movements = cart_movements(&sale);
        assert_eq!(movements.len(), 2);
        match &movements[0] {
            StockMovement::Adjustment {
                warehouse_id,
                quantity_delta,
                ..
            } => {
                assert_eq!(warehouse_id, "wh-1");
                assert_eq!(*quantity_delta, -3);
            }
            _ => panic!("expected adjustment"),
        }

        let mut customer_return = Cart::new(CartKind::CustomerReturn);
        customer_return
            .add_line(&item, None, vec![AllocationInput::new("wh-1", 4)])
            .unwrap();
        match &cart_movements(&customer_return)[0] {
            StockMovement::Adjustment { quantity_delta, .. } => assert_eq!(*quantity_delta, 4),
            _ => panic!("expected adjustment"),
        }

        let mut supplier_return = Cart::new(CartKind::SupplierReturn);
        supplier_return
            .add_line(&item, None, vec![AllocationInput::new("wh-1", 4)])
            .unwrap();
        match &cart_movements(&supplier_return)[0] {
            StockMovement::Adjustment { quantity_delta, .. } => assert_eq!(*quantity_delta, -4),
            _ => panic!("expected adjustment"),
        }
    }
}
