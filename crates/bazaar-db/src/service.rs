//! # Submission Services
//!
//! The orchestration layer that turns a finished cart (or a standalone
//! form) into stored documents, stock movements and balance updates.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Submission, Step by Step                        │
//! │                                                                         │
//! │  validate input                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  allocate document number          (read-only, LookupFailed aborts)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  insert document + line items      (one transaction; UNIQUE number     │
//! │       │                             is the backstop for raced numbers) │
//! │       ▼                                                                 │
//! │  apply stock movements one by one  (each atomic per row; NO rollback   │
//! │       │                             of earlier ones on a mid-sequence  │
//! │       ▼                             failure - the error surfaces and   │
//! │  apply party balance delta          the user retries manually)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  summary back to the UI layer                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The steps are awaited sequentially and are NOT one atomic unit: the
//! store gives us per-row atomicity (and per-transfer atomicity), nothing
//! spanning "number + document + stock + balance". Callers must tolerate
//! partial completion; the cart is taken by reference and never cleared
//! here, so a failed submission can simply be retried.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::pool::Database;
use bazaar_core::movement::{self, StockLedger};
use bazaar_core::validation::{
    validate_amount_cents, validate_note, validate_paid_cents, validate_quantity,
};
use bazaar_core::{
    Cart, CartKind, CartTotals, CoreError, DocumentKind, Expense, Money, PartyKind, Payment,
    PaymentDirection, PaymentMethod, Purchase, PurchaseItem, ReturnItem, ReturnKind, ReturnRecord,
    Sale, SaleItem, StockStatus, ValidationError,
};

// =============================================================================
// Inputs and Summaries
// =============================================================================

/// Input for a sale submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleSubmission {
    pub customer_id: String,
    pub worker_id: String,
    pub paid_cents: i64,
}

/// Input for a purchase submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSubmission {
    pub supplier_id: String,
    pub worker_id: String,
    pub paid_cents: i64,
}

/// Input for a return submission. The cart's kind decides whether
/// `party_id` names a customer or a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSubmission {
    pub party_id: String,
    pub worker_id: String,
}

/// Input for a standalone payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub party: PartyKind,
    pub party_id: String,
    pub worker_id: Option<String>,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub direction: PaymentDirection,
    pub notes: Option<String>,
}

/// Input for an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseInput {
    pub category: Option<String>,
    pub worker_id: Option<String>,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
    pub spent_on: NaiveDate,
}

/// Input for a warehouse-to-warehouse stock transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInput {
    pub item_id: String,
    pub from_warehouse_id: String,
    pub to_warehouse_id: String,
    pub quantity: i64,
    pub note: Option<String>,
}

/// What a sale/purchase submission reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSummary {
    pub document_id: String,
    pub number: String,
    pub totals: CartTotals,
}

/// What a return/payment/expense submission reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingSummary {
    pub document_id: String,
    pub number: String,
    pub amount_cents: i64,
}

// =============================================================================
// Helpers
// =============================================================================

/// Rejects empty carts and carts built for a different transaction kind.
fn ensure_cart(cart: &Cart, expected: &[CartKind]) -> ServiceResult<()> {
    if !expected.contains(&cart.kind()) {
        return Err(CoreError::Validation(ValidationError::InvalidFormat {
            field: "cart".to_string(),
            reason: format!("expected a {:?} cart", expected),
        })
        .into());
    }
    if cart.is_empty() {
        return Err(CoreError::Validation(ValidationError::Required {
            field: "cart lines".to_string(),
        })
        .into());
    }
    Ok(())
}

/// Applies a cart's stock movements one call at a time.
///
/// Each movement is atomic on its own row, but the sequence is not atomic
/// as a whole: a failure in the middle leaves the earlier adjustments
/// applied and surfaces the error. No compensation is attempted.
async fn post_cart_movements(db: &Database, cart: &Cart, document: &str) -> ServiceResult<()> {
    let ledger = db.stock();
    let movements = movement::cart_movements(cart);
    let total = movements.len();

    for (index, m) in movements.iter().enumerate() {
        if let Err(e) = ledger.apply(m).await {
            warn!(
                document = %document,
                applied = index,
                total = total,
                "Stock posting failed mid-sequence; earlier adjustments stay applied"
            );
            return Err(ServiceError::Core(e));
        }
    }

    Ok(())
}

// =============================================================================
// Sales
// =============================================================================

/// Posts a sale cart: invoice number, document + lines, stock decrements,
/// customer balance.
///
/// The unpaid remainder is added to the customer's balance; an overpaid
/// sale (negative remainder) reduces it.
pub async fn complete_sale(
    db: &Database,
    cart: &Cart,
    submission: SaleSubmission,
) -> ServiceResult<TradeSummary> {
    ensure_cart(cart, &[CartKind::Sale])?;
    validate_paid_cents(submission.paid_cents).map_err(CoreError::from)?;

    let number = db.allocate_number(DocumentKind::Sale).await?;
    let totals = cart.compute_totals(Money::from_cents(submission.paid_cents));
    let now = Utc::now();
    let sale_id = Uuid::new_v4().to_string();

    let sale = Sale {
        id: sale_id.clone(),
        invoice_number: number.clone(),
        customer_id: submission.customer_id.clone(),
        worker_id: submission.worker_id,
        total_cents: totals.total_cents,
        paid_cents: totals.paid_cents,
        created_at: now,
    };

    let items: Vec<SaleItem> = cart
        .lines()
        .iter()
        .flat_map(|line| {
            line.allocations.iter().map(|allocation| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                item_id: line.item_id.clone(),
                warehouse_id: allocation.warehouse_id.clone(),
                name_snapshot: line.item_name.clone(),
                quantity: allocation.quantity,
                unit_price_cents: line.unit_price_cents,
                total_cents: line.unit_price_cents * allocation.quantity,
            })
        })
        .collect();

    db.sales().insert(&sale, &items).await?;

    post_cart_movements(db, cart, &number).await?;

    db.parties()
        .adjust_customer_balance(&submission.customer_id, totals.remaining_cents)
        .await?;

    info!(
        invoice_number = %number,
        total = totals.total_cents,
        paid = totals.paid_cents,
        remaining = totals.remaining_cents,
        lines = cart.line_count(),
        "Sale completed"
    );

    Ok(TradeSummary {
        document_id: sale_id,
        number,
        totals,
    })
}

// =============================================================================
// Purchases
// =============================================================================

/// Posts a purchase cart: invoice number, document + lines, stock
/// increments, supplier balance.
pub async fn complete_purchase(
    db: &Database,
    cart: &Cart,
    submission: PurchaseSubmission,
) -> ServiceResult<TradeSummary> {
    ensure_cart(cart, &[CartKind::Purchase])?;
    validate_paid_cents(submission.paid_cents).map_err(CoreError::from)?;

    let number = db.allocate_number(DocumentKind::Purchase).await?;
    let totals = cart.compute_totals(Money::from_cents(submission.paid_cents));
    let now = Utc::now();
    let purchase_id = Uuid::new_v4().to_string();

    let purchase = Purchase {
        id: purchase_id.clone(),
        invoice_number: number.clone(),
        supplier_id: submission.supplier_id.clone(),
        worker_id: submission.worker_id,
        total_cents: totals.total_cents,
        paid_cents: totals.paid_cents,
        created_at: now,
    };

    let items: Vec<PurchaseItem> = cart
        .lines()
        .iter()
        .flat_map(|line| {
            line.allocations.iter().map(|allocation| PurchaseItem {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase_id.clone(),
                item_id: line.item_id.clone(),
                warehouse_id: allocation.warehouse_id.clone(),
                name_snapshot: line.item_name.clone(),
                quantity: allocation.quantity,
                unit_price_cents: line.unit_price_cents,
                total_cents: line.unit_price_cents * allocation.quantity,
            })
        })
        .collect();

    db.purchases().insert(&purchase, &items).await?;

    post_cart_movements(db, cart, &number).await?;

    // What we did not pay up front, we now owe the supplier
    db.parties()
        .adjust_supplier_balance(&submission.supplier_id, totals.remaining_cents)
        .await?;

    info!(
        invoice_number = %number,
        total = totals.total_cents,
        paid = totals.paid_cents,
        remaining = totals.remaining_cents,
        lines = cart.line_count(),
        "Purchase completed"
    );

    Ok(TradeSummary {
        document_id: purchase_id,
        number,
        totals,
    })
}

// =============================================================================
// Returns
// =============================================================================

/// Posts a return cart in either direction.
///
/// Customer returns put stock back; supplier returns take it out. Party
/// balances are untouched - a return is settled separately via a payment.
pub async fn complete_return(
    db: &Database,
    cart: &Cart,
    submission: ReturnSubmission,
) -> ServiceResult<PostingSummary> {
    ensure_cart(cart, &[CartKind::CustomerReturn, CartKind::SupplierReturn])?;

    let kind = match cart.kind() {
        CartKind::CustomerReturn => ReturnKind::Customer,
        CartKind::SupplierReturn => ReturnKind::Supplier,
        // ensure_cart already rejected everything else
        _ => unreachable!("cart kind checked above"),
    };

    let number = db.allocate_number(DocumentKind::Return).await?;
    let now = Utc::now();
    let return_id = Uuid::new_v4().to_string();
    let total_cents = cart.total_cents();

    let record = ReturnRecord {
        id: return_id.clone(),
        return_number: number.clone(),
        kind,
        customer_id: matches!(kind, ReturnKind::Customer).then(|| submission.party_id.clone()),
        supplier_id: matches!(kind, ReturnKind::Supplier).then(|| submission.party_id.clone()),
        worker_id: submission.worker_id,
        total_cents,
        created_at: now,
    };

    let items: Vec<ReturnItem> = cart
        .lines()
        .iter()
        .flat_map(|line| {
            line.allocations.iter().map(|allocation| ReturnItem {
                id: Uuid::new_v4().to_string(),
                return_id: return_id.clone(),
                item_id: line.item_id.clone(),
                warehouse_id: allocation.warehouse_id.clone(),
                name_snapshot: line.item_name.clone(),
                quantity: allocation.quantity,
                unit_price_cents: line.unit_price_cents,
                total_cents: line.unit_price_cents * allocation.quantity,
            })
        })
        .collect();

    db.returns().insert(&record, &items).await?;

    post_cart_movements(db, cart, &number).await?;

    info!(
        return_number = %number,
        kind = ?kind,
        total = total_cents,
        lines = cart.line_count(),
        "Return completed"
    );

    Ok(PostingSummary {
        document_id: return_id,
        number,
        amount_cents: total_cents,
    })
}

// =============================================================================
// Payments
// =============================================================================

/// Records a standalone payment and moves the party's balance.
///
/// Receiving from a customer settles their debt (balance down); paying one
/// out - a refund - raises it. Mirrored for suppliers: paying a supplier
/// lowers what we owe, receiving from one raises it.
pub async fn record_payment(db: &Database, input: PaymentInput) -> ServiceResult<PostingSummary> {
    validate_amount_cents(input.amount_cents).map_err(CoreError::from)?;
    validate_note(input.notes.as_deref()).map_err(CoreError::from)?;

    let number = db.allocate_number(DocumentKind::Payment).await?;
    let payment_id = Uuid::new_v4().to_string();

    let payment = Payment {
        id: payment_id.clone(),
        payment_number: number.clone(),
        party: input.party,
        customer_id: matches!(input.party, PartyKind::Customer).then(|| input.party_id.clone()),
        supplier_id: matches!(input.party, PartyKind::Supplier).then(|| input.party_id.clone()),
        worker_id: input.worker_id,
        amount_cents: input.amount_cents,
        method: input.method,
        direction: input.direction,
        notes: input.notes,
        created_at: Utc::now(),
    };

    db.payments().insert(&payment).await?;

    let balance_delta = match (input.party, input.direction) {
        (PartyKind::Customer, PaymentDirection::Received) => -input.amount_cents,
        (PartyKind::Customer, PaymentDirection::Paid) => input.amount_cents,
        (PartyKind::Supplier, PaymentDirection::Paid) => -input.amount_cents,
        (PartyKind::Supplier, PaymentDirection::Received) => input.amount_cents,
    };

    match input.party {
        PartyKind::Customer => {
            db.parties()
                .adjust_customer_balance(&input.party_id, balance_delta)
                .await?
        }
        PartyKind::Supplier => {
            db.parties()
                .adjust_supplier_balance(&input.party_id, balance_delta)
                .await?
        }
    }

    info!(
        payment_number = %number,
        amount = input.amount_cents,
        direction = ?input.direction,
        party = ?input.party,
        "Payment recorded"
    );

    Ok(PostingSummary {
        document_id: payment_id,
        number,
        amount_cents: input.amount_cents,
    })
}

// =============================================================================
// Expenses
// =============================================================================

/// Records a business expense under the monthly expense counter.
pub async fn record_expense(db: &Database, input: ExpenseInput) -> ServiceResult<PostingSummary> {
    validate_amount_cents(input.amount_cents).map_err(CoreError::from)?;
    validate_note(input.description.as_deref()).map_err(CoreError::from)?;

    let number = db.allocate_number(DocumentKind::Expense).await?;
    let expense_id = Uuid::new_v4().to_string();

    let expense = Expense {
        id: expense_id.clone(),
        expense_number: number.clone(),
        category: input.category,
        worker_id: input.worker_id,
        amount_cents: input.amount_cents,
        method: input.method,
        description: input.description,
        spent_on: input.spent_on,
        created_at: Utc::now(),
    };

    db.expenses().insert(&expense).await?;

    info!(
        expense_number = %number,
        amount = input.amount_cents,
        "Expense recorded"
    );

    Ok(PostingSummary {
        document_id: expense_id,
        number,
        amount_cents: input.amount_cents,
    })
}

// =============================================================================
// Stock Overview
// =============================================================================

/// One item's stock position across all warehouses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStockView {
    pub item_id: String,
    pub name: String,
    pub total_on_hand: i64,
    pub status: StockStatus,
    pub levels: Vec<WarehouseLevel>,
}

/// One warehouse's share in an [`ItemStockView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseLevel {
    pub warehouse_id: String,
    pub quantity: i64,
}

/// Builds the per-item stock view the inventory screen shows: total
/// on-hand, threshold classification and the per-warehouse breakdown.
pub async fn stock_overview(db: &Database, limit: u32) -> ServiceResult<Vec<ItemStockView>> {
    let items = db.items().list_active(limit).await?;
    let stock = db.stock();

    let mut views = Vec::with_capacity(items.len());
    for item in items {
        let levels = stock.levels_for_item(&item.id).await?;
        let total_on_hand = levels.iter().map(|l| l.quantity).sum();

        views.push(ItemStockView {
            status: item.stock_status(total_on_hand),
            item_id: item.id,
            name: item.name,
            total_on_hand,
            levels: levels
                .into_iter()
                .map(|l| WarehouseLevel {
                    warehouse_id: l.warehouse_id,
                    quantity: l.quantity,
                })
                .collect(),
        });
    }

    Ok(views)
}

// =============================================================================
// Stock Transfers
// =============================================================================

/// Moves stock between two warehouses.
///
/// The on-hand quantity read here is the advisory client-side bound; the
/// ledger's own transactional check remains authoritative.
pub async fn transfer_stock(db: &Database, input: TransferInput) -> ServiceResult<()> {
    validate_quantity(input.quantity).map_err(CoreError::from)?;
    validate_note(input.note.as_deref()).map_err(CoreError::from)?;

    let available = db
        .stock()
        .on_hand(&input.item_id, &input.from_warehouse_id)
        .await?;

    let movement = movement::build_transfer(
        &input.item_id,
        &input.from_warehouse_id,
        &input.to_warehouse_id,
        input.quantity,
        Some(available),
        input.note,
    )?;

    db.stock().apply(&movement).await?;

    info!(
        item_id = %input.item_id,
        from = %input.from_warehouse_id,
        to = %input.to_warehouse_id,
        quantity = input.quantity,
        "Stock transferred"
    );

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use bazaar_core::numbering;
    use bazaar_core::{AllocationInput, Customer, Item, Supplier, Warehouse, Worker};

    struct Fixture {
        db: Database,
        item_a: Item,
        item_b: Item,
        wh1: String,
        wh2: String,
        customer: String,
        supplier: String,
        worker: String,
    }

    fn item(name: &str, purchase_cents: i64, retail_cents: i64) -> Item {
        Item {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            brand: None,
            purchase_price_cents: purchase_cents,
            retail_price_cents: retail_cents,
            min_stock_level: 5,
            max_stock_level: 500,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let wh1 = Uuid::new_v4().to_string();
        let wh2 = Uuid::new_v4().to_string();
        for (id, name) in [(&wh1, "Main Store"), (&wh2, "Godown")] {
            db.warehouses()
                .insert(&Warehouse {
                    id: id.clone(),
                    name: name.to_string(),
                    address: None,
                    is_active: true,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let item_a = item("Super Cola 1.5L", 8_000, 10_000);
        let item_b = item("Washing Soap", 4_000, 5_000);
        db.items().insert(&item_a).await.unwrap();
        db.items().insert(&item_b).await.unwrap();

        // Opening stock: 20 of each in wh1, 10 of item A in wh2
        let ledger = db.stock();
        ledger.adjust(&item_a.id, &wh1, 20).await.unwrap();
        ledger.adjust(&item_b.id, &wh1, 20).await.unwrap();
        ledger.adjust(&item_a.id, &wh2, 10).await.unwrap();

        let customer = Uuid::new_v4().to_string();
        db.parties()
            .insert_customer(&Customer {
                id: customer.clone(),
                name: "Hamid General Store".to_string(),
                phone: None,
                city: Some("Lahore".to_string()),
                balance_cents: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let supplier = Uuid::new_v4().to_string();
        db.parties()
            .insert_supplier(&Supplier {
                id: supplier.clone(),
                name: "Bulk Traders".to_string(),
                phone: None,
                city: Some("Karachi".to_string()),
                balance_cents: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let worker = Uuid::new_v4().to_string();
        db.workers()
            .insert(&Worker {
                id: worker.clone(),
                name: "Asif".to_string(),
                phone: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        Fixture {
            db,
            item_a,
            item_b,
            wh1,
            wh2,
            customer,
            supplier,
            worker,
        }
    }

    fn today_prefix(kind: DocumentKind) -> String {
        numbering::number_prefix(kind, Utc::now().date_naive())
    }

    #[tokio::test]
    async fn test_complete_sale_posts_everything() {
        let f = fixture().await;

        let mut cart = Cart::new(CartKind::Sale);
        cart.add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh1, 3)])
            .unwrap();
        cart.add_line(&f.item_b, None, vec![AllocationInput::new(&f.wh1, 2)])
            .unwrap();

        let summary = complete_sale(
            &f.db,
            &cart,
            SaleSubmission {
                customer_id: f.customer.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 25_000,
            },
        )
        .await
        .unwrap();

        // Totals: 3×10000 + 2×5000 = 40000, paid 25000, remaining 15000
        assert!(summary.number.starts_with("INV-"));
        assert_eq!(summary.totals.total_cents, 40_000);
        assert_eq!(summary.totals.paid_cents, 25_000);
        assert_eq!(summary.totals.remaining_cents, 15_000);

        // Document + lines stored
        let sale = f
            .db
            .sales()
            .get_by_invoice_number(&summary.number)
            .await
            .unwrap()
            .expect("sale stored");
        assert_eq!(sale.total_cents, 40_000);
        let items = f.db.sales().items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);

        // Stock left the warehouse
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh1).await.unwrap(), 17);
        assert_eq!(f.db.stock().on_hand(&f.item_b.id, &f.wh1).await.unwrap(), 18);

        // The unpaid remainder landed on the customer's balance
        let customer = f
            .db
            .parties()
            .get_customer(&f.customer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.balance_cents, 15_000);
    }

    #[tokio::test]
    async fn test_list_filtered_composes_typed_clauses() {
        use crate::repository::sale::SaleFilter;

        let f = fixture().await;

        let mut small = Cart::new(CartKind::Sale);
        small
            .add_line(&f.item_b, None, vec![AllocationInput::new(&f.wh1, 1)])
            .unwrap();
        let mut large = Cart::new(CartKind::Sale);
        large
            .add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh1, 3)])
            .unwrap();

        for cart in [&small, &large] {
            complete_sale(
                &f.db,
                cart,
                SaleSubmission {
                    customer_id: f.customer.clone(),
                    worker_id: f.worker.clone(),
                    paid_cents: 0,
                },
            )
            .await
            .unwrap();
        }

        // Unfiltered: both
        let all = f.db.sales().list_filtered(&[], 10).await.unwrap();
        assert_eq!(all.len(), 2);

        // Threshold + customer + date window: only the 30000 sale
        let filters = vec![
            SaleFilter::TotalAtLeast { cents: 10_000 },
            SaleFilter::CustomerIs {
                customer_id: f.customer.clone(),
            },
            SaleFilter::CreatedBetween {
                from: Utc::now() - chrono::Duration::hours(1),
                to: Utc::now() + chrono::Duration::hours(1),
            },
        ];
        let filtered = f.db.sales().list_filtered(&filters, 10).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].total_cents, 30_000);

        // A window in the past matches nothing
        let stale = vec![SaleFilter::CreatedBetween {
            from: Utc::now() - chrono::Duration::hours(3),
            to: Utc::now() - chrono::Duration::hours(2),
        }];
        assert!(f.db.sales().list_filtered(&stale, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_sale_rejects_empty_cart() {
        let f = fixture().await;
        let cart = Cart::new(CartKind::Sale);

        let err = complete_sale(
            &f.db,
            &cart,
            SaleSubmission {
                customer_id: f.customer.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_complete_sale_rejects_wrong_cart_kind() {
        let f = fixture().await;
        let mut cart = Cart::new(CartKind::Purchase);
        cart.add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh1, 1)])
            .unwrap();

        let err = complete_sale(
            &f.db,
            &cart,
            SaleSubmission {
                customer_id: f.customer.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_complete_purchase_sequences_and_balances() {
        let f = fixture().await;

        let mut cart = Cart::new(CartKind::Purchase);
        cart.add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh2, 50)])
            .unwrap();

        let first = complete_purchase(
            &f.db,
            &cart,
            PurchaseSubmission {
                supplier_id: f.supplier.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 300_000,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            first.number,
            format!("{}001", today_prefix(DocumentKind::Purchase))
        );

        let second = complete_purchase(
            &f.db,
            &cart,
            PurchaseSubmission {
                supplier_id: f.supplier.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 400_000,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            second.number,
            format!("{}002", today_prefix(DocumentKind::Purchase))
        );

        // Stock entered twice: 10 + 50 + 50
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh2).await.unwrap(), 110);

        // 50 × 8000 = 400000 per purchase; unpaid 100000 + 0
        let supplier = f
            .db
            .parties()
            .get_supplier(&f.supplier)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(supplier.balance_cents, 100_000);
    }

    #[tokio::test]
    async fn test_complete_return_customer_restocks() {
        let f = fixture().await;

        let mut cart = Cart::new(CartKind::CustomerReturn);
        cart.add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh1, 2)])
            .unwrap();

        let summary = complete_return(
            &f.db,
            &cart,
            ReturnSubmission {
                party_id: f.customer.clone(),
                worker_id: f.worker.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            summary.number,
            format!("{}001", today_prefix(DocumentKind::Return))
        );
        assert_eq!(summary.amount_cents, 20_000); // 2 × retail

        let record = f
            .db
            .returns()
            .get_by_id(&summary.document_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, ReturnKind::Customer);
        assert_eq!(record.customer_id.as_deref(), Some(f.customer.as_str()));
        assert_eq!(record.supplier_id, None);

        // Stock re-entered
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh1).await.unwrap(), 22);
    }

    #[tokio::test]
    async fn test_complete_return_supplier_destocks() {
        let f = fixture().await;

        let mut cart = Cart::new(CartKind::SupplierReturn);
        cart.add_line(&f.item_a, None, vec![AllocationInput::new(&f.wh1, 4)])
            .unwrap();

        let summary = complete_return(
            &f.db,
            &cart,
            ReturnSubmission {
                party_id: f.supplier.clone(),
                worker_id: f.worker.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.amount_cents, 32_000); // 4 × purchase price

        // Stock left
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh1).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_record_payment_moves_customer_balance() {
        let f = fixture().await;

        // Put the customer in debt first
        f.db.parties()
            .adjust_customer_balance(&f.customer, 30_000)
            .await
            .unwrap();

        let summary = record_payment(
            &f.db,
            PaymentInput {
                party: PartyKind::Customer,
                party_id: f.customer.clone(),
                worker_id: Some(f.worker.clone()),
                amount_cents: 12_000,
                method: PaymentMethod::Cash,
                direction: PaymentDirection::Received,
                notes: Some("partial settlement".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            summary.number,
            format!("{}001", today_prefix(DocumentKind::Payment))
        );

        let customer = f
            .db
            .parties()
            .get_customer(&f.customer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.balance_cents, 18_000);

        let stored = f
            .db
            .payments()
            .get_by_id(&summary.document_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.direction, PaymentDirection::Received);
        assert_eq!(stored.customer_id.as_deref(), Some(f.customer.as_str()));
    }

    #[tokio::test]
    async fn test_record_payment_to_supplier_lowers_what_we_owe() {
        let f = fixture().await;

        f.db.parties()
            .adjust_supplier_balance(&f.supplier, 50_000)
            .await
            .unwrap();

        record_payment(
            &f.db,
            PaymentInput {
                party: PartyKind::Supplier,
                party_id: f.supplier.clone(),
                worker_id: None,
                amount_cents: 20_000,
                method: PaymentMethod::Bank,
                direction: PaymentDirection::Paid,
                notes: None,
            },
        )
        .await
        .unwrap();

        let supplier = f
            .db
            .parties()
            .get_supplier(&f.supplier)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(supplier.balance_cents, 30_000);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_non_positive_amount() {
        let f = fixture().await;

        let err = record_payment(
            &f.db,
            PaymentInput {
                party: PartyKind::Customer,
                party_id: f.customer.clone(),
                worker_id: None,
                amount_cents: 0,
                method: PaymentMethod::Cash,
                direction: PaymentDirection::Received,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_record_expense_runs_monthly_counter() {
        let f = fixture().await;

        let input = ExpenseInput {
            category: Some("utilities".to_string()),
            worker_id: None,
            amount_cents: 7_500,
            method: PaymentMethod::Cash,
            description: Some("electricity bill".to_string()),
            spent_on: Utc::now().date_naive(),
        };

        let first = record_expense(&f.db, input.clone()).await.unwrap();
        assert_eq!(
            first.number,
            format!("{}0001", today_prefix(DocumentKind::Expense))
        );

        let second = record_expense(&f.db, input).await.unwrap();
        assert_eq!(
            second.number,
            format!("{}0002", today_prefix(DocumentKind::Expense))
        );
    }

    #[tokio::test]
    async fn test_stock_overview_classifies_items() {
        let f = fixture().await;

        // item_a: 20 + 10 = 30 on hand (min 5, max 500) → Normal
        // item_b: 20 on hand in wh1 only → Normal; sell it down to Low
        let mut cart = Cart::new(CartKind::Sale);
        cart.add_line(&f.item_b, None, vec![AllocationInput::new(&f.wh1, 16)])
            .unwrap();
        complete_sale(
            &f.db,
            &cart,
            SaleSubmission {
                customer_id: f.customer.clone(),
                worker_id: f.worker.clone(),
                paid_cents: 80_000,
            },
        )
        .await
        .unwrap();

        let views = stock_overview(&f.db, 50).await.unwrap();
        assert_eq!(views.len(), 2);

        let view_a = views.iter().find(|v| v.item_id == f.item_a.id).unwrap();
        assert_eq!(view_a.total_on_hand, 30);
        assert_eq!(view_a.status, StockStatus::Normal);
        assert_eq!(view_a.levels.len(), 2);

        let view_b = views.iter().find(|v| v.item_id == f.item_b.id).unwrap();
        assert_eq!(view_b.total_on_hand, 4);
        assert_eq!(view_b.status, StockStatus::Low);
    }

    #[tokio::test]
    async fn test_transfer_stock_moves_and_audits() {
        let f = fixture().await;

        transfer_stock(
            &f.db,
            TransferInput {
                item_id: f.item_a.id.clone(),
                from_warehouse_id: f.wh1.clone(),
                to_warehouse_id: f.wh2.clone(),
                quantity: 4,
                note: Some("restock front shelf".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh1).await.unwrap(), 16);
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh2).await.unwrap(), 14);

        let transfers = f.db.stock().list_transfers(10).await.unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].quantity, 4);
        assert_eq!(transfers[0].note.as_deref(), Some("restock front shelf"));
    }

    #[tokio::test]
    async fn test_transfer_stock_rejects_insufficient_source() {
        let f = fixture().await;

        let err = transfer_stock(
            &f.db,
            TransferInput {
                item_id: f.item_a.id.clone(),
                from_warehouse_id: f.wh1.clone(),
                to_warehouse_id: f.wh2.clone(),
                quantity: 500,
                note: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidTransfer { .. })));

        // Nothing moved
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh1).await.unwrap(), 20);
        assert_eq!(f.db.stock().on_hand(&f.item_a.id, &f.wh2).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_transfer_stock_rejects_same_warehouse() {
        let f = fixture().await;

        let err = transfer_stock(
            &f.db,
            TransferInput {
                item_id: f.item_a.id.clone(),
                from_warehouse_id: f.wh1.clone(),
                to_warehouse_id: f.wh1.clone(),
                quantity: 1,
                note: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidTransfer { .. })));
    }

    #[tokio::test]
    async fn test_raced_number_fails_on_unique_constraint() {
        let f = fixture().await;

        let number = f.db.allocate_number(DocumentKind::Payment).await.unwrap();

        // A racing session persisted the same number first
        let rival = Payment {
            id: Uuid::new_v4().to_string(),
            payment_number: number.clone(),
            party: PartyKind::Customer,
            customer_id: Some(f.customer.clone()),
            supplier_id: None,
            worker_id: None,
            amount_cents: 1_000,
            method: PaymentMethod::Cash,
            direction: PaymentDirection::Received,
            notes: None,
            created_at: Utc::now(),
        };
        f.db.payments().insert(&rival).await.unwrap();

        let ours = Payment {
            id: Uuid::new_v4().to_string(),
            payment_number: number,
            ..rival.clone()
        };
        let err = f.db.payments().insert(&ours).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
