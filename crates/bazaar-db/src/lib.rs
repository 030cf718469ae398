//! # bazaar-db: Database Layer for Bazaar POS
//!
//! This crate provides persistence for the Bazaar POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar POS Data Flow                             │
//! │                                                                         │
//! │  UI action (complete sale, record payment, transfer stock)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐  │   │
//! │  │   │   service     │   │  repositories  │   │   Database    │  │   │
//! │  │   │ orchestration │──►│ (per aggregate)│──►│  (pool.rs)    │  │   │
//! │  │   │               │   │                │   │               │  │   │
//! │  │   │ complete_sale │   │ SaleRepo ...   │   │ SqlitePool    │  │   │
//! │  │   │ record_*      │   │ StockRepo      │   │ + migrations  │  │   │
//! │  │   └───────┬───────┘   └────────────────┘   └───────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           └── uses bazaar-core: numbering, cart math,           │   │
//! │  │               movement builders, capability traits              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations (item, stock, sale, ...)
//! - [`directory`] - The DocumentDirectory implementation (numbering reads)
//! - [`service`] - Submission orchestration (sales, purchases, returns,
//!   payments, expenses, transfers)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//! use bazaar_db::service::{self, SaleSubmission};
//!
//! let db = Database::new(DbConfig::new("path/to/bazaar.db")).await?;
//!
//! let summary = service::complete_sale(&db, &cart, SaleSubmission {
//!     customer_id,
//!     worker_id,
//!     paid_cents: 25_000,
//! })
//! .await?;
//! println!("invoice {}", summary.number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod directory;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, ServiceError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::item::ItemRepository;
pub use repository::party::PartyRepository;
pub use repository::payment::PaymentRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::returns::ReturnRepository;
pub use repository::sale::{SaleFilter, SaleRepository};
pub use repository::stock::StockRepository;
pub use repository::warehouse::WarehouseRepository;
pub use repository::worker::WorkerRepository;
