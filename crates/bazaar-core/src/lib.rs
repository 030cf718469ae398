//! # bazaar-core: Pure Business Logic for Bazaar POS
//!
//! This crate is the heart of Bazaar POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bazaar POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI Layer (external collaborator)               │   │
//! │  │   picks items ──► allocates quantities ──► submits with paid   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bazaar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────────┐    │   │
//! │  │   │  money   │ │ numbering │ │   cart   │ │   movement   │    │   │
//! │  │   │  Money   │ │ allocate  │ │  Cart    │ │ StockLedger  │    │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bazaar-db (persistence layer)                  │   │
//! │  │      SQLite repositories, stock ledger, submission services     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Warehouse, parties, documents)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`numbering`] - Document number allocation
//! - [`cart`] - The session-owned cart ledger
//! - [`movement`] - Stock movement builders and the ledger capability
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input =
//!    same output. Even "now" is a parameter.
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here.
//!    The two async capability traits are seams, not implementations.
//! 3. **Integer Money**: All monetary values are minor units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod movement;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazaar_core::Money` instead of
// `use bazaar_core::money::Money`

pub use cart::{Allocation, AllocationInput, Cart, CartKind, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use movement::{StockLedger, StockMovement};
pub use numbering::{DocumentDirectory, DocumentKind};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// Prevents runaway carts and keeps a single submission's stock-movement
/// fan-out bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single allocation.
///
/// Catches fat-finger entries (e.g. 10000 instead of 100) before they
/// reach the store. Wholesale carts legitimately run into the hundreds.
pub const MAX_LINE_QUANTITY: i64 = 9_999;
