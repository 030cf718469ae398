//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Allocation, cart and stock-movement failures   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - What the UI collaborator sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → UI                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (warehouse, quantity, number, ...)
//! 3. Errors are enum variants, never String
//! 4. Nothing is silently swallowed or retried; every failure reaches the
//!    caller that initiated the operation

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The highest-number lookup behind a sequence allocation failed.
    ///
    /// Allocation must abort here: guessing sequence 1 against a store we
    /// could not read risks colliding with an existing number.
    #[error("Document number lookup failed: {reason}")]
    LookupFailed { reason: String },

    /// A stored document number does not end in a numeric sequence segment.
    ///
    /// Incrementing cannot proceed; reseeding at 1 would collide with the
    /// malformed record's neighbours.
    #[error("Stored document number is malformed: {number}")]
    MalformedDocumentNumber { number: String },

    /// A cart line's allocation set is unusable.
    ///
    /// ## When This Occurs
    /// - Every (warehouse, quantity) row is zero or negative
    /// - A quantity exceeds the known available stock at its warehouse
    #[error("Invalid allocation: {reason}")]
    InvalidAllocation { reason: String },

    /// A stock transfer request failed client-side validation.
    ///
    /// ## When This Occurs
    /// - Source and destination warehouse are the same
    /// - Quantity is zero or negative
    /// - Quantity exceeds the known stock at the source (advisory bound)
    #[error("Invalid transfer: {reason}")]
    InvalidTransfer { reason: String },

    /// A remote store operation (stock adjustment, transfer, insert) failed.
    ///
    /// There is no automatic retry and no rollback of earlier steps in the
    /// same submission; the user retries or aborts with the cart intact.
    #[error("{operation} failed: {reason}")]
    RemoteOperationFailed { operation: String, reason: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Allocation quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A cart line index was out of range.
    #[error("No cart line at index {index}")]
    LineOutOfRange { index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a LookupFailed error.
    pub fn lookup_failed(reason: impl Into<String>) -> Self {
        CoreError::LookupFailed {
            reason: reason.into(),
        }
    }

    /// Creates an InvalidAllocation error.
    pub fn invalid_allocation(reason: impl Into<String>) -> Self {
        CoreError::InvalidAllocation {
            reason: reason.into(),
        }
    }

    /// Creates an InvalidTransfer error.
    pub fn invalid_transfer(reason: impl Into<String>) -> Self {
        CoreError::InvalidTransfer {
            reason: reason.into(),
        }
    }

    /// Creates a RemoteOperationFailed error.
    pub fn remote(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::RemoteOperationFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_transfer("source and destination are the same warehouse");
        assert_eq!(
            err.to_string(),
            "Invalid transfer: source and destination are the same warehouse"
        );

        let err = CoreError::remote("Stock adjustment", "connection reset");
        assert_eq!(err.to_string(), "Stock adjustment failed: connection reset");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
