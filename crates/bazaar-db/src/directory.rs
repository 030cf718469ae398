//! # Document Directory
//!
//! The [`DocumentDirectory`] implementation over the real store: each
//! document kind dispatches to its own table's highest-number scan.
//!
//! Any query failure maps to `CoreError::LookupFailed`, which aborts the
//! allocation in `bazaar_core::numbering::allocate` - the allocator never
//! guesses sequence 1 against a store it could not read.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ServiceResult;
use crate::pool::Database;
use bazaar_core::numbering;
use bazaar_core::{CoreError, CoreResult, DocumentDirectory, DocumentKind};

#[async_trait]
impl DocumentDirectory for Database {
    async fn highest_with_prefix(
        &self,
        kind: DocumentKind,
        prefix: &str,
    ) -> CoreResult<Option<String>> {
        let result = match kind {
            // Sales are timestamp-numbered; the allocator never scans them
            DocumentKind::Sale => return Ok(None),
            DocumentKind::Purchase => self.purchases().highest_number(prefix).await,
            DocumentKind::Return => self.returns().highest_number(prefix).await,
            DocumentKind::Payment => self.payments().highest_number(prefix).await,
            DocumentKind::Expense => self.expenses().highest_number(prefix).await,
        };

        result.map_err(|e| CoreError::lookup_failed(e.to_string()))
    }
}

impl Database {
    /// Allocates the next document number for `kind` as of now.
    ///
    /// Read-only; the number is persisted only when the parent document
    /// insert succeeds.
    pub async fn allocate_number(&self, kind: DocumentKind) -> ServiceResult<String> {
        let number = numbering::allocate(self, kind, Utc::now()).await?;
        Ok(number)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use bazaar_core::{PartyKind, Payment, PaymentDirection, PaymentMethod};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn payment_with_number(number: &str) -> Payment {
        Payment {
            id: Uuid::new_v4().to_string(),
            payment_number: number.to_string(),
            party: PartyKind::Customer,
            customer_id: None,
            supplier_id: None,
            worker_id: None,
            amount_cents: 5_000,
            method: PaymentMethod::Cash,
            direction: PaymentDirection::Received,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_seeds_sequence_one() {
        let db = test_db().await;
        let prefix = numbering::number_prefix(DocumentKind::Payment, Utc::now().date_naive());

        let number = db.allocate_number(DocumentKind::Payment).await.unwrap();
        assert_eq!(number, format!("{prefix}001"));
    }

    #[tokio::test]
    async fn test_allocation_follows_stored_highest() {
        let db = test_db().await;
        let prefix = numbering::number_prefix(DocumentKind::Payment, Utc::now().date_naive());

        db.payments()
            .insert(&payment_with_number(&format!("{prefix}007")))
            .await
            .unwrap();

        let number = db.allocate_number(DocumentKind::Payment).await.unwrap();
        assert_eq!(number, format!("{prefix}008"));
    }

    #[tokio::test]
    async fn test_sequential_allocations_have_no_gaps() {
        let db = test_db().await;
        let prefix = numbering::number_prefix(DocumentKind::Payment, Utc::now().date_naive());

        for expected in 1..=4u32 {
            let number = db.allocate_number(DocumentKind::Payment).await.unwrap();
            assert_eq!(number, format!("{prefix}{expected:03}"));
            db.payments()
                .insert(&payment_with_number(&number))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_unique_constraint_is_the_race_backstop() {
        let db = test_db().await;

        // Two sessions raced to the same number: the second insert fails
        // instead of silently sharing it
        db.payments()
            .insert(&payment_with_number("PAY-20240601-001"))
            .await
            .unwrap();
        let err = db
            .payments()
            .insert(&payment_with_number("PAY-20240601-001"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_sale_numbers_skip_the_directory() {
        let db = test_db().await;

        let number = db.allocate_number(DocumentKind::Sale).await.unwrap();
        assert!(number.starts_with("INV-"));
        // The rest is an epoch-millisecond timestamp
        assert!(number["INV-".len()..].parse::<i64>().is_ok());
    }
}
