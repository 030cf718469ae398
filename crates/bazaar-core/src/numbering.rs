//! # Document Numbering
//!
//! Human-readable, date-scoped document numbers for every transaction kind.
//!
//! ## Number Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind       Format                 Example                              │
//! │  ────       ──────                 ───────                              │
//! │  Purchase   PUR-YYYYMMDD-NNN       PUR-20240601-003                     │
//! │  Return     RET-YYYYMMDD-NNN       RET-20240601-012                     │
//! │  Payment    PAY-YYYYMMDD-NNN       PAY-20240601-008                     │
//! │  Expense    EXP-YYYYMM-NNNN        EXP-202406-0042                      │
//! │  Sale       INV-<epoch millis>     INV-1717243800123                    │
//! │                                                                         │
//! │  Sequential kinds: the allocator reads the highest stored number for   │
//! │  the period prefix and increments it. Seed is 1 on an empty period.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales invoices deliberately use a millisecond timestamp instead of the
//! per-day counter: an invoice is minted without a store round-trip and two
//! terminals cannot race to the same number. The cost is readability. The
//! two schemes coexist on purpose; do not unify them.
//!
//! ## Concurrency
//! The increment is NOT coordinated across sessions. Two sessions that
//! allocate the same kind on the same day can both read sequence N and both
//! produce N+1; the UNIQUE constraint on the number column is the backstop
//! that fails the second insert. Allocation itself is read-only - a number
//! only becomes durable when the parent document insert succeeds.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Document Kind
// =============================================================================

/// The five document kinds that receive numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Sale,
    Purchase,
    Return,
    Expense,
    Payment,
}

impl DocumentKind {
    /// The number prefix identifying this document kind.
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Sale => "INV",
            DocumentKind::Purchase => "PUR",
            DocumentKind::Return => "RET",
            DocumentKind::Expense => "EXP",
            DocumentKind::Payment => "PAY",
        }
    }

    /// Zero-padded width of the sequence segment.
    ///
    /// Expenses run a monthly counter and get an extra digit.
    pub const fn sequence_width(&self) -> usize {
        match self {
            DocumentKind::Expense => 4,
            _ => 3,
        }
    }

    /// Whether this kind uses the date+sequence scheme.
    ///
    /// Sales are the exception: `INV-<epoch millis>`.
    pub const fn is_sequential(&self) -> bool {
        !matches!(self, DocumentKind::Sale)
    }

    /// The date portion embedded in the number.
    ///
    /// Expenses embed year+month only; the other sequential kinds embed the
    /// full day.
    pub fn period_part(&self, date: NaiveDate) -> String {
        match self {
            DocumentKind::Expense => date.format("%Y%m").to_string(),
            _ => date.format("%Y%m%d").to_string(),
        }
    }
}

// =============================================================================
// Pure Formatting / Parsing
// =============================================================================

/// Everything before the sequence segment, e.g. `PAY-20240601-`.
///
/// This is both the formatting prefix and the match prefix the store scan
/// uses (`highest_with_prefix`).
pub fn number_prefix(kind: DocumentKind, date: NaiveDate) -> String {
    format!("{}-{}-", kind.prefix(), kind.period_part(date))
}

/// The timestamp-based sales invoice number.
pub fn timestamp_number(at: DateTime<Utc>) -> String {
    format!("INV-{}", at.timestamp_millis())
}

/// Extracts the trailing numeric sequence segment of a stored number.
///
/// `PAY-20240601-007` → `Some(7)`. Returns `None` when the segment after
/// the last `-` is not a number.
pub fn parse_sequence(number: &str) -> Option<u32> {
    number.rsplit('-').next()?.parse().ok()
}

/// Computes the next number in a period given the highest stored number.
///
/// ## Arguments
/// * `kind` - a sequential document kind (not `Sale`)
/// * `date` - the reference date whose period the number belongs to
/// * `highest` - the highest stored number for `number_prefix(kind, date)`,
///   or `None` when the period has no documents yet
///
/// ## Errors
/// `MalformedDocumentNumber` when `highest` does not end in a numeric
/// segment. Reseeding at 1 next to an unparsable record would risk a
/// collision, so the caller must abort instead.
pub fn next_number(
    kind: DocumentKind,
    date: NaiveDate,
    highest: Option<&str>,
) -> CoreResult<String> {
    debug_assert!(kind.is_sequential(), "sales use timestamp_number");

    let sequence = match highest {
        None => 1,
        Some(number) => {
            let last = parse_sequence(number).ok_or_else(|| CoreError::MalformedDocumentNumber {
                number: number.to_string(),
            })?;
            last + 1
        }
    };

    Ok(format!(
        "{}{:0width$}",
        number_prefix(kind, date),
        sequence,
        width = kind.sequence_width()
    ))
}

// =============================================================================
// Directory Capability
// =============================================================================

/// Read access to the stored document numbers of one kind.
///
/// Implemented by the persistence layer over the real store and by
/// in-memory fakes in tests. Lookup failures must map to
/// `CoreError::LookupFailed` - the allocator treats any error as fatal for
/// the current allocation.
#[async_trait]
pub trait DocumentDirectory {
    /// The single highest stored number starting with `prefix`, if any.
    async fn highest_with_prefix(
        &self,
        kind: DocumentKind,
        prefix: &str,
    ) -> CoreResult<Option<String>>;
}

/// Allocates the next document number for a kind.
///
/// ## Algorithm
/// 1. `Sale` short-circuits to `INV-<millis>` (no lookup)
/// 2. Build the period prefix from `reference`
/// 3. Ask the directory for the highest stored number under that prefix
/// 4. Seed 1 on empty, otherwise parse-and-increment
///
/// Read-only: nothing is persisted here. The number becomes durable only
/// when the parent document insert succeeds, and a lost race surfaces as a
/// unique-constraint violation on that insert.
///
/// ## Errors
/// * `LookupFailed` - the directory query failed; never fall back to 1
/// * `MalformedDocumentNumber` - a stored number could not be parsed
pub async fn allocate<D>(
    directory: &D,
    kind: DocumentKind,
    reference: DateTime<Utc>,
) -> CoreResult<String>
where
    D: DocumentDirectory + Sync + ?Sized,
{
    if !kind.is_sequential() {
        return Ok(timestamp_number(reference));
    }

    let date = reference.date_naive();
    let prefix = number_prefix(kind, date);
    let highest = directory.highest_with_prefix(kind, &prefix).await?;

    next_number(kind, date, highest.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================
