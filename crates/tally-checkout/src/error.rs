//! # Checkout Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  CheckoutError                                                         │
//! │  ├── EmptyCart                 nothing to bill, store never touched    │
//! │  ├── OutcomeUnknown            commit sent, never acknowledged         │
//! │  └── Persistence(StoreError)   unit of work rolled back                │
//! │       ├── Unavailable          retriable                               │
//! │       ├── Duplicate            retriable (fresh bill number)           │
//! │       ├── Rejected             not retriable                           │
//! │       ├── TimedOut             retriable                               │
//! │       └── Internal             not retriable                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Persistence` error always means nothing was written: the cart is
//! intact and the cashier can try again. `OutcomeUnknown` means the bill
//! may already be saved under the reported number, so it is never retried
//! blindly; the bill number has to be looked up first.

use std::time::Duration;
use tally_core::BillNumber;
use thiserror::Error;

use crate::store::Table;

/// Result type alias for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for checkout.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a [`crate::RecordStore`] or its units of work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store cannot be reached or refused a connection.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness rule was violated.
    ///
    /// ## When This Occurs
    /// - Two tills generated the same bill number in the same instant
    #[error("Duplicate {field} in {table}")]
    Duplicate { table: Table, field: String },

    /// The store refused a specific write (constraint, bad reference).
    #[error("Write to {table} rejected: {reason}")]
    Rejected { table: Table, reason: String },

    /// Staging the checkout did not finish within its time budget.
    #[error("Record store timed out after {after:?}")]
    TimedOut { after: Duration },

    /// Anything else.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether trying the same checkout again could succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Duplicate { .. } | StoreError::TimedOut { .. }
        )
    }

    /// A duplicate bill number, the one collision the committer recovers
    /// from by itself.
    pub fn is_bill_number_collision(&self) -> bool {
        matches!(
            self,
            StoreError::Duplicate { table: Table::Bills, field } if field == "bill_number"
        )
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// What a checkout attempt reports to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The snapshot had no lines.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// The unit of work failed and was rolled back.
    #[error("Checkout failed: {0}")]
    Persistence(#[from] StoreError),

    /// `commit()` was sent but did not answer within its bound. The store
    /// may or may not hold `bill_number`.
    #[error("Checkout of {bill_number} not confirmed after {after:?}")]
    OutcomeUnknown { bill_number: BillNumber, after: Duration },
}

impl CheckoutError {
    pub fn is_retriable(&self) -> bool {
        match self {
            CheckoutError::EmptyCart | CheckoutError::OutcomeUnknown { .. } => false,
            CheckoutError::Persistence(err) => err.is_retriable(),
        }
    }
}
