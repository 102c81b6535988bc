//! # Command Errors
//!
//! Every till command fails with an [`ApiError`]: a stable `code` to branch
//! on, a `message` fit for the cashier, and a `retriable` flag that says
//! whether repeating the same command may work.
//!
//! | Source                       | Code                                    |
//! |------------------------------|-----------------------------------------|
//! | `ValidationError`            | `VALIDATION_ERROR`                      |
//! | `CoreError`                  | `NOT_FOUND`, `CART_ERROR`, validation   |
//! | `CheckoutError::EmptyCart`   | `EMPTY_CART`                            |
//! | `CheckoutError::Persistence` | `PERSISTENCE_ERROR`, maybe retriable    |
//! | `CheckoutError::OutcomeUnknown` | `CHECKOUT_UNCONFIRMED`, never retriable |
//! | `DbError`                    | `NOT_FOUND`, `DATABASE_ERROR`           |
//!
//! Storage detail goes to the log, never into `message`.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use tally_checkout::{CheckoutError, StoreError};
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

/// ```json
/// { "code": "PERSISTENCE_ERROR", "message": "Checkout timed out, the cart was kept", "retriable": true }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub retriable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    CartError,
    EmptyCart,
    /// The bill was not saved and the cart is unchanged.
    PersistenceError,
    /// The bill may be saved; look the number up before charging again.
    CheckoutUnconfirmed,
    /// A read against the database failed.
    DatabaseError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retriable: false,
        }
    }

    pub fn not_found(what: &str, key: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found: {}", what, key))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CartError, message)
    }

    fn retriable(mut self, retriable: bool) -> Self {
        self.retriable = retriable;
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::ItemNotInCart(id) => ApiError::not_found("Cart item", &id),
            CoreError::CartTooLarge { max } => {
                ApiError::cart(format!("The cart is full ({} different items at most)", max))
            }
        }
    }
}

fn persistence_message(err: &StoreError) -> &'static str {
    match err {
        StoreError::TimedOut { .. } => "Checkout timed out, the cart was kept",
        StoreError::Unavailable(_) => "Bill storage is unavailable, the cart was kept",
        StoreError::Duplicate { .. } => "Could not allocate a bill number, the cart was kept",
        StoreError::Rejected { .. } | StoreError::Internal(_) => "The bill could not be saved, the cart was kept",
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let retriable = err.is_retriable();
        match err {
            CheckoutError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, "Cart is empty"),
            CheckoutError::Persistence(cause) => {
                error!(error = %cause, retriable, "Checkout failed");
                ApiError::new(ErrorCode::PersistenceError, persistence_message(&cause)).retriable(retriable)
            }
            CheckoutError::OutcomeUnknown { bill_number, after } => {
                error!(bill_number = %bill_number, ?after, "Checkout outcome unknown");
                ApiError::new(
                    ErrorCode::CheckoutUnconfirmed,
                    format!(
                        "Bill {} may have been saved. Look it up before checking out again",
                        bill_number
                    ),
                )
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Unavailable(detail) => {
                warn!(%detail, "Database unavailable");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy or unreachable").retriable(true)
            }
            other => {
                error!(error = %other, "Database read failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}
