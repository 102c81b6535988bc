//! Errors raised by the pure cart and pricing layer.
//!
//! None of them is fatal. A mutation that fails leaves the cart as it was,
//! and a catalog row that fails validation is simply not constructed.
//! Storage and checkout failures live in `tally-checkout` and `tally-db`.

use thiserror::Error;

/// A cart mutation that was refused.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No line for this item id. `remove` never reports it.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Adding a new line would exceed the distinct-line limit.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Bad input: a catalog field, a price, a discount, or a search string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Parsed but unusable, such as a NaN percentage.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_errors_read_well() {
        assert_eq!(
            CoreError::ItemNotInCart("rice-5kg".into()).to_string(),
            "Item not in cart: rice-5kg"
        );
        assert_eq!(
            CoreError::CartTooLarge { max: 100 }.to_string(),
            "Cart cannot have more than 100 items"
        );
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let err: CoreError = ValidationError::OutOfRange {
            field: "quantity".into(),
            min: 1,
            max: 999,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Validation error: quantity must be between 1 and 999"
        );
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }
}
