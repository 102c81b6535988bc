//! Field rules for catalog rows and cart requests.
//!
//! The database repeats some of these as `CHECK` constraints; the checks here
//! run first so a bad row or request is refused before any I/O.
//!
//! ```rust
//! use tally_core::validation::{validate_item_name, validate_quantity};
//!
//! assert!(validate_item_name("Basmati Rice 5kg").is_ok());
//! assert!(validate_quantity(1_000).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_ID_LEN: usize = 64;
const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 64;
const MAX_QUERY_LEN: usize = 100;

/// Trimmed `value`, refused when blank or longer than `max` characters.
fn bounded_text<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: field.to_string() });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(value)
}

pub fn validate_catalog_id(id: &str) -> ValidationResult<()> {
    bounded_text("id", id, MAX_ID_LEN).map(drop)
}

pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    bounded_text("name", name, MAX_NAME_LEN).map(drop)
}

/// Category names drive the tab filter, so they may not collide with the
/// "All" tab.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = bounded_text("category", category, MAX_CATEGORY_LEN)?;
    if category == crate::catalog::ALL_CATEGORIES {
        return Err(ValidationError::InvalidFormat {
            field: "category".to_string(),
            reason: format!("\"{}\" is reserved for the unfiltered tab", category),
        });
    }
    Ok(())
}

/// Name search text, trimmed. Empty means no filter.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }
    Ok(query.to_string())
}

/// 1..=999. Cart operations clamp low values before asking.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    match qty {
        q if q < 1 => Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }),
        q if q > MAX_ITEM_QUANTITY => Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        }),
        _ => Ok(()),
    }
}

/// Zero is a valid price (free items); negatives and anything above
/// `MAX_PRICE_CENTS` are not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if (0..=MAX_PRICE_CENTS).contains(&cents) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        })
    }
}

/// Whether a cart holding `current_lines` lines can take one more.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines < MAX_CART_LINES {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields() {
        assert!(validate_catalog_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_catalog_id(" ").is_err());
        assert_eq!(
            validate_catalog_id(&"x".repeat(65)),
            Err(ValidationError::TooLong { field: "id".into(), max: 64 })
        );

        assert!(validate_item_name("Sunflower Oil 1L").is_ok());
        assert_eq!(validate_item_name(""), Err(ValidationError::Required { field: "name".into() }));
        // counted in characters, not bytes
        assert!(validate_item_name(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_category_cannot_shadow_all_tab() {
        assert!(validate_category("Dairy").is_ok());
        assert!(validate_category("").is_err());
        assert!(matches!(
            validate_category(" All "),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_search_query_is_trimmed() {
        assert_eq!(validate_search_query("  rice ").unwrap(), "rice");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        for ok in [1, 2, 998, 999] {
            assert!(validate_quantity(ok).is_ok(), "{ok}");
        }
        for bad in [i64::MIN, -1, 0, 1_000] {
            assert!(validate_quantity(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_price_and_cart_size() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert_eq!(
            validate_price_cents(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange {
                field: "price".into(),
                min: 0,
                max: MAX_PRICE_CENTS
            })
        );
        assert!(validate_price_cents(i64::MAX).is_err());

        assert!(validate_cart_size(99).is_ok());
        assert!(validate_cart_size(100).is_err());
    }
}
