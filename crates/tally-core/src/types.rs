//! # Domain Types
//!
//! What the catalog supplies and what a checkout leaves behind.
//!
//! ```text
//!   catalog                 checkout writes, in one unit of work
//!   ───────                 ─────────────────────────────────────
//!   CatalogItem ──► Cart ──►  Bill (id, bill_number, totals)
//!   DiscountRate               ├── BillItem × n   (bill_id = Bill.id)
//!                              └── LegacyTransaction × n   (no link)
//! ```
//!
//! A bill carries two keys. `id` is assigned by the record store and is what
//! bill items point at; `bill_number` is the text printed on the receipt.
//! Rows written for a bill freeze the name and prices at the moment of sale,
//! so editing the catalog later never changes an old receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_catalog_id, validate_category, validate_item_name, validate_price_cents, ValidationResult,
};

fn discount_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "discount_percentage".to_string(),
        min: 0,
        max: 100,
    }
}

/// A discount in basis points: `2000` is 20%, `1250` is 12.5%.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    pub const MAX_BPS: u32 = 10_000;

    /// Unchecked. Values above [`Self::MAX_BPS`] are refused later by
    /// [`crate::pricing::try_compute`] and [`CatalogItem::validate`].
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    pub fn try_from_bps(bps: u32) -> ValidationResult<Self> {
        (bps <= Self::MAX_BPS)
            .then_some(DiscountRate(bps))
            .ok_or_else(discount_out_of_range)
    }

    /// From a percentage in `0.0..=100.0`, rounded to the nearest basis
    /// point.
    ///
    /// ```rust
    /// use tally_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::try_from_percentage(12.5).unwrap().bps(), 1250);
    /// assert!(DiscountRate::try_from_percentage(f64::NAN).is_err());
    /// assert!(DiscountRate::try_from_percentage(100.5).is_err());
    /// ```
    pub fn try_from_percentage(pct: f64) -> ValidationResult<Self> {
        if pct.is_nan() || pct.is_infinite() {
            return Err(ValidationError::InvalidFormat {
                field: "discount_percentage".to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        if !(0.0..=100.0).contains(&pct) {
            return Err(discount_out_of_range());
        }
        Self::try_from_bps((pct * 100.0).round() as u32)
    }

    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// For display; arithmetic stays in basis points.
    pub fn percentage(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    pub const fn full() -> Self {
        DiscountRate(Self::MAX_BPS)
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// A product as the catalog supplies it. Carts copy what they need at add
/// time and never hold on to the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Before discount, in minor units.
    pub base_price_cents: i64,
    pub discount_bps: u32,
}

impl CatalogItem {
    /// ```rust
    /// use tally_core::CatalogItem;
    ///
    /// let rice = CatalogItem::new("rice-5kg", "Basmati Rice 5kg", "Grains", 10_000, 20.0).unwrap();
    /// assert_eq!(rice.discount_bps, 2_000);
    /// assert!(CatalogItem::new("oil", "Oil", "Grains", -1, 0.0).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        base_price_cents: i64,
        discount_percentage: f64,
    ) -> ValidationResult<Self> {
        let item = CatalogItem {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            base_price_cents,
            discount_bps: DiscountRate::try_from_percentage(discount_percentage)?.bps(),
        };
        item.validate().map(|()| item)
    }

    /// Re-checks a row built field by field, such as one read from storage.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_catalog_id(&self.id)?;
        validate_item_name(&self.name)?;
        validate_category(&self.category)?;
        validate_price_cents(self.base_price_cents)?;
        DiscountRate::try_from_bps(self.discount_bps).map(drop)
    }

    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }

    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    /// Drives the "% OFF" badge.
    pub fn has_discount(&self) -> bool {
        !self.discount_rate().is_zero()
    }
}

/// Receipt number, e.g. `BILL-20260101120000-3fa9c2d1`. Serialized as a
/// plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct BillNumber(String);

impl BillNumber {
    pub fn new(value: impl Into<String>) -> Self {
        BillNumber(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BillNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Header row of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bill {
    pub id: String,
    pub bill_number: BillNumber,
    /// What the customer paid: the sum of line subtotals.
    pub total_amount_cents: i64,
    pub total_discount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    pub fn total_discount(&self) -> Money {
        Money::from_cents(self.total_discount_cents)
    }
}

/// One sold line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillItem {
    pub id: String,
    /// `Bill::id`, never the bill number.
    pub bill_id: String,
    /// Catalog id at the time of sale. Informational, not a foreign key.
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    /// Per unit, after discount.
    pub effective_price_cents: i64,
    /// Whole line.
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl BillItem {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn discount_applied(&self) -> Money {
        Money::from_cents(self.discount_applied_cents)
    }
}

/// The older reporting table's copy of a bill item. It has no bill
/// reference, only what was sold and for how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LegacyTransaction {
    pub id: String,
    pub item_name: String,
    pub quantity: i64,
    pub effective_price_cents: i64,
    pub discount_applied_cents: i64,
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_become_basis_points() {
        let cases = [(0.0, 0), (12.5, 1_250), (20.0, 2_000), (33.333, 3_333), (100.0, 10_000)];
        for (pct, bps) in cases {
            assert_eq!(DiscountRate::try_from_percentage(pct).unwrap().bps(), bps, "{pct}");
        }
        assert_eq!(DiscountRate::from_bps(2_000).percentage(), 20.0);
    }

    #[test]
    fn test_rates_outside_zero_to_hundred_are_refused() {
        for pct in [-0.01, 100.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(DiscountRate::try_from_percentage(pct).is_err(), "{pct}");
        }
        assert!(DiscountRate::try_from_bps(10_000).is_ok());
        assert!(DiscountRate::try_from_bps(10_001).is_err());
    }

    #[test]
    fn test_catalog_item_rules() {
        let milk = CatalogItem::new("milk-1l", "Toned Milk 1L", "Dairy", 5_400, 0.0).unwrap();
        assert_eq!(milk.base_price(), Money::from_cents(5_400));
        assert!(!milk.has_discount());

        assert!(CatalogItem::new("", "No id", "Dairy", 100, 0.0).is_err());
        assert!(CatalogItem::new("x", "   ", "Dairy", 100, 0.0).is_err());
        assert!(CatalogItem::new("x", "No tab", "All", 100, 0.0).is_err());
        assert!(CatalogItem::new("x", "Negative", "Dairy", -5, 0.0).is_err());
        assert!(CatalogItem::new("x", "Too generous", "Dairy", 100, 120.0).is_err());
    }

    #[test]
    fn test_validate_catches_raw_basis_points() {
        let oil = CatalogItem {
            id: "oil".to_string(),
            name: "Sunflower Oil".to_string(),
            category: "Oils".to_string(),
            base_price_cents: 15_000,
            discount_bps: 12_000,
        };
        assert!(oil.validate().is_err());
    }

    #[test]
    fn test_bill_number_serializes_as_plain_string() {
        let number = BillNumber::new("BILL-20260101120000-abcdef12");
        assert_eq!(
            serde_json::to_string(&number).unwrap(),
            "\"BILL-20260101120000-abcdef12\""
        );
        assert_eq!(number.to_string(), number.as_str());
    }
}
