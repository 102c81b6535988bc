//! # Pricing Calculator
//!
//! Turns a base price and a discount rate into per-unit pricing.
//!
//! ## The Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_price = 100.00, rate = 20%                                       │
//! │                                                                         │
//! │  discount_per_unit    = round_half_up(10000 × 2000 / 10000) = 2000      │
//! │  effective_unit_price = 10000 − 2000                         = 8000      │
//! │                                                                         │
//! │  effective_unit_price + discount_per_unit == base_price   (always)     │
//! │                                                                         │
//! │  × quantity 2:  subtotal 16000 + discount 4000 == 20000 == base × 2    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the discount is rounded; the effective price is derived by
//! subtraction, so the identity holds exactly for every quantity.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::DiscountRate;
use crate::validation::{validate_price_cents, ValidationResult};

/// Per-unit pricing for one catalog item at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitPricing {
    pub effective_unit_price: Money,
    pub discount_per_unit: Money,
}

impl UnitPricing {
    /// Reconstructs the base price.
    #[inline]
    pub fn base_price(&self) -> Money {
        self.effective_unit_price + self.discount_per_unit
    }

    /// Line subtotal (after discount) for `qty` units.
    #[inline]
    pub fn subtotal(&self, qty: i64) -> Money {
        self.effective_unit_price.times(qty)
    }

    /// Line discount for `qty` units.
    #[inline]
    pub fn discount(&self, qty: i64) -> Money {
        self.discount_per_unit.times(qty)
    }
}

/// Prices one unit.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::pricing::compute;
/// use tally_core::types::DiscountRate;
///
/// let unit = compute(Money::from_cents(10000), DiscountRate::from_bps(2000));
/// assert_eq!(unit.effective_unit_price.cents(), 8000);
/// assert_eq!(unit.discount_per_unit.cents(), 2000);
/// ```
pub fn compute(base_price: Money, rate: DiscountRate) -> UnitPricing {
    let discount_per_unit = base_price.discount_at(rate);
    UnitPricing {
        effective_unit_price: base_price - discount_per_unit,
        discount_per_unit,
    }
}

/// Validating entry point for raw input.
///
/// Rejects negative prices and rates above 100%.
pub fn try_compute(base_price_cents: i64, rate: DiscountRate) -> ValidationResult<UnitPricing> {
    validate_price_cents(base_price_cents)?;
    let rate = DiscountRate::try_from_bps(rate.bps())?;
    Ok(compute(Money::from_cents(base_price_cents), rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_twenty_percent_off_hundred() {
        let unit = compute(Money::from_cents(10000), DiscountRate::from_bps(2000));
        assert_eq!(unit.effective_unit_price, Money::from_cents(8000));
        assert_eq!(unit.discount_per_unit, Money::from_cents(2000));
        assert_eq!(unit.subtotal(2), Money::from_cents(16000));
        assert_eq!(unit.discount(2), Money::from_cents(4000));
    }

    #[test]
    fn test_edges() {
        let free = compute(Money::zero(), DiscountRate::from_bps(5000));
        assert!(free.effective_unit_price.is_zero());
        assert!(free.discount_per_unit.is_zero());

        let all_off = compute(Money::from_cents(4999), DiscountRate::full());
        assert!(all_off.effective_unit_price.is_zero());
        assert_eq!(all_off.discount_per_unit, Money::from_cents(4999));

        let none_off = compute(Money::from_cents(4999), DiscountRate::zero());
        assert_eq!(none_off.effective_unit_price, Money::from_cents(4999));
    }

    #[test]
    fn test_rounding_splits_odd_cents() {
        // 0.99 at 33.33% = 0.329967 → discount 0.33, effective 0.66
        let unit = compute(Money::from_cents(99), DiscountRate::from_bps(3333));
        assert_eq!(unit.discount_per_unit.cents(), 33);
        assert_eq!(unit.effective_unit_price.cents(), 66);
    }

    #[test]
    fn test_try_compute_rejects_bad_input() {
        assert!(try_compute(-1, DiscountRate::zero()).is_err());
        assert!(try_compute(100, DiscountRate::from_bps(10_001)).is_err());
        assert!(try_compute(100, DiscountRate::from_bps(10_000)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_effective_plus_discount_is_base(base in 0i64..=100_000_000, bps in 0u32..=10_000) {
            let unit = compute(Money::from_cents(base), DiscountRate::from_bps(bps));
            prop_assert_eq!(unit.base_price().cents(), base);
            prop_assert!(unit.discount_per_unit.cents() >= 0);
            prop_assert!(unit.effective_unit_price.cents() >= 0);
        }

        #[test]
        fn prop_discount_within_half_unit_of_exact(base in 0i64..=10_000_000, bps in 0u32..=10_000) {
            let unit = compute(Money::from_cents(base), DiscountRate::from_bps(bps));
            // |discount × 10000 − base × bps| ≤ 5000
            let exact = base as i128 * bps as i128;
            let ours = unit.discount_per_unit.cents() as i128 * 10_000;
            prop_assert!((ours - exact).abs() <= 5_000);
        }

        #[test]
        fn prop_identity_scales_with_quantity(base in 0i64..=1_000_000, bps in 0u32..=10_000, qty in 1i64..=999) {
            let unit = compute(Money::from_cents(base), DiscountRate::from_bps(bps));
            prop_assert_eq!((unit.subtotal(qty) + unit.discount(qty)).cents(), base * qty);
        }
    }
}
