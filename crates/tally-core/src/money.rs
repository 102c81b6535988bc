//! Amounts in minor currency units.
//!
//! Every price, discount and total in the engine is a [`Money`]: a signed
//! count of paise (or cents). Percentages are applied once, per unit, with
//! integer half-up rounding, and everything downstream is exact addition and
//! multiplication. That is what keeps
//! `effective_unit_price + discount_per_unit == base_price` true for every
//! line and `subtotal + discount == base_price × quantity` true for the cart.
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::types::DiscountRate;
//!
//! let ghee = Money::from_cents(36_500);
//! let off = ghee.discount_at(DiscountRate::from_bps(1_250)); // 45.625 → 45.63
//! assert_eq!(off.cents(), 4_563);
//! assert_eq!((ghee - off).times(2).to_string(), "638.74");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountRate;

/// Signed minor units. No currency tag: the till is single-currency and the
/// symbol is a display setting.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The part of this amount a discount rate takes off, rounded half up
    /// to the nearest minor unit.
    pub fn discount_at(&self, rate: DiscountRate) -> Money {
        let scaled = i128::from(self.0) * i128::from(rate.bps());
        Money(((scaled + 5_000) / 10_000) as i64)
    }

    /// This amount repeated `quantity` times.
    #[inline]
    pub const fn times(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }
}

/// `major.minor`, two digits, no symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, quantity: i64) -> Money {
        self.times(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
