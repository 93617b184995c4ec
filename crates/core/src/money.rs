//! Exact monetary amounts.
//!
//! All balances and amounts in the ledger are base-10 fixed-point with two
//! fractional digits. Binary floating point never enters the core: an `f64`
//! can only become a [`Money`] if it is exactly representable at two decimal
//! places, otherwise construction fails instead of silently truncating value.

use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Fixed scale for every stored amount (cents).
const SCALE: u32 = 2;

/// An exact monetary amount, scale fixed at two fractional digits.
///
/// Negative values are representable: validation in the engine, not the type,
/// keeps committed balances non-negative. Addition and subtraction are exact;
/// this core performs no multiplication or division, so no rounding policy is
/// ever exercised on derived values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Build from a decimal, rejecting any value with precision beyond two
    /// fractional digits.
    pub fn try_from_decimal(value: Decimal) -> LedgerResult<Self> {
        if value.round_dp(SCALE) != value {
            return Err(LedgerError::invalid_amount(format!(
                "{value} has sub-cent precision"
            )));
        }
        let mut exact = value;
        exact.rescale(SCALE);
        Ok(Self(exact))
    }

    /// Build from an integer count of minor units (cents).
    pub fn from_minor_units(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    /// Build from binary floating point.
    ///
    /// Fails unless the value converts to a decimal exactly representable at
    /// two fractional digits. Callers holding currency in `f64` should fix
    /// their types instead; this exists for boundary code that cannot.
    pub fn try_from_f64(value: f64) -> LedgerResult<Self> {
        let decimal = Decimal::from_f64(value).ok_or_else(|| {
            LedgerError::invalid_amount(format!("{value} is not a finite decimal"))
        })?;
        Self::try_from_decimal(decimal)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
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

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Stored scale is always 2, so Decimal's own formatting is "12.34".
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s)
            .map_err(|e| LedgerError::invalid_amount(format!("{s:?}: {e}")))?;
        Self::try_from_decimal(decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn arithmetic_is_exact() {
        let a: Money = "0.10".parse().unwrap();
        let b: Money = "0.20".parse().unwrap();
        assert_eq!(a + b, "0.30".parse().unwrap());
        assert_eq!(b - a, a);
    }

    #[test]
    fn whole_numbers_rescale_to_cents() {
        let m: Money = "5".parse().unwrap();
        assert_eq!(m.to_string(), "5.00");
        assert_eq!(m, Money::from_minor_units(500));
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        let err = Money::try_from_decimal(dec!(1.005)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert!("0.001".parse::<Money>().is_err());
    }

    #[test]
    fn imprecise_floats_are_rejected() {
        assert!(Money::try_from_f64(0.001).is_err());
        assert!(Money::try_from_f64(f64::NAN).is_err());
        assert_eq!(Money::try_from_f64(12.5).unwrap(), Money::from_minor_units(1250));
    }

    #[test]
    fn negative_results_are_representable() {
        let small: Money = "1.00".parse().unwrap();
        let big: Money = "2.50".parse().unwrap();
        let diff = small - big;
        assert!(diff.is_negative());
        assert_eq!(diff.to_string(), "-1.50");
    }

    #[test]
    fn comparison_ignores_textual_scale() {
        assert_eq!("1.5".parse::<Money>().unwrap(), "1.50".parse::<Money>().unwrap());
        assert!("2.00".parse::<Money>().unwrap() > "1.99".parse::<Money>().unwrap());
    }
}
