//! Conversion of decimal order totals to the gateway's minor units.
//!
//! The gateway takes `Amount` as an integer count of the currency's minor
//! unit. Totals are multiplied by 100 and truncated toward zero, so
//! `12.345` becomes `1234`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::GatewayError;

const MINOR_UNITS: Decimal = Decimal::ONE_HUNDRED;

/// Converts a decimal total to minor units.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] if the total is not positive or
/// does not fit in an `i64` once scaled.
pub fn to_minor_units(total: Decimal) -> Result<i64, GatewayError> {
    if total <= Decimal::ZERO {
        return Err(GatewayError::invalid("Amount", "Amount must be a positive number"));
    }
    let scaled = total
        .checked_mul(MINOR_UNITS)
        .ok_or(GatewayError::invalid("Amount", "Amount is too large"))?
        .trunc();
    let minor = scaled
        .to_i64()
        .ok_or(GatewayError::invalid("Amount", "Amount is too large"))?;
    if minor == 0 {
        return Err(GatewayError::invalid("Amount", "Amount must be a positive number"));
    }
    Ok(minor)
}

/// Parses a decimal string such as `"12.34"` and converts it to minor units.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] for text that is not a decimal
/// number, and the errors of [`to_minor_units`].
pub fn parse_minor_units(total: &str) -> Result<i64, GatewayError> {
    let total: Decimal = total
        .trim()
        .parse()
        .map_err(|_| GatewayError::invalid("Amount", "Amount is not a decimal number"))?;
    to_minor_units(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scales_by_one_hundred() {
        assert_eq!(to_minor_units(dec!(12.34)).unwrap(), 1234);
        assert_eq!(to_minor_units(dec!(10)).unwrap(), 1000);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
    }

    #[test]
    fn test_truncates_sub_minor_digits() {
        assert_eq!(to_minor_units(dec!(12.345)).unwrap(), 1234);
        assert_eq!(to_minor_units(dec!(12.349)).unwrap(), 1234);
    }

    #[test]
    fn test_rejects_non_positive_totals() {
        assert!(to_minor_units(dec!(0)).is_err());
        assert!(to_minor_units(dec!(-1.00)).is_err());
        assert!(to_minor_units(dec!(0.001)).is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(to_minor_units(Decimal::MAX).is_err());
    }

    #[test]
    fn test_parse_minor_units() {
        assert_eq!(parse_minor_units(" 99.90 ").unwrap(), 9990);
        assert!(matches!(
            parse_minor_units("12,34"),
            Err(GatewayError::InvalidInput { field: "Amount", .. })
        ));
    }
}
