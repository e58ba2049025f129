//! Monetary aliases and rounding helpers.

use rust_decimal::Decimal;

/// All monetary values.
pub type Money = Decimal;

/// Rates expressed as fractions (0.05 = 5%), never as percentages.
pub type Rate = Decimal;

/// Settlement periods per year used by valuation compounding.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Pay periods per year on a weekly loan schedule.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Truncate to whole currency units (toward zero).
pub fn whole(amount: Money) -> Money {
    amount.trunc()
}

/// Round to cents.
pub fn cents(amount: Money) -> Money {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn whole_truncates_toward_zero() {
        assert_eq!(whole(dec!(153.92)), dec!(153));
        assert_eq!(whole(dec!(-2.5)), dec!(-2));
    }

    #[test]
    fn cents_rounds_to_two_places() {
        assert_eq!(cents(dec!(100416.6666)), dec!(100416.67));
    }
}
