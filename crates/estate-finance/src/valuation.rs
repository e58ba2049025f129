//! Property valuation model: rent, operating expenses, appreciation and the
//! NOI-derived return metrics shown on a listing.
//!
//! A settlement period is valued as one month: appreciation compounds at
//! `annual_rate / 12` per period and per-period figures annualize by 12.

use crate::loan::amortized_payment;
use estate_core::{cents, whole, EstateError, LendingTerms, Money, Rate, MONTHS_PER_YEAR};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One period of appreciation at full precision. Fails when the value no
/// longer fits a `Decimal`.
pub fn appreciate(value: Money, annual_rate: Rate) -> Result<Money, EstateError> {
    value
        .checked_mul(Decimal::ONE + annual_rate / Decimal::from(MONTHS_PER_YEAR))
        .ok_or(EstateError::Overflow("appraised_value"))
}

/// Rent collected per period after vacancy.
pub fn rent(appraised_value: Money, rent_multiplier: Rate, vacancy_rate: Rate) -> Money {
    appraised_value * rent_multiplier * (Decimal::ONE - vacancy_rate)
}

pub fn operating_expenses(rent: Money, operating_expenses_rate: Rate) -> Money {
    rent * operating_expenses_rate
}

/// Net operating income: rent less operating expenses, before debt service.
pub fn net_operating_income(rent: Money, operating_expenses: Money) -> Money {
    rent - operating_expenses
}

/// Scale a per-period figure to a year.
pub fn annualize(per_period: Money) -> Money {
    per_period * Decimal::from(MONTHS_PER_YEAR)
}

/// Annualized NOI over list price, as a percentage. `None` for a non-positive price.
pub fn cap_rate(noi_per_period: Money, list_price: Money) -> Option<Decimal> {
    if list_price <= Decimal::ZERO {
        return None;
    }
    Some(annualize(noi_per_period) / list_price * dec!(100))
}

/// Annualized cash flow after debt service over cash invested, as a percentage.
pub fn cash_on_cash_roi(cash_flow_per_period: Money, cash_invested: Money) -> Option<Decimal> {
    if cash_invested <= Decimal::ZERO {
        return None;
    }
    Some(annualize(cash_flow_per_period) / cash_invested * dec!(100))
}

/// Debt service per settlement period for `amount` borrowed under `terms`.
///
/// Weekly schedules are converted to their per-month equivalent.
pub fn estimated_loan_payment(amount: Money, terms: &LendingTerms) -> Money {
    let ppy = terms.schedule.periods_per_year();
    let periodic_rate = terms.annual_rate / Decimal::from(ppy);
    let payment = whole(amortized_payment(
        amount,
        periodic_rate,
        terms.term_years.saturating_mul(ppy),
    ));
    cents(payment * Decimal::from(ppy) / Decimal::from(MONTHS_PER_YEAR))
}

/// Listing figures an estimate is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimateInput {
    pub appraised_value: Money,
    pub list_price: Money,
    pub minimum_down_payment: Money,
    pub rent_multiplier: Rate,
    pub vacancy_rate: Rate,
    pub operating_expenses_rate: Rate,
}

/// Pro-forma returns for buying a listing at its list price with the minimum
/// down payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub period_income: Money,
    pub period_operating_cost: Money,
    pub period_loan_payment: Money,
    pub net_operating_income: Money,
    /// NOI less debt service.
    pub cash_flow: Money,
    /// Percent; `None` when the list price is not positive.
    pub cap_rate: Option<Decimal>,
    /// Percent; `None` when no cash is invested.
    pub cash_on_cash_roi: Option<Decimal>,
}

pub fn estimate(input: &EstimateInput, terms: &LendingTerms) -> ValuationReport {
    let income = cents(rent(
        input.appraised_value,
        input.rent_multiplier,
        input.vacancy_rate,
    ));
    let opex = cents(operating_expenses(income, input.operating_expenses_rate));
    let financed = (input.list_price - input.minimum_down_payment).max(Decimal::ZERO);
    let debt_service = estimated_loan_payment(financed, terms);
    let noi = net_operating_income(income, opex);
    let cash_flow = noi - debt_service;
    ValuationReport {
        period_income: income,
        period_operating_cost: opex,
        period_loan_payment: debt_service,
        net_operating_income: noi,
        cash_flow,
        cap_rate: cap_rate(noi, input.list_price).map(|r| r.round_dp(2)),
        cash_on_cash_roi: cash_on_cash_roi(cash_flow, input.minimum_down_payment)
            .map(|r| r.round_dp(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::PaymentSchedule;
    use proptest::prelude::*;

    #[test]
    fn appreciation_compounds_monthly() {
        assert_eq!(appreciate(dec!(120000), dec!(0.06)).unwrap(), dec!(120600));
        let v = appreciate(dec!(100000), dec!(0.05)).unwrap();
        assert_eq!(cents(v), dec!(100416.67));
        assert!(v > dec!(100416.666) && v < dec!(100416.667));
    }

    #[test]
    fn appreciation_keeps_sub_cent_precision() {
        let mut v = dec!(100000);
        for _ in 0..12 {
            v = appreciate(v, dec!(0.05)).unwrap();
        }
        // (1 + 0.05/12)^12 = 1.0511618978817...
        assert_eq!(cents(v), dec!(105116.19));
    }

    #[test]
    fn appreciation_overflow_is_an_error() {
        let mut v = dec!(340000000);
        let err = loop {
            match appreciate(v, dec!(0.05)) {
                Ok(next) => v = next,
                Err(e) => break e,
            }
        };
        assert_eq!(err, EstateError::Overflow("appraised_value"));
        assert!(v > Decimal::MAX / dec!(100));
    }

    #[test]
    fn rent_applies_vacancy() {
        assert_eq!(rent(dec!(100000), dec!(0.01), dec!(0.08)), dec!(920));
        assert_eq!(operating_expenses(dec!(920), dec!(0.5)), dec!(460));
        assert_eq!(net_operating_income(dec!(920), dec!(460)), dec!(460));
    }

    #[test]
    fn cap_rate_annualizes_noi() {
        assert_eq!(cap_rate(dec!(500), dec!(100000)), Some(dec!(6)));
        assert_eq!(cap_rate(dec!(500), Decimal::ZERO), None);
        assert_eq!(cash_on_cash_roi(dec!(100), dec!(20000)), Some(dec!(6)));
        assert_eq!(cash_on_cash_roi(dec!(100), Decimal::ZERO), None);
    }

    #[test]
    fn weekly_terms_convert_to_monthly_equivalent() {
        let monthly = LendingTerms {
            annual_rate: dec!(0.05),
            term_years: 30,
            schedule: PaymentSchedule::Monthly,
        };
        assert_eq!(estimated_loan_payment(dec!(98000), &monthly), dec!(526));
        let weekly = LendingTerms {
            schedule: PaymentSchedule::Weekly,
            ..monthly
        };
        let w = estimated_loan_payment(dec!(98000), &weekly);
        assert!(w > dec!(500) && w < dec!(540), "weekly equivalent {w}");
    }

    #[test]
    fn estimate_for_typical_listing() {
        let input = EstimateInput {
            appraised_value: dec!(100000),
            list_price: dec!(100000),
            minimum_down_payment: dec!(20000),
            rent_multiplier: dec!(0.01),
            vacancy_rate: dec!(0.08),
            operating_expenses_rate: dec!(0.5),
        };
        let r = estimate(&input, &LendingTerms::default());
        assert_eq!(r.period_income, dec!(920));
        assert_eq!(r.period_operating_cost, dec!(460));
        assert_eq!(r.period_loan_payment, dec!(429));
        assert_eq!(r.net_operating_income, dec!(460));
        assert_eq!(r.cash_flow, dec!(31));
        assert_eq!(r.cap_rate, Some(dec!(5.52)));
        assert_eq!(r.cash_on_cash_roi, Some(dec!(1.86)));
    }

    proptest! {
        #[test]
        fn repeated_appreciation_is_reproducible(start in 10_000i64..2_000_000, periods in 1usize..120) {
            let run = || {
                let mut v = Decimal::from(start);
                let mut last_rent = Decimal::ZERO;
                for _ in 0..periods {
                    v = appreciate(v, dec!(0.05)).unwrap();
                    last_rent = rent(v, dec!(0.01), dec!(0.08));
                }
                (v, last_rent)
            };
            let (a, ra) = run();
            let (b, rb) = run();
            prop_assert_eq!(a, b);
            prop_assert_eq!(ra, rb);
            prop_assert!(a > Decimal::from(start));
        }
    }
}
