//! Fixed-rate, fixed-term amortizing loan.
//!
//! Payments are re-derived every period from the current balance over the
//! full term set at issuance, so the payment shrinks as the balance falls.
//! Payment and interest amounts are truncated to whole currency units.

use estate_core::{whole, LendingTerms, Money, PaymentSchedule, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `base^exp` by squaring. `None` on overflow.
fn checked_pow(base: Decimal, mut exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut acc = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(acc)?;
        }
        exp >>= 1;
        if exp > 0 {
            acc = acc.checked_mul(acc)?;
        }
    }
    Some(result)
}

/// Level payment retiring `balance` over `periods` at `periodic_rate`:
/// `balance * i / (1 - (1+i)^-n)`, unrounded.
///
/// Zero rate falls back to straight-line; zero periods means the whole
/// balance is due now.
pub fn amortized_payment(balance: Money, periodic_rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return balance;
    }
    if periodic_rate.is_zero() {
        return balance / Decimal::from(periods);
    }
    let discount = match checked_pow(Decimal::ONE + periodic_rate, periods) {
        Some(growth) if !growth.is_zero() => Decimal::ONE - Decimal::ONE / growth,
        // (1+i)^-n underflows to zero: the payment is pure interest.
        _ => Decimal::ONE,
    };
    if discount.is_zero() {
        return balance / Decimal::from(periods);
    }
    balance * periodic_rate / discount
}

/// A mortgage issued against a property purchase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmortizedLoan {
    principal: Money,
    down_payment: Money,
    annual_interest_rate: Rate,
    term_years: u32,
    schedule: PaymentSchedule,
    pay_periods: u32,
    outstanding_balance: Money,
    minimum_payment: Money,
    interest_payment: Money,
    remaining_periods: u32,
}

impl AmortizedLoan {
    /// Issue a loan on the default monthly schedule.
    ///
    /// A down payment larger than the principal is accepted and leaves a
    /// negative balance; such a loan never demands a payment.
    pub fn issue(principal: Money, down_payment: Money, annual_rate: Rate, term_years: u32) -> Self {
        Self::issue_with_schedule(
            principal,
            down_payment,
            annual_rate,
            term_years,
            PaymentSchedule::Monthly,
        )
    }

    pub fn issue_with_schedule(
        principal: Money,
        down_payment: Money,
        annual_rate: Rate,
        term_years: u32,
        schedule: PaymentSchedule,
    ) -> Self {
        let pay_periods = term_years.saturating_mul(schedule.periods_per_year());
        let mut loan = Self {
            principal,
            down_payment,
            annual_interest_rate: annual_rate,
            term_years,
            schedule,
            pay_periods,
            outstanding_balance: principal - down_payment,
            minimum_payment: Decimal::ZERO,
            interest_payment: Decimal::ZERO,
            remaining_periods: pay_periods,
        };
        loan.interest_payment = loan.compute_interest_payment();
        loan.minimum_payment = loan.compute_minimum_payment();
        loan
    }

    /// Issue under a lender's terms.
    pub fn from_terms(principal: Money, down_payment: Money, terms: &LendingTerms) -> Self {
        Self::issue_with_schedule(
            principal,
            down_payment,
            terms.annual_rate,
            terms.term_years,
            terms.schedule,
        )
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn down_payment(&self) -> Money {
        self.down_payment
    }

    pub fn annual_interest_rate(&self) -> Rate {
        self.annual_interest_rate
    }

    /// Term in years.
    pub fn term(&self) -> u32 {
        self.term_years
    }

    pub fn schedule(&self) -> PaymentSchedule {
        self.schedule
    }

    pub fn periods_per_year(&self) -> u32 {
        self.schedule.periods_per_year()
    }

    /// Total number of payments at issuance.
    pub fn pay_periods(&self) -> u32 {
        self.pay_periods
    }

    pub fn remaining_periods(&self) -> u32 {
        self.remaining_periods
    }

    pub fn outstanding_balance(&self) -> Money {
        self.outstanding_balance
    }

    /// Payment due this period.
    pub fn minimum_payment(&self) -> Money {
        self.minimum_payment
    }

    /// Interest portion of this period's payment.
    pub fn interest_payment(&self) -> Money {
        self.interest_payment
    }

    /// Principal portion of this period's payment.
    pub fn principal_payment(&self) -> Money {
        (self.minimum_payment - self.interest_payment).max(Decimal::ZERO)
    }

    pub fn is_paid_off(&self) -> bool {
        self.outstanding_balance <= Decimal::ZERO
    }

    fn periodic_rate(&self) -> Rate {
        self.annual_interest_rate / Decimal::from(self.periods_per_year())
    }

    fn compute_interest_payment(&self) -> Money {
        if self.outstanding_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        whole(self.outstanding_balance * self.periodic_rate())
    }

    fn compute_minimum_payment(&self) -> Money {
        let balance = self.outstanding_balance;
        if balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        whole(amortized_payment(balance, self.periodic_rate(), self.pay_periods))
    }

    /// Pay this period's minimum payment.
    ///
    /// The balance drops by the principal portion, then interest and the next
    /// payment are recomputed from the new balance.
    pub fn make_minimum_payment(&mut self) {
        let principal_part = self.principal_payment();
        self.outstanding_balance -= principal_part;
        self.interest_payment = self.compute_interest_payment();
        self.remaining_periods = self.remaining_periods.saturating_sub(1);
        self.minimum_payment = self.compute_minimum_payment();
        debug!(
            balance = %self.outstanding_balance,
            remaining = self.remaining_periods,
            "minimum payment applied"
        );
    }

    /// Pay extra principal. Amounts beyond the outstanding balance are not
    /// applied; returns the amount actually taken.
    pub fn make_principal_payment(&mut self, amount: Money) -> Money {
        let applied = amount
            .max(Decimal::ZERO)
            .min(self.outstanding_balance.max(Decimal::ZERO));
        self.outstanding_balance -= applied;
        self.interest_payment = self.compute_interest_payment();
        self.minimum_payment = self.compute_minimum_payment();
        applied
    }
}
