//! The bank: issues mortgages under fixed terms.

use estate_core::{LendingTerms, Money};
use estate_finance::AmortizedLoan;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lender {
    terms: LendingTerms,
}

impl Lender {
    pub fn new(terms: LendingTerms) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &LendingTerms {
        &self.terms
    }

    /// Mortgage for a purchase at `price` with `down_payment` paid in cash.
    pub fn issue(&self, price: Money, down_payment: Money) -> AmortizedLoan {
        let loan = AmortizedLoan::from_terms(price, down_payment, &self.terms);
        debug!(
            principal = %price,
            balance = %loan.outstanding_balance(),
            payment = %loan.minimum_payment(),
            "loan issued"
        );
        loan
    }
}
