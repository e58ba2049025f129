#![deny(warnings)]

//! Financial models for Estate Tycoon.
//!
//! This crate provides:
//! - The amortizing mortgage engine (`AmortizedLoan`)
//! - Pure valuation functions: rent, operating expenses, appreciation
//! - NOI-derived listing metrics (cap rate, cash-on-cash ROI)

pub mod loan;
pub mod valuation;

pub use loan::{amortized_payment, AmortizedLoan};
pub use valuation::{EstimateInput, ValuationReport};
