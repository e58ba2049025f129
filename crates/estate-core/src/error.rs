//! Error types shared across the simulation crates.

use crate::domain::{PropertyId, UpgradeEvent, UpgradeState};
use crate::money::Money;
use thiserror::Error;

/// Validation errors for zone data and configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A generator range has min > max.
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: String,
        min: i64,
        max: i64,
    },
    /// Names must not be blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Zone has no property templates to draw from.
    #[error("zone {0} has no property templates")]
    NoTemplates(String),
    /// Class ratio weights sum to zero.
    #[error("zone {0} has zero class rating weights")]
    ZeroClassWeights(String),
    /// Zone names must be unique within a scenario.
    #[error("duplicate zone: {0}")]
    DuplicateZone(String),
    /// Amount must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    /// Price or balance must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(&'static str),
    /// Rate must lie within [0, 1].
    #[error("rate {0} must be within [0,1]")]
    RateOutOfRange(&'static str),
    /// Template weight must be finite and positive.
    #[error("template weight must be finite and > 0")]
    InvalidWeight,
}

/// Errors raised by simulation operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstateError {
    /// Wallet debit exceeds the balance.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: Money, available: Money },
    /// Random range requested with min > max (or non-finite bounds).
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// Upgrade transition rejected; the upgrade keeps its state.
    #[error("invalid upgrade transition: {event} while {from}")]
    InvalidStateTransition {
        from: UpgradeState,
        event: UpgradeEvent,
    },
    /// No property with this id in the portfolio.
    #[error("unknown property {0}")]
    UnknownProperty(PropertyId),
    /// Property is not listed for sale.
    #[error("property {0} is not for sale")]
    NotForSale(PropertyId),
    /// Property is listed, not owned.
    #[error("property {0} is not owned")]
    NotOwned(PropertyId),
    /// Amount argument rejected.
    #[error("invalid {what}: {amount}")]
    InvalidAmount { what: &'static str, amount: Money },
    /// Upgrade index out of range for the property.
    #[error("no upgrade at index {index}")]
    NoUpgrade { index: usize },
    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    /// Zone or configuration data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EstateError {
    /// True for errors a caller can recover from by choosing a different action.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, EstateError::InsufficientFunds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn messages_name_the_amounts() {
        let e = EstateError::InsufficientFunds {
            needed: dec!(20000),
            available: dec!(500),
        };
        assert_eq!(e.to_string(), "insufficient funds: needed 20000, available 500");
        assert!(e.is_insufficient_funds());
    }

    #[test]
    fn transition_message_reads_naturally() {
        let e = EstateError::InvalidStateTransition {
            from: UpgradeState::Complete,
            event: UpgradeEvent::StartConstruction,
        };
        assert_eq!(e.to_string(), "invalid upgrade transition: start construction while complete");
    }

    #[test]
    fn validation_converts() {
        let e: EstateError = ValidationError::EmptyName.into();
        assert_eq!(e, EstateError::Validation(ValidationError::EmptyName));
    }
}
