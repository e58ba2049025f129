//! Shared domain vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a property held in a portfolio.
///
/// Handles are issued in increasing order, so iterating a portfolio by id
/// visits properties in listing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Quality tier driving valuation multipliers and upgrade offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassRating {
    /// Premium stock.
    A,
    /// Average stock.
    B,
    /// Value-add stock; the only tier offered upgrades by default.
    C,
}

impl ClassRating {
    /// All ratings in allocation order.
    pub const ALL: [ClassRating; 3] = [ClassRating::A, ClassRating::B, ClassRating::C];
}

impl fmt::Display for ClassRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassRating::A => "A",
            ClassRating::B => "B",
            ClassRating::C => "C",
        };
        f.write_str(s)
    }
}

/// Kinds of investment property the generator can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Detached house with a single tenancy.
    SingleFamilyHome,
    /// Apartment building with many units.
    MultiTenant,
}

/// Lifecycle state of a property upgrade. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeState {
    Planning,
    UnderConstruction,
    Complete,
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpgradeState::Planning => "planning",
            UpgradeState::UnderConstruction => "under construction",
            UpgradeState::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Inputs to the upgrade state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeEvent {
    /// Player paid for the work; construction begins.
    StartConstruction,
    /// One settlement period elapsed.
    Next,
    /// Finish immediately, skipping any remaining construction.
    Complete,
}

impl fmt::Display for UpgradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpgradeEvent::StartConstruction => "start construction",
            UpgradeEvent::Next => "next",
            UpgradeEvent::Complete => "complete",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_ids_order_by_issue() {
        assert!(PropertyId(1) < PropertyId(2));
        assert_eq!(PropertyId(7).to_string(), "#7");
    }

    #[test]
    fn serde_roundtrip_rating() {
        let s = serde_json::to_string(&ClassRating::B).unwrap();
        let back: ClassRating = serde_json::from_str(&s).unwrap();
        assert_eq!(back, ClassRating::B);
    }
}
