#![deny(warnings)]

//! Core domain models and invariants for Estate Tycoon.
//!
//! This crate defines the serializable vocabulary shared by the simulation
//! crates (ratings, property kinds, upgrade states, zone data, configuration),
//! the error types, and the random range source used by generation.

pub mod config;
pub mod domain;
pub mod error;
pub mod money;
pub mod random;
pub mod zone;

pub use config::{
    validate_config, ConfigError, LendingTerms, ListedValuation, PaymentSchedule, SimConfig,
    UpgradeOffers, ValuationDefaults,
};
pub use domain::{ClassRating, PropertyId, PropertyKind, UpgradeEvent, UpgradeState};
pub use error::{EstateError, ValidationError};
pub use money::{cents, whole, Money, Rate, MONTHS_PER_YEAR, WEEKS_PER_YEAR};
pub use random::{shuffle, RandomRangeProvider, SeededRandom, WeightedBag};
pub use zone::{validate_zone, ClassRatios, HomeTemplate, ZoneData};
