//! Scenario configuration loaded from YAML and validated up front.

use crate::domain::{ClassRating, PropertyKind};
use crate::error::ValidationError;
use crate::money::{Money, Rate, MONTHS_PER_YEAR, WEEKS_PER_YEAR};
use crate::zone::{validate_zone, ClassRatios, HomeTemplate, ZoneData};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// How often a loan is paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSchedule {
    #[default]
    Monthly,
    Weekly,
}

impl PaymentSchedule {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentSchedule::Monthly => MONTHS_PER_YEAR,
            PaymentSchedule::Weekly => WEEKS_PER_YEAR,
        }
    }
}

/// Terms a lender offers on new mortgages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LendingTerms {
    /// Annual interest rate (0.05 = 5%).
    pub annual_rate: Rate,
    /// Loan term in years.
    pub term_years: u32,
    /// Payment cadence.
    #[serde(default)]
    pub schedule: PaymentSchedule,
}

impl Default for LendingTerms {
    fn default() -> Self {
        Self {
            annual_rate: dec!(0.05),
            term_years: 30,
            schedule: PaymentSchedule::Monthly,
        }
    }
}

/// Valuation constants stamped onto newly generated properties.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationDefaults {
    pub annual_appreciation_rate: Rate,
    pub base_rent_multiplier: Rate,
    pub base_vacancy_rate: Rate,
    pub base_operating_expenses_rate: Rate,
    /// Financing assumed when estimating returns on a listing.
    pub estimate_terms: LendingTerms,
}

impl Default for ValuationDefaults {
    fn default() -> Self {
        Self {
            annual_appreciation_rate: dec!(0.05),
            base_rent_multiplier: dec!(0.01),
            base_vacancy_rate: dec!(0.08),
            base_operating_expenses_rate: dec!(0.5),
            estimate_terms: LendingTerms {
                annual_rate: dec!(0.0275),
                term_years: 30,
                schedule: PaymentSchedule::Monthly,
            },
        }
    }
}

/// Number of upgrades pre-offered on a new listing, per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeOffers {
    pub class_a: usize,
    pub class_b: usize,
    pub class_c: usize,
}

impl Default for UpgradeOffers {
    fn default() -> Self {
        Self {
            class_a: 0,
            class_b: 0,
            class_c: 4,
        }
    }
}

impl UpgradeOffers {
    pub fn for_rating(&self, rating: ClassRating) -> usize {
        match rating {
            ClassRating::A => self.class_a,
            ClassRating::B => self.class_b,
            ClassRating::C => self.class_c,
        }
    }
}

/// Whether listed (unowned) properties keep appreciating between sales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListedValuation {
    /// Listings appreciate and recompute rent each period but never touch the wallet.
    #[default]
    Track,
    /// Listings are frozen until bought.
    Freeze,
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    /// Calendar date of the first settlement period.
    pub start_date: NaiveDate,
    /// Cash the player starts with.
    pub starting_wallet: Money,
    /// Mortgage terms offered at purchase.
    pub lending: LendingTerms,
    /// Valuation constants for generated properties.
    pub valuation: ValuationDefaults,
    /// Pre-offered upgrade counts.
    pub upgrade_offers: UpgradeOffers,
    /// Listing appreciation policy.
    pub listed_valuation: ListedValuation,
    /// Neighborhoods to populate.
    pub zones: Vec<ZoneData>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap_or(NaiveDate::MIN),
            starting_wallet: dec!(50000),
            lending: LendingTerms::default(),
            valuation: ValuationDefaults::default(),
            upgrade_offers: UpgradeOffers::default(),
            listed_valuation: ListedValuation::default(),
            zones: vec![default_zone()],
        }
    }
}

fn default_zone() -> ZoneData {
    ZoneData {
        name: "Old Town".to_string(),
        min_property_value: 60_000,
        max_property_value: 180_000,
        max_square_footage: 4000,
        class_ratios: ClassRatios { a: 1, b: 2, c: 3 },
        templates: vec![
            HomeTemplate {
                name: "Bungalow".to_string(),
                kind: PropertyKind::SingleFamilyHome,
                min_square_footage: 800,
                max_square_footage: 5000,
                weight: 2.0,
            },
            HomeTemplate {
                name: "Cottage".to_string(),
                kind: PropertyKind::SingleFamilyHome,
                min_square_footage: 1200,
                max_square_footage: 4000,
                weight: 1.0,
            },
        ],
        markers: 12,
    }
}

impl SimConfig {
    /// Parse and validate a YAML scenario.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_yaml::from_str(text)?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    /// Read, parse and validate a YAML scenario file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading scenario");
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

fn check_rate(rate: Rate, name: &'static str) -> Result<(), ValidationError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange(name));
    }
    Ok(())
}

fn validate_terms(terms: &LendingTerms) -> Result<(), ValidationError> {
    check_rate(terms.annual_rate, "annual_rate")?;
    if terms.term_years == 0 {
        return Err(ValidationError::NonPositive("term_years"));
    }
    Ok(())
}

/// Validate a whole scenario, including every zone.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.starting_wallet < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("starting_wallet"));
    }
    validate_terms(&cfg.lending)?;
    validate_terms(&cfg.valuation.estimate_terms)?;
    check_rate(cfg.valuation.annual_appreciation_rate, "annual_appreciation_rate")?;
    check_rate(cfg.valuation.base_rent_multiplier, "base_rent_multiplier")?;
    check_rate(cfg.valuation.base_vacancy_rate, "base_vacancy_rate")?;
    check_rate(
        cfg.valuation.base_operating_expenses_rate,
        "base_operating_expenses_rate",
    )?;
    let mut names = BTreeSet::new();
    for z in &cfg.zones {
        validate_zone(z)?;
        if !names.insert(z.name.as_str()) {
            return Err(ValidationError::DuplicateZone(z.name.clone()));
        }
    }
    Ok(())
}
