//! Zone descriptors: the value/size envelope and class mix of a neighborhood.

use crate::domain::{ClassRating, PropertyKind};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Relative A:B:C weights for allocating class ratings across a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRatios {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl ClassRatios {
    pub fn total(&self) -> u64 {
        u64::from(self.a) + u64::from(self.b) + u64::from(self.c)
    }

    pub fn weight(&self, rating: ClassRating) -> u32 {
        match rating {
            ClassRating::A => self.a,
            ClassRating::B => self.b,
            ClassRating::C => self.c,
        }
    }
}

impl Default for ClassRatios {
    fn default() -> Self {
        Self { a: 1, b: 2, c: 3 }
    }
}

/// A base property archetype a zone may spawn (e.g. "Bungalow").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomeTemplate {
    /// Display name.
    pub name: String,
    /// Which generation variant builds it.
    pub kind: PropertyKind,
    /// Smallest footprint in square feet (single-family only).
    #[serde(default)]
    pub min_square_footage: i64,
    /// Largest footprint in square feet (single-family only).
    #[serde(default)]
    pub max_square_footage: i64,
    /// Relative draw weight within the zone.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// A neighborhood zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneData {
    /// Zone name, unique per scenario.
    pub name: String,
    /// Lowest base value a property in the zone can draw.
    pub min_property_value: i64,
    /// Highest base value a property in the zone can draw.
    pub max_property_value: i64,
    /// Lot cap on square footage; templates are clipped to it.
    pub max_square_footage: i64,
    /// Class rating mix.
    #[serde(default)]
    pub class_ratios: ClassRatios,
    /// Archetypes the zone may spawn.
    pub templates: Vec<HomeTemplate>,
    /// Number of property markers (lots) in the zone.
    #[serde(default)]
    pub markers: u32,
}

/// Validate a zone so generation never meets an inverted range.
pub fn validate_zone(zone: &ZoneData) -> Result<(), ValidationError> {
    if zone.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if zone.min_property_value <= 0 {
        return Err(ValidationError::NonPositive("min_property_value"));
    }
    if zone.min_property_value > zone.max_property_value {
        return Err(ValidationError::InvalidRange {
            field: format!("{}.property_value", zone.name),
            min: zone.min_property_value,
            max: zone.max_property_value,
        });
    }
    if zone.class_ratios.total() == 0 {
        return Err(ValidationError::ZeroClassWeights(zone.name.clone()));
    }
    if zone.templates.is_empty() {
        return Err(ValidationError::NoTemplates(zone.name.clone()));
    }
    for t in &zone.templates {
        if t.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !(t.weight.is_finite() && t.weight > 0.0) {
            return Err(ValidationError::InvalidWeight);
        }
        if t.kind != PropertyKind::SingleFamilyHome {
            continue;
        }
        if t.min_square_footage <= 0 {
            return Err(ValidationError::NonPositive("min_square_footage"));
        }
        let cap = t.max_square_footage.min(zone.max_square_footage);
        if t.min_square_footage > cap {
            return Err(ValidationError::InvalidRange {
                field: format!("{}.{}.square_footage", zone.name, t.name),
                min: t.min_square_footage,
                max: cap,
            });
        }
    }
    Ok(())
}
