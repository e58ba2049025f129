//! Procedural property generation.
//!
//! Every sample is an inclusive integer draw from the random provider, taken
//! in a fixed order so a seed reproduces the same listing.

use crate::property::Property;
use crate::upgrade::{PropertyUpgrade, UpgradeKind};
use estate_core::{
    shuffle, whole, ClassRating, EstateError, HomeTemplate, Money, PropertyKind,
    RandomRangeProvider, Rate, SimConfig, UpgradeOffers, ValuationDefaults, ZoneData,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

const MIN_TENANTS: i64 = 6;
const MAX_TENANTS: i64 = 450;
const MIN_UNIT_SIZE: i64 = 500;
const MAX_UNIT_SIZE: i64 = 1200;
const MIN_PRICE_PER_SQFT: i64 = 95;
const MAX_PRICE_PER_SQFT: i64 = 500;
const MIN_INCOME_PER_SQFT: i64 = 10;
const MAX_INCOME_PER_SQFT: i64 = 37;

/// Appraisal band around base value for a class tier.
pub fn appraisal_multipliers(rating: ClassRating) -> (Rate, Rate) {
    match rating {
        ClassRating::A => (dec!(1.0), dec!(1.25)),
        ClassRating::B => (dec!(0.9), dec!(1.1)),
        ClassRating::C => (dec!(0.8), dec!(1.05)),
    }
}

pub fn income_multiplier(rating: ClassRating) -> Rate {
    match rating {
        ClassRating::A => dec!(0.003),
        ClassRating::B => dec!(0.0023),
        ClassRating::C => dec!(0.0015),
    }
}

fn to_int(value: Money, what: &'static str) -> Result<i64, EstateError> {
    whole(value).to_i64().ok_or(EstateError::Overflow(what))
}

/// Uniform whole amount between `floor(lo)` and `floor(hi)`.
fn draw_between<R: RandomRangeProvider + ?Sized>(
    rng: &mut R,
    lo: Money,
    hi: Money,
    what: &'static str,
) -> Result<Money, EstateError> {
    let n = rng.uniform_int(to_int(lo, what)?, to_int(hi, what)?)?;
    Ok(Decimal::from(n))
}

/// Builds listings from zone and template data.
#[derive(Clone, Debug, Default)]
pub struct PropertyGenerator {
    valuation: ValuationDefaults,
    offers: UpgradeOffers,
}

impl PropertyGenerator {
    pub fn new(valuation: ValuationDefaults, offers: UpgradeOffers) -> Self {
        Self { valuation, offers }
    }

    pub fn from_config(cfg: &SimConfig) -> Self {
        Self::new(cfg.valuation, cfg.upgrade_offers)
    }

    pub fn valuation(&self) -> &ValuationDefaults {
        &self.valuation
    }

    /// Generate one listing for `template` in `zone` at `rating`.
    pub fn generate<R: RandomRangeProvider + ?Sized>(
        &self,
        zone: &ZoneData,
        template: &HomeTemplate,
        rating: ClassRating,
        rng: &mut R,
    ) -> Result<Property, EstateError> {
        let mut property = match template.kind {
            PropertyKind::SingleFamilyHome => self.single_family(zone, template, rating, rng)?,
            PropertyKind::MultiTenant => self.multi_tenant(rating, rng)?,
        };
        property.name = template.name.clone();
        property.zone = zone.name.clone();
        property.recompute();
        debug!(
            zone = %zone.name,
            template = %template.name,
            rating = %rating,
            appraised = %property.appraised_value(),
            list = %property.list_price(),
            "generated listing"
        );
        Ok(property)
    }

    fn single_family<R: RandomRangeProvider + ?Sized>(
        &self,
        zone: &ZoneData,
        template: &HomeTemplate,
        rating: ClassRating,
        rng: &mut R,
    ) -> Result<Property, EstateError> {
        let sqft_cap = template.max_square_footage.min(zone.max_square_footage);
        let sqft = rng.uniform_int(template.min_square_footage, sqft_cap)?;
        if sqft <= 0 {
            return Err(EstateError::InvalidRange {
                field: "square_footage",
                min: template.min_square_footage as f64,
                max: sqft_cap as f64,
            });
        }
        let base = rng.uniform_int(zone.min_property_value, zone.max_property_value)?;
        let ppsf = Decimal::from(base / sqft);
        let base = Decimal::from(base);

        let mut p = Property::new(PropertyKind::SingleFamilyHome, rating, base, &self.valuation);
        p.base_square_footage = sqft;
        p.price_per_square_foot = ppsf;

        let (lo, hi) = appraisal_multipliers(rating);
        let appraised = draw_between(rng, base * lo, base * hi, "appraised_value")?;
        p.set_appraised_value(appraised);
        let list = draw_between(rng, appraised * dec!(0.9), appraised * dec!(1.1), "list_price")?;
        p.set_list_price(list);
        p.minimum_down_payment = whole(appraised * dec!(0.2));

        // Escrow and prepaid taxes, plus one-time fees.
        let escrow = draw_between(
            rng,
            appraised * dec!(0.008),
            appraised * dec!(0.009),
            "closing_costs",
        )?;
        p.closing_costs = escrow + whole(appraised * dec!(0.003));
        p.income_multiplier = income_multiplier(rating);

        let count = self.offers.for_rating(rating).min(UpgradeKind::ALL.len());
        if count > 0 {
            let mut kinds = UpgradeKind::ALL;
            shuffle(&mut kinds, rng)?;
            for kind in kinds.into_iter().take(count) {
                p.offer_upgrade(PropertyUpgrade::quoted(kind, sqft, ppsf, rng)?);
            }
        }
        Ok(p)
    }

    fn multi_tenant<R: RandomRangeProvider + ?Sized>(
        &self,
        rating: ClassRating,
        rng: &mut R,
    ) -> Result<Property, EstateError> {
        let tenants = rng.uniform_int(MIN_TENANTS, MAX_TENANTS)?;
        let sqft = rng.uniform_int(tenants * MIN_UNIT_SIZE, tenants * MAX_UNIT_SIZE)?;
        let ppsf = Decimal::from(rng.uniform_int(MIN_PRICE_PER_SQFT, MAX_PRICE_PER_SQFT)?);
        let base = Decimal::from(sqft) * ppsf;

        let mut p = Property::new(PropertyKind::MultiTenant, rating, base, &self.valuation);
        p.base_square_footage = sqft;
        p.price_per_square_foot = ppsf;
        p.max_tenancy = u32::try_from(tenants).map_err(|_| EstateError::Overflow("max_tenancy"))?;

        let appraised = draw_between(rng, base * dec!(0.8), base * dec!(1.25), "appraised_value")?;
        p.set_appraised_value(appraised);
        let list = draw_between(rng, appraised * dec!(0.9), appraised * dec!(1.1), "list_price")?;
        p.set_list_price(list);
        p.minimum_down_payment = whole(appraised * dec!(0.25));
        p.income_multiplier = income_multiplier(rating);
        p.income_per_square_foot = Some(Decimal::from(
            rng.uniform_int(MIN_INCOME_PER_SQFT, MAX_INCOME_PER_SQFT)?,
        ));
        Ok(p)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use estate_core::{ClassRatios, SeededRandom, UpgradeState};
    use proptest::prelude::*;

    pub(crate) fn bungalow() -> HomeTemplate {
        HomeTemplate {
            name: "Bungalow".to_string(),
            kind: PropertyKind::SingleFamilyHome,
            min_square_footage: 800,
            max_square_footage: 5000,
            weight: 1.0,
        }
    }

    pub(crate) fn apartments() -> HomeTemplate {
        HomeTemplate {
            name: "Apartment Block".to_string(),
            kind: PropertyKind::MultiTenant,
            min_square_footage: 0,
            max_square_footage: 0,
            weight: 1.0,
        }
    }

    pub(crate) fn riverside() -> ZoneData {
        ZoneData {
            name: "Riverside".to_string(),
            min_property_value: 80_000,
            max_property_value: 250_000,
            max_square_footage: 3000,
            class_ratios: ClassRatios { a: 1, b: 2, c: 3 },
            templates: vec![bungalow()],
            markers: 12,
        }
    }

    #[test]
    fn class_c_homes_get_four_distinct_upgrades() {
        let generator = PropertyGenerator::default();
        let mut rng = SeededRandom::new(11);
        let p = generator
            .generate(&riverside(), &bungalow(), ClassRating::C, &mut rng)
            .unwrap();
        assert_eq!(p.upgrades().len(), 4);
        let mut kinds: Vec<_> = p.upgrades().iter().map(|u| u.name()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 4);
        assert!(p
            .upgrades()
            .iter()
            .all(|u| u.state() == UpgradeState::Planning));
    }

    #[test]
    fn class_a_homes_get_no_upgrades_by_default() {
        let generator = PropertyGenerator::default();
        let mut rng = SeededRandom::new(3);
        let p = generator
            .generate(&riverside(), &bungalow(), ClassRating::A, &mut rng)
            .unwrap();
        assert!(p.upgrades().is_empty());
        assert_eq!(p.income_multiplier, dec!(0.003));
        assert_eq!(p.name, "Bungalow");
        assert_eq!(p.zone, "Riverside");
    }

    #[test]
    fn offers_follow_configuration() {
        let offers = UpgradeOffers {
            class_a: 2,
            class_b: 0,
            class_c: 9,
        };
        let generator = PropertyGenerator::new(ValuationDefaults::default(), offers);
        let mut rng = SeededRandom::new(5);
        let a = generator
            .generate(&riverside(), &bungalow(), ClassRating::A, &mut rng)
            .unwrap();
        assert_eq!(a.upgrades().len(), 2);
        let c = generator
            .generate(&riverside(), &bungalow(), ClassRating::C, &mut rng)
            .unwrap();
        assert_eq!(c.upgrades().len(), 4);
    }

    #[test]
    fn same_seed_same_listing() {
        let generator = PropertyGenerator::default();
        let a = generator
            .generate(&riverside(), &bungalow(), ClassRating::B, &mut SeededRandom::new(77))
            .unwrap();
        let b = generator
            .generate(&riverside(), &bungalow(), ClassRating::B, &mut SeededRandom::new(77))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn multi_tenant_bounds() {
        let generator = PropertyGenerator::default();
        let mut rng = SeededRandom::new(9);
        for _ in 0..50 {
            let p = generator
                .generate(&riverside(), &apartments(), ClassRating::B, &mut rng)
                .unwrap();
            let t = i64::from(p.max_tenancy);
            assert!((MIN_TENANTS..=MAX_TENANTS).contains(&t));
            assert!(p.base_square_footage >= t * MIN_UNIT_SIZE);
            assert!(p.base_square_footage <= t * MAX_UNIT_SIZE);
            assert_eq!(p.base_value, Decimal::from(p.base_square_footage) * p.price_per_square_foot);
            assert!(p.appraised_value() >= whole(p.base_value * dec!(0.8)));
            assert!(p.appraised_value() <= whole(p.base_value * dec!(1.25)));
            assert_eq!(p.minimum_down_payment, whole(p.appraised_value() * dec!(0.25)));
            let isf = p.income_per_square_foot.unwrap();
            assert!(isf >= dec!(10) && isf <= dec!(37));
            assert!(p.upgrades().is_empty());
            assert!(p.is_for_sale());
        }
    }

    #[test]
    fn degenerate_footage_is_rejected() {
        let generator = PropertyGenerator::default();
        let mut t = bungalow();
        t.min_square_footage = 0;
        t.max_square_footage = 0;
        let err = generator
            .generate(&riverside(), &t, ClassRating::B, &mut SeededRandom::new(1))
            .unwrap_err();
        assert!(matches!(err, EstateError::InvalidRange { field: "square_footage", .. }));
    }

    proptest! {
        #[test]
        fn single_family_respects_bounds(seed in any::<u64>(), r in 0usize..3) {
            let rating = ClassRating::ALL[r];
            let zone = riverside();
            let generator = PropertyGenerator::default();
            let p = generator.generate(&zone, &bungalow(), rating, &mut SeededRandom::new(seed)).unwrap();

            prop_assert!(p.base_square_footage >= 800 && p.base_square_footage <= 3000);
            prop_assert!(p.base_value >= dec!(80000) && p.base_value <= dec!(250000));
            prop_assert_eq!(
                p.price_per_square_foot,
                Decimal::from(to_int(p.base_value, "t").unwrap() / p.base_square_footage)
            );
            let (lo, hi) = appraisal_multipliers(rating);
            let appraised = p.appraised_value();
            prop_assert!(appraised >= whole(p.base_value * lo));
            prop_assert!(appraised <= whole(p.base_value * hi));
            prop_assert!(p.list_price() >= whole(appraised * dec!(0.9)));
            prop_assert!(p.list_price() <= whole(appraised * dec!(1.1)));
            prop_assert_eq!(p.minimum_down_payment, whole(appraised * dec!(0.2)));
            let fees = whole(appraised * dec!(0.003));
            prop_assert!(p.closing_costs >= whole(appraised * dec!(0.008)) + fees);
            prop_assert!(p.closing_costs <= whole(appraised * dec!(0.009)) + fees);
            prop_assert_eq!(p.rent(), appraised * dec!(0.01) * dec!(0.92));
        }
    }
}
