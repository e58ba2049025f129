//! Populating a zone: class allocation across markers and template choice.

use crate::generator::PropertyGenerator;
use crate::property::Property;
use estate_core::{
    shuffle, validate_zone, ClassRating, ClassRatios, EstateError, RandomRangeProvider,
    ValidationError, WeightedBag, ZoneData,
};
use tracing::info;

/// Ratings for `count` markers in the zone's A:B:C proportion.
///
/// Each class gets `floor(weight / total × count)`; the remainder goes to C.
/// The result is shuffled so classes are spread across markers.
pub fn allocate_ratings<R: RandomRangeProvider + ?Sized>(
    ratios: &ClassRatios,
    count: usize,
    rng: &mut R,
) -> Result<Vec<ClassRating>, EstateError> {
    let total = ratios.total();
    let share = |rating: ClassRating| -> usize {
        if total == 0 {
            return 0;
        }
        (u64::from(ratios.weight(rating)) * count as u64 / total) as usize
    };
    let a = share(ClassRating::A);
    let b = share(ClassRating::B);
    let c = count.saturating_sub(a + b);

    let mut out = Vec::with_capacity(count);
    out.extend(std::iter::repeat(ClassRating::A).take(a));
    out.extend(std::iter::repeat(ClassRating::B).take(b));
    out.extend(std::iter::repeat(ClassRating::C).take(c));
    shuffle(&mut out, rng)?;
    Ok(out)
}

/// Generate one listing per marker in `zone`.
pub fn generate_neighborhood<R: RandomRangeProvider + ?Sized>(
    generator: &PropertyGenerator,
    zone: &ZoneData,
    rng: &mut R,
) -> Result<Vec<Property>, EstateError> {
    validate_zone(zone)?;
    let mut bag = WeightedBag::new();
    for template in &zone.templates {
        bag.add_entry(template, template.weight);
    }
    let ratings = allocate_ratings(&zone.class_ratios, zone.markers as usize, rng)?;
    let mut listings = Vec::with_capacity(ratings.len());
    for rating in ratings {
        let template = *bag
            .pick(rng)?
            .ok_or_else(|| ValidationError::NoTemplates(zone.name.clone()))?;
        listings.push(generator.generate(zone, template, rating, rng)?);
    }
    info!(zone = %zone.name, listings = listings.len(), "neighborhood generated");
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::{apartments, riverside};
    use estate_core::{PropertyKind, SeededRandom};
    use proptest::prelude::*;

    fn counts(ratings: &[ClassRating]) -> (usize, usize, usize) {
        let n = |r| ratings.iter().filter(|&&x| x == r).count();
        (n(ClassRating::A), n(ClassRating::B), n(ClassRating::C))
    }

    #[test]
    fn leftovers_go_to_class_c() {
        let ratios = ClassRatios { a: 1, b: 2, c: 3 };
        let r = allocate_ratings(&ratios, 7, &mut SeededRandom::new(1)).unwrap();
        // 7/6 = 1 A, 14/6 = 2 B, rest C.
        assert_eq!(counts(&r), (1, 2, 4));
    }

    #[test]
    fn zero_markers_is_empty() {
        let r = allocate_ratings(&ClassRatios::default(), 0, &mut SeededRandom::new(1)).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn neighborhood_has_one_listing_per_marker() {
        let generator = PropertyGenerator::default();
        let mut zone = riverside();
        zone.templates.push(apartments());
        let listings = generate_neighborhood(&generator, &zone, &mut SeededRandom::new(4)).unwrap();
        assert_eq!(listings.len(), 12);
        assert!(listings.iter().all(|p| p.zone == "Riverside" && p.is_for_sale()));
        let (a, b, c) = counts(&listings.iter().map(|p| p.class_rating).collect::<Vec<_>>());
        assert_eq!((a, b, c), (2, 4, 6));
        assert!(listings
            .iter()
            .all(|p| matches!(p.kind, PropertyKind::SingleFamilyHome | PropertyKind::MultiTenant)));
    }

    #[test]
    fn invalid_zone_is_rejected_before_sampling() {
        let mut zone = riverside();
        zone.templates.clear();
        let err = generate_neighborhood(&PropertyGenerator::default(), &zone, &mut SeededRandom::new(4))
            .unwrap_err();
        assert_eq!(
            err,
            EstateError::Validation(ValidationError::NoTemplates("Riverside".to_string()))
        );
    }

    proptest! {
        #[test]
        fn allocation_preserves_count(a in 0u32..10, b in 0u32..10, c in 1u32..10, n in 0usize..200, seed in any::<u64>()) {
            let ratios = ClassRatios { a, b, c };
            let r = allocate_ratings(&ratios, n, &mut SeededRandom::new(seed)).unwrap();
            prop_assert_eq!(r.len(), n);
            let (ca, cb, _) = counts(&r);
            let total = u64::from(a + b + c);
            prop_assert_eq!(ca as u64, u64::from(a) * n as u64 / total);
            prop_assert_eq!(cb as u64, u64::from(b) * n as u64 / total);
        }
    }
}
