//! Property upgrades and their construction lifecycle.
//!
//! The lifecycle is a plain state enum driven by [`transition`]. An upgrade
//! never touches its property; the owning [`crate::Property`] watches for a
//! transition into `Complete` and applies the value effect itself.

use estate_core::{whole, EstateError, Money, RandomRangeProvider, Rate, UpgradeEvent, UpgradeState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Catalogue of renovations a property can be offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    KitchenRemodel,
    BathroomRemodel,
    Landscaping,
    PorchAddition,
}

/// Change to appraised value when an upgrade completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueEffect {
    /// Fraction of the current appraised value.
    Percent(Rate),
    /// Fixed amount.
    Flat(Money),
}

impl ValueEffect {
    /// Value added to a property appraised at `appraised_value`, in whole units.
    pub fn bump(self, appraised_value: Money) -> Money {
        match self {
            ValueEffect::Percent(rate) => whole(appraised_value * rate),
            ValueEffect::Flat(amount) => amount,
        }
    }
}

const PORCH_BASE_PRICE: i64 = 10_000;

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::KitchenRemodel,
        UpgradeKind::BathroomRemodel,
        UpgradeKind::Landscaping,
        UpgradeKind::PorchAddition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::KitchenRemodel => "Kitchen Remodel",
            UpgradeKind::BathroomRemodel => "Bathroom Remodel",
            UpgradeKind::Landscaping => "Add Landscaping",
            UpgradeKind::PorchAddition => "Add Outside Deck",
        }
    }

    pub fn weeks_to_complete(self) -> u32 {
        match self {
            UpgradeKind::KitchenRemodel => 12,
            UpgradeKind::BathroomRemodel => 5,
            UpgradeKind::Landscaping => 1,
            UpgradeKind::PorchAddition => 2,
        }
    }

    pub fn value_effect(self) -> ValueEffect {
        match self {
            UpgradeKind::KitchenRemodel => ValueEffect::Percent(dec!(0.20)),
            UpgradeKind::BathroomRemodel => ValueEffect::Percent(dec!(0.08)),
            UpgradeKind::Landscaping => ValueEffect::Percent(dec!(0.05)),
            UpgradeKind::PorchAddition => ValueEffect::Flat(dec!(2000)),
        }
    }

    /// Share of the home's footprint the work covers, for footprint-priced kinds.
    fn footprint_share(self) -> Option<Rate> {
        match self {
            UpgradeKind::KitchenRemodel => Some(dec!(0.10)),
            UpgradeKind::BathroomRemodel => Some(dec!(0.05)),
            UpgradeKind::Landscaping => Some(dec!(0.03)),
            UpgradeKind::PorchAddition => None,
        }
    }

    /// Quote a price for a home of `square_footage` at `price_per_square_foot`.
    ///
    /// Footprint-priced work is `sqft × share × ppsf`; a porch is a flat price
    /// drawn within ±20% of its base.
    pub fn quote<R: RandomRangeProvider + ?Sized>(
        self,
        square_footage: i64,
        price_per_square_foot: Money,
        rng: &mut R,
    ) -> Result<Money, EstateError> {
        match self.footprint_share() {
            Some(share) => Ok(whole(
                Decimal::from(square_footage) * share * price_per_square_foot,
            )),
            None => {
                let lo = PORCH_BASE_PRICE * 8 / 10;
                let hi = PORCH_BASE_PRICE * 12 / 10;
                Ok(Decimal::from(rng.uniform_int(lo, hi)?))
            }
        }
    }
}

/// Outcome of feeding an event to an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged (e.g. `Next` while still planning).
    Stayed,
    /// Moved forward but not finished.
    Advanced,
    /// Entered `Complete` on this event.
    Completed,
}

/// Pure transition function over `(state, remaining weeks)`.
///
/// `Complete` is terminal: every event on it is rejected. Starting
/// construction twice is rejected. Direct completion from any open state is
/// allowed.
pub fn transition(
    state: UpgradeState,
    remaining_weeks: u32,
    event: UpgradeEvent,
) -> Result<(UpgradeState, u32), EstateError> {
    use UpgradeEvent as E;
    use UpgradeState as S;
    match (state, event) {
        (S::Planning, E::StartConstruction) => Ok((S::UnderConstruction, remaining_weeks)),
        (S::Planning, E::Next) => Ok((S::Planning, remaining_weeks)),
        (S::UnderConstruction, E::Next) => {
            let left = remaining_weeks.saturating_sub(1);
            if left == 0 {
                Ok((S::Complete, 0))
            } else {
                Ok((S::UnderConstruction, left))
            }
        }
        (S::Planning | S::UnderConstruction, E::Complete) => Ok((S::Complete, 0)),
        (S::UnderConstruction, E::StartConstruction) | (S::Complete, _) => {
            Err(EstateError::InvalidStateTransition { from: state, event })
        }
    }
}

/// A renovation offered on (or underway at) a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpgrade {
    kind: UpgradeKind,
    price: Money,
    weeks_to_complete: u32,
    remaining_weeks_to_complete: u32,
    state: UpgradeState,
}

impl PropertyUpgrade {
    /// New upgrade in `Planning` with a full construction schedule.
    pub fn new(kind: UpgradeKind, price: Money) -> Self {
        let weeks = kind.weeks_to_complete();
        Self {
            kind,
            price,
            weeks_to_complete: weeks,
            remaining_weeks_to_complete: weeks,
            state: UpgradeState::Planning,
        }
    }

    /// Quote and create an upgrade for a home.
    pub fn quoted<R: RandomRangeProvider + ?Sized>(
        kind: UpgradeKind,
        square_footage: i64,
        price_per_square_foot: Money,
        rng: &mut R,
    ) -> Result<Self, EstateError> {
        let price = kind.quote(square_footage, price_per_square_foot, rng)?;
        Ok(Self::new(kind, price))
    }

    pub fn kind(&self) -> UpgradeKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn weeks_to_complete(&self) -> u32 {
        self.weeks_to_complete
    }

    pub fn remaining_weeks_to_complete(&self) -> u32 {
        self.remaining_weeks_to_complete
    }

    pub fn state(&self) -> UpgradeState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == UpgradeState::Complete
    }

    /// Feed one event. On error the upgrade is unchanged.
    pub fn apply(&mut self, event: UpgradeEvent) -> Result<Transition, EstateError> {
        let before = self.state;
        let (state, remaining) = transition(self.state, self.remaining_weeks_to_complete, event)?;
        let changed = state != before || remaining != self.remaining_weeks_to_complete;
        self.state = state;
        self.remaining_weeks_to_complete = remaining;
        Ok(match state {
            UpgradeState::Complete => Transition::Completed,
            _ if changed => Transition::Advanced,
            _ => Transition::Stayed,
        })
    }

    pub fn start_construction(&mut self) -> Result<Transition, EstateError> {
        self.apply(UpgradeEvent::StartConstruction)
    }

    /// One week of construction.
    pub fn next(&mut self) -> Result<Transition, EstateError> {
        self.apply(UpgradeEvent::Next)
    }

    /// Finish immediately, skipping remaining construction.
    pub fn complete(&mut self) -> Result<Transition, EstateError> {
        self.apply(UpgradeEvent::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::SeededRandom;

    #[test]
    fn construction_counts_down_then_completes() {
        let mut up = PropertyUpgrade::new(UpgradeKind::BathroomRemodel, dec!(4000));
        assert_eq!(up.state(), UpgradeState::Planning);
        assert_eq!(up.next().unwrap(), Transition::Stayed);
        assert_eq!(up.start_construction().unwrap(), Transition::Advanced);
        for left in (1..5).rev() {
            assert_eq!(up.next().unwrap(), Transition::Advanced);
            assert_eq!(up.remaining_weeks_to_complete(), left);
        }
        assert_eq!(up.next().unwrap(), Transition::Completed);
        assert!(up.is_complete());
    }

    #[test]
    fn complete_is_terminal() {
        let mut up = PropertyUpgrade::new(UpgradeKind::Landscaping, dec!(900));
        up.complete().unwrap();
        let err = up.next().unwrap_err();
        assert_eq!(
            err,
            EstateError::InvalidStateTransition {
                from: UpgradeState::Complete,
                event: UpgradeEvent::Next,
            }
        );
        assert!(up.start_construction().is_err());
        assert!(up.complete().is_err());
        assert!(up.is_complete());
    }

    #[test]
    fn direct_completion_skips_construction() {
        let mut up = PropertyUpgrade::new(UpgradeKind::KitchenRemodel, dec!(12000));
        assert_eq!(up.complete().unwrap(), Transition::Completed);
        assert_eq!(up.remaining_weeks_to_complete(), 0);
    }

    #[test]
    fn double_start_is_rejected_without_change() {
        let mut up = PropertyUpgrade::new(UpgradeKind::PorchAddition, dec!(9000));
        up.start_construction().unwrap();
        up.next().unwrap();
        assert!(up.start_construction().is_err());
        assert_eq!(up.state(), UpgradeState::UnderConstruction);
        assert_eq!(up.remaining_weeks_to_complete(), 1);
    }

    #[test]
    fn footprint_pricing() {
        let mut rng = SeededRandom::new(1);
        let price = UpgradeKind::KitchenRemodel
            .quote(2000, dec!(75), &mut rng)
            .unwrap();
        assert_eq!(price, dec!(15000));
        let bath = UpgradeKind::BathroomRemodel.quote(2000, dec!(75), &mut rng).unwrap();
        assert_eq!(bath, dec!(7500));
        let porch = UpgradeKind::PorchAddition.quote(2000, dec!(75), &mut rng).unwrap();
        assert!(porch >= dec!(8000) && porch <= dec!(12000));
    }

    #[test]
    fn value_effects() {
        assert_eq!(UpgradeKind::KitchenRemodel.value_effect().bump(dec!(100000.50)), dec!(20000));
        assert_eq!(UpgradeKind::BathroomRemodel.value_effect().bump(dec!(100000)), dec!(8000));
        assert_eq!(UpgradeKind::Landscaping.value_effect().bump(dec!(100000)), dec!(5000));
        assert_eq!(UpgradeKind::PorchAddition.value_effect().bump(dec!(100000)), dec!(2000));
    }
}
