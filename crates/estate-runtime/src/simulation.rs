//! The game clock: one settlement per week of calendar time.

use crate::lender::Lender;
use crate::portfolio::Portfolio;
use crate::settlement::{SettlementEngine, SettlementReport};
use chrono::{Days, NaiveDate};
use estate_core::{EstateError, Money, PropertyId, RandomRangeProvider, SimConfig, ZoneData};
use estate_market::{generate_neighborhood, PropertyGenerator};
use tracing::info;

const DAYS_PER_PERIOD: u64 = 7;

#[derive(Clone, Debug)]
pub struct Simulation {
    portfolio: Portfolio,
    lender: Lender,
    engine: SettlementEngine,
    date: NaiveDate,
    period: u64,
}

impl Simulation {
    pub fn new(portfolio: Portfolio, lender: Lender, engine: SettlementEngine, start: NaiveDate) -> Self {
        Self {
            portfolio,
            lender,
            engine,
            date: start,
            period: 0,
        }
    }

    /// Empty market with the scenario's wallet, lender and listing policy.
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self::new(
            Portfolio::new(cfg.starting_wallet),
            Lender::new(cfg.lending),
            SettlementEngine::from_config(cfg),
            cfg.start_date,
        )
    }

    /// Generate and list a neighborhood for every zone. Returns the new ids.
    pub fn populate<R: RandomRangeProvider + ?Sized>(
        &mut self,
        generator: &PropertyGenerator,
        zones: &[ZoneData],
        rng: &mut R,
    ) -> Result<Vec<PropertyId>, EstateError> {
        let mut ids = Vec::new();
        for zone in zones {
            for property in generate_neighborhood(generator, zone, rng)? {
                ids.push(self.portfolio.list_property(property));
            }
        }
        info!(listings = ids.len(), zones = zones.len(), "market populated");
        Ok(ids)
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn portfolio_mut(&mut self) -> &mut Portfolio {
        &mut self.portfolio
    }

    pub fn lender(&self) -> &Lender {
        &self.lender
    }

    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Periods settled so far.
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Buy a listing with this simulation's lender.
    pub fn purchase(&mut self, id: PropertyId, offer: Money, down_payment: Money) -> Result<(), EstateError> {
        self.portfolio.purchase(id, offer, down_payment, &self.lender)
    }

    /// Settle one period and move the calendar on a week. The clock does not
    /// move when settlement fails.
    pub fn advance_period(&mut self) -> Result<SettlementReport, EstateError> {
        let next_date = self
            .date
            .checked_add_days(Days::new(DAYS_PER_PERIOD))
            .ok_or(EstateError::Overflow("date"))?;
        let report = self.engine.settle(&mut self.portfolio, self.period + 1)?;
        self.period += 1;
        self.date = next_date;
        Ok(report)
    }

    /// Settle `periods` in a row, stopping at the first failure.
    pub fn run_periods(&mut self, periods: u32) -> Result<Vec<SettlementReport>, EstateError> {
        (0..periods).map(|_| self.advance_period()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::{ListedValuation, SeededRandom};
    use rust_decimal_macros::dec;

    fn sim() -> Simulation {
        let cfg = SimConfig::default();
        let mut sim = Simulation::from_config(&cfg);
        sim.populate(
            &PropertyGenerator::from_config(&cfg),
            &cfg.zones,
            &mut SeededRandom::new(cfg.rng_seed),
        )
        .unwrap();
        sim
    }

    #[test]
    fn populate_lists_every_marker() {
        let s = sim();
        assert_eq!(s.portfolio().listings().count(), 12);
        assert_eq!(s.portfolio().owned().count(), 0);
        assert_eq!(s.portfolio().wallet(), dec!(50000));
        assert_eq!(s.engine().listed_valuation(), ListedValuation::Track);
    }

    #[test]
    fn clock_advances_a_week_per_period() {
        let mut s = sim();
        let start = s.date();
        let reports = s.run_periods(3).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].period, 3);
        assert_eq!(s.period(), 3);
        assert_eq!(s.date(), start.checked_add_days(Days::new(21)).unwrap());
    }

    #[test]
    fn failed_period_stops_the_clock() {
        let mut s = Simulation::from_config(&SimConfig::default());
        let id = s.portfolio_mut().list_property({
            let mut p = crate::portfolio::tests::listing(dec!(100000));
            p.base_operating_expenses_rate = dec!(1.0);
            p.recompute();
            p
        });
        s.purchase(id, dec!(100000), dec!(49900)).unwrap();
        let date = s.date();
        assert!(s.run_periods(5).is_err());
        assert_eq!(s.period(), 0);
        assert_eq!(s.date(), date);
        assert_eq!(s.portfolio().wallet(), dec!(100));
    }

    #[test]
    fn same_seed_same_market() {
        let a = sim();
        let b = sim();
        assert_eq!(a.portfolio(), b.portfolio());
    }
}
