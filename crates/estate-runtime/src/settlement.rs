//! Period settlement: the once-per-turn pass that moves money and value.
//!
//! A tick runs against a staged copy of the portfolio and is committed only
//! if every property settles, so a failed tick leaves no partial effects.

use crate::portfolio::Portfolio;
use estate_core::{EstateError, ListedValuation, Money, SimConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// Cash and value movements of one committed tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SettlementReport {
    pub period: u64,
    pub rent_collected: Money,
    pub operating_expenses_paid: Money,
    pub debt_service_paid: Money,
    pub upgrades_completed: usize,
    pub wallet: Money,
    pub net_worth: Money,
}

/// Runs the per-period pass over a portfolio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    listed: ListedValuation,
}

impl SettlementEngine {
    /// Engine with the given policy for listed properties.
    pub fn new(listed: ListedValuation) -> Self {
        Self { listed }
    }

    pub fn from_config(cfg: &SimConfig) -> Self {
        Self::new(cfg.listed_valuation)
    }

    /// Whether listings keep appreciating while unsold.
    pub fn listed_valuation(&self) -> ListedValuation {
        self.listed
    }

    /// Settle one period. On error the portfolio is untouched.
    pub fn settle(&self, portfolio: &mut Portfolio, period: u64) -> Result<SettlementReport, EstateError> {
        let mut staged = portfolio.clone();
        match self.settle_staged(&mut staged, period) {
            Ok(report) => {
                *portfolio = staged;
                info!(
                    period,
                    wallet = %report.wallet,
                    net_worth = %report.net_worth,
                    rent = %report.rent_collected,
                    "period settled"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(period, error = %e, "settlement aborted");
                Err(e)
            }
        }
    }

    fn settle_staged(&self, pf: &mut Portfolio, period: u64) -> Result<SettlementReport, EstateError> {
        let mut report = SettlementReport {
            period,
            ..SettlementReport::default()
        };
        for id in pf.ids() {
            let property = pf.get_mut(id)?;
            if property.is_for_sale() {
                if self.listed == ListedValuation::Track {
                    property.revalue()?;
                }
                continue;
            }

            report.upgrades_completed += property.advance_upgrades();
            property.revalue()?;
            let rent = property.rent();
            let opex = property.operating_expenses();
            let due = match property.loan_mut() {
                Some(loan) => {
                    let due = loan.minimum_payment();
                    loan.make_minimum_payment();
                    due
                }
                None => Decimal::ZERO,
            };
            property.record_income(rent);
            property.record_expense(opex + due);

            pf.add_funds(rent);
            pf.remove_funds(opex)?;
            pf.remove_funds(due)?;
            pf.add_total_income(rent);
            pf.add_total_expenses(opex + due);

            report.rent_collected += rent;
            report.operating_expenses_paid += opex;
            report.debt_service_paid += due;
        }
        pf.update_aggregates();
        report.wallet = pf.wallet();
        report.net_worth = pf.net_worth();
        Ok(report)
    }
}
