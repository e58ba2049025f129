//! An income property: listing facts, running valuation, financing and
//! upgrades.

use crate::upgrade::{PropertyUpgrade, Transition};
use estate_core::{
    whole, ClassRating, EstateError, LendingTerms, Money, PropertyKind, Rate, UpgradeState,
    ValuationDefaults,
};
use estate_finance::valuation::{self, EstimateInput, ValuationReport};
use estate_finance::AmortizedLoan;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A listing or owned property.
///
/// Listing facts are plain fields fixed at generation; the running valuation
/// and ownership state are private and change only through methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub kind: PropertyKind,
    /// Template name the property was generated from.
    pub name: String,
    /// Zone the property was generated in.
    pub zone: String,
    pub class_rating: ClassRating,
    /// Footage as built, before renovations.
    pub base_square_footage: i64,
    /// Footage added by renovations.
    pub additional_square_footage: i64,
    /// Market price per square foot at generation.
    pub price_per_square_foot: Money,
    /// Pre-appraisal value derived from footage and price per square foot.
    pub base_value: Money,
    /// Smallest down payment the seller accepts.
    pub minimum_down_payment: Money,
    /// Estimated closing costs; shown on the listing, not charged.
    pub closing_costs: Money,
    /// Share of appraised value a class tier earns as income.
    pub income_multiplier: Rate,
    /// Units let; 1 for a single-family home.
    pub max_tenancy: u32,
    /// Gross income per square foot (multi-tenant only).
    pub income_per_square_foot: Option<Money>,
    /// Yearly appreciation, compounded monthly once per period.
    pub annual_appreciation_rate: Rate,
    /// Share of appraised value collected as rent per period.
    pub base_rent_multiplier: Rate,
    /// Share of rent lost to vacancy.
    pub base_vacancy_rate: Rate,
    /// Share of rent spent on operating expenses.
    pub base_operating_expenses_rate: Rate,

    appraised_value: Money,
    list_price: Money,
    operating_expenses_rate: Rate,
    rent: Money,
    operating_expenses: Money,
    is_for_sale: bool,
    loan: Option<AmortizedLoan>,
    upgrades: Vec<PropertyUpgrade>,
    purchase_price: Option<Money>,
    total_income: Money,
    total_expenses: Money,
}

impl Property {
    /// A fresh listing valued at `base_value` with the given valuation constants.
    ///
    /// Appraisal and list price start at the base value; callers set them and
    /// then [`recompute`](Self::recompute).
    pub fn new(
        kind: PropertyKind,
        class_rating: ClassRating,
        base_value: Money,
        defaults: &ValuationDefaults,
    ) -> Self {
        Self {
            kind,
            name: String::new(),
            zone: String::new(),
            class_rating,
            base_square_footage: 0,
            additional_square_footage: 0,
            price_per_square_foot: Decimal::ZERO,
            base_value,
            minimum_down_payment: Decimal::ZERO,
            closing_costs: Decimal::ZERO,
            income_multiplier: Decimal::ZERO,
            max_tenancy: 1,
            income_per_square_foot: None,
            annual_appreciation_rate: defaults.annual_appreciation_rate,
            base_rent_multiplier: defaults.base_rent_multiplier,
            base_vacancy_rate: defaults.base_vacancy_rate,
            base_operating_expenses_rate: defaults.base_operating_expenses_rate,
            appraised_value: base_value,
            list_price: base_value,
            operating_expenses_rate: Decimal::ZERO,
            rent: Decimal::ZERO,
            operating_expenses: Decimal::ZERO,
            is_for_sale: true,
            loan: None,
            upgrades: Vec::new(),
            purchase_price: None,
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
        }
    }

    /// Current appraisal, at full precision.
    pub fn appraised_value(&self) -> Money {
        self.appraised_value
    }

    /// Asking price while listed.
    pub fn list_price(&self) -> Money {
        self.list_price
    }

    /// Expense rate in effect, refreshed from the base rate each recompute.
    pub fn operating_expenses_rate(&self) -> Rate {
        self.operating_expenses_rate
    }

    /// Gross rent collected per period.
    pub fn rent(&self) -> Money {
        self.rent
    }

    /// Operating expenses paid per period, excluding debt service.
    pub fn operating_expenses(&self) -> Money {
        self.operating_expenses
    }

    /// True while listed; false once bought.
    pub fn is_for_sale(&self) -> bool {
        self.is_for_sale
    }

    /// Mortgage held while owned.
    pub fn loan(&self) -> Option<&AmortizedLoan> {
        self.loan.as_ref()
    }

    pub fn loan_mut(&mut self) -> Option<&mut AmortizedLoan> {
        self.loan.as_mut()
    }

    /// Offered upgrades in offer order, whatever their state.
    pub fn upgrades(&self) -> &[PropertyUpgrade] {
        &self.upgrades
    }

    /// Price paid at the most recent purchase, while owned.
    pub fn purchase_price(&self) -> Option<Money> {
        self.purchase_price
    }

    /// Rent collected over the property's life.
    pub fn total_income(&self) -> Money {
        self.total_income
    }

    /// Operating expenses, debt service and upgrade prices paid over the property's life.
    pub fn total_expenses(&self) -> Money {
        self.total_expenses
    }

    /// Base plus renovated footage.
    pub fn square_footage(&self) -> i64 {
        self.base_square_footage + self.additional_square_footage
    }

    pub fn set_appraised_value(&mut self, value: Money) {
        self.appraised_value = value;
    }

    pub fn set_list_price(&mut self, price: Money) {
        self.list_price = price;
    }

    pub fn add_square_footage(&mut self, footage: i64) {
        self.additional_square_footage += footage;
    }

    /// Add an upgrade to the offer list, in `Planning`.
    pub fn offer_upgrade(&mut self, upgrade: PropertyUpgrade) {
        self.upgrades.push(upgrade);
    }

    /// One period of appreciation. The appraisal is unchanged on overflow.
    pub fn appreciate(&mut self) -> Result<(), EstateError> {
        self.appraised_value =
            valuation::appreciate(self.appraised_value, self.annual_appreciation_rate)?;
        Ok(())
    }

    /// `rent = appraised × rent multiplier × (1 − vacancy)`.
    pub fn update_rent(&mut self) {
        self.rent = valuation::rent(
            self.appraised_value,
            self.base_rent_multiplier,
            self.base_vacancy_rate,
        );
    }

    pub fn update_operating_expenses_rate(&mut self) {
        self.operating_expenses_rate = self.base_operating_expenses_rate;
    }

    /// `operating expenses = rent × expense rate`.
    pub fn update_operating_expenses(&mut self) {
        self.operating_expenses =
            valuation::operating_expenses(self.rent, self.operating_expenses_rate);
    }

    /// Re-derive rent and expenses from the current appraisal.
    pub fn recompute(&mut self) {
        self.update_rent();
        self.update_operating_expenses_rate();
        self.update_operating_expenses();
    }

    /// One period of valuation: appreciate, then recompute.
    pub fn revalue(&mut self) -> Result<(), EstateError> {
        self.appreciate()?;
        self.recompute();
        Ok(())
    }

    /// Pro-forma returns for buying at list price with the minimum down payment.
    pub fn estimate(&self, terms: &LendingTerms) -> ValuationReport {
        valuation::estimate(
            &EstimateInput {
                appraised_value: self.appraised_value,
                list_price: self.list_price,
                minimum_down_payment: self.minimum_down_payment,
                rent_multiplier: self.base_rent_multiplier,
                vacancy_rate: self.base_vacancy_rate,
                operating_expenses_rate: self.base_operating_expenses_rate,
            },
            terms,
        )
    }

    /// Take the property off the market under `loan`.
    pub fn mark_purchased(&mut self, loan: AmortizedLoan, price: Money) {
        self.loan = Some(loan);
        self.purchase_price = Some(price);
        self.is_for_sale = false;
    }

    /// Put the property back on the market at its whole appraised value.
    /// Returns the retired loan.
    pub fn mark_listed(&mut self) -> Option<AmortizedLoan> {
        self.is_for_sale = true;
        self.purchase_price = None;
        self.list_price = whole(self.appraised_value);
        self.loan.take()
    }

    /// Owner's proceeds from a sale at appraisal: appraised value less the loan.
    pub fn sale_profit(&self) -> Money {
        let balance = self
            .loan
            .as_ref()
            .map(AmortizedLoan::outstanding_balance)
            .unwrap_or(Decimal::ZERO);
        self.appraised_value - balance
    }

    /// Add to lifetime income; non-positive amounts are ignored.
    pub fn record_income(&mut self, amount: Money) {
        if amount > Decimal::ZERO {
            self.total_income += amount;
        }
    }

    pub fn record_expense(&mut self, amount: Money) {
        if amount > Decimal::ZERO {
            self.total_expenses += amount;
        }
    }

    fn upgrade_mut(&mut self, index: usize) -> Result<&mut PropertyUpgrade, EstateError> {
        self.upgrades
            .get_mut(index)
            .ok_or(EstateError::NoUpgrade { index })
    }

    /// Bump the appraisal for a finished upgrade. Returns the amount added.
    fn apply_completion(&mut self, index: usize) -> Money {
        let Some(upgrade) = self.upgrades.get(index) else {
            return Decimal::ZERO;
        };
        let bump = upgrade.kind().value_effect().bump(self.appraised_value);
        debug!(upgrade = upgrade.name(), bump = %bump, "upgrade complete");
        self.appraised_value += bump;
        bump
    }

    /// Price of the upgrade at `index`.
    pub fn upgrade_price(&self, index: usize) -> Result<Money, EstateError> {
        self.upgrades
            .get(index)
            .map(PropertyUpgrade::price)
            .ok_or(EstateError::NoUpgrade { index })
    }

    /// Move a planned upgrade under construction.
    pub fn start_upgrade(&mut self, index: usize) -> Result<(), EstateError> {
        self.upgrade_mut(index)?.start_construction()?;
        Ok(())
    }

    /// Finish an upgrade immediately and apply its value effect.
    pub fn complete_upgrade(&mut self, index: usize) -> Result<Money, EstateError> {
        match self.upgrade_mut(index)?.complete()? {
            Transition::Completed => Ok(self.apply_completion(index)),
            _ => Ok(Decimal::ZERO),
        }
    }

    /// Advance every upgrade under construction by one week. Returns how many
    /// completed.
    pub fn advance_upgrades(&mut self) -> usize {
        let mut finished = Vec::new();
        for (i, up) in self.upgrades.iter_mut().enumerate() {
            if up.state() != UpgradeState::UnderConstruction {
                continue;
            }
            if let Ok(Transition::Completed) = up.next() {
                finished.push(i);
            }
        }
        for &i in &finished {
            self.apply_completion(i);
        }
        finished.len()
    }
}
