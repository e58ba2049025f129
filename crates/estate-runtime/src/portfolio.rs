//! The player's ledger: cash, aggregates, and every property in play.
//!
//! Listings and owned properties share one id-ordered map; a property's
//! `is_for_sale` flag decides which side it is on. Loans live on their
//! properties and are only exposed read-only here.

use crate::lender::Lender;
use estate_core::{EstateError, Money, PropertyId, UpgradeEvent};
use estate_finance::AmortizedLoan;
use estate_market::{transition, Property};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Wallet, running totals and every property, listed or owned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Portfolio {
    wallet: Money,
    net_worth: Money,
    weekly_income: Money,
    weekly_expenses: Money,
    total_income: Money,
    total_expenses: Money,
    properties: BTreeMap<PropertyId, Property>,
    next_id: u64,
}

/// Headline figures for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub wallet: Money,
    pub net_worth: Money,
    pub weekly_income: Money,
    pub weekly_expenses: Money,
    pub total_income: Money,
    pub total_expenses: Money,
    pub owned: usize,
    pub listed: usize,
    pub debt: Money,
}

impl Portfolio {
    /// Empty portfolio holding `wallet` in cash.
    pub fn new(wallet: Money) -> Self {
        let mut p = Self {
            wallet,
            ..Self::default()
        };
        p.update_aggregates();
        p
    }

    /// Cash on hand.
    pub fn wallet(&self) -> Money {
        self.wallet
    }

    /// Wallet plus equity in owned properties, as of the last aggregate update.
    pub fn net_worth(&self) -> Money {
        self.net_worth
    }

    /// Rent across owned properties per period.
    pub fn weekly_income(&self) -> Money {
        self.weekly_income
    }

    /// Operating expenses plus loan payments due per period.
    pub fn weekly_expenses(&self) -> Money {
        self.weekly_expenses
    }

    /// Lifetime income; never decreases.
    pub fn total_income(&self) -> Money {
        self.total_income
    }

    /// Lifetime expenses, including upgrade purchases; never decreases.
    pub fn total_expenses(&self) -> Money {
        self.total_expenses
    }

    /// Credit the wallet.
    pub fn add_funds(&mut self, amount: Money) {
        self.wallet += amount;
    }

    /// Debit the wallet. Fails without change when the wallet cannot cover it.
    pub fn remove_funds(&mut self, amount: Money) -> Result<(), EstateError> {
        if amount < Decimal::ZERO {
            return Err(EstateError::InvalidAmount {
                what: "withdrawal",
                amount,
            });
        }
        if self.wallet < amount {
            return Err(EstateError::InsufficientFunds {
                needed: amount,
                available: self.wallet,
            });
        }
        self.wallet -= amount;
        Ok(())
    }

    /// Add to lifetime income. Non-positive amounts are ignored.
    pub fn add_total_income(&mut self, amount: Money) {
        if amount > Decimal::ZERO {
            self.total_income += amount;
        }
    }

    /// Add to lifetime expenses. Non-positive amounts are ignored.
    pub fn add_total_expenses(&mut self, amount: Money) {
        if amount > Decimal::ZERO {
            self.total_expenses += amount;
        }
    }

    /// Roll net worth and per-period cash flow up from owned properties.
    pub fn update_aggregates(&mut self) {
        let mut equity = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for p in self.properties.values().filter(|p| !p.is_for_sale()) {
            let (balance, payment) = p
                .loan()
                .map(|l| (l.outstanding_balance(), l.minimum_payment()))
                .unwrap_or_default();
            equity += p.appraised_value() - balance;
            income += p.rent();
            expenses += p.operating_expenses() + payment;
        }
        self.net_worth = self.wallet + equity;
        self.weekly_income = income;
        self.weekly_expenses = expenses;
    }

    /// Put a new property on the market and return its handle.
    pub fn list_property(&mut self, property: Property) -> PropertyId {
        let id = PropertyId(self.next_id);
        self.next_id += 1;
        debug!(property = %id, list = %property.list_price(), "listed");
        self.properties.insert(id, property);
        id
    }

    /// Look up a listing or owned property.
    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    /// Every property in id order.
    pub fn properties(&self) -> impl Iterator<Item = (PropertyId, &Property)> + '_ {
        self.properties.iter().map(|(id, p)| (*id, p))
    }

    /// Properties held, in id order.
    pub fn owned(&self) -> impl Iterator<Item = (PropertyId, &Property)> + '_ {
        self.properties().filter(|(_, p)| !p.is_for_sale())
    }

    /// Properties on the market, in id order.
    pub fn listings(&self) -> impl Iterator<Item = (PropertyId, &Property)> + '_ {
        self.properties().filter(|(_, p)| p.is_for_sale())
    }

    /// Outstanding loans keyed by the property they finance.
    pub fn loans(&self) -> impl Iterator<Item = (PropertyId, &AmortizedLoan)> + '_ {
        self.properties()
            .filter_map(|(id, p)| p.loan().map(|l| (id, l)))
    }

    /// Headline figures; counts and debt are read live.
    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            wallet: self.wallet,
            net_worth: self.net_worth,
            weekly_income: self.weekly_income,
            weekly_expenses: self.weekly_expenses,
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            owned: self.owned().count(),
            listed: self.listings().count(),
            debt: self.loans().map(|(_, l)| l.outstanding_balance()).sum(),
        }
    }

    pub(crate) fn ids(&self) -> Vec<PropertyId> {
        self.properties.keys().copied().collect()
    }

    fn get(&self, id: PropertyId) -> Result<&Property, EstateError> {
        self.properties
            .get(&id)
            .ok_or(EstateError::UnknownProperty(id))
    }

    pub(crate) fn get_mut(&mut self, id: PropertyId) -> Result<&mut Property, EstateError> {
        self.properties
            .get_mut(&id)
            .ok_or(EstateError::UnknownProperty(id))
    }

    fn get_owned_mut(&mut self, id: PropertyId) -> Result<&mut Property, EstateError> {
        let p = self.get_mut(id)?;
        if p.is_for_sale() {
            return Err(EstateError::NotOwned(id));
        }
        Ok(p)
    }

    /// Buy a listing at `offer_price`, paying `down_payment` in cash and
    /// financing the rest with `lender`.
    pub fn purchase(
        &mut self,
        id: PropertyId,
        offer_price: Money,
        down_payment: Money,
        lender: &Lender,
    ) -> Result<(), EstateError> {
        if !self.get(id)?.is_for_sale() {
            return Err(EstateError::NotForSale(id));
        }
        if offer_price <= Decimal::ZERO {
            return Err(EstateError::InvalidAmount {
                what: "offer_price",
                amount: offer_price,
            });
        }
        if down_payment < Decimal::ZERO {
            return Err(EstateError::InvalidAmount {
                what: "down_payment",
                amount: down_payment,
            });
        }
        self.remove_funds(down_payment)?;
        let loan = lender.issue(offer_price, down_payment);
        self.get_mut(id)?.mark_purchased(loan, offer_price);
        self.update_aggregates();
        info!(property = %id, price = %offer_price, down = %down_payment, "purchased");
        Ok(())
    }

    /// Sell an owned property at its appraised value. The loan is paid off
    /// from the proceeds; returns the profit, which may be negative.
    pub fn sell(&mut self, id: PropertyId) -> Result<Money, EstateError> {
        let profit = self.get_owned_mut(id)?.sale_profit();
        if profit >= Decimal::ZERO {
            self.add_funds(profit);
        } else {
            self.remove_funds(-profit)?;
        }
        self.get_mut(id)?.mark_listed();
        self.update_aggregates();
        info!(property = %id, profit = %profit, "sold");
        Ok(profit)
    }

    /// Pay for and begin construction of the upgrade at `index`.
    pub fn start_upgrade(&mut self, id: PropertyId, index: usize) -> Result<(), EstateError> {
        let property = self.get_owned_mut(id)?;
        let upgrade = property
            .upgrades()
            .get(index)
            .ok_or(EstateError::NoUpgrade { index })?;
        transition(
            upgrade.state(),
            upgrade.remaining_weeks_to_complete(),
            UpgradeEvent::StartConstruction,
        )?;
        let price = upgrade.price();
        self.remove_funds(price)?;
        self.add_total_expenses(price);
        let property = self.get_mut(id)?;
        property.start_upgrade(index)?;
        property.record_expense(price);
        info!(property = %id, upgrade = index, price = %price, "upgrade started");
        Ok(())
    }

    /// Finish an upgrade immediately, skipping construction. Returns the
    /// value it added.
    pub fn complete_upgrade(&mut self, id: PropertyId, index: usize) -> Result<Money, EstateError> {
        let bump = self.get_mut(id)?.complete_upgrade(index)?;
        self.update_aggregates();
        info!(property = %id, upgrade = index, bump = %bump, "upgrade completed");
        Ok(bump)
    }

    /// Pay down a loan from the wallet. Returns the amount applied, which is
    /// capped at the outstanding balance.
    pub fn make_principal_payment(&mut self, id: PropertyId, amount: Money) -> Result<Money, EstateError> {
        if amount <= Decimal::ZERO {
            return Err(EstateError::InvalidAmount {
                what: "principal_payment",
                amount,
            });
        }
        let balance = self
            .get_owned_mut(id)?
            .loan()
            .map(AmortizedLoan::outstanding_balance)
            .ok_or(EstateError::NotOwned(id))?;
        let applied = amount.min(balance.max(Decimal::ZERO));
        self.remove_funds(applied)?;
        if let Some(loan) = self.get_mut(id)?.loan_mut() {
            loan.make_principal_payment(applied);
        }
        self.update_aggregates();
        debug!(property = %id, applied = %applied, "principal payment");
        Ok(applied)
    }
}
