#![deny(warnings)]

//! Turn runtime for Estate Tycoon.
//!
//! Owns the player's portfolio, the lender, and the settlement engine that
//! advances every property once per period. `Simulation` ties them to a
//! calendar date.

pub mod lender;
pub mod portfolio;
pub mod settlement;
pub mod simulation;

pub use lender::Lender;
pub use portfolio::{Portfolio, PortfolioSummary};
pub use settlement::{SettlementEngine, SettlementReport};
pub use simulation::Simulation;
