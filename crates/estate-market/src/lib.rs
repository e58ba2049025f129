#![deny(warnings)]

//! Property market for Estate Tycoon: listings, their upgrades, and the
//! procedural generator that fills zones with them.

pub mod generator;
pub mod neighborhood;
pub mod property;
pub mod upgrade;

pub use generator::PropertyGenerator;
pub use neighborhood::{allocate_ratings, generate_neighborhood};
pub use property::Property;
pub use upgrade::{transition, PropertyUpgrade, Transition, UpgradeKind, ValueEffect};
