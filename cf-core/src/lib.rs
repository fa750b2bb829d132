//! CF Core - crowdfunding funding ledger
//!
//! This crate provides the domain types, error taxonomy and pure ledger
//! logic shared by the storage, API and CLI crates:
//! - Campaigns, milestones, contributions, users and campaign updates
//! - The funding state machine (running total, fulfillment, milestones)
//! - Logging conventions for the workspace
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod ledger;
pub mod logging;
pub mod types;

pub use error::*;
pub use ledger::*;
pub use types::*;
