//! Ledger logic for campaign funding
//!
//! The funding ledger has three cooperating pieces:
//! - Contribution recorder: persists one funding event per event id
//! - Campaign aggregator: running total and Active -> Fulfilled transition
//! - Milestone evaluator: marks ordered sub-goals reached
//!
//! The aggregator and evaluator live here as pure logic; the recorder and
//! the unit of work around all three belong to the store.

mod funding;

pub use funding::*;
