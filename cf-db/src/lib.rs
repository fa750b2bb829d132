//! CF DB - storage layer for the crowdfunding ledger
//!
//! Persists campaigns, milestones, contributions, users and campaign
//! updates behind the [`LedgerStore`] trait, with an in-memory and a sled
//! implementation. Services on top validate input, apply the transient
//! fault retry policy and log state changes.
//!
//! # Usage
//!
//! ```ignore
//! use cf_db::{LedgerDatabase, RetryConfig, StoreConfig};
//!
//! async fn example() {
//!     let db = LedgerDatabase::open(StoreConfig::sled("./data"), &RetryConfig::default()).unwrap();
//!     let receipt = db.funding.record(&input).await?;
//!     db.shutdown().await?;
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod retry;
pub mod services;
pub mod store;
pub mod validation;

pub use config::{RetryConfig, StoreBackend, StoreConfig};
pub use database::LedgerDatabase;
pub use error::{DbError, DbResult};
pub use retry::{RetryPolicy, TransientFailurePolicy};
pub use services::{AchievementService, CampaignQuery, CampaignService, FundingService, UserService};
pub use store::{open_store, LedgerStore, MemoryLedgerStore, SledLedgerStore};
pub use validation::{
    CampaignInput, CampaignPatchInput, ContributionInput, MilestoneInput,
};
