//! Ledger service implementations
//!
//! Services sit between callers and [`LedgerStore`](crate::store::LedgerStore):
//! they validate raw input, wrap store calls in the retry policy and log
//! state changes.

pub mod achievement_service;
pub mod campaign_service;
pub mod funding_service;
pub mod user_service;

pub use achievement_service::AchievementService;
pub use campaign_service::{CampaignQuery, CampaignService};
pub use funding_service::FundingService;
pub use user_service::UserService;
