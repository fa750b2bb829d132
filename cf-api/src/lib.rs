//! CF API Server
//!
//! REST API for the crowdfunding ledger. JSON bodies are camelCase and
//! token amounts travel as base-10 strings.
//!
//! ## Endpoints
//!
//! ### Service
//! - GET /health - Liveness
//! - GET /ready - Readiness (pings the store)
//!
//! ### Wallet Auth
//! - POST /api/v1/auth - Connect wallet (create or update user)
//! - GET /api/v1/auth?walletAddress= - User profile
//!
//! ### Campaigns
//! - POST /api/v1/campaigns - Create campaign with milestones
//! - GET /api/v1/campaigns - List campaigns (status, creatorWallet, excludeFulfilled)
//! - GET /api/v1/campaigns/:id - Campaign detail
//! - PATCH /api/v1/campaigns/:id - Owner edit
//! - DELETE /api/v1/campaigns/:id - Delete campaign without contributions
//! - POST /api/v1/campaigns/:id/close - Close campaign
//! - POST /api/v1/campaigns/:id/updates - Post news update
//!
//! ### Contributions
//! - POST /api/v1/transactions - Record contribution
//! - GET /api/v1/transactions - List contributions (campaignId, donorWallet)
//!
//! ### Achievements
//! - GET /api/v1/achievements/user?wallet= - Fulfilled campaigns of a creator

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use dto::*;
pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
