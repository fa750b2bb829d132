//! Application state for the API server

use cf_db::{
    AchievementService, CampaignService, FundingService, LedgerDatabase, UserService,
};
use std::env;

/// API server state
#[derive(Clone)]
pub struct AppState {
    pub database: LedgerDatabase,
    /// API version
    pub version: String,
}

impl AppState {
    pub fn new(database: LedgerDatabase) -> Self {
        Self {
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn funding(&self) -> &FundingService {
        &self.database.funding
    }

    pub fn campaigns(&self) -> &CampaignService {
        &self.database.campaigns
    }

    pub fn users(&self) -> &UserService {
        &self.database.users
    }

    pub fn achievements(&self) -> &AchievementService {
        &self.database.achievements
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - CF_API_HOST
    /// - CF_API_PORT
    /// - CF_API_CORS: true/false
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("CF_API_HOST").unwrap_or(defaults.host),
            port: env::var("CF_API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: env::var("CF_API_CORS")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.enable_cors),
        }
    }
}
