//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::campaign::Campaign;
use super::common::WalletAddress;

/// User keyed by normalized wallet address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub wallet_address: WalletAddress,
    pub email: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(wallet_address: WalletAddress, profile: &ProfileUpdate, at: DateTime<Utc>) -> Self {
        Self {
            wallet_address,
            email: profile.email.clone(),
            username: profile.username.clone(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Apply the provided profile fields; returns whether anything changed
    pub fn apply(&mut self, profile: &ProfileUpdate, at: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(email) = &profile.email {
            if self.email.as_ref() != Some(email) {
                self.email = Some(email.clone());
                changed = true;
            }
        }
        if let Some(username) = &profile.username {
            if self.username.as_ref() != Some(username) {
                self.username = Some(username.clone());
                changed = true;
            }
        }
        if changed {
            self.updated_at = at;
        }
        changed
    }
}

/// Optional profile fields supplied on wallet connect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
}

/// User with owned campaigns and activity counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    /// Newest first
    pub campaigns: Vec<Campaign>,
    pub campaign_count: u64,
    pub contribution_count: u64,
}
