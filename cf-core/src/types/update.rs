//! Campaign update (news post) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{CampaignId, UpdateId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    pub id: UpdateId,
    pub campaign_id: CampaignId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CampaignUpdate {
    pub fn new(campaign_id: CampaignId, title: String, content: String, at: DateTime<Utc>) -> Self {
        Self {
            id: UpdateId::generate(),
            campaign_id,
            title,
            content,
            created_at: at,
        }
    }
}
