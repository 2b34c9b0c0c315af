//! Adventure entity - a playable storyline made of scenes and encounters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AdventureId, CampaignId, ResourceId, UserId};

/// Play style of an adventure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdventureStyle {
    #[default]
    Generic,
    OpenWorld,
    DungeonCrawl,
    HackNSlash,
    Survival,
    GoalDriven,
    RandomlyGenerated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adventure {
    pub id: AdventureId,
    pub owner_id: UserId,
    /// `None` for a standalone adventure
    pub campaign_id: Option<CampaignId>,
    pub name: String,
    pub description: String,
    pub style: AdventureStyle,
    pub is_one_shot: bool,
    pub background: Option<ResourceId>,
    pub is_published: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Adventure {
    pub fn new(owner_id: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AdventureId::new(),
            owner_id,
            campaign_id: None,
            name: name.into(),
            description: description.into(),
            style: AdventureStyle::default(),
            is_one_shot: false,
            background: None,
            is_published: false,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_style(mut self, style: AdventureStyle) -> Self {
        self.style = style;
        self
    }

    pub fn clone_for(&self, owner_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AdventureId::new(),
            owner_id,
            campaign_id: self.campaign_id,
            name: name.into(),
            description: self.description.clone(),
            style: self.style,
            is_one_shot: self.is_one_shot,
            background: self.background,
            is_published: false,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
