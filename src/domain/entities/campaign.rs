//! Campaign entity - a series of adventures, optionally set in a world

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CampaignId, ResourceId, UserId, WorldId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub owner_id: UserId,
    /// `None` for a standalone campaign
    pub world_id: Option<WorldId>,
    pub name: String,
    pub description: String,
    pub background: Option<ResourceId>,
    pub is_published: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(owner_id: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CampaignId::new(),
            owner_id,
            world_id: None,
            name: name.into(),
            description: description.into(),
            background: None,
            is_published: false,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_world(mut self, world_id: WorldId) -> Self {
        self.world_id = Some(world_id);
        self
    }

    pub fn is_standalone(&self) -> bool {
        self.world_id.is_none()
    }

    pub fn clone_for(&self, owner_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CampaignId::new(),
            owner_id,
            world_id: self.world_id,
            name: name.into(),
            description: self.description.clone(),
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
