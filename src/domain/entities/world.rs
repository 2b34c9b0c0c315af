//! World entity - the top of the content hierarchy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ResourceId, UserId, WorldId};

/// A setting that groups campaigns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: WorldId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub background: Option<ResourceId>,
    pub is_published: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl World {
    pub fn new(owner_id: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorldId::new(),
            owner_id,
            name: name.into(),
            description: description.into(),
            background: None,
            is_published: false,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy owned by `owner`, starting life as a private draft
    pub fn clone_for(&self, owner_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorldId::new(),
            owner_id,
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
