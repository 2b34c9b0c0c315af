//! Scene entity - a narrative beat inside an adventure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AdventureId, SceneId, StageId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    /// Copied from the parent adventure
    pub owner_id: UserId,
    pub adventure_id: AdventureId,
    pub name: String,
    pub description: String,
    pub stage_id: Option<StageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scene {
    pub fn new(
        owner_id: UserId,
        adventure_id: AdventureId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SceneId::new(),
            owner_id,
            adventure_id,
            name: name.into(),
            description: description.into(),
            stage_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy attached to `adventure_id`
    pub fn clone_into(&self, owner_id: UserId, adventure_id: AdventureId, name: impl Into<String>) -> Self {
        Scene::new(owner_id, adventure_id, name, self.description.clone()).with_stage(self.stage_id)
    }

    pub fn with_stage(mut self, stage_id: Option<StageId>) -> Self {
        self.stage_id = stage_id;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
