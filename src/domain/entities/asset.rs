//! Asset entity - reusable templates placed into encounters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AssetId, ResourceId, Size, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Character,
    Creature,
    Object,
    Effect,
}

/// Where a library asset is in the art generation and review pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngestStatus {
    Pending,
    Processing,
    PendingReview,
    PartialFailure,
    Failed,
    Approved,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub owner_id: UserId,
    pub kind: AssetKind,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub portrait: Option<ResourceId>,
    pub token: Option<ResourceId>,
    /// Footprint in grid cells
    pub size: Size,
    pub is_published: bool,
    pub is_public: bool,
    /// Set only for assets created through the ingest pipeline
    #[serde(default)]
    pub ingest_status: Option<IngestStatus>,
    /// Prompt the current art was generated from
    #[serde(default)]
    pub ai_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(owner_id: UserId, kind: AssetKind, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AssetId::new(),
            owner_id,
            kind,
            name: name.into(),
            description: String::new(),
            category: None,
            tags: Vec::new(),
            portrait: None,
            token: None,
            size: Size::default(),
            is_published: false,
            is_public: false,
            ingest_status: None,
            ai_prompt: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn clone_for(&self, owner_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AssetId::new(),
            owner_id,
            name: name.into(),
            is_published: false,
            is_public: false,
            ingest_status: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Case-insensitive match against name, description and tags
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    pub fn is_discarded(&self) -> bool {
        self.ingest_status == Some(IngestStatus::Discarded)
    }

    /// Outcome of a generation run: review when all art arrived, failed when none did
    pub fn record_generation(&mut self, portrait: Option<ResourceId>, token: Option<ResourceId>) {
        if portrait.is_some() {
            self.portrait = portrait;
        }
        if token.is_some() {
            self.token = token;
        }
        self.ingest_status = Some(match (self.portrait.is_some(), self.token.is_some()) {
            (true, true) => IngestStatus::PendingReview,
            (false, false) => IngestStatus::Failed,
            _ => IngestStatus::PartialFailure,
        });
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_matches_tags_case_insensitively() {
        let mut asset = Asset::new(UserId::new(), AssetKind::Creature, "Goblin");
        asset.tags = vec!["Humanoid".to_string()];

        assert!(asset.matches("gob"));
        assert!(asset.matches("HUMAN"));
        assert!(asset.matches("  "));
        assert!(!asset.matches("dragon"));
    }

    #[test]
    fn test_generation_outcome_sets_ingest_status() {
        let mut asset = Asset::new(UserId::new(), AssetKind::Creature, "Wyvern");
        asset.ingest_status = Some(IngestStatus::Processing);

        asset.record_generation(None, None);
        assert_eq!(asset.ingest_status, Some(IngestStatus::Failed));

        asset.record_generation(Some(ResourceId::new()), None);
        assert_eq!(asset.ingest_status, Some(IngestStatus::PartialFailure));

        asset.record_generation(None, Some(ResourceId::new()));
        assert_eq!(asset.ingest_status, Some(IngestStatus::PendingReview));
        assert!(asset.portrait.is_some());
    }
}
