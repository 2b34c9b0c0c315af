//! Encounter entity - a tactical situation with placed asset instances

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    AdventureId, AssetId, EncounterId, Point, ResourceId, Size, StageId, UserId,
};

use super::{next_index, AssetKind};

static INSTANCE_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r" #(?P<number>\d+)$").ok());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: EncounterId,
    /// Copied from the parent adventure
    pub owner_id: UserId,
    pub adventure_id: AdventureId,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub stage_id: Option<StageId>,
    pub assets: Vec<EncounterAsset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An asset placed on the encounter map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterAsset {
    pub index: u32,
    pub asset_id: AssetId,
    pub name: String,
    pub image: Option<ResourceId>,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub elevation: f64,
    pub is_locked: bool,
    pub is_visible: bool,
    pub controlled_by: Option<UserId>,
    pub notes: Option<String>,
}

impl Encounter {
    pub fn new(
        owner_id: UserId,
        adventure_id: AdventureId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EncounterId::new(),
            owner_id,
            adventure_id,
            name: name.into(),
            description: description.into(),
            is_published: false,
            stage_id: None,
            assets: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft copy attached to `adventure_id`, keeping placed assets as-is
    pub fn clone_into(&self, owner_id: UserId, adventure_id: AdventureId, name: impl Into<String>) -> Self {
        let mut copy = Encounter::new(owner_id, adventure_id, name, self.description.clone());
        copy.stage_id = self.stage_id;
        copy.assets = self.assets.clone();
        copy
    }

    pub fn next_asset_index(&self) -> u32 {
        next_index(&self.assets)
    }

    /// Next `#n` for instances whose names start with `prefix`
    pub fn next_instance_number(&self, prefix: &str) -> u32 {
        self.assets
            .iter()
            .map(|a| instance_number(&a.name, prefix))
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn asset(&self, index: u32) -> Option<&EncounterAsset> {
        self.assets.iter().find(|a| a.index == index)
    }

    pub fn asset_mut(&mut self, index: u32) -> Option<&mut EncounterAsset> {
        self.assets.iter_mut().find(|a| a.index == index)
    }

    /// Indices from `requested` that do not exist, in request order
    pub fn missing_asset_indices(&self, requested: &[u32]) -> Vec<u32> {
        let mut missing: Vec<u32> = Vec::new();
        for index in requested {
            if self.asset(*index).is_none() && !missing.contains(index) {
                missing.push(*index);
            }
        }
        missing
    }

    /// Copy of the instance at `index`, renumbered and handed to `controller`
    pub fn clone_asset(&self, index: u32, controller: UserId) -> Option<EncounterAsset> {
        let source = self.asset(index)?;
        let base = base_instance_name(&source.name);
        let number = self.next_instance_number(base);
        Some(EncounterAsset {
            index: self.next_asset_index(),
            name: format!("{} #{}", base, number),
            position: Point::ORIGIN,
            is_locked: false,
            controlled_by: Some(controller),
            ..source.clone()
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Name for a newly placed instance; creatures get a running number
pub fn instance_name(kind: AssetKind, name: &str, number: u32) -> String {
    match kind {
        AssetKind::Creature => format!("{} #{}", name, number),
        _ => name.to_string(),
    }
}

/// Number suffix of `name` when it belongs to the `prefix` family, else 0
pub fn instance_number(name: &str, prefix: &str) -> u32 {
    if name.is_empty() || !name.starts_with(prefix) {
        return 0;
    }
    INSTANCE_NUMBER
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|c| c.name("number"))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Instance name with any trailing `#n` removed
pub fn base_instance_name(name: &str) -> &str {
    match INSTANCE_NUMBER.as_ref().and_then(|re| re.find(name)) {
        Some(m) => name[..m.start()].trim_end(),
        None => name,
    }
}
