use serde::Deserialize;

use super::nullable;
use crate::domain::entities::{AdventureStyle, AmbientLight, AssetKind, Weather};
use crate::domain::value_objects::{
    AssetId, CampaignId, Grid, Point, ResourceId, Size, StageId, UserId, WorldId,
};

// =============================================================================
// Worlds and campaigns
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorldRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background: Option<ResourceId>,
}

/// Partial update shared by worlds and campaigns
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorldRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub background: Option<Option<ResourceId>>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
}

pub type UpdateCampaignRequest = UpdateWorldRequest;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background: Option<ResourceId>,
    #[serde(default)]
    pub world_id: Option<WorldId>,
}

// =============================================================================
// Adventures, scenes and encounters
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdventureRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub style: AdventureStyle,
    #[serde(default)]
    pub is_one_shot: bool,
    #[serde(default)]
    pub background: Option<ResourceId>,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdventureRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub style: Option<AdventureStyle>,
    pub is_one_shot: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub background: Option<Option<ResourceId>>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSceneRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stage_id: Option<StageId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSceneRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub stage_id: Option<Option<StageId>>,
}

pub type CreateEncounterRequest = CreateSceneRequest;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEncounterRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub stage_id: Option<Option<StageId>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEncounterAssetRequest {
    pub asset_id: AssetId,
    /// Defaults to the asset's name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<ResourceId>,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEncounterAssetRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<ResourceId>>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub elevation: Option<f64>,
    pub is_locked: Option<bool>,
    pub is_visible: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub controlled_by: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterAssetPatch {
    pub index: u32,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateEncounterAssetsRequest {
    pub updates: Vec<EncounterAssetPatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndicesRequest {
    pub indices: Vec<u32>,
}

// =============================================================================
// Stages
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStageRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSettingsPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub main_background: Option<Option<ResourceId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub alternate_background: Option<Option<ResourceId>>,
    pub use_alternate_background: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub ambient_sound: Option<Option<ResourceId>>,
    pub ambient_sound_volume: Option<f64>,
    pub ambient_sound_loop: Option<bool>,
    pub ambient_sound_is_playing: Option<bool>,
    pub ambient_light: Option<AmbientLight>,
    pub weather: Option<Weather>,
    pub zoom_level: Option<f64>,
    pub panning: Option<Point>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
    pub grid: Option<Grid>,
    pub settings: Option<StageSettingsPatch>,
}

// =============================================================================
// Assets
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub kind: AssetKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub portrait: Option<ResourceId>,
    #[serde(default)]
    pub token: Option<ResourceId>,
    #[serde(default)]
    pub size: Size,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<AssetKind>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub portrait: Option<Option<ResourceId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub token: Option<Option<ResourceId>>,
    pub size: Option<Size>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFilter {
    pub kind: Option<AssetKind>,
    pub search: Option<String>,
}
