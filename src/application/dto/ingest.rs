use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GenerationPrompt;
use crate::domain::entities::AssetKind;
use crate::domain::services::AlternativeDefinition;
use crate::domain::value_objects::{AssetId, ResourceId};

/// One library asset to draft and generate art for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssetItem {
    pub name: String,
    pub kind: AssetKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub alternatives: AlternativeDefinition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAssetsRequest {
    pub items: Vec<IngestAssetItem>,
    #[serde(default)]
    pub style: Option<String>,
}

/// A started generation run and the assets it covers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestJobResponse {
    pub job_id: Uuid,
    pub item_count: usize,
    pub asset_ids: Vec<AssetId>,
    pub prompts: Vec<GenerationPrompt>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIdsRequest {
    pub asset_ids: Vec<AssetId>,
}

/// Send an asset back for generation with a corrected prompt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectAssetItem {
    pub asset_id: AssetId,
    pub ai_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectAssetsRequest {
    pub items: Vec<RejectAssetItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatchFailure {
    pub asset_id: AssetId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatchResponse {
    pub succeeded_ids: Vec<AssetId>,
    pub failures: Vec<IngestBatchFailure>,
}

/// Art produced for one asset by the generation worker; missing parts failed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResultRequest {
    #[serde(default)]
    pub portrait: Option<ResourceId>,
    #[serde(default)]
    pub token: Option<ResourceId>,
}
