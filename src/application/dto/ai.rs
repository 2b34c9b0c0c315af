use serde::{Deserialize, Serialize};

use crate::domain::entities::AssetKind;
use crate::domain::services::AlternativeDefinition;

/// An asset to generate art for, with the alternatives to vary
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTemplate {
    pub name: String,
    pub kind: AssetKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub alternatives: AlternativeDefinition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkGenerationRequest {
    pub templates: Vec<AssetTemplate>,
    /// Appended to every prompt, e.g. "top-down token, painterly"
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPrompt {
    pub template_name: String,
    pub variant_id: String,
    pub prompt: String,
}
