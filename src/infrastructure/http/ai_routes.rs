//! AI generation API routes

use std::sync::Arc;

use axum::{extract::State, Json};

use super::ApiResult;
use crate::application::dto::{BulkGenerationRequest, GenerationPrompt};
use crate::application::ports::outbound::{CompletionRequest, CompletionResponse};
use crate::application::services::AiService;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

/// Expand templates into one prompt per variant
pub async fn bulk_prompts(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Json(req): Json<BulkGenerationRequest>,
) -> ApiResult<Json<Vec<GenerationPrompt>>> {
    Ok(Json(state.ai_service.bulk_prompts(&req)?))
}

pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CompletionRequest>,
) -> ApiResult<Json<CompletionResponse>> {
    Ok(Json(state.ai_service.generate_text(user.id, req).await?))
}
