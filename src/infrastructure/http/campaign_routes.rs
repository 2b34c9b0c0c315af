//! Campaign API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{CreateAdventureRequest, CreateCampaignRequest, UpdateCampaignRequest};
use crate::application::services::CampaignService;
use crate::domain::entities::{Adventure, Campaign};
use crate::domain::value_objects::{AdventureId, CampaignId, WorldId};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Campaign>>> {
    Ok(Json(state.campaign_service.list_campaigns(user.id).await?))
}

pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateCampaignRequest>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let campaign = state.campaign_service.create_campaign(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
) -> ApiResult<Json<Campaign>> {
    Ok(Json(state.campaign_service.get_campaign(user.id, id).await?))
}

pub async fn update_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
    Json(req): Json<UpdateCampaignRequest>,
) -> ApiResult<Json<Campaign>> {
    Ok(Json(state.campaign_service.update_campaign(user.id, id, req).await?))
}

pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
) -> ApiResult<StatusCode> {
    state.campaign_service.delete_campaign(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let clone = state.campaign_service.clone_campaign(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn list_adventures(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
) -> ApiResult<Json<Vec<Adventure>>> {
    Ok(Json(state.campaign_service.list_adventures(user.id, id).await?))
}

pub async fn add_new_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
    Json(req): Json<CreateAdventureRequest>,
) -> ApiResult<(StatusCode, Json<Adventure>)> {
    let adventure = state.campaign_service.add_new_adventure(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(adventure)))
}

pub async fn add_cloned_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, adventure_id)): Path<(CampaignId, AdventureId)>,
) -> ApiResult<(StatusCode, Json<Adventure>)> {
    let adventure = state
        .campaign_service
        .add_cloned_adventure(user.id, id, adventure_id)
        .await?;
    Ok((StatusCode::CREATED, Json(adventure)))
}

pub async fn remove_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, adventure_id)): Path<(CampaignId, AdventureId)>,
) -> ApiResult<StatusCode> {
    state
        .campaign_service
        .remove_adventure(user.id, id, adventure_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a campaign into another world
pub async fn move_to_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, world_id)): Path<(CampaignId, WorldId)>,
) -> ApiResult<Json<Campaign>> {
    Ok(Json(state.campaign_service.move_to_world(user.id, id, world_id).await?))
}

pub async fn make_standalone(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<CampaignId>,
) -> ApiResult<Json<Campaign>> {
    Ok(Json(state.campaign_service.make_standalone(user.id, id).await?))
}
