//! World API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{CreateCampaignRequest, CreateWorldRequest, UpdateWorldRequest};
use crate::application::services::WorldService;
use crate::domain::entities::{Campaign, World};
use crate::domain::value_objects::{CampaignId, WorldId};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

/// List worlds visible to the caller
pub async fn list_worlds(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<World>>> {
    Ok(Json(state.world_service.list_worlds(user.id).await?))
}

pub async fn create_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateWorldRequest>,
) -> ApiResult<(StatusCode, Json<World>)> {
    let world = state.world_service.create_world(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(world)))
}

pub async fn get_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
) -> ApiResult<Json<World>> {
    Ok(Json(state.world_service.get_world(user.id, id).await?))
}

pub async fn update_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
    Json(req): Json<UpdateWorldRequest>,
) -> ApiResult<Json<World>> {
    Ok(Json(state.world_service.update_world(user.id, id, req).await?))
}

pub async fn delete_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
) -> ApiResult<StatusCode> {
    state.world_service.delete_world(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_world(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
) -> ApiResult<(StatusCode, Json<World>)> {
    let clone = state.world_service.clone_world(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
) -> ApiResult<Json<Vec<Campaign>>> {
    Ok(Json(state.world_service.list_campaigns(user.id, id).await?))
}

pub async fn add_new_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<WorldId>,
    Json(req): Json<CreateCampaignRequest>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let campaign = state.world_service.add_new_campaign(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn add_cloned_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, campaign_id)): Path<(WorldId, CampaignId)>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let campaign = state
        .world_service
        .add_cloned_campaign(user.id, id, campaign_id)
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn remove_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, campaign_id)): Path<(WorldId, CampaignId)>,
) -> ApiResult<StatusCode> {
    state.world_service.remove_campaign(user.id, id, campaign_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
