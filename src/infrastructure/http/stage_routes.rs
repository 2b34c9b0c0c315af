//! Stage API routes
//!
//! Walls, regions, lights, decorations and sounds share one set of generic
//! handlers instantiated per structure type.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use super::ApiResult;
use crate::application::dto::{CreateStageRequest, UpdateStageRequest};
use crate::application::services::StageService;
use crate::domain::entities::{Stage, StageStructure};
use crate::domain::value_objects::StageId;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn list_stages(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Stage>>> {
    Ok(Json(state.stage_service.list_stages(user.id).await?))
}

pub async fn create_stage(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateStageRequest>,
) -> ApiResult<(StatusCode, Json<Stage>)> {
    let stage = state.stage_service.create_stage(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

pub async fn get_stage(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StageId>,
) -> ApiResult<Json<Stage>> {
    Ok(Json(state.stage_service.get_stage(user.id, id).await?))
}

pub async fn update_stage(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StageId>,
    Json(req): Json<UpdateStageRequest>,
) -> ApiResult<Json<Stage>> {
    Ok(Json(state.stage_service.update_stage(user.id, id, req).await?))
}

pub async fn delete_stage(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StageId>,
) -> ApiResult<StatusCode> {
    state.stage_service.delete_stage(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_stage(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StageId>,
) -> ApiResult<(StatusCode, Json<Stage>)> {
    let clone = state.stage_service.clone_stage(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn add_structure<T>(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StageId>,
    Json(item): Json<T>,
) -> ApiResult<(StatusCode, Json<T>)>
where
    T: StageStructure + Serialize + DeserializeOwned,
{
    let added = state.stage_service.add_structure(user.id, id, item).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

pub async fn update_structure<T>(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, index)): Path<(StageId, u32)>,
    Json(item): Json<T>,
) -> ApiResult<Json<T>>
where
    T: StageStructure + Serialize + DeserializeOwned,
{
    Ok(Json(
        state
            .stage_service
            .update_structure(user.id, id, index, item)
            .await?,
    ))
}

pub async fn remove_structure<T>(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, index)): Path<(StageId, u32)>,
) -> ApiResult<StatusCode>
where
    T: StageStructure,
{
    state
        .stage_service
        .remove_structure::<T>(user.id, id, index)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
