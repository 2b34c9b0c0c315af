//! Scene API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::UpdateSceneRequest;
use crate::application::services::SceneService;
use crate::domain::entities::Scene;
use crate::domain::value_objects::SceneId;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn get_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<SceneId>,
) -> ApiResult<Json<Scene>> {
    Ok(Json(state.scene_service.get_scene(user.id, id).await?))
}

pub async fn update_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<SceneId>,
    Json(req): Json<UpdateSceneRequest>,
) -> ApiResult<Json<Scene>> {
    Ok(Json(state.scene_service.update_scene(user.id, id, req).await?))
}

pub async fn delete_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<SceneId>,
) -> ApiResult<StatusCode> {
    state.scene_service.delete_scene(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<SceneId>,
) -> ApiResult<(StatusCode, Json<Scene>)> {
    let clone = state.scene_service.clone_scene(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}
