//! Adventure API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{
    CreateAdventureRequest, CreateEncounterRequest, CreateSceneRequest, UpdateAdventureRequest,
};
use crate::application::services::AdventureService;
use crate::domain::entities::{Adventure, Encounter, Scene};
use crate::domain::value_objects::{AdventureId, CampaignId};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn list_adventures(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Adventure>>> {
    Ok(Json(state.adventure_service.list_adventures(user.id).await?))
}

pub async fn create_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateAdventureRequest>,
) -> ApiResult<(StatusCode, Json<Adventure>)> {
    let adventure = state.adventure_service.create_adventure(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(adventure)))
}

pub async fn get_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<Json<Adventure>> {
    Ok(Json(state.adventure_service.get_adventure(user.id, id).await?))
}

pub async fn update_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
    Json(req): Json<UpdateAdventureRequest>,
) -> ApiResult<Json<Adventure>> {
    Ok(Json(state.adventure_service.update_adventure(user.id, id, req).await?))
}

pub async fn delete_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<StatusCode> {
    state.adventure_service.delete_adventure(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_adventure(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<(StatusCode, Json<Adventure>)> {
    let clone = state.adventure_service.clone_adventure(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn move_to_campaign(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, campaign_id)): Path<(AdventureId, CampaignId)>,
) -> ApiResult<Json<Adventure>> {
    Ok(Json(
        state
            .adventure_service
            .move_to_campaign(user.id, id, campaign_id)
            .await?,
    ))
}

pub async fn make_standalone(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<Json<Adventure>> {
    Ok(Json(state.adventure_service.make_standalone(user.id, id).await?))
}

pub async fn list_scenes(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<Json<Vec<Scene>>> {
    Ok(Json(state.adventure_service.list_scenes(user.id, id).await?))
}

pub async fn add_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
    Json(req): Json<CreateSceneRequest>,
) -> ApiResult<(StatusCode, Json<Scene>)> {
    let scene = state.adventure_service.add_scene(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(scene)))
}

pub async fn list_encounters(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
) -> ApiResult<Json<Vec<Encounter>>> {
    Ok(Json(state.adventure_service.list_encounters(user.id, id).await?))
}

pub async fn add_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AdventureId>,
    Json(req): Json<CreateEncounterRequest>,
) -> ApiResult<(StatusCode, Json<Encounter>)> {
    let encounter = state.adventure_service.add_encounter(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(encounter)))
}
