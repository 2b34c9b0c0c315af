//! Encounter API routes, including placed asset instances

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{
    AddEncounterAssetRequest, AssetIndicesRequest, BulkUpdateEncounterAssetsRequest,
    UpdateEncounterAssetRequest, UpdateEncounterRequest,
};
use crate::application::services::EncounterService;
use crate::domain::entities::{Encounter, EncounterAsset};
use crate::domain::value_objects::EncounterId;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn list_encounters(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Encounter>>> {
    Ok(Json(state.encounter_service.list_encounters(user.id).await?))
}

pub async fn get_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
) -> ApiResult<Json<Encounter>> {
    Ok(Json(state.encounter_service.get_encounter(user.id, id).await?))
}

pub async fn update_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<UpdateEncounterRequest>,
) -> ApiResult<Json<Encounter>> {
    Ok(Json(state.encounter_service.update_encounter(user.id, id, req).await?))
}

pub async fn delete_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
) -> ApiResult<StatusCode> {
    state.encounter_service.delete_encounter(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
) -> ApiResult<(StatusCode, Json<Encounter>)> {
    let clone = state.encounter_service.clone_encounter(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

// =============================================================================
// Placed assets
// =============================================================================

pub async fn add_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<AddEncounterAssetRequest>,
) -> ApiResult<(StatusCode, Json<EncounterAsset>)> {
    let placed = state.encounter_service.add_asset(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

pub async fn bulk_add_assets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<Vec<AddEncounterAssetRequest>>,
) -> ApiResult<(StatusCode, Json<Vec<EncounterAsset>>)> {
    let placed = state.encounter_service.bulk_add_assets(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

pub async fn bulk_update_assets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<BulkUpdateEncounterAssetsRequest>,
) -> ApiResult<StatusCode> {
    state.encounter_service.bulk_update_assets(user.id, id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_clone_assets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<AssetIndicesRequest>,
) -> ApiResult<(StatusCode, Json<Vec<EncounterAsset>>)> {
    let clones = state
        .encounter_service
        .bulk_clone_assets(user.id, id, req.indices)
        .await?;
    Ok((StatusCode::CREATED, Json(clones)))
}

pub async fn bulk_delete_assets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<EncounterId>,
    Json(req): Json<AssetIndicesRequest>,
) -> ApiResult<StatusCode> {
    state
        .encounter_service
        .bulk_delete_assets(user.id, id, req.indices)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, index)): Path<(EncounterId, u32)>,
) -> ApiResult<(StatusCode, Json<EncounterAsset>)> {
    let clone = state.encounter_service.clone_asset(user.id, id, index).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, index)): Path<(EncounterId, u32)>,
    Json(req): Json<UpdateEncounterAssetRequest>,
) -> ApiResult<Json<EncounterAsset>> {
    Ok(Json(
        state
            .encounter_service
            .update_asset(user.id, id, index, req)
            .await?,
    ))
}

pub async fn remove_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, index)): Path<(EncounterId, u32)>,
) -> ApiResult<StatusCode> {
    state.encounter_service.remove_asset(user.id, id, index).await?;
    Ok(StatusCode::NO_CONTENT)
}
