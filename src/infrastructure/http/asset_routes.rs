//! Asset library API routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{AssetFilter, CreateAssetRequest, UpdateAssetRequest};
use crate::application::services::AssetService;
use crate::domain::entities::Asset;
use crate::domain::value_objects::AssetId;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

/// List assets, optionally filtered by `?kind=` and `?search=`
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<Json<Vec<Asset>>> {
    Ok(Json(state.asset_service.list_assets(user.id, filter).await?))
}

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateAssetRequest>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let asset = state.asset_service.create_asset(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AssetId>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_service.get_asset(user.id, id).await?))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AssetId>,
    Json(req): Json<UpdateAssetRequest>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_service.update_asset(user.id, id, req).await?))
}

pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AssetId>,
) -> ApiResult<StatusCode> {
    state.asset_service.delete_asset(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_asset(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<AssetId>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let clone = state.asset_service.clone_asset(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}
