//! Asset ingest API routes: drafting, generating and reviewing library art

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{
    AssetIdsRequest, GenerationResultRequest, IngestAssetsRequest, IngestBatchResponse,
    IngestJobResponse, LibraryPage, PageQuery, RejectAssetsRequest,
};
use crate::application::services::AssetIngestService;
use crate::domain::entities::Asset;
use crate::domain::value_objects::AssetId;
use crate::infrastructure::auth::AdminUser;
use crate::infrastructure::state::AppState;

type Job = ApiResult<(StatusCode, Json<IngestJobResponse>)>;
type Page = ApiResult<Json<LibraryPage<Asset>>>;

pub async fn ingest_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<IngestAssetsRequest>,
) -> Job {
    let job = state.asset_ingest_service.ingest_assets(req).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn approve_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<AssetIdsRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    Ok(Json(state.asset_ingest_service.approve_assets(req).await?))
}

pub async fn reject_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<RejectAssetsRequest>,
) -> Job {
    let job = state.asset_ingest_service.reject_assets(req).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn discard_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<AssetIdsRequest>,
) -> ApiResult<Json<IngestBatchResponse>> {
    Ok(Json(state.asset_ingest_service.discard_assets(req).await?))
}

pub async fn retry_failed(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<AssetIdsRequest>,
) -> Job {
    let job = state.asset_ingest_service.retry_failed(req).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn processing_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Page {
    Ok(Json(state.asset_ingest_service.processing_assets(page).await?))
}

pub async fn review_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Page {
    Ok(Json(state.asset_ingest_service.review_assets(page).await?))
}

pub async fn history_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Page {
    Ok(Json(state.asset_ingest_service.history_assets(page).await?))
}

/// Art reported by the generation worker; guarded by the internal API key
pub async fn record_generation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssetId>,
    Json(req): Json<GenerationResultRequest>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_ingest_service.record_generation(id, req).await?))
}
