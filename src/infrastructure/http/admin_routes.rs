//! Admin API routes: audit trail, maintenance mode and library moderation

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiResult;
use crate::application::dto::{
    AuditLogPage, AuditLogQuery, AuditStatistics, ContentKind, HourlyAverage, LibraryOverview,
    LibraryPage, LibrarySearchRequest, MaintenanceRequest, NewAuditLogRequest,
    TransferOwnershipRequest,
};
use crate::application::services::{AuditLogService, LibraryAdminService, MaintenanceModeService};
use crate::domain::entities::{Adventure, Asset, AuditLog, Campaign, MaintenanceMode, Stage, World};
use crate::domain::value_objects::{AuditLogId, MaintenanceModeId};
use crate::infrastructure::auth::AdminUser;
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SinceQuery {
    pub since: Option<DateTime<Utc>>,
}

impl SinceQuery {
    /// Defaults to the last 24 hours
    fn since(&self) -> DateTime<Utc> {
        self.since.unwrap_or_else(|| Utc::now() - Duration::hours(24))
    }
}

// =============================================================================
// Audit logs
// =============================================================================

pub async fn query_audit_logs(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<AuditLogPage>> {
    Ok(Json(state.audit_log_service.query(query).await?))
}

pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<AuditLogId>,
) -> ApiResult<Json<AuditLog>> {
    Ok(Json(state.audit_log_service.get(id).await?))
}

pub async fn audit_statistics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<SinceQuery>,
) -> ApiResult<Json<AuditStatistics>> {
    Ok(Json(state.audit_log_service.statistics(query.since()).await?))
}

pub async fn hourly_response_times(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<SinceQuery>,
) -> ApiResult<Json<Vec<HourlyAverage>>> {
    Ok(Json(
        state
            .audit_log_service
            .hourly_average_response_times(query.since())
            .await?,
    ))
}

/// Entries reported by other services; guarded by the internal API key
pub async fn ingest_audit_log(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewAuditLogRequest>,
) -> ApiResult<StatusCode> {
    state.audit_log_service.add(req.into_log()).await?;
    Ok(StatusCode::ACCEPTED)
}

// =============================================================================
// Maintenance mode
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStatus {
    pub is_active: bool,
    pub maintenance: Option<MaintenanceMode>,
}

/// Public maintenance status for front ends
pub async fn maintenance_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MaintenanceStatus>> {
    let maintenance = state.maintenance_mode_service.current().await?;
    let is_active = maintenance
        .as_ref()
        .is_some_and(|m| m.is_active_at(Utc::now()));
    Ok(Json(MaintenanceStatus {
        is_active,
        maintenance,
    }))
}

pub async fn enable_maintenance(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<MaintenanceRequest>,
) -> ApiResult<(StatusCode, Json<MaintenanceMode>)> {
    let mode = state.maintenance_mode_service.enable(admin.id, req).await?;
    Ok((StatusCode::CREATED, Json(mode)))
}

pub async fn update_maintenance(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<MaintenanceModeId>,
    Json(req): Json<MaintenanceRequest>,
) -> ApiResult<Json<MaintenanceMode>> {
    Ok(Json(
        state
            .maintenance_mode_service
            .update(admin.id, id, req)
            .await?,
    ))
}

pub async fn disable_maintenance(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<MaintenanceMode>> {
    Ok(Json(state.maintenance_mode_service.disable(admin.id).await?))
}

// =============================================================================
// Library moderation
// =============================================================================

pub async fn library_overview(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<LibraryOverview>> {
    Ok(Json(state.library_admin_service.overview().await?))
}

pub async fn search_worlds(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryPage<World>>> {
    Ok(Json(state.library_admin_service.search_worlds(query).await?))
}

pub async fn search_campaigns(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryPage<Campaign>>> {
    Ok(Json(state.library_admin_service.search_campaigns(query).await?))
}

pub async fn search_adventures(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryPage<Adventure>>> {
    Ok(Json(state.library_admin_service.search_adventures(query).await?))
}

pub async fn search_stages(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryPage<Stage>>> {
    Ok(Json(state.library_admin_service.search_stages(query).await?))
}

pub async fn search_assets(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<LibrarySearchRequest>,
) -> ApiResult<Json<LibraryPage<Asset>>> {
    Ok(Json(state.library_admin_service.search_assets(query).await?))
}

pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path((kind, id)): Path<(ContentKind, Uuid)>,
    Json(req): Json<TransferOwnershipRequest>,
) -> ApiResult<StatusCode> {
    state
        .library_admin_service
        .transfer_ownership(admin.id, kind, id, req.new_owner_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
