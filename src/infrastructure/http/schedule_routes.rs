//! Schedule API routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{
    CreateScheduleRequest, ScheduleOccurrence, UpcomingQuery, UpdateScheduleRequest,
};
use crate::application::services::ScheduleService;
use crate::domain::entities::{GameSession, Schedule};
use crate::domain::value_objects::ScheduleId;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Schedule>>> {
    Ok(Json(state.schedule_service.list_schedules(user.id).await?))
}

/// Occurrences in `?from=&to=`, defaulting to the next 30 days
pub async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<ScheduleOccurrence>>> {
    Ok(Json(state.schedule_service.list_upcoming(user.id, query).await?))
}

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    let schedule = state.schedule_service.create_schedule(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<ScheduleId>,
) -> ApiResult<Json<Schedule>> {
    Ok(Json(state.schedule_service.get_schedule(user.id, id).await?))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<ScheduleId>,
    Json(req): Json<UpdateScheduleRequest>,
) -> ApiResult<Json<Schedule>> {
    Ok(Json(state.schedule_service.update_schedule(user.id, id, req).await?))
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<ScheduleId>,
) -> ApiResult<StatusCode> {
    state.schedule_service.delete_schedule(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate_sessions(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<ScheduleId>,
) -> ApiResult<(StatusCode, Json<Vec<GameSession>>)> {
    let sessions = state.schedule_service.generate_sessions(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(sessions)))
}
