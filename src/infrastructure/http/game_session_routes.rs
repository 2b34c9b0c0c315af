//! Game session API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::application::dto::{
    AddParticipantRequest, CreateGameSessionRequest, JoinGameSessionRequest, RecordEventRequest,
    SendMessageRequest, UpdateGameSessionRequest,
};
use crate::application::services::GameSessionService;
use crate::domain::entities::{GameSession, GameSessionEvent, GameSessionMessage};
use crate::domain::value_objects::{EncounterId, GameSessionId, SceneId, UserId};
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

type Session = ApiResult<Json<GameSession>>;

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<GameSession>>> {
    Ok(Json(state.game_session_service.list_sessions(user.id).await?))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateGameSessionRequest>,
) -> ApiResult<(StatusCode, Json<GameSession>)> {
    let session = state.game_session_service.create_session(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.get_session(user.id, id).await?))
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
    Json(req): Json<UpdateGameSessionRequest>,
) -> Session {
    Ok(Json(
        state
            .game_session_service
            .update_session(user.id, id, req)
            .await?,
    ))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> ApiResult<StatusCode> {
    state.game_session_service.delete_session(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join as a player; an empty body is accepted
pub async fn join_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
    req: Option<Json<JoinGameSessionRequest>>,
) -> Session {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(state.game_session_service.join_session(user.id, id, req).await?))
}

pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> ApiResult<StatusCode> {
    state.game_session_service.leave_session(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_active_encounter(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, encounter_id)): Path<(GameSessionId, EncounterId)>,
) -> Session {
    Ok(Json(
        state
            .game_session_service
            .set_active_encounter(user.id, id, encounter_id)
            .await?,
    ))
}

pub async fn set_active_scene(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, scene_id)): Path<(GameSessionId, SceneId)>,
) -> Session {
    Ok(Json(
        state
            .game_session_service
            .set_active_scene(user.id, id, scene_id)
            .await?,
    ))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.start_session(user.id, id).await?))
}

pub async fn pause_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.pause_session(user.id, id).await?))
}

pub async fn resume_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.resume_session(user.id, id).await?))
}

pub async fn finish_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.finish_session(user.id, id).await?))
}

pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
) -> Session {
    Ok(Json(state.game_session_service.cancel_session(user.id, id).await?))
}

pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
    Json(req): Json<AddParticipantRequest>,
) -> Session {
    Ok(Json(
        state
            .game_session_service
            .add_participant(user.id, id, req)
            .await?,
    ))
}

pub async fn remove_participant(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((id, participant)): Path<(GameSessionId, UserId)>,
) -> Session {
    Ok(Json(
        state
            .game_session_service
            .remove_participant(user.id, id, participant)
            .await?,
    ))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<GameSessionMessage>)> {
    let message = state.game_session_service.send_message(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn record_event(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<GameSessionId>,
    Json(req): Json<RecordEventRequest>,
) -> ApiResult<(StatusCode, Json<GameSessionEvent>)> {
    let event = state.game_session_service.record_event(user.id, id, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}
