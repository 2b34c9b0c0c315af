//! HTTP REST API routes

mod admin_routes;
mod adventure_routes;
mod ai_routes;
mod asset_routes;
mod campaign_routes;
mod encounter_routes;
mod error;
mod game_session_routes;
mod ingest_routes;
mod scene_routes;
mod schedule_routes;
mod stage_routes;
mod world_routes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::domain::entities::{
    StageDecoration, StageLight, StageRegion, StageSound, StageStructure, StageWall,
};
use crate::infrastructure::auth::require_internal_key;
use crate::infrastructure::middleware::{audit_requests, maintenance_gate};
use crate::infrastructure::state::AppState;

pub use error::{ApiError, ApiResult};

/// Add/update/remove routes for one kind of stage structure
fn structure_routes<T>(segment: &str) -> Router<Arc<AppState>>
where
    T: StageStructure + Serialize + DeserializeOwned,
{
    Router::new()
        .route(
            &format!("/api/stages/{{id}}/{}", segment),
            post(stage_routes::add_structure::<T>),
        )
        .route(
            &format!("/api/stages/{{id}}/{}/{{index}}", segment),
            put(stage_routes::update_structure::<T>).delete(stage_routes::remove_structure::<T>),
        )
}

fn library_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Worlds
        .route("/api/worlds", get(world_routes::list_worlds).post(world_routes::create_world))
        .route(
            "/api/worlds/{id}",
            get(world_routes::get_world)
                .patch(world_routes::update_world)
                .delete(world_routes::delete_world),
        )
        .route("/api/worlds/{id}/clone", post(world_routes::clone_world))
        .route(
            "/api/worlds/{id}/campaigns",
            get(world_routes::list_campaigns).post(world_routes::add_new_campaign),
        )
        .route(
            "/api/worlds/{id}/campaigns/{campaign_id}",
            delete(world_routes::remove_campaign),
        )
        .route(
            "/api/worlds/{id}/campaigns/{campaign_id}/clone",
            post(world_routes::add_cloned_campaign),
        )
        // Campaigns
        .route(
            "/api/campaigns",
            get(campaign_routes::list_campaigns).post(campaign_routes::create_campaign),
        )
        .route(
            "/api/campaigns/{id}",
            get(campaign_routes::get_campaign)
                .patch(campaign_routes::update_campaign)
                .delete(campaign_routes::delete_campaign),
        )
        .route("/api/campaigns/{id}/clone", post(campaign_routes::clone_campaign))
        .route(
            "/api/campaigns/{id}/adventures",
            get(campaign_routes::list_adventures).post(campaign_routes::add_new_adventure),
        )
        .route(
            "/api/campaigns/{id}/adventures/{adventure_id}",
            delete(campaign_routes::remove_adventure),
        )
        .route(
            "/api/campaigns/{id}/adventures/{adventure_id}/clone",
            post(campaign_routes::add_cloned_adventure),
        )
        .route(
            "/api/campaigns/{id}/world/{world_id}",
            put(campaign_routes::move_to_world),
        )
        .route("/api/campaigns/{id}/world", delete(campaign_routes::make_standalone))
        // Adventures
        .route(
            "/api/adventures",
            get(adventure_routes::list_adventures).post(adventure_routes::create_adventure),
        )
        .route(
            "/api/adventures/{id}",
            get(adventure_routes::get_adventure)
                .patch(adventure_routes::update_adventure)
                .delete(adventure_routes::delete_adventure),
        )
        .route("/api/adventures/{id}/clone", post(adventure_routes::clone_adventure))
        .route(
            "/api/adventures/{id}/campaign/{campaign_id}",
            put(adventure_routes::move_to_campaign),
        )
        .route(
            "/api/adventures/{id}/campaign",
            delete(adventure_routes::make_standalone),
        )
        .route(
            "/api/adventures/{id}/scenes",
            get(adventure_routes::list_scenes).post(adventure_routes::add_scene),
        )
        .route(
            "/api/adventures/{id}/encounters",
            get(adventure_routes::list_encounters).post(adventure_routes::add_encounter),
        )
        // Scenes
        .route(
            "/api/scenes/{id}",
            get(scene_routes::get_scene)
                .patch(scene_routes::update_scene)
                .delete(scene_routes::delete_scene),
        )
        .route("/api/scenes/{id}/clone", post(scene_routes::clone_scene))
        // Encounters
        .route("/api/encounters", get(encounter_routes::list_encounters))
        .route(
            "/api/encounters/{id}",
            get(encounter_routes::get_encounter)
                .patch(encounter_routes::update_encounter)
                .delete(encounter_routes::delete_encounter),
        )
        .route("/api/encounters/{id}/clone", post(encounter_routes::clone_encounter))
        .route(
            "/api/encounters/{id}/assets",
            post(encounter_routes::add_asset).patch(encounter_routes::bulk_update_assets),
        )
        .route("/api/encounters/{id}/assets/bulk", post(encounter_routes::bulk_add_assets))
        .route(
            "/api/encounters/{id}/assets/clone",
            post(encounter_routes::bulk_clone_assets),
        )
        .route(
            "/api/encounters/{id}/assets/delete",
            post(encounter_routes::bulk_delete_assets),
        )
        .route(
            "/api/encounters/{id}/assets/{index}",
            patch(encounter_routes::update_asset).delete(encounter_routes::remove_asset),
        )
        .route(
            "/api/encounters/{id}/assets/{index}/clone",
            post(encounter_routes::clone_asset),
        )
        // Stages
        .route("/api/stages", get(stage_routes::list_stages).post(stage_routes::create_stage))
        .route(
            "/api/stages/{id}",
            get(stage_routes::get_stage)
                .patch(stage_routes::update_stage)
                .delete(stage_routes::delete_stage),
        )
        .route("/api/stages/{id}/clone", post(stage_routes::clone_stage))
        .merge(structure_routes::<StageWall>("walls"))
        .merge(structure_routes::<StageRegion>("regions"))
        .merge(structure_routes::<StageLight>("lights"))
        .merge(structure_routes::<StageDecoration>("decorations"))
        .merge(structure_routes::<StageSound>("sounds"))
        // Assets
        .route("/api/assets", get(asset_routes::list_assets).post(asset_routes::create_asset))
        .route(
            "/api/assets/{id}",
            get(asset_routes::get_asset)
                .patch(asset_routes::update_asset)
                .delete(asset_routes::delete_asset),
        )
        .route("/api/assets/{id}/clone", post(asset_routes::clone_asset))
}

fn game_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Sessions
        .route(
            "/api/sessions",
            get(game_session_routes::list_sessions).post(game_session_routes::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(game_session_routes::get_session)
                .patch(game_session_routes::update_session)
                .delete(game_session_routes::delete_session),
        )
        .route("/api/sessions/{id}/join", post(game_session_routes::join_session))
        .route("/api/sessions/{id}/leave", post(game_session_routes::leave_session))
        .route(
            "/api/sessions/{id}/encounter/{encounter_id}",
            put(game_session_routes::set_active_encounter),
        )
        .route(
            "/api/sessions/{id}/scene/{scene_id}",
            put(game_session_routes::set_active_scene),
        )
        .route("/api/sessions/{id}/start", post(game_session_routes::start_session))
        .route("/api/sessions/{id}/pause", post(game_session_routes::pause_session))
        .route("/api/sessions/{id}/resume", post(game_session_routes::resume_session))
        .route("/api/sessions/{id}/finish", post(game_session_routes::finish_session))
        .route("/api/sessions/{id}/cancel", post(game_session_routes::cancel_session))
        .route(
            "/api/sessions/{id}/participants",
            post(game_session_routes::add_participant),
        )
        .route(
            "/api/sessions/{id}/participants/{user_id}",
            delete(game_session_routes::remove_participant),
        )
        .route("/api/sessions/{id}/messages", post(game_session_routes::send_message))
        .route("/api/sessions/{id}/events", post(game_session_routes::record_event))
        // Schedules
        .route(
            "/api/schedules",
            get(schedule_routes::list_schedules).post(schedule_routes::create_schedule),
        )
        .route("/api/schedules/upcoming", get(schedule_routes::list_upcoming))
        .route(
            "/api/schedules/{id}",
            get(schedule_routes::get_schedule)
                .patch(schedule_routes::update_schedule)
                .delete(schedule_routes::delete_schedule),
        )
        .route(
            "/api/schedules/{id}/sessions",
            post(schedule_routes::generate_sessions),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/maintenance/status", get(admin_routes::maintenance_status))
        .route("/api/admin/audit-logs", get(admin_routes::query_audit_logs))
        .route(
            "/api/admin/audit-logs/statistics",
            get(admin_routes::audit_statistics),
        )
        .route(
            "/api/admin/audit-logs/hourly",
            get(admin_routes::hourly_response_times),
        )
        .route("/api/admin/audit-logs/{id}", get(admin_routes::get_audit_log))
        .route(
            "/api/admin/maintenance",
            post(admin_routes::enable_maintenance).delete(admin_routes::disable_maintenance),
        )
        .route(
            "/api/admin/maintenance/{id}",
            put(admin_routes::update_maintenance),
        )
        .route("/api/admin/library", get(admin_routes::library_overview))
        .route("/api/admin/library/worlds", get(admin_routes::search_worlds))
        .route("/api/admin/library/campaigns", get(admin_routes::search_campaigns))
        .route("/api/admin/library/adventures", get(admin_routes::search_adventures))
        .route("/api/admin/library/stages", get(admin_routes::search_stages))
        .route("/api/admin/library/assets", get(admin_routes::search_assets))
        .route(
            "/api/admin/library/{kind}/{id}/owner",
            put(admin_routes::transfer_ownership),
        )
        // Asset ingest
        .route("/api/admin/ingest", post(ingest_routes::ingest_assets))
        .route("/api/admin/ingest/approve", post(ingest_routes::approve_assets))
        .route("/api/admin/ingest/reject", post(ingest_routes::reject_assets))
        .route("/api/admin/ingest/discard", post(ingest_routes::discard_assets))
        .route("/api/admin/ingest/retry", post(ingest_routes::retry_failed))
        .route("/api/admin/ingest/processing", get(ingest_routes::processing_assets))
        .route("/api/admin/ingest/review", get(ingest_routes::review_assets))
        .route("/api/admin/ingest/history", get(ingest_routes::history_assets))
}

fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ai/prompts", post(ai_routes::bulk_prompts))
        .route("/api/ai/text", post(ai_routes::generate_text))
}

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(library_routes())
        .merge(game_routes())
        .merge(admin_routes())
        .merge(ai_routes())
}

/// Routes reachable only with the internal API key
fn internal_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/internal/audit-logs", post(admin_routes::ingest_audit_log))
        .route(
            "/api/internal/ingest/{id}/result",
            post(ingest_routes::record_generation),
        )
        .route_layer(middleware::from_fn_with_state(state, require_internal_key))
}

async fn health_check() -> &'static str {
    "OK"
}

/// The complete application with middleware applied
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/alive", get(health_check))
        .merge(create_routes())
        .merge(internal_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), maintenance_gate))
        .layer(middleware::from_fn_with_state(state.clone(), audit_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::dto::AuditLogQuery;
    use crate::application::ports::outbound::{
        AiProviderPort, Record, RecordStore, RepoError, Repository,
    };
    use crate::application::services::AuditLogService;
    use crate::domain::entities::{AuditLog, AuditResult};
    use crate::domain::value_objects::UserId;
    use crate::infrastructure::ai_client::OpenAiClient;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::persistence::in_memory_repository;

    fn test_state(config: AppConfig) -> Arc<AppState> {
        state_with(config, in_memory_repository())
    }

    fn state_with(config: AppConfig, repository: Repository) -> Arc<AppState> {
        let ai: Arc<dyn AiProviderPort> = Arc::new(OpenAiClient::new(&config.ai));
        Arc::new(AppState::with_repository(config, repository, ai))
    }

    /// A store whose backend is always down
    struct FailingStore;

    #[async_trait]
    impl<T: Record> RecordStore<T> for FailingStore {
        async fn get(&self, _id: T::Id) -> Result<Option<T>, RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }

        async fn list(&self) -> Result<Vec<T>, RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }

        async fn list_by_owner(&self, _owner: UserId) -> Result<Vec<T>, RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }

        async fn list_by_parent(&self, _parent: uuid::Uuid) -> Result<Vec<T>, RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }

        async fn save(&self, _record: &T) -> Result<(), RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }

        async fn delete(&self, _id: T::Id) -> Result<bool, RepoError> {
            Err(RepoError::Database("connection refused".into()))
        }
    }

    /// Audit entries are written on a detached task; wait for the one for `path`
    async fn audit_entry(state: &AppState, method: &str, path: &str) -> AuditLog {
        for _ in 0..100 {
            let page = state
                .audit_log_service
                .query(AuditLogQuery::default())
                .await
                .unwrap();
            if let Some(log) = page
                .items
                .into_iter()
                .find(|log| log.http_method == method && log.path == path)
            {
                return log;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("no audit entry for {} {}", method, path);
    }

    fn request(method: &str, uri: &str, user: Option<(UserId, &str)>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, roles)) = user {
            builder = builder
                .header("x-user-id", id.to_string())
                .header("x-user-roles", roles);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request("GET", "/api/worlds", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_and_fetch_world() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let user = UserId::new();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/worlds",
                Some((user, "")),
                Some(json!({"name": "Eberron"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let world = json_body(response).await;
        let id = world["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("GET", &format!("/api/worlds/{}", id), Some((user, "")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Eberron");
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request(
                "POST",
                "/api/worlds",
                Some((UserId::new(), "")),
                Some(json!({"name": "  "})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_maintenance_blocks_users_but_not_admins() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let admin = UserId::new();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/admin/maintenance",
                Some((admin, "Admin")),
                Some(json!({"message": "Upgrading storage"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/worlds", Some((UserId::new(), "")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["message"], "Upgrading storage");

        let response = app
            .clone()
            .oneshot(request("GET", "/api/maintenance/status", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["isActive"], true);

        let response = app
            .oneshot(request("GET", "/api/worlds", Some((admin, "admin")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request(
                "GET",
                "/api/admin/library",
                Some((UserId::new(), "Player")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_internal_routes_require_api_key() {
        let mut config = AppConfig::in_memory();
        config.internal_api_key = Some("s3cret".to_string());
        let state = test_state(config);
        let app = build_app(state.clone());
        let entry = json!({
            "httpMethod": "POST",
            "path": "/api/render",
            "statusCode": 200,
            "durationMs": 12
        });

        let response = app
            .clone()
            .oneshot(request("POST", "/api/internal/audit-logs", None, Some(entry.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut authorized = request("POST", "/api/internal/audit-logs", None, Some(entry));
        authorized
            .headers_mut()
            .insert("x-api-key", "s3cret".parse().unwrap());
        let response = app.oneshot(authorized).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let stored = state.audit_log_service.total_count().await.unwrap();
        assert!(stored >= 1);
    }

    #[tokio::test]
    async fn test_api_requests_are_audited() {
        let state = test_state(AppConfig::in_memory());
        let app = build_app(state.clone());
        app.oneshot(request("GET", "/api/worlds", Some((UserId::new(), "")), None))
            .await
            .unwrap();

        let mut count = 0;
        for _ in 0..50 {
            count = state.audit_log_service.total_count().await.unwrap();
            if count > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_text_generation_without_provider_is_unavailable() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request(
                "POST",
                "/api/ai/text",
                Some((UserId::new(), "")),
                Some(json!({"prompt": "Describe a tavern"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_and_audited() {
        let mut config = AppConfig::in_memory();
        config.max_body_bytes = 64;
        let state = test_state(config);
        let app = build_app(state.clone());

        let response = app
            .oneshot(request(
                "POST",
                "/api/worlds",
                Some((UserId::new(), "")),
                Some(json!({"name": "Greyhawk", "description": "x".repeat(256)})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let log = audit_entry(&state, "POST", "/api/worlds").await;
        assert_eq!(log.status_code, 413);
        assert_eq!(log.result, AuditResult::Failure);
        assert!(log.request_body.is_none());
    }

    #[tokio::test]
    async fn test_audited_request_body_is_redacted() {
        let state = test_state(AppConfig::in_memory());
        let app = build_app(state.clone());

        let response = app
            .oneshot(request(
                "POST",
                "/api/worlds",
                Some((UserId::new(), "")),
                Some(json!({"name": "Faerun", "password": "hunter2"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let log = audit_entry(&state, "POST", "/api/worlds").await;
        let body = log.request_body.unwrap();
        assert!(body.contains("***REDACTED***"));
        assert!(!body.contains("hunter2"));
        assert!(log.response_body.unwrap().contains("Faerun"));
        assert_eq!(log.result, AuditResult::Success);
    }

    #[tokio::test]
    async fn test_audited_response_body_is_redacted() {
        let state = test_state(AppConfig::in_memory());
        let app = build_app(state.clone());
        let owner = UserId::new();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/sessions",
                Some((owner, "")),
                Some(json!({"title": "Night one"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/sessions/{}/start", id),
                Some((owner, "")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let path = format!("/api/sessions/{}/events", id);
        let response = app
            .oneshot(request(
                "POST",
                &path,
                Some((owner, "")),
                Some(json!({"eventType": "handout", "data": {"token": "abc123"}})),
            ))
            .await
            .unwrap();
        assert!(response.status().is_success());
        // The client still sees the real payload
        assert_eq!(json_body(response).await["data"]["token"], "abc123");

        let log = audit_entry(&state, "POST", &path).await;
        for body in [log.request_body.unwrap(), log.response_body.unwrap()] {
            assert!(body.contains("***REDACTED***"));
            assert!(!body.contains("abc123"));
        }
    }

    #[tokio::test]
    async fn test_not_found_is_audited_as_failure() {
        let state = test_state(AppConfig::in_memory());
        let app = build_app(state.clone());
        let path = format!("/api/worlds/{}", uuid::Uuid::new_v4());

        let response = app
            .oneshot(request("GET", &path, Some((UserId::new(), "")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let log = audit_entry(&state, "GET", &path).await;
        assert_eq!(log.status_code, 404);
        assert_eq!(log.result, AuditResult::Failure);
        assert!(log.error_message.is_some());
    }

    #[tokio::test]
    async fn test_storage_failure_is_audited_as_error() {
        let mut repository = in_memory_repository();
        repository.worlds = Arc::new(FailingStore);
        let state = state_with(AppConfig::in_memory(), repository);
        let app = build_app(state.clone());

        let response = app
            .oneshot(request("GET", "/api/worlds", Some((UserId::new(), "")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let log = audit_entry(&state, "GET", "/api/worlds").await;
        assert_eq!(log.status_code, 500);
        assert_eq!(log.result, AuditResult::Error);
    }

    #[tokio::test]
    async fn test_failing_audit_store_leaves_response_unchanged() {
        let mut repository = in_memory_repository();
        repository.audit_logs = Arc::new(FailingStore);
        let app = build_app(state_with(AppConfig::in_memory(), repository));
        let user = UserId::new();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/worlds",
                Some((user, "")),
                Some(json!({"name": "Krynn"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["name"], "Krynn");

        let response = app
            .oneshot(request("GET", "/api/worlds", Some((user, "")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_ingest_flow_through_admin_and_internal_routes() {
        let mut config = AppConfig::in_memory();
        config.internal_api_key = Some("s3cret".to_string());
        let app = build_app(test_state(config));
        let admin = UserId::new();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/admin/ingest",
                Some((admin, "Admin")),
                Some(json!({"items": [{"name": "Goblin", "kind": "Creature"}]})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let job = json_body(response).await;
        assert_eq!(job["itemCount"], 1);
        let id = job["assetIds"][0].as_str().unwrap().to_string();

        let mut report = request(
            "POST",
            &format!("/api/internal/ingest/{}/result", id),
            None,
            Some(json!({"portrait": uuid::Uuid::new_v4(), "token": uuid::Uuid::new_v4()})),
        );
        report
            .headers_mut()
            .insert("x-api-key", "s3cret".parse().unwrap());
        let response = app.clone().oneshot(report).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["ingestStatus"], "PendingReview");

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/admin/ingest/review?take=10",
                Some((admin, "Admin")),
                None,
            ))
            .await
            .unwrap();
        let page = json_body(response).await;
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["hasMore"], false);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/admin/ingest/approve",
                Some((admin, "Admin")),
                Some(json!({"assetIds": [id]})),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["succeededIds"][0], id.as_str());

        let response = app
            .oneshot(request(
                "GET",
                "/api/admin/library/assets?ownerType=master&kind=Creature&search=gob",
                Some((admin, "Admin")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["content"][0]["name"], "Goblin");
        assert_eq!(page["content"][0]["isPublished"], true);
    }

    #[tokio::test]
    async fn test_ingest_requires_admin() {
        let app = build_app(test_state(AppConfig::in_memory()));
        let response = app
            .oneshot(request(
                "POST",
                "/api/admin/ingest",
                Some((UserId::new(), "")),
                Some(json!({"items": [{"name": "Goblin", "kind": "Creature"}]})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
