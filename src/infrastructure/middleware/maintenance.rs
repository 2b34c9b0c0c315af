//! Maintenance mode middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::MaintenanceModeService;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

const EXCLUDED_PATHS: [&str; 4] = ["/health", "/healthz", "/alive", "/api/maintenance/status"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceResponse {
    error: &'static str,
    message: String,
    retry_after: Option<DateTime<Utc>>,
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.iter().any(|excluded| {
        path == *excluded
            || path
                .strip_prefix(excluded)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

pub async fn maintenance_gate(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_excluded(request.uri().path()) {
        return next.run(request).await;
    }
    if CurrentUser::from_headers(request.headers()).is_some_and(|u| u.is_admin()) {
        return next.run(request).await;
    }

    let now = Utc::now();
    let active = match state.maintenance_mode_service.active_at(now).await {
        Ok(active) => active,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read maintenance mode; letting request through");
            None
        }
    };
    let Some(mode) = active else {
        return next.run(request).await;
    };

    tracing::debug!(path = %request.uri().path(), "Request blocked by maintenance mode");
    let body = MaintenanceResponse {
        error: "Service Unavailable",
        message: mode.message.clone(),
        retry_after: mode.scheduled_end,
    };
    let mut response = (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    if let Some(seconds) = mode.retry_after(now) {
        if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}
