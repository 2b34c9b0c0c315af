//! Audit logging middleware
//!
//! Every request under `/api` is recorded after the response is produced.
//! Persistence runs on a detached task, so a failing audit store never
//! changes what the client sees.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::{ConnectInfo, State},
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::sanitize::{sanitize_body, sanitize_query, truncate};
use crate::application::services::AuditLogService;
use crate::domain::entities::AuditLog;
use crate::infrastructure::auth::CurrentUser;
use crate::infrastructure::state::AppState;

fn captures_request_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// "worlds" and the id from `/api/worlds/{id}/...`
fn entity_from_path(path: &str) -> (Option<String>, Option<String>) {
    let mut segments = path
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s == "api" || *s == "admin" || *s == "internal");
    let entity_type = segments.next().map(str::to_string);
    let entity_id = segments
        .next()
        .filter(|s| Uuid::parse_str(s).is_ok())
        .map(str::to_string);
    (entity_type, entity_id)
}

fn client_ip(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(|ip| ip.trim().to_string())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}

fn body_text(bytes: &Bytes, limit: usize) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    Some(truncate(&sanitize_body(&text), limit))
}

pub async fn audit_requests(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/api") {
        return next.run(request).await;
    }

    let started = Instant::now();
    let limit = state.config.audit_body_limit;
    let max_body = state.config.max_body_bytes;
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(sanitize_query);
    let user = CurrentUser::from_headers(request.headers());
    let ip_address = client_ip(&request);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let mut request_body = None;
    let response = if captures_request_body(&method) {
        let (parts, body) = request.into_parts();
        match to_bytes(body, max_body).await {
            Ok(bytes) => {
                request_body = body_text(&bytes, limit);
                next.run(Request::from_parts(parts, Body::from(bytes))).await
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Request body over the size limit");
                StatusCode::PAYLOAD_TOO_LARGE.into_response()
            }
        }
    } else {
        next.run(request).await
    };

    let (parts, body) = response.into_parts();
    // Streams of unknown length pass through without being captured
    let buffered = body
        .size_hint()
        .upper()
        .is_some_and(|len| len <= max_body as u64);
    let (body, response_body) = if buffered {
        match to_bytes(body, max_body).await {
            Ok(bytes) => {
                let captured = body_text(&bytes, limit);
                (Body::from(bytes), captured)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read response body for auditing");
                (Body::empty(), None)
            }
        }
    } else {
        (body, None)
    };
    let status = parts.status.as_u16();

    let mut log = AuditLog::new(method.as_str(), path.clone(), status);
    let (entity_type, entity_id) = entity_from_path(&path);
    log.user_id = user.map(|u| u.id);
    log.entity_type = entity_type;
    log.entity_id = entity_id;
    log.query_string = query;
    log.ip_address = ip_address;
    log.user_agent = user_agent;
    log.request_body = request_body;
    log.response_body = response_body;
    log.duration_ms = started.elapsed().as_millis() as u64;
    if status >= 400 {
        log.error_message = parts.status.canonical_reason().map(str::to_string);
    }

    let service = state.audit_log_service.clone();
    tokio::spawn(async move {
        if let Err(e) = service.add(log).await {
            tracing::warn!(error = %e, "Failed to persist audit log");
        }
    });

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_from_path() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            entity_from_path(&format!("/api/worlds/{}/campaigns", id)),
            (Some("worlds".to_string()), Some(id))
        );
        assert_eq!(
            entity_from_path("/api/admin/audit-logs"),
            (Some("audit-logs".to_string()), None)
        );
        assert_eq!(entity_from_path("/api"), (None, None));
    }

    #[test]
    fn test_only_write_methods_capture_request_bodies() {
        assert!(captures_request_body(&Method::POST));
        assert!(captures_request_body(&Method::PATCH));
        assert!(!captures_request_body(&Method::GET));
        assert!(!captures_request_body(&Method::DELETE));
    }
}
