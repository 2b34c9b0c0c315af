//! Caller identity taken from trusted gateway headers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::domain::value_objects::UserId;
use crate::infrastructure::http::ApiError;
use crate::infrastructure::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";
pub const API_KEY_HEADER: &str = "x-api-key";

pub const ADMIN_ROLE: &str = "Admin";

/// The authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: UserId,
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(ADMIN_ROLE))
    }

    /// Identity from request headers, when present and well formed
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers
            .get(USER_ID_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()?;
        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|h| {
                h.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self { id, roles })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
            .ok_or(ApiError::Unauthorized("A valid X-User-Id header is required"))
    }
}

/// A caller carrying the Admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("Administrator role required"));
        }
        Ok(AdminUser(user))
    }
}

/// Guard for `/api/internal/*`; closed when no key is configured
pub async fn require_internal_key(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state
        .config
        .internal_api_key
        .as_deref()
        .ok_or(ApiError::Unauthorized("Internal API is disabled"))?;
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if provided != Some(expected) {
        tracing::warn!(path = %request.uri().path(), "Rejected internal request with bad API key");
        return Err(ApiError::Unauthorized("Invalid API key"));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_from_headers() {
        let id = UserId::new();
        let mut headers = HeaderMap::new();
        assert!(CurrentUser::from_headers(&headers).is_none());

        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("User, admin"));
        let user = CurrentUser::from_headers(&headers).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.roles, vec!["User", "admin"]);
        assert!(user.is_admin());
    }

    #[test]
    fn test_malformed_user_id_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(CurrentUser::from_headers(&headers).is_none());
    }
}
