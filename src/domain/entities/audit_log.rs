//! AuditLog entity - one row per intercepted HTTP request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AuditLogId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditResult {
    Success,
    Failure,
    Error,
}

impl AuditResult {
    /// 2xx/3xx succeed, 4xx fail, 5xx are errors
    pub fn from_status(status: u16) -> Self {
        match status {
            0..=399 => AuditResult::Success,
            400..=499 => AuditResult::Failure,
            _ => AuditResult::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: AuditLogId,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<UserId>,
    /// "{METHOD} {path}"
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub http_method: String,
    pub path: String,
    pub query_string: Option<String>,
    pub status_code: u16,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub duration_ms: u64,
    pub result: AuditResult,
    pub error_message: Option<String>,
}

impl AuditLog {
    pub fn new(method: impl Into<String>, path: impl Into<String>, status_code: u16) -> Self {
        let http_method = method.into();
        let path = path.into();
        Self {
            id: AuditLogId::new(),
            timestamp: Utc::now(),
            user_id: None,
            action: format!("{} {}", http_method, path),
            entity_type: None,
            entity_id: None,
            http_method,
            path,
            query_string: None,
            status_code,
            ip_address: None,
            user_agent: None,
            request_body: None,
            response_body: None,
            duration_ms: 0,
            result: AuditResult::from_status(status_code),
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_from_status() {
        assert_eq!(AuditResult::from_status(200), AuditResult::Success);
        assert_eq!(AuditResult::from_status(302), AuditResult::Success);
        assert_eq!(AuditResult::from_status(404), AuditResult::Failure);
        assert_eq!(AuditResult::from_status(500), AuditResult::Error);
        assert_eq!(AuditResult::from_status(503), AuditResult::Error);
    }

    #[test]
    fn test_action_combines_method_and_path() {
        let log = AuditLog::new("POST", "/api/worlds", 201);
        assert_eq!(log.action, "POST /api/worlds");
        assert_eq!(log.result, AuditResult::Success);
    }
}
