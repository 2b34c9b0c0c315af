use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{AssetKind, AuditLog, AuditResult};
use crate::domain::value_objects::UserId;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<UserId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub result: Option<AuditResult>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub items: Vec<AuditLog>,
    pub total_count: usize,
    pub skip: i64,
    pub take: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatistics {
    pub total_count: usize,
    pub distinct_users: usize,
    pub average_response_time_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub message: String,
    #[serde(default)]
    pub scheduled_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOwnershipRequest {
    pub new_owner_id: UserId,
}

/// Everything in the library regardless of owner
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryOverview {
    pub worlds: usize,
    pub campaigns: usize,
    pub adventures: usize,
    pub stages: usize,
    pub assets: usize,
}

/// Which owners a library search covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    /// The public library account
    Master,
    /// Everybody except the public library account
    User,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters for the admin library listings; results are sorted by name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySearchRequest {
    pub skip: Option<i64>,
    pub take: Option<i64>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
    pub owner_id: Option<UserId>,
    pub owner_type: Option<OwnerType>,
    pub is_published: Option<bool>,
    pub is_public: Option<bool>,
    pub sort_order: Option<SortOrder>,
    /// Assets only
    pub kind: Option<AssetKind>,
    /// Assets only
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPage<T> {
    pub content: Vec<T>,
    pub total_count: usize,
    pub has_more: bool,
}

/// Mean response time for one hour bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAverage {
    pub hour: DateTime<Utc>,
    pub average_ms: f64,
}

/// Library content kinds addressable by the moderation endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[serde(alias = "worlds")]
    World,
    #[serde(alias = "campaigns")]
    Campaign,
    #[serde(alias = "adventures")]
    Adventure,
    #[serde(alias = "stages")]
    Stage,
    #[serde(alias = "assets")]
    Asset,
}

/// Audit entry reported by another service through the internal API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditLogRequest {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub http_method: String,
    pub path: String,
    pub status_code: u16,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl NewAuditLogRequest {
    pub fn into_log(self) -> AuditLog {
        let mut log = AuditLog::new(self.http_method, self.path, self.status_code);
        if let Some(timestamp) = self.timestamp {
            log.timestamp = timestamp;
        }
        log.user_id = self.user_id;
        log.entity_type = self.entity_type;
        log.entity_id = self.entity_id;
        log.duration_ms = self.duration_ms;
        log.error_message = self.error_message;
        log
    }
}
