//! MaintenanceMode entity - switch that takes the API offline for non-admins

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MaintenanceModeId, UserId};

pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceMode {
    pub id: MaintenanceModeId,
    pub is_enabled: bool,
    pub message: String,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub enabled_at: Option<DateTime<Utc>>,
    pub enabled_by: Option<UserId>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_by: Option<UserId>,
}

impl MaintenanceMode {
    pub fn enabled(
        message: impl Into<String>,
        scheduled_start: Option<DateTime<Utc>>,
        scheduled_end: Option<DateTime<Utc>>,
        by: UserId,
    ) -> Self {
        Self {
            id: MaintenanceModeId::new(),
            is_enabled: true,
            message: message.into(),
            scheduled_start,
            scheduled_end,
            enabled_at: Some(Utc::now()),
            enabled_by: Some(by),
            disabled_at: None,
            disabled_by: None,
        }
    }

    /// Enabled and `now` inside the optional window
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_enabled
            && self.scheduled_start.is_none_or(|start| now >= start)
            && self.scheduled_end.is_none_or(|end| now < end)
    }

    pub fn disable(&mut self, by: UserId) {
        self.is_enabled = false;
        self.disabled_at = Some(Utc::now());
        self.disabled_by = Some(by);
    }

    /// Seconds until the window closes, when it has a scheduled end
    pub fn retry_after(&self, now: DateTime<Utc>) -> Option<i64> {
        self.scheduled_end
            .map(|end| (end - now).num_seconds().max(0))
    }
}

pub fn validate_maintenance(
    message: &str,
    scheduled_start: Option<DateTime<Utc>>,
    scheduled_end: Option<DateTime<Utc>>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if message.trim().is_empty() {
        errors.push("Maintenance message cannot be empty".to_string());
    } else if message.chars().count() > MAX_MESSAGE_LENGTH {
        errors.push(format!(
            "Maintenance message cannot exceed {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }
    if let (Some(start), Some(end)) = (scheduled_start, scheduled_end) {
        if end <= start {
            errors.push("Scheduled end time must be after scheduled start time".to_string());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_active_without_window() {
        let mode = MaintenanceMode::enabled("Upgrading", None, None, UserId::new());
        assert!(mode.is_active_at(Utc::now()));
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc::now();
        let mode = MaintenanceMode::enabled(
            "Upgrading",
            Some(now + Duration::hours(1)),
            Some(now + Duration::hours(2)),
            UserId::new(),
        );
        assert!(!mode.is_active_at(now));
        assert!(mode.is_active_at(now + Duration::minutes(90)));
        assert!(!mode.is_active_at(now + Duration::hours(2)));
    }

    #[test]
    fn test_disabled_is_never_active() {
        let mut mode = MaintenanceMode::enabled("Upgrading", None, None, UserId::new());
        mode.disable(UserId::new());
        assert!(!mode.is_active_at(Utc::now()));
        assert!(mode.disabled_at.is_some());
    }

    #[test]
    fn test_validation() {
        let now = Utc::now();
        assert_eq!(validate_maintenance("", None, None).len(), 1);
        assert_eq!(validate_maintenance(&"x".repeat(2001), None, None).len(), 1);
        assert!(validate_maintenance(&"x".repeat(2000), None, None).is_empty());
        assert_eq!(
            validate_maintenance("ok", Some(now), Some(now - Duration::minutes(1))).len(),
            1
        );
    }
}
