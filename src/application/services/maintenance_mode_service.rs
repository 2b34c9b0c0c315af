//! Maintenance Mode Service - toggling the API offline for non-admin users

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::application::dto::MaintenanceRequest;
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::common::load;
use crate::domain::entities::{validate_maintenance, MaintenanceMode};
use crate::domain::value_objects::{MaintenanceModeId, UserId};

#[async_trait]
pub trait MaintenanceModeService: Send + Sync {
    /// The enabled maintenance record, if any
    async fn current(&self) -> ServiceResult<Option<MaintenanceMode>>;

    async fn enable(&self, admin: UserId, request: MaintenanceRequest) -> ServiceResult<MaintenanceMode>;

    async fn update(
        &self,
        admin: UserId,
        id: MaintenanceModeId,
        request: MaintenanceRequest,
    ) -> ServiceResult<MaintenanceMode>;

    async fn disable(&self, admin: UserId) -> ServiceResult<MaintenanceMode>;

    /// Enabled and inside its scheduled window at `now`
    async fn active_at(&self, now: DateTime<Utc>) -> ServiceResult<Option<MaintenanceMode>>;
}

#[derive(Clone)]
pub struct MaintenanceModeServiceImpl {
    repository: Repository,
}

impl MaintenanceModeServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MaintenanceModeService for MaintenanceModeServiceImpl {
    #[instrument(skip(self))]
    async fn current(&self) -> ServiceResult<Option<MaintenanceMode>> {
        let modes = self.repository.maintenance().list().await?;
        Ok(modes.into_iter().rev().find(|m| m.is_enabled))
    }

    #[instrument(skip(self, request))]
    async fn enable(&self, admin: UserId, request: MaintenanceRequest) -> ServiceResult<MaintenanceMode> {
        ServiceError::check(validate_maintenance(
            &request.message,
            request.scheduled_start,
            request.scheduled_end,
        ))?;
        if self.current().await?.is_some() {
            return Err(ServiceError::Conflict(
                "Maintenance mode is already enabled".to_string(),
            ));
        }

        let mode = MaintenanceMode::enabled(
            request.message.trim(),
            request.scheduled_start,
            request.scheduled_end,
            admin,
        );
        self.repository.maintenance().save(&mode).await?;

        warn!(
            maintenance_id = %mode.id,
            enabled_by = %admin,
            scheduled_start = ?mode.scheduled_start,
            scheduled_end = ?mode.scheduled_end,
            "Maintenance mode enabled"
        );
        Ok(mode)
    }

    #[instrument(skip(self, request))]
    async fn update(
        &self,
        admin: UserId,
        id: MaintenanceModeId,
        request: MaintenanceRequest,
    ) -> ServiceResult<MaintenanceMode> {
        ServiceError::check(validate_maintenance(
            &request.message,
            request.scheduled_start,
            request.scheduled_end,
        ))?;
        let mut mode = load(self.repository.maintenance(), id, "Maintenance mode").await?;

        mode.message = request.message.trim().to_string();
        mode.scheduled_start = request.scheduled_start;
        mode.scheduled_end = request.scheduled_end;
        self.repository.maintenance().save(&mode).await?;

        info!(maintenance_id = %id, updated_by = %admin, "Maintenance mode updated");
        Ok(mode)
    }

    #[instrument(skip(self))]
    async fn disable(&self, admin: UserId) -> ServiceResult<MaintenanceMode> {
        let Some(mut mode) = self.current().await? else {
            return Err(ServiceError::Conflict(
                "No active maintenance mode to disable".to_string(),
            ));
        };
        mode.disable(admin);
        self.repository.maintenance().save(&mode).await?;

        warn!(maintenance_id = %mode.id, disabled_by = %admin, "Maintenance mode disabled");
        Ok(mode)
    }

    async fn active_at(&self, now: DateTime<Utc>) -> ServiceResult<Option<MaintenanceMode>> {
        Ok(self.current().await?.filter(|m| m.is_active_at(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::in_memory_repository;
    use chrono::Duration;

    fn request(message: &str) -> MaintenanceRequest {
        MaintenanceRequest {
            message: message.to_string(),
            scheduled_start: None,
            scheduled_end: None,
        }
    }

    #[tokio::test]
    async fn test_enable_then_disable() {
        let service = MaintenanceModeServiceImpl::new(in_memory_repository());
        let admin = UserId::new();
        assert!(service.current().await.unwrap().is_none());

        let mode = service.enable(admin, request("Upgrading the database")).await.unwrap();
        assert!(mode.is_enabled);
        assert_eq!(mode.enabled_by, Some(admin));
        assert!(service.active_at(Utc::now()).await.unwrap().is_some());

        let again = service.enable(admin, request("Again")).await;
        assert!(matches!(again, Err(ServiceError::Conflict(m)) if m.contains("already enabled")));

        let disabled = service.disable(admin).await.unwrap();
        assert!(!disabled.is_enabled);
        assert!(service.current().await.unwrap().is_none());

        let nothing = service.disable(admin).await;
        assert!(matches!(nothing, Err(ServiceError::Conflict(m)) if m.contains("No active maintenance mode")));
    }

    #[tokio::test]
    async fn test_enable_validates_message_and_window() {
        let service = MaintenanceModeServiceImpl::new(in_memory_repository());
        let admin = UserId::new();

        assert!(matches!(
            service.enable(admin, request("   ")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.enable(admin, request(&"a".repeat(2001))).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(service.enable(admin, request(&"a".repeat(2000))).await.is_ok());

        let now = Utc::now();
        let backwards = MaintenanceRequest {
            message: "Window".to_string(),
            scheduled_start: Some(now + Duration::hours(2)),
            scheduled_end: Some(now + Duration::hours(1)),
        };
        let result = service.update(admin, MaintenanceModeId::new(), backwards).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_scheduled_window_controls_activity() {
        let service = MaintenanceModeServiceImpl::new(in_memory_repository());
        let admin = UserId::new();
        let now = Utc::now();
        let mode = service
            .enable(
                admin,
                MaintenanceRequest {
                    message: "Tonight".to_string(),
                    scheduled_start: Some(now + Duration::hours(1)),
                    scheduled_end: Some(now + Duration::hours(3)),
                },
            )
            .await
            .unwrap();

        assert!(service.active_at(now).await.unwrap().is_none());
        assert!(service.active_at(now + Duration::hours(2)).await.unwrap().is_some());

        let updated = service
            .update(admin, mode.id, request("Postponed"))
            .await
            .unwrap();
        assert_eq!(updated.message, "Postponed");
        assert!(service.active_at(now).await.unwrap().is_some());
    }
}
