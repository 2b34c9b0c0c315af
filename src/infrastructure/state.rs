//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{AiProviderPort, Repository};
use crate::application::services::{
    AdventureServiceImpl, AiServiceImpl, AssetIngestServiceImpl, AssetServiceImpl,
    AuditLogServiceImpl,
    CampaignServiceImpl, EncounterServiceImpl, GameSessionServiceImpl, LibraryAdminServiceImpl,
    MaintenanceModeServiceImpl, SceneServiceImpl, ScheduleServiceImpl, StageServiceImpl,
    WorldServiceImpl,
};
use crate::infrastructure::ai_client::OpenAiClient;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::StoreFactory;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Library
    pub world_service: WorldServiceImpl,
    pub campaign_service: CampaignServiceImpl,
    pub adventure_service: AdventureServiceImpl,
    pub scene_service: SceneServiceImpl,
    pub encounter_service: EncounterServiceImpl,
    pub stage_service: StageServiceImpl,
    pub asset_service: AssetServiceImpl,
    // Game
    pub game_session_service: GameSessionServiceImpl,
    pub schedule_service: ScheduleServiceImpl,
    // Admin
    pub audit_log_service: AuditLogServiceImpl,
    pub maintenance_mode_service: MaintenanceModeServiceImpl,
    pub library_admin_service: LibraryAdminServiceImpl,
    pub asset_ingest_service: AssetIngestServiceImpl,
    // AI
    pub ai_service: AiServiceImpl,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let repository = StoreFactory::new(config.storage.clone())
            .await?
            .repository()
            .await?;
        let ai_client: Arc<dyn AiProviderPort> = Arc::new(OpenAiClient::new(&config.ai));
        Ok(Self::with_repository(config, repository, ai_client))
    }

    /// Wire every service onto an already opened repository
    pub fn with_repository(
        config: AppConfig,
        repository: Repository,
        ai_client: Arc<dyn AiProviderPort>,
    ) -> Self {
        let library_owner = config.library_owner_id;
        let ai_service = AiServiceImpl::new(ai_client);
        Self {
            config,
            world_service: WorldServiceImpl::new(repository.clone()),
            campaign_service: CampaignServiceImpl::new(repository.clone()),
            adventure_service: AdventureServiceImpl::new(repository.clone()),
            scene_service: SceneServiceImpl::new(repository.clone()),
            encounter_service: EncounterServiceImpl::new(repository.clone()),
            stage_service: StageServiceImpl::new(repository.clone()),
            asset_service: AssetServiceImpl::new(repository.clone()),
            game_session_service: GameSessionServiceImpl::new(repository.clone()),
            schedule_service: ScheduleServiceImpl::new(repository.clone()),
            audit_log_service: AuditLogServiceImpl::new(repository.clone()),
            maintenance_mode_service: MaintenanceModeServiceImpl::new(repository.clone()),
            library_admin_service: LibraryAdminServiceImpl::new(repository.clone(), library_owner),
            asset_ingest_service: AssetIngestServiceImpl::new(
                repository,
                ai_service.clone(),
                library_owner,
            ),
            ai_service,
        }
    }
}
