//! Application services - Use case implementations
//!
//! Each service is a trait plus an `Impl` holding the [`Repository`] facade,
//! so handlers depend on behaviour and tests run against the in-memory
//! backend.
//!
//! [`Repository`]: crate::application::ports::outbound::Repository

pub mod adventure_service;
pub mod ai_service;
pub mod asset_ingest_service;
pub mod asset_service;
pub mod audit_log_service;
pub mod campaign_service;
pub mod common;
pub mod encounter_service;
pub mod game_session_service;
pub mod library_admin_service;
pub mod maintenance_mode_service;
pub mod scene_service;
pub mod schedule_service;
pub mod stage_service;
pub mod world_service;

pub use adventure_service::{AdventureService, AdventureServiceImpl};
pub use ai_service::{AiService, AiServiceImpl};
pub use asset_ingest_service::{AssetIngestService, AssetIngestServiceImpl};
pub use asset_service::{AssetService, AssetServiceImpl};
pub use audit_log_service::{AuditLogService, AuditLogServiceImpl};
pub use campaign_service::{CampaignService, CampaignServiceImpl};
pub use encounter_service::{EncounterService, EncounterServiceImpl};
pub use game_session_service::{GameSessionService, GameSessionServiceImpl};
pub use library_admin_service::{LibraryAdminService, LibraryAdminServiceImpl};
pub use maintenance_mode_service::{MaintenanceModeService, MaintenanceModeServiceImpl};
pub use scene_service::{SceneService, SceneServiceImpl};
pub use schedule_service::{ScheduleService, ScheduleServiceImpl};
pub use stage_service::{StageService, StageServiceImpl};
pub use world_service::{WorldService, WorldServiceImpl};
