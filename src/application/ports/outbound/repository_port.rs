//! Repository ports - Interfaces for data persistence
//!
//! Every aggregate is stored through the same generic [`RecordStore`] port.
//! Infrastructure provides the implementations; services only see the
//! [`Repository`] facade.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    Adventure, Asset, AuditLog, Campaign, Encounter, GameSession, MaintenanceMode, Scene,
    Schedule, Stage, World,
};
use crate::domain::value_objects::{
    AdventureId, AssetId, AuditLogId, CampaignId, EncounterId, GameSessionId, MaintenanceModeId,
    SceneId, ScheduleId, StageId, UserId, WorldId,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An aggregate that can be persisted as a document
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Copy + Into<Uuid> + Display + Send + Sync + 'static;

    /// Table or collection name
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;

    /// Owning user, indexed for `list_by_owner`
    fn owner(&self) -> Option<UserId> {
        None
    }

    /// Parent aggregate, indexed for `list_by_parent`
    fn parent(&self) -> Option<Uuid> {
        None
    }
}

/// Repository port for a single aggregate type
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn get(&self, id: T::Id) -> Result<Option<T>, RepoError>;

    async fn list(&self) -> Result<Vec<T>, RepoError>;

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<T>, RepoError>;

    async fn list_by_parent(&self, parent: Uuid) -> Result<Vec<T>, RepoError>;

    /// Insert or replace
    async fn save(&self, record: &T) -> Result<(), RepoError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: T::Id) -> Result<bool, RepoError>;
}

pub type Store<T> = Arc<dyn RecordStore<T>>;

/// All repositories the services need, behind one cheap-to-clone handle
#[derive(Clone)]
pub struct Repository {
    pub worlds: Store<World>,
    pub campaigns: Store<Campaign>,
    pub adventures: Store<Adventure>,
    pub scenes: Store<Scene>,
    pub encounters: Store<Encounter>,
    pub stages: Store<Stage>,
    pub assets: Store<Asset>,
    pub game_sessions: Store<GameSession>,
    pub schedules: Store<Schedule>,
    pub audit_logs: Store<AuditLog>,
    pub maintenance: Store<MaintenanceMode>,
}

impl Repository {
    pub fn worlds(&self) -> &dyn RecordStore<World> {
        self.worlds.as_ref()
    }

    pub fn campaigns(&self) -> &dyn RecordStore<Campaign> {
        self.campaigns.as_ref()
    }

    pub fn adventures(&self) -> &dyn RecordStore<Adventure> {
        self.adventures.as_ref()
    }

    pub fn scenes(&self) -> &dyn RecordStore<Scene> {
        self.scenes.as_ref()
    }

    pub fn encounters(&self) -> &dyn RecordStore<Encounter> {
        self.encounters.as_ref()
    }

    pub fn stages(&self) -> &dyn RecordStore<Stage> {
        self.stages.as_ref()
    }

    pub fn assets(&self) -> &dyn RecordStore<Asset> {
        self.assets.as_ref()
    }

    pub fn game_sessions(&self) -> &dyn RecordStore<GameSession> {
        self.game_sessions.as_ref()
    }

    pub fn schedules(&self) -> &dyn RecordStore<Schedule> {
        self.schedules.as_ref()
    }

    pub fn audit_logs(&self) -> &dyn RecordStore<AuditLog> {
        self.audit_logs.as_ref()
    }

    pub fn maintenance(&self) -> &dyn RecordStore<MaintenanceMode> {
        self.maintenance.as_ref()
    }
}

// =============================================================================
// Record mappings
// =============================================================================

macro_rules! owned_record {
    ($ty:ty, $id:ty, $table:literal, |$r:ident| $parent:expr) => {
        impl Record for $ty {
            type Id = $id;
            const TABLE: &'static str = $table;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn owner(&self) -> Option<UserId> {
                Some(self.owner_id)
            }

            fn parent(&self) -> Option<Uuid> {
                let $r = self;
                $parent
            }
        }
    };
}

owned_record!(World, WorldId, "worlds", |_r| None);
owned_record!(Campaign, CampaignId, "campaigns", |r| r.world_id.map(Into::into));
owned_record!(Adventure, AdventureId, "adventures", |r| r.campaign_id.map(Into::into));
owned_record!(Scene, SceneId, "scenes", |r| Some(r.adventure_id.into()));
owned_record!(Encounter, EncounterId, "encounters", |r| Some(r.adventure_id.into()));
owned_record!(Stage, StageId, "stages", |_r| None);
owned_record!(Asset, AssetId, "assets", |_r| None);
owned_record!(GameSession, GameSessionId, "game_sessions", |r| r.schedule_id.map(Into::into));
owned_record!(Schedule, ScheduleId, "schedules", |_r| None);

impl Record for AuditLog {
    type Id = AuditLogId;
    const TABLE: &'static str = "audit_logs";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn owner(&self) -> Option<UserId> {
        self.user_id
    }
}

impl Record for MaintenanceMode {
    type Id = MaintenanceModeId;
    const TABLE: &'static str = "maintenance_modes";

    fn id(&self) -> Self::Id {
        self.id
    }
}
