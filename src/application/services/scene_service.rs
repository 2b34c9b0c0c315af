//! Scene Service - Application service for scenes inside adventures

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::dto::UpdateSceneRequest;
use crate::application::errors::ServiceResult;
use crate::application::ports::outbound::Repository;
use crate::application::services::adventure_service::check_stage;
use crate::application::services::common::{
    check_patch, ensure_not_in_play, ensure_owner, ensure_visible, load,
};
use crate::domain::entities::{Adventure, Scene};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{SceneId, UserId};

#[async_trait]
pub trait SceneService: Send + Sync {
    async fn get_scene(&self, user: UserId, id: SceneId) -> ServiceResult<Scene>;

    async fn update_scene(
        &self,
        user: UserId,
        id: SceneId,
        request: UpdateSceneRequest,
    ) -> ServiceResult<Scene>;

    async fn delete_scene(&self, user: UserId, id: SceneId) -> ServiceResult<()>;

    /// Copy a scene within its own adventure
    async fn clone_scene(&self, user: UserId, id: SceneId) -> ServiceResult<Scene>;
}

#[derive(Clone)]
pub struct SceneServiceImpl {
    repository: Repository,
}

impl SceneServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn load_with_adventure(&self, id: SceneId) -> ServiceResult<(Scene, Adventure)> {
        let scene = load(self.repository.scenes(), id, "Scene").await?;
        let adventure = load(self.repository.adventures(), scene.adventure_id, "Adventure").await?;
        Ok((scene, adventure))
    }

    async fn owned_scene(&self, user: UserId, id: SceneId) -> ServiceResult<Scene> {
        let (scene, adventure) = self.load_with_adventure(id).await?;
        ensure_owner(&adventure, user, "Adventure")?;
        Ok(scene)
    }
}

#[async_trait]
impl SceneService for SceneServiceImpl {
    #[instrument(skip(self))]
    async fn get_scene(&self, user: UserId, id: SceneId) -> ServiceResult<Scene> {
        let (scene, adventure) = self.load_with_adventure(id).await?;
        ensure_visible(&adventure, user, "Adventure")?;
        Ok(scene)
    }

    #[instrument(skip(self, request))]
    async fn update_scene(
        &self,
        user: UserId,
        id: SceneId,
        request: UpdateSceneRequest,
    ) -> ServiceResult<Scene> {
        let mut scene = self.owned_scene(user, id).await?;
        check_patch("Scene", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            scene.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            scene.description = description;
        }
        if let Some(stage_id) = request.stage_id {
            check_stage(&self.repository, user, stage_id).await?;
            scene.stage_id = stage_id;
        }
        scene.touch();
        self.repository.scenes().save(&scene).await?;

        info!(scene_id = %scene.id, "Updated scene: {}", scene.name);
        Ok(scene)
    }

    #[instrument(skip(self))]
    async fn delete_scene(&self, user: UserId, id: SceneId) -> ServiceResult<()> {
        let scene = self.owned_scene(user, id).await?;
        ensure_not_in_play(&self.repository, "Scene", |s| s.scene_id == Some(id)).await?;
        self.repository.scenes().delete(id).await?;
        info!(scene_id = %id, adventure_id = %scene.adventure_id, "Deleted scene");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_scene(&self, user: UserId, id: SceneId) -> ServiceResult<Scene> {
        let mut original = self.owned_scene(user, id).await?;

        let siblings = self
            .repository
            .scenes()
            .list_by_parent(original.adventure_id.into())
            .await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|s| s.name.as_str()));
        if let Some(renamed) = names.original {
            original.name = renamed;
            original.touch();
            self.repository.scenes().save(&original).await?;
        }

        let clone = original.clone_into(original.owner_id, original.adventure_id, names.clone);
        self.repository.scenes().save(&clone).await?;

        info!(scene_id = %clone.id, source_id = %id, "Cloned scene as: {}", clone.name);
        Ok(clone)
    }
}
