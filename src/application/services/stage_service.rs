//! Stage Service - Stage canvases and the structures drawn on them

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{CreateStageRequest, StageSettingsPatch, UpdateStageRequest};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{check_create, check_patch, ensure_owner, ensure_visible, load};
use crate::domain::entities::{Shareable, Stage, StageSettings, StageStructure};
use crate::domain::value_objects::{StageId, UserId};

#[async_trait]
pub trait StageService: Send + Sync {
    async fn list_stages(&self, user: UserId) -> ServiceResult<Vec<Stage>>;

    async fn get_stage(&self, user: UserId, id: StageId) -> ServiceResult<Stage>;

    async fn create_stage(&self, user: UserId, request: CreateStageRequest) -> ServiceResult<Stage>;

    async fn update_stage(
        &self,
        user: UserId,
        id: StageId,
        request: UpdateStageRequest,
    ) -> ServiceResult<Stage>;

    async fn delete_stage(&self, user: UserId, id: StageId) -> ServiceResult<()>;

    async fn clone_stage(&self, user: UserId, id: StageId) -> ServiceResult<Stage>;

    /// Append a wall, region, light, decoration or sound at the next index
    async fn add_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        item: T,
    ) -> ServiceResult<T>;

    /// Replace the structure stored at `index`, keeping the index
    async fn update_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        index: u32,
        item: T,
    ) -> ServiceResult<T>;

    async fn remove_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        index: u32,
    ) -> ServiceResult<()>;
}

fn apply_settings(settings: &mut StageSettings, patch: StageSettingsPatch) -> ServiceResult<()> {
    let mut errors = Vec::new();
    if let Some(volume) = patch.ambient_sound_volume {
        if !(0.0..=1.0).contains(&volume) {
            errors.push("Ambient sound volume must be between 0 and 1".to_string());
        }
    }
    if let Some(zoom) = patch.zoom_level {
        if zoom <= 0.0 {
            errors.push("Zoom level must be positive".to_string());
        }
    }
    ServiceError::check(errors)?;

    if let Some(background) = patch.main_background {
        settings.main_background = background;
    }
    if let Some(background) = patch.alternate_background {
        settings.alternate_background = background;
    }
    if let Some(flag) = patch.use_alternate_background {
        settings.use_alternate_background = flag;
    }
    if let Some(sound) = patch.ambient_sound {
        settings.ambient_sound = sound;
    }
    if let Some(volume) = patch.ambient_sound_volume {
        settings.ambient_sound_volume = volume;
    }
    if let Some(flag) = patch.ambient_sound_loop {
        settings.ambient_sound_loop = flag;
    }
    if let Some(flag) = patch.ambient_sound_is_playing {
        settings.ambient_sound_is_playing = flag;
    }
    if let Some(light) = patch.ambient_light {
        settings.ambient_light = light;
    }
    if let Some(weather) = patch.weather {
        settings.weather = weather;
    }
    if let Some(zoom) = patch.zoom_level {
        settings.zoom_level = zoom;
    }
    if let Some(panning) = patch.panning {
        settings.panning = panning;
    }
    Ok(())
}

#[derive(Clone)]
pub struct StageServiceImpl {
    repository: Repository,
}

impl StageServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_stage(&self, user: UserId, id: StageId) -> ServiceResult<Stage> {
        let stage = load(self.repository.stages(), id, "Stage").await?;
        ensure_owner(&stage, user, "Stage")?;
        Ok(stage)
    }

    async fn save(&self, stage: &mut Stage) -> ServiceResult<()> {
        stage.touch();
        self.repository.stages().save(stage).await?;
        Ok(())
    }
}

#[async_trait]
impl StageService for StageServiceImpl {
    #[instrument(skip(self))]
    async fn list_stages(&self, user: UserId) -> ServiceResult<Vec<Stage>> {
        let stages = self.repository.stages().list().await?;
        Ok(stages.into_iter().filter(|s| s.is_visible_to(user)).collect())
    }

    #[instrument(skip(self))]
    async fn get_stage(&self, user: UserId, id: StageId) -> ServiceResult<Stage> {
        let stage = load(self.repository.stages(), id, "Stage").await?;
        ensure_visible(&stage, user, "Stage")?;
        Ok(stage)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_stage(&self, user: UserId, request: CreateStageRequest) -> ServiceResult<Stage> {
        check_create("Stage", &request.name, &request.description)?;

        let stage = Stage::new(user, request.name.trim(), request.description);
        self.repository.stages().save(&stage).await?;

        info!(stage_id = %stage.id, "Created new stage: {}", stage.name);
        Ok(stage)
    }

    #[instrument(skip(self, request))]
    async fn update_stage(
        &self,
        user: UserId,
        id: StageId,
        request: UpdateStageRequest,
    ) -> ServiceResult<Stage> {
        let mut stage = self.owned_stage(user, id).await?;
        check_patch("Stage", request.name.as_deref(), request.description.as_deref())?;
        if let Some(grid) = &request.grid {
            ServiceError::check(grid.validate())?;
        }

        if let Some(name) = request.name {
            stage.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            stage.description = description;
        }
        if let Some(is_published) = request.is_published {
            stage.is_published = is_published;
        }
        if let Some(is_public) = request.is_public {
            stage.is_public = is_public;
        }
        if let Some(grid) = request.grid {
            stage.grid = grid;
        }
        if let Some(settings) = request.settings {
            apply_settings(&mut stage.settings, settings)?;
        }
        self.save(&mut stage).await?;

        info!(stage_id = %id, "Updated stage: {}", stage.name);
        Ok(stage)
    }

    #[instrument(skip(self))]
    async fn delete_stage(&self, user: UserId, id: StageId) -> ServiceResult<()> {
        self.owned_stage(user, id).await?;
        self.repository.stages().delete(id).await?;
        info!(stage_id = %id, "Deleted stage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_stage(&self, user: UserId, id: StageId) -> ServiceResult<Stage> {
        let source = self.get_stage(user, id).await?;
        let clone = source.clone_for(user);
        self.repository.stages().save(&clone).await?;

        info!(stage_id = %clone.id, source_id = %id, "Cloned stage as: {}", clone.name);
        Ok(clone)
    }

    #[instrument(skip(self, item), fields(kind = T::KIND))]
    async fn add_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        mut item: T,
    ) -> ServiceResult<T> {
        let mut stage = self.owned_stage(user, id).await?;
        stage.snap_structure(&mut item);
        let added = stage.add_structure(item);
        self.save(&mut stage).await?;

        debug!(stage_id = %id, index = added.index(), "Added {}", T::KIND);
        Ok(added)
    }

    #[instrument(skip(self, item), fields(kind = T::KIND))]
    async fn update_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        index: u32,
        mut item: T,
    ) -> ServiceResult<T> {
        let mut stage = self.owned_stage(user, id).await?;
        stage.snap_structure(&mut item);
        let updated = stage
            .replace_structure(index, item)
            .ok_or_else(|| ServiceError::not_found(T::KIND))?;
        self.save(&mut stage).await?;

        debug!(stage_id = %id, index, "Updated {}", T::KIND);
        Ok(updated)
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn remove_structure<T: StageStructure>(
        &self,
        user: UserId,
        id: StageId,
        index: u32,
    ) -> ServiceResult<()> {
        let mut stage = self.owned_stage(user, id).await?;
        if !stage.remove_structure::<T>(index) {
            return Err(ServiceError::not_found(T::KIND));
        }
        self.save(&mut stage).await?;

        debug!(stage_id = %id, index, "Removed {}", T::KIND);
        Ok(())
    }
}
