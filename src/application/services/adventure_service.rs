//! Adventure Service - Application service for adventure management
//!
//! Adventures own their scenes and encounters. Those children carry a copy of
//! the adventure owner so they can be listed per user without a join.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{
    CreateAdventureRequest, CreateEncounterRequest, CreateSceneRequest, UpdateAdventureRequest,
};
use crate::application::errors::ServiceResult;
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{
    check_create, check_patch, ensure_not_in_play, ensure_owner, ensure_visible, load,
};
use crate::domain::entities::{Adventure, Encounter, Scene, Shareable};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{AdventureId, CampaignId, StageId, UserId};

/// Adventure service trait defining the application use cases
#[async_trait]
pub trait AdventureService: Send + Sync {
    async fn list_adventures(&self, user: UserId) -> ServiceResult<Vec<Adventure>>;

    async fn get_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure>;

    async fn create_adventure(
        &self,
        user: UserId,
        request: CreateAdventureRequest,
    ) -> ServiceResult<Adventure>;

    async fn update_adventure(
        &self,
        user: UserId,
        id: AdventureId,
        request: UpdateAdventureRequest,
    ) -> ServiceResult<Adventure>;

    /// Delete an adventure together with its scenes and encounters
    async fn delete_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<()>;

    async fn clone_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure>;

    async fn move_to_campaign(
        &self,
        user: UserId,
        id: AdventureId,
        campaign_id: CampaignId,
    ) -> ServiceResult<Adventure>;

    async fn make_standalone(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure>;

    async fn list_scenes(&self, user: UserId, id: AdventureId) -> ServiceResult<Vec<Scene>>;

    async fn list_encounters(&self, user: UserId, id: AdventureId) -> ServiceResult<Vec<Encounter>>;

    async fn add_scene(
        &self,
        user: UserId,
        id: AdventureId,
        request: CreateSceneRequest,
    ) -> ServiceResult<Scene>;

    async fn add_encounter(
        &self,
        user: UserId,
        id: AdventureId,
        request: CreateEncounterRequest,
    ) -> ServiceResult<Encounter>;
}

/// Copy an adventure with its scenes and encounters for `owner`
pub(crate) async fn clone_adventure_tree(
    repository: &Repository,
    source: &Adventure,
    owner: UserId,
    campaign_id: Option<CampaignId>,
    name: String,
) -> ServiceResult<Adventure> {
    let mut clone = source.clone_for(owner, name);
    clone.campaign_id = campaign_id;
    repository.adventures().save(&clone).await?;

    let scenes = repository.scenes().list_by_parent(source.id.into()).await?;
    for scene in &scenes {
        repository
            .scenes()
            .save(&scene.clone_into(owner, clone.id, scene.name.clone()))
            .await?;
    }
    let encounters = repository.encounters().list_by_parent(source.id.into()).await?;
    for encounter in &encounters {
        repository
            .encounters()
            .save(&encounter.clone_into(owner, clone.id, encounter.name.clone()))
            .await?;
    }

    debug!(
        adventure_id = %clone.id,
        scenes = scenes.len(),
        encounters = encounters.len(),
        "Cloned adventure tree"
    );
    Ok(clone)
}

/// Refuse when a live session points at a scene or encounter below these adventures
pub(crate) async fn ensure_tree_not_in_play(
    repository: &Repository,
    adventures: &[AdventureId],
) -> ServiceResult<()> {
    let mut scenes = HashSet::new();
    let mut encounters = HashSet::new();
    for &id in adventures {
        let scene_ids = repository.scenes().list_by_parent(id.into()).await?;
        scenes.extend(scene_ids.into_iter().map(|s| s.id));
        let encounter_ids = repository.encounters().list_by_parent(id.into()).await?;
        encounters.extend(encounter_ids.into_iter().map(|e| e.id));
    }
    ensure_not_in_play(repository, "Scene", |s| {
        s.scene_id.is_some_and(|id| scenes.contains(&id))
    })
    .await?;
    ensure_not_in_play(repository, "Encounter", |s| {
        s.encounter_id.is_some_and(|id| encounters.contains(&id))
    })
    .await
}

/// Remove an adventure and its scenes and encounters
pub(crate) async fn delete_adventure_tree(repository: &Repository, id: AdventureId) -> ServiceResult<()> {
    for scene in repository.scenes().list_by_parent(id.into()).await? {
        repository.scenes().delete(scene.id).await?;
    }
    for encounter in repository.encounters().list_by_parent(id.into()).await? {
        repository.encounters().delete(encounter.id).await?;
    }
    repository.adventures().delete(id).await?;
    Ok(())
}

/// The stage a scene or encounter points at must exist and be usable by `user`
pub(crate) async fn check_stage(
    repository: &Repository,
    user: UserId,
    stage_id: Option<StageId>,
) -> ServiceResult<()> {
    if let Some(stage_id) = stage_id {
        let stage = load(repository.stages(), stage_id, "Stage").await?;
        ensure_visible(&stage, user, "Stage")?;
    }
    Ok(())
}

/// Default implementation of AdventureService
#[derive(Clone)]
pub struct AdventureServiceImpl {
    repository: Repository,
}

impl AdventureServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure> {
        let adventure = load(self.repository.adventures(), id, "Adventure").await?;
        ensure_owner(&adventure, user, "Adventure")?;
        Ok(adventure)
    }

    async fn ensure_campaign_owner(&self, user: UserId, campaign_id: CampaignId) -> ServiceResult<()> {
        let campaign = load(self.repository.campaigns(), campaign_id, "Campaign").await?;
        ensure_owner(&campaign, user, "Campaign")
    }
}

#[async_trait]
impl AdventureService for AdventureServiceImpl {
    #[instrument(skip(self))]
    async fn list_adventures(&self, user: UserId) -> ServiceResult<Vec<Adventure>> {
        let adventures = self.repository.adventures().list().await?;
        Ok(adventures.into_iter().filter(|a| a.is_visible_to(user)).collect())
    }

    #[instrument(skip(self))]
    async fn get_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure> {
        let adventure = load(self.repository.adventures(), id, "Adventure").await?;
        ensure_visible(&adventure, user, "Adventure")?;
        Ok(adventure)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_adventure(
        &self,
        user: UserId,
        request: CreateAdventureRequest,
    ) -> ServiceResult<Adventure> {
        check_create("Adventure", &request.name, &request.description)?;
        if let Some(campaign_id) = request.campaign_id {
            self.ensure_campaign_owner(user, campaign_id).await?;
        }

        let mut adventure =
            Adventure::new(user, request.name.trim(), request.description).with_style(request.style);
        adventure.campaign_id = request.campaign_id;
        adventure.is_one_shot = request.is_one_shot;
        adventure.background = request.background;
        self.repository.adventures().save(&adventure).await?;

        info!(adventure_id = %adventure.id, "Created new adventure: {}", adventure.name);
        Ok(adventure)
    }

    #[instrument(skip(self, request))]
    async fn update_adventure(
        &self,
        user: UserId,
        id: AdventureId,
        request: UpdateAdventureRequest,
    ) -> ServiceResult<Adventure> {
        let mut adventure = self.owned_adventure(user, id).await?;
        check_patch("Adventure", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            adventure.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            adventure.description = description;
        }
        if let Some(style) = request.style {
            adventure.style = style;
        }
        if let Some(is_one_shot) = request.is_one_shot {
            adventure.is_one_shot = is_one_shot;
        }
        if let Some(background) = request.background {
            adventure.background = background;
        }
        if let Some(is_published) = request.is_published {
            adventure.is_published = is_published;
        }
        if let Some(is_public) = request.is_public {
            adventure.is_public = is_public;
        }
        adventure.touch();
        self.repository.adventures().save(&adventure).await?;

        info!(adventure_id = %adventure.id, "Updated adventure: {}", adventure.name);
        Ok(adventure)
    }

    #[instrument(skip(self))]
    async fn delete_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<()> {
        let adventure = self.owned_adventure(user, id).await?;
        ensure_tree_not_in_play(&self.repository, &[id]).await?;
        delete_adventure_tree(&self.repository, id).await?;
        info!(adventure_id = %id, "Deleted adventure: {}", adventure.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_adventure(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure> {
        let mut original = load(self.repository.adventures(), id, "Adventure").await?;
        ensure_visible(&original, user, "Adventure")?;

        let siblings = self.repository.adventures().list_by_owner(user).await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|a| a.name.as_str()));
        if let (Some(renamed), true) = (names.original, original.is_owned_by(user)) {
            original.name = renamed;
            original.touch();
            self.repository.adventures().save(&original).await?;
        }

        let campaign_id = original.campaign_id.filter(|_| original.is_owned_by(user));
        let clone =
            clone_adventure_tree(&self.repository, &original, user, campaign_id, names.clone).await?;

        info!(adventure_id = %clone.id, source_id = %id, "Cloned adventure as: {}", clone.name);
        Ok(clone)
    }

    #[instrument(skip(self))]
    async fn move_to_campaign(
        &self,
        user: UserId,
        id: AdventureId,
        campaign_id: CampaignId,
    ) -> ServiceResult<Adventure> {
        let mut adventure = self.owned_adventure(user, id).await?;
        self.ensure_campaign_owner(user, campaign_id).await?;

        adventure.campaign_id = Some(campaign_id);
        adventure.touch();
        self.repository.adventures().save(&adventure).await?;

        info!(adventure_id = %id, campaign_id = %campaign_id, "Moved adventure to campaign");
        Ok(adventure)
    }

    #[instrument(skip(self))]
    async fn make_standalone(&self, user: UserId, id: AdventureId) -> ServiceResult<Adventure> {
        let mut adventure = self.owned_adventure(user, id).await?;
        if adventure.campaign_id.take().is_some() {
            adventure.touch();
            self.repository.adventures().save(&adventure).await?;
            info!(adventure_id = %id, "Adventure is now standalone");
        }
        Ok(adventure)
    }

    #[instrument(skip(self))]
    async fn list_scenes(&self, user: UserId, id: AdventureId) -> ServiceResult<Vec<Scene>> {
        self.get_adventure(user, id).await?;
        Ok(self.repository.scenes().list_by_parent(id.into()).await?)
    }

    #[instrument(skip(self))]
    async fn list_encounters(&self, user: UserId, id: AdventureId) -> ServiceResult<Vec<Encounter>> {
        self.get_adventure(user, id).await?;
        Ok(self.repository.encounters().list_by_parent(id.into()).await?)
    }

    #[instrument(skip(self, request))]
    async fn add_scene(
        &self,
        user: UserId,
        id: AdventureId,
        request: CreateSceneRequest,
    ) -> ServiceResult<Scene> {
        let adventure = self.owned_adventure(user, id).await?;
        check_create("Scene", &request.name, &request.description)?;
        check_stage(&self.repository, user, request.stage_id).await?;

        let scene = Scene::new(adventure.owner_id, id, request.name.trim(), request.description)
            .with_stage(request.stage_id);
        self.repository.scenes().save(&scene).await?;

        info!(adventure_id = %id, scene_id = %scene.id, "Added scene: {}", scene.name);
        Ok(scene)
    }

    #[instrument(skip(self, request))]
    async fn add_encounter(
        &self,
        user: UserId,
        id: AdventureId,
        request: CreateEncounterRequest,
    ) -> ServiceResult<Encounter> {
        let adventure = self.owned_adventure(user, id).await?;
        check_create("Encounter", &request.name, &request.description)?;
        check_stage(&self.repository, user, request.stage_id).await?;

        let mut encounter =
            Encounter::new(adventure.owner_id, id, request.name.trim(), request.description);
        encounter.stage_id = request.stage_id;
        self.repository.encounters().save(&encounter).await?;

        info!(adventure_id = %id, encounter_id = %encounter.id, "Added encounter: {}", encounter.name);
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ServiceError;
    use crate::domain::entities::{AdventureStyle, Campaign, GameSession, Stage};
    use crate::infrastructure::persistence::in_memory_repository;

    fn request(name: &str) -> CreateAdventureRequest {
        CreateAdventureRequest {
            name: name.to_string(),
            description: "Into the dark".to_string(),
            style: AdventureStyle::DungeonCrawl,
            is_one_shot: true,
            background: None,
            campaign_id: None,
        }
    }

    fn scene_request(name: &str) -> CreateSceneRequest {
        CreateSceneRequest {
            name: name.to_string(),
            description: String::new(),
            stage_id: None,
        }
    }

    #[tokio::test]
    async fn test_delete_refused_while_child_scene_is_live() {
        let repository = in_memory_repository();
        let service = AdventureServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();
        let scene = service.add_scene(owner, adventure.id, scene_request("Gate")).await.unwrap();
        let encounter = service
            .add_encounter(owner, adventure.id, scene_request("Skeletons"))
            .await
            .unwrap();

        let mut session = GameSession::new(owner, "Friday game");
        session.scene_id = Some(scene.id);
        session.start().unwrap();
        repository.game_sessions().save(&session).await.unwrap();

        let err = service.delete_adventure(owner, adventure.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(repository.scenes().get(scene.id).await.unwrap().is_some());
        assert!(repository.encounters().get(encounter.id).await.unwrap().is_some());
        assert!(repository.adventures().get(adventure.id).await.unwrap().is_some());

        session.finish().unwrap();
        repository.game_sessions().save(&session).await.unwrap();
        service.delete_adventure(owner, adventure.id).await.unwrap();
        assert!(repository.scenes().get(scene.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_adventure_keeps_style() {
        let service = AdventureServiceImpl::new(in_memory_repository());
        let owner = UserId::new();

        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();

        assert_eq!(adventure.style, AdventureStyle::DungeonCrawl);
        assert!(adventure.is_one_shot);
        assert!(adventure.campaign_id.is_none());
    }

    #[tokio::test]
    async fn test_clone_adventure_copies_children_with_new_ids() {
        let repository = in_memory_repository();
        let service = AdventureServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();
        let scene = service.add_scene(owner, adventure.id, scene_request("Gate")).await.unwrap();
        let encounter = service
            .add_encounter(owner, adventure.id, scene_request("Skeletons"))
            .await
            .unwrap();

        let clone = service.clone_adventure(owner, adventure.id).await.unwrap();

        assert!(!clone.is_published);
        let scenes = service.list_scenes(owner, clone.id).await.unwrap();
        let encounters = service.list_encounters(owner, clone.id).await.unwrap();
        assert_eq!(scenes.len(), 1);
        assert_ne!(scenes[0].id, scene.id);
        assert_eq!(scenes[0].name, "Gate");
        assert_eq!(encounters.len(), 1);
        assert_ne!(encounters[0].id, encounter.id);
    }

    #[tokio::test]
    async fn test_add_scene_requires_owner_and_existing_stage() {
        let repository = in_memory_repository();
        let service = AdventureServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();

        let denied = service
            .add_scene(UserId::new(), adventure.id, scene_request("Gate"))
            .await;
        assert!(matches!(denied, Err(ServiceError::NotAllowed(_))));

        let mut with_stage = scene_request("Gate");
        with_stage.stage_id = Some(StageId::new());
        let missing = service.add_scene(owner, adventure.id, with_stage.clone()).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        let stage = Stage::new(owner, "Crypt map", "");
        repository.stages().save(&stage).await.unwrap();
        with_stage.stage_id = Some(stage.id);
        let scene = service.add_scene(owner, adventure.id, with_stage).await.unwrap();
        assert_eq!(scene.stage_id, Some(stage.id));
    }

    #[tokio::test]
    async fn test_delete_adventure_cascades() {
        let repository = in_memory_repository();
        let service = AdventureServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();
        let scene = service.add_scene(owner, adventure.id, scene_request("Gate")).await.unwrap();

        service.delete_adventure(owner, adventure.id).await.unwrap();

        assert!(repository.scenes().get(scene.id).await.unwrap().is_none());
        let missing = service.get_adventure(owner, adventure.id).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_move_and_detach() {
        let repository = in_memory_repository();
        let service = AdventureServiceImpl::new(repository.clone());
        let owner = UserId::new();
        let campaign = Campaign::new(owner, "Arc", "");
        repository.campaigns().save(&campaign).await.unwrap();
        let adventure = service.create_adventure(owner, request("Crypt")).await.unwrap();

        let moved = service.move_to_campaign(owner, adventure.id, campaign.id).await.unwrap();
        assert_eq!(moved.campaign_id, Some(campaign.id));

        let detached = service.make_standalone(owner, adventure.id).await.unwrap();
        assert_eq!(detached.campaign_id, None);
    }
}
