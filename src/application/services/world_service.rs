//! World Service - Application service for world management
//!
//! Worlds sit at the top of the library. Deleting a world removes its
//! campaigns together with their adventures, scenes and encounters.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{CreateCampaignRequest, CreateWorldRequest, UpdateWorldRequest};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::adventure_service::ensure_tree_not_in_play;
use crate::application::services::campaign_service::{
    campaign_adventures, clone_campaign_tree, delete_campaign_tree,
};
use crate::application::services::common::{check_create, check_patch, ensure_owner, ensure_visible, load};
use crate::domain::entities::{Campaign, Shareable, World};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{CampaignId, UserId, WorldId};

/// World service trait defining the application use cases
#[async_trait]
pub trait WorldService: Send + Sync {
    /// Worlds the user owns plus public, published ones
    async fn list_worlds(&self, user: UserId) -> ServiceResult<Vec<World>>;

    async fn get_world(&self, user: UserId, id: WorldId) -> ServiceResult<World>;

    async fn create_world(&self, user: UserId, request: CreateWorldRequest) -> ServiceResult<World>;

    async fn update_world(
        &self,
        user: UserId,
        id: WorldId,
        request: UpdateWorldRequest,
    ) -> ServiceResult<World>;

    /// Delete a world with cascading cleanup of its campaigns
    async fn delete_world(&self, user: UserId, id: WorldId) -> ServiceResult<()>;

    async fn clone_world(&self, user: UserId, id: WorldId) -> ServiceResult<World>;

    async fn list_campaigns(&self, user: UserId, id: WorldId) -> ServiceResult<Vec<Campaign>>;

    async fn add_new_campaign(
        &self,
        user: UserId,
        id: WorldId,
        request: CreateCampaignRequest,
    ) -> ServiceResult<Campaign>;

    /// Clone an existing campaign into this world
    async fn add_cloned_campaign(
        &self,
        user: UserId,
        id: WorldId,
        campaign_id: CampaignId,
    ) -> ServiceResult<Campaign>;

    /// Detach a campaign; it survives as a standalone campaign
    async fn remove_campaign(
        &self,
        user: UserId,
        id: WorldId,
        campaign_id: CampaignId,
    ) -> ServiceResult<()>;
}

/// Default implementation of WorldService
#[derive(Clone)]
pub struct WorldServiceImpl {
    repository: Repository,
}

impl WorldServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_world(&self, user: UserId, id: WorldId) -> ServiceResult<World> {
        let world = load(self.repository.worlds(), id, "World").await?;
        ensure_owner(&world, user, "World")?;
        Ok(world)
    }
}

#[async_trait]
impl WorldService for WorldServiceImpl {
    #[instrument(skip(self))]
    async fn list_worlds(&self, user: UserId) -> ServiceResult<Vec<World>> {
        debug!(user_id = %user, "Listing worlds");
        let worlds = self.repository.worlds().list().await?;
        Ok(worlds.into_iter().filter(|w| w.is_visible_to(user)).collect())
    }

    #[instrument(skip(self))]
    async fn get_world(&self, user: UserId, id: WorldId) -> ServiceResult<World> {
        let world = load(self.repository.worlds(), id, "World").await?;
        ensure_visible(&world, user, "World")?;
        Ok(world)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_world(&self, user: UserId, request: CreateWorldRequest) -> ServiceResult<World> {
        check_create("World", &request.name, &request.description)?;

        let mut world = World::new(user, request.name.trim(), request.description);
        world.background = request.background;
        self.repository.worlds().save(&world).await?;

        info!(world_id = %world.id, "Created new world: {}", world.name);
        Ok(world)
    }

    #[instrument(skip(self, request))]
    async fn update_world(
        &self,
        user: UserId,
        id: WorldId,
        request: UpdateWorldRequest,
    ) -> ServiceResult<World> {
        let mut world = self.owned_world(user, id).await?;
        check_patch("World", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            world.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            world.description = description;
        }
        if let Some(background) = request.background {
            world.background = background;
        }
        if let Some(is_published) = request.is_published {
            world.is_published = is_published;
        }
        if let Some(is_public) = request.is_public {
            world.is_public = is_public;
        }
        world.touch();
        self.repository.worlds().save(&world).await?;

        info!(world_id = %world.id, "Updated world: {}", world.name);
        Ok(world)
    }

    #[instrument(skip(self))]
    async fn delete_world(&self, user: UserId, id: WorldId) -> ServiceResult<()> {
        let world = self.owned_world(user, id).await?;

        let campaigns = self.repository.campaigns().list_by_parent(id.into()).await?;
        let mut adventures = Vec::new();
        for campaign in &campaigns {
            adventures.extend(campaign_adventures(&self.repository, campaign.id).await?);
        }
        ensure_tree_not_in_play(&self.repository, &adventures).await?;
        for campaign in &campaigns {
            delete_campaign_tree(&self.repository, campaign.id).await?;
        }
        self.repository.worlds().delete(id).await?;

        info!(world_id = %id, campaigns = campaigns.len(), "Deleted world: {}", world.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_world(&self, user: UserId, id: WorldId) -> ServiceResult<World> {
        let mut original = load(self.repository.worlds(), id, "World").await?;
        ensure_visible(&original, user, "World")?;

        let siblings = self.repository.worlds().list_by_owner(user).await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|w| w.name.as_str()));
        if let (Some(renamed), true) = (names.original, original.is_owned_by(user)) {
            original.name = renamed;
            original.touch();
            self.repository.worlds().save(&original).await?;
        }

        let clone = original.clone_for(user, names.clone);
        self.repository.worlds().save(&clone).await?;

        let campaigns = self.repository.campaigns().list_by_parent(id.into()).await?;
        for campaign in &campaigns {
            clone_campaign_tree(&self.repository, campaign, user, Some(clone.id), campaign.name.clone())
                .await?;
        }

        info!(world_id = %clone.id, source_id = %id, "Cloned world as: {}", clone.name);
        Ok(clone)
    }

    #[instrument(skip(self))]
    async fn list_campaigns(&self, user: UserId, id: WorldId) -> ServiceResult<Vec<Campaign>> {
        let world = load(self.repository.worlds(), id, "World").await?;
        ensure_visible(&world, user, "World")?;
        let campaigns = self.repository.campaigns().list_by_parent(id.into()).await?;
        Ok(campaigns
            .into_iter()
            .filter(|c| world.is_owned_by(user) || c.is_visible_to(user))
            .collect())
    }

    #[instrument(skip(self, request))]
    async fn add_new_campaign(
        &self,
        user: UserId,
        id: WorldId,
        request: CreateCampaignRequest,
    ) -> ServiceResult<Campaign> {
        self.owned_world(user, id).await?;
        check_create("Campaign", &request.name, &request.description)?;

        let mut campaign = Campaign::new(user, request.name.trim(), request.description).in_world(id);
        campaign.background = request.background;
        self.repository.campaigns().save(&campaign).await?;

        info!(world_id = %id, campaign_id = %campaign.id, "Added campaign to world");
        Ok(campaign)
    }

    #[instrument(skip(self))]
    async fn add_cloned_campaign(
        &self,
        user: UserId,
        id: WorldId,
        campaign_id: CampaignId,
    ) -> ServiceResult<Campaign> {
        self.owned_world(user, id).await?;
        let source = load(self.repository.campaigns(), campaign_id, "Campaign").await?;
        ensure_visible(&source, user, "Campaign")?;

        let clone =
            clone_campaign_tree(&self.repository, &source, user, Some(id), source.name.clone()).await?;

        info!(world_id = %id, campaign_id = %clone.id, source_id = %campaign_id, "Added cloned campaign to world");
        Ok(clone)
    }

    #[instrument(skip(self))]
    async fn remove_campaign(
        &self,
        user: UserId,
        id: WorldId,
        campaign_id: CampaignId,
    ) -> ServiceResult<()> {
        self.owned_world(user, id).await?;
        let mut campaign = load(self.repository.campaigns(), campaign_id, "Campaign").await?;
        if campaign.world_id != Some(id) {
            return Err(ServiceError::not_found("Campaign"));
        }

        campaign.world_id = None;
        campaign.touch();
        self.repository.campaigns().save(&campaign).await?;

        info!(world_id = %id, campaign_id = %campaign_id, "Removed campaign from world");
        Ok(())
    }
}
