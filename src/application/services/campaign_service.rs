//! Campaign Service - Application service for campaign management

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{CreateAdventureRequest, CreateCampaignRequest, UpdateCampaignRequest};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::adventure_service::{
    clone_adventure_tree, delete_adventure_tree, ensure_tree_not_in_play,
};
use crate::application::services::common::{check_create, check_patch, ensure_owner, ensure_visible, load};
use crate::domain::entities::{Adventure, Campaign, Shareable};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{AdventureId, CampaignId, UserId, WorldId};

/// Campaign service trait defining the application use cases
#[async_trait]
pub trait CampaignService: Send + Sync {
    async fn list_campaigns(&self, user: UserId) -> ServiceResult<Vec<Campaign>>;

    async fn get_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign>;

    async fn create_campaign(
        &self,
        user: UserId,
        request: CreateCampaignRequest,
    ) -> ServiceResult<Campaign>;

    async fn update_campaign(
        &self,
        user: UserId,
        id: CampaignId,
        request: UpdateCampaignRequest,
    ) -> ServiceResult<Campaign>;

    /// Delete a campaign together with its adventures
    async fn delete_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<()>;

    async fn clone_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign>;

    async fn list_adventures(&self, user: UserId, id: CampaignId) -> ServiceResult<Vec<Adventure>>;

    async fn add_new_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        request: CreateAdventureRequest,
    ) -> ServiceResult<Adventure>;

    async fn add_cloned_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        adventure_id: AdventureId,
    ) -> ServiceResult<Adventure>;

    /// Detach an adventure; it survives as a standalone adventure
    async fn remove_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        adventure_id: AdventureId,
    ) -> ServiceResult<()>;

    /// Move a campaign into a world; the caller must own both
    async fn move_to_world(
        &self,
        user: UserId,
        id: CampaignId,
        world_id: WorldId,
    ) -> ServiceResult<Campaign>;

    async fn make_standalone(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign>;
}

/// Copy a campaign and all of its adventures for `owner`
pub(crate) async fn clone_campaign_tree(
    repository: &Repository,
    source: &Campaign,
    owner: UserId,
    world_id: Option<WorldId>,
    name: String,
) -> ServiceResult<Campaign> {
    let mut clone = source.clone_for(owner, name);
    clone.world_id = world_id;
    repository.campaigns().save(&clone).await?;

    let adventures = repository.adventures().list_by_parent(source.id.into()).await?;
    for adventure in &adventures {
        clone_adventure_tree(repository, adventure, owner, Some(clone.id), adventure.name.clone())
            .await?;
    }
    debug!(campaign_id = %clone.id, adventures = adventures.len(), "Cloned campaign tree");
    Ok(clone)
}

/// Adventures directly below a campaign
pub(crate) async fn campaign_adventures(
    repository: &Repository,
    id: CampaignId,
) -> ServiceResult<Vec<AdventureId>> {
    let adventures = repository.adventures().list_by_parent(id.into()).await?;
    Ok(adventures.into_iter().map(|a| a.id).collect())
}

/// Remove a campaign and every adventure below it.
///
/// Nothing is removed while a live session uses one of its scenes or encounters.
pub(crate) async fn delete_campaign_tree(repository: &Repository, id: CampaignId) -> ServiceResult<()> {
    let adventures = campaign_adventures(repository, id).await?;
    ensure_tree_not_in_play(repository, &adventures).await?;
    for &adventure in &adventures {
        delete_adventure_tree(repository, adventure).await?;
    }
    repository.campaigns().delete(id).await?;
    Ok(())
}

/// Default implementation of CampaignService
#[derive(Clone)]
pub struct CampaignServiceImpl {
    repository: Repository,
}

impl CampaignServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign> {
        let campaign = load(self.repository.campaigns(), id, "Campaign").await?;
        ensure_owner(&campaign, user, "Campaign")?;
        Ok(campaign)
    }

    async fn ensure_world_owner(&self, user: UserId, world_id: WorldId) -> ServiceResult<()> {
        let world = load(self.repository.worlds(), world_id, "World").await?;
        ensure_owner(&world, user, "World")
    }
}

#[async_trait]
impl CampaignService for CampaignServiceImpl {
    #[instrument(skip(self))]
    async fn list_campaigns(&self, user: UserId) -> ServiceResult<Vec<Campaign>> {
        let campaigns = self.repository.campaigns().list().await?;
        Ok(campaigns.into_iter().filter(|c| c.is_visible_to(user)).collect())
    }

    #[instrument(skip(self))]
    async fn get_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign> {
        let campaign = load(self.repository.campaigns(), id, "Campaign").await?;
        ensure_visible(&campaign, user, "Campaign")?;
        Ok(campaign)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_campaign(
        &self,
        user: UserId,
        request: CreateCampaignRequest,
    ) -> ServiceResult<Campaign> {
        check_create("Campaign", &request.name, &request.description)?;
        if let Some(world_id) = request.world_id {
            self.ensure_world_owner(user, world_id).await?;
        }

        let mut campaign = Campaign::new(user, request.name.trim(), request.description);
        campaign.world_id = request.world_id;
        campaign.background = request.background;
        self.repository.campaigns().save(&campaign).await?;

        info!(campaign_id = %campaign.id, "Created new campaign: {}", campaign.name);
        Ok(campaign)
    }

    #[instrument(skip(self, request))]
    async fn update_campaign(
        &self,
        user: UserId,
        id: CampaignId,
        request: UpdateCampaignRequest,
    ) -> ServiceResult<Campaign> {
        let mut campaign = self.owned_campaign(user, id).await?;
        check_patch("Campaign", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            campaign.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            campaign.description = description;
        }
        if let Some(background) = request.background {
            campaign.background = background;
        }
        if let Some(is_published) = request.is_published {
            campaign.is_published = is_published;
        }
        if let Some(is_public) = request.is_public {
            campaign.is_public = is_public;
        }
        campaign.touch();
        self.repository.campaigns().save(&campaign).await?;

        info!(campaign_id = %campaign.id, "Updated campaign: {}", campaign.name);
        Ok(campaign)
    }

    #[instrument(skip(self))]
    async fn delete_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<()> {
        let campaign = self.owned_campaign(user, id).await?;
        delete_campaign_tree(&self.repository, id).await?;
        info!(campaign_id = %id, "Deleted campaign: {}", campaign.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_campaign(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign> {
        let mut original = load(self.repository.campaigns(), id, "Campaign").await?;
        ensure_visible(&original, user, "Campaign")?;

        let siblings = self.repository.campaigns().list_by_owner(user).await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|c| c.name.as_str()));
        if let (Some(renamed), true) = (names.original, original.is_owned_by(user)) {
            original.name = renamed;
            original.touch();
            self.repository.campaigns().save(&original).await?;
        }

        // A clone of somebody else's campaign cannot stay in their world
        let world_id = original.world_id.filter(|_| original.is_owned_by(user));
        let clone = clone_campaign_tree(&self.repository, &original, user, world_id, names.clone).await?;

        info!(campaign_id = %clone.id, source_id = %id, "Cloned campaign as: {}", clone.name);
        Ok(clone)
    }

    #[instrument(skip(self))]
    async fn list_adventures(&self, user: UserId, id: CampaignId) -> ServiceResult<Vec<Adventure>> {
        let campaign = self.get_campaign(user, id).await?;
        let adventures = self.repository.adventures().list_by_parent(id.into()).await?;
        Ok(adventures
            .into_iter()
            .filter(|a| campaign.is_owned_by(user) || a.is_visible_to(user))
            .collect())
    }

    #[instrument(skip(self, request))]
    async fn add_new_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        request: CreateAdventureRequest,
    ) -> ServiceResult<Adventure> {
        self.owned_campaign(user, id).await?;
        check_create("Adventure", &request.name, &request.description)?;

        let mut adventure = Adventure::new(user, request.name.trim(), request.description)
            .in_campaign(id)
            .with_style(request.style);
        adventure.is_one_shot = request.is_one_shot;
        adventure.background = request.background;
        self.repository.adventures().save(&adventure).await?;

        info!(campaign_id = %id, adventure_id = %adventure.id, "Added adventure to campaign");
        Ok(adventure)
    }

    #[instrument(skip(self))]
    async fn add_cloned_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        adventure_id: AdventureId,
    ) -> ServiceResult<Adventure> {
        self.owned_campaign(user, id).await?;
        let source = load(self.repository.adventures(), adventure_id, "Adventure").await?;
        ensure_visible(&source, user, "Adventure")?;

        let clone =
            clone_adventure_tree(&self.repository, &source, user, Some(id), source.name.clone())
                .await?;

        info!(campaign_id = %id, adventure_id = %clone.id, source_id = %adventure_id, "Added cloned adventure to campaign");
        Ok(clone)
    }

    #[instrument(skip(self))]
    async fn remove_adventure(
        &self,
        user: UserId,
        id: CampaignId,
        adventure_id: AdventureId,
    ) -> ServiceResult<()> {
        self.owned_campaign(user, id).await?;
        let mut adventure = load(self.repository.adventures(), adventure_id, "Adventure").await?;
        if adventure.campaign_id != Some(id) {
            return Err(ServiceError::not_found("Adventure"));
        }

        adventure.campaign_id = None;
        adventure.touch();
        self.repository.adventures().save(&adventure).await?;

        info!(campaign_id = %id, adventure_id = %adventure_id, "Removed adventure from campaign");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn move_to_world(
        &self,
        user: UserId,
        id: CampaignId,
        world_id: WorldId,
    ) -> ServiceResult<Campaign> {
        let mut campaign = self.owned_campaign(user, id).await?;
        self.ensure_world_owner(user, world_id).await?;

        campaign.world_id = Some(world_id);
        campaign.touch();
        self.repository.campaigns().save(&campaign).await?;

        info!(campaign_id = %id, world_id = %world_id, "Moved campaign to world");
        Ok(campaign)
    }

    #[instrument(skip(self))]
    async fn make_standalone(&self, user: UserId, id: CampaignId) -> ServiceResult<Campaign> {
        let mut campaign = self.owned_campaign(user, id).await?;
        if campaign.world_id.take().is_some() {
            campaign.touch();
            self.repository.campaigns().save(&campaign).await?;
            info!(campaign_id = %id, "Campaign is now standalone");
        }
        Ok(campaign)
    }
}
