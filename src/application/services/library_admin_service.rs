//! Library Admin Service - moderation across every user's content

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::application::dto::{
    ContentKind, LibraryOverview, LibraryPage, LibrarySearchRequest, OwnerType, SortOrder,
};
use crate::application::errors::ServiceResult;
use crate::application::ports::outbound::{Record, RecordStore, Repository};
use crate::application::services::common::{load, paginate};
use crate::domain::entities::{
    Adventure, Asset, Campaign, Encounter, Scene, Shareable, Stage, World,
};
use crate::domain::value_objects::{AdventureId, CampaignId, UserId, WorldId};

#[async_trait]
pub trait LibraryAdminService: Send + Sync {
    async fn search_worlds(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<World>>;

    async fn search_campaigns(
        &self,
        request: LibrarySearchRequest,
    ) -> ServiceResult<LibraryPage<Campaign>>;

    async fn search_adventures(
        &self,
        request: LibrarySearchRequest,
    ) -> ServiceResult<LibraryPage<Adventure>>;

    async fn search_stages(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<Stage>>;

    async fn search_assets(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<Asset>>;

    async fn overview(&self) -> ServiceResult<LibraryOverview>;

    /// Hand an item and everything below it to `new_owner`
    async fn transfer_ownership(
        &self,
        admin: UserId,
        kind: ContentKind,
        id: Uuid,
        new_owner: UserId,
    ) -> ServiceResult<()>;
}

/// Records whose owner can be reassigned
trait Owned: Record {
    fn set_owner(&mut self, owner: UserId);
}

macro_rules! impl_owned {
    ($($ty:ty),+) => {
        $(
            impl Owned for $ty {
                fn set_owner(&mut self, owner: UserId) {
                    self.owner_id = owner;
                    self.touch();
                }
            }
        )+
    };
}

impl_owned!(World, Campaign, Adventure, Scene, Encounter, Stage, Asset);

/// Content the admin library search can filter
trait Searchable: Record + Shareable {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn matches_extra(&self, _request: &LibrarySearchRequest) -> bool {
        true
    }
}

macro_rules! impl_searchable {
    ($($ty:ty),+) => {
        $(
            impl Searchable for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn description(&self) -> &str {
                    &self.description
                }
            }
        )+
    };
}

impl_searchable!(World, Campaign, Adventure, Stage);

impl Searchable for Asset {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn matches_extra(&self, request: &LibrarySearchRequest) -> bool {
        request.kind.is_none_or(|kind| self.kind == kind)
            && request.category.as_deref().is_none_or(|category| {
                self.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category.trim()))
            })
    }
}

fn matches_search<T: Searchable>(item: &T, request: &LibrarySearchRequest, library_owner: UserId) -> bool {
    let text = request
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let owner = item.owner_id();
    text.is_none_or(|needle| {
        item.name().to_lowercase().contains(&needle)
            || item.description().to_lowercase().contains(&needle)
    }) && request.owner_id.is_none_or(|id| owner == id)
        && match request.owner_type.unwrap_or_default() {
            OwnerType::Master => owner == library_owner,
            OwnerType::User => owner != library_owner,
            OwnerType::All => true,
        }
        && request.is_published.is_none_or(|flag| item.is_published() == flag)
        && request.is_public.is_none_or(|flag| item.is_public() == flag)
        && item.matches_extra(request)
}

async fn search<T: Searchable>(
    store: &dyn RecordStore<T>,
    request: LibrarySearchRequest,
    library_owner: UserId,
) -> ServiceResult<LibraryPage<T>> {
    let mut items: Vec<T> = store
        .list()
        .await?
        .into_iter()
        .filter(|item| matches_search(item, &request, library_owner))
        .collect();
    items.sort_by_cached_key(|item| item.name().to_lowercase());
    if request.sort_order == Some(SortOrder::Desc) {
        items.reverse();
    }

    let page = paginate(items, request.skip, request.take)?;
    debug!(
        table = T::TABLE,
        total_count = page.total_count,
        returned = page.content.len(),
        "Library search completed"
    );
    Ok(page)
}

async fn reassign<T: Owned>(store: &dyn RecordStore<T>, record: &mut T, owner: UserId) -> ServiceResult<()> {
    record.set_owner(owner);
    store.save(record).await?;
    Ok(())
}

async fn reassign_children<T: Owned>(
    store: &dyn RecordStore<T>,
    parent: Uuid,
    owner: UserId,
) -> ServiceResult<Vec<T>> {
    let mut children = store.list_by_parent(parent).await?;
    for child in children.iter_mut() {
        reassign(store, child, owner).await?;
    }
    Ok(children)
}

#[derive(Clone)]
pub struct LibraryAdminServiceImpl {
    repository: Repository,
    /// Account that owns the public library
    library_owner: UserId,
}

impl LibraryAdminServiceImpl {
    pub fn new(repository: Repository, library_owner: UserId) -> Self {
        Self {
            repository,
            library_owner,
        }
    }

    async fn transfer_adventure(&self, id: AdventureId, owner: UserId) -> ServiceResult<()> {
        let repo = &self.repository;
        let mut adventure = load(repo.adventures(), id, "Adventure").await?;
        reassign(repo.adventures(), &mut adventure, owner).await?;
        reassign_children(repo.scenes(), id.into(), owner).await?;
        reassign_children(repo.encounters(), id.into(), owner).await?;
        Ok(())
    }

    async fn transfer_campaign(&self, id: CampaignId, owner: UserId) -> ServiceResult<()> {
        let repo = &self.repository;
        let mut campaign = load(repo.campaigns(), id, "Campaign").await?;
        reassign(repo.campaigns(), &mut campaign, owner).await?;
        for adventure in repo.adventures().list_by_parent(id.into()).await? {
            self.transfer_adventure(adventure.id, owner).await?;
        }
        Ok(())
    }

    async fn transfer_world(&self, id: WorldId, owner: UserId) -> ServiceResult<()> {
        let repo = &self.repository;
        let mut world = load(repo.worlds(), id, "World").await?;
        reassign(repo.worlds(), &mut world, owner).await?;
        for campaign in repo.campaigns().list_by_parent(id.into()).await? {
            self.transfer_campaign(campaign.id, owner).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryAdminService for LibraryAdminServiceImpl {
    #[instrument(skip(self))]
    async fn search_worlds(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<World>> {
        search(self.repository.worlds(), request, self.library_owner).await
    }

    #[instrument(skip(self))]
    async fn search_campaigns(
        &self,
        request: LibrarySearchRequest,
    ) -> ServiceResult<LibraryPage<Campaign>> {
        search(self.repository.campaigns(), request, self.library_owner).await
    }

    #[instrument(skip(self))]
    async fn search_adventures(
        &self,
        request: LibrarySearchRequest,
    ) -> ServiceResult<LibraryPage<Adventure>> {
        search(self.repository.adventures(), request, self.library_owner).await
    }

    #[instrument(skip(self))]
    async fn search_stages(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<Stage>> {
        search(self.repository.stages(), request, self.library_owner).await
    }

    #[instrument(skip(self))]
    async fn search_assets(&self, request: LibrarySearchRequest) -> ServiceResult<LibraryPage<Asset>> {
        search(self.repository.assets(), request, self.library_owner).await
    }

    #[instrument(skip(self))]
    async fn overview(&self) -> ServiceResult<LibraryOverview> {
        Ok(LibraryOverview {
            worlds: self.repository.worlds().list().await?.len(),
            campaigns: self.repository.campaigns().list().await?.len(),
            adventures: self.repository.adventures().list().await?.len(),
            stages: self.repository.stages().list().await?.len(),
            assets: self.repository.assets().list().await?.len(),
        })
    }

    #[instrument(skip(self))]
    async fn transfer_ownership(
        &self,
        admin: UserId,
        kind: ContentKind,
        id: Uuid,
        new_owner: UserId,
    ) -> ServiceResult<()> {
        match kind {
            ContentKind::World => self.transfer_world(id.into(), new_owner).await?,
            ContentKind::Campaign => self.transfer_campaign(id.into(), new_owner).await?,
            ContentKind::Adventure => self.transfer_adventure(id.into(), new_owner).await?,
            ContentKind::Stage => {
                let store = self.repository.stages();
                let mut stage = load(store, id.into(), "Stage").await?;
                reassign(store, &mut stage, new_owner).await?;
            }
            ContentKind::Asset => {
                let store = self.repository.assets();
                let mut asset = load(store, id.into(), "Asset").await?;
                reassign(store, &mut asset, new_owner).await?;
            }
        }

        info!(
            kind = ?kind,
            item_id = %id,
            new_owner = %new_owner,
            admin_id = %admin,
            "Transferred library ownership"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ServiceError;
    use crate::domain::entities::AssetKind;
    use crate::infrastructure::persistence::in_memory_repository;

    #[tokio::test]
    async fn test_transfer_world_cascades_to_descendants() {
        let repository = in_memory_repository();
        let service = LibraryAdminServiceImpl::new(repository.clone(), UserId::new());
        let owner = UserId::new();
        let heir = UserId::new();
        let world = World::new(owner, "Eberron", "");
        let campaign = Campaign::new(owner, "Arc", "").in_world(world.id);
        let adventure = Adventure::new(owner, "Sharn", "").in_campaign(campaign.id);
        let scene = Scene::new(owner, adventure.id, "Tower", "");
        let encounter = Encounter::new(owner, adventure.id, "Ambush", "");
        repository.worlds().save(&world).await.unwrap();
        repository.campaigns().save(&campaign).await.unwrap();
        repository.adventures().save(&adventure).await.unwrap();
        repository.scenes().save(&scene).await.unwrap();
        repository.encounters().save(&encounter).await.unwrap();

        service
            .transfer_ownership(UserId::new(), ContentKind::World, world.id.into(), heir)
            .await
            .unwrap();

        assert_eq!(repository.worlds().get(world.id).await.unwrap().unwrap().owner_id, heir);
        assert_eq!(repository.campaigns().get(campaign.id).await.unwrap().unwrap().owner_id, heir);
        assert_eq!(repository.adventures().get(adventure.id).await.unwrap().unwrap().owner_id, heir);
        assert_eq!(repository.scenes().get(scene.id).await.unwrap().unwrap().owner_id, heir);
        assert_eq!(repository.encounters().get(encounter.id).await.unwrap().unwrap().owner_id, heir);
    }

    #[tokio::test]
    async fn test_overview_and_missing_transfer() {
        let repository = in_memory_repository();
        let service = LibraryAdminServiceImpl::new(repository.clone(), UserId::new());
        repository
            .assets()
            .save(&Asset::new(UserId::new(), AssetKind::Object, "Chest"))
            .await
            .unwrap();
        repository.stages().save(&Stage::new(UserId::new(), "Map", "")).await.unwrap();

        let overview = service.overview().await.unwrap();
        assert_eq!(overview.assets, 1);
        assert_eq!(overview.stages, 1);
        let assets = service.search_assets(LibrarySearchRequest::default()).await.unwrap();
        assert_eq!(assets.total_count, 1);

        let missing = service
            .transfer_ownership(UserId::new(), ContentKind::Asset, Uuid::new_v4(), UserId::new())
            .await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_filters_sorts_and_pages() {
        let repository = in_memory_repository();
        let library = UserId::new();
        let service = LibraryAdminServiceImpl::new(repository.clone(), library);
        let author = UserId::new();

        let mut entries = vec![
            Asset::new(library, AssetKind::Creature, "Owlbear"),
            Asset::new(library, AssetKind::Creature, "Goblin"),
            Asset::new(library, AssetKind::Object, "Gold chest"),
            Asset::new(author, AssetKind::Creature, "Ghoul"),
        ];
        entries[0].description = "Feathered and furious".to_string();
        entries[1].category = Some("Humanoid".to_string());
        entries[1].is_published = true;
        for asset in &entries {
            repository.assets().save(asset).await.unwrap();
        }

        let library_creatures = service
            .search_assets(LibrarySearchRequest {
                owner_type: Some(OwnerType::Master),
                kind: Some(AssetKind::Creature),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = library_creatures.content.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Goblin", "Owlbear"]);

        let text = service
            .search_assets(LibrarySearchRequest {
                search: Some("FEATHER".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(text.content[0].name, "Owlbear");

        let by_category = service
            .search_assets(LibrarySearchRequest {
                category: Some("humanoid".to_string()),
                is_published: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.total_count, 1);

        let users = service
            .search_assets(LibrarySearchRequest {
                owner_type: Some(OwnerType::User),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(users.content[0].owner_id, author);

        let first_page = service
            .search_assets(LibrarySearchRequest {
                take: Some(3),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = first_page.content.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Owlbear", "Gold chest", "Goblin"]);
        assert_eq!(first_page.total_count, 4);
        assert!(first_page.has_more);

        let bad = service
            .search_worlds(LibrarySearchRequest {
                take: Some(500),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_content_kind_accepts_plural_path_segments() {
        let kind: ContentKind = serde_json::from_str("\"worlds\"").unwrap();
        assert_eq!(kind, ContentKind::World);
    }
}
