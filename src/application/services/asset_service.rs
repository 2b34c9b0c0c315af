//! Asset Service - the reusable asset library

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::dto::{AssetFilter, CreateAssetRequest, UpdateAssetRequest};
use crate::application::errors::ServiceResult;
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{check_create, check_patch, ensure_owner, ensure_visible, load};
use crate::domain::entities::{Asset, Shareable};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{AssetId, UserId};

#[async_trait]
pub trait AssetService: Send + Sync {
    async fn list_assets(&self, user: UserId, filter: AssetFilter) -> ServiceResult<Vec<Asset>>;

    async fn get_asset(&self, user: UserId, id: AssetId) -> ServiceResult<Asset>;

    async fn create_asset(&self, user: UserId, request: CreateAssetRequest) -> ServiceResult<Asset>;

    async fn update_asset(
        &self,
        user: UserId,
        id: AssetId,
        request: UpdateAssetRequest,
    ) -> ServiceResult<Asset>;

    async fn delete_asset(&self, user: UserId, id: AssetId) -> ServiceResult<()>;

    async fn clone_asset(&self, user: UserId, id: AssetId) -> ServiceResult<Asset>;
}

#[derive(Clone)]
pub struct AssetServiceImpl {
    repository: Repository,
}

impl AssetServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn owned_asset(&self, user: UserId, id: AssetId) -> ServiceResult<Asset> {
        let asset = load(self.repository.assets(), id, "Asset").await?;
        ensure_owner(&asset, user, "Asset")?;
        Ok(asset)
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

#[async_trait]
impl AssetService for AssetServiceImpl {
    #[instrument(skip(self))]
    async fn list_assets(&self, user: UserId, filter: AssetFilter) -> ServiceResult<Vec<Asset>> {
        let assets = self.repository.assets().list().await?;
        Ok(assets
            .into_iter()
            .filter(|a| a.is_visible_to(user))
            .filter(|a| !a.is_discarded())
            .filter(|a| filter.kind.is_none_or(|kind| a.kind == kind))
            .filter(|a| filter.search.as_deref().is_none_or(|s| a.matches(s)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_asset(&self, user: UserId, id: AssetId) -> ServiceResult<Asset> {
        let asset = load(self.repository.assets(), id, "Asset").await?;
        ensure_visible(&asset, user, "Asset")?;
        Ok(asset)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_asset(&self, user: UserId, request: CreateAssetRequest) -> ServiceResult<Asset> {
        check_create("Asset", &request.name, &request.description)?;

        let mut asset = Asset::new(user, request.kind, request.name.trim());
        asset.description = request.description;
        asset.category = request.category;
        asset.tags = clean_tags(request.tags);
        asset.portrait = request.portrait;
        asset.token = request.token;
        asset.size = request.size;
        self.repository.assets().save(&asset).await?;

        info!(asset_id = %asset.id, kind = ?asset.kind, "Created new asset: {}", asset.name);
        Ok(asset)
    }

    #[instrument(skip(self, request))]
    async fn update_asset(
        &self,
        user: UserId,
        id: AssetId,
        request: UpdateAssetRequest,
    ) -> ServiceResult<Asset> {
        let mut asset = self.owned_asset(user, id).await?;
        check_patch("Asset", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            asset.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            asset.description = description;
        }
        if let Some(kind) = request.kind {
            asset.kind = kind;
        }
        if let Some(category) = request.category {
            asset.category = category;
        }
        if let Some(tags) = request.tags {
            asset.tags = clean_tags(tags);
        }
        if let Some(portrait) = request.portrait {
            asset.portrait = portrait;
        }
        if let Some(token) = request.token {
            asset.token = token;
        }
        if let Some(size) = request.size {
            asset.size = size;
        }
        if let Some(is_published) = request.is_published {
            asset.is_published = is_published;
        }
        if let Some(is_public) = request.is_public {
            asset.is_public = is_public;
        }
        asset.touch();
        self.repository.assets().save(&asset).await?;

        info!(asset_id = %id, "Updated asset: {}", asset.name);
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn delete_asset(&self, user: UserId, id: AssetId) -> ServiceResult<()> {
        self.owned_asset(user, id).await?;
        self.repository.assets().delete(id).await?;
        info!(asset_id = %id, "Deleted asset");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_asset(&self, user: UserId, id: AssetId) -> ServiceResult<Asset> {
        let mut original = self.get_asset(user, id).await?;

        let siblings = self.repository.assets().list_by_owner(user).await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|a| a.name.as_str()));
        if let (Some(renamed), true) = (names.original, original.is_owned_by(user)) {
            original.name = renamed;
            original.touch();
            self.repository.assets().save(&original).await?;
        }

        let clone = original.clone_for(user, names.clone);
        self.repository.assets().save(&clone).await?;

        info!(asset_id = %clone.id, source_id = %id, "Cloned asset as: {}", clone.name);
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ServiceError;
    use crate::domain::entities::AssetKind;
    use crate::domain::value_objects::Size;
    use crate::infrastructure::persistence::in_memory_repository;

    fn request(kind: AssetKind, name: &str, tags: &[&str]) -> CreateAssetRequest {
        CreateAssetRequest {
            kind,
            name: name.to_string(),
            description: String::new(),
            category: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            portrait: None,
            token: None,
            size: Size::default(),
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_kind_and_search() {
        let service = AssetServiceImpl::new(in_memory_repository());
        let owner = UserId::new();
        service.create_asset(owner, request(AssetKind::Creature, "Goblin", &["humanoid"])).await.unwrap();
        service.create_asset(owner, request(AssetKind::Creature, "Wolf", &["beast"])).await.unwrap();
        service.create_asset(owner, request(AssetKind::Object, "Barrel", &[])).await.unwrap();

        let creatures = service
            .list_assets(
                owner,
                AssetFilter {
                    kind: Some(AssetKind::Creature),
                    search: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(creatures.len(), 2);

        let humanoids = service
            .list_assets(
                owner,
                AssetFilter {
                    kind: None,
                    search: Some("HUMAN".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(humanoids.len(), 1);
        assert_eq!(humanoids[0].name, "Goblin");

        assert!(service.list_assets(UserId::new(), AssetFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_asset_cleans_tags_and_validates_name() {
        let service = AssetServiceImpl::new(in_memory_repository());
        let owner = UserId::new();

        let asset = service
            .create_asset(owner, request(AssetKind::Effect, "Fireball", &[" fire ", "Fire", ""]))
            .await
            .unwrap();
        assert_eq!(asset.tags, vec!["fire"]);

        let long = "x".repeat(129);
        let err = service.create_asset(owner, request(AssetKind::Effect, &long, &[])).await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_only_owner_can_update_or_delete() {
        let service = AssetServiceImpl::new(in_memory_repository());
        let owner = UserId::new();
        let asset = service.create_asset(owner, request(AssetKind::Object, "Barrel", &[])).await.unwrap();

        let update = service
            .update_asset(UserId::new(), asset.id, UpdateAssetRequest::default())
            .await;
        assert!(matches!(update, Err(ServiceError::NotAllowed(_))));
        let delete = service.delete_asset(UserId::new(), asset.id).await;
        assert!(matches!(delete, Err(ServiceError::NotAllowed(_))));

        service.delete_asset(owner, asset.id).await.unwrap();
        let gone = service.get_asset(owner, asset.id).await;
        assert!(matches!(gone, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clone_public_asset_for_another_user() {
        let service = AssetServiceImpl::new(in_memory_repository());
        let owner = UserId::new();
        let asset = service.create_asset(owner, request(AssetKind::Creature, "Goblin", &[])).await.unwrap();
        service
            .update_asset(
                owner,
                asset.id,
                UpdateAssetRequest {
                    is_published: Some(true),
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let other = UserId::new();
        let clone = service.clone_asset(other, asset.id).await.unwrap();
        assert_eq!(clone.owner_id, other);
        assert_eq!(clone.name, "Goblin (Copy)");
        assert!(!clone.is_public);
    }
}
