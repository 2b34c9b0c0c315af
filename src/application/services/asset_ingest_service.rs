//! Asset Ingest Service - public library assets from draft to approved art
//!
//! Ingested assets belong to the library account. Starting a generation run
//! expands prompts through the AI service and marks the assets `Processing`;
//! the art worker reports back through `record_generation`, which moves each
//! asset to review or to a failure state. Batch approve and discard report
//! per-asset failures instead of failing the whole request.

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::dto::{
    AssetIdsRequest, AssetTemplate, BulkGenerationRequest, GenerationResultRequest,
    IngestAssetsRequest, IngestBatchFailure, IngestBatchResponse, IngestJobResponse, LibraryPage,
    PageQuery, RejectAssetsRequest,
};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::common::{check_description, check_name, paginate};
use crate::application::services::{AiService, AiServiceImpl};
use crate::domain::entities::{Asset, IngestStatus};
use crate::domain::value_objects::{AssetId, UserId};

const PROCESSING: &[IngestStatus] = &[
    IngestStatus::Pending,
    IngestStatus::Processing,
    IngestStatus::PartialFailure,
    IngestStatus::Failed,
];
const REVIEW: &[IngestStatus] = &[IngestStatus::PendingReview];
const HISTORY: &[IngestStatus] = &[IngestStatus::Approved, IngestStatus::Discarded];

#[async_trait]
pub trait AssetIngestService: Send + Sync {
    /// Draft one library asset per item and start generating their art
    async fn ingest_assets(&self, request: IngestAssetsRequest) -> ServiceResult<IngestJobResponse>;

    /// Store the art the worker produced for a processing asset
    async fn record_generation(
        &self,
        id: AssetId,
        result: GenerationResultRequest,
    ) -> ServiceResult<Asset>;

    /// Publish reviewed assets
    async fn approve_assets(&self, request: AssetIdsRequest) -> ServiceResult<IngestBatchResponse>;

    /// Drop the art of reviewed assets and regenerate it from new prompts
    async fn reject_assets(&self, request: RejectAssetsRequest) -> ServiceResult<IngestJobResponse>;

    async fn discard_assets(&self, request: AssetIdsRequest) -> ServiceResult<IngestBatchResponse>;

    /// Regenerate only the art that failed
    async fn retry_failed(&self, request: AssetIdsRequest) -> ServiceResult<IngestJobResponse>;

    async fn processing_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>>;

    async fn review_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>>;

    async fn history_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>>;
}

fn template(asset: &Asset, description: &str) -> AssetTemplate {
    AssetTemplate {
        name: asset.name.clone(),
        kind: asset.kind,
        category: asset.category.clone(),
        description: description.to_string(),
        alternatives: Default::default(),
    }
}

fn status_name(asset: &Asset) -> String {
    asset
        .ingest_status
        .map_or_else(|| "None".to_string(), |status| format!("{:?}", status))
}

#[derive(Clone)]
pub struct AssetIngestServiceImpl {
    repository: Repository,
    ai: AiServiceImpl,
    library_owner: UserId,
}

impl AssetIngestServiceImpl {
    pub fn new(repository: Repository, ai: AiServiceImpl, library_owner: UserId) -> Self {
        Self {
            repository,
            ai,
            library_owner,
        }
    }

    /// Only assets of the library account take part in ingest
    async fn library_asset(&self, id: AssetId) -> ServiceResult<Option<Asset>> {
        let asset = self.repository.assets().get(id).await?;
        Ok(asset.filter(|a| a.owner_id == self.library_owner))
    }

    async fn save(&self, asset: &mut Asset) -> ServiceResult<()> {
        asset.touch();
        self.repository.assets().save(asset).await?;
        Ok(())
    }

    /// Prompts are expanded before anything is saved, so a rejected request leaves no trace
    async fn start_generation(
        &self,
        mut assets: Vec<Asset>,
        templates: Vec<AssetTemplate>,
        style: Option<String>,
    ) -> ServiceResult<IngestJobResponse> {
        let prompts = self.ai.bulk_prompts(&BulkGenerationRequest { templates, style })?;

        for asset in assets.iter_mut() {
            asset.ingest_status = Some(IngestStatus::Processing);
            self.save(asset).await?;
        }

        let job_id = Uuid::new_v4();
        info!(
            job_id = %job_id,
            assets = assets.len(),
            prompts = prompts.len(),
            "Started asset generation"
        );
        Ok(IngestJobResponse {
            job_id,
            item_count: prompts.len(),
            asset_ids: assets.iter().map(|a| a.id).collect(),
            prompts,
        })
    }

    async fn by_status(
        &self,
        statuses: &[IngestStatus],
        page: PageQuery,
    ) -> ServiceResult<LibraryPage<Asset>> {
        let mut assets: Vec<Asset> = self
            .repository
            .assets()
            .list_by_owner(self.library_owner)
            .await?
            .into_iter()
            .filter(|a| a.ingest_status.is_some_and(|s| statuses.contains(&s)))
            .collect();
        assets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        paginate(assets, page.skip, page.take)
    }
}

#[async_trait]
impl AssetIngestService for AssetIngestServiceImpl {
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    async fn ingest_assets(&self, request: IngestAssetsRequest) -> ServiceResult<IngestJobResponse> {
        if request.items.is_empty() {
            return Err(ServiceError::invalid("At least one item is required"));
        }
        let mut errors = Vec::new();
        for item in &request.items {
            check_name("Asset", &item.name, &mut errors);
            check_description("Asset", &item.description, &mut errors);
        }
        ServiceError::check(errors)?;

        let mut assets = Vec::with_capacity(request.items.len());
        let mut templates = Vec::with_capacity(request.items.len());
        for item in request.items {
            let mut asset = Asset::new(self.library_owner, item.kind, item.name.trim());
            asset.description = item.description.clone();
            asset.category = item.category.clone();
            asset.tags = item.tags;
            asset.ingest_status = Some(IngestStatus::Pending);
            assets.push(asset);
            templates.push(AssetTemplate {
                name: item.name,
                kind: item.kind,
                category: item.category,
                description: item.description,
                alternatives: item.alternatives,
            });
        }

        self.start_generation(assets, templates, request.style).await
    }

    #[instrument(skip(self, result))]
    async fn record_generation(
        &self,
        id: AssetId,
        result: GenerationResultRequest,
    ) -> ServiceResult<Asset> {
        let mut asset = self
            .library_asset(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Asset"))?;
        if asset.ingest_status != Some(IngestStatus::Processing) {
            return Err(ServiceError::Conflict(format!(
                "Asset is not being processed: {}",
                status_name(&asset)
            )));
        }

        asset.record_generation(result.portrait, result.token);
        self.save(&mut asset).await?;

        info!(asset_id = %id, status = %status_name(&asset), "Recorded generated art");
        Ok(asset)
    }

    #[instrument(skip(self, request), fields(count = request.asset_ids.len()))]
    async fn approve_assets(&self, request: AssetIdsRequest) -> ServiceResult<IngestBatchResponse> {
        let mut response = IngestBatchResponse::default();
        for id in request.asset_ids {
            let Some(mut asset) = self.library_asset(id).await? else {
                warn!(asset_id = %id, "Asset not found for approval");
                response.failures.push(IngestBatchFailure {
                    asset_id: id,
                    reason: "Asset not found".to_string(),
                });
                continue;
            };
            if asset.ingest_status != Some(IngestStatus::PendingReview) {
                warn!(asset_id = %id, "Asset is not awaiting review");
                response.failures.push(IngestBatchFailure {
                    asset_id: id,
                    reason: format!("Invalid status: {}", status_name(&asset)),
                });
                continue;
            }

            asset.ingest_status = Some(IngestStatus::Approved);
            asset.is_published = true;
            self.save(&mut asset).await?;
            response.succeeded_ids.push(id);
        }

        info!(
            approved = response.succeeded_ids.len(),
            failed = response.failures.len(),
            "Approved ingested assets"
        );
        Ok(response)
    }

    #[instrument(skip(self, request), fields(count = request.items.len()))]
    async fn reject_assets(&self, request: RejectAssetsRequest) -> ServiceResult<IngestJobResponse> {
        let mut errors = Vec::new();
        for item in &request.items {
            if item.ai_prompt.trim().is_empty() {
                errors.push(format!("Prompt for asset {} cannot be empty", item.asset_id));
            }
        }
        ServiceError::check(errors)?;

        let mut assets = Vec::new();
        let mut templates = Vec::new();
        for item in request.items {
            let Some(mut asset) = self.library_asset(item.asset_id).await? else {
                warn!(asset_id = %item.asset_id, "Asset not found for rejection");
                continue;
            };
            if asset.ingest_status != Some(IngestStatus::PendingReview) {
                warn!(asset_id = %item.asset_id, "Asset is not awaiting review");
                continue;
            }

            let prompt = item.ai_prompt.trim();
            asset.portrait = None;
            asset.token = None;
            asset.ai_prompt = Some(prompt.to_string());
            templates.push(template(&asset, prompt));
            assets.push(asset);
        }
        if assets.is_empty() {
            return Err(ServiceError::invalid("No valid assets found to reject"));
        }

        self.start_generation(assets, templates, None).await
    }

    #[instrument(skip(self, request), fields(count = request.asset_ids.len()))]
    async fn discard_assets(&self, request: AssetIdsRequest) -> ServiceResult<IngestBatchResponse> {
        let mut response = IngestBatchResponse::default();
        for id in request.asset_ids {
            let Some(mut asset) = self.library_asset(id).await? else {
                warn!(asset_id = %id, "Asset not found for discard");
                response.failures.push(IngestBatchFailure {
                    asset_id: id,
                    reason: "Asset not found".to_string(),
                });
                continue;
            };

            asset.ingest_status = Some(IngestStatus::Discarded);
            asset.is_published = false;
            asset.portrait = None;
            asset.token = None;
            self.save(&mut asset).await?;
            response.succeeded_ids.push(id);
        }

        info!(
            discarded = response.succeeded_ids.len(),
            failed = response.failures.len(),
            "Discarded ingested assets"
        );
        Ok(response)
    }

    #[instrument(skip(self, request), fields(count = request.asset_ids.len()))]
    async fn retry_failed(&self, request: AssetIdsRequest) -> ServiceResult<IngestJobResponse> {
        let mut assets = Vec::new();
        let mut templates = Vec::new();
        for id in request.asset_ids {
            let Some(asset) = self.library_asset(id).await? else {
                warn!(asset_id = %id, "Asset not found for retry");
                continue;
            };
            if !matches!(
                asset.ingest_status,
                Some(IngestStatus::Failed | IngestStatus::PartialFailure)
            ) {
                warn!(asset_id = %id, "Asset has not failed");
                continue;
            }
            if asset.portrait.is_some() && asset.token.is_some() {
                warn!(asset_id = %id, "Asset already has all its art");
                continue;
            }

            let description = asset.ai_prompt.as_deref().unwrap_or(&asset.description);
            templates.push(template(&asset, description));
            assets.push(asset);
        }
        if assets.is_empty() {
            return Err(ServiceError::invalid("No valid assets found to retry"));
        }

        self.start_generation(assets, templates, None).await
    }

    #[instrument(skip(self))]
    async fn processing_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>> {
        self.by_status(PROCESSING, page).await
    }

    #[instrument(skip(self))]
    async fn review_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>> {
        self.by_status(REVIEW, page).await
    }

    #[instrument(skip(self))]
    async fn history_assets(&self, page: PageQuery) -> ServiceResult<LibraryPage<Asset>> {
        self.by_status(HISTORY, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::dto::{IngestAssetItem, RejectAssetItem};
    use crate::domain::entities::AssetKind;
    use crate::domain::services::AlternativeDefinition;
    use crate::domain::value_objects::ResourceId;
    use crate::infrastructure::ai_client::OpenAiClient;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::persistence::in_memory_repository;

    struct Fixture {
        service: AssetIngestServiceImpl,
        repository: Repository,
        library: UserId,
    }

    fn fixture() -> Fixture {
        let repository = in_memory_repository();
        let library = UserId::new();
        let ai = AiServiceImpl::new(Arc::new(OpenAiClient::new(&AppConfig::in_memory().ai)));
        Fixture {
            service: AssetIngestServiceImpl::new(repository.clone(), ai, library),
            repository,
            library,
        }
    }

    fn item(name: &str) -> IngestAssetItem {
        IngestAssetItem {
            name: name.to_string(),
            kind: AssetKind::Creature,
            category: Some("Humanoid".to_string()),
            description: "Scrappy raider".to_string(),
            tags: vec!["goblinoid".to_string()],
            alternatives: AlternativeDefinition::default(),
        }
    }

    fn ids(ids: &[AssetId]) -> AssetIdsRequest {
        AssetIdsRequest {
            asset_ids: ids.to_vec(),
        }
    }

    async fn ingest(f: &Fixture, names: &[&str]) -> IngestJobResponse {
        f.service
            .ingest_assets(IngestAssetsRequest {
                items: names.iter().map(|n| item(n)).collect(),
                style: None,
            })
            .await
            .unwrap()
    }

    async fn stored(f: &Fixture, id: AssetId) -> Asset {
        f.repository.assets().get(id).await.unwrap().unwrap()
    }

    async fn finish(f: &Fixture, id: AssetId, portrait: bool, token: bool) -> Asset {
        f.service
            .record_generation(
                id,
                GenerationResultRequest {
                    portrait: portrait.then(ResourceId::new),
                    token: token.then(ResourceId::new),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_drafts_library_assets_and_expands_prompts() {
        let f = fixture();
        let mut request = IngestAssetsRequest {
            items: vec![item("Goblin"), item("Hobgoblin")],
            style: Some("painterly".to_string()),
        };
        request.items[0].alternatives.gender = Some(vec!["male".to_string(), "female".to_string()]);

        let job = f.service.ingest_assets(request).await.unwrap();

        assert_eq!(job.asset_ids.len(), 2);
        assert_eq!(job.item_count, 3);
        assert!(job.prompts.iter().all(|p| p.prompt.ends_with("painterly")));
        let goblin = stored(&f, job.asset_ids[0]).await;
        assert_eq!(goblin.owner_id, f.library);
        assert_eq!(goblin.ingest_status, Some(IngestStatus::Processing));
        assert_eq!(goblin.tags, vec!["goblinoid".to_string()]);
        assert!(!goblin.is_published);

        let processing = f.service.processing_assets(PageQuery::default()).await.unwrap();
        assert_eq!(processing.total_count, 2);
    }

    #[tokio::test]
    async fn test_ingest_rejects_bad_requests_without_saving() {
        let f = fixture();
        let empty = f
            .service
            .ingest_assets(IngestAssetsRequest {
                items: Vec::new(),
                style: None,
            })
            .await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let mut huge = item("Swarm");
        let values: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        huge.alternatives.gender = Some(values.clone());
        huge.alternatives.class = Some(values.clone());
        huge.alternatives.equipment = Some(values);
        let oversized = f
            .service
            .ingest_assets(IngestAssetsRequest {
                items: vec![huge],
                style: None,
            })
            .await;
        assert!(matches!(oversized, Err(ServiceError::Validation(_))));
        assert!(f.repository.assets().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_outcome_drives_review_and_approval() {
        let f = fixture();
        let job = ingest(&f, &["Goblin", "Orc", "Troll"]).await;
        let (goblin, orc, troll) = (job.asset_ids[0], job.asset_ids[1], job.asset_ids[2]);

        assert_eq!(finish(&f, goblin, true, true).await.ingest_status, Some(IngestStatus::PendingReview));
        assert_eq!(finish(&f, orc, true, false).await.ingest_status, Some(IngestStatus::PartialFailure));
        assert_eq!(finish(&f, troll, false, false).await.ingest_status, Some(IngestStatus::Failed));

        let twice = f
            .service
            .record_generation(goblin, GenerationResultRequest::default())
            .await;
        assert!(matches!(twice, Err(ServiceError::Conflict(_))));

        let review = f.service.review_assets(PageQuery::default()).await.unwrap();
        assert_eq!(review.content.iter().map(|a| a.id).collect::<Vec<_>>(), vec![goblin]);

        let missing = AssetId::new();
        let approved = f.service.approve_assets(ids(&[goblin, orc, missing])).await.unwrap();
        assert_eq!(approved.succeeded_ids, vec![goblin]);
        assert_eq!(approved.failures.len(), 2);
        assert_eq!(approved.failures[0].reason, "Invalid status: PartialFailure");
        assert_eq!(approved.failures[1].reason, "Asset not found");

        let published = stored(&f, goblin).await;
        assert!(published.is_published);
        assert_eq!(published.ingest_status, Some(IngestStatus::Approved));
        let history = f.service.history_assets(PageQuery::default()).await.unwrap();
        assert_eq!(history.total_count, 1);
    }

    #[tokio::test]
    async fn test_reject_regenerates_with_new_prompt() {
        let f = fixture();
        let job = ingest(&f, &["Goblin"]).await;
        let goblin = job.asset_ids[0];
        finish(&f, goblin, true, true).await;

        let blank = f
            .service
            .reject_assets(RejectAssetsRequest {
                items: vec![RejectAssetItem {
                    asset_id: goblin,
                    ai_prompt: "  ".to_string(),
                }],
            })
            .await;
        assert!(matches!(blank, Err(ServiceError::Validation(_))));

        let rerun = f
            .service
            .reject_assets(RejectAssetsRequest {
                items: vec![RejectAssetItem {
                    asset_id: goblin,
                    ai_prompt: "green skin, rusty scimitar".to_string(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(rerun.asset_ids, vec![goblin]);
        assert!(rerun.prompts[0].prompt.contains("rusty scimitar"));

        let asset = stored(&f, goblin).await;
        assert_eq!(asset.ingest_status, Some(IngestStatus::Processing));
        assert!(asset.portrait.is_none() && asset.token.is_none());
        assert_eq!(asset.ai_prompt.as_deref(), Some("green skin, rusty scimitar"));

        let again = f
            .service
            .reject_assets(RejectAssetsRequest {
                items: vec![RejectAssetItem {
                    asset_id: goblin,
                    ai_prompt: "blue skin".to_string(),
                }],
            })
            .await;
        assert!(matches!(again, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_retry_only_takes_failed_assets() {
        let f = fixture();
        let job = ingest(&f, &["Goblin", "Orc"]).await;
        let (goblin, orc) = (job.asset_ids[0], job.asset_ids[1]);
        finish(&f, goblin, true, true).await;
        finish(&f, orc, true, false).await;

        let retried = f.service.retry_failed(ids(&[goblin, orc])).await.unwrap();
        assert_eq!(retried.asset_ids, vec![orc]);
        let asset = stored(&f, orc).await;
        assert_eq!(asset.ingest_status, Some(IngestStatus::Processing));
        assert!(asset.portrait.is_some());

        let completed = finish(&f, orc, false, true).await;
        assert_eq!(completed.ingest_status, Some(IngestStatus::PendingReview));

        let nothing = f.service.retry_failed(ids(&[goblin])).await;
        assert!(matches!(nothing, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_discard_hides_art_and_ignores_foreign_assets() {
        let f = fixture();
        let job = ingest(&f, &["Goblin"]).await;
        let goblin = job.asset_ids[0];
        finish(&f, goblin, true, true).await;

        let foreign = Asset::new(UserId::new(), AssetKind::Object, "Chest");
        f.repository.assets().save(&foreign).await.unwrap();

        let discarded = f.service.discard_assets(ids(&[goblin, foreign.id])).await.unwrap();
        assert_eq!(discarded.succeeded_ids, vec![goblin]);
        assert_eq!(discarded.failures[0].asset_id, foreign.id);

        let asset = stored(&f, goblin).await;
        assert_eq!(asset.ingest_status, Some(IngestStatus::Discarded));
        assert!(asset.portrait.is_none());
        assert!(stored(&f, foreign.id).await.ingest_status.is_none());

        let history = f.service.history_assets(PageQuery::default()).await.unwrap();
        assert_eq!(history.content[0].id, goblin);
        let review = f.service.review_assets(PageQuery::default()).await.unwrap();
        assert_eq!(review.total_count, 0);
    }
}
