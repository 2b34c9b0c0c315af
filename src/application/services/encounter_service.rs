//! Encounter Service - Encounters and the asset instances placed on them
//!
//! Bulk operations on placed assets are all-or-nothing: every requested index
//! is checked before the encounter is touched. When the encounter's stage has
//! snapping on, placed positions land on cell centres.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{
    AddEncounterAssetRequest, BulkUpdateEncounterAssetsRequest, UpdateEncounterAssetRequest,
    UpdateEncounterRequest,
};
use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::outbound::Repository;
use crate::application::services::adventure_service::check_stage;
use crate::application::services::common::{
    check_name, check_patch, ensure_not_in_play, ensure_owner, ensure_visible, load,
};
use crate::domain::entities::{instance_name, Adventure, Encounter, EncounterAsset, Shareable};
use crate::domain::services::resolve_clone_names;
use crate::domain::value_objects::{EncounterId, Grid, Point, SnapMode, UserId};

#[async_trait]
pub trait EncounterService: Send + Sync {
    /// Encounters the user owns plus published ones from visible adventures
    async fn list_encounters(&self, user: UserId) -> ServiceResult<Vec<Encounter>>;

    async fn get_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<Encounter>;

    async fn update_encounter(
        &self,
        user: UserId,
        id: EncounterId,
        request: UpdateEncounterRequest,
    ) -> ServiceResult<Encounter>;

    async fn delete_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<()>;

    async fn clone_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<Encounter>;

    async fn add_asset(
        &self,
        user: UserId,
        id: EncounterId,
        request: AddEncounterAssetRequest,
    ) -> ServiceResult<EncounterAsset>;

    async fn bulk_add_assets(
        &self,
        user: UserId,
        id: EncounterId,
        requests: Vec<AddEncounterAssetRequest>,
    ) -> ServiceResult<Vec<EncounterAsset>>;

    async fn clone_asset(
        &self,
        user: UserId,
        id: EncounterId,
        index: u32,
    ) -> ServiceResult<EncounterAsset>;

    async fn update_asset(
        &self,
        user: UserId,
        id: EncounterId,
        index: u32,
        request: UpdateEncounterAssetRequest,
    ) -> ServiceResult<EncounterAsset>;

    async fn bulk_update_assets(
        &self,
        user: UserId,
        id: EncounterId,
        request: BulkUpdateEncounterAssetsRequest,
    ) -> ServiceResult<()>;

    async fn bulk_clone_assets(
        &self,
        user: UserId,
        id: EncounterId,
        indices: Vec<u32>,
    ) -> ServiceResult<Vec<EncounterAsset>>;

    async fn bulk_delete_assets(
        &self,
        user: UserId,
        id: EncounterId,
        indices: Vec<u32>,
    ) -> ServiceResult<()>;

    async fn remove_asset(&self, user: UserId, id: EncounterId, index: u32) -> ServiceResult<()>;
}

fn missing_indices_error(missing: &[u32]) -> ServiceError {
    let list = missing
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    ServiceError::not_found(format!("Assets with indices {}", list))
}

fn snap(grid: Option<&Grid>, position: Point) -> Point {
    grid.map_or(position, |grid| grid.snap(position, SnapMode::Full))
}

#[derive(Clone)]
pub struct EncounterServiceImpl {
    repository: Repository,
}

impl EncounterServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn load_with_adventure(&self, id: EncounterId) -> ServiceResult<(Encounter, Adventure)> {
        let encounter = load(self.repository.encounters(), id, "Encounter").await?;
        let adventure =
            load(self.repository.adventures(), encounter.adventure_id, "Adventure").await?;
        Ok((encounter, adventure))
    }

    async fn owned_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<Encounter> {
        let (encounter, adventure) = self.load_with_adventure(id).await?;
        ensure_owner(&adventure, user, "Adventure")?;
        Ok(encounter)
    }

    /// The stage grid to snap to, if the encounter has a stage with snapping on
    async fn snap_grid(&self, encounter: &Encounter) -> ServiceResult<Option<Grid>> {
        let Some(stage_id) = encounter.stage_id else {
            return Ok(None);
        };
        let stage = self.repository.stages().get(stage_id).await?;
        Ok(stage.map(|s| s.grid).filter(|grid| grid.snap))
    }

    /// Build a placed instance of a library asset the user may use
    async fn place(
        &self,
        user: UserId,
        encounter: &Encounter,
        index: u32,
        request: AddEncounterAssetRequest,
        grid: Option<&Grid>,
    ) -> ServiceResult<EncounterAsset> {
        let asset = load(self.repository.assets(), request.asset_id, "Asset").await?;
        ensure_visible(&asset, user, "Asset")?;

        let name = match request.name {
            Some(name) => {
                let mut errors = Vec::new();
                check_name("Asset", &name, &mut errors);
                ServiceError::check(errors)?;
                name.trim().to_string()
            }
            None => asset.name.clone(),
        };
        let number = encounter.next_instance_number(&name);

        Ok(EncounterAsset {
            index,
            asset_id: asset.id,
            name: instance_name(asset.kind, &name, number),
            image: request.image.or(asset.token).or(asset.portrait),
            position: snap(grid, request.position),
            size: request.size,
            rotation: request.rotation,
            elevation: request.elevation,
            is_locked: false,
            is_visible: true,
            controlled_by: Some(user),
            notes: request.notes,
        })
    }

    async fn save(&self, encounter: &mut Encounter) -> ServiceResult<()> {
        encounter.touch();
        self.repository.encounters().save(encounter).await?;
        Ok(())
    }
}

#[async_trait]
impl EncounterService for EncounterServiceImpl {
    #[instrument(skip(self))]
    async fn list_encounters(&self, user: UserId) -> ServiceResult<Vec<Encounter>> {
        let mut encounters = Vec::new();
        for adventure in self.repository.adventures().list().await? {
            if !adventure.is_visible_to(user) {
                continue;
            }
            let owned = adventure.is_owned_by(user);
            let children = self
                .repository
                .encounters()
                .list_by_parent(adventure.id.into())
                .await?;
            encounters.extend(children.into_iter().filter(|e| owned || e.is_published));
        }
        debug!(user_id = %user, count = encounters.len(), "Listed encounters");
        Ok(encounters)
    }

    #[instrument(skip(self))]
    async fn get_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<Encounter> {
        let (encounter, adventure) = self.load_with_adventure(id).await?;
        ensure_visible(&adventure, user, "Adventure")?;
        Ok(encounter)
    }

    #[instrument(skip(self, request))]
    async fn update_encounter(
        &self,
        user: UserId,
        id: EncounterId,
        request: UpdateEncounterRequest,
    ) -> ServiceResult<Encounter> {
        let mut encounter = self.owned_encounter(user, id).await?;
        check_patch("Encounter", request.name.as_deref(), request.description.as_deref())?;

        if let Some(name) = request.name {
            encounter.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            encounter.description = description;
        }
        if let Some(is_published) = request.is_published {
            encounter.is_published = is_published;
        }
        if let Some(stage_id) = request.stage_id {
            check_stage(&self.repository, user, stage_id).await?;
            encounter.stage_id = stage_id;
        }
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, "Updated encounter: {}", encounter.name);
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn delete_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<()> {
        self.owned_encounter(user, id).await?;
        ensure_not_in_play(&self.repository, "Encounter", |s| s.encounter_id == Some(id)).await?;
        self.repository.encounters().delete(id).await?;
        info!(encounter_id = %id, "Deleted encounter");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clone_encounter(&self, user: UserId, id: EncounterId) -> ServiceResult<Encounter> {
        let mut original = self.owned_encounter(user, id).await?;

        let siblings = self
            .repository
            .encounters()
            .list_by_parent(original.adventure_id.into())
            .await?;
        let names = resolve_clone_names(&original.name, siblings.iter().map(|e| e.name.as_str()));
        if let Some(renamed) = names.original {
            original.name = renamed;
            self.save(&mut original).await?;
        }

        let clone = original.clone_into(original.owner_id, original.adventure_id, names.clone);
        self.repository.encounters().save(&clone).await?;

        info!(encounter_id = %clone.id, source_id = %id, "Cloned encounter as: {}", clone.name);
        Ok(clone)
    }

    #[instrument(skip(self, request), fields(asset_id = %request.asset_id))]
    async fn add_asset(
        &self,
        user: UserId,
        id: EncounterId,
        request: AddEncounterAssetRequest,
    ) -> ServiceResult<EncounterAsset> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let grid = self.snap_grid(&encounter).await?;
        let placed = self
            .place(user, &encounter, encounter.next_asset_index(), request, grid.as_ref())
            .await?;
        encounter.assets.push(placed.clone());
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, index = placed.index, "Placed asset: {}", placed.name);
        Ok(placed)
    }

    #[instrument(skip(self, requests), fields(count = requests.len()))]
    async fn bulk_add_assets(
        &self,
        user: UserId,
        id: EncounterId,
        requests: Vec<AddEncounterAssetRequest>,
    ) -> ServiceResult<Vec<EncounterAsset>> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let grid = self.snap_grid(&encounter).await?;
        let mut added = Vec::with_capacity(requests.len());
        for request in requests {
            let placed = self
                .place(user, &encounter, encounter.next_asset_index(), request, grid.as_ref())
                .await?;
            encounter.assets.push(placed.clone());
            added.push(placed);
        }
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, count = added.len(), "Placed assets");
        Ok(added)
    }

    #[instrument(skip(self))]
    async fn clone_asset(
        &self,
        user: UserId,
        id: EncounterId,
        index: u32,
    ) -> ServiceResult<EncounterAsset> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let clone = encounter
            .clone_asset(index, user)
            .ok_or_else(|| ServiceError::not_found("Asset"))?;
        encounter.assets.push(clone.clone());
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, source_index = index, index = clone.index, "Cloned placed asset");
        Ok(clone)
    }

    #[instrument(skip(self, request))]
    async fn update_asset(
        &self,
        user: UserId,
        id: EncounterId,
        index: u32,
        request: UpdateEncounterAssetRequest,
    ) -> ServiceResult<EncounterAsset> {
        let mut encounter = self.owned_encounter(user, id).await?;
        if let Some(name) = &request.name {
            let mut errors = Vec::new();
            check_name("Asset", name, &mut errors);
            ServiceError::check(errors)?;
        }
        let grid = self.snap_grid(&encounter).await?;
        let placed = encounter
            .asset_mut(index)
            .ok_or_else(|| ServiceError::not_found("Asset"))?;

        if let Some(name) = request.name {
            placed.name = name.trim().to_string();
        }
        if let Some(image) = request.image {
            placed.image = image;
        }
        if let Some(position) = request.position {
            placed.position = snap(grid.as_ref(), position);
        }
        if let Some(size) = request.size {
            placed.size = size;
        }
        if let Some(rotation) = request.rotation {
            placed.rotation = rotation;
        }
        if let Some(elevation) = request.elevation {
            placed.elevation = elevation;
        }
        if let Some(is_locked) = request.is_locked {
            placed.is_locked = is_locked;
        }
        if let Some(is_visible) = request.is_visible {
            placed.is_visible = is_visible;
        }
        if let Some(controlled_by) = request.controlled_by {
            placed.controlled_by = controlled_by;
        }
        if let Some(notes) = request.notes {
            placed.notes = notes;
        }
        let updated = placed.clone();
        self.save(&mut encounter).await?;

        debug!(encounter_id = %id, index, "Updated placed asset");
        Ok(updated)
    }

    #[instrument(skip(self, request), fields(count = request.updates.len()))]
    async fn bulk_update_assets(
        &self,
        user: UserId,
        id: EncounterId,
        request: BulkUpdateEncounterAssetsRequest,
    ) -> ServiceResult<()> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let indices: Vec<u32> = request.updates.iter().map(|u| u.index).collect();
        let missing = encounter.missing_asset_indices(&indices);
        if !missing.is_empty() {
            return Err(missing_indices_error(&missing));
        }

        let grid = self.snap_grid(&encounter).await?;
        for update in request.updates {
            let Some(placed) = encounter.asset_mut(update.index) else {
                continue;
            };
            if let Some(position) = update.position {
                placed.position = snap(grid.as_ref(), position);
            }
            if let Some(size) = update.size {
                placed.size = size;
            }
            if let Some(rotation) = update.rotation {
                placed.rotation = rotation;
            }
            if let Some(elevation) = update.elevation {
                placed.elevation = elevation;
            }
        }
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, count = indices.len(), "Bulk updated placed assets");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn bulk_clone_assets(
        &self,
        user: UserId,
        id: EncounterId,
        indices: Vec<u32>,
    ) -> ServiceResult<Vec<EncounterAsset>> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let missing = encounter.missing_asset_indices(&indices);
        if !missing.is_empty() {
            return Err(missing_indices_error(&missing));
        }

        let mut clones = Vec::with_capacity(indices.len());
        for index in indices {
            if let Some(clone) = encounter.clone_asset(index, user) {
                encounter.assets.push(clone.clone());
                clones.push(clone);
            }
        }
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, count = clones.len(), "Bulk cloned placed assets");
        Ok(clones)
    }

    #[instrument(skip(self))]
    async fn bulk_delete_assets(
        &self,
        user: UserId,
        id: EncounterId,
        indices: Vec<u32>,
    ) -> ServiceResult<()> {
        let mut encounter = self.owned_encounter(user, id).await?;
        let missing = encounter.missing_asset_indices(&indices);
        if !missing.is_empty() {
            return Err(missing_indices_error(&missing));
        }

        encounter.assets.retain(|a| !indices.contains(&a.index));
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, count = indices.len(), "Bulk removed placed assets");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_asset(&self, user: UserId, id: EncounterId, index: u32) -> ServiceResult<()> {
        let mut encounter = self.owned_encounter(user, id).await?;
        if encounter.asset(index).is_none() {
            return Err(ServiceError::not_found("Asset"));
        }
        encounter.assets.retain(|a| a.index != index);
        self.save(&mut encounter).await?;

        info!(encounter_id = %id, index, "Removed placed asset");
        Ok(())
    }
}
