//! Stage entity - the visual canvas a scene or encounter is played on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Grid, Point, ResourceId, Size, SnapMode, StageId, UserId};

use super::{next_index, Indexed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmbientLight {
    Black,
    Darkness,
    Nighttime,
    Dim,
    Twilight,
    #[default]
    Default,
    Candlelight,
    Torchlight,
    Daylight,
    Bright,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    LightRain,
    Rain,
    HeavyRain,
    Rainstorm,
    Thunderstorm,
    LightSnow,
    Snow,
    HeavySnow,
    Snowstorm,
    Hail,
    IceStorm,
    Breezy,
    Windy,
    Hurricane,
    Sandstorm,
}

/// Background, audio and camera settings for a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSettings {
    pub main_background: Option<ResourceId>,
    pub alternate_background: Option<ResourceId>,
    pub use_alternate_background: bool,
    pub ambient_sound: Option<ResourceId>,
    pub ambient_sound_volume: f64,
    pub ambient_sound_loop: bool,
    pub ambient_sound_is_playing: bool,
    pub ambient_light: AmbientLight,
    pub weather: Weather,
    pub zoom_level: f64,
    pub panning: Point,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            main_background: None,
            alternate_background: None,
            use_alternate_background: false,
            ambient_sound: None,
            ambient_sound_volume: 1.0,
            ambient_sound_loop: false,
            ambient_sound_is_playing: false,
            ambient_light: AmbientLight::Default,
            weather: Weather::Clear,
            zoom_level: 1.0,
            panning: Point::ORIGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentKind {
    #[default]
    Wall,
    Fence,
    Door,
    Passage,
    Window,
    Opening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentState {
    #[default]
    Closed,
    Open,
    Locked,
    Secret,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSegment {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub kind: SegmentKind,
    #[serde(default)]
    pub state: SegmentState,
    #[serde(default)]
    pub is_opaque: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageWall {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    pub segments: Vec<WallSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    Elevation,
    Terrain,
    Illumination,
    FogOfWar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRegion {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegionKind,
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub value: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightKind {
    #[default]
    Normal,
    Darkvision,
    Magical,
    Supernatural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLight {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LightKind,
    pub position: Point,
    pub range: f64,
    #[serde(default)]
    pub direction: Option<f64>,
    #[serde(default)]
    pub arc: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_on: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDecoration {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    pub resource: ResourceId,
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSound {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resource: Option<ResourceId>,
    pub position: Point,
    pub range: f64,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub is_public: bool,
    pub settings: StageSettings,
    pub grid: Grid,
    pub walls: Vec<StageWall>,
    pub regions: Vec<StageRegion>,
    pub lights: Vec<StageLight>,
    pub decorations: Vec<StageDecoration>,
    pub sounds: Vec<StageSound>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stage {
    pub fn new(owner_id: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: StageId::new(),
            owner_id,
            name: name.into(),
            description: description.into(),
            is_published: false,
            is_public: false,
            settings: StageSettings::default(),
            grid: Grid::default(),
            walls: Vec::new(),
            regions: Vec::new(),
            lights: Vec::new(),
            decorations: Vec::new(),
            sounds: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Private draft copy named "{name} (Copy)" with structures re-indexed from 0
    pub fn clone_for(&self, owner_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: StageId::new(),
            owner_id,
            name: format!("{} (Copy)", self.name),
            description: self.description.clone(),
            is_published: false,
            is_public: false,
            settings: self.settings.clone(),
            grid: self.grid,
            walls: reindexed(&self.walls),
            regions: reindexed(&self.regions),
            lights: reindexed(&self.lights),
            decorations: reindexed(&self.decorations),
            sounds: reindexed(&self.sounds),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn reindexed<T: Indexed + Clone>(items: &[T]) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut item = item.clone();
            item.set_index(i as u32);
            item
        })
        .collect()
}

/// A structure kind stored in its own indexed collection on a stage
pub trait StageStructure: Indexed + Clone + Send + Sync + 'static {
    /// Label used for default names, e.g. "Wall 3"
    const KIND: &'static str;

    fn name_mut(&mut self) -> &mut String;
    fn items(stage: &Stage) -> &Vec<Self>;
    fn items_mut(stage: &mut Stage) -> &mut Vec<Self>;

    /// Single anchor point, for structures placed at one spot
    fn position_mut(&mut self) -> Option<&mut Point> {
        None
    }
}

macro_rules! impl_stage_structure {
    ($ty:ty, $kind:literal, $field:ident $(, $position:ident)?) => {
        impl StageStructure for $ty {
            const KIND: &'static str = $kind;

            $(
                fn position_mut(&mut self) -> Option<&mut Point> {
                    Some(&mut self.$position)
                }
            )?

            fn name_mut(&mut self) -> &mut String {
                &mut self.name
            }

            fn items(stage: &Stage) -> &Vec<Self> {
                &stage.$field
            }

            fn items_mut(stage: &mut Stage) -> &mut Vec<Self> {
                &mut stage.$field
            }
        }
    };
}

impl_stage_structure!(StageWall, "Wall", walls);
impl_stage_structure!(StageRegion, "Region", regions);
impl_stage_structure!(StageLight, "Light", lights, position);
impl_stage_structure!(StageDecoration, "Decoration", decorations, position);
impl_stage_structure!(StageSound, "Sound", sounds, position);

impl Stage {
    /// Append a structure at the next free index, naming it if unnamed
    pub fn add_structure<T: StageStructure>(&mut self, mut item: T) -> T {
        let index = next_index(T::items(self));
        item.set_index(index);
        let name = item.name_mut();
        if name.trim().is_empty() {
            *name = format!("{} {}", T::KIND, index + 1);
        }
        T::items_mut(self).push(item.clone());
        item
    }

    /// Replace the structure at `index`; `None` when no such index exists
    pub fn replace_structure<T: StageStructure>(&mut self, index: u32, mut item: T) -> Option<T> {
        let slot = T::items_mut(self).iter_mut().find(|s| s.index() == index)?;
        item.set_index(index);
        if item.name_mut().trim().is_empty() {
            *item.name_mut() = std::mem::take(slot.name_mut());
        }
        *slot = item.clone();
        Some(item)
    }

    /// Move a point-placed structure onto the grid's half-cell lattice when snapping is on
    pub fn snap_structure<T: StageStructure>(&self, item: &mut T) {
        if !self.grid.snap {
            return;
        }
        if let Some(position) = item.position_mut() {
            *position = self.grid.snap(*position, SnapMode::Half);
        }
    }

    pub fn remove_structure<T: StageStructure>(&mut self, index: u32) -> bool {
        super::remove_indexed(T::items_mut(self), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(name: &str) -> StageLight {
        StageLight {
            index: 99,
            name: name.to_string(),
            kind: LightKind::Normal,
            position: Point::new(10.0, 10.0),
            range: 30.0,
            direction: None,
            arc: None,
            color: None,
            is_on: true,
        }
    }

    #[test]
    fn test_new_stage_defaults() {
        let stage = Stage::new(UserId::new(), "Tavern", "");
        assert_eq!(stage.grid, Grid::default());
        assert_eq!(stage.settings.zoom_level, 1.0);
        assert_eq!(stage.settings.ambient_light, AmbientLight::Default);
        assert_eq!(stage.settings.weather, Weather::Clear);
    }

    #[test]
    fn test_add_structure_indexes_and_names() {
        let mut stage = Stage::new(UserId::new(), "Tavern", "");

        let first = stage.add_structure(light(""));
        let second = stage.add_structure(light("Hearth"));

        assert_eq!(first.index, 0);
        assert_eq!(first.name, "Light 1");
        assert_eq!(second.index, 1);
        assert_eq!(second.name, "Hearth");
    }

    #[test]
    fn test_replace_and_remove_missing_structure() {
        let mut stage = Stage::new(UserId::new(), "Tavern", "");
        stage.add_structure(light(""));

        assert!(stage.replace_structure(5, light("Lamp")).is_none());
        let replaced = stage.replace_structure(0, light("")).unwrap();
        assert_eq!(replaced.name, "Light 1");
        assert!(!stage.remove_structure::<StageLight>(5));
        assert!(stage.remove_structure::<StageLight>(0));
    }

    #[test]
    fn test_clone_reindexes_structures() {
        let owner = UserId::new();
        let mut stage = Stage::new(owner, "Tavern", "");
        stage.is_published = true;
        stage.add_structure(light("a"));
        stage.add_structure(light("b"));
        stage.add_structure(light("c"));
        stage.remove_structure::<StageLight>(0);

        let copy = stage.clone_for(UserId::new());

        assert_eq!(copy.name, "Tavern (Copy)");
        assert!(!copy.is_published);
        let indices: Vec<u32> = copy.lights.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
