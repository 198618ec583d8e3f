use serde::{Deserialize, Serialize};

use crate::geom::{TilePos, Vec2};
use crate::species::SpeciesId;

/// A typed quantity of stored food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    /// From hunted prey.
    Meat,
    /// From harvested objects.
    Produce,
}

impl std::fmt::Display for FoodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Meat => write!(f, "meat"),
            Self::Produce => write!(f, "produce"),
        }
    }
}

/// A free-standing object on a terrain tile: a bush, a boulder, remains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    /// Object name (`berry_bush`, `remains`, ...).
    pub name: String,
    /// Free-form tags gatherers match against.
    pub tags: Vec<String>,
    /// Food obtained by harvesting, if any.
    pub food: Option<FoodKind>,
    /// Hunger restored by eating the harvest.
    pub nutrition: f32,
}

impl MapObject {
    /// A plain, inedible object.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            food: None,
            nutrition: 0.0,
        }
    }

    /// An object that yields food when harvested.
    pub fn edible(name: impl Into<String>, food: FoodKind, nutrition: f32) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            food: Some(food),
            nutrition,
        }
    }

    /// Add tags, builder style.
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Whether `tag` names this object by name or tag (case-insensitive).
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
            || self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether harvesting this object yields food.
    pub fn is_edible(&self) -> bool {
        self.food.is_some()
    }
}

/// Identifier of a structure in the structure registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureId(pub u32);

impl std::fmt::Display for StructureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of one structure, as exposed by the structure registry.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureInfo {
    /// Registry id.
    pub id: StructureId,
    /// Structure kind (`house`, `crypt`, ...).
    pub kind: String,
    /// World-space center.
    pub center: Vec2,
}

/// The viewport-derived point and radius the streaming manager works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationFocus {
    /// World-space center of attention.
    pub center: Vec2,
    /// Effective view radius in tiles.
    pub view_radius: f32,
}

impl SimulationFocus {
    /// Create a focus.
    pub fn new(center: Vec2, view_radius: f32) -> Self {
        Self {
            center,
            view_radius,
        }
    }
}

/// Read/mutate access to the terrain and object grid.
///
/// Implemented by the game's world; the simulation only consumes this narrow
/// surface. Out-of-bounds tiles must report as unwalkable.
pub trait TerrainGrid {
    /// Grid width in tiles.
    fn width(&self) -> i32;
    /// Grid height in tiles.
    fn height(&self) -> i32;
    /// Whether actors can stand on this tile.
    fn is_walkable(&self, tile: TilePos) -> bool;
    /// Tile kind name (`grass`, `water`, ...).
    fn tile_kind(&self, tile: TilePos) -> &str;
    /// Biome name at this tile.
    fn biome(&self, tile: TilePos) -> &str;
    /// The object standing on this tile, if any.
    fn object_at(&self, tile: TilePos) -> Option<&MapObject>;
    /// Put an object on a tile, replacing any present.
    fn place_object(&mut self, tile: TilePos, object: MapObject);
    /// Remove and return the object on a tile.
    fn remove_object(&mut self, tile: TilePos) -> Option<MapObject>;
    /// Open state of a door on this tile, if one exists.
    fn door_at(&self, tile: TilePos) -> Option<bool>;
    /// Open or close a door. No-op when the tile has no door.
    fn set_door_open(&mut self, tile: TilePos, open: bool);
    /// Lit state of a light source on this tile, if one exists.
    fn light_at(&self, tile: TilePos) -> Option<bool>;
    /// Light or extinguish a light source. No-op when the tile has none.
    fn set_light_lit(&mut self, tile: TilePos, lit: bool);

    /// Whether the tile lies inside the grid.
    fn in_bounds(&self, tile: TilePos) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width() && tile.y < self.height()
    }
}

/// Access to the structure registry: enumeration, residency bookkeeping, and
/// home lookup.
pub trait StructureRegistry {
    /// All structures.
    fn structures(&self) -> Vec<StructureInfo>;
    /// All structures of one kind.
    fn structures_of_kind(&self, kind: &str) -> Vec<StructureInfo>;
    /// Look up one structure.
    fn structure(&self, id: StructureId) -> Option<StructureInfo>;
    /// Declared occupant slots of a structure, one species entry per slot.
    fn occupants(&self, id: StructureId) -> Vec<SpeciesId>;
    /// Record a new permanent resident.
    fn add_resident(&mut self, id: StructureId, species: SpeciesId);
    /// Remove a permanent resident.
    fn remove_resident(&mut self, id: StructureId, species: SpeciesId);
    /// A resident of this structure just became live.
    fn note_resident_active(&mut self, id: StructureId);
    /// A live resident of this structure went dormant or died.
    fn note_resident_inactive(&mut self, id: StructureId);
    /// Number of currently live residents.
    fn active_residents(&self, id: StructureId) -> u32;
    /// A structure of the given kind with room for one more resident.
    fn home_for(&self, kind: &str) -> Option<StructureId>;
}

/// Food storage attached to structures.
pub trait Pantry {
    /// Store food; returns the amount actually accepted.
    fn deposit(&mut self, structure: StructureId, kind: FoodKind, amount: f32) -> f32;
    /// Take food out; returns the amount actually obtained.
    fn withdraw(&mut self, structure: StructureId, kind: FoodKind, amount: f32) -> f32;
    /// Amount currently stored.
    fn stored(&self, structure: StructureId, kind: FoodKind) -> f32;
}

/// The day/night clock the simulation is gated by.
pub trait WorldClock {
    /// Darkness factor in `[0, 1]`: 0 at high noon, 1 at midnight.
    fn darkness(&self) -> f32;
    /// In-world seconds elapsed since the previous tick.
    fn delta_seconds(&self) -> f32;
    /// Length of a full in-world day in seconds.
    fn seconds_per_day(&self) -> f32;

    /// Whether it is currently night.
    fn is_night(&self) -> bool {
        self.darkness() >= 0.5
    }

    /// Whether it is currently day.
    fn is_day(&self) -> bool {
        !self.is_night()
    }
}
