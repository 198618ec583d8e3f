//! A small self-contained world implementing the collaborator traits.
//!
//! Backs the command-line runner and doubles as the fixture for integration
//! tests. The world is split into three structs so the simulation can borrow
//! terrain, structures, and pantry mutably at the same time.

use std::collections::HashMap;

use fauna_core::{
    FoodKind, MapObject, Pantry, SpeciesId, SpeciesRegistry, StructureId, StructureInfo,
    StructureRegistry, TerrainGrid, TilePos, Vec2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileKind {
    Grass,
    Water,
    Wall,
    Floor,
    Door,
}

impl TileKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Water => "water",
            Self::Wall => "wall",
            Self::Floor => "floor",
            Self::Door => "door",
        }
    }
}

/// Tile grid with objects, doors, and lights.
#[derive(Debug)]
pub struct DemoTerrain {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
    objects: HashMap<TilePos, MapObject>,
    doors: HashMap<TilePos, bool>,
    lights: HashMap<TilePos, bool>,
    biomes: HashMap<TilePos, String>,
}

impl DemoTerrain {
    /// All-grass terrain of the given size.
    pub fn flat(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Grass; (width * height) as usize],
            objects: HashMap::new(),
            doors: HashMap::new(),
            lights: HashMap::new(),
            biomes: HashMap::new(),
        }
    }

    fn index(&self, tile: TilePos) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 || tile.x >= self.width || tile.y >= self.height {
            return None;
        }
        Some((tile.y * self.width + tile.x) as usize)
    }

    fn set(&mut self, tile: TilePos, kind: TileKind) {
        if let Some(idx) = self.index(tile) {
            self.tiles[idx] = kind;
        }
    }

    /// Make a tile water.
    pub fn add_water(&mut self, tile: TilePos) {
        self.set(tile, TileKind::Water);
    }

    /// Make a tile a wall.
    pub fn add_wall(&mut self, tile: TilePos) {
        self.set(tile, TileKind::Wall);
    }

    /// Make a tile interior floor.
    pub fn add_floor(&mut self, tile: TilePos) {
        self.set(tile, TileKind::Floor);
    }

    /// Install a closed door on a tile.
    pub fn add_door(&mut self, tile: TilePos) {
        self.set(tile, TileKind::Door);
        self.doors.insert(tile, false);
    }

    /// Install an unlit light on a tile.
    pub fn add_light(&mut self, tile: TilePos) {
        self.lights.insert(tile, false);
    }

    /// Override the biome reported for a tile.
    pub fn set_biome(&mut self, tile: TilePos, biome: impl Into<String>) {
        self.biomes.insert(tile, biome.into());
    }
}

impl TerrainGrid for DemoTerrain {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_walkable(&self, tile: TilePos) -> bool {
        let Some(idx) = self.index(tile) else {
            return false;
        };
        match self.tiles[idx] {
            TileKind::Grass | TileKind::Floor => true,
            TileKind::Water | TileKind::Wall => false,
            TileKind::Door => self.doors.get(&tile).copied().unwrap_or(false),
        }
    }

    fn tile_kind(&self, tile: TilePos) -> &str {
        self.index(tile)
            .map_or("void", |idx| self.tiles[idx].as_str())
    }

    fn biome(&self, tile: TilePos) -> &str {
        self.biomes.get(&tile).map_or("meadow", String::as_str)
    }

    fn object_at(&self, tile: TilePos) -> Option<&MapObject> {
        self.objects.get(&tile)
    }

    fn place_object(&mut self, tile: TilePos, object: MapObject) {
        self.objects.insert(tile, object);
    }

    fn remove_object(&mut self, tile: TilePos) -> Option<MapObject> {
        self.objects.remove(&tile)
    }

    fn door_at(&self, tile: TilePos) -> Option<bool> {
        self.doors.get(&tile).copied()
    }

    fn set_door_open(&mut self, tile: TilePos, open: bool) {
        if let Some(door) = self.doors.get_mut(&tile) {
            *door = open;
        }
    }

    fn light_at(&self, tile: TilePos) -> Option<bool> {
        self.lights.get(&tile).copied()
    }

    fn set_light_lit(&mut self, tile: TilePos, lit: bool) {
        if let Some(light) = self.lights.get_mut(&tile) {
            *light = lit;
        }
    }
}

#[derive(Debug)]
struct DemoStructure {
    info: StructureInfo,
    occupants: Vec<SpeciesId>,
    residents: Vec<SpeciesId>,
    active: u32,
}

/// In-memory structure registry.
#[derive(Debug, Default)]
pub struct DemoStructures {
    list: Vec<DemoStructure>,
}

impl DemoStructures {
    /// Register a structure and return its id.
    pub fn add(&mut self, kind: impl Into<String>, center: Vec2) -> StructureId {
        let id = StructureId(self.list.len() as u32);
        self.list.push(DemoStructure {
            info: StructureInfo {
                id,
                kind: kind.into(),
                center,
            },
            occupants: Vec::new(),
            residents: Vec::new(),
            active: 0,
        });
        id
    }

    /// Record an occupant slot that the population pass seeds a reservation for.
    pub fn add_occupant(&mut self, id: StructureId, species: SpeciesId) {
        if let Some(s) = self.list.get_mut(id.0 as usize) {
            s.occupants.push(species);
        }
    }
}

impl StructureRegistry for DemoStructures {
    fn structures(&self) -> Vec<StructureInfo> {
        self.list.iter().map(|s| s.info.clone()).collect()
    }

    fn structures_of_kind(&self, kind: &str) -> Vec<StructureInfo> {
        self.list
            .iter()
            .filter(|s| s.info.kind.eq_ignore_ascii_case(kind))
            .map(|s| s.info.clone())
            .collect()
    }

    fn structure(&self, id: StructureId) -> Option<StructureInfo> {
        self.list.get(id.0 as usize).map(|s| s.info.clone())
    }

    fn occupants(&self, id: StructureId) -> Vec<SpeciesId> {
        self.list
            .get(id.0 as usize)
            .map(|s| s.occupants.clone())
            .unwrap_or_default()
    }

    fn add_resident(&mut self, id: StructureId, species: SpeciesId) {
        if let Some(s) = self.list.get_mut(id.0 as usize) {
            s.residents.push(species);
        }
    }

    fn remove_resident(&mut self, id: StructureId, species: SpeciesId) {
        if let Some(s) = self.list.get_mut(id.0 as usize)
            && let Some(pos) = s.residents.iter().position(|r| *r == species)
        {
            s.residents.remove(pos);
        }
    }

    fn note_resident_active(&mut self, id: StructureId) {
        if let Some(s) = self.list.get_mut(id.0 as usize) {
            s.active += 1;
        }
    }

    fn note_resident_inactive(&mut self, id: StructureId) {
        if let Some(s) = self.list.get_mut(id.0 as usize) {
            s.active = s.active.saturating_sub(1);
        }
    }

    fn active_residents(&self, id: StructureId) -> u32 {
        self.list.get(id.0 as usize).map_or(0, |s| s.active)
    }

    fn home_for(&self, kind: &str) -> Option<StructureId> {
        self.list
            .iter()
            .filter(|s| s.info.kind.eq_ignore_ascii_case(kind))
            .min_by_key(|s| s.residents.len())
            .map(|s| s.info.id)
    }
}

/// Per-structure food storage.
#[derive(Debug, Default)]
pub struct DemoPantry {
    stores: HashMap<(StructureId, FoodKind), f32>,
}

impl Pantry for DemoPantry {
    fn deposit(&mut self, structure: StructureId, kind: FoodKind, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        *self.stores.entry((structure, kind)).or_insert(0.0) += amount;
        amount
    }

    fn withdraw(&mut self, structure: StructureId, kind: FoodKind, amount: f32) -> f32 {
        let Some(stored) = self.stores.get_mut(&(structure, kind)) else {
            return 0.0;
        };
        let taken = amount.clamp(0.0, *stored);
        *stored -= taken;
        taken
    }

    fn stored(&self, structure: StructureId, kind: FoodKind) -> f32 {
        self.stores.get(&(structure, kind)).copied().unwrap_or(0.0)
    }
}

/// The three collaborators bundled for convenience.
///
/// Fields are public so callers can borrow them disjointly when handing them
/// to [`crate::simulation::Simulation::tick`].
#[derive(Debug)]
pub struct DemoWorld {
    /// Tile grid.
    pub terrain: DemoTerrain,
    /// Structures.
    pub structures: DemoStructures,
    /// Food storage.
    pub pantry: DemoPantry,
}

impl DemoWorld {
    /// Empty all-grass world.
    pub fn flat(width: i32, height: i32) -> Self {
        Self {
            terrain: DemoTerrain::flat(width, height),
            structures: DemoStructures::default(),
            pantry: DemoPantry::default(),
        }
    }

    /// A 48x48 meadow: a pond, three houses with doors and torches, and
    /// scattered berry bushes.
    pub fn standard() -> Self {
        let mut world = Self::flat(48, 48);

        // Pond in the south-east quarter.
        for y in 27..34 {
            for x in 27..34 {
                let tile = TilePos::new(x, y);
                if tile.center().distance_sq(Vec2::new(30.5, 30.5)) <= 9.0 {
                    world.terrain.add_water(tile);
                }
            }
        }

        for center in [
            TilePos::new(10, 10),
            TilePos::new(16, 10),
            TilePos::new(10, 16),
        ] {
            world.add_house(center);
        }

        for tile in [
            (6, 22),
            (14, 24),
            (22, 16),
            (24, 28),
            (34, 12),
            (36, 38),
            (20, 40),
            (42, 24),
        ] {
            world.add_berry_bush(TilePos::new(tile.0, tile.1));
        }

        world
    }

    /// Place a 3x3 house: wall ring, floor center, south door, torch outside.
    pub fn add_house(&mut self, center: TilePos) -> StructureId {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let tile = TilePos::new(center.x + dx, center.y + dy);
                if dx == 0 && dy == 0 {
                    self.terrain.add_floor(tile);
                } else {
                    self.terrain.add_wall(tile);
                }
            }
        }
        let door = TilePos::new(center.x, center.y + 1);
        self.terrain.add_door(door);
        self.terrain.add_light(TilePos::new(center.x, center.y + 2));
        self.structures.add("house", center.center())
    }

    /// Place a harvestable berry bush.
    pub fn add_berry_bush(&mut self, tile: TilePos) {
        self.terrain.place_object(
            tile,
            MapObject::edible("berry_bush", FoodKind::Produce, 15.0).with_tags(&["berry", "bush"]),
        );
    }

    /// Record occupant slots in every structure a species claims as home.
    ///
    /// Looks up each registered species with a structure affinity and adds
    /// `per_structure` occupant records to every structure of that kind.
    pub fn seed_occupants(&mut self, registry: &SpeciesRegistry, per_structure: usize) {
        for def in registry.iter() {
            let Some(kind) = def.structure.as_deref() else {
                continue;
            };
            for info in self.structures.structures_of_kind(kind) {
                for _ in 0..per_structure {
                    self.structures.add_occupant(info.id, def.id);
                }
            }
        }
    }
}
