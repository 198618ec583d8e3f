//! Core types for Fauna: species, spawn rules, and world collaborator traits.
//!
//! This crate defines the data model the simulation runs on. It is independent
//! of the tick loop — you can build a [`registry::SpeciesRegistry`]
//! programmatically or load one from a definitions file.

/// Species definitions file parsing.
pub mod definitions;
/// Error types used throughout the crate.
pub mod error;
/// Positions, tiles, and small vector math.
pub mod geom;
/// The immutable species catalog and its queries.
pub mod registry;
/// Spawn rules tying species to terrain or structures.
pub mod spawn;
/// Species descriptions: stats, flags, competences, and sprites.
pub mod species;
/// Traits the simulation uses to talk to the host world.
pub mod world;

/// Re-export definitions loading.
pub use definitions::{DefinitionsFile, ParseWarning, load_definitions, parse_definitions};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export geometry types.
pub use geom::{TilePos, Vec2};
/// Re-export the species catalog.
pub use registry::{MAX_SPECIES_ID, SpeciesRegistry};
/// Re-export spawn rule types.
pub use spawn::{SpawnFilter, SpawnRule};
/// Re-export species description types.
pub use species::{Color, Competence, CompetenceSet, Flags, Sex, SpeciesDef, SpeciesId};
/// Re-export world collaborator traits.
pub use world::{
    FoodKind, MapObject, Pantry, SimulationFocus, StructureId, StructureInfo, StructureRegistry,
    TerrainGrid, WorldClock,
};
