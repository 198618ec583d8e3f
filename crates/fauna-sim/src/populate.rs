//! Spawn-rule evaluation: turns the registry's rules plus the world's
//! structures into scheduled reservations.
//!
//! Population only ever schedules; live actors appear later when streaming
//! pulls a reservation into range. World size and pool capacity stay
//! decoupled this way.

use fauna_core::{
    Sex, SpeciesDef, SpeciesRegistry, StructureId, StructureRegistry, TerrainGrid, TilePos, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::streaming::{Reservation, ReservationTable};

/// How far group members scatter around a structure center, in tiles.
const STRUCTURE_SPREAD: f32 = 2.5;

/// Randomized placements tried before falling back to the structure center.
const PLACEMENT_ATTEMPTS: usize = 6;

/// Counts from one population pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopulateSummary {
    /// Reservations scheduled.
    pub scheduled: usize,
    /// Individuals dropped because the reservation table was full.
    pub skipped_full: usize,
}

/// Evaluate every spawn rule once against the world.
///
/// Structure-affinity rules place a rolled group around each matching
/// structure; explicit occupant records each seed one reservation with a
/// placement RNG derived from the structure id and slot index, so a given
/// structure always houses the same arrangement regardless of what else
/// spawned first. Remaining rules scan the terrain per tile, roll density,
/// and scatter a group with sub-tile jitter.
pub fn populate(
    table: &mut ReservationTable,
    registry: &SpeciesRegistry,
    terrain: &dyn TerrainGrid,
    structures: &dyn StructureRegistry,
    rng: &mut StdRng,
) -> PopulateSummary {
    let mut summary = PopulateSummary::default();

    for rule in registry.rules() {
        let Some(def) = registry.get(rule.species) else {
            continue;
        };
        if let Some(kind) = rule.structure_kind() {
            for info in structures.structures_of_kind(kind) {
                let group = rng.random_range(rule.group.0..=rule.group.1);
                for _ in 0..group {
                    let pos = place_near(info.center, terrain, rng);
                    let sex = roll_sex(def, rng);
                    schedule(
                        table,
                        Reservation::new(def, sex, pos).with_structure(info.id),
                        &mut summary,
                    );
                }
            }
        } else {
            scan_tiles(table, def, rule, terrain, rng, &mut summary);
        }
    }

    for info in structures.structures() {
        for (slot, species) in structures.occupants(info.id).into_iter().enumerate() {
            let Some(def) = registry.get(species) else {
                continue;
            };
            let mut placement = StdRng::seed_from_u64(occupant_seed(info.id, slot));
            let pos = place_near(info.center, terrain, &mut placement);
            let sex = roll_sex(def, &mut placement);
            schedule(
                table,
                Reservation::new(def, sex, pos).with_structure(info.id),
                &mut summary,
            );
        }
    }

    summary
}

fn scan_tiles(
    table: &mut ReservationTable,
    def: &SpeciesDef,
    rule: &fauna_core::SpawnRule,
    terrain: &dyn TerrainGrid,
    rng: &mut StdRng,
    summary: &mut PopulateSummary,
) {
    let density = f64::from(rule.density.clamp(0.0, 1.0));
    for y in 0..terrain.height() {
        for x in 0..terrain.width() {
            let tile = TilePos::new(x, y);
            if !rule.matches_tile(terrain.tile_kind(tile), terrain.biome(tile)) {
                continue;
            }
            if !rng.random_bool(density) {
                continue;
            }
            let group = rng.random_range(rule.group.0..=rule.group.1);
            for _ in 0..group {
                let jitter = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
                let pos = tile.center() + jitter;
                if !terrain.is_walkable(pos.tile()) {
                    continue;
                }
                let sex = roll_sex(def, rng);
                schedule(table, Reservation::new(def, sex, pos), summary);
            }
        }
    }
}

fn schedule(table: &mut ReservationTable, reservation: Reservation, summary: &mut PopulateSummary) {
    if table.schedule(reservation).is_some() {
        summary.scheduled += 1;
    } else {
        summary.skipped_full += 1;
    }
}

/// Try a few random offsets around a center, falling back to the center.
fn place_near(center: Vec2, terrain: &dyn TerrainGrid, rng: &mut StdRng) -> Vec2 {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let offset = Vec2::new(
            rng.random_range(-STRUCTURE_SPREAD..STRUCTURE_SPREAD),
            rng.random_range(-STRUCTURE_SPREAD..STRUCTURE_SPREAD),
        );
        let candidate = center + offset;
        if terrain.is_walkable(candidate.tile()) {
            return candidate;
        }
    }
    center
}

pub(crate) fn roll_sex(def: &SpeciesDef, rng: &mut StdRng) -> Sex {
    def.default_sex.unwrap_or_else(|| {
        if rng.random_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        }
    })
}

/// Mix a structure id and occupant slot into a placement seed.
fn occupant_seed(structure: StructureId, slot: usize) -> u64 {
    let mut h = (u64::from(structure.0) << 32) ^ (slot as u64) ^ 0x9e37_79b9_7f4a_7c15;
    h ^= h >> 30;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;
    h
}
