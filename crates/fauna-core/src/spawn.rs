use serde::{Deserialize, Serialize};

use crate::species::SpeciesId;

/// Where a spawn rule places its species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnFilter {
    /// Scatter across matching tiles, rolled against the rule density.
    Tiles {
        /// Tile kind to match (`grass`, `sand`, ...).
        tile: String,
        /// Biome to match, or any biome when `None`.
        biome: Option<String>,
    },
    /// Cluster around every structure of this kind.
    Structure {
        /// Structure kind to match (`house`, `crypt`, ...).
        kind: String,
    },
}

/// A declarative population policy: which species appears where, how densely,
/// and in what group sizes. Evaluated once at world-population time; rules
/// only ever schedule reservations, never live actors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Species this rule populates.
    pub species: SpeciesId,
    /// Placement filter.
    pub filter: SpawnFilter,
    /// Per-tile spawn probability in `[0, 1]`. Ignored by structure rules.
    pub density: f32,
    /// Inclusive group size range drawn per successful placement.
    pub group: (u32, u32),
}

impl SpawnRule {
    /// Rule scattering `species` over tiles of the given kind.
    pub fn tiles(species: SpeciesId, tile: impl Into<String>, density: f32) -> Self {
        Self {
            species,
            filter: SpawnFilter::Tiles {
                tile: tile.into(),
                biome: None,
            },
            density,
            group: (1, 1),
        }
    }

    /// Rule clustering `species` around structures of the given kind.
    pub fn structure(species: SpeciesId, kind: impl Into<String>) -> Self {
        Self {
            species,
            filter: SpawnFilter::Structure { kind: kind.into() },
            density: 1.0,
            group: (1, 1),
        }
    }

    /// Restrict a tile rule to one biome, builder style.
    #[must_use]
    pub fn in_biome(mut self, biome: impl Into<String>) -> Self {
        if let SpawnFilter::Tiles { biome: b, .. } = &mut self.filter {
            *b = Some(biome.into());
        }
        self
    }

    /// Set the inclusive group size range, builder style.
    #[must_use]
    pub fn with_group(mut self, min: u32, max: u32) -> Self {
        self.group = (min.min(max), min.max(max));
        self
    }

    /// Whether a tile of `kind` in `biome` passes this rule's filter.
    /// Always `false` for structure rules.
    pub fn matches_tile(&self, kind: &str, biome: &str) -> bool {
        match &self.filter {
            SpawnFilter::Tiles { tile, biome: want } => {
                tile.eq_ignore_ascii_case(kind)
                    && want.as_ref().is_none_or(|w| w.eq_ignore_ascii_case(biome))
            }
            SpawnFilter::Structure { .. } => false,
        }
    }

    /// The structure kind this rule clusters around, if any.
    pub fn structure_kind(&self) -> Option<&str> {
        match &self.filter {
            SpawnFilter::Structure { kind } => Some(kind),
            SpawnFilter::Tiles { .. } => None,
        }
    }
}
