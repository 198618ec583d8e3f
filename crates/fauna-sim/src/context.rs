use fauna_core::{Pantry, SpeciesId, StructureId, StructureRegistry, TerrainGrid, Vec2, WorldClock};
use rand::rngs::StdRng;

use crate::actor::ActorId;
use crate::event::{DeathCause, EventLog, SimEvent, SimEventKind};

/// A death queued during the per-actor pass.
///
/// Deaths resolve after the pass so a freed slot can never be reused while
/// the iteration cursor is still behind it.
#[derive(Debug, Clone, Copy)]
pub struct Death {
    /// The actor to remove.
    pub victim: ActorId,
    /// The actor that made the kill, if any.
    pub killer: Option<ActorId>,
    /// Why the actor died.
    pub cause: DeathCause,
}

/// A birth queued during the per-actor pass, committed after deaths resolve.
#[derive(Debug, Clone, Copy)]
pub struct Birth {
    /// Species of the offspring.
    pub species: SpeciesId,
    /// Where the offspring appears.
    pub pos: Vec2,
    /// Home structure inherited from the parents, if any.
    pub structure: Option<StructureId>,
    /// One parent.
    pub parent_a: ActorId,
    /// The other parent.
    pub parent_b: ActorId,
}

/// Mutable context threaded through streaming and the behavior routines
/// during one tick.
pub struct SimContext<'a> {
    /// Walkability, tiles, and map objects.
    pub terrain: &'a mut dyn TerrainGrid,
    /// Structures and their resident bookkeeping.
    pub structures: &'a mut dyn StructureRegistry,
    /// Per-structure food storage.
    pub pantry: &'a mut dyn Pantry,
    /// Day cycle, read-only within a tick.
    pub clock: &'a dyn WorldClock,
    /// Event sink.
    pub events: &'a mut EventLog,
    /// The single simulation RNG; call order must stay fixed.
    pub rng: &'a mut StdRng,
    /// Current tick number.
    pub tick: u64,
    /// Deaths queued for end-of-tick processing.
    pub deaths: &'a mut Vec<Death>,
    /// Births queued for end-of-tick processing.
    pub births: &'a mut Vec<Birth>,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.tick, kind, description));
    }

    /// Queue a death. The first queued cause for a victim wins.
    pub fn kill(&mut self, victim: ActorId, killer: Option<ActorId>, cause: DeathCause) {
        if self.deaths.iter().any(|d| d.victim == victim) {
            return;
        }
        self.deaths.push(Death {
            victim,
            killer,
            cause,
        });
    }

    /// Queue a birth for the end of the tick.
    pub fn birth(&mut self, birth: Birth) {
        self.births.push(birth);
    }

    /// Simulated seconds covered by this tick.
    pub fn dt(&self) -> f32 {
        self.clock.delta_seconds()
    }
}
