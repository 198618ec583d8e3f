//! The simulation façade: owns the catalog, pool, reservations, clock,
//! events, and RNG, and advances them one tick at a time.
//!
//! Tick order is fixed: clock advance → streaming reconciliation → per-actor
//! pass (vitals, hunting, gathering, reproduction, then movement and
//! animation) → deferred deaths → deferred births → light toggling at the
//! day/night boundary. Deaths and births queued during the pass are applied
//! only after it, so a slot freed mid-pass can never be revisited or reused
//! within the same pass.

use std::path::Path;

use fauna_core::{
    Competence, DefinitionsFile, Pantry, ParseWarning, SimulationFocus, SpeciesDef, SpeciesId,
    SpeciesRegistry, StructureRegistry, TerrainGrid, TilePos, Vec2, WorldClock, load_definitions,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::actor::{Actor, ActorId, SpriteInstance};
use crate::ai;
use crate::clock::DayClock;
use crate::config::SimConfig;
use crate::context::{Birth, Death, SimContext};
use crate::error::SimResult;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::pool::ActorPool;
use crate::populate::{self, PopulateSummary};
use crate::streaming::ReservationTable;

/// Counts from one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSummary {
    /// Reservations activated into pool slots.
    pub activated: usize,
    /// Actors captured back into dormancy.
    pub hibernated: usize,
    /// Deaths resolved.
    pub deaths: usize,
    /// Offspring committed.
    pub births: usize,
}

/// A running simulation.
///
/// The world itself (terrain, structures, pantry) stays outside and is lent
/// to [`Simulation::tick`] each frame; everything that persists between
/// ticks lives here.
pub struct Simulation {
    config: SimConfig,
    registry: SpeciesRegistry,
    pool: ActorPool,
    reservations: ReservationTable,
    clock: DayClock,
    rng: StdRng,
    events: EventLog,
    tick: u64,
    parse_warnings: Vec<ParseWarning>,
    used_fallback: bool,
    pending_deaths: Vec<Death>,
    pending_births: Vec<Birth>,
    prev_darkness: f32,
}

impl Simulation {
    /// Create a simulation running the built-in species catalog.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        Self::with_registry(config, SpeciesRegistry::with_defaults())
    }

    /// Create a simulation with an explicit catalog.
    pub fn with_registry(config: SimConfig, registry: SpeciesRegistry) -> SimResult<Self> {
        config.validate()?;
        let clock = DayClock::new(config.seconds_per_day, config.tick_seconds);
        let prev_darkness = clock.darkness();
        Ok(Self {
            registry,
            pool: ActorPool::new(config.pool_capacity),
            reservations: ReservationTable::new(config.reservation_capacity),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            tick: 0,
            parse_warnings: Vec::new(),
            used_fallback: false,
            pending_deaths: Vec::new(),
            pending_births: Vec::new(),
            prev_darkness,
            clock,
            config,
        })
    }

    /// Create a simulation from a definitions file, falling back to the
    /// built-in catalog when the file is unreadable or yields no species.
    ///
    /// Parse problems become [`Simulation::parse_warnings`]; rejected
    /// registrations become [`SimEventKind::SpeciesRejected`] events.
    pub fn from_definitions(config: SimConfig, path: &Path) -> SimResult<Self> {
        let mut events = EventLog::new(config.max_events);
        let (registry, warnings, used_fallback) = match load_definitions(path) {
            Ok((file, warnings)) => {
                let registry = register_catalog(file, &mut events);
                if registry.is_empty() {
                    (SpeciesRegistry::with_defaults(), warnings, true)
                } else {
                    (registry, warnings, false)
                }
            }
            Err(_) => (SpeciesRegistry::with_defaults(), Vec::new(), true),
        };
        let mut sim = Self::with_registry(config, registry)?;
        sim.events = events;
        sim.parse_warnings = warnings;
        sim.used_fallback = used_fallback;
        Ok(sim)
    }

    /// Run the spawn rules once against the world, scheduling reservations.
    ///
    /// No actors appear yet; streaming activates reservations near the focus
    /// on the following ticks.
    pub fn populate(
        &mut self,
        terrain: &dyn TerrainGrid,
        structures: &dyn StructureRegistry,
    ) -> PopulateSummary {
        let summary = populate::populate(
            &mut self.reservations,
            &self.registry,
            terrain,
            structures,
            &mut self.rng,
        );
        self.events.push(SimEvent::new(
            self.tick,
            SimEventKind::PopulationSeeded {
                reservations: summary.scheduled,
            },
            format!(
                "scheduled {} inhabitants ({} dropped, table full)",
                summary.scheduled, summary.skipped_full
            ),
        ));
        summary
    }

    /// Advance the simulation by one tick.
    pub fn tick(
        &mut self,
        terrain: &mut dyn TerrainGrid,
        structures: &mut dyn StructureRegistry,
        pantry: &mut dyn Pantry,
        focus: SimulationFocus,
    ) -> TickSummary {
        self.clock.advance();
        self.tick += 1;
        let dt = self.clock.delta_seconds();

        let (activated, hibernated) = {
            let mut ctx = SimContext {
                terrain: &mut *terrain,
                structures: &mut *structures,
                pantry: &mut *pantry,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
                tick: self.tick,
                deaths: &mut self.pending_deaths,
                births: &mut self.pending_births,
            };
            self.reservations
                .reconcile(&mut self.pool, &self.registry, focus, &self.config, &mut ctx)
        };

        for id in self.pool.active_ids() {
            {
                let mut ctx = SimContext {
                    terrain: &mut *terrain,
                    structures: &mut *structures,
                    pantry: &mut *pantry,
                    clock: &self.clock,
                    events: &mut self.events,
                    rng: &mut self.rng,
                    tick: self.tick,
                    deaths: &mut self.pending_deaths,
                    births: &mut self.pending_births,
                };
                ai::vitals::update(id, &mut self.pool, &self.registry, &self.config, &mut ctx);
                ai::hunting::update(id, &mut self.pool, &self.registry, &self.config, &mut ctx);
                ai::gathering::update(id, &mut self.pool, &self.registry, &self.config, &mut ctx);
                ai::reproduction::update(id, &mut self.pool, &self.registry, &self.config, &mut ctx);
            }

            let Some((behavior, species, target, gather_target, pos, home)) =
                self.pool.get(id).map(|a| {
                    (
                        a.behavior,
                        a.species,
                        a.target,
                        a.gather_target,
                        a.pos,
                        a.home,
                    )
                })
            else {
                continue;
            };
            let Some(def) = self.registry.get(species) else {
                continue;
            };
            let goal = target
                .and_then(|prey| self.pool.get(prey).map(|p| p.pos))
                .or_else(|| gather_target.map(|t| t.center()))
                .or_else(|| self.shelter_goal(def, pos, home));
            if let Some(actor) = self.pool.get_mut(id) {
                behavior.update(actor, def, goal, &mut *terrain, &mut self.rng, dt);
                actor.advance_animation(def.sprite.frames, self.config.idle_speed, dt);
            }
        }

        let (deaths, births) = {
            let mut ctx = SimContext {
                terrain: &mut *terrain,
                structures: &mut *structures,
                pantry: &mut *pantry,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
                tick: self.tick,
                deaths: &mut self.pending_deaths,
                births: &mut self.pending_births,
            };
            let deaths = ai::death::process(
                &mut self.pool,
                &self.registry,
                &mut self.reservations,
                &self.config,
                &mut ctx,
            );
            let births = ai::reproduction::commit(
                &mut self.pool,
                &self.registry,
                &mut self.reservations,
                &mut ctx,
            );
            (deaths, births)
        };

        self.update_lights(terrain);

        TickSummary {
            activated,
            hibernated,
            deaths,
            births,
        }
    }

    /// Home-bound goal for sheltering species at night, once away from home.
    fn shelter_goal(&self, def: &SpeciesDef, pos: Vec2, home: Vec2) -> Option<Vec2> {
        let reach = self.config.reach_distance;
        (self.clock.is_night()
            && def.has_competence(Competence::ShelterAtNight)
            && pos.distance_sq(home) > reach * reach)
            .then_some(home)
    }

    /// Flip the world's lights when the day/night boundary is crossed.
    ///
    /// Lights come on at dusk only while a fire-lighting species is active;
    /// at dawn every light burns out regardless.
    fn update_lights(&mut self, terrain: &mut dyn TerrainGrid) {
        let darkness = self.clock.darkness();
        let was_night = self.prev_darkness >= 0.5;
        let night_now = darkness >= 0.5;
        self.prev_darkness = darkness;
        if was_night == night_now {
            return;
        }
        if night_now {
            let lighter_about = self.pool.iter().any(|(_, a)| {
                self.registry
                    .get(a.species)
                    .is_some_and(|d| d.has_competence(Competence::LightFires))
            });
            if lighter_about {
                set_all_lights(terrain, true);
            }
        } else {
            set_all_lights(terrain, false);
        }
    }

    /// Despawn every actor and drop every reservation.
    pub fn reset(&mut self) {
        for id in self.pool.active_ids() {
            if let Some(mut actor) = self.pool.despawn(id) {
                let behavior = actor.behavior;
                behavior.on_despawn(&mut actor);
            }
        }
        self.reservations.clear();
        self.pending_deaths.clear();
        self.pending_births.clear();
    }

    /// Draw data for every active actor.
    pub fn sprite_batch(&self) -> Vec<SpriteInstance> {
        self.pool
            .iter()
            .filter_map(|(_, actor)| {
                self.registry.get(actor.species).map(|def| SpriteInstance {
                    species: actor.species,
                    pos: actor.pos,
                    heading: actor.heading,
                    frame: actor.anim_frame,
                    color: def.color,
                })
            })
            .collect()
    }

    /// Spawn an actor directly, outside the reservation table.
    pub fn spawn(&mut self, actor: Actor) -> Option<ActorId> {
        let id = self.pool.spawn(actor)?;
        if let Some(live) = self.pool.get_mut(id) {
            let behavior = live.behavior;
            behavior.on_spawn(live, &mut self.rng);
        }
        Some(id)
    }

    /// Remove an actor from the pool, returning its final state.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let mut actor = self.pool.despawn(id)?;
        let behavior = actor.behavior;
        behavior.on_despawn(&mut actor);
        Some(actor)
    }

    /// The actor in the given slot, if active.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.pool.get(id)
    }

    /// Mutable access to the actor in the given slot.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.pool.get_mut(id)
    }

    /// The species registered under the given id.
    pub fn species(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.registry.get(id)
    }

    /// The species registered under the given internal name.
    pub fn species_by_name(&self, name: &str) -> Option<&SpeciesDef> {
        self.registry.by_name(name)
    }

    /// The full species catalog.
    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    /// The live actor pool.
    pub fn pool(&self) -> &ActorPool {
        &self.pool
    }

    /// The reservation table.
    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    /// Everything that has happened so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The in-world clock.
    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    /// The configuration this simulation runs with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Whether the built-in catalog replaced unusable definitions.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Problems found while parsing the definitions file.
    pub fn parse_warnings(&self) -> &[ParseWarning] {
        &self.parse_warnings
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("active", &self.pool.len())
            .field("reservations", &self.reservations.len())
            .field("day", &self.clock.day_count())
            .finish_non_exhaustive()
    }
}

/// Build a registry from parsed definitions, recording rejections as events.
fn register_catalog(file: DefinitionsFile, events: &mut EventLog) -> SpeciesRegistry {
    let mut registry = SpeciesRegistry::new();
    for def in file.species {
        let id = def.id;
        let name = def.name.clone();
        if let Err(e) = registry.register(def) {
            events.push(SimEvent::new(
                0,
                SimEventKind::SpeciesRejected {
                    species: id,
                    reason: e.to_string(),
                },
                format!("species '{name}' rejected: {e}"),
            ));
        }
    }
    for rule in file.rules {
        let species = rule.species;
        if let Err(e) = registry.add_rule(rule) {
            events.push(SimEvent::new(
                0,
                SimEventKind::SpeciesRejected {
                    species,
                    reason: e.to_string(),
                },
                format!("spawn rule rejected: {e}"),
            ));
        }
    }
    registry
}

/// Set every installed light on the grid.
fn set_all_lights(terrain: &mut dyn TerrainGrid, lit: bool) {
    for y in 0..terrain.height() {
        for x in 0..terrain.width() {
            let tile = TilePos::new(x, y);
            if terrain.light_at(tile).is_some() {
                terrain.set_light_lit(tile, lit);
            }
        }
    }
}
