//! Reservation table and the dormant/active streaming state machine.
//!
//! The table owns the intended population of the whole world, which far
//! exceeds pool capacity. Each tick [`ReservationTable::reconcile`] activates
//! dormant reservations near the focus into pool slots and hibernates live
//! actors that drifted out of range, carrying captured state across the
//! transition. The deactivation radius is strictly wider than the activation
//! radius; the band between them is what keeps boundary actors from
//! flickering in and out.

use fauna_core::{Sex, SimulationFocus, SpeciesDef, SpeciesId, SpeciesRegistry, StructureId, Vec2};

use crate::actor::{Actor, ActorId};
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::pool::ActorPool;

/// Index of a reservation in the table. Stable for the life of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservationId(pub u32);

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reservation#{}", self.0)
    }
}

/// Captured actor state, authoritative while the reservation is dormant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// World position.
    pub pos: Vec2,
    /// Velocity at capture time.
    pub vel: Vec2,
    /// Facing angle at capture time.
    pub heading: f32,
    /// Hit points; clamped to the species maximum on apply.
    pub hp: f32,
    /// Home anchor.
    pub home: Vec2,
    /// Seconds lived.
    pub age: f32,
}

impl Snapshot {
    /// Snapshot for a never-activated actor standing at its home point.
    pub fn initial(pos: Vec2, hp: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            hp,
            home: pos,
            age: 0.0,
        }
    }

    /// Overwrite the snapshot with the actor's live state.
    pub fn capture(&mut self, actor: &Actor) {
        self.pos = actor.pos;
        self.vel = actor.vel;
        self.heading = actor.heading;
        self.hp = actor.hp;
        self.home = actor.home;
        self.age = actor.age;
    }

    /// Write the snapshot into a live actor, clamping HP to the species max.
    pub fn apply(&self, actor: &mut Actor, def: &SpeciesDef) {
        actor.pos = self.pos;
        actor.vel = self.vel;
        actor.heading = self.heading;
        actor.hp = self.hp.clamp(0.0, def.max_hp);
        actor.home = self.home;
        actor.age = self.age;
    }
}

/// One intended inhabitant of the world.
///
/// Identity (species and sex) is fixed at schedule time; mutable state lives
/// in the snapshot while dormant and in the linked actor while active. At
/// most one live actor is ever linked, and the actor's back-reference must
/// agree with the link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    /// Species of the inhabitant.
    pub species: SpeciesId,
    /// Sex, decided when the reservation is scheduled.
    pub sex: Sex,
    /// Structure the inhabitant belongs to, if any.
    pub structure: Option<StructureId>,
    /// Custom (activation, deactivation) radii; focus-derived when `None`.
    pub radius_override: Option<(f32, f32)>,
    /// Captured state.
    pub snapshot: Snapshot,
    /// Live link to the pool while active.
    pub actor: Option<ActorId>,
}

impl Reservation {
    /// Schedule an inhabitant of the given species at a position.
    pub fn new(def: &SpeciesDef, sex: Sex, pos: Vec2) -> Self {
        Self {
            species: def.id,
            sex,
            structure: None,
            radius_override: None,
            snapshot: Snapshot::initial(pos, def.max_hp),
            actor: None,
        }
    }

    /// Attach the inhabitant to a structure, builder style.
    #[must_use]
    pub fn with_structure(mut self, id: StructureId) -> Self {
        self.structure = Some(id);
        self
    }

    /// Override the streaming radii, builder style.
    #[must_use]
    pub fn with_radii(mut self, activation: f32, deactivation: f32) -> Self {
        self.radius_override = Some((activation, deactivation));
        self
    }

    /// Whether a live actor is currently linked.
    pub fn is_active(&self) -> bool {
        self.actor.is_some()
    }

    /// Effective (activation, deactivation) radii for the given focus.
    pub fn radii(&self, focus: SimulationFocus, config: &SimConfig) -> (f32, f32) {
        self.radius_override.unwrap_or((
            focus.view_radius + config.activation_padding,
            focus.view_radius + config.deactivation_padding,
        ))
    }
}

/// Fixed-capacity store of every reservation in the world.
#[derive(Debug)]
pub struct ReservationTable {
    entries: Vec<Reservation>,
    capacity: usize,
}

impl ReservationTable {
    /// Create an empty table bounded to `capacity` reservations.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Maximum number of reservations.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of scheduled reservations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a reservation. Returns `None` when the table is full.
    pub fn schedule(&mut self, reservation: Reservation) -> Option<ReservationId> {
        if self.entries.len() >= self.capacity {
            return None;
        }
        let id = ReservationId(self.entries.len() as u32);
        self.entries.push(reservation);
        Some(id)
    }

    /// The reservation with the given id.
    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        self.entries.get(id.0 as usize)
    }

    /// Mutable access to the reservation with the given id.
    pub fn get_mut(&mut self, id: ReservationId) -> Option<&mut Reservation> {
        self.entries.get_mut(id.0 as usize)
    }

    /// Iterate all reservations in schedule order.
    pub fn iter(&self) -> impl Iterator<Item = (ReservationId, &Reservation)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, r)| (ReservationId(idx as u32), r))
    }

    /// Number of reservations with a live actor.
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|r| r.is_active()).count()
    }

    /// Number of reservations without a live actor.
    pub fn dormant_count(&self) -> usize {
        self.entries.len() - self.active_count()
    }

    /// Drop every reservation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Run one streaming pass against the focus.
    ///
    /// Dormant reservations inside the activation radius spawn a live actor
    /// (species must resolve and the snapshot position must be walkable;
    /// a full pool leaves them dormant). Active ones at or past the
    /// deactivation radius capture state and despawn. Distances are compared
    /// squared. Returns `(activated, hibernated)` counts.
    pub fn reconcile(
        &mut self,
        pool: &mut ActorPool,
        registry: &SpeciesRegistry,
        focus: SimulationFocus,
        config: &SimConfig,
        ctx: &mut SimContext<'_>,
    ) -> (usize, usize) {
        let mut activated = 0;
        let mut hibernated = 0;

        for idx in 0..self.entries.len() {
            let id = ReservationId(idx as u32);
            let res = &mut self.entries[idx];

            if let Some(actor_id) = res.actor {
                // Repair a link whose actor vanished or was re-slotted.
                let Some(live) = pool.get(actor_id) else {
                    res.actor = None;
                    continue;
                };
                if live.reservation != Some(id) {
                    res.actor = None;
                    continue;
                }

                let (_, deactivation) = res.radii(focus, config);
                if focus.center.distance_sq(live.pos) < deactivation * deactivation {
                    continue;
                }
                let Some(mut actor) = pool.despawn(actor_id) else {
                    continue;
                };
                res.snapshot.capture(&actor);
                let behavior = actor.behavior;
                behavior.on_despawn(&mut actor);
                if let Some(sid) = res.structure {
                    ctx.structures.note_resident_inactive(sid);
                }
                res.actor = None;
                hibernated += 1;
                let name = registry
                    .get(res.species)
                    .map_or("unknown", |d| d.display_name.as_str());
                ctx.emit(
                    SimEventKind::Hibernated {
                        actor: actor_id,
                        species: res.species,
                    },
                    format!("{name} drifted out of range"),
                );
            } else {
                let (activation, _) = res.radii(focus, config);
                if focus.center.distance_sq(res.snapshot.pos) > activation * activation {
                    continue;
                }
                let Some(def) = registry.get(res.species) else {
                    continue;
                };
                if !ctx.terrain.is_walkable(res.snapshot.pos.tile()) {
                    continue;
                }

                let mut actor = Actor::new(def, res.snapshot.pos, res.sex);
                actor.reservation = Some(id);
                actor.structure = res.structure;
                let Some(actor_id) = pool.spawn(actor) else {
                    continue;
                };
                if let Some(live) = pool.get_mut(actor_id) {
                    let behavior = live.behavior;
                    behavior.on_spawn(live, ctx.rng);
                    res.snapshot.apply(live, def);
                }
                res.actor = Some(actor_id);
                if let Some(sid) = res.structure {
                    ctx.structures.note_resident_active(sid);
                }
                activated += 1;
                ctx.emit(
                    SimEventKind::Activated {
                        actor: actor_id,
                        species: res.species,
                    },
                    format!("{} entered the simulated area", def.display_name),
                );
            }
        }

        (activated, hibernated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DayClock;
    use crate::demo::DemoWorld;
    use crate::event::EventLog;
    use fauna_core::StructureRegistry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Harness {
        world: DemoWorld,
        clock: DayClock,
        events: EventLog,
        rng: StdRng,
        deaths: Vec<crate::context::Death>,
        births: Vec<crate::context::Birth>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                world: DemoWorld::flat(64, 64),
                clock: DayClock::new(600.0, 0.1),
                events: EventLog::new(0),
                rng: StdRng::seed_from_u64(9),
                deaths: Vec::new(),
                births: Vec::new(),
            }
        }

        fn ctx(&mut self) -> SimContext<'_> {
            SimContext {
                terrain: &mut self.world.terrain,
                structures: &mut self.world.structures,
                pantry: &mut self.world.pantry,
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
                tick: 0,
                deaths: &mut self.deaths,
                births: &mut self.births,
            }
        }
    }

    fn registry() -> SpeciesRegistry {
        SpeciesRegistry::with_defaults()
    }

    fn deer_reservation(registry: &SpeciesRegistry, pos: Vec2) -> Reservation {
        let def = registry.by_name("deer").unwrap();
        Reservation::new(def, Sex::Female, pos)
    }

    // Default paddings: activation = view + 8, deactivation = view + 16.
    fn focus() -> SimulationFocus {
        SimulationFocus::new(Vec2::new(32.0, 32.0), 10.0)
    }

    #[test]
    fn activates_at_exactly_the_activation_radius() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let pos = Vec2::new(32.0 + 18.0, 32.0);
        let id = table.schedule(deer_reservation(&registry, pos)).unwrap();

        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 1);

        let res = table.get(id).unwrap();
        let actor_id = res.actor.unwrap();
        let actor = pool.get(actor_id).unwrap();
        assert_eq!(actor.reservation, Some(id));
        assert_eq!(actor.pos, pos);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn dormant_in_the_hysteresis_band_stays_dormant() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        // Midway between activation (18) and deactivation (26).
        let id = table
            .schedule(deer_reservation(&registry, Vec2::new(32.0 + 22.0, 32.0)))
            .unwrap();

        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 0);
        assert!(!table.get(id).unwrap().is_active());
    }

    #[test]
    fn active_in_the_hysteresis_band_stays_active() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let id = table
            .schedule(deer_reservation(&registry, Vec2::new(32.0 + 18.0, 32.0)))
            .unwrap();

        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        let actor_id = table.get(id).unwrap().actor.unwrap();

        // Drift into the band; must not hibernate.
        pool.get_mut(actor_id).unwrap().pos = Vec2::new(32.0 + 22.0, 32.0);
        let mut ctx = h.ctx();
        let (_, hibernated) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(hibernated, 0);
        assert!(table.get(id).unwrap().is_active());

        // At exactly the deactivation radius the actor hibernates.
        pool.get_mut(actor_id).unwrap().pos = Vec2::new(32.0 + 26.0, 32.0);
        let mut ctx = h.ctx();
        let (_, hibernated) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(hibernated, 1);
        assert!(!table.get(id).unwrap().is_active());
        assert_eq!(pool.len(), 0);

        // The captured position keeps it dormant inside the band.
        let snapshot = table.get(id).unwrap().snapshot;
        assert_eq!(snapshot.pos, Vec2::new(32.0 + 26.0, 32.0));
    }

    #[test]
    fn capture_is_idempotent() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let id = table
            .schedule(deer_reservation(&registry, Vec2::new(32.0, 32.0)))
            .unwrap();
        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);

        let actor_id = table.get(id).unwrap().actor.unwrap();
        let actor = pool.get(actor_id).unwrap().clone();

        let res = table.get_mut(id).unwrap();
        res.snapshot.capture(&actor);
        let first = res.snapshot;
        res.snapshot.capture(&actor);
        assert_eq!(res.snapshot, first);
    }

    #[test]
    fn unresolved_species_never_activates() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let mut res = deer_reservation(&registry, Vec2::new(32.0, 32.0));
        res.species = SpeciesId(999);
        let id = table.schedule(res).unwrap();

        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 0);
        assert!(!table.get(id).unwrap().is_active());
    }

    #[test]
    fn unwalkable_snapshot_position_blocks_activation() {
        let mut h = Harness::new();
        h.world.terrain.add_water(fauna_core::TilePos::new(32, 32));
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        table
            .schedule(deer_reservation(&registry, Vec2::new(32.5, 32.5)))
            .unwrap();

        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn full_pool_leaves_overflow_dormant() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(2);
        let mut table = ReservationTable::new(16);

        for i in 0..4 {
            table
                .schedule(deer_reservation(
                    &registry,
                    Vec2::new(30.0 + i as f32, 32.0),
                ))
                .unwrap();
        }

        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(table.active_count(), 2);
        assert_eq!(table.dormant_count(), 2);
    }

    #[test]
    fn structure_counter_follows_transitions() {
        let mut h = Harness::new();
        let sid = h.world.structures.add("house", Vec2::new(32.0, 32.0));
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let id = table
            .schedule(deer_reservation(&registry, Vec2::new(32.0, 32.0)).with_structure(sid))
            .unwrap();

        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(h.world.structures.active_residents(sid), 1);

        let actor_id = table.get(id).unwrap().actor.unwrap();
        pool.get_mut(actor_id).unwrap().pos = Vec2::new(32.0 + 40.0, 32.0);
        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(h.world.structures.active_residents(sid), 0);
    }

    #[test]
    fn stale_link_is_repaired_and_reactivates() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let id = table
            .schedule(deer_reservation(&registry, Vec2::new(32.0, 32.0)))
            .unwrap();
        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);

        // Remove the actor behind the table's back.
        let actor_id = table.get(id).unwrap().actor.unwrap();
        pool.despawn(actor_id);

        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert!(!table.get(id).unwrap().is_active());

        // The repaired reservation is dormant again and can come back.
        let mut ctx = h.ctx();
        let (activated, _) = table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        assert_eq!(activated, 1);
    }

    #[test]
    fn applied_hp_is_clamped_to_species_max() {
        let mut h = Harness::new();
        let registry = registry();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(16);

        let mut res = deer_reservation(&registry, Vec2::new(32.0, 32.0));
        res.snapshot.hp = 999.0;
        let id = table.schedule(res).unwrap();

        let mut ctx = h.ctx();
        table.reconcile(&mut pool, &registry, focus(), &config, &mut ctx);
        let actor_id = table.get(id).unwrap().actor.unwrap();
        let max_hp = registry.by_name("deer").unwrap().max_hp;
        assert!((pool.get(actor_id).unwrap().hp - max_hp).abs() < f32::EPSILON);
    }

    #[test]
    fn schedule_refuses_past_capacity() {
        let registry = registry();
        let mut table = ReservationTable::new(2);
        let res = deer_reservation(&registry, Vec2::ZERO);
        assert!(table.schedule(res).is_some());
        assert!(table.schedule(res).is_some());
        assert!(table.schedule(res).is_none());
        assert_eq!(table.len(), 2);
    }
}
