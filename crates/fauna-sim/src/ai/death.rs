//! Deferred death processing, run after the per-actor pass.

use fauna_core::{FoodKind, MapObject, SpeciesRegistry};

use crate::ai::vitals;
use crate::config::SimConfig;
use crate::context::{Death, SimContext};
use crate::event::{DeathCause, SimEventKind};
use crate::pool::ActorPool;
use crate::streaming::{ReservationTable, Snapshot};

/// Apply queued deaths.
///
/// Each victim leaves remains on its tile, pays out nutrition to its
/// killer, and despawns through the normal pool path. The victim's
/// reservation stays in the table with a reset snapshot, so the same
/// inhabitant later returns home with fresh stats. References other actors
/// hold to the victim's slot are cleared before the slot can be reused.
pub fn process(
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    table: &mut ReservationTable,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) -> usize {
    let deaths: Vec<Death> = ctx.deaths.drain(..).collect();
    let mut processed = 0;
    for death in deaths {
        let Some((species, pos, structure, reservation)) = pool
            .get(death.victim)
            .map(|a| (a.species, a.pos, a.structure, a.reservation))
        else {
            continue;
        };
        let Some(def) = registry.get(species) else {
            continue;
        };

        // Pay the killer before the victim leaves the pool.
        if let Some(killer_id) = death.killer
            && killer_id != death.victim
            && let Some(killer) = pool.get_mut(killer_id)
            && let Some(killer_def) = registry.get(killer.species)
        {
            let eaten = vitals::feed(
                killer,
                killer_def,
                def.nutrition,
                config.hunger_alert_fraction,
            );
            let surplus = (def.nutrition - eaten).max(0.0);
            if surplus > 0.0
                && let Some(home) = killer.structure
            {
                ctx.pantry.deposit(home, FoodKind::Meat, surplus);
            }
        }

        let tile = pos.tile();
        if ctx.terrain.object_at(tile).is_none() {
            ctx.terrain.place_object(tile, MapObject::new("remains"));
        }

        if let Some(sid) = structure {
            ctx.structures.remove_resident(sid, species);
            ctx.structures.note_resident_inactive(sid);
        }

        // The reservation survives with a fresh snapshot at its home point.
        if let Some(rid) = reservation
            && let Some(entry) = table.get_mut(rid)
            && entry.actor == Some(death.victim)
        {
            entry.snapshot = Snapshot::initial(entry.snapshot.home, def.max_hp);
            entry.actor = None;
        }

        // Nothing may keep pointing at the slot about to be reused.
        for other_id in pool.active_ids() {
            if other_id == death.victim {
                continue;
            }
            if let Some(other) = pool.get_mut(other_id) {
                if other.target == Some(death.victim) {
                    other.target = None;
                }
                if other.partner == Some(death.victim) {
                    other.partner = None;
                }
            }
        }

        let Some(mut victim) = pool.despawn(death.victim) else {
            continue;
        };
        let behavior = victim.behavior;
        behavior.on_despawn(&mut victim);
        processed += 1;

        let description = match death.cause {
            DeathCause::Slain => format!("{} was slain", def.display_name),
            cause => format!("{} died of {cause}", def.display_name),
        };
        ctx.emit(
            SimEventKind::Died {
                actor: death.victim,
                cause: death.cause,
            },
            description,
        );
    }
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::support::{Harness, catalog, spawn};
    use crate::streaming::Reservation;
    use fauna_core::{Pantry, Sex, StructureRegistry, TerrainGrid, Vec2};

    #[test]
    fn victim_leaves_remains_and_resets_its_reservation() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let def = registry.by_name("deer").unwrap();
        let home = Vec2::new(30.0, 30.0);
        let rid = table
            .schedule(Reservation::new(def, Sex::Female, home))
            .unwrap();
        let id = spawn(&mut pool, def, Vec2::new(33.0, 31.0), Sex::Female);
        {
            let actor = pool.get_mut(id).unwrap();
            actor.reservation = Some(rid);
            actor.home = home;
            actor.age = 500.0;
        }
        table.get_mut(rid).unwrap().actor = Some(id);

        let mut ctx = h.ctx();
        ctx.kill(id, None, DeathCause::Starved);
        let processed = process(&mut pool, &registry, &mut table, &config, &mut ctx);

        assert_eq!(processed, 1);
        assert!(pool.is_empty());
        let remains = h.world.terrain.object_at(Vec2::new(33.0, 31.0).tile());
        assert_eq!(remains.map(|o| o.name.as_str()), Some("remains"));

        let entry = table.get(rid).unwrap();
        assert!(entry.actor.is_none());
        assert_eq!(entry.snapshot.pos, home);
        assert_eq!(entry.snapshot.home, home);
        assert!((entry.snapshot.hp - def.max_hp).abs() < f32::EPSILON);
        assert_eq!(entry.snapshot.age, 0.0);
        assert!(
            h.events
                .events()
                .iter()
                .any(|e| matches!(
                    e.kind,
                    SimEventKind::Died {
                        cause: DeathCause::Starved,
                        ..
                    }
                ))
        );
    }

    #[test]
    fn killer_feeds_and_banks_the_surplus() {
        let mut h = Harness::daytime();
        let den = h.world.structures.add("den", Vec2::new(8.0, 8.0));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        let prey = spawn(&mut pool, deer_def, Vec2::new(20.5, 20.0), Sex::Female);
        {
            let killer = pool.get_mut(hunter).unwrap();
            killer.structure = Some(den);
            killer.hunger = 80.0;
            killer.hungry = false;
        }

        let mut ctx = h.ctx();
        ctx.kill(prey, Some(hunter), DeathCause::Slain);
        process(&mut pool, &registry, &mut table, &config, &mut ctx);

        // Deer carry 40 nutrition: 20 fills the wolf, 20 reaches the den.
        let killer = pool.get(hunter).unwrap();
        assert!((killer.hunger - wolf_def.max_hunger).abs() < 1e-4);
        assert!((h.world.pantry.stored(den, FoodKind::Meat) - 20.0).abs() < 1e-4);
        assert!(!pool.contains(prey));
    }

    #[test]
    fn dead_killer_earns_nothing() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let deer_def = registry.by_name("deer").unwrap();
        let prey = spawn(&mut pool, deer_def, Vec2::new(20.5, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        // Killer id was never spawned; the payout is simply skipped.
        ctx.kill(prey, Some(crate::actor::ActorId(7)), DeathCause::Slain);
        let processed = process(&mut pool, &registry, &mut table, &config, &mut ctx);

        assert_eq!(processed, 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn stale_victims_are_skipped() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let mut ctx = h.ctx();
        ctx.kill(crate::actor::ActorId(3), None, DeathCause::Starved);
        let processed = process(&mut pool, &registry, &mut table, &config, &mut ctx);

        assert_eq!(processed, 0);
        assert!(h.events.is_empty());
    }

    #[test]
    fn dangling_references_are_cleared() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let victim = spawn(&mut pool, deer_def, Vec2::new(20.0, 20.0), Sex::Female);
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(25.0, 20.0), Sex::Male);
        let widow = spawn(&mut pool, deer_def, Vec2::new(21.0, 20.0), Sex::Male);
        pool.get_mut(hunter).unwrap().target = Some(victim);
        pool.get_mut(widow).unwrap().partner = Some(victim);

        let mut ctx = h.ctx();
        ctx.kill(victim, None, DeathCause::OldAge);
        process(&mut pool, &registry, &mut table, &config, &mut ctx);

        assert!(pool.get(hunter).unwrap().target.is_none());
        assert!(pool.get(widow).unwrap().partner.is_none());
    }

    #[test]
    fn resident_victim_frees_its_slot() {
        let mut h = Harness::daytime();
        let home = h.world.structures.add("house", Vec2::new(10.0, 10.0));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(10.5, 10.5), Sex::Female);
        pool.get_mut(id).unwrap().structure = Some(home);
        h.world.structures.add_resident(home, def.id);
        h.world.structures.note_resident_active(home);
        assert_eq!(h.world.structures.active_residents(home), 1);

        let mut ctx = h.ctx();
        ctx.kill(id, None, DeathCause::Starved);
        process(&mut pool, &registry, &mut table, &config, &mut ctx);

        assert_eq!(h.world.structures.active_residents(home), 0);
    }

    #[test]
    fn remains_never_replace_standing_objects() {
        let mut h = Harness::daytime();
        h.world.add_berry_bush(Vec2::new(20.5, 20.5).tile());
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);
        let mut table = ReservationTable::new(8);

        let deer_def = registry.by_name("deer").unwrap();
        let id = spawn(&mut pool, deer_def, Vec2::new(20.5, 20.5), Sex::Female);

        let mut ctx = h.ctx();
        ctx.kill(id, None, DeathCause::Starved);
        process(&mut pool, &registry, &mut table, &config, &mut ctx);

        let object = h.world.terrain.object_at(Vec2::new(20.5, 20.5).tile());
        assert_eq!(object.map(|o| o.name.as_str()), Some("berry_bush"));
    }
}
