//! Prey selection and the strike on reach.

use fauna_core::{SpeciesDef, SpeciesRegistry};

use crate::actor::ActorId;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::event::{DeathCause, SimEventKind};
use crate::pool::ActorPool;

/// How far beyond the search radius a chase may stretch before the target
/// counts as escaped.
const LEASH_FACTOR: f32 = 2.0;

/// Maintain the hunt target for one actor and strike when in reach.
///
/// Runs for daylight hunters only; the undead never hunt. A standing target
/// is kept while it stays valid and inside the leash, re-searches are spaced
/// by the retry timer, and a strike queues the prey for death handling
/// rather than removing it mid-pass.
pub fn update(
    id: ActorId,
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    let (my_species, my_pos, my_target, my_retry, my_enraged) = {
        let Some(actor) = pool.get(id) else {
            return;
        };
        (
            actor.species,
            actor.pos,
            actor.target,
            actor.retry_timer,
            actor.enraged,
        )
    };
    let Some(def) = registry.get(my_species) else {
        return;
    };

    if !def.can_hunt || def.flags.undead || !ctx.clock.is_day() {
        if my_target.is_some()
            && let Some(actor) = pool.get_mut(id)
        {
            actor.target = None;
        }
        return;
    }

    let radius = if my_enraged {
        config.hunt_radius + config.enraged_hunt_radius_bonus
    } else {
        config.hunt_radius
    };

    if let Some(prey_id) = my_target {
        if prey_id != id
            && let Some((prey_species, prey_pos)) =
                pool.get(prey_id).map(|p| (p.species, p.pos))
            && prey_species != my_species
            && registry.get(prey_species).is_some_and(|p| valid_prey(def, p))
            && prey_pos.distance_sq(my_pos) <= (radius * LEASH_FACTOR).powi(2)
        {
            if prey_pos.distance_sq(my_pos) <= config.reach_distance * config.reach_distance {
                ctx.emit(
                    SimEventKind::Hunted {
                        hunter: id,
                        prey: prey_id,
                    },
                    format!("{} brought down its prey", def.display_name),
                );
                ctx.kill(prey_id, Some(id), DeathCause::Slain);
                if let Some(actor) = pool.get_mut(id) {
                    actor.target = None;
                    actor.retry_timer = config.hunt_retry_cooldown;
                }
            }
            // Otherwise keep chasing; goal steering reads the target.
            return;
        }
        // Stale or escaped.
        if let Some(actor) = pool.get_mut(id) {
            actor.target = None;
        }
    }

    if my_retry > 0.0 {
        return;
    }

    let mut best: Option<(ActorId, f32)> = None;
    for (other_id, other) in pool.iter() {
        if other_id == id || other.species == my_species {
            continue;
        }
        let Some(prey_def) = registry.get(other.species) else {
            continue;
        };
        if !valid_prey(def, prey_def) {
            continue;
        }
        let d2 = other.pos.distance_sq(my_pos);
        if d2 <= radius * radius && best.is_none_or(|(_, b)| d2 < b) {
            best = Some((other_id, d2));
        }
    }
    if let Some(actor) = pool.get_mut(id) {
        match best {
            Some((prey_id, _)) => actor.target = Some(prey_id),
            None => actor.retry_timer = config.hunt_retry_cooldown,
        }
    }
}

/// A prey species matches the hunter's tag list, or, when the hunter lists
/// none, any living species will do.
fn valid_prey(hunter: &SpeciesDef, prey: &SpeciesDef) -> bool {
    if hunter.hunt_tags.is_empty() {
        !prey.flags.undead
    } else {
        hunter.hunt_tags.iter().any(|t| prey.matches_tag(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::support::{Harness, catalog, spawn, wolf};
    use fauna_core::{Sex, SpeciesDef, SpeciesId, Vec2};

    #[test]
    fn selects_the_strictly_nearest_prey() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        let far = spawn(&mut pool, deer_def, Vec2::new(28.0, 20.0), Sex::Female);
        let near = spawn(&mut pool, deer_def, Vec2::new(25.0, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(hunter).unwrap().target, Some(near));
        assert_ne!(pool.get(hunter).unwrap().target, Some(far));
    }

    #[test]
    fn tag_list_filters_out_other_species() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let villager_def = registry.by_name("villager").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        // The villager stands closer than the deer but is not on the menu.
        spawn(&mut pool, villager_def, Vec2::new(22.0, 20.0), Sex::Male);
        let deer = spawn(&mut pool, deer_def, Vec2::new(26.0, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(hunter).unwrap().target, Some(deer));
    }

    #[test]
    fn untagged_hunter_takes_any_living_prey() {
        let mut h = Harness::daytime();
        let mut registry = catalog();
        let mut zombie = SpeciesDef::new(SpeciesId(20), "zombie");
        zombie.flags.undead = true;
        registry.register(zombie).unwrap();
        let mut generalist = wolf();
        generalist.id = SpeciesId(11);
        generalist.name = "fox".into();
        generalist.hunt_tags = Vec::new();
        registry.register(generalist).unwrap();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let fox_def = registry.by_name("fox").unwrap();
        let zombie_def = registry.by_name("zombie").unwrap();
        let villager_def = registry.by_name("villager").unwrap();
        let hunter = spawn(&mut pool, fox_def, Vec2::new(20.0, 20.0), Sex::Male);
        // The undead stand nearer but never count as prey.
        spawn(&mut pool, zombie_def, Vec2::new(21.0, 20.0), Sex::Male);
        let villager = spawn(&mut pool, villager_def, Vec2::new(24.0, 20.0), Sex::Male);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(hunter).unwrap().target, Some(villager));
    }

    #[test]
    fn strike_in_reach_queues_the_kill() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        let prey = spawn(&mut pool, deer_def, Vec2::new(20.5, 20.0), Sex::Female);
        pool.get_mut(hunter).unwrap().target = Some(prey);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(h.deaths.len(), 1);
        assert_eq!(h.deaths[0].victim, prey);
        assert_eq!(h.deaths[0].killer, Some(hunter));
        assert_eq!(h.deaths[0].cause, DeathCause::Slain);
        assert!(
            h.events
                .events()
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::Hunted { .. }))
        );
        let hunter_actor = pool.get(hunter).unwrap();
        assert!(hunter_actor.target.is_none());
        assert!(hunter_actor.retry_timer > 0.0);
    }

    #[test]
    fn failed_search_backs_off() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        // Outside the 12 unit search radius.
        spawn(&mut pool, deer_def, Vec2::new(40.0, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);
        assert!(pool.get(hunter).unwrap().target.is_none());
        assert_eq!(
            pool.get(hunter).unwrap().retry_timer,
            config.hunt_retry_cooldown
        );

        // While the timer runs, no new search happens even with prey close.
        spawn(&mut pool, deer_def, Vec2::new(22.0, 20.0), Sex::Female);
        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);
        assert!(pool.get(hunter).unwrap().target.is_none());
    }

    #[test]
    fn escaped_prey_is_dropped() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(10.0, 20.0), Sex::Male);
        let prey = spawn(&mut pool, deer_def, Vec2::new(40.0, 20.0), Sex::Female);
        {
            let actor = pool.get_mut(hunter).unwrap();
            actor.target = Some(prey);
            actor.retry_timer = 1.0;
        }

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        // 30 units is past the 24 unit leash.
        assert!(pool.get(hunter).unwrap().target.is_none());
        assert!(h.deaths.is_empty());
    }

    #[test]
    fn night_calls_off_the_chase() {
        let mut h = Harness::nighttime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        let prey = spawn(&mut pool, deer_def, Vec2::new(22.0, 20.0), Sex::Female);
        pool.get_mut(hunter).unwrap().target = Some(prey);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert!(pool.get(hunter).unwrap().target.is_none());
        assert!(h.deaths.is_empty());
    }

    #[test]
    fn undead_never_hunt() {
        let mut h = Harness::daytime();
        let mut registry = catalog();
        let mut ghoul = wolf();
        ghoul.id = SpeciesId(21);
        ghoul.name = "ghoul".into();
        ghoul.flags.undead = true;
        registry.register(ghoul).unwrap();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let ghoul_def = registry.by_name("ghoul").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, ghoul_def, Vec2::new(20.0, 20.0), Sex::Male);
        spawn(&mut pool, deer_def, Vec2::new(22.0, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);

        assert!(pool.get(hunter).unwrap().target.is_none());
    }

    #[test]
    fn rage_widens_the_search() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(8);

        let wolf_def = registry.by_name("wolf").unwrap();
        let deer_def = registry.by_name("deer").unwrap();
        let hunter = spawn(&mut pool, wolf_def, Vec2::new(20.0, 20.0), Sex::Male);
        // Between the 12 unit base radius and the 18 unit enraged one.
        let prey = spawn(&mut pool, deer_def, Vec2::new(35.0, 20.0), Sex::Female);

        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);
        assert!(pool.get(hunter).unwrap().target.is_none());

        {
            let actor = pool.get_mut(hunter).unwrap();
            actor.enraged = true;
            actor.retry_timer = 0.0;
        }
        let mut ctx = h.ctx();
        update(hunter, &mut pool, &registry, &config, &mut ctx);
        assert_eq!(pool.get(hunter).unwrap().target, Some(prey));
    }
}
