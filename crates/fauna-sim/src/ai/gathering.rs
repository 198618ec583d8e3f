//! Forage target selection and the harvest on reach.

use fauna_core::{MapObject, SpeciesDef, SpeciesRegistry, TerrainGrid, TilePos, Vec2};

use crate::actor::ActorId;
use crate::ai::vitals;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::pool::ActorPool;

/// Keep one actor's gather target fresh and harvest it on reach.
///
/// Daytime only. The search scans tiles around the actor for the nearest
/// object matching the species gather tags, or any edible object when the
/// species lists none. Harvested food feeds a hungry gatherer first; what
/// is left goes to the home structure pantry.
pub fn update(
    id: ActorId,
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    let (my_species, my_pos, my_target, my_retry) = {
        let Some(actor) = pool.get(id) else {
            return;
        };
        (
            actor.species,
            actor.pos,
            actor.gather_target,
            actor.retry_timer,
        )
    };
    let Some(def) = registry.get(my_species) else {
        return;
    };

    if !def.can_gather || !ctx.clock.is_day() {
        if my_target.is_some()
            && let Some(actor) = pool.get_mut(id)
        {
            actor.gather_target = None;
        }
        return;
    }

    if let Some(tile) = my_target {
        if ctx.terrain.object_at(tile).is_some_and(|o| wanted(def, o)) {
            let reach = config.reach_distance;
            if my_pos.distance_sq(tile.center()) <= reach * reach {
                harvest(id, tile, pool, def, config, ctx);
            }
            // Otherwise keep walking; goal steering reads the target.
            return;
        }
        // Gone, or claimed by someone else this tick.
        if let Some(actor) = pool.get_mut(id) {
            actor.gather_target = None;
        }
    }

    if my_retry > 0.0 {
        return;
    }

    let found = nearest_wanted(def, my_pos, config.gather_radius, ctx.terrain);
    if let Some(actor) = pool.get_mut(id) {
        match found {
            Some(tile) => actor.gather_target = Some(tile),
            None => actor.retry_timer = config.hunt_retry_cooldown,
        }
    }
}

fn harvest(
    id: ActorId,
    tile: TilePos,
    pool: &mut ActorPool,
    def: &SpeciesDef,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    let Some(object) = ctx.terrain.remove_object(tile) else {
        return;
    };
    let mut left = object.nutrition.max(0.0);
    let mut home = None;
    if let Some(actor) = pool.get_mut(id) {
        actor.gather_target = None;
        actor.retry_timer = config.hunt_retry_cooldown;
        home = actor.structure;
        if actor.hungry {
            left -= vitals::feed(actor, def, left, config.hunger_alert_fraction);
        }
    }
    if left > 0.0
        && let (Some(kind), Some(sid)) = (object.food, home)
    {
        ctx.pantry.deposit(sid, kind, left);
    }
    ctx.emit(
        SimEventKind::Gathered {
            actor: id,
            object: object.name.clone(),
        },
        format!("{} harvested {}", def.display_name, object.name),
    );
}

/// A harvestable matches the gatherer's tag list, or, when the species
/// lists none, anything edible will do.
fn wanted(def: &SpeciesDef, object: &MapObject) -> bool {
    if def.gather_tags.is_empty() {
        object.is_edible()
    } else {
        def.gather_tags.iter().any(|t| object.matches_tag(t))
    }
}

fn nearest_wanted(
    def: &SpeciesDef,
    from: Vec2,
    radius: f32,
    terrain: &dyn TerrainGrid,
) -> Option<TilePos> {
    let origin = from.tile();
    let span = radius.ceil() as i32;
    let mut best: Option<(TilePos, f32)> = None;
    for dy in -span..=span {
        for dx in -span..=span {
            let tile = TilePos::new(origin.x + dx, origin.y + dy);
            if !terrain.in_bounds(tile) {
                continue;
            }
            let Some(object) = terrain.object_at(tile) else {
                continue;
            };
            if !wanted(def, object) {
                continue;
            }
            let d2 = from.distance_sq(tile.center());
            if d2 <= radius * radius && best.is_none_or(|(_, b)| d2 < b) {
                best = Some((tile, d2));
            }
        }
    }
    best.map(|(tile, _)| tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::support::{Harness, catalog, spawn};
    use fauna_core::{FoodKind, Pantry, Sex};

    #[test]
    fn targets_the_nearest_matching_object() {
        let mut h = Harness::daytime();
        h.world.add_berry_bush(TilePos::new(25, 20));
        h.world.add_berry_bush(TilePos::new(23, 20));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(id).unwrap().gather_target, Some(TilePos::new(23, 20)));
    }

    #[test]
    fn unmatched_objects_are_passed_over() {
        let mut h = Harness::daytime();
        h.world
            .terrain
            .place_object(TilePos::new(21, 20), MapObject::new("boulder"));
        h.world.add_berry_bush(TilePos::new(26, 20));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(id).unwrap().gather_target, Some(TilePos::new(26, 20)));
    }

    #[test]
    fn untagged_gatherer_takes_anything_edible() {
        let mut h = Harness::daytime();
        h.world.terrain.place_object(
            TilePos::new(22, 20),
            MapObject::edible("mushroom", FoodKind::Produce, 6.0),
        );
        let mut registry = catalog();
        let mut forager = registry.by_name("villager").unwrap().clone();
        forager.id = fauna_core::SpeciesId(30);
        forager.name = "forager".into();
        forager.gather_tags = Vec::new();
        registry.register(forager).unwrap();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("forager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert_eq!(pool.get(id).unwrap().gather_target, Some(TilePos::new(22, 20)));
    }

    #[test]
    fn hungry_harvester_eats_before_banking() {
        let mut h = Harness::daytime();
        let home = h.world.structures.add("house", Vec2::new(10.0, 10.0));
        h.world.add_berry_bush(TilePos::new(20, 20));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);
        {
            let actor = pool.get_mut(id).unwrap();
            actor.structure = Some(home);
            actor.gather_target = Some(TilePos::new(20, 20));
            actor.hungry = true;
            actor.hunger = 90.0;
        }

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        // The bush held 15: 10 fills the actor, 5 reaches the pantry.
        let actor = pool.get(id).unwrap();
        assert!((actor.hunger - def.max_hunger).abs() < 1e-4);
        assert!(!actor.hungry);
        assert!((h.world.pantry.stored(home, FoodKind::Produce) - 5.0).abs() < 1e-4);
        assert!(h.world.terrain.object_at(TilePos::new(20, 20)).is_none());
        assert!(
            h.events
                .events()
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::Gathered { .. }))
        );
    }

    #[test]
    fn sated_harvester_banks_the_full_yield() {
        let mut h = Harness::daytime();
        let home = h.world.structures.add("house", Vec2::new(10.0, 10.0));
        h.world.add_berry_bush(TilePos::new(20, 20));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);
        {
            let actor = pool.get_mut(id).unwrap();
            actor.structure = Some(home);
            actor.gather_target = Some(TilePos::new(20, 20));
        }

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert!((h.world.pantry.stored(home, FoodKind::Produce) - 15.0).abs() < 1e-4);
        assert!((pool.get(id).unwrap().hunger - def.max_hunger).abs() < f32::EPSILON);
    }

    #[test]
    fn vanished_object_clears_the_target() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);
        {
            let actor = pool.get_mut(id).unwrap();
            actor.gather_target = Some(TilePos::new(20, 20));
            actor.retry_timer = 1.0;
        }

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert!(pool.get(id).unwrap().gather_target.is_none());
        assert!(h.events.is_empty());
    }

    #[test]
    fn night_halts_foraging() {
        let mut h = Harness::nighttime();
        h.world.add_berry_bush(TilePos::new(21, 20));
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);
        pool.get_mut(id).unwrap().gather_target = Some(TilePos::new(21, 20));

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert!(pool.get(id).unwrap().gather_target.is_none());
    }

    #[test]
    fn empty_surroundings_back_the_search_off() {
        let mut h = Harness::daytime();
        let registry = catalog();
        let config = SimConfig::default();
        let mut pool = ActorPool::new(4);

        let def = registry.by_name("villager").unwrap();
        let id = spawn(&mut pool, def, Vec2::new(20.5, 20.5), Sex::Female);

        let mut ctx = h.ctx();
        update(id, &mut pool, &registry, &config, &mut ctx);

        assert!(pool.get(id).unwrap().gather_target.is_none());
        assert_eq!(
            pool.get(id).unwrap().retry_timer,
            config.hunt_retry_cooldown
        );
    }
}
