//! Courtship, the affection timer, and the deferred birth commit.

use fauna_core::{SpeciesRegistry, Vec2};
use rand::Rng;

use crate::actor::{Actor, ActorId};
use crate::config::SimConfig;
use crate::context::{Birth, SimContext};
use crate::event::SimEventKind;
use crate::pool::ActorPool;
use crate::populate;
use crate::streaming::{Reservation, ReservationTable};

/// Advance one actor's courtship.
///
/// The affection countdown runs in any phase, so a courtship begun at night
/// finishes even past dawn; its expiry is when the lower-id partner rolls
/// for offspring. New pairings happen at night only, between idle, fed,
/// off-cooldown actors of complementary sex and matching lineage.
pub fn update(
    id: ActorId,
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    let dt = ctx.dt();

    let mut expired_partner = None;
    {
        let Some(actor) = pool.get_mut(id) else {
            return;
        };
        if actor.affection > 0.0 {
            actor.affection = (actor.affection - dt).max(0.0);
            if actor.affection > 0.0 {
                // Mid-courtship; the actor stands still and waits.
                return;
            }
            expired_partner = actor.partner.take();
        }
    }
    if let Some(partner_id) = expired_partner {
        conclude(id, partner_id, pool, registry, config, ctx);
        return;
    }

    let (my_species, my_pos, my_sex, my_hungry, my_cooldown, my_idle) = {
        let Some(actor) = pool.get(id) else {
            return;
        };
        (
            actor.species,
            actor.pos,
            actor.sex,
            actor.hungry,
            actor.mate_cooldown,
            actor.is_idle(config.idle_speed),
        )
    };
    let Some(def) = registry.get(my_species) else {
        return;
    };

    if !def.can_reproduce
        || !ctx.clock.is_night()
        || my_hungry
        || my_cooldown > 0.0
        || !my_idle
    {
        return;
    }

    let lineage = def.lineage();
    let want = my_sex.opposite();
    let radius = config.mating_radius;
    let mut best: Option<(ActorId, f32)> = None;
    for (other_id, other) in pool.iter() {
        if other_id == id
            || other.sex != want
            || other.hungry
            || other.mate_cooldown > 0.0
            || other.affection > 0.0
            || other.partner.is_some()
            || !other.is_idle(config.idle_speed)
        {
            continue;
        }
        let Some(other_def) = registry.get(other.species) else {
            continue;
        };
        if !other_def.can_reproduce || other_def.lineage() != lineage {
            continue;
        }
        let d2 = other.pos.distance_sq(my_pos);
        if d2 <= radius * radius && best.is_none_or(|(_, b)| d2 < b) {
            best = Some((other_id, d2));
        }
    }
    let Some((partner_id, _)) = best else {
        return;
    };

    // Both stand for the affection animation and start their cooldowns.
    if let Some(actor) = pool.get_mut(id) {
        actor.affection = config.affection_seconds;
        actor.mate_cooldown = config.mating_cooldown;
        actor.partner = Some(partner_id);
    }
    if let Some(partner) = pool.get_mut(partner_id) {
        partner.affection = config.affection_seconds;
        partner.mate_cooldown = config.mating_cooldown;
        partner.partner = Some(id);
    }
}

/// Resolve a finished courtship. Only the lower slot id rolls, so a pair
/// produces at most one offspring.
fn conclude(
    id: ActorId,
    partner_id: ActorId,
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    if id >= partner_id {
        return;
    }
    let Some((my_species, my_pos)) = pool.get(id).map(|a| (a.species, a.pos)) else {
        return;
    };
    let Some(partner_pos) = pool.get(partner_id).map(|a| a.pos) else {
        return;
    };
    let Some(def) = registry.get(my_species) else {
        return;
    };

    let chance = f64::from(config.offspring_chance.clamp(0.0, 1.0));
    if !ctx.rng.random_bool(chance) {
        return;
    }

    let species = registry.offspring_of(def);
    let jitter = config.offspring_jitter;
    let offset = if jitter > 0.0 {
        Vec2::new(
            ctx.rng.random_range(-jitter..jitter),
            ctx.rng.random_range(-jitter..jitter),
        )
    } else {
        Vec2::ZERO
    };
    let midpoint = my_pos.midpoint(partner_pos) + offset;
    // A jittered midpoint can land in a wall; the parent's own tile cannot.
    let pos = if ctx.terrain.is_walkable(midpoint.tile()) {
        midpoint
    } else {
        my_pos
    };
    let structure = registry
        .get(species)
        .and_then(|child| child.structure.as_deref())
        .and_then(|kind| ctx.structures.home_for(kind));

    ctx.birth(Birth {
        species,
        pos,
        structure,
        parent_a: id,
        parent_b: partner_id,
    });
}

/// Apply queued births after the actor pass.
///
/// Each offspring is spawned, recorded in the reservation table so it
/// persists past streaming, and settled into its home structure. A full
/// pool drops the offspring; a full table leaves it live but transient.
pub fn commit(
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    table: &mut ReservationTable,
    ctx: &mut SimContext<'_>,
) -> usize {
    let births: Vec<Birth> = ctx.births.drain(..).collect();
    let mut born = 0;
    for birth in births {
        let Some(def) = registry.get(birth.species) else {
            continue;
        };
        let sex = populate::roll_sex(def, ctx.rng);
        let mut child = Actor::new(def, birth.pos, sex);
        child.structure = birth.structure;
        let Some(child_id) = pool.spawn(child) else {
            continue;
        };
        if let Some(live) = pool.get_mut(child_id) {
            let behavior = live.behavior;
            behavior.on_spawn(live, ctx.rng);
        }

        let mut reservation = Reservation::new(def, sex, birth.pos);
        if let Some(sid) = birth.structure {
            reservation = reservation.with_structure(sid);
        }
        if let Some(rid) = table.schedule(reservation) {
            if let Some(entry) = table.get_mut(rid) {
                entry.actor = Some(child_id);
            }
            if let Some(live) = pool.get_mut(child_id) {
                live.reservation = Some(rid);
            }
        }
        if let Some(sid) = birth.structure {
            ctx.structures.add_resident(sid, birth.species);
            ctx.structures.note_resident_active(sid);
        }
        born += 1;
        ctx.emit(
            SimEventKind::Born {
                child: child_id,
                parent_a: birth.parent_a,
                parent_b: birth.parent_b,
            },
            format!("a {} was born", def.display_name),
        );
    }
    born
}
