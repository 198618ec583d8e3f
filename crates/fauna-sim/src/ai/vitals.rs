//! Hunger, aging, and the shared behavior timers.

use fauna_core::{SpeciesDef, SpeciesRegistry};

use crate::actor::{Actor, ActorId};
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::event::{DeathCause, SimEventKind};
use crate::pool::ActorPool;

/// Advance timers, hunger, and age for one actor.
///
/// Hunger decays so that a full belly lasts one in-world day; the undead
/// decay at a fixed faster rate instead. Crossing below the alert fraction
/// marks the actor hungry and emits a single event; at the starvation
/// threshold a living actor is routed to death handling while an undead one
/// turns enraged. Past the species death age the actor dies of old age.
pub fn update(
    id: ActorId,
    pool: &mut ActorPool,
    registry: &SpeciesRegistry,
    config: &SimConfig,
    ctx: &mut SimContext<'_>,
) {
    let dt = ctx.dt();
    let Some(actor) = pool.get_mut(id) else {
        return;
    };
    let Some(def) = registry.get(actor.species) else {
        return;
    };

    actor.retry_timer = (actor.retry_timer - dt).max(0.0);
    actor.mate_cooldown = (actor.mate_cooldown - dt).max(0.0);

    let rate = if def.flags.undead {
        config.undead_hunger_rate
    } else {
        def.max_hunger / ctx.clock.seconds_per_day()
    };
    actor.hunger = (actor.hunger - rate * dt).max(0.0);

    let alert = def.max_hunger * config.hunger_alert_fraction;
    if actor.hunger <= alert {
        if !actor.hungry {
            actor.hungry = true;
            ctx.emit(
                SimEventKind::Starving { actor: id },
                format!("{} is starving", def.display_name),
            );
        }
    } else {
        actor.hungry = false;
    }

    if actor.hunger <= config.starvation_threshold {
        if def.flags.undead {
            if !actor.enraged {
                actor.enraged = true;
                ctx.emit(
                    SimEventKind::Enraged { actor: id },
                    format!("{} is enraged by hunger", def.display_name),
                );
            }
        } else {
            ctx.kill(id, None, DeathCause::Starved);
        }
    }

    actor.age += dt;
    if actor.age >= def.death_age {
        ctx.kill(id, None, DeathCause::OldAge);
    }
}

/// Restore hunger, clamped to the species maximum. Returns the amount
/// actually consumed; the alert flag clears once the actor is back above
/// the alert fraction.
pub(crate) fn feed(
    actor: &mut Actor,
    def: &SpeciesDef,
    amount: f32,
    alert_fraction: f32,
) -> f32 {
    let room = (def.max_hunger - actor.hunger).max(0.0);
    let eaten = amount.clamp(0.0, room);
    actor.hunger += eaten;
    if actor.hunger > def.max_hunger * alert_fraction {
        actor.hungry = false;
    }
    eaten
}
