use std::f32::consts::{PI, TAU};

use fauna_core::{Competence, SpeciesDef, TerrainGrid, Vec2};
use rand::Rng;
use rand::rngs::StdRng;

use crate::actor::Actor;

/// Movement style a species resolves to at spawn.
///
/// Dispatch is a closed set: each variant carries its own tuning and its own
/// slice of [`BehaviorState`], so adding a style means adding a variant here
/// rather than registering a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Unhurried drifting with long pauses. Settlers.
    Wander,
    /// Short quick darts between watchful pauses. Wildlife.
    Skitter,
    /// Never moves. Fixed flora and props.
    Sessile,
}

/// State private to the current behavior variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorState {
    /// Standing still until the timer expires.
    Resting {
        /// Seconds left before picking a new heading.
        remaining: f32,
    },
    /// Walking along the current heading until the timer expires.
    Roaming {
        /// Seconds left before the next pause.
        remaining: f32,
    },
}

impl Default for BehaviorState {
    fn default() -> Self {
        // Zero remaining so the first update picks a heading immediately.
        Self::Resting { remaining: 0.0 }
    }
}

impl Behavior {
    /// Resolve the movement style for a species from its traits and flags.
    pub fn for_species(def: &SpeciesDef) -> Self {
        if def.has_trait("skitter") {
            Self::Skitter
        } else if def.has_trait("wander") || def.flags.mobile {
            Self::Wander
        } else {
            Self::Sessile
        }
    }

    /// Initialize behavior state for a freshly spawned actor.
    ///
    /// The first rest is randomized so a group activated together does not
    /// move in lockstep.
    pub fn on_spawn(self, actor: &mut Actor, rng: &mut StdRng) {
        actor.state = match self {
            Self::Sessile => BehaviorState::default(),
            Self::Wander | Self::Skitter => BehaviorState::Resting {
                remaining: rng.random_range(0.0..1.5),
            },
        };
        actor.heading = rng.random_range(0.0..TAU);
    }

    /// Advance the actor one tick.
    ///
    /// With a goal the actor steers straight at it; otherwise it runs the
    /// rest/roam cycle. Collisions reverse the heading, except closed doors,
    /// which door-opening species walk through. Elders move at half the
    /// species maximum.
    pub fn update(
        self,
        actor: &mut Actor,
        def: &SpeciesDef,
        goal: Option<Vec2>,
        terrain: &mut dyn TerrainGrid,
        rng: &mut StdRng,
        dt: f32,
    ) {
        if self == Self::Sessile || actor.affection > 0.0 {
            actor.vel = Vec2::ZERO;
            return;
        }

        if let Some(goal) = goal {
            let to_goal = goal - actor.pos;
            if to_goal.length_sq() > 1e-6 {
                actor.heading = to_goal.heading();
                actor.vel = Vec2::from_heading(actor.heading) * effective_speed(actor, def);
                if step(actor, def, terrain, dt) {
                    // Blocked en route; stand this tick, the routine re-aims.
                    actor.vel = Vec2::ZERO;
                }
            } else {
                actor.vel = Vec2::ZERO;
            }
            return;
        }

        match actor.state {
            BehaviorState::Resting { remaining } => {
                actor.vel = Vec2::ZERO;
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    actor.heading = rng.random_range(0.0..TAU);
                    actor.state = BehaviorState::Roaming {
                        remaining: self.roam_secs(rng),
                    };
                } else {
                    actor.state = BehaviorState::Resting { remaining };
                }
            }
            BehaviorState::Roaming { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    actor.vel = Vec2::ZERO;
                    actor.state = BehaviorState::Resting {
                        remaining: self.rest_secs(rng),
                    };
                    return;
                }
                actor.state = BehaviorState::Roaming { remaining };
                let speed = effective_speed(actor, def) * self.pace();
                actor.vel = Vec2::from_heading(actor.heading) * speed;
                if step(actor, def, terrain, dt) {
                    actor.heading = (actor.heading + PI).rem_euclid(TAU);
                    actor.vel = Vec2::from_heading(actor.heading) * speed;
                    let _ = step(actor, def, terrain, dt);
                }
            }
        }
    }

    /// Clear transient routine state before the actor leaves the pool.
    pub fn on_despawn(self, actor: &mut Actor) {
        actor.vel = Vec2::ZERO;
        actor.target = None;
        actor.gather_target = None;
        actor.partner = None;
        actor.affection = 0.0;
    }

    /// Cruise speed as a fraction of the species maximum.
    fn pace(self) -> f32 {
        match self {
            Self::Wander => 0.6,
            Self::Skitter => 1.0,
            Self::Sessile => 0.0,
        }
    }

    fn roam_secs(self, rng: &mut StdRng) -> f32 {
        match self {
            Self::Wander => rng.random_range(1.5..4.0),
            Self::Skitter => rng.random_range(0.4..1.2),
            Self::Sessile => 0.0,
        }
    }

    fn rest_secs(self, rng: &mut StdRng) -> f32 {
        match self {
            Self::Wander => rng.random_range(1.0..3.0),
            Self::Skitter => rng.random_range(0.8..2.5),
            Self::Sessile => 0.0,
        }
    }
}

/// Species maximum speed, halved once the actor reaches elder age.
fn effective_speed(actor: &Actor, def: &SpeciesDef) -> f32 {
    if def.elder_age > 0.0 && actor.age >= def.elder_age {
        def.max_speed * 0.5
    } else {
        def.max_speed
    }
}

/// Try to move the actor by one tick of velocity.
///
/// Falls back to axis-aligned slides when the full step is blocked. Returns
/// `true` when no candidate step landed on walkable ground.
fn step(actor: &mut Actor, def: &SpeciesDef, terrain: &mut dyn TerrainGrid, dt: f32) -> bool {
    let delta = actor.vel * dt;
    // Drop float-noise components so a near-axis step cannot slide past a
    // wall on its negligible axis.
    let dx = if delta.x.abs() > 1e-5 { delta.x } else { 0.0 };
    let dy = if delta.y.abs() > 1e-5 { delta.y } else { 0.0 };
    if dx == 0.0 && dy == 0.0 {
        return false;
    }
    let candidates = [Vec2::new(dx, dy), Vec2::new(dx, 0.0), Vec2::new(0.0, dy)];
    for candidate in candidates {
        if candidate.length_sq() == 0.0 {
            continue;
        }
        let next = actor.pos + candidate;
        let tile = next.tile();
        if terrain.in_bounds(tile) && terrain.is_walkable(tile) {
            actor.pos = next;
            return false;
        }
        if terrain.door_at(tile) == Some(false) && def.has_competence(Competence::OpenDoors) {
            terrain.set_door_open(tile, true);
            actor.pos = next;
            return false;
        }
    }
    true
}
