use fauna_core::{Color, Sex, SpeciesDef, SpeciesId, StructureId, TilePos, Vec2};

use crate::behavior::{Behavior, BehaviorState};
use crate::streaming::ReservationId;

/// Sprite animation rate while an actor is moving, in frames per second.
const ANIM_FPS: f32 = 6.0;

/// Identifies a pool slot.
///
/// The id is the slot index and stays valid only while the occupant is
/// active. After a despawn the same id may name a different actor, so ids
/// must be re-validated against the pool before use across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// One live actor occupying a pool slot.
///
/// Plain mutable state; the behavior enum and the routine modules read and
/// write these fields directly each tick.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Species this actor is an instance of.
    pub species: SpeciesId,
    /// World position.
    pub pos: Vec2,
    /// Velocity in units per second.
    pub vel: Vec2,
    /// Facing angle in radians.
    pub heading: f32,
    /// Current hit points.
    pub hp: f32,
    /// Current satiety; 0 means starving, species max means full.
    pub hunger: f32,
    /// Seconds lived (carried across hibernation via the snapshot age).
    pub age: f32,
    /// Biological sex; drives partner matching.
    pub sex: Sex,
    /// Movement style resolved from the species at spawn.
    pub behavior: Behavior,
    /// State private to the current behavior.
    pub state: BehaviorState,
    /// Anchor point the actor drifts back toward.
    pub home: Vec2,
    /// Structure the actor is a resident of, if any.
    pub structure: Option<StructureId>,
    /// Reservation this actor was streamed in from, if any.
    pub reservation: Option<ReservationId>,
    /// Current prey, if hunting.
    pub target: Option<ActorId>,
    /// Tile the actor is walking toward to gather from, if any.
    pub gather_target: Option<TilePos>,
    /// Seconds until the next prey or forage search is allowed.
    pub retry_timer: f32,
    /// Seconds until this actor may court again.
    pub mate_cooldown: f32,
    /// Seconds left standing with the current partner; positive means courting.
    pub affection: f32,
    /// Partner for the current courtship.
    pub partner: Option<ActorId>,
    /// Whether hunger has crossed below the alert fraction.
    pub hungry: bool,
    /// Whether prolonged starvation has enraged this actor (undead only).
    pub enraged: bool,
    /// Current sprite frame.
    pub anim_frame: u32,
    /// Accumulated animation time in frames.
    pub anim_clock: f32,
}

impl Actor {
    /// Create an actor with full stats at the given position.
    pub fn new(def: &SpeciesDef, pos: Vec2, sex: Sex) -> Self {
        Self {
            species: def.id,
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            hp: def.max_hp,
            hunger: def.max_hunger,
            age: 0.0,
            sex,
            behavior: Behavior::for_species(def),
            state: BehaviorState::default(),
            home: pos,
            structure: None,
            reservation: None,
            target: None,
            gather_target: None,
            retry_timer: 0.0,
            mate_cooldown: 0.0,
            affection: 0.0,
            partner: None,
            hungry: false,
            enraged: false,
            anim_frame: 0,
            anim_clock: 0.0,
        }
    }

    /// Current speed in units per second.
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Whether the actor counts as standing still.
    pub fn is_idle(&self, idle_speed: f32) -> bool {
        self.vel.length_sq() <= idle_speed * idle_speed
    }

    /// Hunger as a fraction of the species maximum.
    pub fn hunger_fraction(&self, def: &SpeciesDef) -> f32 {
        if def.max_hunger <= 0.0 {
            return 1.0;
        }
        (self.hunger / def.max_hunger).clamp(0.0, 1.0)
    }

    /// Advance the walk-cycle animation. The frame holds while idle.
    pub fn advance_animation(&mut self, frames: u32, idle_speed: f32, dt: f32) {
        if frames <= 1 {
            self.anim_frame = 0;
            return;
        }
        if !self.is_idle(idle_speed) {
            self.anim_clock += dt * ANIM_FPS;
            if self.anim_clock >= frames as f32 {
                self.anim_clock -= frames as f32;
            }
            self.anim_frame = (self.anim_clock as u32).min(frames - 1);
        }
    }
}

/// Everything a renderer needs to draw one actor.
///
/// Texture and sprite-sheet geometry come from the species definition; the
/// instance carries only the per-actor part.
#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    /// Species to resolve the texture and sheet layout from.
    pub species: SpeciesId,
    /// World position.
    pub pos: Vec2,
    /// Facing angle in radians.
    pub heading: f32,
    /// Sheet frame to draw.
    pub frame: u32,
    /// Tint color.
    pub color: Color,
}
