//! The Fauna actor simulation: a fixed-capacity pool of creatures streamed
//! in and out of a larger dormant population.
//!
//! [`simulation::Simulation`] is the entry point. Feed it a
//! [`fauna_core::SpeciesRegistry`] (or a definitions file), seed the world
//! with [`simulation::Simulation::populate`], then call
//! [`simulation::Simulation::tick`] once per frame with the host world's
//! terrain, structures, and pantry.

/// Live actor state and draw data.
pub mod actor;
/// Behavior routines: vitals, hunting, gathering, reproduction, and death.
pub mod ai;
/// Per-species movement dispatch.
pub mod behavior;
/// The in-world day/night clock.
pub mod clock;
/// Tunable simulation parameters.
pub mod config;
/// The per-tick world view handed to behavior routines.
pub mod context;
/// In-memory world implementations for tests and the command line.
pub mod demo;
/// Error types used throughout the crate.
pub mod error;
/// The simulation event log.
pub mod event;
/// The fixed-capacity actor pool.
pub mod pool;
/// Spawn-rule evaluation that seeds the reservation table.
pub mod populate;
/// The simulation façade and tick loop.
pub mod simulation;
/// Dormant reservations and activation streaming.
pub mod streaming;

/// Re-export actor types.
pub use actor::{Actor, ActorId, SpriteInstance};
/// Re-export behavior dispatch types.
pub use behavior::{Behavior, BehaviorState};
/// Re-export the clock.
pub use clock::DayClock;
/// Re-export the configuration.
pub use config::SimConfig;
/// Re-export the behavior context.
pub use context::{Birth, Death, SimContext};
/// Re-export demo world implementations.
pub use demo::{DemoPantry, DemoStructures, DemoTerrain, DemoWorld};
/// Re-export error types.
pub use error::{SimError, SimResult};
/// Re-export event types.
pub use event::{DeathCause, EventLog, SimEvent, SimEventKind};
/// Re-export the actor pool.
pub use pool::ActorPool;
/// Re-export the population seeding summary.
pub use populate::PopulateSummary;
/// Re-export the simulation façade.
pub use simulation::{Simulation, TickSummary};
/// Re-export streaming types.
pub use streaming::{Reservation, ReservationId, ReservationTable, Snapshot};
