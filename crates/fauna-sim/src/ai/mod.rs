//! Species-gated behavior routines: hunger, hunting, gathering,
//! reproduction, and death handling.
//!
//! Each routine is a free function over one pool actor, invoked from the
//! per-tick orchestration after streaming reconciliation. Routines only
//! assign targets and queue deferred work; movement itself stays in
//! [`crate::behavior`], and the deaths and births queued here are applied
//! by [`death::process`] and [`reproduction::commit`] once the actor pass
//! has finished.

pub mod death;
pub mod gathering;
pub mod hunting;
pub mod reproduction;
pub mod vitals;
