use fauna_core::SpeciesId;

use crate::actor::ActorId;

/// Why an actor died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Hunger reached the starvation threshold.
    Starved,
    /// Age passed the species death age.
    OldAge,
    /// Killed by another actor.
    Slain,
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starved => write!(f, "starvation"),
            Self::OldAge => write!(f, "old age"),
            Self::Slain => write!(f, "slain"),
        }
    }
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEventKind {
    // Catalog
    /// A species definition was rejected during registration.
    SpeciesRejected {
        /// The rejected species id.
        species: SpeciesId,
        /// Why registration refused it.
        reason: String,
    },

    // Streaming
    /// The spawn-rule engine finished seeding reservations.
    PopulationSeeded {
        /// Number of reservations created.
        reservations: usize,
    },
    /// A reservation near the focus was activated into a pool slot.
    Activated {
        /// The slot the actor now occupies.
        actor: ActorId,
        /// The actor's species.
        species: SpeciesId,
    },
    /// An active actor drifted out of range and went dormant.
    Hibernated {
        /// The slot the actor occupied.
        actor: ActorId,
        /// The actor's species.
        species: SpeciesId,
    },

    // Lifecycle
    /// An actor's hunger crossed below the alert fraction.
    Starving {
        /// The hungry actor.
        actor: ActorId,
    },
    /// Prolonged starvation enraged an undead actor.
    Enraged {
        /// The enraged actor.
        actor: ActorId,
    },
    /// A hunter brought down its prey.
    Hunted {
        /// The actor that made the kill.
        hunter: ActorId,
        /// The actor that was killed.
        prey: ActorId,
    },
    /// An actor collected a map object.
    Gathered {
        /// The gathering actor.
        actor: ActorId,
        /// Name of the collected object.
        object: String,
    },
    /// A courtship produced offspring.
    Born {
        /// The newborn actor.
        child: ActorId,
        /// One parent.
        parent_a: ActorId,
        /// The other parent.
        parent_b: ActorId,
    },
    /// An actor died.
    Died {
        /// The actor that died.
        actor: ActorId,
        /// The cause of death.
        cause: DeathCause,
    },
}

impl std::fmt::Display for SimEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SpeciesRejected { .. } => "species-rejected",
            Self::PopulationSeeded { .. } => "population-seeded",
            Self::Activated { .. } => "activated",
            Self::Hibernated { .. } => "hibernated",
            Self::Starving { .. } => "starving",
            Self::Enraged { .. } => "enraged",
            Self::Hunted { .. } => "hunted",
            Self::Gathered { .. } => "gathered",
            Self::Born { .. } => "born",
            Self::Died { .. } => "died",
        };
        f.write_str(label)
    }
}

impl SimEventKind {
    /// Check whether a given actor is involved in this event.
    pub fn involves(&self, id: ActorId) -> bool {
        match self {
            Self::SpeciesRejected { .. } | Self::PopulationSeeded { .. } => false,
            Self::Activated { actor, .. }
            | Self::Hibernated { actor, .. }
            | Self::Starving { actor }
            | Self::Enraged { actor }
            | Self::Gathered { actor, .. }
            | Self::Died { actor, .. } => *actor == id,
            Self::Hunted { hunter, prey } => *hunter == id || *prey == id,
            Self::Born {
                child,
                parent_a,
                parent_b,
            } => *child == id || *parent_a == id || *parent_b == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return the newest `n` events, oldest first.
    pub fn recent(&self, n: usize) -> &[SimEvent] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given actor.
    pub fn involving(&self, id: ActorId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return all events of the same variant as the given exemplar.
    pub fn of_kind(&self, kind: &SimEventKind) -> Vec<&SimEvent> {
        let want = std::mem::discriminant(kind);
        self.events
            .iter()
            .filter(|e| std::mem::discriminant(&e.kind) == want)
            .collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
