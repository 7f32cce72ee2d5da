use bones_core::{ActorId, Cell};
use bones_mechanics::Side;

use crate::game::Scene;

/// What kind of game event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEventKind {
    /// An actor was registered with the directory.
    Spawned {
        /// The new actor.
        actor: ActorId,
        /// Its name.
        name: String,
    },
    /// A dead or removed actor was destroyed after an update pass.
    Destroyed {
        /// The destroyed actor's former handle.
        actor: ActorId,
    },
    /// A movement attempt hit a wall or the grid edge.
    MoveBlocked {
        /// The actor that tried to move.
        actor: ActorId,
        /// The refused cell.
        cell: Cell,
    },
    /// A new maze was loaded.
    LevelChanged {
        /// 1-based level number.
        level: u32,
    },
    /// The active scene switched.
    SceneChanged {
        /// The previous scene.
        from: Scene,
        /// The new scene.
        to: Scene,
    },
    /// The player touched an enemy.
    FightStarted {
        /// The enemy actor.
        enemy: ActorId,
        /// Whether it is the final boss.
        boss: bool,
    },
    /// A fight reached a winner.
    FightResolved {
        /// The enemy actor.
        enemy: ActorId,
        /// Who won.
        winner: Side,
        /// Exchanges fought.
        rounds: u32,
    },
}

impl GameEventKind {
    /// Check whether a given actor is involved in this event.
    pub fn involves(&self, id: ActorId) -> bool {
        match self {
            Self::Spawned { actor, .. }
            | Self::Destroyed { actor }
            | Self::MoveBlocked { actor, .. } => *actor == id,
            Self::FightStarted { enemy, .. } | Self::FightResolved { enemy, .. } => *enemy == id,
            Self::LevelChanged { .. } | Self::SceneChanged { .. } => false,
        }
    }
}

/// A record of something that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    /// The tick the event was recorded on.
    pub tick: u64,
    /// The specific kind of event.
    pub kind: GameEventKind,
    /// A human-readable description.
    pub description: String,
}

impl GameEvent {
    /// Create an event.
    pub fn new(tick: u64, kind: GameEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a run, optionally bounded.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a log holding at most `max_events` entries (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest ones past capacity.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(..excess);
        }
    }

    /// All retained events, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Events recorded on `tick`.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&GameEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Events involving `id`.
    pub fn events_for_actor(&self, id: ActorId) -> Vec<&GameEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&GameEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
