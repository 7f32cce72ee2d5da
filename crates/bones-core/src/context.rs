use bones_mechanics::CombatRound;

use crate::actor::{Actor, ActorState};
use crate::directory::{ActorDirectory, ActorId};
use crate::grid::{Cell, GridMap};

/// Something a component wants the game layer to react to after the update pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// An actor moved into a new grid cell.
    Moved {
        /// The actor that moved.
        actor: ActorId,
        /// The cell it moved into.
        cell: Cell,
    },
    /// A move was rejected because the destination was not walkable.
    MoveBlocked {
        /// The actor that tried to move.
        actor: ActorId,
        /// The cell it tried to enter.
        cell: Cell,
    },
    /// Fire-and-forget audio event.
    PlaySound(String),
}

/// Long-lived shared state that components may consult during a tick.
#[derive(Debug)]
pub struct Subsystems {
    /// The walkability grid.
    pub map: GridMap,
    /// The active (or most recent) combat round.
    pub combat: CombatRound,
    signals: Vec<Signal>,
}

impl Subsystems {
    /// Bundle a map and a combat resolver with an empty signal queue.
    pub fn new(map: GridMap, combat: CombatRound) -> Self {
        Self {
            map,
            combat,
            signals: Vec::new(),
        }
    }

    /// Take every signal raised since the last drain, in emission order.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Signals raised since the last drain.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

/// Mutable context passed to components and behaviors during a tick.
///
/// Other actors are reachable only through [`TickContext::get`] and the
/// structural edits [`TickContext::spawn`], [`TickContext::remove`] and
/// [`TickContext::kill`], which the directory buffers while an update pass is
/// running. The directory itself is never handed out, so a component cannot
/// clear it or start a nested pass.
pub struct TickContext<'a> {
    current: Option<ActorId>,
    tick: u64,
    actors: &'a mut ActorDirectory,
    /// The walkability grid.
    pub map: &'a mut GridMap,
    /// The combat resolver.
    pub combat: &'a mut CombatRound,
    signals: &'a mut Vec<Signal>,
}

impl<'a> TickContext<'a> {
    pub(crate) fn for_actor(
        current: ActorId,
        tick: u64,
        actors: &'a mut ActorDirectory,
        systems: &'a mut Subsystems,
    ) -> Self {
        Self {
            current: Some(current),
            tick,
            actors,
            map: &mut systems.map,
            combat: &mut systems.combat,
            signals: &mut systems.signals,
        }
    }

    /// A context not tied to any registered actor, for driving an actor by hand.
    pub fn detached(actors: &'a mut ActorDirectory, systems: &'a mut Subsystems) -> Self {
        Self {
            current: None,
            tick: 0,
            actors,
            map: &mut systems.map,
            combat: &mut systems.combat,
            signals: &mut systems.signals,
        }
    }

    /// The actor being updated, if this context belongs to an update pass.
    pub fn current(&self) -> Option<ActorId> {
        self.current
    }

    /// Tick number of the running pass.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Another actor, read-only. `None` for stale handles and for the actor
    /// currently being updated.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Whether `id` is waiting to join the live set after this pass.
    pub fn is_pending(&self, id: ActorId) -> bool {
        self.actors.is_pending(id)
    }

    /// Queue a signal for the game layer.
    pub fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Register a new actor. During an update pass it is deferred and first
    /// updated on the next tick.
    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        self.actors.add_actor(actor)
    }

    /// Remove another actor. During an update pass a live actor is detached
    /// once the pass ends.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove_actor(id)
    }

    /// Mark another actor dead. Returns `false` for unknown handles and for
    /// the actor currently being updated, which should set its own state instead.
    pub fn kill(&mut self, id: ActorId) -> bool {
        self.actors.set_state(id, ActorState::Dead)
    }
}
