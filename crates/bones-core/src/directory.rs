//! The actor arena and the per-tick update protocol.
//!
//! Actors live in generational slots addressed by [`ActorId`]. The directory
//! keeps two views over those slots: the *live* sequence visited by each
//! update pass, and the *pending* additions queued while a pass was running.
//!
//! A pass ([`ActorDirectory::update_actors`]) runs in four phases:
//!
//! 1. raise the mutation flag;
//! 2. visit every live actor, in order, once;
//! 3. lower the flag and apply queued edits: pending actors get their world
//!    transform computed and join the live set, deferred removals detach;
//! 4. collect every dead live actor, then destroy them.
//!
//! Actors added during phase 2 are never visited by that pass. Actors marked
//! dead during phase 2 stay in place, inert, until phase 4.

use std::fmt;

use crate::actor::{Actor, ActorState};
use crate::context::{Subsystems, TickContext};
use crate::deferred::DeferredQueue;
use crate::input::KeyState;

/// Stable handle to an actor slot. Stale once the actor is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
enum Entry {
    Vacant,
    Occupied(Box<Actor>),
    /// Taken out while its own update runs.
    CheckedOut,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Entry,
}

/// Structural edits queued while the live set is being traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Add(ActorId),
    Remove(ActorId),
}

/// What one update pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Actors whose `update` ran.
    pub updated: usize,
    /// Pending actors moved into the live set, in commit order.
    pub committed: Vec<ActorId>,
    /// Live actors detached by a removal made during the pass.
    pub removed: Vec<ActorId>,
    /// Dead actors destroyed after the pass.
    pub destroyed: Vec<ActorId>,
}

/// Owns every actor and mediates structural changes during iteration.
#[derive(Debug, Default)]
pub struct ActorDirectory {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: Vec<ActorId>,
    edits: DeferredQueue<Edit>,
}

impl ActorDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Take ownership of `actor` and return its handle.
    ///
    /// Outside an update pass the actor joins the live set at once. During a
    /// pass it is queued as pending and joins after the pass, so it is first
    /// updated on the next tick.
    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        let id = self.allocate(actor);
        if self.edits.is_traversing() {
            tracing::debug!(actor = %id, "actor queued as pending");
            self.edits.defer(Edit::Add(id));
        } else {
            self.live.push(id);
        }
        id
    }

    /// Detach an actor and hand it back to the caller.
    ///
    /// A pending actor is pulled from the pending queue immediately. A live
    /// actor is swapped with the last live actor and popped, unless a pass is
    /// running: then the removal is queued, `None` is returned, and the actor
    /// is detached and dropped once the pass ends. Unknown or stale handles
    /// leave everything unchanged.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        if !self.is_current(id) {
            return None;
        }
        if self.edits.withdraw(|e| *e == Edit::Add(id)).is_some() {
            return self.release(id);
        }
        if !self.live.contains(&id) {
            return None;
        }
        if self.edits.is_traversing() {
            if !self.edits.contains(|e| *e == Edit::Remove(id)) {
                self.edits.defer(Edit::Remove(id));
            }
            return None;
        }
        self.unlink_live(id);
        self.release(id)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The actor behind `id`. `None` for stale handles and for an actor
    /// whose own update is running.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        match &self.slot(id)?.entry {
            Entry::Occupied(actor) => Some(actor.as_ref()),
            _ => None,
        }
    }

    /// Mutable access; same availability as [`ActorDirectory::get`].
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        match &mut self.slot_mut(id)?.entry {
            Entry::Occupied(actor) => Some(actor.as_mut()),
            _ => None,
        }
    }

    /// Whether `id` refers to an actor that has not been destroyed.
    pub fn contains(&self, id: ActorId) -> bool {
        self.is_current(id)
    }

    /// Whether `id` is in the live set.
    pub fn is_live(&self, id: ActorId) -> bool {
        self.live.contains(&id)
    }

    /// Whether `id` is waiting in the pending queue.
    pub fn is_pending(&self, id: ActorId) -> bool {
        self.edits.contains(|e| *e == Edit::Add(id))
    }

    /// Set an actor's lifecycle state. Returns `false` if the handle is stale
    /// or the actor is checked out for its own update.
    pub fn set_state(&mut self, id: ActorId, state: ActorState) -> bool {
        match self.get_mut(id) {
            Some(actor) => {
                actor.set_state(state);
                true
            }
            None => false,
        }
    }

    /// Live handles in update order.
    pub fn live_ids(&self) -> &[ActorId] {
        &self.live
    }

    /// Pending handles, oldest first.
    pub fn pending_ids(&self) -> Vec<ActorId> {
        self.edits
            .queued()
            .iter()
            .filter_map(|e| match e {
                Edit::Add(id) => Some(*id),
                Edit::Remove(_) => None,
            })
            .collect()
    }

    /// Live actors with their handles, in update order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.live
            .iter()
            .filter_map(|id| self.get(*id).map(|a| (*id, a)))
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the live set is empty.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of pending actors.
    pub fn pending_len(&self) -> usize {
        self.pending_ids().len()
    }

    /// Whether an update pass is running.
    pub fn is_updating(&self) -> bool {
        self.edits.is_traversing()
    }

    // -----------------------------------------------------------------------
    // Per-tick protocol
    // -----------------------------------------------------------------------

    /// Forward a key snapshot to every live actor.
    pub fn process_input(&mut self, keys: &KeyState) {
        for i in 0..self.live.len() {
            let id = self.live[i];
            if let Some(actor) = self.get_mut(id) {
                actor.process_input(keys);
            }
        }
    }

    /// Run one full update pass. See the module docs for the phases.
    ///
    /// A call made while a pass is already running does nothing and returns
    /// an empty report.
    pub fn update_actors(&mut self, dt: f32, systems: &mut Subsystems, tick: u64) -> UpdateReport {
        let mut report = UpdateReport::default();
        if self.edits.is_traversing() {
            tracing::warn!(tick, "nested update pass refused");
            return report;
        }

        self.edits.begin();
        // The live set cannot change while the flag is up, so indices stay valid.
        for i in 0..self.live.len() {
            let id = self.live[i];
            if self.edits.contains(|e| *e == Edit::Remove(id)) {
                continue;
            }
            let Some(mut actor) = self.check_out(id) else {
                continue;
            };
            if actor.is_active() {
                let mut ctx = TickContext::for_actor(id, tick, self, systems);
                actor.update(dt, &mut ctx);
                report.updated += 1;
            }
            self.check_in(id, actor);
        }

        for edit in self.edits.finish() {
            match edit {
                Edit::Add(id) => {
                    if let Some(actor) = self.get_mut(id) {
                        actor.compute_world_transform();
                    }
                    self.live.push(id);
                    report.committed.push(id);
                }
                Edit::Remove(id) => {
                    self.unlink_live(id);
                    if let Some(actor) = self.release(id) {
                        tracing::debug!(actor = %id, name = actor.name(), "removed after pass");
                        report.removed.push(id);
                    }
                }
            }
        }
        if !report.committed.is_empty() {
            tracing::debug!(count = report.committed.len(), "pending actors committed");
        }

        report.destroyed = self.reap_dead();
        report
    }

    /// Destroy every live actor whose state is `Dead`.
    ///
    /// Dead actors are collected first and destroyed afterwards, so the live
    /// set is never edited while it is being scanned.
    fn reap_dead(&mut self) -> Vec<ActorId> {
        let dead: Vec<ActorId> = self
            .iter()
            .filter(|(_, actor)| actor.state() == ActorState::Dead)
            .map(|(id, _)| id)
            .collect();

        for id in &dead {
            self.unlink_live(*id);
            if let Some(actor) = self.release(*id) {
                tracing::debug!(actor = %id, name = actor.name(), "dead actor destroyed");
            }
        }
        dead
    }

    /// Destroy every actor, live and pending.
    ///
    /// Refused while a pass is running, in which case `false` is returned.
    pub fn clear(&mut self) -> bool {
        if self.edits.is_traversing() {
            tracing::warn!("clear refused during an update pass");
            return false;
        }
        let pending = self.pending_ids();
        let all: Vec<ActorId> = self.live.drain(..).chain(pending).collect();
        self.edits.finish();
        for id in all {
            self.release(id);
        }
        true
    }

    // -----------------------------------------------------------------------
    // Slot management
    // -----------------------------------------------------------------------

    fn allocate(&mut self, actor: Actor) -> ActorId {
        let entry = Entry::Occupied(Box::new(actor));
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                ActorId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                ActorId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Vacate the slot, invalidate outstanding handles, and return the actor.
    fn release(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self.slot_mut(id)?;
        let entry = std::mem::replace(&mut slot.entry, Entry::Vacant);
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        match entry {
            Entry::Occupied(actor) => Some(*actor),
            _ => None,
        }
    }

    fn unlink_live(&mut self, id: ActorId) {
        if let Some(at) = self.live.iter().position(|l| *l == id) {
            self.live.swap_remove(at);
        }
    }

    fn check_out(&mut self, id: ActorId) -> Option<Box<Actor>> {
        let slot = self.slot_mut(id)?;
        match std::mem::replace(&mut slot.entry, Entry::CheckedOut) {
            Entry::Occupied(actor) => Some(actor),
            other => {
                slot.entry = other;
                None
            }
        }
    }

    fn check_in(&mut self, id: ActorId, actor: Box<Actor>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.entry = Entry::Occupied(actor);
        }
    }

    fn is_current(&self, id: ActorId) -> bool {
        self.slot(id)
            .is_some_and(|s| !matches!(s.entry, Entry::Vacant))
    }

    fn slot(&self, id: ActorId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: ActorId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
    }
}
