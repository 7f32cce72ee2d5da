//! Core runtime types for the Bones engine.
//!
//! Actors own an ordered list of components and a cached world transform.
//! The [`ActorDirectory`] owns every actor in a generational arena and
//! drives the per-tick update pass, buffering structural edits made while
//! the pass is running so the live set is never mutated mid-iteration.
//! Movement is validated against a [`GridMap`].

/// Actors, their lifecycle state, and per-actor behavior hooks.
pub mod actor;
/// The component capability trait and the per-actor ordered component list.
pub mod component;
/// Built-in components: grid movement and drawable meshes.
pub mod components;
/// Per-tick context handed to components, and the signals they raise.
pub mod context;
/// Generic buffer for structural edits raised during traversal.
pub mod deferred;
/// The actor arena and update protocol.
pub mod directory;
/// Error types for the crate.
pub mod error;
/// Walkability grid and distinguished cells.
pub mod grid;
/// Keyboard snapshot types.
pub mod input;
/// Seeded maze generation.
pub mod maze;
/// Spatial transform with a cached world matrix.
pub mod math;

pub use actor::{Actor, ActorBody, ActorState, Behavior};
pub use component::{Component, ComponentList};
pub use components::{AssetHandle, MeshComponent, MoveBindings, MoveComponent};
pub use context::{Signal, Subsystems, TickContext};
pub use deferred::DeferredQueue;
pub use directory::{ActorDirectory, ActorId, UpdateReport};
pub use error::{CoreError, CoreResult};
pub use grid::{Cell, GridMap};
pub use input::{Key, KeyState};
pub use math::Transform;
