//! Game loop and scene flow for the Bones engine.
//!
//! [`Game`] owns an [`bones_core::ActorDirectory`], the current
//! [`bones_core::GridMap`] and a [`bones_mechanics::CombatRound`], and drives
//! them once per tick through input, update and output. Frame pacing comes
//! from a [`FrameClock`]; drawing, key polling, audio and asset loading go
//! through the collaborator traits in [`services`] and [`assets`].

/// Lookup-or-load asset caching.
pub mod assets;
/// A behavior that keeps the camera on the player.
pub mod camera;
/// Frame pacing and time sources.
pub mod clock;
/// Configuration types for game runs.
pub mod config;
/// Error types for the engine crate.
pub mod error;
/// Game event types and the event log.
pub mod event;
/// The game loop, scenes, levels and fights.
pub mod game;
/// Renderer, input and audio seams with inert and recording implementations.
pub mod services;

pub use assets::{AssetCache, AssetKind, AssetLoader, AssetStore, CatalogLoader};
pub use camera::FollowCamera;
pub use clock::{FrameClock, SimulatedTime, TimeSource, WallClock};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use event::{EventLog, GameEvent, GameEventKind};
pub use game::{Encounter, Game, GameState, Scene, choose_enemy_action};
pub use services::{
    AudioEngine, Camera, DirectionalLight, Drawable, InputSystem, Lighting, NullRenderer,
    RecordingAudio, RecordingRenderer, RenderFrame, Renderer, ScriptedInput, SilentAudio,
};
