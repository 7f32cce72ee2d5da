//! Seams to the collaborators the game drives but does not implement:
//! drawing, key polling and audio. Each comes with an inert default and a
//! recording variant for headless runs.

use std::any::Any;
use std::collections::VecDeque;

use bones_core::{ActorId, AssetHandle, Key, KeyState};
use glam::{Mat4, Vec3};

use crate::error::{EngineError, EngineResult};
use crate::game::Scene;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// One mesh to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// The actor it belongs to.
    pub actor: ActorId,
    /// Mesh handle.
    pub mesh: AssetHandle,
    /// Texture handle, if one loaded.
    pub texture: Option<AssetHandle>,
    /// World matrix.
    pub world: Mat4,
}

/// Viewpoint for the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub eye: Vec3,
    /// Point looked at.
    pub target: Vec3,
    /// View matrix built from `eye` and `target`, Z up.
    pub view: Mat4,
}

impl Camera {
    /// A camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        let view = if eye.abs_diff_eq(target, f32::EPSILON) {
            Mat4::IDENTITY
        } else {
            Mat4::look_at_rh(eye, target, Vec3::Z)
        };
        Self { eye, target, view }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Vec3::new(-300.0, 0.0, 300.0), Vec3::ZERO)
    }
}

/// A directional light.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels.
    pub direction: Vec3,
    /// Diffuse colour.
    pub diffuse: Vec3,
    /// Specular colour.
    pub specular: Vec3,
}

/// Scene lighting.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    /// Ambient colour.
    pub ambient: Vec3,
    /// The single directional light.
    pub directional: DirectionalLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            directional: DirectionalLight {
                direction: Vec3::new(0.0, 0.707, -0.707),
                diffuse: Vec3::new(0.78, 0.88, 1.0),
                specular: Vec3::splat(0.8),
            },
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Tick the frame was produced on.
    pub tick: u64,
    /// Active scene.
    pub scene: Scene,
    /// Meshes in directory order.
    pub drawables: Vec<Drawable>,
    /// Viewpoint.
    pub camera: Camera,
    /// Lights.
    pub lighting: Lighting,
}

/// Draw submission.
pub trait Renderer: std::fmt::Debug {
    /// Draw one frame.
    fn render(&mut self, frame: &RenderFrame);

    /// Release GPU-side resources.
    fn shutdown(&mut self) {}

    /// Support downcasting to the concrete renderer.
    fn as_any(&self) -> &dyn Any;
}

/// Draws nothing.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &RenderFrame) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Keeps the most recent frame and counts the rest.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: u64,
    last: Option<RenderFrame>,
    shut_down: bool,
}

impl RecordingRenderer {
    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The latest frame.
    pub fn last(&self) -> Option<&RenderFrame> {
        self.last.as_ref()
    }

    /// Whether [`Renderer::shutdown`] was called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        self.frames += 1;
        self.last = Some(frame.clone());
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Keyboard polling.
pub trait InputSystem: std::fmt::Debug {
    /// Snapshot of the keys held right now.
    fn poll_keys(&mut self) -> KeyState;

    /// Whether the platform asked the game to close.
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Replays a fixed sequence of key snapshots, one per poll.
///
/// Once the script runs out every poll is empty and, unless
/// [`ScriptedInput::keep_open`] was called, the input asks the game to quit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<KeyState>,
    polled: usize,
    keep_open: bool,
}

impl ScriptedInput {
    /// Script from explicit snapshots.
    pub fn new(frames: impl IntoIterator<Item = KeyState>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse a script where each symbol is one frame.
    ///
    /// Symbols are those of [`Key::from_symbol`], `.` is an idle frame,
    /// `[..]` holds several keys in one frame, and whitespace is ignored.
    pub fn parse(script: &str) -> EngineResult<Self> {
        let mut frames = Vec::new();
        let mut group: Option<KeyState> = None;

        for (position, symbol) in script.chars().enumerate() {
            match symbol {
                c if c.is_whitespace() => {}
                '[' if group.is_none() => group = Some(KeyState::empty()),
                ']' if group.is_some() => {
                    if let Some(keys) = group.take() {
                        frames.push(keys);
                    }
                }
                '.' if group.is_none() => frames.push(KeyState::empty()),
                c => {
                    let key = Key::from_symbol(c)
                        .ok_or(EngineError::InputScript { symbol: c, position })?;
                    match group.as_mut() {
                        Some(keys) => keys.press(key),
                        None => frames.push(KeyState::empty().with(key)),
                    }
                }
            }
        }
        if group.is_some() {
            return Err(EngineError::InputScript {
                symbol: '[',
                position: script.chars().count(),
            });
        }
        Ok(Self::new(frames))
    }

    /// Do not request quit when the script is exhausted.
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }

    /// Append frames.
    pub fn extend(&mut self, frames: impl IntoIterator<Item = KeyState>) {
        self.frames.extend(frames);
    }

    /// Frames not yet polled.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Frames polled so far, including empty polls past the end.
    pub fn polled(&self) -> usize {
        self.polled
    }
}

impl InputSystem for ScriptedInput {
    fn poll_keys(&mut self) -> KeyState {
        self.polled += 1;
        self.frames.pop_front().unwrap_or_default()
    }

    fn quit_requested(&self) -> bool {
        !self.keep_open && self.frames.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Fire-and-forget audio events.
pub trait AudioEngine: std::fmt::Debug {
    /// Start the event `id`.
    fn play_event(&mut self, id: &str);

    /// Support downcasting to the concrete engine.
    fn as_any(&self) -> &dyn Any;
}

/// Plays nothing.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioEngine for SilentAudio {
    fn play_event(&mut self, _id: &str) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Remembers every event id it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    played: Vec<String>,
}

impl RecordingAudio {
    /// Event ids in play order.
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioEngine for RecordingAudio {
    fn play_event(&mut self, id: &str) {
        self.played.push(id.to_string());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_parses_frames_groups_and_idles() {
        let mut input = ScriptedInput::parse("R . [Dh] q").unwrap();
        assert_eq!(input.remaining(), 4);
        assert!(input.poll_keys().is_pressed(Key::Right));
        assert!(input.poll_keys().is_empty());
        let held = input.poll_keys();
        assert!(held.is_pressed(Key::Down) && held.is_pressed(Key::HeavyAttack));
        assert!(!input.quit_requested());
        assert!(input.poll_keys().is_pressed(Key::Escape));
        assert!(input.quit_requested());
        assert!(input.poll_keys().is_empty());
        assert_eq!(input.polled(), 5);
    }

    #[test]
    fn script_errors_point_at_the_symbol() {
        let err = ScriptedInput::parse("RRz").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InputScript {
                symbol: 'z',
                position: 2
            }
        ));
        assert!(ScriptedInput::parse("[UR").is_err());
        assert!(ScriptedInput::parse("[U[R]]").is_err());
    }

    #[test]
    fn keep_open_never_requests_quit() {
        let input = ScriptedInput::default().keep_open();
        assert!(!input.quit_requested());
    }

    #[test]
    fn recorders_keep_what_they_saw() {
        let mut audio = RecordingAudio::default();
        audio.play_event("fight_start");
        assert_eq!(audio.played(), &["fight_start".to_string()]);

        let mut renderer = RecordingRenderer::default();
        let frame = RenderFrame {
            tick: 3,
            scene: Scene::Maze,
            drawables: Vec::new(),
            camera: Camera::default(),
            lighting: Lighting::default(),
        };
        renderer.render(&frame);
        renderer.render(&frame);
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.last().map(|f| f.tick), Some(3));
    }

    #[test]
    fn degenerate_camera_falls_back_to_identity() {
        let camera = Camera::look_at(Vec3::ONE, Vec3::ONE);
        assert_eq!(camera.view, Mat4::IDENTITY);
    }
}
