//! The game loop.
//!
//! Each iteration polls input, advances the simulation by one paced tick and
//! submits a frame. A cleared running flag ends the loop once the current
//! iteration has finished; nothing is interrupted mid-tick.

use std::fmt;

use bones_core::{
    Actor, ActorDirectory, ActorId, ActorState, Cell, GridMap, Key, KeyState, MeshComponent,
    MoveComponent, Signal, Subsystems, maze,
};
use bones_mechanics::{ActionKind, CombatRound, CombatStats, Side};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::{AssetCache, AssetStore, CatalogLoader};
use crate::camera::FollowCamera;
use crate::clock::{FrameClock, TimeSource, WallClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::{EventLog, GameEvent, GameEventKind};
use crate::services::{
    AudioEngine, Camera, Drawable, InputSystem, Lighting, NullRenderer, RenderFrame, Renderer,
    ScriptedInput, SilentAudio,
};

/// Where the player is parked while a fight is on screen.
pub const ARENA_POSITION: Vec3 = Vec3::new(0.0, 0.0, -1000.0);

/// Audio event ids the game fires.
pub mod sounds {
    /// A fight begins.
    pub const FIGHT_START: &str = "fight_start";
    /// The player won a fight.
    pub const VICTORY: &str = "victory";
    /// The player lost.
    pub const DEFEAT: &str = "defeat";
    /// A new level was entered.
    pub const STAIRS: &str = "stairs";
    /// The player walked into a wall.
    pub const BUMP: &str = "bump";
}

/// Whether the simulation advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Normal play.
    Gameplay,
    /// Input and updates are suspended until unpaused.
    Paused,
    /// The player asked to leave.
    Quit,
}

/// What the player is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Walking the maze.
    Maze,
    /// Fighting a regular enemy.
    EnemyFight,
    /// Fighting the final boss.
    BossFight,
    /// The run is over.
    EndGame {
        /// Whether the boss was beaten.
        victory: bool,
    },
}

impl Scene {
    /// Whether a combat round is in progress.
    pub fn is_fight(self) -> bool {
        matches!(self, Self::EnemyFight | Self::BossFight)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maze => write!(f, "maze"),
            Self::EnemyFight => write!(f, "enemy fight"),
            Self::BossFight => write!(f, "boss fight"),
            Self::EndGame { victory: true } => write!(f, "victory"),
            Self::EndGame { victory: false } => write!(f, "defeat"),
        }
    }
}

/// An enemy standing on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encounter {
    /// The enemy actor.
    pub actor: ActorId,
    /// Its cell.
    pub cell: Cell,
    /// Whether it is the final boss.
    pub boss: bool,
}

#[derive(Debug, Clone, Copy)]
struct Fight {
    encounter: Encounter,
    saved_position: Vec3,
}

/// Owns the actors, the map, the combat resolver and the collaborators, and
/// drives them through input, update and output once per tick.
pub struct Game {
    config: EngineConfig,
    clock: FrameClock,
    directory: ActorDirectory,
    systems: Subsystems,
    rng: StdRng,
    events: EventLog,
    renderer: Box<dyn Renderer>,
    input: Box<dyn InputSystem>,
    audio: Box<dyn AudioEngine>,
    assets: Box<dyn AssetStore>,
    fixed_maps: Vec<GridMap>,
    state: GameState,
    scene: Scene,
    level: u32,
    tick: u64,
    running: bool,
    initialized: bool,
    player: Option<ActorId>,
    camera: Option<ActorId>,
    encounters: Vec<Encounter>,
    fight: Option<Fight>,
    queued_action: Option<ActionKind>,
    last_keys: KeyState,
    fights_won: u32,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("tick", &self.tick)
            .field("level", &self.level)
            .field("scene", &self.scene)
            .field("state", &self.state)
            .field("actors", &self.directory.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Game {
    /// A game with inert collaborators and a wall-clock frame pacer.
    pub fn new(config: EngineConfig) -> Self {
        let clock = FrameClock::new(
            Box::new(WallClock::new()),
            config.min_frame(),
            config.max_delta_secs,
        );
        let combat = CombatRound::new(
            config.player.clone().restored(),
            config.enemy.clone().restored(),
        );
        Self {
            clock,
            directory: ActorDirectory::new(),
            systems: Subsystems::new(GridMap::new(0, 0), combat),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            renderer: Box::new(NullRenderer),
            input: Box::new(ScriptedInput::default()),
            audio: Box::new(SilentAudio),
            assets: Box::new(AssetCache::new(CatalogLoader::accept_all())),
            fixed_maps: Vec::new(),
            state: GameState::Gameplay,
            scene: Scene::Maze,
            level: 0,
            tick: 0,
            running: false,
            initialized: false,
            player: None,
            camera: None,
            encounters: Vec::new(),
            fight: None,
            queued_action: None,
            last_keys: KeyState::empty(),
            fights_won: 0,
            config,
        }
    }

    /// Builder: draw through `renderer`.
    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Builder: poll keys from `input`.
    pub fn with_input<I: InputSystem + 'static>(mut self, input: I) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Builder: play sounds through `audio`.
    pub fn with_audio<A: AudioEngine + 'static>(mut self, audio: A) -> Self {
        self.audio = Box::new(audio);
        self
    }

    /// Builder: look assets up in `assets`.
    pub fn with_assets<S: AssetStore + 'static>(mut self, assets: S) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// Builder: pace frames against `source`.
    pub fn with_time_source<T: TimeSource + 'static>(mut self, source: T) -> Self {
        self.clock = FrameClock::new(
            Box::new(source),
            self.config.min_frame(),
            self.config.max_delta_secs,
        );
        self
    }

    /// Builder: use these layouts for the first levels instead of generating
    /// mazes. Levels past the end of the list are generated.
    pub fn with_maps(mut self, maps: impl IntoIterator<Item = GridMap>) -> Self {
        self.fixed_maps = maps.into_iter().collect();
        self
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Validate the config, spawn the player and camera, and load level 1.
    /// Calling it again is a no-op.
    pub fn initialize(&mut self) -> EngineResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.config.validate()?;

        let player = self.spawn_player();
        let camera = self.spawn(
            "camera",
            Actor::new("camera").with_behavior(FollowCamera::new(Some(player))),
        );
        self.player = Some(player);
        self.camera = Some(camera);

        self.load_level(1)?;
        self.clock.reset();
        self.state = GameState::Gameplay;
        self.running = true;
        self.initialized = true;
        tracing::info!(levels = self.config.levels, seed = self.config.seed, "game initialized");
        Ok(())
    }

    /// Run until the running flag clears.
    pub fn run_loop(&mut self) -> EngineResult<()> {
        self.initialize()?;
        while self.running {
            self.process_input();
            self.update_game()?;
            self.generate_output();
        }
        Ok(())
    }

    /// Run at most `n` iterations. Returns how many ran.
    pub fn run_ticks(&mut self, n: u64) -> EngineResult<u64> {
        self.initialize()?;
        let mut ran = 0;
        while ran < n && self.running {
            self.process_input();
            self.update_game()?;
            self.generate_output();
            ran += 1;
        }
        Ok(ran)
    }

    /// Destroy every actor and release collaborator resources.
    pub fn shutdown(&mut self) {
        self.directory.clear();
        self.encounters.clear();
        self.fight = None;
        self.player = None;
        self.camera = None;
        self.assets.unload();
        self.renderer.shutdown();
        self.running = false;
        self.initialized = false;
        tracing::info!(ticks = self.tick, "game shut down");
    }

    // -----------------------------------------------------------------------
    // Loop phases
    // -----------------------------------------------------------------------

    /// Poll the keyboard and route the snapshot.
    ///
    /// Escape or a platform quit request clears the running flag; the rest
    /// of the iteration still runs. `P` toggles pause on its press edge.
    /// In the maze keys go to the actors; in a fight the first newly
    /// pressed action key is queued for the player's turn.
    pub fn process_input(&mut self) {
        let keys = self.input.poll_keys();
        let fresh: KeyState = keys
            .pressed()
            .filter(|k| !self.last_keys.is_pressed(*k))
            .collect();
        self.last_keys = keys;

        if self.input.quit_requested() {
            self.running = false;
        }
        if keys.is_pressed(Key::Escape) {
            self.running = false;
            self.set_state(GameState::Quit);
            return;
        }
        if fresh.is_pressed(Key::Pause) {
            match self.state {
                GameState::Gameplay => self.set_state(GameState::Paused),
                GameState::Paused => self.set_state(GameState::Gameplay),
                GameState::Quit => {}
            }
        }
        if self.state != GameState::Gameplay {
            return;
        }

        match self.scene {
            Scene::Maze => self.directory.process_input(&keys),
            Scene::EnemyFight | Scene::BossFight => {
                if self.queued_action.is_none() {
                    self.queued_action = fresh.pressed().find_map(action_for_key);
                }
            }
            Scene::EndGame { .. } => {}
        }
    }

    /// Wait for the next frame and advance the simulation by one tick.
    pub fn update_game(&mut self) -> EngineResult<()> {
        let dt = self.clock.tick();
        self.tick += 1;
        if self.state != GameState::Gameplay {
            return Ok(());
        }

        if self.scene.is_fight() {
            self.advance_fight()?;
        }

        let report = self.directory.update_actors(dt, &mut self.systems, self.tick);
        for id in report.removed.iter().chain(&report.destroyed) {
            self.record(GameEventKind::Destroyed { actor: *id }, format!("{id} destroyed"));
        }

        for signal in self.systems.drain_signals() {
            self.handle_signal(signal)?;
        }
        Ok(())
    }

    /// Build this tick's frame and hand it to the renderer.
    ///
    /// Actors marked dead but not yet reaped, such as the previous level's
    /// after a stair transition, are left out.
    pub fn generate_output(&mut self) {
        let drawables = self
            .directory
            .iter()
            .filter(|(_, actor)| actor.state() != ActorState::Dead)
            .filter_map(|(id, actor)| {
                let mesh = actor.component::<MeshComponent>()?;
                if !mesh.is_drawable() {
                    return None;
                }
                Some(Drawable {
                    actor: id,
                    mesh: mesh.mesh()?,
                    texture: mesh.texture(),
                    world: mesh.world(),
                })
            })
            .collect();

        let eye = self.camera.and_then(|id| self.directory.get(id));
        let target = self.player.and_then(|id| self.directory.get(id));
        let camera = match (eye, target) {
            (Some(eye), Some(target)) => Camera::look_at(eye.position(), target.position()),
            _ => Camera::default(),
        };

        let frame = RenderFrame {
            tick: self.tick,
            scene: self.scene,
            drawables,
            camera,
            lighting: Lighting::default(),
        };
        self.renderer.render(&frame);
    }

    // -----------------------------------------------------------------------
    // Levels
    // -----------------------------------------------------------------------

    fn build_map(&mut self, level: u32) -> EngineResult<GridMap> {
        let map = match self.fixed_maps.get((level as usize).saturating_sub(1)) {
            Some(map) => map.clone(),
            None => maze::generate(
                self.config.map_rows,
                self.config.map_cols,
                self.config.enemies_per_level,
                &mut self.rng,
            )?,
        };
        Ok(map.with_cell_size(self.config.cell_size))
    }

    /// Replace the current level with level `level`.
    ///
    /// Everything except the player and camera is marked dead and reaped by
    /// the next update pass. Fails with [`EngineError::NotInitialized`]
    /// before the player exists.
    pub fn load_level(&mut self, level: u32) -> EngineResult<()> {
        if self.player.is_none() {
            return Err(EngineError::NotInitialized);
        }
        let keep = [self.player, self.camera];
        let doomed: Vec<ActorId> = self
            .directory
            .live_ids()
            .iter()
            .copied()
            .chain(self.directory.pending_ids())
            .filter(|id| !keep.contains(&Some(*id)))
            .collect();
        for id in doomed {
            self.directory.set_state(id, ActorState::Dead);
        }
        self.encounters.clear();

        let mut map = self.build_map(level)?;
        let final_level = level >= self.config.levels;
        let start = map
            .start()
            .ok_or_else(|| EngineError::InvalidConfig(format!("level {level} has no start")))?;
        map.set_player_map_pos(start.row, start.col);

        for cell in map.enemies().to_vec() {
            self.spawn_enemy(cell, false, &map);
        }
        match (map.stair(), final_level) {
            (Some(stair), true) => {
                map.set_enemy_map_pos(stair.row, stair.col);
                self.spawn_enemy(stair, true, &map);
            }
            (Some(stair), false) => {
                let mesh = self.assets.get_mesh("stair.gpmesh");
                let texture = self.assets.get_texture("stair.png");
                self.spawn(
                    "stair",
                    Actor::new("stair")
                        .at(map.position_of(stair))
                        .with_component(MeshComponent::new(mesh, texture)),
                );
            }
            (None, _) => {
                return Err(EngineError::InvalidConfig(format!(
                    "level {level} has no stair"
                )));
            }
        }

        if let Some(player) = self.player.and_then(|id| self.directory.get_mut(id)) {
            player.set_position(map.position_of(start));
            player.set_state(ActorState::Active);
            player.compute_world_transform();
        }
        self.systems.combat.player_mut().restore();
        self.systems.map = map;
        self.level = level;
        self.set_scene(Scene::Maze);

        self.record(
            GameEventKind::LevelChanged { level },
            format!("entered level {level}"),
        );
        self.audio.play_event(sounds::STAIRS);
        tracing::info!(level, enemies = self.encounters.len(), final_level, "level loaded");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    fn spawn(&mut self, name: &str, actor: Actor) -> ActorId {
        let id = self.directory.add_actor(actor);
        self.record(
            GameEventKind::Spawned {
                actor: id,
                name: name.to_string(),
            },
            format!("{name} spawned as {id}"),
        );
        id
    }

    fn spawn_player(&mut self) -> ActorId {
        let mesh = self.assets.get_mesh("knight.gpmesh");
        let texture = self.assets.get_texture("knight.png");
        self.spawn(
            "player",
            Actor::new("player")
                .with_component(MoveComponent::new().with_bindings(self.config.move_step))
                .with_component(MeshComponent::new(mesh, texture)),
        )
    }

    fn spawn_enemy(&mut self, cell: Cell, boss: bool, map: &GridMap) {
        let (name, mesh, texture) = if boss {
            ("boss", "boss.gpmesh", "boss.png")
        } else {
            ("enemy", "skeleton.gpmesh", "skeleton.png")
        };
        let mesh = self.assets.get_mesh(mesh);
        let texture = self.assets.get_texture(texture);
        let actor = self.spawn(
            name,
            Actor::new(name)
                .at(map.position_of(cell))
                .with_component(MeshComponent::new(mesh, texture)),
        );
        self.encounters.push(Encounter { actor, cell, boss });
    }

    // -----------------------------------------------------------------------
    // Signals and fights
    // -----------------------------------------------------------------------

    fn handle_signal(&mut self, signal: Signal) -> EngineResult<()> {
        match signal {
            Signal::Moved { actor, cell } => {
                if Some(actor) != self.player || self.scene != Scene::Maze {
                    return Ok(());
                }
                self.systems.map.set_player_map_pos(cell.row, cell.col);
                if let Some(encounter) = self.encounters.iter().find(|e| e.cell == cell).copied() {
                    self.start_fight(encounter);
                } else if self.systems.map.is_stair(cell) && self.level < self.config.levels {
                    self.load_level(self.level + 1)?;
                }
            }
            Signal::MoveBlocked { actor, cell } => {
                self.record(
                    GameEventKind::MoveBlocked { actor, cell },
                    format!("{actor} blocked at {cell}"),
                );
                if Some(actor) == self.player {
                    self.audio.play_event(sounds::BUMP);
                }
            }
            Signal::PlaySound(id) => self.audio.play_event(&id),
        }
        Ok(())
    }

    fn start_fight(&mut self, encounter: Encounter) {
        let stats = if encounter.boss {
            &self.config.boss
        } else {
            &self.config.enemy
        };
        self.systems.combat.reset(stats.clone().restored());
        self.queued_action = None;

        let mut saved_position = ARENA_POSITION;
        if let Some(player) = self.player.and_then(|id| self.directory.get_mut(id)) {
            saved_position = player.position();
            if let Some(mover) = player.component_mut::<MoveComponent>() {
                mover.set_horizontal_move(0.0);
                mover.set_vertical_move(0.0);
            }
            player.set_position(ARENA_POSITION);
            player.set_state(ActorState::Paused);
        }
        self.fight = Some(Fight {
            encounter,
            saved_position,
        });

        self.set_scene(if encounter.boss {
            Scene::BossFight
        } else {
            Scene::EnemyFight
        });
        self.record(
            GameEventKind::FightStarted {
                enemy: encounter.actor,
                boss: encounter.boss,
            },
            format!("fight against {} at {}", self.systems.combat.enemy().name, encounter.cell),
        );
        self.audio.play_event(sounds::FIGHT_START);
    }

    /// Play the queued player action, answer with the enemy, and settle the
    /// fight once the round resolves.
    fn advance_fight(&mut self) -> EngineResult<()> {
        if self.fight.is_none() {
            return Ok(());
        }
        if self.systems.combat.active_side() == Some(Side::Player) {
            let Some(action) = self.queued_action.take() else {
                return Ok(());
            };
            self.systems.combat.act(action)?;
        }
        if self.systems.combat.active_side() == Some(Side::Enemy) {
            let action = choose_enemy_action(&mut self.rng, self.systems.combat.enemy());
            self.systems.combat.act(action)?;
        }
        if let Some(winner) = self.systems.combat.winner() {
            self.finish_fight(winner);
        }
        Ok(())
    }

    fn finish_fight(&mut self, winner: Side) {
        let Some(Fight {
            encounter,
            saved_position,
        }) = self.fight.take()
        else {
            return;
        };
        self.record(
            GameEventKind::FightResolved {
                enemy: encounter.actor,
                winner,
                rounds: self.systems.combat.round(),
            },
            format!("{winner} won after {} rounds", self.systems.combat.round()),
        );

        if winner == Side::Enemy {
            self.audio.play_event(sounds::DEFEAT);
            self.set_scene(Scene::EndGame { victory: false });
            return;
        }

        self.fights_won += 1;
        self.directory.set_state(encounter.actor, ActorState::Dead);
        self.systems.map.remove_enemy(encounter.cell);
        self.encounters.retain(|e| e.actor != encounter.actor);
        self.audio.play_event(sounds::VICTORY);

        if encounter.boss {
            self.set_scene(Scene::EndGame { victory: true });
            return;
        }
        if let Some(player) = self.player.and_then(|id| self.directory.get_mut(id)) {
            player.set_position(saved_position);
            player.set_state(ActorState::Active);
        }
        self.set_scene(Scene::Maze);
    }

    fn set_scene(&mut self, scene: Scene) {
        if scene == self.scene {
            return;
        }
        let from = std::mem::replace(&mut self.scene, scene);
        tracing::info!(%from, to = %scene, "scene changed");
        self.record(
            GameEventKind::SceneChanged { from, to: scene },
            format!("{from} -> {scene}"),
        );
    }

    fn record(&mut self, kind: GameEventKind, description: impl Into<String>) {
        self.events.push(GameEvent::new(self.tick, kind, description));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Change the run state.
    pub fn set_state(&mut self, state: GameState) {
        if state != self.state {
            tracing::info!(?state, "game state changed");
            self.state = state;
        }
    }

    /// Current run state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Current scene.
    pub fn scene(&self) -> Scene {
        self.scene
    }

    /// Current 1-based level, 0 before initialization.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the loop will run another iteration.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Clear the running flag. The current iteration still completes.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether [`Game::initialize`] has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every actor.
    pub fn directory(&self) -> &ActorDirectory {
        &self.directory
    }

    /// The current level's grid.
    pub fn map(&self) -> &GridMap {
        &self.systems.map
    }

    /// The current or most recent combat round.
    pub fn combat(&self) -> &CombatRound {
        &self.systems.combat
    }

    /// Player stats as carried between fights.
    pub fn player_stats(&self) -> &CombatStats {
        self.systems.combat.player()
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The player actor.
    pub fn player(&self) -> Option<ActorId> {
        self.player
    }

    /// The camera actor.
    pub fn camera(&self) -> Option<ActorId> {
        self.camera
    }

    /// Enemies still standing on this level.
    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    /// Fights the player has won.
    pub fn fights_won(&self) -> u32 {
        self.fights_won
    }

    /// The renderer, if it is an `R`.
    pub fn renderer<R: Renderer + 'static>(&self) -> Option<&R> {
        self.renderer.as_any().downcast_ref::<R>()
    }

    /// The audio engine, if it is an `A`.
    pub fn audio<A: AudioEngine + 'static>(&self) -> Option<&A> {
        self.audio.as_any().downcast_ref::<A>()
    }
}

fn action_for_key(key: Key) -> Option<ActionKind> {
    match key {
        Key::Attack => Some(ActionKind::Attack),
        Key::HeavyAttack => Some(ActionKind::HeavyAttack),
        Key::Defend => Some(ActionKind::Defend),
        Key::Heal => Some(ActionKind::Heal),
        _ => None,
    }
}

/// Enemies favour plain attacks, and may heal once below a third of their health.
pub fn choose_enemy_action<R: Rng + ?Sized>(rng: &mut R, enemy: &CombatStats) -> ActionKind {
    const MOVES: [ActionKind; 4] = [
        ActionKind::Attack,
        ActionKind::Attack,
        ActionKind::HeavyAttack,
        ActionKind::Defend,
    ];
    if enemy.health * 3 < enemy.max_health && rng.random_bool(0.5) {
        return ActionKind::Heal;
    }
    MOVES[rng.random_range(0..MOVES.len())]
}
