use std::path::Path;
use std::time::Duration;

use bones_mechanics::CombatStats;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Smallest maze side that still leaves room for an entry and a stair.
pub const MIN_MAP_SIDE: usize = 5;

/// Largest maze side accepted from a config file.
pub const MAX_MAP_SIDE: usize = 1025;

/// Configuration for a game run.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum wall time between frames, in milliseconds.
    pub min_frame_ms: u64,
    /// Upper bound on the delta handed to the simulation, in seconds.
    pub max_delta_secs: f32,
    /// RNG seed for maze layout and enemy decisions.
    pub seed: u64,
    /// Maze height in cells.
    pub map_rows: usize,
    /// Maze width in cells.
    pub map_cols: usize,
    /// Enemies placed on each regular level.
    pub enemies_per_level: usize,
    /// Number of levels. The last one guards its exit with a boss.
    pub levels: u32,
    /// Edge length of a grid cell in world units.
    pub cell_size: f32,
    /// Displacement of one player move.
    pub move_step: f32,
    /// Player stats at the start of the run.
    pub player: CombatStats,
    /// Stats for regular enemies.
    pub enemy: CombatStats,
    /// Stats for the final boss.
    pub boss: CombatStats,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_frame_ms: 16,
            max_delta_secs: 0.05,
            seed: 42,
            map_rows: 11,
            map_cols: 11,
            enemies_per_level: 2,
            levels: 3,
            cell_size: 100.0,
            move_step: 100.0,
            player: CombatStats::new("Knight", 30, 7, 2),
            enemy: CombatStats::new("Skeleton", 12, 5, 1),
            boss: CombatStats::new("Bone Lord", 40, 8, 3),
            max_events: 0,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the game loop cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.map_rows < MIN_MAP_SIDE || self.map_cols < MIN_MAP_SIDE {
            return Err(EngineError::InvalidConfig(format!(
                "map must be at least {MIN_MAP_SIDE}x{MIN_MAP_SIDE}, got {}x{}",
                self.map_rows, self.map_cols
            )));
        }
        if self.map_rows > MAX_MAP_SIDE || self.map_cols > MAX_MAP_SIDE {
            return Err(EngineError::InvalidConfig(format!(
                "map must be at most {MAX_MAP_SIDE}x{MAX_MAP_SIDE}, got {}x{}",
                self.map_rows, self.map_cols
            )));
        }
        if self.levels == 0 {
            return Err(EngineError::InvalidConfig("levels must be at least 1".into()));
        }
        if self.cell_size <= 0.0 || self.move_step <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "cell_size and move_step must be positive".into(),
            ));
        }
        if self.max_delta_secs <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "max_delta_secs must be positive".into(),
            ));
        }
        if self.min_frame().as_secs_f32() > self.max_delta_secs {
            return Err(EngineError::InvalidConfig(format!(
                "min_frame_ms ({}) exceeds max_delta_secs ({}s)",
                self.min_frame_ms, self.max_delta_secs
            )));
        }
        for stats in [&self.player, &self.enemy, &self.boss] {
            if stats.max_health <= 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} needs positive max_health",
                    stats.name
                )));
            }
        }
        Ok(())
    }

    /// Minimum frame interval as a [`Duration`].
    pub fn min_frame(&self) -> Duration {
        Duration::from_millis(self.min_frame_ms)
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maze dimensions.
    pub fn with_map_size(mut self, rows: usize, cols: usize) -> Self {
        self.map_rows = rows;
        self.map_cols = cols;
        self
    }

    /// Set the number of enemies per regular level.
    pub fn with_enemies_per_level(mut self, enemies: usize) -> Self {
        self.enemies_per_level = enemies;
        self
    }

    /// Set the number of levels.
    pub fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    /// Set the frame pacing: minimum interval and delta clamp.
    pub fn with_frame_limits(mut self, min_frame_ms: u64, max_delta_secs: f32) -> Self {
        self.min_frame_ms = min_frame_ms;
        self.max_delta_secs = max_delta_secs;
        self
    }

    /// Set the player stats.
    pub fn with_player(mut self, stats: CombatStats) -> Self {
        self.player = stats;
        self
    }

    /// Set the regular enemy stats.
    pub fn with_enemy(mut self, stats: CombatStats) -> Self {
        self.enemy = stats;
        self
    }

    /// Set the boss stats.
    pub fn with_boss(mut self, stats: CombatStats) -> Self {
        self.boss = stats;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn config_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.min_frame(), Duration::from_millis(16));
        assert!((config.max_delta_secs - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.seed, 42);
        assert_eq!((config.map_rows, config.map_cols), (11, 11));
        assert_eq!(config.levels, 3);
        assert_eq!(config.max_events, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = EngineConfig::default()
            .with_seed(7)
            .with_map_size(9, 13)
            .with_enemies_per_level(4)
            .with_levels(1)
            .with_max_events(100);
        assert_eq!(config.seed, 7);
        assert_eq!((config.map_rows, config.map_cols), (9, 13));
        assert_eq!(config.enemies_per_level, 4);
        assert_eq!(config.levels, 1);
        assert_eq!(config.max_events, 100);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 99
            levels = 2

            [boss]
            name = "Lich"
            max_health = 50
            attack = 9
            defense = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.levels, 2);
        assert_eq!(config.map_rows, 11);
        assert_eq!(config.boss.name, "Lich");
        assert_eq!(config.boss.max_health, 50);
        assert_eq!(config.player, EngineConfig::default().player);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_toml_str("levels = 0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_toml_str("cell_size = -1.0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_toml_str("map_rows = 3").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_toml_str("map_cols = 100000").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_toml_str("seed = \"x\"").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn frame_floor_above_delta_clamp_is_rejected() {
        let config = EngineConfig::default().with_frame_limits(60, 0.05);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(EngineConfig::default().with_frame_limits(50, 0.05).validate().is_ok());
        assert!(EngineConfig::from_toml_str("min_frame_ms = 100").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "map_rows = 7\nmap_cols = 9").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!((config.map_rows, config.map_cols), (7, 9));

        let missing = EngineConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(EngineError::ConfigIo { .. })));
    }
}
