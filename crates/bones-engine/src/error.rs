use std::path::PathBuf;

use bones_core::CoreError;
use bones_mechanics::CombatError;

use crate::assets::AssetKind;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised outside the per-tick simulation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Map(#[from] CoreError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("unknown input symbol {symbol:?} at position {position}")]
    InputScript { symbol: char, position: usize },

    #[error("failed to load {kind} '{name}': {reason}")]
    AssetLoad {
        kind: AssetKind,
        name: String,
        reason: String,
    },

    #[error("game has not been initialized")]
    NotInitialized,
}
