pub mod fight;
pub mod map;
pub mod run;

use std::path::Path;

use bones_engine::EngineConfig;

/// Load the config at `path`, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    match path {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string()),
        None => Ok(EngineConfig::default()),
    }
}
