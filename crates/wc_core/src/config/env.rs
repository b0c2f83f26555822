use super::EngineConfig;
use crate::error::ConfigurationError;
use std::path::Path;
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "WC_ENGINE_CONFIG_PATH";

pub(crate) fn config_from_env() -> Result<EngineConfig, ConfigurationError> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(EngineConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(EngineConfig::default());
    }

    load_config_file(Path::new(path)).map_err(|e| match e {
        ConfigurationError::InvalidConfig(msg) => {
            ConfigurationError::InvalidConfig(format!("{CONFIG_PATH_ENV}='{path}': {msg}"))
        }
        other => other,
    })
}

/// Read, parse and validate an engine config JSON file.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ConfigurationError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = EngineConfig::from_json(&content)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "engine config loaded");
    Ok(config)
}
