//! # Engine Configuration
//!
//! Tournament-format knobs shared by every computation: points per result,
//! group size and how many third-placed teams qualify.
//!
//! ```rust
//! use wc_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.points.win, 3);
//! assert_eq!(config.qualifying_third_places, 8);
//! ```

mod env;

pub use env::{load_config_file, CONFIG_PATH_ENV};

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self { win: 3, draw: 1, loss: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub points: PointsConfig,
    /// Rows per group table; missing teams are padded as empty rows.
    pub group_size: usize,
    /// Size of the third-place pool that enters the knockout stage.
    pub qualifying_third_places: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::fifa()
    }
}

impl EngineConfig {
    /// 12 groups of 4, 3/1/0 points, best 8 thirds qualify.
    pub fn fifa() -> Self {
        Self { points: PointsConfig::default(), group_size: 4, qualifying_third_places: 8 }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.group_size < 3 {
            return Err(ConfigurationError::InvalidConfig(format!(
                "group_size must be at least 3 to have a third place, got {}",
                self.group_size
            )));
        }
        if self.points.win <= self.points.draw || self.points.draw < self.points.loss {
            return Err(ConfigurationError::InvalidConfig(format!(
                "points must satisfy win > draw >= loss, got {}/{}/{}",
                self.points.win, self.points.draw, self.points.loss
            )));
        }
        if self.qualifying_third_places == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "qualifying_third_places must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Config named by `WC_ENGINE_CONFIG_PATH`, or the default when unset.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        env::config_from_env()
    }
}
