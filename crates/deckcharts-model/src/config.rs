use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Palette, ShadeConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid style config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("shade factor `{name}` must be within [0, 1], got {value}")]
    ShadeFactor { name: &'static str, value: f64 },
}

/// Styling knobs that may be overridden per deployment.
///
/// ```json
/// { "palette": ["1F3864", "2E75B6"], "shade": { "darkenStep": 0.2 } }
/// ```
///
/// Omitted fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub palette: Palette,
    pub shade: ShadeConfig,
}

impl StyleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StyleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        self.shade.validate()
    }
}
