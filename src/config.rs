//! Configuration for a terminal session

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_TAB_WIDTH;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Initial number of columns
    pub cols: usize,
    /// Initial number of rows
    pub rows: usize,
    /// Maximum history lines (0 disables history)
    pub history_capacity: usize,
    /// Spacing of the initial tab stops
    pub tab_width: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            history_capacity: 10000,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

impl TerminalConfig {
    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TerminalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "dimensions must be at least 1x1, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
