//! Storyteller configuration, loaded from TOML.
//!
//! ```toml
//! transcript_path = "transcript.json"
//!
//! [presenter]
//! max_choices = 3
//!
//! [session]
//! max_history = 30
//!
//! [discovery]
//! items = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tale_state::DiscoveryRules;
use thiserror::Error;

use crate::presenter::PresenterConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Session loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Transcript entries kept, not counting the opening.
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_history: 30 }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthtaleConfig {
    pub presenter: PresenterConfig,
    pub session: SessionConfig,
    pub discovery: DiscoveryRules,
    /// Where to write the transcript when the session ends.
    pub transcript_path: Option<PathBuf>,
}

impl HearthtaleConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
