// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Engine settings, loaded from RON.

use kiln_core::renderer::{ClearSettings, DrawCommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not a valid RON engine config.
    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    /// The settings parse but cannot be used.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Settings of an [`Engine`](crate::Engine) run.
///
/// Every field has a default, so a config file only needs to name what it changes:
///
/// ```ron
/// (
///     frame_limit: Some(600),
///     clear: (flags: "COLOR | DEPTH", color: (r: 0.1, g: 0.1, b: 0.2, a: 1.0), depth: 1.0, stencil: 0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stop after this many frames. `None` runs until the application asks to exit.
    pub frame_limit: Option<u64>,
    /// Arena size of the main command buffer, in bytes.
    pub command_buffer_arena_bytes: usize,
    /// Clear operation of the main command buffer.
    pub clear: ClearSettings,
    /// Frames between two statistics summaries in the log. `0` disables them.
    pub stats_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_limit: None,
            command_buffer_arena_bytes: DrawCommand::ARENA_FOOTPRINT * 1024,
            clear: ClearSettings::default(),
            stats_interval: 300,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            ron::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_buffer_arena_bytes < DrawCommand::ARENA_FOOTPRINT {
            return Err(ConfigError::InvalidValue(format!(
                "command_buffer_arena_bytes is {}, one draw command needs {}",
                self.command_buffer_arena_bytes,
                DrawCommand::ARENA_FOOTPRINT
            )));
        }
        Ok(())
    }
}
