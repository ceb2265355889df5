// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use super::error::ConfigError;

/// Prefix for all environment settings, e.g. VIBE_HAPTIC_DEBUG.
const ENV_PREFIX: &str = "VIBE_HAPTIC";

/// The debug log lives in the home directory unless overridden.
const DEBUG_LOG_FILE_NAME: &str = ".vibe-haptic-debug.log";

/// The default length of one pause unit.
pub const DEFAULT_PAUSE_MS: u64 = 100;

fn default_pause_ms() -> u64 {
    DEFAULT_PAUSE_MS
}

/// Process-level settings taken from the environment.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Write debug logs to the debug log file.
    #[serde(default)]
    debug: bool,

    /// Overrides the debug log location.
    log_file: Option<PathBuf>,

    /// The length of one pause unit in milliseconds.
    #[serde(default = "default_pause_ms")]
    pause_ms: u64,

    /// The actuator to use. Names starting with "mock" select the mock device.
    device: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            log_file: None,
            pause_ms: DEFAULT_PAUSE_MS,
            device: None,
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: Environment) -> Result<Settings, ConfigError> {
        Ok(Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// Replaces the configured actuator name, if a new one is given.
    pub fn with_device(mut self, device: Option<String>) -> Settings {
        if device.is_some() {
            self.device = device;
        }
        self
    }

    /// Whether debug logging to a file is on.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The debug log file, if one can be located.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(DEBUG_LOG_FILE_NAME)))
    }

    /// The length of one pause unit.
    pub fn pause_unit(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// The configured actuator name.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }
}
