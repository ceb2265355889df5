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
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::Settings;

/// The name of the config file in every config location.
const CONFIG_FILE_NAME: &str = "vibe-haptic.json";

/// The agent whose config locations should be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Agent {
    #[default]
    Claude,
    Opencode,
}

impl Agent {
    /// The config file in the user's home directory.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(match self {
            Agent::Claude => home.join(".claude").join(CONFIG_FILE_NAME),
            Agent::Opencode => home.join(".config").join("opencode").join(CONFIG_FILE_NAME),
        })
    }

    /// The config file relative to the current project.
    pub fn local_config_path(&self) -> PathBuf {
        match self {
            Agent::Claude => Path::new(".claude").join(CONFIG_FILE_NAME),
            Agent::Opencode => Path::new(".opencode").join(CONFIG_FILE_NAME),
        }
    }

    /// All config layers for this agent, lowest precedence first.
    pub fn config_paths(&self) -> Vec<PathBuf> {
        self.global_config_path()
            .into_iter()
            .chain(std::iter::once(self.local_config_path()))
            .collect()
    }
}

/// A named beat with an optional default intensity.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PatternDefinition {
    /// The beat string.
    beat: String,
    /// The intensity for taps without an explicit `/value`.
    intensity: Option<f64>,
}

impl PatternDefinition {
    /// Creates a new pattern definition.
    pub fn new(beat: &str, intensity: Option<f64>) -> PatternDefinition {
        PatternDefinition {
            beat: beat.to_string(),
            intensity,
        }
    }

    /// Gets the beat string.
    pub fn beat(&self) -> &str {
        &self.beat
    }

    /// Gets the default intensity, if any.
    pub fn intensity(&self) -> Option<f64> {
        self.intensity
    }
}

/// A user pattern is either a bare beat string or a full definition.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PatternEntry {
    Beat(String),
    Definition(PatternDefinition),
}

/// One config document as it appears on disk. Everything is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct ConfigLayer {
    patterns: Option<HashMap<String, PatternEntry>>,
    events: Option<HashMap<String, String>>,
    intensity: Option<f64>,
}

impl ConfigLayer {
    /// Parses a config document from JSON.
    pub fn parse(content: &str) -> Result<ConfigLayer, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Loads a single config layer. A missing file is not an error, it just yields no layer.
pub fn load_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ConfigLayer::parse(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// The merged haptic configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// User patterns by name.
    patterns: HashMap<String, PatternEntry>,
    /// Pattern names by event key.
    events: HashMap<String, String>,
    /// The global default intensity.
    intensity: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            patterns: HashMap::new(),
            events: HashMap::from([
                ("stop".to_string(), "vibe".to_string()),
                ("prompt".to_string(), "alert".to_string()),
            ]),
            intensity: None,
        }
    }
}

impl Config {
    /// Creates a new config.
    pub fn new(
        patterns: HashMap<String, PatternEntry>,
        events: HashMap<String, String>,
        intensity: Option<f64>,
    ) -> Config {
        Config {
            patterns,
            events,
            intensity,
        }
    }

    /// Loads the config for the given agent, global layer first, then local.
    pub fn load(agent: Agent) -> Config {
        Config::load_from(&agent.config_paths())
    }

    /// Applies each readable layer on top of the defaults in order. Layers that
    /// can't be read or parsed are skipped.
    pub fn load_from(paths: &[PathBuf]) -> Config {
        paths
            .iter()
            .fold(Config::default(), |config, path| match load_layer(path) {
                Ok(Some(layer)) => {
                    info!(path = %path.display(), "Loaded config layer.");
                    config.merge(layer)
                }
                Ok(None) => {
                    debug!(path = %path.display(), "No config layer found.");
                    config
                }
                Err(e) => {
                    warn!(err = %e, "Skipping config layer.");
                    config
                }
            })
    }

    /// Shallow merge: keys in the layer replace keys in this config, one
    /// pattern or event at a time.
    pub fn merge(mut self, layer: ConfigLayer) -> Config {
        if let Some(patterns) = layer.patterns {
            self.patterns.extend(patterns);
        }
        if let Some(events) = layer.events {
            self.events.extend(events);
        }
        if layer.intensity.is_some() {
            self.intensity = layer.intensity;
        }
        self
    }

    /// Gets the user patterns.
    pub fn patterns(&self) -> &HashMap<String, PatternEntry> {
        &self.patterns
    }

    /// Gets the event mappings.
    pub fn events(&self) -> &HashMap<String, String> {
        &self.events
    }

    /// Gets the pattern name mapped to the given event.
    pub fn event_pattern(&self, event_key: &str) -> Option<&str> {
        self.events.get(event_key).map(String::as_str)
    }

    /// Gets the global default intensity.
    pub fn intensity(&self) -> Option<f64> {
        self.intensity
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use tempfile::TempDir;

    use super::*;

    fn write_layer(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn test_default_events() {
        let config = Config::default();
        assert_eq!(config.event_pattern("stop"), Some("vibe"));
        assert_eq!(config.event_pattern("prompt"), Some("alert"));
        assert_eq!(config.event_pattern("idle"), None);
        assert!(config.patterns().is_empty());
        assert_eq!(config.intensity(), None);
    }

    #[test]
    fn test_parse_pattern_shapes() -> Result<(), Box<dyn Error>> {
        let layer = ConfigLayer::parse(
            r#"{
                "patterns": {
                    "quick": "66",
                    "soft": { "beat": "3 3", "intensity": 0.4 },
                    "plain": { "beat": "6" }
                }
            }"#,
        )?;
        let config = Config::default().merge(layer);

        assert_eq!(
            config.patterns().get("quick"),
            Some(&PatternEntry::Beat("66".to_string()))
        );
        assert_eq!(
            config.patterns().get("soft"),
            Some(&PatternEntry::Definition(PatternDefinition::new(
                "3 3",
                Some(0.4)
            )))
        );
        assert_eq!(
            config.patterns().get("plain"),
            Some(&PatternEntry::Definition(PatternDefinition::new("6", None)))
        );
        // Events were not part of the layer, so the defaults remain.
        assert_eq!(config.event_pattern("stop"), Some("vibe"));
        Ok(())
    }

    #[test]
    fn test_merge_is_shallow() -> Result<(), Box<dyn Error>> {
        let global = ConfigLayer::parse(
            r#"{
                "patterns": { "a": "66", "b": { "beat": "44", "intensity": 1.5 } },
                "events": { "stop": "a" },
                "intensity": 0.5
            }"#,
        )?;
        let local = ConfigLayer::parse(
            r#"{
                "patterns": { "b": "33" },
                "events": { "prompt": "b" }
            }"#,
        )?;
        let config = Config::default().merge(global).merge(local);

        assert_eq!(
            config.patterns().get("a"),
            Some(&PatternEntry::Beat("66".to_string()))
        );
        // The whole entry is replaced, including its intensity.
        assert_eq!(
            config.patterns().get("b"),
            Some(&PatternEntry::Beat("33".to_string()))
        );
        assert_eq!(config.event_pattern("stop"), Some("a"));
        assert_eq!(config.event_pattern("prompt"), Some("b"));
        assert_eq!(config.intensity(), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_null_sections_are_empty() -> Result<(), Box<dyn Error>> {
        let layer = ConfigLayer::parse(r#"{ "patterns": null, "events": null }"#)?;
        assert_eq!(layer, ConfigLayer::default());
        Ok(())
    }

    #[test]
    fn test_load_layer_missing_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        assert!(load_layer(&dir.path().join("nope.json"))?.is_none());
        Ok(())
    }

    #[test]
    fn test_load_layer_malformed() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_layer(&dir, "bad.json", "{ not json")?;
        assert!(matches!(
            load_layer(&path),
            Err(ConfigError::Parse { .. })
        ));

        let path = write_layer(&dir, "wrong.json", r#"{ "patterns": { "x": 5 } }"#)?;
        assert!(matches!(
            load_layer(&path),
            Err(ConfigError::Parse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_load_layer_unreadable() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        // A directory can't be read as a file.
        assert!(matches!(
            load_layer(dir.path()),
            Err(ConfigError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_load_from_local_overrides_global() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let global = write_layer(
            &dir,
            "global.json",
            r#"{ "patterns": { "vibe": "66" }, "events": { "stop": "vibe" } }"#,
        )?;
        let local = write_layer(
            &dir,
            "local.json",
            r#"{ "patterns": { "vibe": "33" }, "events": { "idle": "noise" } }"#,
        )?;

        let config = Config::load_from(&[global, local]);
        assert_eq!(
            config.patterns().get("vibe"),
            Some(&PatternEntry::Beat("33".to_string()))
        );
        assert_eq!(config.event_pattern("stop"), Some("vibe"));
        assert_eq!(config.event_pattern("idle"), Some("noise"));
        assert_eq!(config.event_pattern("prompt"), Some("alert"));
        Ok(())
    }

    #[test]
    fn test_load_from_skips_bad_layers() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let global = write_layer(
            &dir,
            "global.json",
            r#"{ "events": { "stop": "dopamine" } }"#,
        )?;
        let local = write_layer(&dir, "local.json", "{ \"events\": ")?;
        let missing = dir.path().join("missing.json");

        let config = Config::load_from(&[global, local, missing]);
        assert_eq!(config.event_pattern("stop"), Some("dopamine"));
        assert_eq!(config.event_pattern("prompt"), Some("alert"));
        Ok(())
    }

    #[test]
    fn test_agent_paths() {
        assert_eq!(
            Agent::Claude.local_config_path(),
            PathBuf::from(".claude/vibe-haptic.json")
        );
        assert_eq!(
            Agent::Opencode.local_config_path(),
            PathBuf::from(".opencode/vibe-haptic.json")
        );
        if let Some(global) = Agent::Opencode.global_config_path() {
            assert!(global.ends_with(".config/opencode/vibe-haptic.json"));
        }
        if let Some(global) = Agent::Claude.global_config_path() {
            assert!(global.ends_with(".claude/vibe-haptic.json"));
        }
        assert_eq!(
            Agent::Claude.config_paths().last(),
            Some(&Agent::Claude.local_config_path())
        );
    }
}
