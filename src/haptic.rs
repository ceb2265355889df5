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
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, span, warn, Instrument, Level};

use crate::actuator::{self, Actuator};
use crate::beat::{self, Token};
use crate::config::{Agent, Config, Settings};
use crate::patterns::{self, ResolvedPattern, DEFAULT_INTENSITY};

/// The default length of a single pause unit (one space in a beat).
pub const PAUSE_UNIT: Duration = Duration::from_millis(100);

/// Resolves patterns against a config and plays them on an actuator.
pub struct HapticEngine {
    config: Config,
    actuator: Option<Arc<dyn Actuator>>,
    pause_unit: Duration,
}

impl HapticEngine {
    /// Creates a new engine. Without an actuator every trigger completes immediately.
    pub fn new(config: Config, actuator: Option<Arc<dyn Actuator>>) -> HapticEngine {
        HapticEngine {
            config,
            actuator,
            pause_unit: PAUSE_UNIT,
        }
    }

    /// Sets the length of one pause unit.
    pub fn with_pause_unit(mut self, pause_unit: Duration) -> HapticEngine {
        self.pause_unit = pause_unit;
        self
    }

    /// Gets the config this engine resolves against.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plays the pattern mapped to the given event, if there is one.
    pub async fn trigger_for_event(&self, event_key: &str) {
        match self.config.event_pattern(event_key) {
            Some(pattern_name) => {
                debug!(event = event_key, pattern = pattern_name, "Event mapped.");
                self.trigger(pattern_name).await
            }
            None => debug!(event = event_key, "No pattern mapped to event."),
        }
    }

    /// Resolves and plays a pattern name or inline beat. Unknown names do nothing.
    pub async fn trigger(&self, name_or_beat: &str) {
        match patterns::resolve(name_or_beat, self.config.patterns()) {
            Some(pattern) => self.play(&pattern).await,
            None => debug!(pattern = name_or_beat, "Unknown pattern."),
        }
    }

    /// Plays a resolved pattern to completion.
    pub async fn play(&self, pattern: &ResolvedPattern) {
        let Some(actuator) = &self.actuator else {
            debug!(pattern = %pattern, "No actuator, skipping playback.");
            return;
        };

        let tokens = beat::tokenize(&pattern.beat, self.default_intensity(pattern));
        async {
            info!(
                device = actuator.name(),
                pattern = %pattern,
                tokens = tokens.len(),
                "Playing beat."
            );

            for token in tokens.iter() {
                match token {
                    Token::Tap {
                        strength,
                        intensity,
                    } => {
                        if let Err(e) = actuator.actuate(*strength, *intensity) {
                            warn!(err = e.as_ref(), "Error actuating.");
                        }
                    }
                    Token::Pause { count } => {
                        tokio::time::sleep(self.pause_duration(*count)).await;
                    }
                }
            }
        }
        .instrument(span!(Level::INFO, "play beat"))
        .await
    }

    /// The intensity for taps without `/value`: the pattern's own, then the config's.
    fn default_intensity(&self, pattern: &ResolvedPattern) -> f64 {
        pattern
            .intensity
            .or(self.config.intensity())
            .unwrap_or(DEFAULT_INTENSITY)
    }

    fn pause_duration(&self, count: usize) -> Duration {
        self.pause_unit
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

/// Builds an engine from the agent's config layers and the environment settings.
/// This is the only place the platform is probed for an actuator.
pub fn create_engine(agent: Agent, settings: &Settings) -> HapticEngine {
    HapticEngine::new(
        Config::load(agent),
        actuator::get_device(settings.device()),
    )
    .with_pause_unit(settings.pause_unit())
}
