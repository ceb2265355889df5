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
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;

use clap::{crate_version, Parser, Subcommand};
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use vibe_haptic::beat;
use vibe_haptic::config::{Agent, Config, PatternEntry, Settings};
use vibe_haptic::haptic::{self, HapticEngine};
use vibe_haptic::hook;
use vibe_haptic::patterns::{self, ResolvedPattern, DEFAULT_INTENSITY};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Haptic beats for coding agents."
)]
struct Cli {
    /// The agent whose config files should be used.
    #[arg(short, long, value_enum, default_value_t = Agent::Claude, global = true)]
    agent: Agent,

    /// The actuator to play through. Names starting with "mock" use a mock device.
    #[arg(short, long, global = true)]
    device: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plays a pattern by name, or an inline beat such as "6/0.5 3  6".
    Play {
        /// The pattern name or beat.
        #[arg(default_value = "vibe")]
        pattern: String,
    },
    /// Plays the pattern mapped to an event key, e.g. stop or prompt.
    Event {
        /// The event key.
        key: String,
    },
    /// Reads an agent hook payload from stdin and plays the mapped event.
    Hook {},
    /// Lists the built-in and configured patterns.
    Patterns {},
    /// Prints the tokens a beat is played as.
    Tokens {
        /// The beat string.
        beat: String,
        /// The intensity for taps without an explicit /value.
        #[arg(short, long, default_value_t = DEFAULT_INTENSITY)]
        intensity: f64,
    },
}

/// Logs go to the debug log file when debugging is on, stderr otherwise. Stdout is
/// left alone so that hooks stay quiet.
fn init_tracing(settings: &Settings) {
    if settings.debug() {
        if let Some(path) = settings.log_file() {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    tracing_subscriber::fmt()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_max_level(LevelFilter::DEBUG)
                        .init();
                    return;
                }
                Err(e) => eprintln!("Unable to open debug log {}: {}", path.display(), e),
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

fn write_patterns<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    writeln!(out, "Built-in patterns:")?;
    for pattern in patterns::BUILTIN_PATTERNS {
        let overridden = match config.patterns().get(pattern.name) {
            Some(PatternEntry::Beat(beat)) => !beat.is_empty(),
            Some(PatternEntry::Definition(_)) => true,
            None => false,
        };
        let marker = if overridden { " (overridden)" } else { "" };
        writeln!(
            out,
            "- {}: {}{}",
            pattern.name,
            ResolvedPattern::from(pattern),
            marker
        )?;
    }

    if !config.patterns().is_empty() {
        let mut names: Vec<&String> = config.patterns().keys().collect();
        names.sort();

        writeln!(out, "\nConfigured patterns:")?;
        for name in names {
            let entry: &PatternEntry = &config.patterns()[name];
            let marker = if patterns::is_inline_beat(name) {
                " (unreachable, name is a beat)"
            } else {
                ""
            };
            writeln!(out, "- {}: {}{}", name, ResolvedPattern::from(entry), marker)?;
        }
    }

    let mut events: Vec<(&String, &String)> = config.events().iter().collect();
    events.sort();

    writeln!(out, "\nEvents:")?;
    for (key, name) in events {
        writeln!(out, "- {} -> {}", key, name)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let (settings, settings_error) = match Settings::from_env() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let settings = settings.with_device(cli.device);
    init_tracing(&settings);
    if let Some(e) = settings_error {
        warn!(err = %e, "Invalid environment settings, using defaults.");
    }

    match cli.command {
        Commands::Play { pattern } => {
            let engine = haptic::create_engine(cli.agent, &settings);
            println!("🫨 {}", pattern);
            engine.trigger(&pattern).await;
        }
        Commands::Event { key } => {
            let engine = haptic::create_engine(cli.agent, &settings);
            engine.trigger_for_event(&key).await;
        }
        Commands::Hook {} => {
            let engine = haptic::create_engine(cli.agent, &settings);
            hook::handle_hook(&engine, cli.agent, io::stdin().lock()).await;
        }
        Commands::Patterns {} => {
            write_patterns(&mut io::stdout().lock(), &Config::load(cli.agent))?;
        }
        Commands::Tokens {
            beat: text,
            intensity,
        } => {
            let tokens = beat::tokenize(&text, intensity);
            if tokens.is_empty() {
                println!("No tokens.");
                return Ok(());
            }

            println!("Tokens (count: {}):", tokens.len());
            for token in tokens {
                println!("- {}", token);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn patterns_output(config: &Config) -> String {
        let mut out = Vec::new();
        write_patterns(&mut out, config).expect("writing to a vec");
        String::from_utf8(out).expect("valid utf-8")
    }

    #[test]
    fn test_default_config_lists_events() {
        let output = patterns_output(&Config::default());
        assert!(output.contains("- vibe: \"6/0.8 3/1.0   6/1.0\"\n"));
        assert!(!output.contains("Configured patterns:"));
        assert!(output.contains("Events:\n- prompt -> alert\n- stop -> vibe\n"));
    }

    #[test]
    fn test_configured_patterns_are_marked() {
        let patterns = HashMap::from([
            ("vibe".to_string(), PatternEntry::Beat("33".to_string())),
            ("alert".to_string(), PatternEntry::Beat(String::new())),
            ("66".to_string(), PatternEntry::Beat("3".to_string())),
        ]);
        let output = patterns_output(&Config::new(patterns, HashMap::new(), None));
        assert!(output.contains("- vibe: \"6/0.8 3/1.0   6/1.0\" (overridden)\n"));
        assert!(output.contains("- alert: \"6/0.5 6/1.0 6/0.5\"\n"));
        assert!(output.contains("- 66: \"3\" (unreachable, name is a beat)\n"));
        assert!(output.contains("Events:\n"));
    }
}
