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
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::PatternEntry;

/// The intensity used when neither the pattern nor the config sets one.
pub const DEFAULT_INTENSITY: f64 = 1.0;

/// A pattern that ships with the binary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinPattern {
    pub name: &'static str,
    pub beat: &'static str,
    pub intensity: Option<f64>,
}

/// The built-in patterns. User patterns with the same name take precedence.
pub const BUILTIN_PATTERNS: &[BuiltinPattern] = &[
    BuiltinPattern {
        name: "vibe",
        beat: "6/0.8 3/1.0   6/1.0",
        intensity: None,
    },
    BuiltinPattern {
        name: "alert",
        beat: "6/0.5 6/1.0 6/0.5",
        intensity: None,
    },
    BuiltinPattern {
        name: "dopamine",
        beat: "6666666 5/1.0 4/1.0 3/1.0",
        intensity: Some(0.1),
    },
    BuiltinPattern {
        name: "noise",
        beat: "6543654365436543",
        intensity: None,
    },
];

/// Gets the built-in pattern with the given name.
pub fn builtin(name: &str) -> Option<&'static BuiltinPattern> {
    BUILTIN_PATTERNS.iter().find(|pattern| pattern.name == name)
}

/// A beat ready for tokenizing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPattern {
    /// The beat string.
    pub beat: String,
    /// The default intensity for taps without `/value`.
    pub intensity: Option<f64>,
}

impl ResolvedPattern {
    /// Creates a resolved pattern.
    pub fn new(beat: &str, intensity: Option<f64>) -> ResolvedPattern {
        ResolvedPattern {
            beat: beat.to_string(),
            intensity,
        }
    }
}

impl fmt::Display for ResolvedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intensity {
            Some(intensity) => write!(f, "\"{}\" (intensity {})", self.beat, intensity),
            None => write!(f, "\"{}\"", self.beat),
        }
    }
}

impl From<&PatternEntry> for ResolvedPattern {
    fn from(entry: &PatternEntry) -> Self {
        match entry {
            PatternEntry::Beat(beat) => ResolvedPattern::new(beat, None),
            PatternEntry::Definition(definition) => {
                ResolvedPattern::new(definition.beat(), definition.intensity())
            }
        }
    }
}

impl From<&BuiltinPattern> for ResolvedPattern {
    fn from(pattern: &BuiltinPattern) -> Self {
        ResolvedPattern::new(pattern.beat, pattern.intensity)
    }
}

fn inline_beat_regex() -> &'static Regex {
    static INLINE_BEAT: OnceLock<Regex> = OnceLock::new();
    INLINE_BEAT.get_or_init(|| Regex::new(r"^[3-6/.\s]+$").expect("inline beat regex is valid"))
}

/// True if the input is made up only of beat characters and should be played as is.
pub fn is_inline_beat(name_or_beat: &str) -> bool {
    inline_beat_regex().is_match(name_or_beat)
}

/// Resolves a pattern name or inline beat.
///
/// Precedence, first match wins:
/// 1. Anything that looks like a beat is played directly. A user pattern named
///    e.g. "66" can therefore never be reached by name.
/// 2. User patterns. An empty beat string counts as unset.
/// 3. Built-in patterns.
pub fn resolve(
    name_or_beat: &str,
    user_patterns: &HashMap<String, PatternEntry>,
) -> Option<ResolvedPattern> {
    if is_inline_beat(name_or_beat) {
        return Some(ResolvedPattern::new(name_or_beat, None));
    }

    match user_patterns.get(name_or_beat) {
        Some(PatternEntry::Beat(beat)) if beat.is_empty() => {}
        Some(entry) => return Some(entry.into()),
        None => {}
    }

    builtin(name_or_beat).map(ResolvedPattern::from)
}
