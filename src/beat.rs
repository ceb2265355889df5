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
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// The lowest intensity a tap can carry.
pub const MIN_INTENSITY: f64 = 0.0;

/// The highest intensity a tap can carry.
pub const MAX_INTENSITY: f64 = 2.0;

/// Actuation strength levels understood by the trackpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strength {
    Minimal = 3,
    Medium = 4,
    Weak = 5,
    Strong = 6,
}

impl Strength {
    /// Converts a beat digit into a strength. Digits outside 3-6 have no strength.
    pub fn from_digit(digit: char) -> Option<Strength> {
        match digit {
            '3' => Some(Strength::Minimal),
            '4' => Some(Strength::Medium),
            '5' => Some(Strength::Weak),
            '6' => Some(Strength::Strong),
            _ => None,
        }
    }

    /// The numeric actuation level passed to the device.
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// A single playable step of a beat.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Fire the actuator once.
    Tap { strength: Strength, intensity: f64 },
    /// Wait for `count` pause units.
    Pause { count: usize },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Tap {
                strength,
                intensity,
            } => write!(f, "{}/{:.2}", strength, intensity),
            Token::Pause { count } => write!(f, "_x{}", count),
        }
    }
}

/// Clamps an intensity into [MIN_INTENSITY, MAX_INTENSITY]. NaN becomes MIN_INTENSITY.
pub fn clamp_intensity(intensity: f64) -> f64 {
    intensity.max(MIN_INTENSITY).min(MAX_INTENSITY)
}

/// Tokenizes a beat string.
///
/// Digits 3-6 are taps, optionally followed by `/<intensity>`. A run of spaces
/// becomes a single pause as long as the run. Everything else is ignored, so
/// this never fails.
pub fn tokenize(beat: &str, default_intensity: f64) -> Vec<Token> {
    let default_intensity = clamp_intensity(default_intensity);
    let mut tokens = Vec::new();
    let mut chars = beat.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ' ' {
            let mut count = 1;
            while chars.next_if_eq(&' ').is_some() {
                count += 1;
            }
            tokens.push(Token::Pause { count });
            continue;
        }

        let Some(strength) = Strength::from_digit(c) else {
            continue;
        };

        let intensity = if chars.next_if_eq(&'/').is_some() {
            parse_intensity(&take_literal(&mut chars))
                .map(clamp_intensity)
                .unwrap_or(default_intensity)
        } else {
            default_intensity
        };

        tokens.push(Token::Tap {
            strength,
            intensity,
        });
    }

    tokens
}

/// Consumes characters up to, but not including, the next space.
fn take_literal(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut literal = String::new();
    while let Some(c) = chars.next_if(|c| *c != ' ') {
        literal.push(c);
    }
    literal
}

/// Parses the longest leading decimal number of the literal, so "1.0.5" reads as
/// 1.0. A leading "Infinity" is accepted and left for clamping. Returns None if
/// the literal doesn't start with a number.
fn parse_intensity(literal: &str) -> Option<f64> {
    let bytes = literal.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if literal[end..].starts_with("Infinity") {
        return Some(if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Only take the exponent if it's complete.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    literal[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap(level: char, intensity: f64) -> Token {
        Token::Tap {
            strength: Strength::from_digit(level).expect("valid strength digit"),
            intensity,
        }
    }

    fn pause(count: usize) -> Token {
        Token::Pause { count }
    }

    #[test]
    fn test_empty_beat() {
        for default in [0.0, 0.5, 1.0, 2.0, 7.5] {
            assert!(tokenize("", default).is_empty());
        }
    }

    #[test]
    fn test_simple_taps() {
        assert_eq!(tokenize("66", 2.0), vec![tap('6', 2.0), tap('6', 2.0)]);
    }

    #[test]
    fn test_space_run_is_one_pause() {
        assert_eq!(
            tokenize("6  6", 2.0),
            vec![tap('6', 2.0), pause(2), tap('6', 2.0)]
        );
        assert_eq!(tokenize("   ", 1.0), vec![pause(3)]);
    }

    #[test]
    fn test_intensity_override() {
        assert_eq!(tokenize("6/0.5", 2.0), vec![tap('6', 0.5)]);
    }

    #[test]
    fn test_intensity_is_clamped() {
        assert_eq!(
            tokenize("6/5.0 6/-1", 1.0),
            vec![tap('6', 2.0), pause(1), tap('6', 0.0)]
        );
        // Bounds are inclusive.
        assert_eq!(tokenize("6/2 6/0", 1.0)[0], tap('6', 2.0));
        assert_eq!(tokenize("6/2 6/0", 1.0)[2], tap('6', 0.0));
    }

    #[test]
    fn test_default_intensity_without_slash() {
        assert_eq!(tokenize("5", 1.5), vec![tap('5', 1.5)]);
    }

    #[test]
    fn test_default_intensity_is_clamped() {
        assert_eq!(tokenize("3", 4.0), vec![tap('3', 2.0)]);
        assert_eq!(tokenize("3", -0.5), vec![tap('3', 0.0)]);
        assert_eq!(tokenize("3", f64::NAN), vec![tap('3', 0.0)]);
    }

    #[test]
    fn test_mixed_notation() {
        assert_eq!(
            tokenize("6/1.0 4 3/0.5", 2.0),
            vec![
                tap('6', 1.0),
                pause(1),
                tap('4', 2.0),
                pause(1),
                tap('3', 0.5),
            ]
        );
    }

    #[test]
    fn test_complex_pattern() {
        assert_eq!(
            tokenize("6/2.0 6/0.1  4/1.5 3/0.5", 2.0),
            vec![
                tap('6', 2.0),
                pause(1),
                tap('6', 0.1),
                pause(2),
                tap('4', 1.5),
                pause(1),
                tap('3', 0.5),
            ]
        );
    }

    #[test]
    fn test_malformed_literal_uses_default() {
        assert_eq!(tokenize("6/", 0.7), vec![tap('6', 0.7)]);
        assert_eq!(tokenize("6/ 5", 0.7), vec![tap('6', 0.7), pause(1), tap('5', 0.7)]);
        assert_eq!(tokenize("6/abc", 0.7), vec![tap('6', 0.7)]);
        assert_eq!(tokenize("6/.", 0.7), vec![tap('6', 0.7)]);
        assert_eq!(tokenize("6/NaN", 0.7), vec![tap('6', 0.7)]);
        assert_eq!(tokenize("6/inf", 0.7), vec![tap('6', 0.7)]);
    }

    #[test]
    fn test_literal_swallows_until_space() {
        // Digits inside the literal belong to the intensity, not to new taps.
        assert_eq!(tokenize("6/1.0.5", 0.3), vec![tap('6', 1.0)]);
        assert_eq!(tokenize("6/0.5x66", 0.3), vec![tap('6', 0.5)]);
        assert_eq!(tokenize("6/.5", 0.3), vec![tap('6', 0.5)]);
        assert_eq!(tokenize("6/1e-1", 0.3), vec![tap('6', 0.1)]);
        assert_eq!(tokenize("6/1e", 0.3), vec![tap('6', 1.0)]);
    }

    #[test]
    fn test_infinity_literal_is_clamped() {
        assert_eq!(tokenize("6/Infinity", 0.3), vec![tap('6', MAX_INTENSITY)]);
        assert_eq!(tokenize("6/+Infinity5", 0.3), vec![tap('6', MAX_INTENSITY)]);
        assert_eq!(tokenize("6/-Infinity", 0.3), vec![tap('6', MIN_INTENSITY)]);
        assert_eq!(tokenize("6/Inf", 0.3), vec![tap('6', 0.3)]);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        assert!(tokenize("1279.a", 1.0).is_empty());
        assert_eq!(tokenize("6.x4", 1.0), vec![tap('6', 1.0), tap('4', 1.0)]);
        // Only spaces are pauses.
        assert_eq!(tokenize("6\t\n6", 1.0), vec![tap('6', 1.0), tap('6', 1.0)]);
        assert_eq!(tokenize("/0.0 ", 1.0), vec![pause(1)]);
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let beat = "6666666 5/1.0 4/1.0 3/1.0";
        assert_eq!(tokenize(beat, 0.1), tokenize(beat, 0.1));
    }

    #[test]
    fn test_strength_levels() {
        assert_eq!(Strength::Minimal.level(), 3);
        assert_eq!(Strength::Medium.level(), 4);
        assert_eq!(Strength::Weak.level(), 5);
        assert_eq!(Strength::Strong.level(), 6);
        assert_eq!(Strength::from_digit('2'), None);
        assert_eq!(Strength::from_digit('7'), None);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(tap('6', 0.8).to_string(), "6/0.80");
        assert_eq!(pause(3).to_string(), "_x3");
    }
}
