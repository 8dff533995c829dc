//! Terminal color-depth profiles and truecolor downgrade.

use crate::color::Rgb;
use crate::palette::VGA;

/// How many colors the output terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorProfile {
    /// Attributes only.
    Mono,
    Ansi16,
    Ansi256,
    #[default]
    TrueColor,
}

impl ColorProfile {
    /// Choose the best available profile from detection flags.
    ///
    /// `no_color` reflects explicit user intent (e.g. `NO_COLOR`).
    #[must_use]
    pub const fn from_flags(true_color: bool, colors_256: bool, no_color: bool) -> Self {
        if no_color {
            Self::Mono
        } else if true_color {
            Self::TrueColor
        } else if colors_256 {
            Self::Ansi256
        } else {
            Self::Ansi16
        }
    }

    /// Parse a user-facing name (`mono`, `16`, `256`, `truecolor`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mono" | "none" | "0" => Some(Self::Mono),
            "16" | "ansi16" | "ansi" => Some(Self::Ansi16),
            "256" | "ansi256" => Some(Self::Ansi256),
            "truecolor" | "24bit" | "rgb" => Some(Self::TrueColor),
            _ => None,
        }
    }

    /// Guess from the usual environment variables.
    pub fn detect_with(get: impl Fn(&str) -> Option<String>) -> Self {
        let no_color = get("NO_COLOR").is_some_and(|v| !v.is_empty());
        let colorterm = get("COLORTERM").unwrap_or_default().to_ascii_lowercase();
        let term = get("TERM").unwrap_or_default();
        let true_color = colorterm.contains("truecolor") || colorterm.contains("24bit");
        let colors_256 = term.contains("256color");
        Self::from_flags(true_color, colors_256, no_color)
    }
}

/// Nearest xterm 256-color index.
#[must_use]
pub fn rgb_to_256(c: Rgb) -> u8 {
    if c.r == c.g && c.g == c.b {
        return match c.r {
            0..8 => 16,
            249..=255 => 231,
            v => 232 + ((v - 8) / 10).min(23),
        };
    }
    16 + 36 * cube_index(c.r) + 6 * cube_index(c.g) + cube_index(c.b)
}

/// Channel value to cube index using midpoints between the uneven levels.
fn cube_index(v: u8) -> u8 {
    match v {
        0..48 => 0,
        48..115 => 1,
        _ => (v - 35) / 40,
    }
}

/// Nearest of the 16 VGA colors, as an index 0..16.
#[must_use]
pub fn rgb_to_ansi16(c: Rgb) -> u8 {
    let mut best = 0u8;
    let mut best_dist = u64::MAX;
    for (idx, candidate) in VGA.iter().enumerate() {
        let dist = weighted_distance(c, *candidate);
        if dist < best_dist {
            best = idx as u8;
            best_dist = dist;
        }
    }
    best
}

fn weighted_distance(a: Rgb, b: Rgb) -> u64 {
    let d = |x: u8, y: u8| {
        let v = i64::from(x) - i64::from(y);
        (v * v) as u64
    };
    2126 * d(a.r, b.r) + 7152 * d(a.g, b.g) + 722 * d(a.b, b.b)
}
