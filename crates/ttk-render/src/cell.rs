#![forbid(unsafe_code)]

//! Cell types.
//!
//! A [`Cell`] is one terminal position: a [`Glyph`] plus a [`Color`]. A glyph
//! two columns wide is stored in its left cell and the right cell holds
//! [`Glyph::Continuation`]; the pair is always written and cleared together.

use std::fmt;

use ttk_core::text_width::grapheme_width;
use ttk_style::Color;

/// Content of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// A single code point.
    Char(char),
    /// A multi code point cluster (base plus combining marks, ZWJ sequence).
    Cluster(Box<str>),
    /// Right half of the wide glyph to the left.
    Continuation,
}

impl Default for Glyph {
    fn default() -> Self {
        Glyph::Char(' ')
    }
}

impl Glyph {
    /// Build a glyph from one cluster. Returns `None` for an empty string.
    pub fn from_cluster(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) => Some(Glyph::Char(c)),
            _ => Some(Glyph::Cluster(text.into())),
        }
    }

    /// Display width: 0 for a continuation, otherwise 1 or 2.
    pub fn width(&self) -> usize {
        match self {
            Glyph::Char(c) => {
                let mut buf = [0u8; 4];
                grapheme_width(c.encode_utf8(&mut buf)).clamp(1, 2)
            }
            Glyph::Cluster(s) => grapheme_width(s).clamp(1, 2),
            Glyph::Continuation => 0,
        }
    }

    pub fn is_wide(&self) -> bool {
        self.width() == 2
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self, Glyph::Continuation)
    }

    /// Append the glyph text; a continuation appends nothing.
    pub fn push_to(&self, out: &mut String) {
        match self {
            Glyph::Char(c) => out.push(*c),
            Glyph::Cluster(s) => out.push_str(s),
            Glyph::Continuation => {}
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Glyph::Char(c) => write!(f, "{c}"),
            Glyph::Cluster(s) => f.write_str(s),
            Glyph::Continuation => Ok(()),
        }
    }
}

impl From<char> for Glyph {
    fn from(c: char) -> Self {
        Glyph::Char(c)
    }
}

/// One terminal position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// Space in the terminal default colors.
    pub const EMPTY: Cell = Cell {
        glyph: Glyph::Char(' '),
        color: Color::RESET,
    };

    pub const CONTINUATION: Cell = Cell {
        glyph: Glyph::Continuation,
        color: Color::RESET,
    };

    pub fn new(glyph: Glyph, color: Color) -> Self {
        Self { glyph, color }
    }

    pub fn from_char(c: char) -> Self {
        Self {
            glyph: Glyph::Char(c),
            color: Color::RESET,
        }
    }

    /// A space without a background: lets the destination show through when
    /// blitted from a transparent canvas.
    pub fn is_see_through(&self) -> bool {
        self.glyph == Glyph::Char(' ') && self.color.background().is_none()
    }
}
