#![forbid(unsafe_code)]

//! Style layer: the [`Color`] value type with its composition and diff
//! algebra, SGR parsing and encoding, color profiles, gradients, theme glyph
//! tables, and per-state style maps.

pub mod color;
pub mod modifier;
pub mod palette;
pub mod profile;
pub mod sgr;
pub mod style;
pub mod theme;

pub use color::{Color, Mods, Rgb};
pub use modifier::{ColorModifier, Gradient, LinearGradient, Orientation};
pub use palette::Palette;
pub use profile::ColorProfile;
pub use sgr::apply_sgr;
pub use style::{StyleMap, WidgetState};
pub use theme::{GridGlyphs, Theme};
