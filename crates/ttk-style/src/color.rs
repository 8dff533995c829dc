//! The [`Color`] value type.
//!
//! A color is an optional truecolor foreground, an optional background, a
//! modifier mask, an optional OSC 8 hyperlink, and a `clean` flag. A clean
//! color serializes with a leading SGR reset.
//!
//! Three operators form the style algebra:
//!
//! - `a + b` overlays `b` on `a` (`b` wins where set, modifiers union).
//! - `a | b` is left-biased (`a` wins) and never clean.
//! - `a - b` is the escape sequence that moves a terminal showing `b` to `a`.

use std::fmt::{self, Write as _};
use std::ops::{Add, BitOr, Sub};
use std::sync::Arc;

use bitflags::bitflags;
use ttk_core::{Error, Result};

use crate::modifier::ColorModifier;
use crate::profile::ColorProfile;

/// Opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (case-insensitive).
    pub fn from_hex(text: &str) -> Result<Self> {
        let bad = || Error::InvalidColor(text.to_owned());
        let hex = text.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let v = u32::from_str_radix(hex, 16).map_err(|_| bad())?;
        Ok(Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
    }

    /// Build from signed channels, rejecting anything outside `0..=255`.
    pub fn from_triple(r: i32, g: i32, b: i32) -> Result<Self> {
        let chan = |v: i32| u8::try_from(v).map_err(|_| Error::InvalidColor(format!("({r}, {g}, {b})")));
        Ok(Self::new(chan(r)?, chan(g)?, chan(b)?))
    }

    /// `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness (Rec. 709 weights), 0..=255.
    pub fn luminance_u8(self) -> u8 {
        let l = 2126 * u32::from(self.r) + 7152 * u32::from(self.g) + 722 * u32::from(self.b);
        (l / 10_000) as u8
    }

    /// Hue in degrees (0..360), saturation and lightness in percent.
    pub fn to_hsl(self) -> (u16, u8, u8) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;
        if delta == 0.0 {
            return (0, 0, (l * 100.0).round() as u8);
        }
        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (
            (h.round() as u16) % 360,
            (s * 100.0).round().min(100.0) as u8,
            (l * 100.0).round() as u8,
        )
    }

    pub fn from_hsl(hue: u16, sat: u8, lum: u8) -> Self {
        let h = f64::from(hue % 360);
        let s = f64::from(sat.min(100)) / 100.0;
        let l = f64::from(lum.min(100)) / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match hue % 360 {
            0..60 => (c, x, 0.0),
            60..120 => (x, c, 0.0),
            120..180 => (0.0, c, x),
            180..240 => (0.0, x, c),
            240..300 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to(r), to(g), to(b))
    }
}

bitflags! {
    /// Text attributes. Bit values are stable and shared with the VT screen.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u8 {
        const BOLD          = 0x01;
        const FAINT         = 0x02;
        const ITALIC        = 0x04;
        const UNDERLINE     = 0x08;
        const BLINKING      = 0x10;
        const REVERSED      = 0x20;
        const HIDDEN        = 0x40;
        const STRIKETHROUGH = 0x80;
    }
}

/// SGR code for each modifier, in emission order.
const MOD_CODES: [(Mods, u8); 8] = [
    (Mods::BOLD, 1),
    (Mods::FAINT, 2),
    (Mods::ITALIC, 3),
    (Mods::UNDERLINE, 4),
    (Mods::BLINKING, 5),
    (Mods::REVERSED, 7),
    (Mods::HIDDEN, 8),
    (Mods::STRIKETHROUGH, 9),
];

const OSC8_CLOSE: &str = "\x1b]8;;\x1b\\";

/// Immutable cell/text style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    mods: Mods,
    link: Option<Arc<str>>,
    modifier: Option<Arc<ColorModifier>>,
    clean: bool,
}

impl Default for Color {
    fn default() -> Self {
        Self::RESET
    }
}

impl Color {
    /// Terminal default colors, no attributes, emitted as an explicit reset.
    pub const RESET: Color = Color {
        fg: None,
        bg: None,
        mods: Mods::empty(),
        link: None,
        modifier: None,
        clean: true,
    };

    pub const BOLD: Color = Color::mods(Mods::BOLD);
    pub const FAINT: Color = Color::mods(Mods::FAINT);
    pub const ITALIC: Color = Color::mods(Mods::ITALIC);
    pub const UNDERLINE: Color = Color::mods(Mods::UNDERLINE);
    pub const BLINKING: Color = Color::mods(Mods::BLINKING);
    pub const REVERSED: Color = Color::mods(Mods::REVERSED);
    pub const STRIKETHROUGH: Color = Color::mods(Mods::STRIKETHROUGH);

    /// An attribute-only color.
    pub const fn mods(mods: Mods) -> Self {
        Self {
            fg: None,
            bg: None,
            mods,
            link: None,
            modifier: None,
            clean: false,
        }
    }

    pub const fn fg_rgb(rgb: Rgb) -> Self {
        Self {
            fg: Some(rgb),
            bg: None,
            mods: Mods::empty(),
            link: None,
            modifier: None,
            clean: false,
        }
    }

    pub const fn bg_rgb(rgb: Rgb) -> Self {
        Self {
            fg: None,
            bg: Some(rgb),
            mods: Mods::empty(),
            link: None,
            modifier: None,
            clean: false,
        }
    }

    /// Foreground from `#RRGGBB`.
    pub fn fg(hex: &str) -> Result<Self> {
        Rgb::from_hex(hex).map(Self::fg_rgb)
    }

    /// Background from `#RRGGBB`.
    pub fn bg(hex: &str) -> Result<Self> {
        Rgb::from_hex(hex).map(Self::bg_rgb)
    }

    /// Foreground and background from two `#RRGGBB` strings.
    pub fn fg_bg(fg: &str, bg: &str) -> Result<Self> {
        Ok(Self::fg(fg)? + Self::bg(bg)?)
    }

    /// A hyperlink-only color.
    pub fn link(url: &str) -> Self {
        Self {
            link: Some(Arc::from(url)),
            ..Self::mods(Mods::empty())
        }
    }

    // ── accessors ──

    #[inline]
    pub fn foreground(&self) -> Option<Rgb> {
        self.fg
    }

    #[inline]
    pub fn background(&self) -> Option<Rgb> {
        self.bg
    }

    #[inline]
    pub fn modifiers(&self) -> Mods {
        self.mods
    }

    #[inline]
    pub fn hyperlink(&self) -> Option<&str> {
        self.link.as_deref()
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    #[inline]
    pub fn color_modifier(&self) -> Option<&ColorModifier> {
        self.modifier.as_deref()
    }

    pub fn has_bold(&self) -> bool {
        self.mods.contains(Mods::BOLD)
    }

    /// No fg, bg, modifiers or link (the `clean` flag is ignored).
    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.mods.is_empty() && self.link.is_none()
    }

    // ── builders ──

    #[must_use]
    pub fn with_fg(mut self, fg: Option<Rgb>) -> Self {
        self.fg = fg;
        self
    }

    #[must_use]
    pub fn with_bg(mut self, bg: Option<Rgb>) -> Self {
        self.bg = bg;
        self
    }

    #[must_use]
    pub fn with_mods(mut self, mods: Mods) -> Self {
        self.mods = mods;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Option<&str>) -> Self {
        self.link = link.map(Arc::from);
        self
    }

    #[must_use]
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: ColorModifier) -> Self {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    /// Swap foreground and background.
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
            ..self.clone()
        }
    }

    /// Drop the modifier, keeping the concrete style.
    #[must_use]
    pub fn without_modifier(&self) -> Self {
        Self {
            modifier: None,
            ..self.clone()
        }
    }

    /// Concrete color for cell `(x, y)`: applies the gradient modifier if any.
    pub fn resolve(&self, x: i32, y: i32) -> Color {
        match &self.modifier {
            None => self.clone(),
            Some(m) => m.apply(x, y, &self.without_modifier()),
        }
    }

    /// Same modifier with new runtime parameters (offset and step).
    #[must_use]
    pub fn with_modifier_param(&self, val: i32, step: i32) -> Self {
        match &self.modifier {
            None => self.clone(),
            Some(m) => Self {
                modifier: Some(Arc::new(m.with_param(val, step))),
                ..self.clone()
            },
        }
    }

    // ── algebra ──

    /// `self + other`.
    pub fn combine(&self, other: &Color) -> Color {
        Color {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            mods: self.mods | other.mods,
            link: other.link.clone().or_else(|| self.link.clone()),
            modifier: other.modifier.clone().or_else(|| self.modifier.clone()),
            clean: self.clean,
        }
    }

    /// `self | other`: fields of `self` win, gaps come from `other`.
    pub fn compose_under(&self, other: &Color) -> Color {
        Color {
            fg: self.fg.or(other.fg),
            bg: self.bg.or(other.bg),
            mods: self.mods | other.mods,
            link: self.link.clone().or_else(|| other.link.clone()),
            modifier: self.modifier.clone().or_else(|| other.modifier.clone()),
            clean: false,
        }
    }

    /// Escape sequence that moves a terminal currently showing `prev` to `self`.
    ///
    /// Returns a full reset followed by every attribute of `self` when `self`
    /// drops a foreground or background that `prev` had, or when the modifier
    /// sets differ; otherwise only the changed colors. Equal attributes yield
    /// an empty string.
    pub fn transition_from(&self, prev: &Color) -> String {
        self.transition_from_with(prev, ColorProfile::TrueColor)
    }

    pub fn transition_from_with(&self, prev: &Color, profile: ColorProfile) -> String {
        let mut out = String::new();
        self.write_transition(prev, profile, &mut out);
        out
    }

    /// Append the transition from `prev` to `out`.
    pub fn write_transition(&self, prev: &Color, profile: ColorProfile, out: &mut String) {
        let needs_reset = (prev.fg.is_some() && self.fg.is_none())
            || (prev.bg.is_some() && self.bg.is_none())
            || prev.mods != self.mods;
        if needs_reset {
            out.push_str("\x1b[0");
            let mut params = String::new();
            self.push_params(profile, &mut params);
            if !params.is_empty() {
                out.push(';');
                out.push_str(&params);
            }
            out.push('m');
        } else {
            let mut params = String::new();
            if self.fg != prev.fg {
                push_fg(self.fg, profile, &mut params);
            }
            if self.bg != prev.bg {
                push_bg(self.bg, profile, &mut params);
            }
            if !params.is_empty() {
                out.push_str("\x1b[");
                out.push_str(&params);
                out.push('m');
            }
        }
        if self.link != prev.link {
            push_link(self.link.as_deref(), out);
        }
    }

    // ── serialization ──

    /// Standalone SGR (plus OSC 8 when linked), assuming nothing about the
    /// terminal's current state other than what `clean` implies.
    pub fn to_ansi(&self) -> String {
        self.to_ansi_with(ColorProfile::TrueColor)
    }

    pub fn to_ansi_with(&self, profile: ColorProfile) -> String {
        let mut params = String::new();
        if self.clean {
            params.push('0');
        }
        self.push_params(profile, &mut params);
        let mut out = if params.is_empty() {
            String::from("\x1b[0m")
        } else {
            format!("\x1b[{params}m")
        };
        if let Some(link) = self.link.as_deref() {
            push_link(Some(link), &mut out);
        }
        out
    }

    /// Append `;`-joined parameters for fg, bg and modifiers.
    fn push_params(&self, profile: ColorProfile, out: &mut String) {
        push_fg_opt(self.fg, profile, out);
        push_bg_opt(self.bg, profile, out);
        for (flag, code) in MOD_CODES {
            if self.mods.contains(flag) {
                sep(out);
                let _ = write!(out, "{code}");
            }
        }
    }

    /// Parse a string made only of `ESC [ … m` and `ESC ] 8 ; ; URL ST`
    /// segments.
    pub fn from_ansi(ansi: &str) -> Result<Self> {
        crate::sgr::parse_ansi(ansi, &crate::palette::Palette::default())
    }
}

#[inline]
fn sep(out: &mut String) {
    if !out.is_empty() {
        out.push(';');
    }
}

fn push_fg_opt(fg: Option<Rgb>, profile: ColorProfile, out: &mut String) {
    if fg.is_some() {
        push_fg(fg, profile, out);
    }
}

fn push_bg_opt(bg: Option<Rgb>, profile: ColorProfile, out: &mut String) {
    if bg.is_some() {
        push_bg(bg, profile, out);
    }
}

fn push_fg(fg: Option<Rgb>, profile: ColorProfile, out: &mut String) {
    push_channel(fg, profile, 38, 30, 90, 39, out);
}

fn push_bg(bg: Option<Rgb>, profile: ColorProfile, out: &mut String) {
    push_channel(bg, profile, 48, 40, 100, 49, out);
}

fn push_channel(
    rgb: Option<Rgb>,
    profile: ColorProfile,
    extended: u8,
    base16: u8,
    bright16: u8,
    default: u8,
    out: &mut String,
) {
    // Mono shows no colors, so it has no default colors to restore either.
    if profile == ColorProfile::Mono {
        return;
    }
    let Some(c) = rgb else {
        sep(out);
        let _ = write!(out, "{default}");
        return;
    };
    match profile {
        ColorProfile::TrueColor => {
            sep(out);
            let _ = write!(out, "{extended};2;{};{};{}", c.r, c.g, c.b);
        }
        ColorProfile::Ansi256 => {
            sep(out);
            let _ = write!(out, "{extended};5;{}", crate::profile::rgb_to_256(c));
        }
        ColorProfile::Ansi16 => {
            let idx = crate::profile::rgb_to_ansi16(c);
            sep(out);
            if idx < 8 {
                let _ = write!(out, "{}", base16 + idx);
            } else {
                let _ = write!(out, "{}", bright16 + idx - 8);
            }
        }
        ColorProfile::Mono => {}
    }
}

fn push_link(link: Option<&str>, out: &mut String) {
    match link {
        Some(url) => {
            out.push_str("\x1b]8;;");
            out.push_str(url);
            out.push_str("\x1b\\");
        }
        None => out.push_str(OSC8_CLOSE),
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ansi())
    }
}

impl Add<&Color> for &Color {
    type Output = Color;

    fn add(self, rhs: &Color) -> Color {
        self.combine(rhs)
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        self.combine(&rhs)
    }
}

impl Add<&Color> for Color {
    type Output = Color;

    fn add(self, rhs: &Color) -> Color {
        self.combine(rhs)
    }
}

impl BitOr<&Color> for &Color {
    type Output = Color;

    fn bitor(self, rhs: &Color) -> Color {
        self.compose_under(rhs)
    }
}

impl BitOr for Color {
    type Output = Color;

    fn bitor(self, rhs: Color) -> Color {
        self.compose_under(&rhs)
    }
}

impl Sub<&Color> for &Color {
    type Output = String;

    fn sub(self, rhs: &Color) -> String {
        self.transition_from(rhs)
    }
}

impl Sub for Color {
    type Output = String;

    fn sub(self, rhs: Color) -> String {
        self.transition_from(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::fg("#FF0000").expect("hex")
    }

    // ── construction ──

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#0a0B0c").expect("hex"), Rgb::new(10, 11, 12));
        for bad in ["0a0b0c", "#12345", "#1234567", "#gg0000", ""] {
            assert!(matches!(Rgb::from_hex(bad), Err(Error::InvalidColor(_))), "{bad}");
        }
        assert!(Color::bg("#zzzzzz").is_err());
    }

    #[test]
    fn triple_range_check() {
        assert_eq!(Rgb::from_triple(1, 2, 3).expect("ok"), Rgb::new(1, 2, 3));
        for (r, g, b) in [(256, 0, 0), (0, -1, 0), (0, 0, 300)] {
            assert!(matches!(Rgb::from_triple(r, g, b), Err(Error::InvalidColor(_))));
        }
    }

    #[test]
    fn sgr_with_invalid_components_is_an_invalid_color() {
        for bad in ["\x1b[38;2;300;0;0m", "\x1b[38;5;256m", "\x1b[38;2;1m"] {
            assert!(matches!(Color::from_ansi(bad), Err(Error::InvalidColor(_))), "{bad:?}");
        }
        assert!(matches!(Color::from_ansi("\x1b[3x1m"), Err(Error::Parse(_))));
    }

    #[test]
    fn hsl_round_trip_on_primaries() {
        for rgb in [
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(255, 255, 255),
            Rgb::new(0, 0, 0),
        ] {
            let (h, s, l) = rgb.to_hsl();
            assert_eq!(Rgb::from_hsl(h, s, l), rgb);
        }
        assert_eq!(Rgb::new(255, 0, 0).to_hsl(), (0, 100, 50));
        assert_eq!(Rgb::new(0, 0, 255).to_hex(), "#0000ff");
    }

    // ── algebra ──

    #[test]
    fn add_overlays_right_side() {
        let a = red() + Color::BOLD;
        let b = Color::fg("#00FF00").expect("hex") + Color::ITALIC;
        let c = &a + &b;
        assert_eq!(c.foreground(), Some(Rgb::new(0, 255, 0)));
        assert_eq!(c.modifiers(), Mods::BOLD | Mods::ITALIC);
        assert!(!c.is_clean());
        let d = Color::RESET + red();
        assert!(d.is_clean());
    }

    #[test]
    fn add_reset_is_identity() {
        let a = red() + Color::UNDERLINE;
        assert_eq!(&a + &Color::RESET, a);
    }

    #[test]
    fn bitor_is_left_biased_and_never_clean() {
        let a = red();
        let b = Color::fg("#0000FF").expect("hex") + Color::bg("#FFFFFF").expect("hex");
        let c = Color::RESET.clone().with_fg(Some(Rgb::WHITE)) | b.clone();
        assert_eq!(c.foreground(), Some(Rgb::WHITE));
        assert_eq!(c.background(), Some(Rgb::WHITE));
        assert!(!c.is_clean());
        assert_eq!((a.clone() | b).foreground(), a.foreground());
    }

    #[test]
    fn invert_swaps_channels() {
        let c = Color::fg_bg("#010203", "#040506").expect("hex").invert();
        assert_eq!(c.foreground(), Some(Rgb::new(4, 5, 6)));
        assert_eq!(c.background(), Some(Rgb::new(1, 2, 3)));
    }

    // ── serialization ──

    #[test]
    fn sgr_compose_literals() {
        let a = red() + Color::BOLD;
        let b = Color::bg("#00FF00").expect("hex");
        let c = &a + &b;
        assert_eq!(c.to_ansi(), "\x1b[38;2;255;0;0;48;2;0;255;0;1m");
        assert_eq!(a.to_ansi(), "\x1b[38;2;255;0;0;1m");
        assert_eq!(&c - &a, "\x1b[48;2;0;255;0m");
    }

    #[test]
    fn reset_serializes_as_zero() {
        assert_eq!(Color::RESET.to_ansi(), "\x1b[0m");
        assert_eq!((Color::RESET + red()).to_ansi(), "\x1b[0;38;2;255;0;0m");
        assert_eq!(Color::mods(Mods::empty()).to_ansi(), "\x1b[0m");
    }

    #[test]
    fn modifier_codes_in_order() {
        let c = Color::mods(Mods::all());
        assert_eq!(c.to_ansi(), "\x1b[1;2;3;4;5;7;8;9m");
    }

    #[test]
    fn hyperlink_follows_sgr() {
        let c = red() + Color::link("https://example.com");
        assert_eq!(
            c.to_ansi(),
            "\x1b[38;2;255;0;0m\x1b]8;;https://example.com\x1b\\"
        );
        assert_eq!(&red() - &c, OSC8_CLOSE);
    }

    #[test]
    fn diff_resets_when_dropping_channels() {
        let fg_bg = Color::fg_bg("#010101", "#020202").expect("hex");
        let fg_only = Color::fg("#010101").expect("hex");
        assert_eq!(&fg_only - &fg_bg, "\x1b[0;38;2;1;1;1m");
        assert_eq!(&Color::RESET - &fg_only, "\x1b[0m");
        assert_eq!(&fg_only - &fg_only, "");
    }

    #[test]
    fn diff_resets_on_modifier_change() {
        let plain = red();
        let bold = red() + Color::BOLD;
        assert_eq!(&plain - &bold, "\x1b[0;38;2;255;0;0m");
        assert_eq!(&bold - &plain, "\x1b[0;38;2;255;0;0;1m");
    }

    #[test]
    fn downgraded_profiles() {
        let c = Color::fg_bg("#FF0000", "#0000FF").expect("hex");
        assert_eq!(c.to_ansi_with(ColorProfile::Ansi256), "\x1b[38;5;196;48;5;21m");
        assert_eq!(c.to_ansi_with(ColorProfile::Ansi16), "\x1b[31;44m");
        assert_eq!((c + Color::BOLD).to_ansi_with(ColorProfile::Mono), "\x1b[1m");
    }

    #[test]
    fn mono_transitions_carry_no_color_codes() {
        let green = Color::fg("#00FF00").expect("hex");
        let mono = ColorProfile::Mono;
        assert_eq!(red().transition_from_with(&green, mono), "");
        let blue_bg = Color::bg("#0000FF").expect("hex");
        assert_eq!(blue_bg.transition_from_with(&red().with_bg(blue_bg.background()), mono), "\x1b[0m");
        assert_eq!(Color::BOLD.transition_from_with(&red(), mono), "\x1b[0;1m");
        let plain = Color::RESET.with_clean(false);
        assert_eq!(plain.transition_from_with(&plain.clone().with_fg(Some(Rgb::WHITE)), mono), "\x1b[0m");
    }

    // ── properties ──

    mod props {
        use proptest::prelude::*;

        use super::*;

        fn rgb() -> impl Strategy<Value = Option<Rgb>> {
            proptest::option::of(any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Rgb::new(r, g, b)))
        }

        fn color() -> impl Strategy<Value = Color> {
            (rgb(), rgb(), any::<u8>(), proptest::option::of("[a-z]{1,4}")).prop_map(
                |(fg, bg, bits, link)| {
                    Color::RESET
                        .with_clean(false)
                        .with_fg(fg)
                        .with_bg(bg)
                        .with_mods(Mods::from_bits_truncate(bits))
                        .with_link(link.as_deref())
                },
            )
        }

        proptest! {
            #[test]
            fn adding_reset_changes_nothing(c in color()) {
                prop_assert_eq!(c.clone() + Color::RESET, c);
            }

            #[test]
            fn combine_is_associative(a in color(), b in color(), c in color()) {
                prop_assert_eq!((&a + &b) + &c, &a + &(&b + &c));
            }

            #[test]
            fn compose_under_mirrors_combine(a in color(), b in color()) {
                prop_assert_eq!(&a | &b, &b + &a);
            }

            #[test]
            fn transition_to_self_is_empty(c in color()) {
                prop_assert_eq!(&c - &c, "");
            }
        }
    }
}
