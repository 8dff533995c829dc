#![forbid(unsafe_code)]

//! Width-aware styled strings.
//!
//! A [`StyledString`] is a sequence of glyph clusters, each with a display
//! width of 0, 1 or 2 columns and its own [`Color`]. Only the first glyph may
//! be zero-width: a zero-width cluster that follows another glyph is merged
//! into it and shares its color.
//!
//! Indices taken by the methods here are glyph indices unless the name says
//! `column`.

use std::fmt;
use std::ops::{Add, AddAssign, Range};

use regex::Regex;
use ttk_core::text_width::{grapheme_width, graphemes};
use ttk_style::{Color, ColorProfile, Mods, Palette, apply_sgr};

/// Horizontal alignment inside a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    /// Widen the gaps between words; falls back to left for a single word.
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphInfo {
    start: usize,
    width: u8,
}

/// Borrowed view of one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRef<'a> {
    pub text: &'a str,
    pub width: usize,
    pub color: &'a Color,
}

/// Text plus one color per glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StyledString {
    text: String,
    glyphs: Vec<GlyphInfo>,
    colors: Vec<Color>,
    width: usize,
}

impl StyledString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every glyph of `text` gets `color`.
    pub fn styled(text: &str, color: Color) -> Self {
        let mut out = Self::new();
        out.push_str(text, &color);
        out
    }

    /// Parse text with embedded `ESC [ … m` and OSC 8 sequences.
    ///
    /// Other escape sequences are dropped. Colors use the default palette.
    pub fn from_ansi(text: &str) -> Self {
        Self::from_ansi_with(text, Color::RESET, &Palette::default())
    }

    pub fn from_ansi_with(text: &str, base: Color, palette: &Palette) -> Self {
        let mut out = Self::new();
        let mut color = base;
        let bytes = text.as_bytes();
        let mut plain_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != 0x1b {
                i += 1;
                continue;
            }
            out.push_str(&text[plain_start..i], &color);
            let (consumed, next) = parse_escape(&text[i..], &color, palette);
            color = next;
            i += consumed;
            plain_start = i;
        }
        out.push_str(&text[plain_start..], &color);
        out
    }

    // ── accessors ──

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn to_plain(&self) -> String {
        self.text.clone()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    fn byte_range(&self, index: usize) -> Range<usize> {
        let start = self.glyphs[index].start;
        let end = self
            .glyphs
            .get(index + 1)
            .map_or(self.text.len(), |g| g.start);
        start..end
    }

    pub fn glyph(&self, index: usize) -> Option<&str> {
        (index < self.glyphs.len()).then(|| &self.text[self.byte_range(index)])
    }

    pub fn glyph_width(&self, index: usize) -> usize {
        self.glyphs.get(index).map_or(0, |g| usize::from(g.width))
    }

    pub fn color_at(&self, index: usize) -> Option<&Color> {
        self.colors.get(index)
    }

    /// Returns `false` when `index` is out of range.
    pub fn set_color_at(&mut self, index: usize, color: Color) -> bool {
        match self.colors.get_mut(index) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    pub fn glyphs(&self) -> impl DoubleEndedIterator<Item = GlyphRef<'_>> + ExactSizeIterator + '_ {
        (0..self.glyphs.len()).map(move |i| GlyphRef {
            text: &self.text[self.byte_range(i)],
            width: usize::from(self.glyphs[i].width),
            color: &self.colors[i],
        })
    }

    /// Display column where glyph `index` starts.
    pub fn column_of(&self, index: usize) -> usize {
        self.glyphs
            .iter()
            .take(index)
            .map(|g| usize::from(g.width))
            .sum()
    }

    // ── building ──

    fn push_glyph(&mut self, glyph: &str, width: usize, color: &Color) {
        if width == 0 && !self.glyphs.is_empty() {
            self.text.push_str(glyph);
            return;
        }
        let width = width.min(2);
        self.glyphs.push(GlyphInfo {
            start: self.text.len(),
            width: u8::try_from(width).unwrap_or(2),
        });
        self.text.push_str(glyph);
        self.colors.push(color.clone());
        self.width += width;
    }

    /// Append plain text in one color.
    pub fn push_str(&mut self, text: &str, color: &Color) {
        for g in graphemes(text) {
            self.push_glyph(g, grapheme_width(g), color);
        }
    }

    pub fn push(&mut self, other: &StyledString) {
        self.text.reserve(other.text.len());
        for g in other.glyphs() {
            self.push_glyph(g.text, g.width, g.color);
        }
    }

    /// Glyphs `range` (clamped).
    pub fn substring(&self, range: Range<usize>) -> StyledString {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let mut out = Self::new();
        for i in start..end {
            out.push_glyph(
                &self.text[self.byte_range(i)],
                usize::from(self.glyphs[i].width),
                &self.colors[i],
            );
        }
        out
    }

    pub fn split_at(&self, index: usize) -> (StyledString, StyledString) {
        (self.substring(0..index), self.substring(index..self.len()))
    }

    /// Insert `other` before glyph `index` (clamped).
    pub fn insert(&mut self, index: usize, other: &StyledString) {
        let (mut head, tail) = self.split_at(index);
        head.push(other);
        head.push(&tail);
        *self = head;
    }

    /// Remove glyphs `range` (clamped) and return them.
    pub fn remove(&mut self, range: Range<usize>) -> StyledString {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let removed = self.substring(start..end);
        let mut head = self.substring(0..start);
        head.push(&self.substring(end..self.len()));
        *self = head;
        removed
    }

    /// Columns `[from, to)`. A wide glyph cut by either edge becomes spaces
    /// in its own color.
    pub fn slice_columns(&self, from: usize, to: usize) -> StyledString {
        let mut out = Self::new();
        let mut col = 0;
        for g in self.glyphs() {
            let start = col;
            let end = col + g.width;
            col = end;
            if start >= to {
                break;
            }
            if start >= from && end <= to {
                out.push_glyph(g.text, g.width, g.color);
            } else if end > from {
                let covered = end.min(to) - start.max(from);
                for _ in 0..covered {
                    out.push_glyph(" ", 1, g.color);
                }
            }
        }
        out
    }

    /// Pad or truncate to exactly `width` columns.
    pub fn align(&self, width: usize, pad: &Color, alignment: Alignment) -> StyledString {
        if width == self.width {
            return self.clone();
        }
        if width < self.width {
            return self.slice_columns(0, width);
        }
        let extra = width - self.width;
        let spaces = |n: usize| StyledString::styled(&" ".repeat(n), pad.clone());
        match alignment {
            Alignment::Left => self.clone() + spaces(extra),
            Alignment::Right => spaces(extra) + self,
            Alignment::Center => {
                let left = extra / 2;
                spaces(left) + self + spaces(extra - left)
            }
            Alignment::Justify => self.justify(extra, pad),
        }
    }

    fn justify(&self, extra: usize, pad: &Color) -> StyledString {
        let first = self.glyphs().position(|g| g.text != " ");
        let last = self.glyphs().rposition(|g| g.text != " ");
        let gaps: Vec<usize> = match (first, last) {
            (Some(first), Some(last)) => (first..last)
                .filter(|&i| self.glyph(i) == Some(" ") && self.glyph(i + 1) != Some(" "))
                .collect(),
            _ => Vec::new(),
        };
        if gaps.is_empty() {
            return self.align(self.width + extra, pad, Alignment::Left);
        }
        let per_gap = extra / gaps.len();
        let mut remainder = extra % gaps.len();
        let mut out = Self::new();
        for (i, g) in self.glyphs().enumerate() {
            out.push_glyph(g.text, g.width, g.color);
            if gaps.contains(&i) {
                let mut n = per_gap;
                if remainder > 0 {
                    n += 1;
                    remainder -= 1;
                }
                for _ in 0..n {
                    out.push_glyph(" ", 1, pad);
                }
            }
        }
        out
    }

    // ── coloring ──

    #[must_use]
    pub fn with_color(mut self, color: &Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn set_color(&mut self, color: &Color) {
        for c in &mut self.colors {
            *c = color.clone();
        }
    }

    /// Recolor glyphs `range` (clamped); other glyphs keep their colors.
    pub fn set_color_range(&mut self, range: Range<usize>, color: &Color) {
        let end = range.end.min(self.len());
        for c in &mut self.colors[range.start.min(end)..end] {
            *c = color.clone();
        }
    }

    /// Recolor every occurrence of `needle`. Returns the match count.
    pub fn set_color_match(&mut self, needle: &str, color: &Color) -> usize {
        if needle.is_empty() {
            return 0;
        }
        let ranges: Vec<Range<usize>> = self
            .text
            .match_indices(needle)
            .map(|(b, m)| self.glyph_span(b..b + m.len()))
            .collect();
        for r in &ranges {
            self.set_color_range(r.clone(), color);
        }
        ranges.len()
    }

    /// Recolor every match of `re`. Returns the match count.
    pub fn set_color_regex(&mut self, re: &Regex, color: &Color) -> usize {
        let ranges = self.find_all(re);
        for r in &ranges {
            self.set_color_range(r.clone(), color);
        }
        ranges.len()
    }

    /// Fill in only the channels each glyph is missing.
    pub fn complete_color(&mut self, color: &Color) {
        for c in &mut self.colors {
            *c = c.compose_under(color);
        }
    }

    pub fn complete_color_range(&mut self, range: Range<usize>, color: &Color) {
        let end = range.end.min(self.len());
        for c in &mut self.colors[range.start.min(end)..end] {
            *c = c.compose_under(color);
        }
    }

    // ── tabs ──

    /// Expand tabs onto a `tab_spaces` grid; the spaces take the tab's color.
    pub fn tab_to_spaces(&self, tab_spaces: usize) -> StyledString {
        let tab_spaces = tab_spaces.max(1);
        if !self.text.contains('\t') {
            return self.clone();
        }
        let mut out = Self::new();
        for g in self.glyphs() {
            if g.text == "\t" {
                let n = tab_spaces - out.width % tab_spaces;
                for _ in 0..n {
                    out.push_glyph(" ", 1, g.color);
                }
            } else {
                out.push_glyph(g.text, g.width, g.color);
            }
        }
        out
    }

    pub fn to_plain_with_tabs(&self, tab_spaces: usize) -> String {
        self.tab_to_spaces(tab_spaces).text
    }

    /// Glyph index under display column `column` once tabs are expanded.
    ///
    /// A column inside a tab's run maps to the tab, or to the glyph after it
    /// when `align_right` is set.
    pub fn tab_char_pos(&self, column: usize, tab_spaces: usize, align_right: bool) -> usize {
        let tab_spaces = tab_spaces.max(1);
        let mut pos = 0;
        for (i, g) in self.glyphs().enumerate() {
            let start = pos;
            let is_tab = g.text == "\t";
            pos += if is_tab {
                tab_spaces - pos % tab_spaces
            } else {
                g.width
            };
            if column < pos {
                return if is_tab && align_right && column > start {
                    i + 1
                } else {
                    i
                };
            }
        }
        self.len()
    }

    /// Display width once tabs are expanded.
    pub fn width_with_tabs(&self, tab_spaces: usize) -> usize {
        if self.text.contains('\t') {
            self.tab_to_spaces(tab_spaces).width
        } else {
            self.width
        }
    }

    // ── split / join ──

    /// Split on glyphs equal to `separator`. A `\r\n` glyph counts as a
    /// `'\n'` separator.
    pub fn split(&self, separator: char) -> Vec<StyledString> {
        let mut buf = [0u8; 4];
        let sep: &str = separator.encode_utf8(&mut buf);
        let mut out = Vec::new();
        let mut from = 0;
        for (i, g) in self.glyphs().enumerate() {
            if g.text == sep || (separator == '\n' && g.text == "\r\n") {
                out.push(self.substring(from..i));
                from = i + 1;
            }
        }
        out.push(self.substring(from..self.len()));
        out
    }

    pub fn lines(&self) -> Vec<StyledString> {
        self.split('\n')
    }

    /// Concatenate `parts` with `self` between them.
    pub fn join<'a, I>(&self, parts: I) -> StyledString
    where
        I: IntoIterator<Item = &'a StyledString>,
    {
        let mut out = Self::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push(self);
            }
            out.push(part);
        }
        out
    }

    // ── search ──

    fn glyph_at_byte(&self, byte: usize) -> usize {
        self.glyphs
            .partition_point(|g| g.start <= byte)
            .saturating_sub(1)
    }

    fn glyph_span(&self, bytes: Range<usize>) -> Range<usize> {
        let start = self.glyph_at_byte(bytes.start);
        let end = self.glyphs.partition_point(|g| g.start < bytes.end);
        start..end.max(start)
    }

    /// Glyph index of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.text.find(needle).map(|b| self.glyph_at_byte(b))
    }

    /// First match of `re`, as a glyph range.
    pub fn search(&self, re: &Regex) -> Option<Range<usize>> {
        re.find(&self.text).map(|m| self.glyph_span(m.range()))
    }

    /// Non-empty matches of `re`, as glyph ranges.
    pub fn find_all(&self, re: &Regex) -> Vec<Range<usize>> {
        re.find_iter(&self.text)
            .filter(|m| !m.is_empty())
            .map(|m| self.glyph_span(m.range()))
            .collect()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.text.ends_with(suffix)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Strip leading and trailing whitespace glyphs.
    pub fn trim(&self) -> StyledString {
        let is_ws = |g: &GlyphRef<'_>| g.text.chars().all(char::is_whitespace);
        let Some(first) = self.glyphs().position(|g| !is_ws(&g)) else {
            return Self::new();
        };
        let last = self.glyphs().rposition(|g| !is_ws(&g)).unwrap_or(first);
        self.substring(first..last + 1)
    }

    /// Replace every `old` with `new`.
    ///
    /// Replacement glyphs take the colors of the glyphs they replace, in
    /// order; surplus glyphs repeat the last replaced color.
    pub fn replace(&self, old: &str, new: &str) -> StyledString {
        if old.is_empty() || !self.text.contains(old) {
            return self.clone();
        }
        let mut out = Self::new();
        let mut cursor = 0;
        for (b, m) in self.text.match_indices(old) {
            self.push_bytes(&mut out, cursor..b);
            let span = self.glyph_span(b..b + m.len());
            let colors = &self.colors[span];
            for (k, g) in graphemes(new).enumerate() {
                let color = colors
                    .get(k)
                    .or_else(|| colors.last())
                    .cloned()
                    .unwrap_or_default();
                out.push_glyph(g, grapheme_width(g), &color);
            }
            cursor = b + m.len();
        }
        self.push_bytes(&mut out, cursor..self.text.len());
        out
    }

    fn push_bytes(&self, out: &mut StyledString, bytes: Range<usize>) {
        if bytes.is_empty() {
            return;
        }
        let mut offset = bytes.start;
        for g in graphemes(&self.text[bytes]) {
            let color = self.colors[self.glyph_at_byte(offset)].clone();
            out.push_glyph(g, grapheme_width(g), &color);
            offset += g.len();
        }
    }

    /// Turn `&x` into an underlined `x` and collect the shortcut chars.
    pub fn extract_shortcuts(&self) -> (StyledString, Vec<char>) {
        let mut out = Self::new();
        let mut shortcuts = Vec::new();
        let mut glyphs = self.glyphs();
        while let Some(g) = glyphs.next() {
            if g.text == "&" {
                if let Some(next) = glyphs.next() {
                    if let Some(ch) = next.text.chars().next() {
                        shortcuts.push(ch);
                    }
                    let color = next.color.clone().with_mods(next.color.modifiers() | Mods::UNDERLINE);
                    out.push_glyph(next.text, next.width, &color);
                    continue;
                }
            }
            out.push_glyph(g.text, g.width, g.color);
        }
        (out, shortcuts)
    }

    // ── serialization ──

    /// Text with a color transition wherever the color changes, ending in a
    /// reset when the last color is not the default.
    pub fn to_ansi(&self) -> String {
        self.to_ansi_with(ColorProfile::TrueColor)
    }

    pub fn to_ansi_with(&self, profile: ColorProfile) -> String {
        let mut out = String::with_capacity(self.text.len() + 16);
        let mut current = Color::RESET;
        for g in self.glyphs() {
            if *g.color != current {
                g.color.write_transition(&current, profile, &mut out);
                current = g.color.clone();
            }
            out.push_str(g.text);
        }
        if current != Color::RESET {
            Color::RESET.write_transition(&current, profile, &mut out);
        }
        out
    }
}

/// Consume one escape sequence at the start of `s`. Returns the bytes used
/// and the color after applying it.
fn parse_escape(s: &str, color: &Color, palette: &Palette) -> (usize, Color) {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        Some(b'[') => {
            let Some(end) = bytes[2..].iter().position(|b| (0x40..=0x7e).contains(b)) else {
                return (bytes.len(), color.clone());
            };
            let final_at = 2 + end;
            if bytes[final_at] != b'm' {
                return (final_at + 1, color.clone());
            }
            let params: Vec<u16> = s[2..final_at]
                .split([';', ':'])
                .map(|p| p.parse::<u16>().unwrap_or(0))
                .collect();
            let params = if s[2..final_at].is_empty() { Vec::new() } else { params };
            (final_at + 1, apply_sgr(color, &params, palette))
        }
        Some(b']') => {
            let body_start = 2;
            let (body_end, consumed) = match s[body_start..].find(['\x07', '\x1b']) {
                Some(rel) => {
                    let at = body_start + rel;
                    let used = if bytes[at] == 0x1b && bytes.get(at + 1) == Some(&b'\\') {
                        at + 2
                    } else {
                        at + 1
                    };
                    (at, used)
                }
                None => (bytes.len(), bytes.len()),
            };
            let body = &s[body_start..body_end];
            let next = match body.strip_prefix("8;") {
                Some(rest) => {
                    let url = rest.split_once(';').map_or("", |(_, url)| url);
                    color.clone().with_link((!url.is_empty()).then_some(url))
                }
                None => color.clone(),
            };
            (consumed, next)
        }
        Some(b) => {
            let len = if b.is_ascii() { 2 } else { 1 };
            (len, color.clone())
        }
        None => (1, color.clone()),
    }
}

impl fmt::Display for StyledString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for StyledString {
    fn from(text: &str) -> Self {
        Self::styled(text, Color::RESET)
    }
}

impl From<String> for StyledString {
    fn from(text: String) -> Self {
        Self::styled(&text, Color::RESET)
    }
}

impl Add for StyledString {
    type Output = StyledString;

    fn add(mut self, rhs: StyledString) -> StyledString {
        self.push(&rhs);
        self
    }
}

impl Add<&StyledString> for StyledString {
    type Output = StyledString;

    fn add(mut self, rhs: &StyledString) -> StyledString {
        self.push(rhs);
        self
    }
}

impl Add<&StyledString> for &StyledString {
    type Output = StyledString;

    fn add(self, rhs: &StyledString) -> StyledString {
        let mut out = self.clone();
        out.push(rhs);
        out
    }
}

impl Add<&str> for StyledString {
    type Output = StyledString;

    fn add(mut self, rhs: &str) -> StyledString {
        self.push_str(rhs, &Color::RESET);
        self
    }
}

impl AddAssign<&StyledString> for StyledString {
    fn add_assign(&mut self, rhs: &StyledString) {
        self.push(rhs);
    }
}

impl AddAssign<&str> for StyledString {
    fn add_assign(&mut self, rhs: &str) {
        self.push_str(rhs, &Color::RESET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ttk_style::Rgb;

    fn red() -> Color {
        Color::fg_rgb(Rgb::new(0xff, 0, 0))
    }

    // ── construction ──

    #[test]
    fn empty_string() {
        let s = StyledString::new();
        assert_eq!(s.width(), 0);
        assert!(s.is_empty());
        assert_eq!(s.to_ansi(), "");
    }

    #[test]
    fn wide_and_combining_glyphs() {
        let s = StyledString::from("a界e\u{301}");
        assert_eq!(s.len(), 3);
        assert_eq!(s.width(), 4);
        assert_eq!(s.glyph(2), Some("e\u{301}"));
        assert_eq!(s.colors().len(), s.len());
    }

    #[test]
    fn zero_width_attaches_to_previous() {
        let mut s = StyledString::styled("a", red());
        s.push(&StyledString::from("\u{200b}"));
        assert_eq!(s.len(), 1);
        assert_eq!(s.color_at(0), Some(&red()));
        assert_eq!(s.as_str(), "a\u{200b}");
    }

    #[test]
    fn from_ansi_maps_palette_red() {
        let s = StyledString::from_ansi("x\x1b[31my\x1b[0mz");
        assert_eq!(s.as_str(), "xyz");
        assert_eq!(s.color_at(0).and_then(Color::foreground), None);
        assert_eq!(
            s.color_at(1).and_then(Color::foreground),
            Some(Rgb::new(0xaa, 0, 0))
        );
        assert_eq!(s.color_at(2).and_then(Color::foreground), None);
    }

    #[test]
    fn from_ansi_hyperlink() {
        let s = StyledString::from_ansi("\x1b]8;;http://x\x1b\\go\x1b]8;;\x1b\\!");
        assert_eq!(s.as_str(), "go!");
        assert_eq!(s.color_at(0).and_then(Color::hyperlink), Some("http://x"));
        assert_eq!(s.color_at(2).and_then(Color::hyperlink), None);
    }

    // ── slicing ──

    #[test]
    fn slice_never_splits_wide() {
        let s = StyledString::styled("a界b", red());
        let cut = s.slice_columns(0, 2);
        assert_eq!(cut.as_str(), "a ");
        assert_eq!(cut.color_at(1), Some(&red()));
        assert_eq!(s.slice_columns(2, 4).as_str(), " b");
        assert_eq!(s.slice_columns(1, 3).as_str(), "界");
    }

    #[test]
    fn substring_and_split_at() {
        let s = StyledString::from("hello");
        let (a, b) = s.split_at(2);
        assert_eq!(a.as_str(), "he");
        assert_eq!(b.as_str(), "llo");
        assert_eq!(s.substring(3..99).as_str(), "lo");
    }

    // ── alignment ──

    #[test]
    fn align_variants() {
        let s = StyledString::from("ab");
        let pad = Color::RESET;
        assert_eq!(s.align(5, &pad, Alignment::Left).as_str(), "ab   ");
        assert_eq!(s.align(5, &pad, Alignment::Right).as_str(), "   ab");
        assert_eq!(s.align(5, &pad, Alignment::Center).as_str(), " ab  ");
        assert_eq!(s.align(1, &pad, Alignment::Center).as_str(), "a");
    }

    #[test]
    fn justify_spreads_gaps() {
        let s = StyledString::from("a b c");
        let j = s.align(9, &Color::RESET, Alignment::Justify);
        assert_eq!(j.as_str(), "a   b   c");
        let single = StyledString::from("word");
        assert_eq!(single.align(6, &Color::RESET, Alignment::Justify).as_str(), "word  ");
    }

    // ── coloring ──

    #[test]
    fn color_by_literal_and_regex() {
        let mut s = StyledString::from("foo bar foo");
        assert_eq!(s.set_color_match("foo", &red()), 2);
        assert_eq!(s.color_at(0), Some(&red()));
        assert_eq!(s.color_at(4), Some(&Color::RESET));
        assert_eq!(s.color_at(10), Some(&red()));

        let re = Regex::new(r"b\w+").unwrap();
        let mut t = StyledString::from("foo bar");
        assert_eq!(t.set_color_regex(&re, &Color::BOLD), 1);
        assert_eq!(t.color_at(3), Some(&Color::RESET));
        assert_eq!(t.color_at(4), Some(&Color::BOLD));
    }

    #[test]
    fn recolor_keeps_glyph_count() {
        let mut s = StyledString::from("a界b");
        s.set_color_range(1..2, &red());
        assert_eq!(s.len(), 3);
        assert_eq!(s.as_str(), "a界b");
    }

    #[test]
    fn complete_color_fills_gaps_only() {
        let mut s = StyledString::styled("x", red());
        s.complete_color(&Color::bg_rgb(Rgb::new(0, 0, 255)).with_fg(Some(Rgb::WHITE)));
        let c = s.color_at(0).cloned().unwrap_or_default();
        assert_eq!(c.foreground(), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(c.background(), Some(Rgb::new(0, 0, 255)));
    }

    // ── tabs ──

    #[test]
    fn tab_expansion() {
        let s = StyledString::from("ab\tc\td");
        assert_eq!(s.tab_to_spaces(4).as_str(), "ab  c   d");
        assert_eq!(s.width_with_tabs(4), 9);
    }

    #[test]
    fn tab_char_pos_maps_back() {
        let s = StyledString::from("ab\tc");
        assert_eq!(s.tab_char_pos(0, 4, false), 0);
        assert_eq!(s.tab_char_pos(2, 4, false), 2);
        assert_eq!(s.tab_char_pos(3, 4, false), 2);
        assert_eq!(s.tab_char_pos(3, 4, true), 3);
        assert_eq!(s.tab_char_pos(4, 4, false), 3);
        assert_eq!(s.tab_char_pos(40, 4, false), 4);
    }

    // ── split / join ──

    #[test]
    fn split_join_preserve_colors() {
        let mut s = StyledString::from("a,b,c");
        s.set_color_range(2..3, &red());
        let parts = s.split(',');
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].color_at(0), Some(&red()));
        let joined = StyledString::from(",").join(&parts);
        assert_eq!(joined, s);
        assert_eq!(StyledString::from("").split(',').len(), 1);
    }

    // ── search / replace ──

    #[test]
    fn find_is_glyph_indexed() {
        let s = StyledString::from("界x");
        assert_eq!(s.find("x"), Some(1));
        assert_eq!(s.find("y"), None);
    }

    #[test]
    fn replace_carries_colors() {
        let mut s = StyledString::from("a--b");
        s.set_color_range(1..3, &red());
        let r = s.replace("--", "===");
        assert_eq!(r.as_str(), "a===b");
        assert_eq!(r.color_at(3), Some(&red()));
        assert_eq!(r.color_at(4), Some(&Color::RESET));
        let shorter = s.replace("--", "");
        assert_eq!(shorter.as_str(), "ab");
    }

    #[test]
    fn trim_whitespace() {
        assert_eq!(StyledString::from("  hi there \t").trim().as_str(), "hi there");
        assert!(StyledString::from("   ").trim().is_empty());
    }

    #[test]
    fn shortcuts_are_underlined() {
        let (s, keys) = StyledString::from("&File &Edit").extract_shortcuts();
        assert_eq!(s.as_str(), "File Edit");
        assert_eq!(keys, vec!['F', 'E']);
        assert!(s.color_at(0).is_some_and(|c| c.modifiers().contains(Mods::UNDERLINE)));
        assert!(s.color_at(1).is_some_and(|c| c.modifiers().is_empty()));
    }

    // ── serialization ──

    #[test]
    fn ansi_run_length() {
        let s = StyledString::styled("ab", red()) + StyledString::from("c");
        assert_eq!(s.to_ansi(), "\x1b[38;2;255;0;0mab\x1b[0mc");
        assert_eq!(StyledString::from("plain").to_ansi(), "plain");
    }

    #[test]
    fn ansi_round_trips_through_parser() {
        let mut s = StyledString::from("hello world");
        s.set_color_range(0..5, &red().with_mods(Mods::BOLD));
        let back = StyledString::from_ansi(&s.to_ansi());
        assert_eq!(back.as_str(), s.as_str());
        assert_eq!(back.color_at(0).and_then(Color::foreground), Some(Rgb::new(255, 0, 0)));
        assert!(back.color_at(0).is_some_and(Color::has_bold));
        assert_eq!(back.color_at(6).and_then(Color::foreground), None);
    }

    // ── properties ──

    fn arb_string() -> impl Strategy<Value = StyledString> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["a", "Z", " ", "界", "é", "e\u{301}", "\t", "😀", "\u{200b}"]),
                any::<bool>(),
            ),
            0..12,
        )
        .prop_map(|parts| {
            let mut s = StyledString::new();
            for (g, bold) in parts {
                let color = if bold { Color::BOLD } else { Color::RESET };
                s.push_str(g, &color);
            }
            s
        })
    }

    proptest! {
        #[test]
        fn width_is_additive(a in arb_string(), b in arb_string()) {
            prop_assert_eq!((&a + &b).width(), a.width() + b.width());
        }

        #[test]
        fn colors_track_glyphs(a in arb_string(), b in arb_string()) {
            let s = &a + &b;
            prop_assert_eq!(s.colors().len(), s.len());
        }

        #[test]
        fn slice_width_is_exact(s in arb_string(), from in 0usize..10, len in 0usize..10) {
            let to = (from + len).min(s.width());
            let from = from.min(to);
            prop_assert_eq!(s.slice_columns(from, to).width(), to - from);
        }

        #[test]
        fn align_hits_target_width(s in arb_string(), w in 0usize..20) {
            for a in [Alignment::Left, Alignment::Right, Alignment::Center, Alignment::Justify] {
                prop_assert_eq!(s.align(w, &Color::RESET, a).width(), w);
            }
        }
    }
}
