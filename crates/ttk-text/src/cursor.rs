#![forbid(unsafe_code)]

//! Multi-cursor selection model.
//!
//! A [`TextCursor`] is a plain value: a list of (anchor, position) pairs over
//! a [`TextDocument`]. It borrows the document only while moving, so edits go
//! through the document (`doc.insert_text(&mut cursor, ..)`) and the cursor
//! never holds a reference back to it.
//!
//! Cursors are kept sorted by selection start and never overlap; adding a
//! cursor that touches another merges the two selections.

use smallvec::{SmallVec, smallvec};
use ttk_style::Color;

use crate::document::TextDocument;
use crate::styled::StyledString;
use crate::wrap::TextWrap;

/// `(line, glyph index)` inside a document. Orders line-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CursorPos {
    pub line: usize,
    pub pos: usize,
}

impl CursorPos {
    pub const fn new(line: usize, pos: usize) -> Self {
        Self { line, pos }
    }
}

/// One cursor: the fixed `anchor` and the moving `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: CursorPos,
    pub position: CursorPos,
}

impl Selection {
    pub const fn caret(at: CursorPos) -> Self {
        Self {
            anchor: at,
            position: at,
        }
    }

    pub fn start(&self) -> CursorPos {
        self.anchor.min(self.position)
    }

    pub fn end(&self) -> CursorPos {
        self.anchor.max(self.position)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveMode {
    /// Collapse the selection onto the new position.
    #[default]
    MoveAnchor,
    /// Extend the selection.
    KeepAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOperation {
    NoMove,
    Start,
    End,
    StartOfLine,
    EndOfLine,
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionType {
    /// The run of word characters around the cursor.
    WordUnderCursor,
    LineUnderCursor,
    /// The line including its line break.
    BlockUnderCursor,
    Document,
}

/// Characters that make up a word for word selection.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | ',' | '.' | '/')
}

fn glyph_is_word(line: &StyledString, index: usize) -> bool {
    line.glyph(index)
        .and_then(|g| g.chars().next())
        .is_some_and(is_word_char)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCursor {
    cursors: SmallVec<[Selection; 1]>,
    current: usize,
    color: Option<Color>,
}

impl Default for TextCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCursor {
    pub fn new() -> Self {
        Self {
            cursors: smallvec![Selection::default()],
            current: 0,
            color: None,
        }
    }

    pub fn at(line: usize, pos: usize) -> Self {
        Self {
            cursors: smallvec![Selection::caret(CursorPos::new(line, pos))],
            current: 0,
            color: None,
        }
    }

    // ── accessors ──

    pub fn position(&self) -> CursorPos {
        self.current().position
    }

    pub fn anchor(&self) -> CursorPos {
        self.current().anchor
    }

    pub fn selection_start(&self) -> CursorPos {
        self.current().start()
    }

    pub fn selection_end(&self) -> CursorPos {
        self.current().end()
    }

    fn current(&self) -> &Selection {
        &self.cursors[self.current.min(self.cursors.len() - 1)]
    }

    /// All cursors in document order.
    pub fn selections(&self) -> &[Selection] {
        &self.cursors
    }

    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn has_selection(&self) -> bool {
        self.cursors.iter().any(Selection::has_selection)
    }

    /// Color given to plain text inserted through this cursor.
    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    // ── cursor set ──

    /// Add a caret; it becomes the current cursor.
    pub fn add_cursor(&mut self, doc: &TextDocument, line: usize, pos: usize) {
        let at = doc.clamp(CursorPos::new(line, pos));
        self.cursors.push(Selection::caret(at));
        self.current = self.cursors.len() - 1;
        self.normalize();
    }

    /// Keep only the current cursor.
    pub fn clear_cursors(&mut self) {
        let keep = *self.current();
        self.cursors = smallvec![keep];
        self.current = 0;
    }

    pub fn clear_selection(&mut self) {
        for c in &mut self.cursors {
            c.anchor = c.position;
        }
    }

    pub(crate) fn selections_mut(&mut self) -> &mut SmallVec<[Selection; 1]> {
        &mut self.cursors
    }

    /// Sort by selection start and merge overlapping cursors, tracking which
    /// one is current.
    pub(crate) fn normalize(&mut self) {
        let current = *self.current();
        let mut sorted: Vec<(bool, Selection)> = self
            .cursors
            .iter()
            .enumerate()
            .map(|(i, s)| (i == self.current, *s))
            .collect();
        sorted.sort_by_key(|(_, s)| (s.start(), s.end()));

        let mut merged: SmallVec<[Selection; 1]> = SmallVec::new();
        let mut current_idx = 0;
        for (is_current, sel) in sorted {
            match merged.last_mut() {
                Some(last) if sel.start() <= last.end() => {
                    if sel.end() > last.end() {
                        if last.position >= last.anchor {
                            last.position = sel.end();
                        } else {
                            last.anchor = sel.end();
                        }
                    }
                    if is_current {
                        current_idx = merged.len() - 1;
                    }
                }
                _ => {
                    if is_current {
                        current_idx = merged.len();
                    }
                    merged.push(sel);
                }
            }
        }
        if merged.is_empty() {
            merged.push(current);
        }
        self.cursors = merged;
        self.current = current_idx.min(self.cursors.len() - 1);
    }

    /// Pull every cursor back inside `doc`.
    pub fn clamp_to(&mut self, doc: &TextDocument) {
        for c in &mut self.cursors {
            c.anchor = doc.clamp(c.anchor);
            c.position = doc.clamp(c.position);
        }
        self.normalize();
    }

    // ── movement ──

    /// Move the current cursor (and only it) to `(line, pos)`, clamped.
    pub fn set_position(&mut self, doc: &TextDocument, line: usize, pos: usize, mode: MoveMode) {
        let at = doc.clamp(CursorPos::new(line, pos));
        let idx = self.current.min(self.cursors.len() - 1);
        let sel = &mut self.cursors[idx];
        sel.position = at;
        if mode == MoveMode::MoveAnchor {
            sel.anchor = at;
        }
        self.normalize();
    }

    /// Apply `op` `n` times to every cursor.
    ///
    /// `Up`/`Down` follow screen lines when a wrap is given, otherwise
    /// document lines.
    pub fn move_position(
        &mut self,
        doc: &TextDocument,
        op: MoveOperation,
        mode: MoveMode,
        n: usize,
        wrap: Option<&TextWrap>,
    ) {
        for _ in 0..n {
            for sel in &mut self.cursors {
                let next = step(doc, sel.position, op, wrap);
                sel.position = next;
                if mode == MoveMode::MoveAnchor {
                    sel.anchor = next;
                }
            }
        }
        self.normalize();
    }

    /// Expand every cursor to a selection of `kind`.
    pub fn select(&mut self, doc: &TextDocument, kind: SelectionType) {
        if kind == SelectionType::Document {
            let end = doc.end_pos();
            self.cursors = smallvec![Selection {
                anchor: CursorPos::default(),
                position: end,
            }];
            self.current = 0;
            return;
        }
        for sel in &mut self.cursors {
            let p = sel.position;
            let line_len = doc.line_len(p.line);
            match kind {
                SelectionType::LineUnderCursor => {
                    sel.anchor = CursorPos::new(p.line, 0);
                    sel.position = CursorPos::new(p.line, line_len);
                }
                SelectionType::BlockUnderCursor => {
                    sel.anchor = CursorPos::new(p.line, 0);
                    sel.position = if p.line + 1 < doc.line_count() {
                        CursorPos::new(p.line + 1, 0)
                    } else {
                        CursorPos::new(p.line, line_len)
                    };
                }
                SelectionType::WordUnderCursor => {
                    let Some(line) = doc.line(p.line) else { continue };
                    let mut from = p.pos;
                    while from > 0 && glyph_is_word(line, from - 1) {
                        from -= 1;
                    }
                    let mut to = p.pos;
                    while to < line_len && glyph_is_word(line, to) {
                        to += 1;
                    }
                    sel.anchor = CursorPos::new(p.line, from);
                    sel.position = CursorPos::new(p.line, to);
                }
                SelectionType::Document => {}
            }
        }
        self.normalize();
    }

    /// Selected text of every cursor, joined with newlines.
    pub fn selected_text(&self, doc: &TextDocument) -> StyledString {
        let mut parts = Vec::new();
        for sel in &self.cursors {
            let (start, end) = (sel.start(), sel.end());
            for l in start.line..=end.line {
                let Some(line) = doc.line(l) else { break };
                let from = if l == start.line { start.pos } else { 0 };
                let to = if l == end.line { end.pos } else { line.len() };
                parts.push(line.substring(from..to));
            }
        }
        StyledString::from("\n").join(&parts)
    }

    /// Lines `from..=to` with every selection recolored and, when several
    /// cursors exist, each caret drawn blinking.
    pub fn highlighted_lines(
        &self,
        doc: &TextDocument,
        from: usize,
        to: usize,
        color: &Color,
    ) -> Vec<StyledString> {
        let to = to.min(doc.line_count().saturating_sub(1));
        if from > to {
            return Vec::new();
        }
        let mut out: Vec<StyledString> = (from..=to)
            .filter_map(|l| doc.line(l).cloned())
            .collect();
        for sel in &self.cursors {
            let (start, end) = (sel.start(), sel.end());
            if end.line < from || start.line > to {
                continue;
            }
            for l in start.line.max(from)..=end.line.min(to) {
                let line = &mut out[l - from];
                let a = if l == start.line { start.pos } else { 0 };
                let b = if l == end.line { end.pos } else { line.len() };
                line.set_color_range(a..b, color);
            }
        }
        if self.cursors.len() > 1 {
            let caret = color.clone() + Color::BLINKING;
            for sel in &self.cursors {
                let p = sel.position;
                if p.line < from || p.line > to {
                    continue;
                }
                let line = &mut out[p.line - from];
                if p.pos >= line.len() {
                    line.push_str("↵", &caret);
                } else {
                    line.set_color_range(p.pos..p.pos + 1, &caret);
                }
            }
        }
        out
    }
}

fn step(doc: &TextDocument, p: CursorPos, op: MoveOperation, wrap: Option<&TextWrap>) -> CursorPos {
    let last_line = doc.line_count().saturating_sub(1);
    match op {
        MoveOperation::NoMove => p,
        MoveOperation::Start => CursorPos::default(),
        MoveOperation::End => doc.end_pos(),
        MoveOperation::StartOfLine => CursorPos::new(p.line, 0),
        MoveOperation::EndOfLine => CursorPos::new(p.line, doc.line_len(p.line)),
        MoveOperation::Right => {
            if p.pos < doc.line_len(p.line) {
                CursorPos::new(p.line, p.pos + 1)
            } else if p.line < last_line {
                CursorPos::new(p.line + 1, 0)
            } else {
                p
            }
        }
        MoveOperation::Left => {
            if p.pos > 0 {
                CursorPos::new(p.line, p.pos - 1)
            } else if p.line > 0 {
                CursorPos::new(p.line - 1, doc.line_len(p.line - 1))
            } else {
                p
            }
        }
        MoveOperation::Up | MoveOperation::Down => {
            let up = op == MoveOperation::Up;
            match wrap {
                Some(wrap) => {
                    let (x, y) = wrap.data_to_screen(doc, p.line, p.pos);
                    let y = if up { y.saturating_sub(1) } else { y + 1 };
                    let (x, y) = wrap.normalize_screen(doc, x, y);
                    wrap.screen_to_data(doc, x, y)
                }
                None => {
                    let line = if up {
                        p.line.saturating_sub(1)
                    } else {
                        (p.line + 1).min(last_line)
                    };
                    doc.clamp(CursorPos::new(line, p.pos))
                }
            }
        }
        MoveOperation::WordLeft => {
            let Some(line) = doc.line(p.line) else { return p };
            if p.pos == 0 {
                return step(doc, p, MoveOperation::Left, wrap);
            }
            let mut pos = p.pos;
            while pos > 0 && !glyph_is_word(line, pos - 1) {
                pos -= 1;
            }
            while pos > 0 && glyph_is_word(line, pos - 1) {
                pos -= 1;
            }
            CursorPos::new(p.line, pos)
        }
        MoveOperation::WordRight => {
            let Some(line) = doc.line(p.line) else { return p };
            let len = line.len();
            if p.pos >= len {
                return step(doc, p, MoveOperation::Right, wrap);
            }
            let mut pos = p.pos;
            while pos < len && !glyph_is_word(line, pos) {
                pos += 1;
            }
            while pos < len && glyph_is_word(line, pos) {
                pos += 1;
            }
            CursorPos::new(p.line, pos)
        }
    }
}
