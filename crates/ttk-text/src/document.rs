#![forbid(unsafe_code)]

//! Line-oriented editable text.
//!
//! [`TextDocument`] stores one [`StyledString`] per line (never zero lines)
//! and applies edits for every cursor of a [`TextCursor`]. Cursors are edited
//! right-to-left so the positions of cursors still waiting to be processed
//! stay valid; cursors already processed are shifted by each later edit.
//!
//! Before every mutation the lines and the cursor are pushed onto a bounded
//! undo ring. `undo` swaps them back in.
//!
//! Every mutation emits `contents_changed` and then `contents_change` with the
//! first touched line, the number of lines replaced, and the number of lines
//! that replaced them.

use std::collections::VecDeque;
use std::mem;

use regex::Regex;
use tracing::trace;
use ttk_core::signal::{Signal, SlotResult};
use ttk_style::Color;

use crate::cursor::{CursorPos, Selection, TextCursor};
use crate::styled::StyledString;

/// Default depth of the undo ring.
pub const DEFAULT_UNDO_DEPTH: usize = 256;

/// Argument of `contents_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentsChange {
    pub line: usize,
    pub removed: usize,
    pub added: usize,
}

#[derive(Debug, Clone)]
struct Snapshot {
    lines: Vec<StyledString>,
    cursor: TextCursor,
}

#[derive(Debug)]
pub struct TextDocument {
    lines: Vec<StyledString>,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    undo_depth: usize,
    modified: bool,
    pub contents_change: Signal<ContentsChange>,
    pub contents_changed: Signal<()>,
    pub cursor_position_changed: Signal<CursorPos>,
    pub undo_available: Signal<bool>,
    pub redo_available: Signal<bool>,
    pub modification_changed: Signal<bool>,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn split_lines(text: &str) -> Vec<StyledString> {
    text.split('\n')
        .map(|l| StyledString::from(l.strip_suffix('\r').unwrap_or(l)))
        .collect()
}

impl TextDocument {
    /// One empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![StyledString::new()],
            undo: VecDeque::new(),
            redo: Vec::new(),
            undo_depth: DEFAULT_UNDO_DEPTH,
            modified: false,
            contents_change: Signal::new("contentsChange"),
            contents_changed: Signal::new("contentsChanged"),
            cursor_position_changed: Signal::new("cursorPositionChanged"),
            undo_available: Signal::new("undoAvailable"),
            redo_available: Signal::new("redoAvailable"),
            modification_changed: Signal::new("modificationChanged"),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.lines = split_lines(text);
        doc
    }

    pub fn from_styled(text: &StyledString) -> Self {
        let mut doc = Self::new();
        doc.lines = text.lines();
        doc
    }

    #[must_use]
    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth.max(1);
        self
    }

    // ── queries ──

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&StyledString> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[StyledString] {
        &self.lines
    }

    /// Glyph count of line `index`, 0 past the end.
    pub fn line_len(&self, index: usize) -> usize {
        self.lines.get(index).map_or(0, StyledString::len)
    }

    /// Glyphs plus one per line break.
    pub fn character_count(&self) -> usize {
        self.lines.iter().map(StyledString::len).sum::<usize>() + self.lines.len() - 1
    }

    /// The last valid position.
    pub fn end_pos(&self) -> CursorPos {
        let last = self.lines.len() - 1;
        CursorPos::new(last, self.line_len(last))
    }

    /// Nearest valid position to `p`.
    pub fn clamp(&self, p: CursorPos) -> CursorPos {
        let line = p.line.min(self.lines.len() - 1);
        CursorPos::new(line, p.pos.min(self.line_len(line)))
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) -> SlotResult {
        if self.modified == modified {
            return Ok(());
        }
        self.modified = modified;
        self.modification_changed.emit(&modified)
    }

    pub fn is_undo_available(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn is_redo_available(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for (i, l) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(l.as_str());
        }
        out
    }

    pub fn to_ansi(&self) -> String {
        self.lines
            .iter()
            .map(StyledString::to_ansi)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_styled(&self) -> StyledString {
        StyledString::from("\n").join(&self.lines)
    }

    /// First occurrence of `needle` at or after the start of the document.
    pub fn find(&self, needle: &str) -> Option<CursorPos> {
        self.lines
            .iter()
            .enumerate()
            .find_map(|(i, l)| l.find(needle).map(|pos| CursorPos::new(i, pos)))
    }

    /// Every match of `re`, line by line, as `(start, end)` positions.
    pub fn find_regex(&self, re: &Regex) -> Vec<(CursorPos, CursorPos)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(i, l)| {
                l.find_all(re)
                    .into_iter()
                    .map(move |r| (CursorPos::new(i, r.start), CursorPos::new(i, r.end)))
            })
            .collect()
    }

    // ── whole-document replacement ──

    /// Replace all text. Clears the undo history.
    pub fn set_text(&mut self, text: &str) -> SlotResult {
        self.replace_all(split_lines(text))
    }

    pub fn set_styled_text(&mut self, text: &StyledString) -> SlotResult {
        self.replace_all(text.lines())
    }

    fn replace_all(&mut self, lines: Vec<StyledString>) -> SlotResult {
        let removed = self.lines.len();
        self.lines = lines;
        self.undo.clear();
        self.redo.clear();
        self.contents_changed.emit(&())?;
        self.contents_change.emit(&ContentsChange {
            line: 0,
            removed,
            added: self.lines.len(),
        })?;
        self.set_modified(false)
    }

    /// Append lines at the end. Clears the undo history.
    pub fn append_text(&mut self, text: &str) -> SlotResult {
        self.append_lines(split_lines(text))
    }

    pub fn append_styled(&mut self, text: &StyledString) -> SlotResult {
        self.append_lines(text.lines())
    }

    fn append_lines(&mut self, lines: Vec<StyledString>) -> SlotResult {
        let old = self.lines.len();
        let added = lines.len();
        self.lines.extend(lines);
        self.undo.clear();
        self.redo.clear();
        self.contents_changed.emit(&())?;
        self.contents_change.emit(&ContentsChange {
            line: old,
            removed: 0,
            added,
        })
    }

    // ── cursor edits ──

    fn position_color(&self, p: CursorPos) -> Color {
        let line = &self.lines[p.line];
        line.color_at(p.pos.saturating_sub(1))
            .cloned()
            .unwrap_or_default()
    }

    /// Per-cursor insertion texts. When `text` has exactly one line per
    /// cursor (and there are several cursors), each cursor gets its own line.
    fn distribute(&self, cursor: &TextCursor, text: &StyledString) -> Vec<StyledString> {
        let count = cursor.cursor_count();
        let lines = text.lines();
        if count > 1 && lines.len() == count {
            lines
        } else {
            vec![text.clone(); count]
        }
    }

    /// Insert plain text at every cursor, replacing selections. Inserted
    /// glyphs take the cursor's color, or the color of the glyph before the
    /// caret.
    pub fn insert_text(&mut self, cursor: &mut TextCursor, text: &str) -> SlotResult {
        let texts: Vec<StyledString> = {
            let plain = StyledString::from(text);
            self.distribute(cursor, &plain)
                .into_iter()
                .zip(cursor.selections())
                .map(|(t, sel)| {
                    let color = cursor
                        .color()
                        .cloned()
                        .unwrap_or_else(|| self.position_color(self.clamp(sel.start())));
                    t.with_color(&color)
                })
                .collect()
        };
        self.edit(cursor, texts)
    }

    /// Insert styled text at every cursor, replacing selections.
    pub fn insert_styled(&mut self, cursor: &mut TextCursor, text: &StyledString) -> SlotResult {
        let texts = self.distribute(cursor, text);
        self.edit(cursor, texts)
    }

    /// Delete every cursor's selection. No-op without a selection.
    pub fn remove_selected_text(&mut self, cursor: &mut TextCursor) -> SlotResult {
        if !cursor.has_selection() {
            return Ok(());
        }
        let texts = vec![StyledString::new(); cursor.cursor_count()];
        self.edit(cursor, texts)
    }

    /// Delete the glyph before every caret (or the selections).
    pub fn delete_backward(&mut self, cursor: &mut TextCursor) -> SlotResult {
        if cursor.has_selection() {
            return self.remove_selected_text(cursor);
        }
        cursor.clamp_to(self);
        let before = cursor.clone();
        let extended: Vec<Selection> = cursor
            .selections()
            .iter()
            .map(|s| Selection {
                anchor: self.step_back(s.position),
                position: s.position,
            })
            .collect();
        if extended.iter().all(|s| !s.has_selection()) {
            return Ok(());
        }
        *cursor.selections_mut() = extended.into_iter().collect();
        cursor.normalize();
        let texts = vec![StyledString::new(); cursor.cursor_count()];
        self.edit_from(cursor, texts, before)
    }

    /// Delete the glyph after every caret (or the selections).
    pub fn delete_forward(&mut self, cursor: &mut TextCursor) -> SlotResult {
        if cursor.has_selection() {
            return self.remove_selected_text(cursor);
        }
        cursor.clamp_to(self);
        let before = cursor.clone();
        let extended: Vec<Selection> = cursor
            .selections()
            .iter()
            .map(|s| Selection {
                anchor: s.position,
                position: self.step_forward(s.position),
            })
            .collect();
        if extended.iter().all(|s| !s.has_selection()) {
            return Ok(());
        }
        *cursor.selections_mut() = extended.into_iter().collect();
        cursor.normalize();
        let texts = vec![StyledString::new(); cursor.cursor_count()];
        self.edit_from(cursor, texts, before)
    }

    fn step_back(&self, p: CursorPos) -> CursorPos {
        if p.pos > 0 {
            CursorPos::new(p.line, p.pos - 1)
        } else if p.line > 0 {
            CursorPos::new(p.line - 1, self.line_len(p.line - 1))
        } else {
            p
        }
    }

    fn step_forward(&self, p: CursorPos) -> CursorPos {
        if p.pos < self.line_len(p.line) {
            CursorPos::new(p.line, p.pos + 1)
        } else if p.line + 1 < self.lines.len() {
            CursorPos::new(p.line + 1, 0)
        } else {
            p
        }
    }

    /// Recolor every selection.
    pub fn apply_color(&mut self, cursor: &TextCursor, color: &Color) -> SlotResult {
        if !cursor.has_selection() {
            return Ok(());
        }
        self.push_undo(cursor.clone());
        for sel in cursor.selections() {
            let (start, end) = (self.clamp(sel.start()), self.clamp(sel.end()));
            for l in start.line..=end.line {
                let line = &mut self.lines[l];
                let from = if l == start.line { start.pos } else { 0 };
                let to = if l == end.line { end.pos } else { line.len() };
                line.set_color_range(from..to, color);
            }
        }
        self.after_edit(cursor, None)
    }

    fn push_undo(&mut self, cursor: TextCursor) {
        self.undo.push_back(Snapshot {
            lines: self.lines.clone(),
            cursor,
        });
        while self.undo.len() > self.undo_depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Replace each cursor's selection with the matching text, right to left.
    fn edit(&mut self, cursor: &mut TextCursor, texts: Vec<StyledString>) -> SlotResult {
        cursor.clamp_to(self);
        let before = cursor.clone();
        self.edit_from(cursor, texts, before)
    }

    /// Like `edit`, recording `before` as the cursor to restore on undo.
    fn edit_from(
        &mut self,
        cursor: &mut TextCursor,
        texts: Vec<StyledString>,
        before: TextCursor,
    ) -> SlotResult {
        self.push_undo(before);

        let old_count = self.lines.len();
        let sels: Vec<Selection> = cursor.selections().to_vec();
        let first = sels.iter().map(|s| s.start().line).min().unwrap_or(0);
        let last = sels.iter().map(|s| s.end().line).max().unwrap_or(0);

        let mut done: Vec<Selection> = sels.clone();
        for (i, text) in texts.iter().enumerate().take(sels.len()).rev() {
            let (start, end) = (sels[i].start(), sels[i].end());
            let new_end = self.replace_range(start, end, text);
            done[i] = Selection::caret(new_end);
            for later in &mut done[i + 1..] {
                later.anchor = shift(later.anchor, end, new_end);
                later.position = shift(later.position, end, new_end);
            }
        }
        *cursor.selections_mut() = done.into_iter().collect();
        cursor.normalize();

        let removed = last - first + 1;
        let added = (removed + self.lines.len()).saturating_sub(old_count);
        trace!(line = first, removed, added, "document edit");
        self.after_edit(
            cursor,
            Some(ContentsChange {
                line: first,
                removed,
                added,
            }),
        )
    }

    /// Replace `[start, end)` with `text`; returns the position after it.
    fn replace_range(&mut self, start: CursorPos, end: CursorPos, text: &StyledString) -> CursorPos {
        let head = self.lines[start.line].substring(0..start.pos);
        let tail_line = &self.lines[end.line];
        let tail = tail_line.substring(end.pos..tail_line.len());

        let parts = text.lines();
        let mut new_lines: Vec<StyledString> = Vec::with_capacity(parts.len());
        for (k, part) in parts.iter().enumerate() {
            if k == 0 {
                let mut line = head.clone();
                line.push(part);
                new_lines.push(line);
            } else {
                new_lines.push(part.clone());
            }
        }
        let mut end_pos = 0;
        if let Some(last) = new_lines.last_mut() {
            end_pos = last.len();
            last.push(&tail);
        }
        let new_end = CursorPos::new(start.line + new_lines.len() - 1, end_pos);
        self.lines.splice(start.line..=end.line, new_lines);
        new_end
    }

    fn after_edit(&mut self, cursor: &TextCursor, change: Option<ContentsChange>) -> SlotResult {
        self.contents_changed.emit(&())?;
        if let Some(change) = change {
            self.contents_change.emit(&change)?;
        }
        self.cursor_position_changed.emit(&cursor.position())?;
        self.undo_available.emit(&true)?;
        self.redo_available.emit(&false)?;
        self.set_modified(true)
    }

    // ── undo / redo ──

    /// Restore the state before the last edit. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self, cursor: &mut TextCursor) -> Result<bool, ttk_core::SlotError> {
        let Some(snap) = self.undo.pop_back() else {
            return Ok(false);
        };
        let current = self.swap_in(snap, cursor);
        self.redo.push(current);
        self.after_history(cursor)?;
        Ok(true)
    }

    pub fn redo(&mut self, cursor: &mut TextCursor) -> Result<bool, ttk_core::SlotError> {
        let Some(snap) = self.redo.pop() else {
            return Ok(false);
        };
        let current = self.swap_in(snap, cursor);
        self.undo.push_back(current);
        self.after_history(cursor)?;
        Ok(true)
    }

    fn swap_in(&mut self, snap: Snapshot, cursor: &mut TextCursor) -> Snapshot {
        Snapshot {
            lines: mem::replace(&mut self.lines, snap.lines),
            cursor: mem::replace(cursor, snap.cursor),
        }
    }

    fn after_history(&mut self, cursor: &TextCursor) -> SlotResult {
        self.contents_changed.emit(&())?;
        self.cursor_position_changed.emit(&cursor.position())?;
        self.undo_available.emit(&self.is_undo_available())?;
        self.redo_available.emit(&self.is_redo_available())
    }
}

/// Map a position at or after `end` through an edit whose replaced range
/// ended at `end` and whose inserted text ends at `new_end`.
fn shift(p: CursorPos, end: CursorPos, new_end: CursorPos) -> CursorPos {
    if p < end {
        return p;
    }
    if p.line == end.line {
        CursorPos::new(new_end.line, new_end.pos + (p.pos - end.pos))
    } else {
        CursorPos::new(p.line + new_end.line - end.line, p.pos)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cursor::{MoveMode, MoveOperation};
    use ttk_core::SlotError;

    // ── editing ──

    #[test]
    fn insert_and_newline() {
        let mut doc = TextDocument::new();
        let mut c = TextCursor::new();
        doc.insert_text(&mut c, "hello").unwrap();
        doc.insert_text(&mut c, "\n").unwrap();
        doc.insert_text(&mut c, "world").unwrap();
        assert_eq!(doc.to_plain_text(), "hello\nworld");
        assert_eq!(c.position(), CursorPos::new(1, 5));
    }

    #[test]
    fn insert_in_middle_splits_line() {
        let mut doc = TextDocument::from_text("abcd");
        let mut c = TextCursor::at(0, 2);
        doc.insert_text(&mut c, "X\nY").unwrap();
        assert_eq!(doc.to_plain_text(), "abX\nYcd");
        assert_eq!(c.position(), CursorPos::new(1, 1));
    }

    #[test]
    fn replace_selection() {
        let mut doc = TextDocument::from_text("one two three");
        let mut c = TextCursor::at(0, 4);
        c.move_position(&doc, MoveOperation::WordRight, MoveMode::KeepAnchor, 1, None);
        doc.insert_text(&mut c, "2").unwrap();
        assert_eq!(doc.to_plain_text(), "one 2 three");
        assert!(!c.has_selection());
    }

    #[test]
    fn remove_multiline_selection() {
        let mut doc = TextDocument::from_text("abc\ndef\nghi");
        let mut c = TextCursor::at(0, 1);
        c.set_position(&doc, 2, 1, MoveMode::KeepAnchor);
        doc.remove_selected_text(&mut c).unwrap();
        assert_eq!(doc.to_plain_text(), "ahi");
        assert_eq!(c.position(), CursorPos::new(0, 1));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut doc = TextDocument::from_text("ab\ncd");
        let mut c = TextCursor::at(1, 0);
        doc.delete_backward(&mut c).unwrap();
        assert_eq!(doc.to_plain_text(), "abcd");
        assert_eq!(c.position(), CursorPos::new(0, 2));
        doc.delete_forward(&mut c).unwrap();
        assert_eq!(doc.to_plain_text(), "abd");
    }

    #[test]
    fn insert_inherits_color_before_caret() {
        let mut doc = TextDocument::new();
        let mut c = TextCursor::new();
        c.set_color(Some(Color::BOLD));
        doc.insert_text(&mut c, "ab").unwrap();
        c.set_color(None);
        doc.insert_text(&mut c, "c").unwrap();
        assert_eq!(doc.line(0).and_then(|l| l.color_at(2)), Some(&Color::BOLD));
    }

    // ── multi-cursor ──

    #[test]
    fn multi_cursor_edits_right_to_left() {
        let mut doc = TextDocument::from_text("ab\ncd");
        let mut c = TextCursor::at(0, 1);
        c.add_cursor(&doc, 0, 2);
        c.add_cursor(&doc, 1, 0);
        doc.insert_text(&mut c, "-").unwrap();
        assert_eq!(doc.to_plain_text(), "a-b-\n-cd");
        let carets: Vec<CursorPos> = c.selections().iter().map(|s| s.position).collect();
        assert_eq!(
            carets,
            vec![CursorPos::new(0, 2), CursorPos::new(0, 4), CursorPos::new(1, 1)]
        );
    }

    #[test]
    fn multi_cursor_newline_shifts_later_lines() {
        let mut doc = TextDocument::from_text("ab\ncd");
        let mut c = TextCursor::at(0, 1);
        c.add_cursor(&doc, 1, 1);
        doc.insert_text(&mut c, "\n").unwrap();
        assert_eq!(doc.to_plain_text(), "a\nb\nc\nd");
        let carets: Vec<CursorPos> = c.selections().iter().map(|s| s.position).collect();
        assert_eq!(carets, vec![CursorPos::new(1, 0), CursorPos::new(3, 0)]);
    }

    #[test]
    fn one_line_per_cursor() {
        let mut doc = TextDocument::from_text("a\nb");
        let mut c = TextCursor::at(0, 1);
        c.add_cursor(&doc, 1, 1);
        doc.insert_text(&mut c, "1\n2").unwrap();
        assert_eq!(doc.to_plain_text(), "a1\nb2");
    }

    // ── signals ──

    #[test]
    fn contents_change_reports_line_span() {
        let mut doc = TextDocument::from_text("abc\ndef");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.contents_change.connect_ok(move |c: &ContentsChange| sink.borrow_mut().push(*c));
        let mut c = TextCursor::at(0, 3);
        doc.insert_text(&mut c, "\nxyz").unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            &[ContentsChange { line: 0, removed: 1, added: 2 }]
        );
    }

    #[test]
    fn failing_receiver_propagates() {
        let mut doc = TextDocument::new();
        doc.contents_changed.connect(|_| Err(SlotError::new("boom")));
        let mut c = TextCursor::new();
        let err = doc.insert_text(&mut c, "x").unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    // ── undo ──

    #[test]
    fn undo_redo_cycle() {
        let mut doc = TextDocument::new();
        let mut c = TextCursor::new();
        doc.insert_text(&mut c, "abc").unwrap();
        assert!(doc.is_undo_available());
        assert!(doc.undo(&mut c).unwrap());
        assert_eq!(doc.to_plain_text(), "");
        assert!(doc.is_redo_available());
        assert!(doc.redo(&mut c).unwrap());
        assert_eq!(doc.to_plain_text(), "abc");
        assert_eq!(c.position(), CursorPos::new(0, 3));
        assert!(doc.undo(&mut c).unwrap());
        assert!(!doc.undo(&mut c).unwrap());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut doc = TextDocument::new();
        let mut c = TextCursor::new();
        doc.insert_text(&mut c, "a").unwrap();
        doc.undo(&mut c).unwrap();
        doc.insert_text(&mut c, "b").unwrap();
        assert!(!doc.is_redo_available());
    }

    #[test]
    fn undo_depth_is_bounded() {
        let mut doc = TextDocument::new().with_undo_depth(2);
        let mut c = TextCursor::new();
        for ch in ["a", "b", "c"] {
            doc.insert_text(&mut c, ch).unwrap();
        }
        assert!(doc.undo(&mut c).unwrap());
        assert!(doc.undo(&mut c).unwrap());
        assert!(!doc.undo(&mut c).unwrap());
        assert_eq!(doc.to_plain_text(), "a");
    }

    #[test]
    fn set_text_resets_history() {
        let mut doc = TextDocument::new();
        let mut c = TextCursor::new();
        doc.insert_text(&mut c, "x").unwrap();
        doc.set_text("fresh\ntext").unwrap();
        assert!(!doc.is_undo_available());
        assert_eq!(doc.line_count(), 2);
        assert!(!doc.is_modified());
    }

    // ── search ──

    #[test]
    fn find_across_lines() {
        let doc = TextDocument::from_text("alpha\nbeta gamma");
        assert_eq!(doc.find("gamma"), Some(CursorPos::new(1, 5)));
        let re = Regex::new("a\\b").unwrap();
        assert_eq!(doc.find_regex(&re).len(), 3);
    }
}
