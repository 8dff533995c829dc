#![forbid(unsafe_code)]

//! Multi-line editor over a [`TextDocument`].
//!
//! The widget owns the document, one (multi-)cursor and the wrap table that
//! maps document lines to screen lines. `scroll` is the first visible screen
//! line; every edit or move rewraps and then scrolls the caret into view.

use ttk_core::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ttk_core::signal::Signal;
use ttk_core::{Result, Size};
use ttk_render::{Canvas, Draw, Glyph};
use ttk_text::{
    MoveMode, MoveOperation, SelectionType, StyledString, TextCursor, TextDocument, TextWrap,
    WrapMode,
};

use crate::widget::{EventCx, FocusPolicy, PaintCx, Widget};

const WHEEL_LINES: usize = 3;

#[derive(Debug)]
pub struct TextEdit {
    doc: TextDocument,
    cursor: TextCursor,
    wrap: TextWrap,
    scroll: usize,
    height: usize,
    read_only: bool,
    /// Emitted after every change to the document contents.
    pub text_changed: Signal<()>,
}

impl Default for TextEdit {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEdit {
    pub fn new() -> Self {
        Self::with_document(TextDocument::new())
    }

    pub fn from_text(text: &str) -> Self {
        Self::with_document(TextDocument::from_text(text))
    }

    fn with_document(doc: TextDocument) -> Self {
        let mut wrap = TextWrap::new();
        // A fresh wrap table has no receivers, so these cannot fail.
        let _ = wrap.set_mode(&doc, WrapMode::WordWrap);
        Self {
            doc,
            cursor: TextCursor::new(),
            wrap,
            scroll: 0,
            height: 0,
            read_only: false,
            text_changed: Signal::new("textChanged"),
        }
    }

    pub fn document(&self) -> &TextDocument {
        &self.doc
    }

    pub fn cursor(&self) -> &TextCursor {
        &self.cursor
    }

    pub fn wrap(&self) -> &TextWrap {
        &self.wrap
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn text(&self) -> String {
        self.doc.to_plain_text()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) -> Result<()> {
        self.wrap.set_mode(&self.doc, mode)?;
        self.ensure_caret_visible();
        Ok(())
    }

    /// Replace the whole contents. Clears the cursor.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.doc.set_text(text)?;
        self.cursor = TextCursor::new();
        self.scroll = 0;
        self.changed()
    }

    /// Insert at the cursor, replacing any selection.
    pub fn insert(&mut self, text: &str) -> Result<()> {
        if self.read_only {
            return Ok(());
        }
        self.doc.insert_text(&mut self.cursor, text)?;
        self.changed()
    }

    pub fn move_cursor(&mut self, op: MoveOperation, mode: MoveMode, n: usize) {
        self.cursor
            .move_position(&self.doc, op, mode, n, Some(&self.wrap));
        self.ensure_caret_visible();
    }

    fn changed(&mut self) -> Result<()> {
        self.wrap.rewrap(&self.doc)?;
        self.cursor.clamp_to(&self.doc);
        self.ensure_caret_visible();
        self.text_changed.emit(&())?;
        Ok(())
    }

    fn caret_screen(&self) -> (usize, usize) {
        let p = self.cursor.position();
        self.wrap.data_to_screen(&self.doc, p.line, p.pos)
    }

    fn ensure_caret_visible(&mut self) {
        if self.height == 0 {
            return;
        }
        let (_, y) = self.caret_screen();
        if y < self.scroll {
            self.scroll = y;
        } else if y >= self.scroll + self.height {
            self.scroll = y + 1 - self.height;
        }
    }

    fn max_scroll(&self) -> usize {
        self.wrap.size().saturating_sub(self.height.max(1))
    }

    fn place_cursor(&mut self, ev: &MouseEvent, mode: MoveMode) {
        let x = usize::try_from(ev.x.max(0)).unwrap_or(0);
        let y = usize::try_from(ev.y.max(0)).unwrap_or(0) + self.scroll;
        let p = self.wrap.screen_to_data(&self.doc, x, y);
        self.cursor.set_position(&self.doc, p.line, p.pos, mode);
        self.ensure_caret_visible();
    }

    fn edit_key(&mut self, ev: &KeyEvent) -> Result<bool> {
        if self.read_only {
            return Ok(false);
        }
        if ev.ctrl() {
            return match ev.code {
                KeyCode::Char('z') => {
                    if self.doc.undo(&mut self.cursor)? {
                        self.changed()?;
                    }
                    Ok(true)
                }
                KeyCode::Char('y') => {
                    if self.doc.redo(&mut self.cursor)? {
                        self.changed()?;
                    }
                    Ok(true)
                }
                _ => Ok(false),
            };
        }
        match ev.code {
            KeyCode::Enter => self.doc.insert_text(&mut self.cursor, "\n")?,
            KeyCode::Tab if ev.modifiers.is_empty() => self.doc.insert_text(&mut self.cursor, "\t")?,
            KeyCode::Backspace => self.doc.delete_backward(&mut self.cursor)?,
            KeyCode::Delete => self.doc.delete_forward(&mut self.cursor)?,
            _ => match ev.text() {
                Some(c) => {
                    let mut buf = [0u8; 4];
                    self.doc.insert_text(&mut self.cursor, c.encode_utf8(&mut buf))?;
                }
                None => return Ok(false),
            },
        }
        self.changed()?;
        Ok(true)
    }

    fn navigation_key(&mut self, ev: &KeyEvent) -> bool {
        let mode = if ev.shift() {
            MoveMode::KeepAnchor
        } else {
            MoveMode::MoveAnchor
        };
        let page = self.height.max(1);
        let (op, n) = match (ev.code, ev.ctrl()) {
            (KeyCode::Left, false) => (MoveOperation::Left, 1),
            (KeyCode::Left, true) => (MoveOperation::WordLeft, 1),
            (KeyCode::Right, false) => (MoveOperation::Right, 1),
            (KeyCode::Right, true) => (MoveOperation::WordRight, 1),
            (KeyCode::Up, _) => (MoveOperation::Up, 1),
            (KeyCode::Down, _) => (MoveOperation::Down, 1),
            (KeyCode::Home, false) => (MoveOperation::StartOfLine, 1),
            (KeyCode::Home, true) => (MoveOperation::Start, 1),
            (KeyCode::End, false) => (MoveOperation::EndOfLine, 1),
            (KeyCode::End, true) => (MoveOperation::End, 1),
            (KeyCode::PageUp, _) => (MoveOperation::Up, page),
            (KeyCode::PageDown, _) => (MoveOperation::Down, page),
            (KeyCode::Char('a'), true) => {
                self.cursor.select(&self.doc, SelectionType::Document);
                return true;
            }
            _ => return false,
        };
        self.move_cursor(op, mode, n);
        true
    }
}

impl Widget for TextEdit {
    fn class_name(&self) -> &'static str {
        "TextEdit"
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::STRONG
    }

    fn resized(&mut self, width: u16, height: u16) -> Result<()> {
        self.height = usize::from(height);
        // Keep one column free for the caret after the last glyph.
        self.wrap
            .set_width(&self.doc, usize::from(width.saturating_sub(1)).max(1))?;
        self.scroll = self.scroll.min(self.max_scroll());
        self.ensure_caret_visible();
        Ok(())
    }

    fn paint(&self, canvas: &mut Canvas, cx: &PaintCx<'_>) -> Result<()> {
        let Size { height, .. } = cx.size;
        let color = cx.style.color("color");
        let selected = cx.style.color("selectedColor");
        let tabs = self.wrap.tab_spaces();
        let screen = self.wrap.screen_lines();
        let end = (self.scroll + usize::from(height)).min(screen.len());
        let visible = screen.get(self.scroll..end).unwrap_or_default();

        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            let lines = self
                .cursor
                .highlighted_lines(&self.doc, first.line, last.line, &selected);
            for (row, sl) in visible.iter().enumerate() {
                let Some(line) = lines.get(sl.line - first.line) else {
                    continue;
                };
                let to = sl.to.min(line.len());
                let segment = line.substring(sl.from.min(to)..to).tab_to_spaces(tabs);
                let y = i32::try_from(row).unwrap_or(i32::MAX);
                canvas.draw_text((0, y), &segment, &color);
            }
        }

        if cx.focused && self.cursor.cursor_count() == 1 {
            let (x, y) = self.caret_screen();
            if let Some(row) = y.checked_sub(self.scroll) {
                let (x, y) = (i32::try_from(x).unwrap_or(i32::MAX), i32::try_from(row).unwrap_or(i32::MAX));
                let (glyph, under) = canvas
                    .get(x, y)
                    .map(|c| (c.glyph.clone(), c.color.clone()))
                    .unwrap_or((Glyph::Char(' '), color.clone()));
                let glyph = if glyph.is_continuation() { Glyph::Char(' ') } else { glyph };
                canvas.put(x, y, glyph, &(under + ttk_style::Color::REVERSED));
            }
        }
        Ok(())
    }

    fn key(&mut self, ev: &KeyEvent, cx: &mut EventCx) -> Result<bool> {
        let handled = self.navigation_key(ev) || self.edit_key(ev)?;
        if handled {
            cx.update();
        }
        Ok(handled)
    }

    fn paste(&mut self, text: &str, cx: &mut EventCx) -> Result<bool> {
        if self.read_only {
            return Ok(false);
        }
        self.insert(text)?;
        cx.update();
        Ok(true)
    }

    fn mouse_press(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if ev.button != MouseButton::Left {
            return Ok(false);
        }
        let mode = if ev.modifiers.contains(ttk_core::event::Modifiers::SHIFT) {
            MoveMode::KeepAnchor
        } else {
            MoveMode::MoveAnchor
        };
        self.place_cursor(ev, mode);
        cx.update();
        Ok(true)
    }

    fn mouse_drag(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        self.place_cursor(ev, MoveMode::KeepAnchor);
        cx.update();
        Ok(true)
    }

    fn mouse_release(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(true)
    }

    fn mouse_double_click(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        self.place_cursor(ev, MoveMode::MoveAnchor);
        let kind = if ev.taps >= 3 {
            SelectionType::LineUnderCursor
        } else {
            SelectionType::WordUnderCursor
        };
        self.cursor.select(&self.doc, kind);
        cx.update();
        Ok(true)
    }

    fn wheel(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        let before = self.scroll;
        self.scroll = match ev.kind {
            MouseEventKind::WheelUp => self.scroll.saturating_sub(WHEEL_LINES),
            _ => (self.scroll + WHEEL_LINES).min(self.max_scroll()),
        };
        if self.scroll != before {
            cx.update();
        }
        Ok(true)
    }
}

/// Plain rendering of the visible screen lines, for tests and snapshots.
impl TextEdit {
    pub fn visible_text(&self) -> Vec<StyledString> {
        let screen = self.wrap.screen_lines();
        let end = (self.scroll + self.height).min(screen.len());
        screen
            .get(self.scroll..end)
            .unwrap_or_default()
            .iter()
            .filter_map(|sl| {
                let line = self.doc.line(sl.line)?;
                let to = sl.to.min(line.len());
                Some(line.substring(sl.from.min(to)..to))
            })
            .collect()
    }
}
