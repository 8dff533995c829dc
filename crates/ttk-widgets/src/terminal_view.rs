#![forbid(unsafe_code)]

//! Widget hosting an embedded [`Terminal`].
//!
//! Output from the hosted program goes in through [`TerminalView::feed`].
//! Input goes out as bytes on `term_data`: keys, pastes, focus reports,
//! mouse reports when the program enabled tracking, and the terminal's own
//! replies to queries. Without mouse tracking the mouse selects text.

use ttk_core::event::{KeyEvent, MouseButton, MouseEvent};
use ttk_core::signal::{Signal, SlotResult};
use ttk_core::Result;
use ttk_render::Canvas;
use ttk_style::Color;
use ttk_text::StyledString;
use ttk_vt::{encode_focus, encode_key, encode_mouse, encode_paste, MouseTracking, Selection, Terminal};

use crate::widget::{EventCx, FocusPolicy, PaintCx, Widget};

#[derive(Debug)]
pub struct TerminalView {
    term: Terminal,
    selection: Option<Selection>,
    selecting: bool,
    /// Bytes for the hosted program.
    pub term_data: Signal<Vec<u8>>,
    pub term_resized: Signal<(u16, u16)>,
    pub text_selected: Signal<StyledString>,
}

impl TerminalView {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            term: Terminal::new(width, height),
            selection: None,
            selecting: false,
            term_data: Signal::new("termData"),
            term_resized: Signal::new("termResized"),
            text_selected: Signal::new("textSelected"),
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.term
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Feed program output. Replies the terminal generates while parsing
    /// go out on `term_data`.
    pub fn feed(&mut self, bytes: &[u8]) -> SlotResult {
        let fed = self.term.feed(bytes);
        let replies = self.term.take_replies();
        let sent = self.send(replies);
        fed.and(sent)
    }

    fn send(&self, bytes: Vec<u8>) -> SlotResult {
        if bytes.is_empty() {
            return Ok(());
        }
        self.term_data.emit(&bytes)
    }

    fn cell_of(ev: &MouseEvent) -> (u16, u16) {
        let clamp = |v: i32| u16::try_from(v.max(0)).unwrap_or(u16::MAX);
        (clamp(ev.x), clamp(ev.y))
    }

    fn tracking(&self) -> bool {
        self.term.mouse_tracking() != MouseTracking::Off
    }

    /// Forward a mouse event to the program. `true` when tracking is on,
    /// whether or not the mode reports this kind of event.
    fn report_mouse(&self, ev: &MouseEvent) -> Result<bool> {
        if !self.tracking() {
            return Ok(false);
        }
        let (x, y) = Self::cell_of(ev);
        if let Some(bytes) = encode_mouse(ev, x, y, self.term.mouse_tracking(), self.term.modes()) {
            self.send(bytes)?;
        }
        Ok(true)
    }

    fn emit_selection(&self) -> Result<()> {
        if let Some(sel) = self.selection {
            let text = sel.extract(self.term.screen());
            self.text_selected.emit(&text)?;
        }
        Ok(())
    }
}

impl Widget for TerminalView {
    fn class_name(&self) -> &'static str {
        "TerminalView"
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::STRONG
    }

    fn resized(&mut self, width: u16, height: u16) -> Result<()> {
        if (width, height) == (self.term.screen().width(), self.term.screen().height()) {
            return Ok(());
        }
        self.term.resize(width, height);
        self.selection = None;
        self.term_resized.emit(&(width, height))?;
        Ok(())
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) -> Result<()> {
        cx.update();
        self.send(encode_focus(focused, self.term.modes()))?;
        Ok(())
    }

    fn paint(&self, canvas: &mut Canvas, cx: &PaintCx<'_>) -> Result<()> {
        self.term.paint(canvas);
        let selected = cx.style.color("selectedColor");
        let mark = |canvas: &mut Canvas, x: u16, y: u16, over: &Color| {
            let (x, y) = (i32::from(x), i32::from(y));
            if let Some(cell) = canvas.get(x, y).cloned() {
                canvas.put(x, y, cell.glyph, &(cell.color + over));
            }
        };
        if let Some(sel) = self.selection {
            let ((_, y0), (_, y1)) = sel.ordered();
            for y in y0..=y1.min(canvas.height().saturating_sub(1)) {
                for x in 0..canvas.width() {
                    if sel.contains(x, y) {
                        mark(canvas, x, y, &selected);
                    }
                }
            }
        }
        if cx.focused && self.term.cursor_visible() {
            let (x, y) = self.term.screen().cursor();
            mark(canvas, x, y, &Color::REVERSED);
        }
        Ok(())
    }

    fn key(&mut self, ev: &KeyEvent, cx: &mut EventCx) -> Result<bool> {
        let bytes = encode_key(ev, self.term.modes());
        if bytes.is_empty() {
            return Ok(false);
        }
        if self.selection.take().is_some() {
            cx.update();
        }
        self.send(bytes)?;
        Ok(true)
    }

    fn paste(&mut self, text: &str, _cx: &mut EventCx) -> Result<bool> {
        self.send(encode_paste(text, self.term.modes()))?;
        Ok(true)
    }

    fn mouse_press(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if self.report_mouse(ev)? {
            return Ok(true);
        }
        if ev.button != MouseButton::Left {
            return Ok(false);
        }
        let at = Self::cell_of(ev);
        self.selection = Some(Selection::new(at, at));
        self.selecting = false;
        cx.update();
        Ok(true)
    }

    fn mouse_drag(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if self.report_mouse(ev)? {
            return Ok(true);
        }
        if let Some(sel) = &mut self.selection {
            sel.head = Self::cell_of(ev);
            self.selecting = true;
            cx.update();
        }
        Ok(true)
    }

    fn mouse_move(&mut self, ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        self.report_mouse(ev)
    }

    fn mouse_release(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if self.report_mouse(ev)? {
            return Ok(true);
        }
        if self.selecting {
            self.selecting = false;
            self.emit_selection()?;
        } else if self.selection.take().is_some() {
            // A plain click drops the selection.
            cx.update();
        }
        Ok(true)
    }

    fn mouse_double_click(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if self.report_mouse(ev)? {
            return Ok(true);
        }
        let (x, y) = Self::cell_of(ev);
        self.selection = Some(Selection::word_at(self.term.screen(), x, y));
        self.selecting = false;
        cx.update();
        self.emit_selection()?;
        Ok(true)
    }

    fn wheel(&mut self, ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        self.report_mouse(ev)
    }
}
