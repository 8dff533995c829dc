#![forbid(unsafe_code)]

//! Document line to screen line mapping.
//!
//! Each screen line is a glyph range `[from, to)` of one document line. The
//! last segment of a line ends one past the line length so the caret can sit
//! after the final glyph.

use tracing::debug;
use ttk_core::signal::{Signal, SlotResult};

use crate::cursor::CursorPos;
use crate::document::TextDocument;
use crate::styled::StyledString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// One screen line per document line.
    #[default]
    NoWrap,
    /// Break at the wrap width.
    WrapAnywhere,
    /// Break at the last whitespace before the wrap width, when there is one.
    WordWrap,
}

/// One screen line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenLine {
    pub line: usize,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug)]
pub struct TextWrap {
    lines: Vec<ScreenLine>,
    mode: WrapMode,
    width: usize,
    tab_spaces: usize,
    pub wrap_changed: Signal<()>,
}

impl Default for TextWrap {
    fn default() -> Self {
        Self::new()
    }
}

impl TextWrap {
    pub fn new() -> Self {
        Self {
            lines: vec![ScreenLine {
                line: 0,
                from: 0,
                to: 1,
            }],
            mode: WrapMode::NoWrap,
            width: 80,
            tab_spaces: 4,
            wrap_changed: Signal::new("wrapChanged"),
        }
    }

    pub fn mode(&self) -> WrapMode {
        self.mode
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn tab_spaces(&self) -> usize {
        self.tab_spaces
    }

    /// Number of screen lines.
    pub fn size(&self) -> usize {
        self.lines.len()
    }

    pub fn screen_lines(&self) -> &[ScreenLine] {
        &self.lines
    }

    pub fn set_mode(&mut self, doc: &TextDocument, mode: WrapMode) -> SlotResult {
        self.mode = mode;
        self.rewrap(doc)
    }

    pub fn set_width(&mut self, doc: &TextDocument, width: usize) -> SlotResult {
        self.width = width;
        self.rewrap(doc)
    }

    pub fn set_tab_spaces(&mut self, doc: &TextDocument, tab_spaces: usize) -> SlotResult {
        self.tab_spaces = tab_spaces.max(1);
        self.rewrap(doc)
    }

    /// Recompute every screen line from `doc`.
    pub fn rewrap(&mut self, doc: &TextDocument) -> SlotResult {
        self.lines.clear();
        let width = self.width;
        for (i, line) in doc.lines().iter().enumerate() {
            if self.mode == WrapMode::NoWrap || width == 0 {
                self.lines.push(ScreenLine {
                    line: i,
                    from: 0,
                    to: line.len() + 1,
                });
            } else {
                self.wrap_line(i, line, width);
            }
        }
        debug!(
            screen_lines = self.lines.len(),
            width, "rewrapped document"
        );
        self.wrap_changed.emit(&())
    }

    fn wrap_line(&mut self, index: usize, line: &StyledString, width: usize) {
        if line.is_empty() {
            self.lines.push(ScreenLine {
                line: index,
                from: 0,
                to: 0,
            });
            return;
        }
        let mut from = 0;
        let mut rest = line.clone();
        loop {
            if rest.width_with_tabs(self.tab_spaces) <= width {
                self.lines.push(ScreenLine {
                    line: index,
                    from,
                    to: from + rest.len() + 1,
                });
                return;
            }
            let mut to = rest.tab_char_pos(width, self.tab_spaces, false).max(1);
            if self.mode == WrapMode::WordWrap {
                let mut at = to;
                while at > 0 && !is_blank(&rest, at) {
                    at -= 1;
                }
                if at > 0 {
                    to = at;
                }
            }
            self.lines.push(ScreenLine {
                line: index,
                from,
                to: from + to,
            });
            rest = rest.substring(to..rest.len());
            from += to;
        }
    }

    /// Screen `(x, y)` of a document position; `(0, 0)` if it is not mapped.
    pub fn data_to_screen(&self, doc: &TextDocument, line: usize, pos: usize) -> (usize, usize) {
        for (y, sl) in self.lines.iter().enumerate() {
            if sl.line == line && sl.from <= pos && pos <= sl.to {
                let x = doc
                    .line(line)
                    .map_or(0, |l| l.substring(sl.from..pos).width_with_tabs(self.tab_spaces));
                return (x, y);
            }
        }
        (0, 0)
    }

    /// Document position under screen `(x, y)`; `y` is clamped.
    pub fn screen_to_data(&self, doc: &TextDocument, x: usize, y: usize) -> CursorPos {
        let Some(sl) = self.lines.get(y.min(self.lines.len().saturating_sub(1))) else {
            return CursorPos::default();
        };
        let pos = doc.line(sl.line).map_or(0, |l| {
            let seg = l.substring(sl.from..sl.to);
            sl.from + seg.tab_char_pos(x, self.tab_spaces, false)
        });
        doc.clamp(CursorPos::new(sl.line, pos))
    }

    /// Snap `(x, y)` onto the nearest editable screen cell.
    pub fn normalize_screen(&self, doc: &TextDocument, x: usize, y: usize) -> (usize, usize) {
        let y = y.min(self.lines.len().saturating_sub(1));
        let Some(sl) = self.lines.get(y) else {
            return (0, 0);
        };
        let Some(line) = doc.line(sl.line) else {
            return (0, y);
        };
        let seg = line.substring(sl.from..sl.to);
        let idx = seg.tab_char_pos(x, self.tab_spaces, false);
        (seg.substring(0..idx).width_with_tabs(self.tab_spaces), y)
    }
}

fn is_blank(s: &StyledString, index: usize) -> bool {
    matches!(s.glyph(index), Some(" ") | Some("\t"))
}
