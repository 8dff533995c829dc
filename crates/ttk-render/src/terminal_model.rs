#![forbid(unsafe_code)]

//! Terminal model for output validation.
//!
//! A minimal terminal that understands the subset of sequences the canvas
//! emits, so tests can replay a frame and compare the resulting grid with
//! the canvas that produced it.
//!
//! This is NOT a full VT emulator. It supports only:
//! - printable text with wide glyphs and autowrap
//! - CR and LF
//! - CUP (`H` / `f`)
//! - SGR, decoded with the same rules as [`ttk_style::apply_sgr`]
//! - OSC 8 hyperlinks
//!
//! Every other sequence is consumed and ignored.
//!
//! ```
//! use ttk_render::terminal_model::TerminalModel;
//!
//! let mut model = TerminalModel::new(10, 2);
//! model.process("\x1b[2;3H\x1b[1mhi\x1b[0m");
//! assert_eq!(model.row_text(1).as_deref(), Some("  hi      "));
//! assert_eq!(model.cursor(), (4, 1));
//! ```

use ttk_core::text_width::{grapheme_width, graphemes};
use ttk_style::{Color, Palette, apply_sgr};

use crate::canvas::{Canvas, Shown, shown};

/// One cell of the model grid. A continuation has empty `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCell {
    pub text: String,
    pub color: Color,
}

impl Default for ModelCell {
    fn default() -> Self {
        Self {
            text: " ".to_owned(),
            color: Color::RESET,
        }
    }
}

impl ModelCell {
    pub fn is_continuation(&self) -> bool {
        self.text.is_empty()
    }
}

/// Same visible attributes: foreground, background, modifiers and link.
pub fn same_attrs(a: &Color, b: &Color) -> bool {
    a.foreground() == b.foreground()
        && a.background() == b.background()
        && a.modifiers() == b.modifiers()
        && a.hyperlink() == b.hyperlink()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Osc,
    OscEscape,
}

#[derive(Debug, Clone)]
pub struct TerminalModel {
    width: usize,
    height: usize,
    cells: Vec<ModelCell>,
    cursor: (usize, usize),
    pen: Color,
    link: Option<String>,
    palette: Palette,
    state: State,
    seq: String,
    text: String,
}

impl TerminalModel {
    /// Blank screen, cursor at the origin, reset pen.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![ModelCell::default(); width * height],
            cursor: (0, 0),
            pen: Color::RESET,
            link: None,
            palette: Palette::default(),
            state: State::Ground,
            seq: String::new(),
            text: String::new(),
        }
    }

    /// A screen already showing `canvas`.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let (w, h) = (usize::from(canvas.width()), usize::from(canvas.height()));
        let mut model = Self::new(w, h);
        for y in 0..h {
            let row = &canvas.cells()[y * w..(y + 1) * w];
            for x in 0..w {
                model.cells[y * w + x] = match shown(row, x) {
                    Shown::Covered => ModelCell {
                        text: String::new(),
                        color: row[x - 1].color.clone(),
                    },
                    Shown::Blank(color) => ModelCell {
                        text: " ".to_owned(),
                        color: color.clone(),
                    },
                    Shown::Cell(cell) => ModelCell {
                        text: cell.glyph.to_string(),
                        color: cell.color.clone(),
                    },
                };
            }
        }
        model
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(x, y)`, 0-indexed. `x` may equal the width while a wrap is pending.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Current pen including the active hyperlink.
    pub fn pen(&self) -> Color {
        self.pen.clone().with_link(self.link.as_deref())
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&ModelCell> {
        (x < self.width && y < self.height).then(|| &self.cells[y * self.width + x])
    }

    pub fn row_text(&self, y: usize) -> Option<String> {
        (y < self.height).then(|| {
            self.cells[y * self.width..(y + 1) * self.width]
                .iter()
                .map(|c| c.text.as_str())
                .collect()
        })
    }

    /// First difference between the model and what `canvas` should look
    /// like on screen, or `None` when they agree.
    pub fn diff_canvas(&self, canvas: &Canvas) -> Option<String> {
        let expected = Self::from_canvas(canvas);
        if (expected.width, expected.height) != (self.width, self.height) {
            return Some(format!(
                "size {}x{} != {}x{}",
                self.width, self.height, expected.width, expected.height
            ));
        }
        for (i, (got, want)) in self.cells.iter().zip(&expected.cells).enumerate() {
            if got.text != want.text || !same_attrs(&got.color, &want.color) {
                return Some(format!(
                    "cell ({}, {}): got {:?} {:?}, want {:?} {:?}",
                    i % self.width,
                    i / self.width,
                    got.text,
                    got.color,
                    want.text,
                    want.color
                ));
            }
        }
        None
    }

    /// Feed output bytes. Sequences may be split across calls.
    pub fn process(&mut self, input: &str) {
        for ch in input.chars() {
            match self.state {
                State::Ground => self.ground(ch),
                State::Escape => self.escape(ch),
                State::Csi => {
                    if ('\u{40}'..='\u{7e}').contains(&ch) {
                        self.execute_csi(ch);
                        self.state = State::Ground;
                    } else {
                        self.seq.push(ch);
                    }
                }
                State::Osc => match ch {
                    '\x07' => self.finish_osc(),
                    '\x1b' => self.state = State::OscEscape,
                    _ => self.seq.push(ch),
                },
                State::OscEscape => {
                    // ESC \ ends the string; anything else aborts it
                    if ch == '\\' {
                        self.finish_osc();
                    } else {
                        self.seq.clear();
                        self.state = State::Escape;
                        self.escape(ch);
                    }
                }
            }
        }
        self.flush_text();
    }

    fn ground(&mut self, ch: char) {
        match ch {
            '\x1b' => {
                self.flush_text();
                self.state = State::Escape;
            }
            '\r' => {
                self.flush_text();
                self.cursor.0 = 0;
            }
            '\n' => {
                self.flush_text();
                self.cursor.1 = (self.cursor.1 + 1).min(self.height.saturating_sub(1));
            }
            c if c.is_control() => self.flush_text(),
            c => self.text.push(c),
        }
    }

    fn escape(&mut self, ch: char) {
        self.seq.clear();
        self.state = match ch {
            '[' => State::Csi,
            ']' => State::Osc,
            _ => State::Ground,
        };
    }

    fn finish_osc(&mut self) {
        if let Some(rest) = self.seq.strip_prefix("8;") {
            let uri = rest.split_once(';').map_or("", |(_, uri)| uri);
            self.link = (!uri.is_empty()).then(|| uri.to_owned());
        }
        self.seq.clear();
        self.state = State::Ground;
    }

    fn params(&self) -> Vec<u16> {
        if self.seq.is_empty() {
            return Vec::new();
        }
        self.seq
            .split([';', ':'])
            .map(|p| p.parse().unwrap_or(0))
            .collect()
    }

    fn execute_csi(&mut self, final_char: char) {
        if self.seq.starts_with(['?', '>', '<', '=']) {
            self.seq.clear();
            return;
        }
        let params = self.params();
        match final_char {
            'H' | 'f' => {
                let row = params.first().copied().unwrap_or(1).max(1);
                let col = params.get(1).copied().unwrap_or(1).max(1);
                self.cursor = (
                    (usize::from(col) - 1).min(self.width.saturating_sub(1)),
                    (usize::from(row) - 1).min(self.height.saturating_sub(1)),
                );
            }
            'm' => self.pen = apply_sgr(&self.pen, &params, &self.palette),
            _ => {}
        }
        self.seq.clear();
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        for g in graphemes(&text) {
            self.put(g);
        }
    }

    fn put(&mut self, glyph: &str) {
        let w = grapheme_width(glyph);
        if w == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        if self.cursor.0 + w > self.width {
            self.cursor.0 = 0;
            self.cursor.1 = (self.cursor.1 + 1).min(self.height - 1);
        }
        let (x, y) = self.cursor;
        let color = self.pen();
        self.clear_overlap(x, y);
        if w == 2 {
            self.clear_overlap(x + 1, y);
            self.cells[y * self.width + x + 1] = ModelCell {
                text: String::new(),
                color: color.clone(),
            };
        }
        self.cells[y * self.width + x] = ModelCell {
            text: glyph.to_owned(),
            color,
        };
        self.cursor.0 += w;
    }

    fn clear_overlap(&mut self, x: usize, y: usize) {
        let idx = y * self.width + x;
        if self.cells[idx].is_continuation() && x > 0 {
            self.cells[idx - 1].text = " ".to_owned();
        } else if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1].text = " ".to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttk_style::{Mods, Rgb};

    #[test]
    fn prints_and_advances() {
        let mut m = TerminalModel::new(5, 1);
        m.process("abc");
        assert_eq!(m.row_text(0).as_deref(), Some("abc  "));
        assert_eq!(m.cursor(), (3, 0));
    }

    #[test]
    fn cup_and_sgr() {
        let mut m = TerminalModel::new(4, 2);
        m.process("\x1b[2;2H\x1b[38;2;1;2;3;1mx");
        let cell = m.cell(1, 1).unwrap();
        assert_eq!(cell.text, "x");
        assert_eq!(cell.color.foreground(), Some(Rgb::new(1, 2, 3)));
        assert!(cell.color.modifiers().contains(Mods::BOLD));
    }

    #[test]
    fn wide_glyph_and_overwrite() {
        let mut m = TerminalModel::new(4, 1);
        m.process("界");
        assert!(m.cell(1, 0).unwrap().is_continuation());
        m.process("\x1b[1;2Hx");
        assert_eq!(m.row_text(0).as_deref(), Some(" x  "));
    }

    #[test]
    fn hyperlink_sticks_to_cells() {
        let mut m = TerminalModel::new(3, 1);
        m.process("\x1b]8;;https://x.org\x1b\\a\x1b]8;;\x1b\\b");
        assert_eq!(m.cell(0, 0).unwrap().color.hyperlink(), Some("https://x.org"));
        assert_eq!(m.cell(1, 0).unwrap().color.hyperlink(), None);
    }

    #[test]
    fn split_sequences_resume() {
        let mut m = TerminalModel::new(3, 1);
        m.process("\x1b[");
        m.process("1;3Hz");
        assert_eq!(m.row_text(0).as_deref(), Some("  z"));
    }

    #[test]
    fn private_modes_are_ignored() {
        let mut m = TerminalModel::new(2, 1);
        m.process("\x1b[?25lq");
        assert_eq!(m.row_text(0).as_deref(), Some("q "));
    }
}
