#![forbid(unsafe_code)]

//! Screen buffer: one cell matrix with cursor, scrolling region and
//! scrollback.
//!
//! The [`Terminal`](crate::Terminal) owns two of these (primary and
//! alternate) and drives them from parsed actions. Coordinates are 0-based;
//! the cursor always stays inside the matrix. A glyph two columns wide
//! occupies its cell and a [`Glyph::Continuation`] to its right, and every
//! operation that cuts such a pair blanks both halves.

use std::collections::VecDeque;

use ttk_core::text_width::char_width;
use ttk_render::{Cell, Glyph};
use ttk_style::Color;

/// One screen line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// A new logical line starts here. `false` when the row was reached by
    /// wrapping off the end of the previous one.
    pub newline: bool,
}

impl Row {
    fn blank(width: u16, cell: &Cell) -> Self {
        Self {
            cells: vec![cell.clone(); usize::from(width)],
            newline: true,
        }
    }

    /// Row text, wide glyphs counted once.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len());
        for cell in &self.cells {
            cell.glyph.push_to(&mut out);
        }
        out
    }

    /// Blank orphaned halves of wide glyphs.
    fn repair(&mut self, blank: &Cell) {
        let len = self.cells.len();
        for x in 0..len {
            let cont = self.cells[x].glyph.is_continuation();
            if cont && (x == 0 || !self.cells[x - 1].glyph.is_wide()) {
                self.cells[x] = blank.clone();
            } else if self.cells[x].glyph.is_wide()
                && (x + 1 == len || !self.cells[x + 1].glyph.is_continuation())
            {
                self.cells[x] = blank.clone();
            }
        }
    }
}

/// State saved by DECSC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCursor {
    pub x: u16,
    pub y: u16,
    pub pen: Color,
    pub pending_wrap: bool,
    pub origin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    width: u16,
    height: u16,
    rows: Vec<Row>,
    x: u16,
    y: u16,
    /// The last print filled the right column; the next one wraps first.
    pending_wrap: bool,
    top: u16,
    bottom: u16,
    pen: Color,
    saved: Option<SavedCursor>,
    scrollback: VecDeque<Row>,
    scrollback_limit: usize,
}

impl Screen {
    /// A blank screen keeping up to `scrollback_limit` lines scrolled off
    /// the top. Dimensions are at least 1×1.
    pub fn new(width: u16, height: u16, scrollback_limit: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            rows: vec![Row::blank(width, &Cell::EMPTY); usize::from(height)],
            x: 0,
            y: 0,
            pending_wrap: false,
            top: 0,
            bottom: height,
            pen: Color::RESET,
            saved: None,
            scrollback: VecDeque::new(),
            scrollback_limit,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// `(x, y)`.
    pub fn cursor(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    /// Current SGR state.
    pub fn pen(&self) -> &Color {
        &self.pen
    }

    pub fn set_pen(&mut self, pen: Color) {
        self.pen = pen;
    }

    /// Scrolling region `[top, bottom)`.
    pub fn region(&self) -> (u16, u16) {
        (self.top, self.bottom)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, y: u16) -> Option<&Row> {
        self.rows.get(usize::from(y))
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.row(y)?.cells.get(usize::from(x))
    }

    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y).map(Row::text)
    }

    /// Lines scrolled off the top, oldest first.
    pub fn scrollback(&self) -> &VecDeque<Row> {
        &self.scrollback
    }

    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }

    /// Erased cells keep the current background.
    fn blank(&self) -> Cell {
        Cell::new(Glyph::Char(' '), Color::RESET.with_bg(self.pen.background()))
    }

    fn blank_row(&self) -> Row {
        Row::blank(self.width, &self.blank())
    }

    // ── printing ──

    /// Write one character at the cursor and advance.
    pub fn print(&mut self, ch: char, autowrap: bool, insert: bool) {
        let w = char_width(ch);
        if w == 0 {
            self.combine(ch);
            return;
        }
        let w: u16 = if w >= 2 { 2 } else { 1 };
        if self.pending_wrap && autowrap {
            self.wrap();
        }
        if w == 2 && self.x + 1 >= self.width {
            if !autowrap || self.width < 2 {
                return;
            }
            let blank = self.blank();
            self.put(self.x, self.y, blank);
            self.wrap();
        }
        if insert {
            self.insert_chars(w);
        }
        let (x, y) = (self.x, self.y);
        if w == 2 {
            self.put(x + 1, y, Cell::new(Glyph::Continuation, self.pen.clone()));
        }
        self.put(x, y, Cell::new(Glyph::Char(ch), self.pen.clone()));

        if x + w >= self.width {
            self.x = self.width - 1;
            self.pending_wrap = autowrap;
        } else {
            self.x = x + w;
            self.pending_wrap = false;
        }
    }

    /// Attach a zero-width character to the previously printed glyph.
    fn combine(&mut self, ch: char) {
        let mut x = if self.pending_wrap {
            self.x
        } else if self.x > 0 {
            self.x - 1
        } else {
            return;
        };
        let row = &mut self.rows[usize::from(self.y)].cells;
        if row[usize::from(x)].glyph.is_continuation() && x > 0 {
            x -= 1;
        }
        let cell = &mut row[usize::from(x)];
        let mut text = cell.glyph.to_string();
        text.push(ch);
        // A mark that would change the cell width is dropped.
        if let Some(glyph) = Glyph::from_cluster(&text)
            && glyph.width() == cell.glyph.width()
        {
            cell.glyph = glyph;
        }
    }

    fn wrap(&mut self) {
        self.pending_wrap = false;
        self.x = 0;
        self.linefeed();
        self.rows[usize::from(self.y)].newline = false;
    }

    /// Write a cell, blanking any wide glyph it cuts.
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        let blank = self.blank();
        let row = &mut self.rows[usize::from(y)].cells;
        let x = usize::from(x);
        if row[x].glyph.is_continuation() && x > 0 {
            row[x - 1] = blank.clone();
        }
        if row[x].glyph.is_wide() && x + 1 < row.len() {
            row[x + 1] = blank;
        }
        row[x] = cell;
    }

    // ── cursor ──

    pub fn carriage_return(&mut self) {
        self.x = 0;
        self.pending_wrap = false;
    }

    /// Down one line, scrolling the region when at its bottom.
    pub fn linefeed(&mut self) {
        if self.y + 1 == self.bottom {
            self.scroll_up(1);
        } else if self.y + 1 < self.height {
            self.y += 1;
        }
        self.pending_wrap = false;
    }

    /// Up one line, scrolling the region down when at its top.
    pub fn reverse_index(&mut self) {
        if self.y == self.top {
            self.scroll_down(1);
        } else if self.y > 0 {
            self.y -= 1;
        }
        self.pending_wrap = false;
    }

    pub fn backspace(&mut self) {
        self.x = self.x.saturating_sub(1);
        self.pending_wrap = false;
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.x = x.min(self.width - 1);
        self.y = y.min(self.height - 1);
        self.pending_wrap = false;
    }

    pub fn set_column(&mut self, x: u16) {
        self.move_to(x, self.y);
    }

    pub fn set_row(&mut self, y: u16) {
        self.move_to(self.x, y);
    }

    /// Up `n`, stopping at the top margin when starting inside the region.
    pub fn cursor_up(&mut self, n: u16) {
        let limit = if self.y >= self.top { self.top } else { 0 };
        self.move_to(self.x, self.y.saturating_sub(n).max(limit));
    }

    pub fn cursor_down(&mut self, n: u16) {
        let limit = if self.y < self.bottom {
            self.bottom - 1
        } else {
            self.height - 1
        };
        self.move_to(self.x, self.y.saturating_add(n).min(limit));
    }

    pub fn cursor_forward(&mut self, n: u16) {
        self.move_to(self.x.saturating_add(n), self.y);
    }

    pub fn cursor_back(&mut self, n: u16) {
        self.move_to(self.x.saturating_sub(n), self.y);
    }

    pub fn save_cursor(&mut self, origin: bool) {
        self.saved = Some(SavedCursor {
            x: self.x,
            y: self.y,
            pen: self.pen.clone(),
            pending_wrap: self.pending_wrap,
            origin,
        });
    }

    /// Restore the DECSC state and return it; without one, home the cursor
    /// and reset the pen.
    pub fn restore_cursor(&mut self) -> Option<SavedCursor> {
        match self.saved.clone() {
            Some(saved) => {
                self.move_to(saved.x, saved.y);
                self.pen = saved.pen.clone();
                self.pending_wrap = saved.pending_wrap && self.x == self.width - 1;
                Some(saved)
            }
            None => {
                self.move_to(0, 0);
                self.pen = Color::RESET;
                None
            }
        }
    }

    // ── scrolling ──

    /// Set the region to `[top, bottom)`; `bottom == 0` means the screen
    /// height. Regions under two lines are ignored. Returns whether it was
    /// applied.
    pub fn set_region(&mut self, top: u16, bottom: u16) -> bool {
        let bottom = if bottom == 0 {
            self.height
        } else {
            bottom.min(self.height)
        };
        if top.saturating_add(1) >= bottom {
            return false;
        }
        self.top = top;
        self.bottom = bottom;
        true
    }

    fn shift_up(&mut self, from: u16, to: u16, n: u16, keep: bool) {
        let n = n.min(to - from);
        for _ in 0..n {
            let row = self.rows.remove(usize::from(from));
            if keep && self.scrollback_limit > 0 {
                if self.scrollback.len() == self.scrollback_limit {
                    self.scrollback.pop_front();
                }
                self.scrollback.push_back(row);
            }
            let blank = self.blank_row();
            self.rows.insert(usize::from(to - 1), blank);
        }
    }

    fn shift_down(&mut self, from: u16, to: u16, n: u16) {
        let n = n.min(to - from);
        for _ in 0..n {
            self.rows.remove(usize::from(to - 1));
            let blank = self.blank_row();
            self.rows.insert(usize::from(from), blank);
        }
    }

    /// Scroll the region up; lines leaving a region that starts at the top
    /// of the screen go to the scrollback.
    pub fn scroll_up(&mut self, n: u16) {
        let keep = self.top == 0;
        self.shift_up(self.top, self.bottom, n, keep);
    }

    pub fn scroll_down(&mut self, n: u16) {
        self.shift_down(self.top, self.bottom, n);
    }

    /// IL: only inside the region; the cursor returns to column 0.
    pub fn insert_lines(&mut self, n: u16) {
        if (self.top..self.bottom).contains(&self.y) {
            self.shift_down(self.y, self.bottom, n);
            self.carriage_return();
        }
    }

    pub fn delete_lines(&mut self, n: u16) {
        if (self.top..self.bottom).contains(&self.y) {
            self.shift_up(self.y, self.bottom, n, false);
            self.carriage_return();
        }
    }

    // ── erasing ──

    fn erase_cells(&mut self, y: u16, from: u16, to: u16) {
        let blank = self.blank();
        let row = &mut self.rows[usize::from(y)];
        let to = usize::from(to).min(row.cells.len());
        for cell in &mut row.cells[usize::from(from).min(to)..to] {
            *cell = blank.clone();
        }
        row.repair(&blank);
    }

    fn erase_rows(&mut self, from: u16, to: u16) {
        for y in from..to {
            self.rows[usize::from(y)] = self.blank_row();
        }
    }

    /// ED: 0 cursor to end, 1 start to cursor, 2 whole screen, 3 scrollback.
    pub fn erase_display(&mut self, mode: u16) {
        match mode {
            0 => {
                self.erase_cells(self.y, self.x, self.width);
                self.erase_rows(self.y + 1, self.height);
            }
            1 => {
                self.erase_rows(0, self.y);
                self.erase_cells(self.y, 0, self.x + 1);
            }
            2 => self.erase_rows(0, self.height),
            3 => self.clear_scrollback(),
            _ => tracing::debug!(mode, "unknown ED mode"),
        }
    }

    /// EL: 0 cursor to end, 1 start to cursor, 2 whole line.
    pub fn erase_line(&mut self, mode: u16) {
        match mode {
            0 => self.erase_cells(self.y, self.x, self.width),
            1 => self.erase_cells(self.y, 0, self.x + 1),
            2 => self.erase_cells(self.y, 0, self.width),
            _ => tracing::debug!(mode, "unknown EL mode"),
        }
    }

    /// ECH.
    pub fn erase_chars(&mut self, n: u16) {
        self.erase_cells(self.y, self.x, self.x.saturating_add(n));
    }

    /// ICH: shift the rest of the line right; cells pushed past the edge are
    /// lost.
    pub fn insert_chars(&mut self, n: u16) {
        let blank = self.blank();
        let width = usize::from(self.width);
        let x = usize::from(self.x);
        let n = usize::from(n).min(width - x);
        let row = &mut self.rows[usize::from(self.y)];
        row.cells.splice(x..x, std::iter::repeat_n(blank.clone(), n));
        row.cells.truncate(width);
        row.repair(&blank);
    }

    /// DCH: shift the rest of the line left, filling the end with blanks.
    pub fn delete_chars(&mut self, n: u16) {
        let blank = self.blank();
        let width = usize::from(self.width);
        let x = usize::from(self.x);
        let n = usize::from(n).min(width - x);
        let row = &mut self.rows[usize::from(self.y)];
        row.cells.drain(x..x + n);
        row.cells.resize(width, blank.clone());
        row.repair(&blank);
    }

    /// DECALN: fill the screen with `E`.
    pub fn alignment_pattern(&mut self) {
        let cell = Cell::from_char('E');
        for row in &mut self.rows {
            *row = Row::blank(self.width, &cell);
        }
        self.top = 0;
        self.bottom = self.height;
        self.move_to(0, 0);
    }

    /// Blank the matrix, home the cursor, reset pen and region. The
    /// scrollback is kept.
    pub fn clear(&mut self) {
        self.pen = Color::RESET;
        self.erase_rows(0, self.height);
        self.top = 0;
        self.bottom = self.height;
        self.saved = None;
        self.move_to(0, 0);
    }

    /// Change the dimensions, keeping content anchored at the top left. When
    /// the height shrinks below the cursor, lines scroll off the top first.
    pub fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = (width.max(1), height.max(1));
        let blank = Cell::EMPTY;
        for row in &mut self.rows {
            row.cells.resize(usize::from(width), blank.clone());
            row.repair(&blank);
        }
        self.width = width;
        if height < self.height && self.y >= height {
            let excess = self.y - height + 1;
            let keep = self.scrollback_limit > 0;
            self.top = 0;
            self.bottom = self.height;
            self.shift_up(0, self.height, excess, keep);
            self.y -= excess;
        }
        self.rows
            .resize(usize::from(height), Row::blank(width, &Cell::EMPTY));
        self.height = height;
        self.top = 0;
        self.bottom = height;
        self.move_to(self.x, self.y);
    }
}
