#![forbid(unsafe_code)]

//! Canvas grid storage, blitting, and ANSI serialization.
//!
//! Cells are stored row-major: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. A wide glyph at `(x, y)` is followed by [`Glyph::Continuation`] at
//!    `(x + 1, y)`. [`Canvas::put`] keeps the pair together.
//! 3. A blit never writes outside its clip rectangle, so it can leave half
//!    of a destination wide glyph that straddles the clip edge. Serialization
//!    shows such a half as a space in its own color.

use ttk_core::{Point, Rect, Size};
use ttk_style::{Color, ColorProfile, Rgb};

use crate::ansi;
use crate::cell::{Cell, Glyph};

/// Color of the marker drawn where a clip edge cuts a wide glyph.
pub fn wide_overflow_color() -> Color {
    Color::fg_rgb(Rgb::new(0x88, 0x88, 0x88)).with_bg(Some(Rgb::new(0x00, 0x00, 0x88)))
}

/// A fixed-size grid of cells.
///
/// # Example
///
/// ```
/// use ttk_render::Canvas;
/// use ttk_style::Color;
///
/// let mut canvas = Canvas::new(4, 1);
/// canvas.set(0, 0, "H", &Color::BOLD);
/// canvas.set_char(1, 0, 'i', &Color::RESET);
/// assert_eq!(canvas.row_text(0).as_deref(), Some("Hi  "));
/// ```
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// Frame last handed out by [`Canvas::to_ansi_buffered`].
    front: Option<Vec<Cell>>,
    visible: bool,
    transparent: bool,
    overflow: [char; 2],
}

/// How a cell appears on the terminal after wide-glyph normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shown<'a> {
    Cell(&'a Cell),
    /// Orphaned half of a wide glyph.
    Blank(&'a Color),
    /// Right half of the wide glyph printed just before.
    Covered,
}

pub(crate) fn shown(row: &[Cell], x: usize) -> Shown<'_> {
    let cell = &row[x];
    match &cell.glyph {
        Glyph::Continuation => {
            if x > 0 && row[x - 1].glyph.is_wide() {
                Shown::Covered
            } else {
                Shown::Blank(&cell.color)
            }
        }
        g if g.is_wide() => {
            if row.get(x + 1).is_some_and(|c| c.glyph.is_continuation()) {
                Shown::Cell(cell)
            } else {
                Shown::Blank(&cell.color)
            }
        }
        _ => Shown::Cell(cell),
    }
}

impl Canvas {
    /// Canvas filled with [`Cell::EMPTY`].
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; len],
            front: None,
            visible: true,
            transparent: false,
            overflow: ['<', '>'],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// `(0, 0, width, height)`.
    pub fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// A transparent canvas lets the destination show through its
    /// background-less spaces when blitted.
    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    /// Markers for a wide glyph cut by the left and right clip edge.
    pub fn set_wide_overflow(&mut self, chars: [char; 2]) {
        self.overflow = chars;
    }

    pub(crate) fn overflow(&self) -> [char; 2] {
        self.overflow
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let w = usize::from(self.width);
        (x < w && y < usize::from(self.height)).then_some(y * w + x)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells of row `y`, or an empty slice when out of range.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        &self.cells[start..start + w]
    }

    /// Same size and same cells; visibility and the front buffer are ignored.
    pub fn content_eq(&self, other: &Canvas) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }

    // ── writing ──

    /// Write one glyph cluster. Out-of-range coordinates and empty strings
    /// are ignored.
    pub fn set(&mut self, x: i32, y: i32, glyph: &str, color: &Color) {
        if let Some(glyph) = Glyph::from_cluster(glyph) {
            self.put(x, y, glyph, color);
        }
    }

    pub fn set_char(&mut self, x: i32, y: i32, ch: char, color: &Color) {
        self.put(x, y, Glyph::Char(ch), color);
    }

    /// Write `glyph` at `(x, y)`, resolving any gradient in `color` for that
    /// cell.
    ///
    /// - Whatever wide glyph the write overlaps is cleared to a space.
    /// - A wide glyph in the last column is written as a space.
    /// - A bare [`Glyph::Continuation`] is ignored; continuations are only
    ///   written together with their head.
    pub fn put(&mut self, x: i32, y: i32, glyph: Glyph, color: &Color) {
        if glyph.is_continuation() {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let color = color.resolve(x, y);
        let glyph = if glyph.is_wide() && x + 1 >= i32::from(self.width) {
            Glyph::Char(' ')
        } else {
            glyph
        };
        self.cleanup_overlap(x, y);
        if glyph.is_wide() {
            self.cleanup_overlap(x + 1, y);
            self.cells[idx + 1] = Cell::new(Glyph::Continuation, color.clone());
        }
        self.cells[idx] = Cell::new(glyph, color);
    }

    /// Clear the other half of any wide glyph occupying `(x, y)`.
    fn cleanup_overlap(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.cells[idx].glyph.is_wide() {
            if let Some(tail) = self.index(x + 1, y)
                && self.cells[tail].glyph.is_continuation()
            {
                self.cells[tail] = Cell::EMPTY;
            }
        } else if self.cells[idx].glyph.is_continuation()
            && let Some(head) = self.index(x - 1, y)
            && self.cells[head].glyph.is_wide()
        {
            self.cells[head] = Cell::EMPTY;
        }
    }

    /// Fill `rect` (clipped to the canvas) with `ch`.
    pub fn fill(&mut self, rect: Rect, ch: char, color: &Color) {
        let rect = rect.intersection(&self.area());
        let step = Glyph::Char(ch).width().max(1);
        for y in rect.y..rect.bottom() {
            let mut x = rect.x;
            while x < rect.right() {
                self.put(i32::from(x), i32::from(y), Glyph::Char(ch), color);
                x = x.saturating_add(step as u16);
            }
        }
    }

    /// Fill `rect` with spaces in the reset color.
    pub fn clear(&mut self, rect: Rect) {
        self.fill(rect, ' ', &Color::RESET);
    }

    /// Every cell back to [`Cell::EMPTY`].
    pub fn clear_all(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Reallocate to `width × height`. Content inside both sizes is kept;
    /// new cells are empty. The next buffered frame is a full repaint.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let (w, h) = (usize::from(width), usize::from(height));
        let mut cells = vec![Cell::EMPTY; w * h];
        let keep_w = w.min(usize::from(self.width));
        let keep_h = h.min(usize::from(self.height));
        let old_w = usize::from(self.width);
        for y in 0..keep_h {
            let src = &self.cells[y * old_w..y * old_w + keep_w];
            cells[y * w..y * w + keep_w].clone_from_slice(src);
            // a wide glyph whose right half fell off the new edge
            if keep_w > 0 && cells[y * w + keep_w - 1].glyph.is_wide() && keep_w == w {
                cells[y * w + keep_w - 1] = Cell::EMPTY;
            }
        }
        tracing::debug!(
            from_w = self.width,
            from_h = self.height,
            width,
            height,
            "canvas resized"
        );
        self.width = width;
        self.height = height;
        self.cells = cells;
        self.front = None;
    }

    // ── blit ──

    /// Copy `src_rect` of `src` so that its top-left lands on `dst`, writing
    /// only cells inside `clip`.
    ///
    /// - When `src` is transparent, its background-less spaces are skipped.
    /// - A wide glyph cut by the copied range becomes an overflow marker.
    /// - Nothing is copied when either canvas is hidden.
    pub fn blit(&mut self, src: &Canvas, src_rect: Rect, dst: impl Into<Point>, clip: Rect) {
        if !self.visible || !src.visible {
            return;
        }
        let dst = dst.into();
        let src_rect = src_rect.intersection(&src.area());
        let clip = clip.intersection(&self.area());
        if src_rect.is_empty() || clip.is_empty() {
            return;
        }
        let ox = dst.x - i32::from(src_rect.x);
        let oy = dst.y - i32::from(src_rect.y);

        if ox == 0
            && oy == 0
            && !src.transparent
            && src.size() == self.size()
            && src_rect == src.area()
            && clip == self.area()
        {
            self.cells.clone_from(&src.cells);
            return;
        }

        let x0 = i32::from(src_rect.x).max(i32::from(clip.x) - ox);
        let x1 = i32::from(src_rect.right()).min(i32::from(clip.right()) - ox);
        let y0 = i32::from(src_rect.y).max(i32::from(clip.y) - oy);
        let y1 = i32::from(src_rect.bottom()).min(i32::from(clip.bottom()) - oy);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let marker = wide_overflow_color();
        let [left_mark, right_mark] = self.overflow;
        for sy in y0..y1 {
            for sx in x0..x1 {
                let Some(cell) = src.get(sx, sy) else {
                    continue;
                };
                if src.transparent && cell.is_see_through() {
                    continue;
                }
                let cell = match &cell.glyph {
                    Glyph::Continuation if sx == x0 => Cell::new(Glyph::Char(left_mark), marker.clone()),
                    g if g.is_wide() && sx + 1 >= x1 => {
                        Cell::new(Glyph::Char(right_mark), marker.clone())
                    }
                    _ => cell.clone(),
                };
                self.write_clipped(sx + ox, sy + oy, cell, clip);
            }
        }
    }

    /// Raw write that repairs overlapped wide glyphs only inside `clip`.
    fn write_clipped(&mut self, x: i32, y: i32, cell: Cell, clip: Rect) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let inside = |cx: i32| u16::try_from(cx).is_ok_and(|cx| cx >= clip.x && cx < clip.right());
        let current = &self.cells[idx].glyph;
        if current.is_wide() {
            if inside(x + 1) && self.cells[idx + 1].glyph.is_continuation() {
                self.cells[idx + 1] = Cell::EMPTY;
            }
        } else if current.is_continuation()
            && !cell.glyph.is_continuation()
            && inside(x - 1)
            && self.cells[idx - 1].glyph.is_wide()
        {
            self.cells[idx - 1] = Cell::EMPTY;
        }
        self.cells[idx] = cell;
    }

    // ── serialization ──

    /// The whole canvas, one CUP per row, assuming a reset terminal.
    pub fn to_ansi(&self) -> String {
        self.to_ansi_with(ColorProfile::TrueColor)
    }

    pub fn to_ansi_with(&self, profile: ColorProfile) -> String {
        let mut out = String::new();
        self.write_frame(None, profile, 0, &mut out);
        out
    }

    /// Only the cells that differ from `prev`, each run prefixed with a CUP.
    /// A `prev` of another size yields the whole canvas.
    pub fn to_ansi_diff(&self, prev: &Canvas) -> String {
        self.to_ansi_diff_with(prev, ColorProfile::TrueColor)
    }

    pub fn to_ansi_diff_with(&self, prev: &Canvas, profile: ColorProfile) -> String {
        let mut out = String::new();
        let prev = (prev.size() == self.size()).then_some(prev.cells.as_slice());
        self.write_frame(prev, profile, 0, &mut out);
        out
    }

    /// Diff against the frame returned by the previous call, then remember
    /// this one.
    pub fn to_ansi_buffered(&mut self) -> String {
        self.to_ansi_buffered_with(ColorProfile::TrueColor)
    }

    pub fn to_ansi_buffered_with(&mut self, profile: ColorProfile) -> String {
        self.to_ansi_buffered_at(0, profile)
    }

    /// Like [`Canvas::to_ansi_buffered_with`], with the canvas shown from
    /// terminal row `top` down. Inline mode draws below existing output.
    pub fn to_ansi_buffered_at(&mut self, top: u16, profile: ColorProfile) -> String {
        let mut out = String::new();
        let prev = self
            .front
            .as_deref()
            .filter(|front| front.len() == self.cells.len());
        self.write_frame(prev, profile, usize::from(top), &mut out);
        match &mut self.front {
            Some(front) => front.clone_from(&self.cells),
            None => self.front = Some(self.cells.clone()),
        }
        out
    }

    /// Forget the front buffer so the next buffered frame repaints every cell.
    pub fn full_repaint(&mut self) {
        self.front = None;
    }

    fn write_frame(&self, prev: Option<&[Cell]>, profile: ColorProfile, top: usize, out: &mut String) {
        let w = usize::from(self.width);
        let mut last = Color::RESET;
        let mut changed = 0usize;
        for y in 0..usize::from(self.height) {
            let row = &self.cells[y * w..(y + 1) * w];
            let prev_row = prev.map(|p| &p[y * w..(y + 1) * w]);
            let mut in_run = false;
            for x in 0..w {
                let now = shown(row, x);
                if prev_row.is_some_and(|p| shown(p, x) == now) {
                    in_run = false;
                    continue;
                }
                let (glyph, color) = match now {
                    Shown::Covered => continue,
                    Shown::Cell(cell) => (&cell.glyph, &cell.color),
                    Shown::Blank(color) => (&Glyph::Char(' '), color),
                };
                if !in_run {
                    ansi::cup(out, x, y + top);
                    in_run = true;
                }
                color.write_transition(&last, profile, out);
                if *color != last {
                    last = color.clone();
                }
                glyph.push_to(out);
                changed += 1;
            }
        }
        if !last.is_plain() {
            Color::RESET.write_transition(&last, profile, out);
        }
        tracing::trace!(changed, bytes = out.len(), full = prev.is_none(), "canvas frame");
    }

    // ── readback ──

    /// Text of row `y`; a wide glyph contributes its text once.
    pub fn row_text(&self, y: u16) -> Option<String> {
        if y >= self.height {
            return None;
        }
        let mut out = String::with_capacity(usize::from(self.width));
        for cell in self.row(y) {
            cell.glyph.push_to(&mut out);
        }
        Some(out)
    }

    /// Every row, joined with `\n`.
    pub fn to_plain(&self) -> String {
        (0..self.height)
            .filter_map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
