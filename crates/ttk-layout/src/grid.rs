#![forbid(unsafe_code)]

//! Grid layout.
//!
//! Items occupy rectangular blocks of cells (`row`, `col`, `rowspan`,
//! `colspan`). Column widths are solved from the items covering each column:
//!
//! - a column with a fixed width takes exactly that;
//! - otherwise its bounds are the tightest bounds of the visible items
//!   covering it, a spanning item contributing an even share to each column;
//! - an empty column is pinned to the configured empty width (0 by default);
//! - the remaining space is shared evenly among the columns still able to grow.
//!
//! Rows are solved the same way.
//!
//! ```text
//!  ┌─────────┬─────────┬┬─────────┐
//!  │ (0,0)   │ (0,1)   ││ (0,3)   │
//!  ├─────────┼─────────┼┼─────────┤  <- empty row
//!  ├─────────┴─────────┼┼─────────┤
//!  │ (2,0) colspan 2   ││         │
//!  └───────────────────┴┴─────────┘
//!                       ^ empty column
//! ```

use std::ops::Range;

use ttk_core::{Error, Result};

use crate::solve::{Span, distribute, offsets};
use crate::{Direction, Hints, ItemId, LayoutItem, Placement, Rect, Size, Slot, check_new};

/// Block of cells held by one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

impl GridCell {
    /// A single cell.
    pub const fn at(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            rowspan: 1,
            colspan: 1,
        }
    }

    pub const fn with_span(mut self, rowspan: usize, colspan: usize) -> Self {
        self.rowspan = rowspan;
        self.colspan = colspan;
        self
    }

    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.rowspan
    }

    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + self.colspan
    }

    pub fn covers(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    /// Position and span along the track axis: rows for `Vertical`,
    /// columns for `Horizontal`.
    fn track(&self, dir: Direction) -> (usize, usize) {
        match dir {
            Direction::Vertical => (self.row, self.rowspan),
            Direction::Horizontal => (self.col, self.colspan),
        }
    }

    fn track_mut(&mut self, dir: Direction) -> (&mut usize, &mut usize) {
        match dir {
            Direction::Vertical => (&mut self.row, &mut self.rowspan),
            Direction::Horizontal => (&mut self.col, &mut self.colspan),
        }
    }
}

/// Direction in which [`GridLayout::expand`] grows an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Share of `value` that falls on track `t` of an item spanning
/// `pos..pos + len`; the first track takes the rounding remainder.
fn span_share(value: u16, t: usize, pos: usize, len: usize) -> u16 {
    let len = u16::try_from(len.max(1)).unwrap_or(u16::MAX);
    let part = value / len;
    if t == pos {
        value - part * (len - 1)
    } else {
        part
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Tracks {
    count: usize,
    fixed: Vec<Option<u16>>,
    /// Size of a track no visible item covers.
    empty: u16,
    /// Sizes from the last reflow.
    sizes: Vec<u16>,
}

impl Tracks {
    fn ensure(&mut self, count: usize) {
        if count > self.count {
            self.count = count;
            self.fixed.resize(count, None);
        }
    }

    fn insert(&mut self, at: usize) {
        self.count += 1;
        self.fixed.insert(at, None);
    }

    fn remove(&mut self, at: usize) {
        self.count -= 1;
        self.fixed.remove(at);
    }

    fn truncate(&mut self, count: usize) {
        self.count = count.min(self.count);
        self.fixed.truncate(self.count);
    }
}

/// Rows × columns of items with spans.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    geometry: Rect,
    direction: Direction,
    slots: Vec<Slot>,
    cells: Vec<GridCell>,
    rows: Tracks,
    cols: Tracks,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid that appends along `direction` and resolves collisions by
    /// inserting a column (`Horizontal`) or a row (`Vertical`).
    pub fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut Vec<Slot> {
        &mut self.slots
    }

    /// `(rows, columns)`, including empty tracks.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.rows.count, self.cols.count)
    }

    fn tracks(&self, dir: Direction) -> &Tracks {
        match dir {
            Direction::Vertical => &self.rows,
            Direction::Horizontal => &self.cols,
        }
    }

    fn tracks_mut(&mut self, dir: Direction) -> &mut Tracks {
        match dir {
            Direction::Vertical => &mut self.rows,
            Direction::Horizontal => &mut self.cols,
        }
    }

    /// Every item with its block, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&LayoutItem, GridCell)> {
        self.slots.iter().map(|s| &s.item).zip(self.cells.iter().copied())
    }

    pub fn cell(&self, index: usize) -> Option<GridCell> {
        self.cells.get(index).copied()
    }

    pub fn cell_of(&self, id: ItemId) -> Option<GridCell> {
        self.index_of(id).map(|i| self.cells[i])
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.slots.iter().position(|s| s.item.widget() == Some(id))
    }

    /// Index of the item covering `(row, col)`.
    pub fn item_at_position(&self, row: usize, col: usize) -> Option<usize> {
        self.cells.iter().position(|c| c.covers(row, col))
    }

    pub fn widget_at_position(&self, row: usize, col: usize) -> Option<ItemId> {
        self.item_at_position(row, col)
            .and_then(|i| self.slots[i].item.widget())
    }

    fn is_free(&self, rows: &Range<usize>, cols: &Range<usize>, except: Option<usize>) -> bool {
        self.cells.iter().enumerate().all(|(i, c)| {
            Some(i) == except || !(overlaps(&c.rows(), rows) && overlaps(&c.cols(), cols))
        })
    }

    /// Smallest `(rows, columns)` holding every item.
    pub fn used_size(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(r, c), cell| {
            (r.max(cell.row + cell.rowspan), c.max(cell.col + cell.colspan))
        })
    }

    // ── adding and removing ──

    /// Append after the last column (`Horizontal`) or row (`Vertical`).
    pub(crate) fn append(&mut self, item: LayoutItem) {
        let cell = match self.direction {
            Direction::Horizontal => GridCell::at(0, self.cols.count),
            Direction::Vertical => GridCell::at(self.rows.count, 0),
        };
        self.push(item, cell);
    }

    fn push(&mut self, item: LayoutItem, cell: GridCell) {
        self.rows.ensure(cell.row + cell.rowspan);
        self.cols.ensure(cell.col + cell.colspan);
        self.slots.push(Slot::new(item));
        self.cells.push(cell);
    }

    pub fn add_widget_at(&mut self, id: ItemId, row: usize, col: usize) -> Result<()> {
        self.add_item_at(LayoutItem::Widget(id), GridCell::at(row, col))
    }

    /// Place `item` on `cell`.
    ///
    /// When the block is taken, a column (or row, for a vertical grid) is
    /// inserted at the target so the occupant shifts away. If an item
    /// spanning across the target still covers it, the call fails with
    /// [`Error::LayoutConflict`].
    pub fn add_item_at(&mut self, item: LayoutItem, cell: GridCell) -> Result<()> {
        if cell.rowspan == 0 || cell.colspan == 0 {
            return Err(Error::InvalidGeometry {
                x: i32::try_from(cell.col).unwrap_or(i32::MAX),
                y: i32::try_from(cell.row).unwrap_or(i32::MAX),
                width: i32::try_from(cell.colspan).unwrap_or(i32::MAX),
                height: i32::try_from(cell.rowspan).unwrap_or(i32::MAX),
            });
        }
        check_new(&self.slots, &item)?;
        if !self.is_free(&cell.rows(), &cell.cols(), None) {
            match self.direction {
                Direction::Horizontal => self.insert_column(cell.col),
                Direction::Vertical => self.insert_row(cell.row),
            }
            tracing::debug!(?cell, direction = ?self.direction, "grid cell taken, shifted");
            if !self.is_free(&cell.rows(), &cell.cols(), None) {
                return Err(Error::LayoutConflict(format!(
                    "cell ({}, {}) is covered by a spanning item",
                    cell.row, cell.col
                )));
            }
        }
        self.push(item, cell);
        Ok(())
    }

    /// Remove the item at `index`; trailing tracks left empty are dropped.
    pub(crate) fn remove(&mut self, index: usize) -> LayoutItem {
        self.cells.remove(index);
        let item = self.slots.remove(index).item;
        let (rows, cols) = self.used_size();
        self.rows.truncate(rows);
        self.cols.truncate(cols);
        item
    }

    // ── tracks ──

    fn insert_track(&mut self, dir: Direction, at: usize) {
        let at = at.min(self.tracks(dir).count);
        self.tracks_mut(dir).insert(at);
        for cell in &mut self.cells {
            let (pos, span) = cell.track_mut(dir);
            if *pos >= at {
                *pos += 1;
            } else if at < *pos + *span {
                *span += 1;
            }
        }
    }

    fn remove_track(&mut self, dir: Direction, at: usize) -> Vec<LayoutItem> {
        if at >= self.tracks(dir).count {
            return Vec::new();
        }
        self.tracks_mut(dir).remove(at);
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.cells.len() {
            let (pos, span) = self.cells[i].track_mut(dir);
            if *pos == at && *span == 1 {
                self.cells.remove(i);
                removed.push(self.slots.remove(i).item);
                continue;
            }
            if *pos > at {
                *pos -= 1;
            } else if at < *pos + *span {
                *span -= 1;
            }
            i += 1;
        }
        removed
    }

    /// Insert an empty row before `row`. Items below shift down; items
    /// spanning across it grow.
    pub fn insert_row(&mut self, row: usize) {
        self.insert_track(Direction::Vertical, row);
    }

    pub fn insert_column(&mut self, col: usize) {
        self.insert_track(Direction::Horizontal, col);
    }

    /// Remove `row`. Items living only on it are returned; items spanning
    /// across it shrink.
    pub fn remove_row(&mut self, row: usize) -> Vec<LayoutItem> {
        self.remove_track(Direction::Vertical, row)
    }

    pub fn remove_column(&mut self, col: usize) -> Vec<LayoutItem> {
        self.remove_track(Direction::Horizontal, col)
    }

    /// Drop every row and column no item covers.
    pub fn repack(&mut self) {
        for dir in [Direction::Vertical, Direction::Horizontal] {
            for t in (0..self.tracks(dir).count).rev() {
                let used = self.cells.iter().any(|c| {
                    let (pos, span) = c.track(dir);
                    (pos..pos + span).contains(&t)
                });
                if !used {
                    self.remove_track(dir, t);
                }
            }
        }
    }

    /// Grow a widget by one track toward `side`, into cells that must be
    /// empty and inside the grid.
    pub fn expand(&mut self, id: ItemId, side: Side) -> Result<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::OutOfTree(format!("{id:?} is not in this grid")))?;
        let cell = self.cells[index];
        let edge = || Error::LayoutConflict(format!("{id:?} cannot grow {side:?} past the grid edge"));
        let (grown, rows, cols) = match side {
            Side::Top => {
                let row = cell.row.checked_sub(1).ok_or_else(edge)?;
                let grown = GridCell {
                    row,
                    rowspan: cell.rowspan + 1,
                    ..cell
                };
                (grown, row..row + 1, cell.cols())
            }
            Side::Bottom => {
                let row = cell.row + cell.rowspan;
                if row >= self.rows.count {
                    return Err(edge());
                }
                let grown = GridCell {
                    rowspan: cell.rowspan + 1,
                    ..cell
                };
                (grown, row..row + 1, cell.cols())
            }
            Side::Left => {
                let col = cell.col.checked_sub(1).ok_or_else(edge)?;
                let grown = GridCell {
                    col,
                    colspan: cell.colspan + 1,
                    ..cell
                };
                (grown, cell.rows(), col..col + 1)
            }
            Side::Right => {
                let col = cell.col + cell.colspan;
                if col >= self.cols.count {
                    return Err(edge());
                }
                let grown = GridCell {
                    colspan: cell.colspan + 1,
                    ..cell
                };
                (grown, cell.rows(), col..col + 1)
            }
        };
        if !self.is_free(&rows, &cols, Some(index)) {
            return Err(Error::LayoutConflict(format!(
                "{id:?} cannot grow {side:?}: cells are taken"
            )));
        }
        self.cells[index] = grown;
        Ok(())
    }

    // ── track sizes ──

    /// Pin a column to `width` cells.
    pub fn set_column_width(&mut self, col: usize, width: u16) {
        self.cols.ensure(col + 1);
        self.cols.fixed[col] = Some(width);
    }

    pub fn clear_column_width(&mut self, col: usize) {
        if let Some(f) = self.cols.fixed.get_mut(col) {
            *f = None;
        }
    }

    pub fn set_row_height(&mut self, row: usize, height: u16) {
        self.rows.ensure(row + 1);
        self.rows.fixed[row] = Some(height);
    }

    pub fn clear_row_height(&mut self, row: usize) {
        if let Some(f) = self.rows.fixed.get_mut(row) {
            *f = None;
        }
    }

    /// Width of columns no visible item covers.
    pub fn set_column_min_width(&mut self, width: u16) {
        self.cols.empty = width;
    }

    /// Height of rows no visible item covers.
    pub fn set_row_min_height(&mut self, height: u16) {
        self.rows.empty = height;
    }

    /// Column widths from the last reflow.
    pub fn column_sizes(&self) -> &[u16] {
        &self.cols.sizes
    }

    pub fn row_sizes(&self) -> &[u16] {
        &self.rows.sizes
    }

    fn track_spans(&self, dir: Direction, hints: &[Option<Hints>]) -> Vec<Span> {
        let tracks = self.tracks(dir);
        (0..tracks.count)
            .map(|t| {
                if let Some(size) = tracks.fixed[t] {
                    return Span::fixed(size);
                }
                let mut acc: Option<Span> = None;
                for (cell, hint) in self.cells.iter().zip(hints) {
                    let Some(hint) = hint else { continue };
                    let (pos, len) = cell.track(dir);
                    if !(pos..pos + len).contains(&t) {
                        continue;
                    }
                    let s = hint.span(dir);
                    let part = Span::new(
                        span_share(s.min, t, pos, len),
                        span_share(s.max, t, pos, len),
                    );
                    acc = Some(match acc {
                        None => part,
                        Some(a) => Span::new(a.min.max(part.min), a.max.min(part.max)),
                    });
                }
                acc.unwrap_or(Span::fixed(tracks.empty))
            })
            .collect()
    }

    pub fn hints<F>(&self, measure: &F) -> Hints
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        if self.slots.is_empty() {
            return Hints::default();
        }
        let hints: Vec<_> = self.slots.iter().map(|s| s.item.hints(measure)).collect();
        let sum = |spans: Vec<Span>| {
            spans.iter().fold((0u16, 0u16), |(lo, hi), s| {
                (lo.saturating_add(s.min), hi.saturating_add(s.max.max(s.min)))
            })
        };
        let (min_w, max_w) = sum(self.track_spans(Direction::Horizontal, &hints));
        let (min_h, max_h) = sum(self.track_spans(Direction::Vertical, &hints));
        Hints::new(Size::new(min_w, min_h), Size::new(max_w, max_h))
    }

    pub(crate) fn reflow_into<F>(&mut self, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let hints: Vec<_> = self.slots.iter().map(|s| s.item.hints(measure)).collect();
        let col_sizes = distribute(
            &self.track_spans(Direction::Horizontal, &hints),
            self.geometry.width,
        );
        let row_sizes = distribute(
            &self.track_spans(Direction::Vertical, &hints),
            self.geometry.height,
        );
        let xs = offsets(self.geometry.x, &col_sizes);
        let ys = offsets(self.geometry.y, &row_sizes);
        let extent = |sizes: &[u16], range: Range<usize>| {
            sizes[range].iter().fold(0u16, |acc, &s| acc.saturating_add(s))
        };

        for ((slot, cell), hint) in self.slots.iter_mut().zip(&self.cells).zip(&hints) {
            if hint.is_none() {
                slot.rect = Rect::default();
                continue;
            }
            let rect = Rect::new(
                xs[cell.col],
                ys[cell.row],
                extent(&col_sizes, cell.cols()),
                extent(&row_sizes, cell.rows()),
            );
            slot.rect = rect;
            slot.item.place(rect, measure, out);
        }
        self.cols.sizes = col_sizes;
        self.rows.sizes = row_sizes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Layout;

    fn flex(_: ItemId) -> Option<Hints> {
        Some(Hints::default())
    }

    fn grid_2x2() -> GridLayout {
        let mut g = GridLayout::new();
        for (i, (r, c)) in [(0, 0), (0, 1), (1, 0), (1, 1)].into_iter().enumerate() {
            g.add_widget_at(ItemId(i), r, c).unwrap();
        }
        g
    }

    fn reflow(g: GridLayout, area: Rect) -> (GridLayout, Vec<Rect>) {
        let mut l = Layout::from(g);
        l.set_geometry(area);
        let rects = l.reflow(&flex).into_iter().map(|p| p.rect).collect();
        match l {
            Layout::Grid(g) => (g, rects),
            _ => unreachable!(),
        }
    }

    // ── placement ──

    #[test]
    fn append_follows_direction() {
        let mut h = Layout::grid();
        h.add_widget(ItemId(0)).unwrap();
        h.add_widget(ItemId(1)).unwrap();
        let Layout::Grid(h) = h else { unreachable!() };
        assert_eq!(h.cell_of(ItemId(1)), Some(GridCell::at(0, 1)));

        let mut v = GridLayout::with_direction(Direction::Vertical);
        v.append(ItemId(0).into());
        v.append(ItemId(1).into());
        assert_eq!(v.cell_of(ItemId(1)), Some(GridCell::at(1, 0)));
        assert_eq!(v.grid_size(), (2, 1));
    }

    #[test]
    fn occupied_cell_shifts_column() {
        let mut g = GridLayout::new();
        g.add_widget_at(ItemId(0), 0, 0).unwrap();
        g.add_widget_at(ItemId(1), 0, 0).unwrap();
        assert_eq!(g.cell_of(ItemId(0)), Some(GridCell::at(0, 1)));
        assert_eq!(g.cell_of(ItemId(1)), Some(GridCell::at(0, 0)));
    }

    #[test]
    fn occupied_cell_shifts_row_when_vertical() {
        let mut g = GridLayout::with_direction(Direction::Vertical);
        g.add_widget_at(ItemId(0), 1, 0).unwrap();
        g.add_widget_at(ItemId(1), 1, 0).unwrap();
        assert_eq!(g.cell_of(ItemId(0)), Some(GridCell::at(2, 0)));
        assert_eq!(g.grid_size(), (3, 1));
    }

    #[test]
    fn spanning_occupant_is_a_conflict() {
        let mut g = GridLayout::new();
        g.add_item_at(ItemId(0).into(), GridCell::at(0, 0).with_span(1, 3))
            .unwrap();
        let err = g.add_widget_at(ItemId(1), 0, 1).unwrap_err();
        assert!(matches!(err, Error::LayoutConflict(_)));
    }

    #[test]
    fn zero_span_is_invalid() {
        let mut g = GridLayout::new();
        let err = g
            .add_item_at(ItemId(0).into(), GridCell::at(0, 0).with_span(0, 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { .. }));
    }

    #[test]
    fn removal_trims_trailing_tracks() {
        let mut g = grid_2x2();
        g.add_widget_at(ItemId(9), 3, 3).unwrap();
        assert_eq!(g.grid_size(), (4, 4));
        g.remove(4);
        assert_eq!(g.grid_size(), (2, 2));
    }

    #[test]
    fn position_lookup_sees_spans() {
        let mut g = GridLayout::new();
        g.add_item_at(ItemId(5).into(), GridCell::at(1, 1).with_span(2, 2))
            .unwrap();
        assert_eq!(g.widget_at_position(2, 2), Some(ItemId(5)));
        assert_eq!(g.widget_at_position(0, 0), None);
        assert_eq!(g.widget_at_position(3, 1), None);
    }

    // ── tracks ──

    #[test]
    fn insert_row_shifts_and_grows() {
        let mut g = GridLayout::new();
        g.add_widget_at(ItemId(0), 0, 0).unwrap();
        g.add_item_at(ItemId(1).into(), GridCell::at(0, 1).with_span(2, 1))
            .unwrap();
        g.add_widget_at(ItemId(2), 1, 0).unwrap();
        g.insert_row(1);
        assert_eq!(g.cell_of(ItemId(0)), Some(GridCell::at(0, 0)));
        assert_eq!(
            g.cell_of(ItemId(1)),
            Some(GridCell::at(0, 1).with_span(3, 1))
        );
        assert_eq!(g.cell_of(ItemId(2)), Some(GridCell::at(2, 0)));
        assert_eq!(g.grid_size(), (3, 2));
    }

    #[test]
    fn remove_column_drops_single_items() {
        let mut g = grid_2x2();
        let removed = g.remove_column(0);
        assert_eq!(
            removed,
            vec![LayoutItem::Widget(ItemId(0)), LayoutItem::Widget(ItemId(2))]
        );
        assert_eq!(g.cell_of(ItemId(1)), Some(GridCell::at(0, 0)));
        assert_eq!(g.grid_size(), (2, 1));
        assert!(g.remove_column(7).is_empty());
    }

    #[test]
    fn repack_removes_empty_tracks() {
        let mut g = GridLayout::new();
        g.add_widget_at(ItemId(0), 0, 0).unwrap();
        g.add_widget_at(ItemId(1), 2, 3).unwrap();
        g.insert_column(1);
        assert_eq!(g.grid_size(), (3, 5));
        g.repack();
        assert_eq!(g.grid_size(), (2, 2));
        assert_eq!(g.cell_of(ItemId(1)), Some(GridCell::at(1, 1)));
    }

    // ── expand ──

    #[test]
    fn expand_into_empty_neighbors() {
        let mut g = GridLayout::new();
        g.add_widget_at(ItemId(0), 0, 0).unwrap();
        g.add_widget_at(ItemId(1), 1, 1).unwrap();
        g.expand(ItemId(0), Side::Right).unwrap();
        assert_eq!(g.cell_of(ItemId(0)), Some(GridCell::at(0, 0).with_span(1, 2)));
        g.expand(ItemId(1), Side::Left).unwrap();
        assert_eq!(g.cell_of(ItemId(1)), Some(GridCell::at(1, 0).with_span(1, 2)));
    }

    #[test]
    fn expand_into_occupied_or_edge_fails() {
        let mut g = grid_2x2();
        assert!(matches!(
            g.expand(ItemId(0), Side::Bottom),
            Err(Error::LayoutConflict(_))
        ));
        assert!(matches!(
            g.expand(ItemId(0), Side::Top),
            Err(Error::LayoutConflict(_))
        ));
        assert!(matches!(
            g.expand(ItemId(3), Side::Right),
            Err(Error::LayoutConflict(_))
        ));
        assert!(matches!(
            g.expand(ItemId(42), Side::Right),
            Err(Error::OutOfTree(_))
        ));
        assert_eq!(g.cell_of(ItemId(0)), Some(GridCell::at(0, 0)));
    }

    // ── solving ──

    #[test]
    fn even_grid() {
        let (g, rects) = reflow(grid_2x2(), Rect::new(0, 0, 20, 6));
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 10, 3),
                Rect::new(10, 0, 10, 3),
                Rect::new(0, 3, 10, 3),
                Rect::new(10, 3, 10, 3),
            ]
        );
        assert_eq!(g.column_sizes(), &[10, 10]);
    }

    #[test]
    fn spanning_item_covers_tracks() {
        let mut g = GridLayout::new();
        g.add_item_at(ItemId(0).into(), GridCell::at(0, 0).with_span(1, 2))
            .unwrap();
        g.add_widget_at(ItemId(1), 1, 0).unwrap();
        g.add_widget_at(ItemId(2), 1, 1).unwrap();
        let (_, rects) = reflow(g, Rect::new(0, 0, 9, 4));
        assert_eq!(rects[0], Rect::new(0, 0, 9, 2));
        assert_eq!(rects[1], Rect::new(0, 2, 5, 2));
        assert_eq!(rects[2], Rect::new(5, 2, 4, 2));
    }

    #[test]
    fn empty_tracks_use_min_size() {
        let mut g = GridLayout::new();
        g.add_widget_at(ItemId(0), 0, 0).unwrap();
        g.add_widget_at(ItemId(1), 0, 2).unwrap();
        g.set_column_min_width(2);
        let (g, rects) = reflow(g, Rect::new(0, 0, 12, 1));
        assert_eq!(g.column_sizes(), &[5, 2, 5]);
        assert_eq!(rects[1], Rect::new(7, 0, 5, 1));
    }

    #[test]
    fn item_bounds_limit_tracks() {
        let mut g = grid_2x2();
        g.set_geometry(Rect::new(0, 0, 20, 6));
        let narrow = |id: ItemId| {
            Some(if id.0 == 0 {
                Hints::new(Size::ZERO, Size::new(4, 9))
            } else {
                Hints::default()
            })
        };
        let mut out = Vec::new();
        g.reflow_into(&narrow, &mut out);
        assert_eq!(g.column_sizes(), &[4, 16]);
        let h = g.hints(&narrow);
        assert_eq!(h.max.width, 4u16.saturating_add(u16::MAX));
        assert_eq!(h.min, Size::ZERO);
    }
}
