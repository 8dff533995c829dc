#![forbid(unsafe_code)]

//! Layout solvers.
//!
//! A [`Layout`] owns an ordered list of [`LayoutItem`]s, each either a widget
//! handle ([`ItemId`]) or a nested layout, and turns its own geometry into
//! one rectangle per visible widget:
//!
//! - [`FreeLayout`] - children keep their explicit geometry
//! - [`BoxLayout`] - one axis divided between children, the other filled
//! - [`GridLayout`] - rows × columns with spans, fixed tracks and repacking
//! - [`SplitterLayout`] - a box that remembers user-dragged divider positions
//!
//! Layouts know nothing about widgets. Size bounds come from a measurer
//! callback that returns [`Hints`] for a widget handle, or `None` for a
//! hidden widget, which is then skipped.
//!
//! # Example
//!
//! ```
//! use ttk_core::Rect;
//! use ttk_layout::{Hints, ItemId, Layout, Placement};
//!
//! let mut row = Layout::hbox();
//! row.add_widget(ItemId(1)).unwrap();
//! row.add_widget(ItemId(2)).unwrap();
//! row.set_geometry(Rect::new(0, 0, 20, 3));
//!
//! let placed = row.reflow(&|_| Some(Hints::default()));
//! assert_eq!(
//!     placed,
//!     vec![
//!         Placement { id: ItemId(1), rect: Rect::new(0, 0, 10, 3) },
//!         Placement { id: ItemId(2), rect: Rect::new(10, 0, 10, 3) },
//!     ]
//! );
//! ```

pub mod box_layout;
pub mod free;
pub mod grid;
pub mod solve;
pub mod splitter;

pub use box_layout::BoxLayout;
pub use free::FreeLayout;
pub use grid::{GridCell, GridLayout, Side};
pub use solve::{Span, distribute};
pub use splitter::SplitterLayout;
pub use ttk_core::geometry::{Point, Rect, Size};

use ttk_core::{Error, Result};

/// Opaque handle for a widget managed by a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

/// Main axis of a box or splitter, and the fill order of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

/// Size bounds of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hints {
    pub min: Size,
    pub max: Size,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            min: Size::ZERO,
            max: Size::MAX,
        }
    }
}

impl Hints {
    pub const fn new(min: Size, max: Size) -> Self {
        Self { min, max }
    }

    /// Same min and max.
    pub const fn fixed(size: Size) -> Self {
        Self::new(size, size)
    }

    /// Bounds along `dir`.
    pub fn span(&self, dir: Direction) -> Span {
        match dir {
            Direction::Horizontal => Span::new(self.min.width, self.max.width),
            Direction::Vertical => Span::new(self.min.height, self.max.height),
        }
    }

    /// `space` clamped into the bounds along `dir`.
    pub fn clamp(&self, dir: Direction, space: u16) -> u16 {
        let span = self.span(dir);
        space.max(span.min).min(span.max.max(span.min))
    }
}

/// Final rectangle of one widget, in the coordinates the layout geometry
/// is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub id: ItemId,
    pub rect: Rect,
}

/// One entry of a layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    Widget(ItemId),
    Layout(Box<Layout>),
}

impl From<ItemId> for LayoutItem {
    fn from(id: ItemId) -> Self {
        LayoutItem::Widget(id)
    }
}

impl From<Layout> for LayoutItem {
    fn from(layout: Layout) -> Self {
        LayoutItem::Layout(Box::new(layout))
    }
}

impl LayoutItem {
    /// Bounds of the item, `None` when it is a hidden widget.
    pub fn hints<F>(&self, measure: &F) -> Option<Hints>
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        match self {
            LayoutItem::Widget(id) => measure(*id),
            LayoutItem::Layout(layout) => Some(layout.hints(measure)),
        }
    }

    pub fn widget(&self) -> Option<ItemId> {
        match self {
            LayoutItem::Widget(id) => Some(*id),
            LayoutItem::Layout(_) => None,
        }
    }

    /// Whether `id` is this item or anywhere below it.
    pub fn contains(&self, id: ItemId) -> bool {
        match self {
            LayoutItem::Widget(own) => *own == id,
            LayoutItem::Layout(layout) => layout.contains(id),
        }
    }

    /// Record the item at `rect`; nested layouts arrange their own children.
    pub(crate) fn place<F>(&mut self, rect: Rect, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        match self {
            LayoutItem::Widget(id) => out.push(Placement { id: *id, rect }),
            LayoutItem::Layout(layout) => {
                layout.set_geometry(rect);
                layout.reflow_into(measure, out);
            }
        }
    }
}

/// A layout item together with the rectangle it got at the last reflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub item: LayoutItem,
    pub rect: Rect,
}

impl Slot {
    pub fn new(item: LayoutItem) -> Self {
        Self {
            item,
            rect: Rect::default(),
        }
    }
}

/// Any layout variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Free(FreeLayout),
    Box(BoxLayout),
    Grid(GridLayout),
    Splitter(SplitterLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Free(FreeLayout::new())
    }
}

impl From<FreeLayout> for Layout {
    fn from(l: FreeLayout) -> Self {
        Layout::Free(l)
    }
}

impl From<BoxLayout> for Layout {
    fn from(l: BoxLayout) -> Self {
        Layout::Box(l)
    }
}

impl From<GridLayout> for Layout {
    fn from(l: GridLayout) -> Self {
        Layout::Grid(l)
    }
}

impl From<SplitterLayout> for Layout {
    fn from(l: SplitterLayout) -> Self {
        Layout::Splitter(l)
    }
}

impl Layout {
    pub fn free() -> Self {
        FreeLayout::new().into()
    }

    pub fn hbox() -> Self {
        BoxLayout::new(Direction::Horizontal).into()
    }

    pub fn vbox() -> Self {
        BoxLayout::new(Direction::Vertical).into()
    }

    pub fn grid() -> Self {
        GridLayout::new().into()
    }

    pub fn splitter(direction: Direction) -> Self {
        SplitterLayout::new(direction).into()
    }

    fn kind(&self) -> &'static str {
        match self {
            Layout::Free(_) => "free",
            Layout::Box(b) if b.direction() == Direction::Horizontal => "hbox",
            Layout::Box(_) => "vbox",
            Layout::Grid(_) => "grid",
            Layout::Splitter(_) => "splitter",
        }
    }

    pub fn slots(&self) -> &[Slot] {
        match self {
            Layout::Free(l) => l.slots(),
            Layout::Box(l) => l.slots(),
            Layout::Grid(l) => l.slots(),
            Layout::Splitter(l) => l.slots(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&LayoutItem> {
        self.slots().get(index).map(|s| &s.item)
    }

    pub fn geometry(&self) -> Rect {
        match self {
            Layout::Free(l) => l.geometry(),
            Layout::Box(l) => l.geometry(),
            Layout::Grid(l) => l.geometry(),
            Layout::Splitter(l) => l.geometry(),
        }
    }

    /// Move/resize the layout. Call [`reflow`](Self::reflow) afterwards.
    pub fn set_geometry(&mut self, rect: Rect) {
        match self {
            Layout::Free(l) => l.set_geometry(rect),
            Layout::Box(l) => l.set_geometry(rect),
            Layout::Grid(l) => l.set_geometry(rect),
            Layout::Splitter(l) => l.set_geometry(rect),
        }
    }

    /// Whether the widget is managed here or by a nested layout.
    pub fn contains(&self, id: ItemId) -> bool {
        self.slots().iter().any(|s| s.item.contains(id))
    }

    /// Every widget handle, depth first, in item order.
    pub fn widgets(&self) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.collect_widgets(&mut out);
        out
    }

    fn collect_widgets(&self, out: &mut Vec<ItemId>) {
        for slot in self.slots() {
            match &slot.item {
                LayoutItem::Widget(id) => out.push(*id),
                LayoutItem::Layout(l) => l.collect_widgets(out),
            }
        }
    }

    fn check_new(&self, item: &LayoutItem) -> Result<()> {
        check_new(self.slots(), item)
    }

    pub fn add_widget(&mut self, id: ItemId) -> Result<()> {
        self.add_item(LayoutItem::Widget(id))
    }

    pub fn add_layout(&mut self, layout: impl Into<Layout>) -> Result<()> {
        self.add_item(LayoutItem::from(layout.into()))
    }

    /// Append an item. A grid places it after its last row or column.
    pub fn add_item(&mut self, item: LayoutItem) -> Result<()> {
        self.insert_item(self.len(), item)
    }

    /// Insert at `index` in item order. A grid ignores `index` and appends.
    pub fn insert_item(&mut self, index: usize, item: LayoutItem) -> Result<()> {
        self.check_new(&item)?;
        let index = index.min(self.len());
        match self {
            Layout::Free(l) => l.insert(index, item, Rect::default()),
            Layout::Box(l) => l.insert(index, item),
            Layout::Grid(l) => l.append(item),
            Layout::Splitter(l) => l.insert(index, item, None),
        }
        Ok(())
    }

    /// Remove the item at `index`.
    pub fn remove_item(&mut self, index: usize) -> Option<LayoutItem> {
        if index >= self.len() {
            return None;
        }
        Some(match self {
            Layout::Free(l) => l.remove(index),
            Layout::Box(l) => l.remove(index),
            Layout::Grid(l) => l.remove(index),
            Layout::Splitter(l) => l.remove(index),
        })
    }

    /// Remove a widget from this layout or any nested one.
    pub fn remove_widget(&mut self, id: ItemId) -> bool {
        if let Some(index) = self
            .slots()
            .iter()
            .position(|s| s.item.widget() == Some(id))
        {
            self.remove_item(index);
            return true;
        }
        self.for_each_nested(|nested| nested.remove_widget(id))
    }

    fn for_each_nested(&mut self, mut f: impl FnMut(&mut Layout) -> bool) -> bool {
        let slots = match self {
            Layout::Free(l) => l.slots_mut(),
            Layout::Box(l) => l.slots_mut(),
            Layout::Grid(l) => l.slots_mut(),
            Layout::Splitter(l) => l.slots_mut(),
        };
        slots.iter_mut().any(|slot| match &mut slot.item {
            LayoutItem::Layout(nested) => f(nested),
            LayoutItem::Widget(_) => false,
        })
    }

    /// Topmost widget whose last placed rectangle contains `pos`.
    pub fn item_at(&self, pos: impl Into<Point>) -> Option<ItemId> {
        let pos = pos.into();
        self.slots()
            .iter()
            .rev()
            .filter(|s| s.rect.contains_point(pos))
            .find_map(|s| match &s.item {
                LayoutItem::Widget(id) => Some(*id),
                LayoutItem::Layout(nested) => nested.item_at(pos),
            })
    }

    /// Aggregate bounds of the visible children.
    pub fn hints<F>(&self, measure: &F) -> Hints
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        match self {
            Layout::Free(_) => Hints::default(),
            Layout::Box(l) => l.hints(measure),
            Layout::Grid(l) => l.hints(measure),
            Layout::Splitter(l) => l.hints(measure),
        }
    }

    /// Arrange every child inside the current geometry and return the
    /// widget rectangles, nested layouts flattened in item order.
    pub fn reflow<F>(&mut self, measure: &F) -> Vec<Placement>
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let _span = tracing::debug_span!(
            "ttk.layout.reflow",
            kind = self.kind(),
            items = self.len()
        )
        .entered();
        let mut out = Vec::with_capacity(self.len());
        self.reflow_into(measure, &mut out);
        tracing::trace!(placed = out.len(), "reflow done");
        out
    }

    pub(crate) fn reflow_into<F>(&mut self, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        match self {
            Layout::Free(l) => l.reflow_into(measure, out),
            Layout::Box(l) => l.reflow_into(measure, out),
            Layout::Grid(l) => l.reflow_into(measure, out),
            Layout::Splitter(l) => l.reflow_into(measure, out),
        }
    }

    pub fn as_grid_mut(&mut self) -> Option<&mut GridLayout> {
        match self {
            Layout::Grid(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_splitter_mut(&mut self) -> Option<&mut SplitterLayout> {
        match self {
            Layout::Splitter(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_free_mut(&mut self) -> Option<&mut FreeLayout> {
        match self {
            Layout::Free(f) => Some(f),
            _ => None,
        }
    }
}

/// Fails when a widget of `item` is already managed by `slots`.
pub(crate) fn check_new(slots: &[Slot], item: &LayoutItem) -> Result<()> {
    let managed = |id: ItemId| slots.iter().any(|s| s.item.contains(id));
    let dup = match item {
        LayoutItem::Widget(id) => managed(*id).then_some(*id),
        LayoutItem::Layout(l) => l.widgets().into_iter().find(|id| managed(*id)),
    };
    match dup {
        Some(id) => Err(Error::LayoutConflict(format!(
            "{id:?} is already in this layout"
        ))),
        None => Ok(()),
    }
}

/// Bounds of `items` laid one after the other along `dir`; `gaps` cells are
/// added between them on the main axis.
pub(crate) fn stacked_hints<F>(slots: &[Slot], dir: Direction, gaps: u16, measure: &F) -> Hints
where
    F: Fn(ItemId) -> Option<Hints>,
{
    let mut main_min = 0u16;
    let mut main_max = 0u16;
    let mut cross_min = 0u16;
    let mut cross_max = 0u16;
    let mut any = false;
    for hints in slots.iter().filter_map(|s| s.item.hints(measure)) {
        let main = hints.span(dir);
        let cross = hints.span(cross_of(dir));
        main_min = main_min.saturating_add(main.min);
        main_max = main_max.saturating_add(main.max.max(main.min));
        cross_min = cross_min.max(cross.min);
        cross_max = cross_max.max(cross.max);
        any = true;
    }
    if !any {
        return Hints::default();
    }
    main_min = main_min.saturating_add(gaps);
    main_max = main_max.saturating_add(gaps);
    let (min, max) = match dir {
        Direction::Horizontal => (Size::new(main_min, cross_min), Size::new(main_max, cross_max)),
        Direction::Vertical => (Size::new(cross_min, main_min), Size::new(cross_max, main_max)),
    };
    Hints::new(min, max)
}

pub(crate) fn cross_of(dir: Direction) -> Direction {
    match dir {
        Direction::Horizontal => Direction::Vertical,
        Direction::Vertical => Direction::Horizontal,
    }
}

/// Rectangle at `main_pos`/`main_size` on `dir` and `cross_pos`/`cross_size`
/// on the other axis.
pub(crate) fn axis_rect(
    dir: Direction,
    main_pos: u16,
    main_size: u16,
    cross_pos: u16,
    cross_size: u16,
) -> Rect {
    match dir {
        Direction::Horizontal => Rect::new(main_pos, cross_pos, main_size, cross_size),
        Direction::Vertical => Rect::new(cross_pos, main_pos, cross_size, main_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any(_: ItemId) -> Option<Hints> {
        Some(Hints::default())
    }

    #[test]
    fn duplicate_widget_is_rejected() {
        let mut l = Layout::vbox();
        l.add_widget(ItemId(1)).unwrap();
        assert!(matches!(l.add_widget(ItemId(1)), Err(Error::LayoutConflict(_))));

        let mut nested = Layout::hbox();
        nested.add_widget(ItemId(1)).unwrap();
        assert!(l.add_layout(nested).is_err());
    }

    #[test]
    fn nested_layouts_flatten() {
        let mut inner = Layout::vbox();
        inner.add_widget(ItemId(2)).unwrap();
        inner.add_widget(ItemId(3)).unwrap();
        let mut outer = Layout::hbox();
        outer.add_widget(ItemId(1)).unwrap();
        outer.add_layout(inner).unwrap();
        outer.set_geometry(Rect::new(0, 0, 10, 4));

        let placed = outer.reflow(&any);
        let rects: Vec<_> = placed.iter().map(|p| (p.id.0, p.rect)).collect();
        assert_eq!(
            rects,
            vec![
                (1, Rect::new(0, 0, 5, 4)),
                (2, Rect::new(5, 0, 5, 2)),
                (3, Rect::new(5, 2, 5, 2)),
            ]
        );
        assert_eq!(outer.item_at((6, 3)), Some(ItemId(3)));
        assert_eq!(outer.item_at((20, 3)), None);
        assert_eq!(outer.widgets(), vec![ItemId(1), ItemId(2), ItemId(3)]);
    }

    #[test]
    fn remove_reaches_nested_layouts() {
        let mut inner = Layout::vbox();
        inner.add_widget(ItemId(7)).unwrap();
        let mut outer = Layout::hbox();
        outer.add_layout(inner).unwrap();
        assert!(outer.contains(ItemId(7)));
        assert!(outer.remove_widget(ItemId(7)));
        assert!(!outer.contains(ItemId(7)));
        assert!(!outer.remove_widget(ItemId(7)));
    }

    #[test]
    fn hidden_widgets_are_skipped() {
        let mut l = Layout::hbox();
        for i in 0..3 {
            l.add_widget(ItemId(i)).unwrap();
        }
        l.set_geometry(Rect::new(0, 0, 12, 1));
        let placed = l.reflow(&|id: ItemId| (id.0 != 1).then(Hints::default));
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[1].rect, Rect::new(6, 0, 6, 1));
    }

    #[test]
    fn hints_clamp() {
        let h = Hints::new(Size::new(2, 1), Size::new(5, 1));
        assert_eq!(h.clamp(Direction::Horizontal, 9), 5);
        assert_eq!(h.clamp(Direction::Horizontal, 0), 2);
        assert_eq!(h.clamp(Direction::Vertical, 3), 1);
    }
}
