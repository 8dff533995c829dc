#![forbid(unsafe_code)]

//! Horizontal and vertical boxes.

use crate::solve::{distribute, offsets};
use ttk_core::Sides;

use crate::{
    Direction, Hints, ItemId, LayoutItem, Placement, Rect, Size, Slot, axis_rect, cross_of,
    stacked_hints,
};

/// Children side by side along one axis.
///
/// The main axis is split between the visible children within their
/// min/max bounds; each child spans the whole cross axis, clamped to its own
/// bounds. Children are placed inside the geometry minus the padding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxLayout {
    direction: Direction,
    geometry: Rect,
    padding: Sides,
    slots: Vec<Slot>,
}

impl BoxLayout {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn padding(&self) -> Sides {
        self.padding
    }

    pub fn set_padding(&mut self, padding: impl Into<Sides>) {
        self.padding = padding.into();
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

    pub(crate) fn insert(&mut self, index: usize, item: LayoutItem) {
        self.slots.insert(index, Slot::new(item));
    }

    pub(crate) fn remove(&mut self, index: usize) -> LayoutItem {
        self.slots.remove(index).item
    }

    pub fn hints<F>(&self, measure: &F) -> Hints
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let mut h = stacked_hints(&self.slots, self.direction, 0, measure);
        let pad = Size::new(self.padding.horizontal_sum(), self.padding.vertical_sum());
        h.min = Size::new(
            h.min.width.saturating_add(pad.width),
            h.min.height.saturating_add(pad.height),
        );
        h.max = Size::new(
            h.max.width.saturating_add(pad.width),
            h.max.height.saturating_add(pad.height),
        );
        h
    }

    pub(crate) fn reflow_into<F>(&mut self, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let dir = self.direction;
        let cross = cross_of(dir);
        let area = self.geometry.inner(self.padding);
        let (main_origin, main_len, cross_origin, cross_len) = match dir {
            Direction::Horizontal => (area.x, area.width, area.y, area.height),
            Direction::Vertical => (area.y, area.height, area.x, area.width),
        };

        let hints: Vec<Option<Hints>> = self.slots.iter().map(|s| s.item.hints(measure)).collect();
        let spans: Vec<_> = hints.iter().flatten().map(|h| h.span(dir)).collect();
        let sizes = distribute(&spans, main_len);
        let starts = offsets(main_origin, &sizes);

        let mut visible = 0;
        for (slot, hint) in self.slots.iter_mut().zip(&hints) {
            let Some(hint) = hint else {
                slot.rect = Rect::default();
                continue;
            };
            let rect = axis_rect(
                dir,
                starts[visible],
                sizes[visible],
                cross_origin,
                hint.clamp(cross, cross_len),
            );
            visible += 1;
            slot.rect = rect;
            slot.item.place(rect, measure, out);
        }
    }
}
