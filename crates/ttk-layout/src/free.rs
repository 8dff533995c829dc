#![forbid(unsafe_code)]

//! Free placement.

use crate::{Hints, ItemId, LayoutItem, Placement, Rect, Slot};

/// Children keep the geometry they were given, relative to the layout
/// origin. Later items are drawn over earlier ones; [`raise`](Self::raise)
/// and [`lower`](Self::lower) reorder them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FreeLayout {
    geometry: Rect,
    slots: Vec<Slot>,
    /// Explicit rectangle of each slot.
    frames: Vec<Rect>,
}

impl FreeLayout {
    pub fn new() -> Self {
        Self::default()
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

    pub(crate) fn insert(&mut self, index: usize, item: LayoutItem, frame: Rect) {
        self.slots.insert(index, Slot::new(item));
        self.frames.insert(index, frame);
    }

    pub(crate) fn remove(&mut self, index: usize) -> LayoutItem {
        self.frames.remove(index);
        self.slots.remove(index).item
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.slots.iter().position(|s| s.item.widget() == Some(id))
    }

    /// Append a widget at `frame`. Returns `false` if it is already here.
    pub fn add_widget_at(&mut self, id: ItemId, frame: Rect) -> bool {
        if self.index_of(id).is_some() {
            return false;
        }
        self.insert(self.slots.len(), LayoutItem::Widget(id), frame);
        true
    }

    /// Explicit rectangle of a direct child.
    pub fn frame(&self, id: ItemId) -> Option<Rect> {
        self.index_of(id).map(|i| self.frames[i])
    }

    /// Move/resize a direct child. Returns `false` if it is not here.
    pub fn set_frame(&mut self, id: ItemId, frame: Rect) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.frames[i] = frame;
                true
            }
            None => false,
        }
    }

    /// Frame of the item at `index`, which also works for nested layouts.
    pub fn set_frame_at(&mut self, index: usize, frame: Rect) -> bool {
        match self.frames.get_mut(index) {
            Some(f) => {
                *f = frame;
                true
            }
            None => false,
        }
    }

    /// Move a child to the top of the stacking order.
    pub fn raise(&mut self, id: ItemId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let slot = self.slots.remove(i);
        let frame = self.frames.remove(i);
        self.slots.push(slot);
        self.frames.push(frame);
        true
    }

    /// Move a child to the bottom of the stacking order.
    pub fn lower(&mut self, id: ItemId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let slot = self.slots.remove(i);
        let frame = self.frames.remove(i);
        self.slots.insert(0, slot);
        self.frames.insert(0, frame);
        true
    }

    /// Bounding box of every child frame, relative to the layout origin.
    pub fn children_bounds(&self) -> Rect {
        self.frames
            .iter()
            .copied()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }

    pub(crate) fn reflow_into<F>(&mut self, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let (ox, oy) = (self.geometry.x, self.geometry.y);
        for (slot, frame) in self.slots.iter_mut().zip(&self.frames) {
            if slot.item.hints(measure).is_none() {
                slot.rect = Rect::default();
                continue;
            }
            let rect = frame.with_origin(ox.saturating_add(frame.x), oy.saturating_add(frame.y));
            slot.rect = rect;
            slot.item.place(rect, measure, out);
        }
    }
}
