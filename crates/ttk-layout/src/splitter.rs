#![forbid(unsafe_code)]

//! Splitter: a box with draggable one-cell dividers between its children.

use crate::solve::{Span, distribute};
use crate::{
    Direction, Hints, ItemId, LayoutItem, Placement, Point, Rect, Slot, axis_rect, cross_of,
    stacked_hints,
};

/// Position and length of `rect` along `dir`.
fn main_of(dir: Direction, rect: Rect) -> (u16, u16) {
    match dir {
        Direction::Horizontal => (rect.x, rect.width),
        Direction::Vertical => (rect.y, rect.height),
    }
}

/// Children along one axis separated by dividers.
///
/// Sizes chosen by the user (through [`move_divider`](Self::move_divider) or
/// [`set_sizes`](Self::set_sizes)) are remembered. When the splitter grows,
/// no child drops below its remembered size; when it shrinks, no child grows
/// past it. Children without a remembered size count as their minimum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitterLayout {
    direction: Direction,
    geometry: Rect,
    slots: Vec<Slot>,
    remembered: Vec<Option<u16>>,
    /// Divider rectangles from the last reflow.
    dividers: Vec<Rect>,
    /// Slot index on each side of every divider.
    divider_slots: Vec<(usize, usize)>,
}

impl SplitterLayout {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
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

    pub(crate) fn insert(&mut self, index: usize, item: LayoutItem, size: Option<u16>) {
        self.slots.insert(index, Slot::new(item));
        self.remembered.insert(index, size);
    }

    pub(crate) fn remove(&mut self, index: usize) -> LayoutItem {
        self.remembered.remove(index);
        self.slots.remove(index).item
    }

    /// Main-axis size of every slot at the last reflow.
    pub fn sizes(&self) -> Vec<u16> {
        self.slots
            .iter()
            .map(|s| main_of(self.direction, s.rect).1)
            .collect()
    }

    /// Remember explicit sizes, one per slot in item order. Extra values are
    /// ignored; slots past the end of `sizes` forget theirs.
    pub fn set_sizes(&mut self, sizes: &[u16]) {
        for (i, r) in self.remembered.iter_mut().enumerate() {
            *r = sizes.get(i).copied();
        }
    }

    /// Divider rectangles from the last reflow, in order.
    pub fn dividers(&self) -> &[Rect] {
        &self.dividers
    }

    /// Index of the divider under `pos`.
    pub fn divider_at(&self, pos: impl Into<Point>) -> Option<usize> {
        let pos = pos.into();
        self.dividers.iter().position(|r| r.contains_point(pos))
    }

    /// Drag divider `index` to main-axis coordinate `pos`, clamped between
    /// the outer edges of its two neighbors. Every visible child's current
    /// size is remembered. Returns `false` for an unknown divider.
    ///
    /// Takes effect at the next reflow.
    pub fn move_divider(&mut self, index: usize, pos: u16) -> bool {
        let Some(&(before, after)) = self.divider_slots.get(index) else {
            return false;
        };
        let dir = self.direction;
        let (start, first) = main_of(dir, self.slots[before].rect);
        let (_, second) = main_of(dir, self.slots[after].rect);
        let pair = first.saturating_add(second);
        let pos = pos.clamp(start, start.saturating_add(pair));
        let new_first = pos - start;

        for (i, slot) in self.slots.iter().enumerate() {
            if !slot.rect.is_empty() || self.divider_slots.iter().any(|&(a, b)| a == i || b == i) {
                self.remembered[i] = Some(main_of(dir, slot.rect).1);
            }
        }
        self.remembered[before] = Some(new_first);
        self.remembered[after] = Some(pair - new_first);
        tracing::debug!(index, pos, first = new_first, second = pair - new_first, "divider moved");
        true
    }

    pub fn hints<F>(&self, measure: &F) -> Hints
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let visible = self
            .slots
            .iter()
            .filter(|s| s.item.hints(measure).is_some())
            .count();
        let gaps = u16::try_from(visible.saturating_sub(1)).unwrap_or(u16::MAX);
        stacked_hints(&self.slots, self.direction, gaps, measure)
    }

    pub(crate) fn reflow_into<F>(&mut self, measure: &F, out: &mut Vec<Placement>)
    where
        F: Fn(ItemId) -> Option<Hints>,
    {
        let dir = self.direction;
        let cross = cross_of(dir);
        let (main_origin, main_len) = main_of(dir, self.geometry);
        let (cross_origin, cross_len) = match dir {
            Direction::Horizontal => (self.geometry.y, self.geometry.height),
            Direction::Vertical => (self.geometry.x, self.geometry.width),
        };

        let hints: Vec<Option<Hints>> = self.slots.iter().map(|s| s.item.hints(measure)).collect();
        let visible: Vec<usize> = (0..self.slots.len()).filter(|&i| hints[i].is_some()).collect();
        let gaps = u16::try_from(visible.len().saturating_sub(1)).unwrap_or(u16::MAX);
        let space = main_len.saturating_sub(gaps);

        let current: Vec<(Span, u16)> = visible
            .iter()
            .filter_map(|&i| {
                let span = hints[i]?.span(dir);
                Some((span, self.remembered[i].unwrap_or(span.min)))
            })
            .collect();
        let wanted: u32 = current.iter().map(|&(_, c)| u32::from(c)).sum();
        let growing = u32::from(space) >= wanted;
        let spans: Vec<Span> = current
            .iter()
            .map(|&(span, cur)| {
                let max = span.max.max(span.min);
                if growing {
                    Span::new(cur.clamp(span.min, max), max)
                } else {
                    Span::new(span.min, cur.clamp(span.min, max))
                }
            })
            .collect();
        let sizes = distribute(&spans, space);

        self.dividers.clear();
        self.divider_slots.clear();
        let mut pos = main_origin;
        let mut placed = visible.iter().zip(&sizes).peekable();
        for slot in &mut self.slots {
            slot.rect = Rect::default();
        }
        while let Some((&i, &size)) = placed.next() {
            let Some(hint) = hints[i] else { continue };
            let rect = axis_rect(dir, pos, size, cross_origin, hint.clamp(cross, cross_len));
            pos = pos.saturating_add(size);
            self.slots[i].rect = rect;
            self.slots[i].item.place(rect, measure, out);
            if let Some(&(&next, _)) = placed.peek() {
                self.dividers
                    .push(axis_rect(dir, pos, 1, cross_origin, cross_len));
                self.divider_slots.push((i, next));
                pos = pos.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Layout, Size};

    fn flex(_: ItemId) -> Option<Hints> {
        Some(Hints::default())
    }

    fn three(width: u16) -> Layout {
        let mut l = Layout::splitter(Direction::Horizontal);
        for i in 0..3 {
            l.add_widget(ItemId(i)).unwrap();
        }
        l.set_geometry(Rect::new(0, 0, width, 4));
        l
    }

    fn widths(placed: &[Placement]) -> Vec<u16> {
        placed.iter().map(|p| p.rect.width).collect()
    }

    #[test]
    fn dividers_sit_between_children() {
        let mut l = three(32);
        let placed = l.reflow(&flex);
        assert_eq!(widths(&placed), vec![10, 10, 10]);
        assert_eq!(placed[1].rect.x, 11);
        let s = l.as_splitter_mut().unwrap();
        assert_eq!(
            s.dividers(),
            &[Rect::new(10, 0, 1, 4), Rect::new(21, 0, 1, 4)]
        );
        assert_eq!(s.divider_at((21, 3)), Some(1));
        assert_eq!(s.divider_at((20, 3)), None);
    }

    #[test]
    fn dragging_moves_the_pair_only() {
        let mut l = three(32);
        l.reflow(&flex);
        assert!(l.as_splitter_mut().unwrap().move_divider(0, 4));
        let placed = l.reflow(&flex);
        assert_eq!(widths(&placed), vec![4, 16, 10]);

        // past the far neighbor's edge
        assert!(l.as_splitter_mut().unwrap().move_divider(0, 99));
        let placed = l.reflow(&flex);
        assert_eq!(widths(&placed), vec![20, 0, 10]);
        assert!(!l.as_splitter_mut().unwrap().move_divider(2, 0));
    }

    #[test]
    fn remembered_sizes_survive_resizing() {
        let mut l = three(32);
        l.as_splitter_mut().unwrap().set_sizes(&[4, 16, 10]);

        l.set_geometry(Rect::new(0, 0, 44, 4));
        let grown = widths(&l.reflow(&flex));
        assert_eq!(grown, vec![13, 16, 13]);

        l.set_geometry(Rect::new(0, 0, 20, 4));
        let shrunk = widths(&l.reflow(&flex));
        assert_eq!(shrunk, vec![4, 7, 7]);

        l.set_geometry(Rect::new(0, 0, 32, 4));
        assert_eq!(widths(&l.reflow(&flex)), vec![4, 16, 10]);
    }

    #[test]
    fn hidden_children_lose_their_divider() {
        let mut l = three(21);
        let placed = l.reflow(&|id: ItemId| (id.0 != 1).then(Hints::default));
        assert_eq!(widths(&placed), vec![10, 10]);
        assert_eq!(l.as_splitter_mut().unwrap().dividers().len(), 1);
    }

    #[test]
    fn hints_count_dividers() {
        let l = three(10);
        let fixed = |_: ItemId| Some(Hints::fixed(Size::new(3, 1)));
        let h = l.hints(&fixed);
        assert_eq!(h.min, Size::new(11, 1));
        assert_eq!(h.max, Size::new(11, 1));
    }
}
