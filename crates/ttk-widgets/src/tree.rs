#![forbid(unsafe_code)]

//! The widget arena.
//!
//! Nodes live in a `Vec` and are addressed by [`WidgetId`]; ids are never
//! reused, so a stale id simply stops resolving. The parent owns the edge
//! to its children (`children` plus the layout), a child only records its
//! parent id. A widget's geometry is relative to its parent's content area,
//! the parent rectangle shrunk by its padding.
//!
//! Rendering is two passes. [`paint`](WidgetTree::paint) calls
//! [`Widget::paint`] for every dirty, shown node into that node's own
//! canvas. [`compose`](WidgetTree::compose) then copies canvases into the
//! frame depth-first, each clipped to its parent's content rectangle.

use std::fmt;

use tracing::{debug_span, trace, warn};
use ttk_core::signal::Signal;
use ttk_core::{Error, Point, Rect, Result, Sides, Size};
use ttk_layout::{Hints, ItemId, Layout};
use ttk_render::Canvas;
use ttk_style::{StyleMap, Theme, WidgetState};

use crate::widget::{EventCx, FocusPolicy, PaintCx, Widget};

/// Handle of a node in a [`WidgetTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    fn item(self) -> ItemId {
        ItemId(self.0)
    }

    fn from_item(item: ItemId) -> Self {
        Self(item.0)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Node {
    name: String,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    geometry: Rect,
    min_size: Option<Size>,
    max_size: Option<Size>,
    padding: Sides,
    canvas: Canvas,
    layout: Layout,
    focus_policy: FocusPolicy,
    visible: bool,
    enabled: bool,
    dirty: bool,
    /// The last paint failed; the subtree stays out of the frame.
    failed: bool,
    style: Option<StyleMap>,
    widget: Box<dyn Widget>,
    size_changed: Signal<(u16, u16)>,
    focus_changed: Signal<bool>,
}

fn out_of_tree(id: WidgetId) -> Error {
    Error::OutOfTree(format!("widget {id} is not in the tree"))
}

fn rect_at(origin: Point, size: Size) -> Rect {
    let clamp = |v: i32| v.clamp(0, i32::from(u16::MAX)) as u16;
    Rect::new(clamp(origin.x), clamp(origin.y), size.width, size.height)
}

/// Owner of every widget, its geometry, canvas and layout.
#[derive(Default)]
pub struct WidgetTree {
    nodes: Vec<Option<Node>>,
    root: Option<WidgetId>,
    focus: Option<WidgetId>,
    hover: Option<WidgetId>,
    pressed: Option<WidgetId>,
    needs_compose: bool,
}

impl fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetTree")
            .field("nodes", &self.len())
            .field("root", &self.root)
            .field("focus", &self.focus)
            .finish()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: WidgetId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn try_node(&self, id: WidgetId) -> Result<&Node> {
        self.node(id).ok_or_else(|| out_of_tree(id))
    }

    fn try_node_mut(&mut self, id: WidgetId) -> Result<&mut Node> {
        self.node_mut(id).ok_or_else(|| out_of_tree(id))
    }

    // ── nodes ──

    /// Add a detached widget.
    pub fn add<W: Widget>(&mut self, widget: W) -> WidgetId {
        self.add_boxed(Box::new(widget))
    }

    pub fn add_boxed(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let id = WidgetId(self.nodes.len());
        trace!(widget = %id, class = widget.class_name(), "add");
        self.nodes.push(Some(Node {
            name: widget.class_name().to_string(),
            parent: None,
            children: Vec::new(),
            geometry: Rect::default(),
            min_size: None,
            max_size: None,
            padding: widget.padding(),
            canvas: Canvas::new(0, 0),
            layout: Layout::default(),
            focus_policy: widget.focus_policy(),
            visible: true,
            enabled: true,
            dirty: true,
            failed: false,
            style: None,
            widget,
            size_changed: Signal::new("sizeChanged"),
            focus_changed: Signal::new("focusChanged"),
        }));
        id
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Make a detached widget the root of the tree.
    pub fn set_root(&mut self, id: WidgetId) -> Result<()> {
        if self.try_node(id)?.parent.is_some() {
            return Err(Error::LayoutConflict(format!(
                "widget {id} has a parent and cannot be the root"
            )));
        }
        self.root = Some(id);
        self.mark_subtree_dirty(id);
        Ok(())
    }

    pub fn name(&self, id: WidgetId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, id: WidgetId, name: impl Into<String>) -> Result<()> {
        self.try_node_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<WidgetId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.as_ref().is_some_and(|n| n.name == name))
            .map(|(i, _)| WidgetId(i))
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        let mut cur = id;
        loop {
            match self.node(cur) {
                None => return false,
                Some(node) => match node.parent {
                    Some(parent) => cur = parent,
                    None => return self.root == Some(cur),
                },
            }
        }
    }

    /// `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    // ── attaching ──

    fn check_attachable(&self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.try_node(parent)?;
        let node = self.try_node(child)?;
        if node.parent.is_some() || self.root == Some(child) {
            return Err(Error::LayoutConflict(format!(
                "widget {child} already belongs to a layout"
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::LayoutConflict(format!(
                "widget {child} cannot contain its ancestor {parent}"
            )));
        }
        Ok(())
    }

    /// Add `child` to the layout of `parent`.
    ///
    /// Under a free layout the child keeps its current geometry.
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.check_attachable(parent, child)?;
        let geometry = self.try_node(child)?.geometry;
        let pnode = self.try_node_mut(parent)?;
        match pnode.layout.as_free_mut() {
            Some(free) => {
                free.add_widget_at(child.item(), geometry);
            }
            None => pnode.layout.add_widget(child.item())?,
        }
        pnode.children.push(child);
        self.finish_attach(parent, child)
    }

    /// Add `child` at a grid cell of `parent`, which must have a grid layout.
    pub fn attach_grid(&mut self, parent: WidgetId, child: WidgetId, row: usize, col: usize) -> Result<()> {
        self.check_attachable(parent, child)?;
        let pnode = self.try_node_mut(parent)?;
        let Some(grid) = pnode.layout.as_grid_mut() else {
            return Err(Error::LayoutConflict(format!("widget {parent} has no grid layout")));
        };
        grid.add_widget_at(child.item(), row, col)?;
        pnode.children.push(child);
        self.finish_attach(parent, child)
    }

    fn finish_attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        trace!(parent = %parent, child = %child, "attach");
        self.mark_subtree_dirty(child);
        self.relayout(parent)
    }

    /// Take `child` out of its parent. The subtree stays in the arena.
    pub fn detach(&mut self, child: WidgetId) -> Result<()> {
        let parent = self.try_node(child)?.parent;
        self.drop_transient_state(child)?;
        if self.root == Some(child) {
            self.root = None;
        }
        let Some(parent) = parent else {
            return Ok(());
        };
        let pnode = self.try_node_mut(parent)?;
        pnode.layout.remove_widget(child.item());
        pnode.children.retain(|c| *c != child);
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
        self.needs_compose = true;
        self.relayout(parent)
    }

    /// Detach and drop `id` with its whole subtree.
    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(cur.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Forget focus, hover and press inside the subtree of `id`.
    fn drop_transient_state(&mut self, id: WidgetId) -> Result<()> {
        if self.hover.is_some_and(|h| self.is_ancestor(id, h)) {
            self.hover = None;
        }
        if self.pressed.is_some_and(|p| self.is_ancestor(id, p)) {
            self.pressed = None;
        }
        if let Some(focused) = self.focus.filter(|f| self.is_ancestor(id, *f)) {
            self.focus = None;
            self.notify_focus(focused, false)?;
        }
        Ok(())
    }

    /// Bring `id` to the front of its siblings.
    pub fn raise(&mut self, id: WidgetId) -> Result<()> {
        let Some(parent) = self.try_node(id)?.parent else {
            return Ok(());
        };
        let pnode = self.try_node_mut(parent)?;
        pnode.children.retain(|c| *c != id);
        pnode.children.push(id);
        if let Some(free) = pnode.layout.as_free_mut() {
            free.raise(id.item());
        }
        self.needs_compose = true;
        Ok(())
    }

    // ── layout ──

    pub fn layout(&self, id: WidgetId) -> Option<&Layout> {
        self.node(id).map(|n| &n.layout)
    }

    /// Replace the layout of `id`; current children move into it.
    pub fn set_layout(&mut self, id: WidgetId, mut layout: Layout) -> Result<()> {
        let children = self.try_node(id)?.children.clone();
        for child in children {
            if layout.contains(child.item()) {
                continue;
            }
            let geometry = self.try_node(child)?.geometry;
            match layout.as_free_mut() {
                Some(free) => {
                    free.add_widget_at(child.item(), geometry);
                }
                None => layout.add_widget(child.item())?,
            }
        }
        self.try_node_mut(id)?.layout = layout;
        self.relayout(id)
    }

    /// Adjust the layout of `id` in place, then reflow.
    ///
    /// `f` may tune tracks, spans and dividers but must not add or remove
    /// widgets; use [`attach`](Self::attach) and [`detach`](Self::detach).
    pub fn with_layout<R>(&mut self, id: WidgetId, f: impl FnOnce(&mut Layout) -> R) -> Result<R> {
        let out = f(&mut self.try_node_mut(id)?.layout);
        self.relayout(id)?;
        Ok(out)
    }

    pub fn padding(&self, id: WidgetId) -> Sides {
        self.node(id).map(|n| n.padding).unwrap_or_default()
    }

    pub fn set_padding(&mut self, id: WidgetId, padding: impl Into<Sides>) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.padding = padding.into();
        node.dirty = true;
        self.needs_compose = true;
        self.relayout(id)
    }

    /// Size bounds the parent layout sees, `None` when hidden.
    pub fn hints_of(&self, id: WidgetId) -> Option<Hints> {
        let node = self.node(id)?;
        if !node.visible {
            return None;
        }
        let mut hints = node.widget.size_hint();
        if !node.layout.is_empty() {
            let inner = node
                .layout
                .hints(&|item: ItemId| self.hints_of(WidgetId::from_item(item)));
            let pad = node.padding;
            hints.min.width = hints
                .min
                .width
                .max(inner.min.width.saturating_add(pad.horizontal_sum()));
            hints.min.height = hints
                .min
                .height
                .max(inner.min.height.saturating_add(pad.vertical_sum()));
        }
        if let Some(min) = node.min_size {
            hints.min = min;
        }
        if let Some(max) = node.max_size {
            hints.max = max;
        }
        hints.max = Size::new(
            hints.max.width.max(hints.min.width),
            hints.max.height.max(hints.min.height),
        );
        Some(hints)
    }

    pub fn set_minimum_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        self.try_node_mut(id)?.min_size = Some(Size::new(width, height));
        self.relayout_parent(id)
    }

    pub fn set_maximum_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        self.try_node_mut(id)?.max_size = Some(Size::new(width, height));
        self.relayout_parent(id)
    }

    /// Pin both bounds to one size.
    pub fn set_fixed_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.min_size = Some(Size::new(width, height));
        node.max_size = Some(Size::new(width, height));
        self.relayout_parent(id)
    }

    fn relayout_parent(&mut self, id: WidgetId) -> Result<()> {
        match self.parent(id) {
            Some(parent) => self.relayout(parent),
            None => Ok(()),
        }
    }

    /// Rearrange the children of `id` inside its content area.
    pub fn relayout(&mut self, id: WidgetId) -> Result<()> {
        let node = self.try_node_mut(id)?;
        if node.layout.is_empty() {
            return Ok(());
        }
        let inner = Rect::from_size(node.geometry.width, node.geometry.height).inner(node.padding);
        let children = node.children.clone();
        let mut layout = std::mem::take(&mut node.layout);
        layout.set_geometry(Rect::from_size(inner.width, inner.height));
        let placements = layout.reflow(&|item: ItemId| self.hints_of(WidgetId::from_item(item)));
        if let Some(node) = self.node_mut(id) {
            node.layout = layout;
        }
        for placement in placements {
            let child = WidgetId::from_item(placement.id);
            if children.contains(&child) {
                self.apply_geometry(child, placement.rect)?;
            }
        }
        Ok(())
    }

    // ── geometry ──

    pub fn geometry(&self, id: WidgetId) -> Option<Rect> {
        self.node(id).map(|n| n.geometry)
    }

    /// Move and resize `id` within its parent's content area.
    ///
    /// Resizing resizes the canvas, calls [`Widget::resized`], emits
    /// `sizeChanged` and reflows the children. A parent layout other than
    /// free placement overrides the rectangle on its next reflow.
    pub fn set_geometry(&mut self, id: WidgetId, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        let (Ok(rx), Ok(ry), Ok(rw), Ok(rh)) = (
            u16::try_from(x),
            u16::try_from(y),
            u16::try_from(width),
            u16::try_from(height),
        ) else {
            return Err(Error::InvalidGeometry {
                x,
                y,
                width,
                height,
            });
        };
        let rect = Rect::new(rx, ry, rw, rh);
        let parent = self.try_node(id)?.parent;
        if let Some(parent) = parent {
            if let Some(free) = self.node_mut(parent).and_then(|n| n.layout.as_free_mut()) {
                free.set_frame(id.item(), rect);
            }
        }
        self.apply_geometry(id, rect)
    }

    pub fn move_to(&mut self, id: WidgetId, x: i32, y: i32) -> Result<()> {
        let g = self.try_node(id)?.geometry;
        self.set_geometry(id, x, y, i32::from(g.width), i32::from(g.height))
    }

    pub fn resize(&mut self, id: WidgetId, width: i32, height: i32) -> Result<()> {
        let g = self.try_node(id)?.geometry;
        self.set_geometry(id, i32::from(g.x), i32::from(g.y), width, height)
    }

    fn apply_geometry(&mut self, id: WidgetId, rect: Rect) -> Result<()> {
        let node = self.try_node_mut(id)?;
        let old = std::mem::replace(&mut node.geometry, rect);
        if old.size() != rect.size() {
            node.canvas.resize(rect.width, rect.height);
            node.dirty = true;
            node.widget.resized(rect.width, rect.height)?;
            let signal = node.size_changed.clone();
            trace!(widget = %id, width = rect.width, height = rect.height, "resized");
            signal.emit(&(rect.width, rect.height))?;
        }
        if old != rect {
            self.needs_compose = true;
        }
        self.relayout(id)
    }

    /// Top-left of `id` in root coordinates, `None` when not attached.
    pub fn absolute_origin(&self, id: WidgetId) -> Option<Point> {
        if !self.is_attached(id) {
            return None;
        }
        let node = self.node(id)?;
        let mut x = i32::from(node.geometry.x);
        let mut y = i32::from(node.geometry.y);
        let mut parent = node.parent;
        while let Some(p) = parent {
            let pnode = self.node(p)?;
            x += i32::from(pnode.geometry.x) + i32::from(pnode.padding.left);
            y += i32::from(pnode.geometry.y) + i32::from(pnode.padding.top);
            parent = pnode.parent;
        }
        Some(Point::new(x, y))
    }

    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        let origin = self.absolute_origin(id)?;
        Some(rect_at(origin, self.node(id)?.geometry.size()))
    }

    /// Deepest shown widget under `(x, y)` in root coordinates.
    ///
    /// Later siblings are on top. Children only catch points inside their
    /// parent's content area.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<WidgetId> {
        let root = self.root?;
        let g = self.node(root)?.geometry;
        self.hit_in(root, x - i32::from(g.x), y - i32::from(g.y))
    }

    fn hit_in(&self, id: WidgetId, x: i32, y: i32) -> Option<WidgetId> {
        let node = self.node(id)?;
        let size = node.geometry.size();
        if !node.visible || x < 0 || y < 0 || x >= i32::from(size.width) || y >= i32::from(size.height) {
            return None;
        }
        let content = Rect::from_size(size.width, size.height).inner(node.padding);
        if content.contains_point(Point::new(x, y)) {
            let (cx, cy) = (x - i32::from(content.x), y - i32::from(content.y));
            for child in node.children.iter().rev() {
                let Some(g) = self.geometry(*child) else { continue };
                if let Some(hit) = self.hit_in(*child, cx - i32::from(g.x), cy - i32::from(g.y)) {
                    return Some(hit);
                }
            }
        }
        Some(id)
    }

    /// Shown widgets in depth-first pre-order from the root.
    pub fn visit_order(&self) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack: Vec<WidgetId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if !node.visible {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    // ── state ──

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        let node = self.try_node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        node.dirty = true;
        self.needs_compose = true;
        if !visible {
            self.drop_transient_state(id)?;
        }
        self.relayout_parent(id)
    }

    pub fn show(&mut self, id: WidgetId) -> Result<()> {
        self.set_visible(id, true)
    }

    pub fn hide(&mut self, id: WidgetId) -> Result<()> {
        self.set_visible(id, false)
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    /// Visible along with every ancestor.
    pub fn is_shown(&self, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.node(c) {
                Some(n) if n.visible => cur = n.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<()> {
        self.try_node_mut(id)?.enabled = enabled;
        if !enabled {
            self.drop_transient_state(id)?;
        }
        self.mark_subtree_dirty(id);
        Ok(())
    }

    /// Enabled along with every ancestor.
    pub fn is_enabled(&self, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.node(c) {
                Some(n) if n.enabled => cur = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Repaint `id` on the next frame.
    pub fn update(&mut self, id: WidgetId) {
        if let Some(node) = self.node_mut(id) {
            node.dirty = true;
            self.needs_compose = true;
        }
    }

    /// Repaint everything, e.g. after a theme change.
    pub fn update_all(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.dirty = true;
        }
        self.needs_compose = true;
    }

    fn mark_subtree_dirty(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.node_mut(cur) {
                node.dirty = true;
                stack.extend(node.children.iter().copied());
            }
        }
        self.needs_compose = true;
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.node(id).is_some_and(|n| n.dirty)
    }

    /// Whether the next frame differs from the last composed one.
    pub fn needs_repaint(&self) -> bool {
        self.needs_compose
    }

    pub fn style(&self, id: WidgetId) -> Option<&StyleMap> {
        self.node(id).and_then(|n| n.style.as_ref())
    }

    /// Per-widget style map; `None` falls back to the theme's class style.
    pub fn set_style(&mut self, id: WidgetId, style: Option<StyleMap>) -> Result<()> {
        let node = self.try_node_mut(id)?;
        node.style = style;
        node.dirty = true;
        self.needs_compose = true;
        Ok(())
    }

    pub fn canvas(&self, id: WidgetId) -> Option<&Canvas> {
        self.node(id).map(|n| &n.canvas)
    }

    pub fn size_changed(&self, id: WidgetId) -> Option<Signal<(u16, u16)>> {
        self.node(id).map(|n| n.size_changed.clone())
    }

    pub fn focus_changed(&self, id: WidgetId) -> Option<Signal<bool>> {
        self.node(id).map(|n| n.focus_changed.clone())
    }

    // ── focus ──

    pub fn focus(&self) -> Option<WidgetId> {
        self.focus
    }

    pub fn focus_policy(&self, id: WidgetId) -> FocusPolicy {
        self.node(id).map(|n| n.focus_policy).unwrap_or_default()
    }

    pub fn set_focus_policy(&mut self, id: WidgetId, policy: FocusPolicy) -> Result<()> {
        self.try_node_mut(id)?.focus_policy = policy;
        Ok(())
    }

    fn can_focus(&self, id: WidgetId, need: FocusPolicy) -> bool {
        self.focus_policy(id).intersects(need) && self.is_shown(id) && self.is_enabled(id)
    }

    /// Give keyboard focus to `id`.
    ///
    /// Returns `Ok(false)` when its policy, visibility or enabled state
    /// rejects focus. The previous holder sees `focusChanged(false)` before
    /// `id` sees `focusChanged(true)`.
    pub fn set_focus(&mut self, id: WidgetId) -> Result<bool> {
        if !self.is_attached(id) {
            return Err(out_of_tree(id));
        }
        if !self.can_focus(id, FocusPolicy::STRONG) {
            return Ok(false);
        }
        if self.focus == Some(id) {
            return Ok(true);
        }
        let previous = self.focus.replace(id);
        trace!(widget = %id, previous = ?previous, "focus");
        if let Some(previous) = previous {
            self.notify_focus(previous, false)?;
        }
        self.notify_focus(id, true)?;
        Ok(true)
    }

    pub fn clear_focus(&mut self) -> Result<()> {
        match self.focus.take() {
            Some(previous) => self.notify_focus(previous, false),
            None => Ok(()),
        }
    }

    /// Move focus along the tab chain. Returns whether focus moved.
    pub fn focus_next(&mut self, forward: bool) -> Result<bool> {
        let chain: Vec<WidgetId> = self
            .visit_order()
            .into_iter()
            .filter(|id| self.can_focus(*id, FocusPolicy::TAB))
            .collect();
        let len = chain.len();
        if len == 0 {
            return Ok(false);
        }
        let current = self.focus.and_then(|f| chain.iter().position(|c| *c == f));
        let next = match (current, forward) {
            (Some(i), true) => chain[(i + 1) % len],
            (Some(i), false) => chain[(i + len - 1) % len],
            (None, true) => chain[0],
            (None, false) => chain[len - 1],
        };
        if Some(next) == self.focus {
            return Ok(false);
        }
        self.set_focus(next)
    }

    fn notify_focus(&mut self, id: WidgetId, focused: bool) -> Result<()> {
        let Some(node) = self.node_mut(id) else {
            return Ok(());
        };
        node.dirty = true;
        let mut cx = EventCx::new(id, node.geometry.size(), focused);
        node.widget.focus_changed(focused, &mut cx)?;
        let signal = node.focus_changed.clone();
        self.needs_compose = true;
        signal.emit(&focused)?;
        Ok(())
    }

    pub fn hovered(&self) -> Option<WidgetId> {
        self.hover
    }

    pub(crate) fn set_hover(&mut self, id: Option<WidgetId>) {
        if self.hover != id {
            for changed in [self.hover, id].into_iter().flatten() {
                self.update(changed);
            }
            self.hover = id;
        }
    }

    pub fn pressed(&self) -> Option<WidgetId> {
        self.pressed
    }

    pub(crate) fn set_pressed(&mut self, id: Option<WidgetId>) {
        if self.pressed != id {
            for changed in [self.pressed, id].into_iter().flatten() {
                self.update(changed);
            }
            self.pressed = id;
        }
    }

    // ── widget access ──

    pub fn widget<T: Widget>(&self, id: WidgetId) -> Option<&T> {
        (*self.node(id)?.widget).as_any().downcast_ref::<T>()
    }

    /// Mutable access to a widget; marks it dirty.
    pub fn widget_mut<T: Widget>(&mut self, id: WidgetId) -> Option<&mut T> {
        self.update(id);
        (*self.node_mut(id)?.widget).as_any_mut().downcast_mut::<T>()
    }

    pub fn class_name(&self, id: WidgetId) -> Option<&'static str> {
        self.node(id).map(|n| n.widget.class_name())
    }

    /// Run an input hook of `id` with a fresh context.
    pub(crate) fn call<R>(
        &mut self,
        id: WidgetId,
        delta: (i32, i32),
        f: impl FnOnce(&mut dyn Widget, &mut EventCx) -> Result<R>,
    ) -> Result<(R, EventCx)> {
        let focused = self.focus == Some(id);
        let node = self.try_node_mut(id)?;
        let mut cx = EventCx::new(id, node.geometry.size(), focused).with_delta(delta);
        let out = f(&mut *node.widget, &mut cx)?;
        Ok((out, cx))
    }

    // ── rendering ──

    /// Paint every dirty, shown widget into its own canvas.
    ///
    /// A widget whose paint fails is logged and left out of the frame
    /// together with its subtree; it stays dirty and is retried next time.
    /// Returns the number of widgets painted.
    pub fn paint(&mut self, theme: &Theme) -> usize {
        let _span = debug_span!("ttk.widgets.paint").entered();
        let mut painted = 0;
        for id in self.visit_order() {
            let enabled = self.is_enabled(id);
            let focused = self.focus == Some(id);
            let hovered = self.hover == Some(id);
            let pressed = self.pressed == Some(id);
            let Some(node) = self.node_mut(id) else { continue };
            if !node.dirty {
                continue;
            }
            let state = WidgetState::resolve(enabled, pressed, focused, hovered, node.widget.checked());
            let style = match &node.style {
                Some(map) => map.style_for(state),
                None => theme.class_style(node.widget.class_name()).style_for(state),
            };
            let cx = PaintCx {
                theme,
                style,
                state,
                focused,
                size: node.geometry.size(),
            };
            node.canvas.clear_all();
            match node.widget.paint(&mut node.canvas, &cx) {
                Ok(()) => {
                    node.dirty = false;
                    node.failed = false;
                    painted += 1;
                }
                Err(err) => {
                    warn!(
                        widget = %id,
                        class = node.widget.class_name(),
                        error = %err,
                        "paint failed; widget skipped for this frame"
                    );
                    node.failed = true;
                }
            }
        }
        painted
    }

    /// Copy every shown canvas into `frame`, children clipped to their
    /// parent's content area.
    pub fn compose(&mut self, frame: &mut Canvas) {
        if let Some(root) = self.root {
            if let Some(g) = self.geometry(root) {
                let origin = Point::new(i32::from(g.x), i32::from(g.y));
                self.compose_node(root, origin, frame.area(), frame);
            }
        }
        self.needs_compose = false;
    }

    fn compose_node(&self, id: WidgetId, origin: Point, clip: Rect, frame: &mut Canvas) {
        let Some(node) = self.node(id) else { return };
        if !node.visible || node.failed {
            return;
        }
        let rect = rect_at(origin, node.geometry.size());
        let visible = rect.intersection(&clip);
        if visible.is_empty() {
            return;
        }
        frame.blit(&node.canvas, node.canvas.area(), origin, visible);
        let content = rect.inner(node.padding).intersection(&clip);
        let inner = Point::new(
            origin.x + i32::from(node.padding.left),
            origin.y + i32::from(node.padding.top),
        );
        for child in &node.children {
            let Some(g) = self.geometry(*child) else { continue };
            let at = Point::new(inner.x + i32::from(g.x), inner.y + i32::from(g.y));
            self.compose_node(*child, at, content, frame);
        }
    }

    /// [`paint`](Self::paint) then [`compose`](Self::compose).
    pub fn render(&mut self, theme: &Theme, frame: &mut Canvas) -> usize {
        let painted = self.paint(theme);
        self.compose(frame);
        painted
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing_test::traced_test;
    use ttk_render::Cell;
    use ttk_style::Color;

    use super::*;
    use crate::widget::Container;

    struct Fill(char);

    impl Widget for Fill {
        fn focus_policy(&self) -> FocusPolicy {
            FocusPolicy::STRONG
        }

        fn paint(&self, canvas: &mut Canvas, _cx: &PaintCx<'_>) -> Result<()> {
            canvas.fill(canvas.area(), self.0, &Color::RESET);
            Ok(())
        }
    }

    struct Broken;

    impl Widget for Broken {
        fn paint(&self, _canvas: &mut Canvas, _cx: &PaintCx<'_>) -> Result<()> {
            Err(Error::InvalidColor("#zz".into()))
        }
    }

    fn rooted(w: i32, h: i32) -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.add(Container);
        tree.set_root(root).unwrap();
        tree.set_geometry(root, 0, 0, w, h).unwrap();
        (tree, root)
    }

    // ── structure ──

    #[test]
    fn attaching_twice_is_a_conflict() {
        let (mut tree, root) = rooted(10, 5);
        let other = tree.add(Container);
        tree.attach(root, other).unwrap();
        let child = tree.add(Fill('x'));
        tree.attach(root, child).unwrap();
        assert!(matches!(tree.attach(other, child), Err(Error::LayoutConflict(_))));
        assert!(matches!(tree.attach(child, root), Err(Error::LayoutConflict(_))));
        assert!(matches!(
            tree.attach(root, WidgetId::from_index(99)),
            Err(Error::OutOfTree(_))
        ));
    }

    #[test]
    fn remove_drops_the_subtree() {
        let (mut tree, root) = rooted(10, 5);
        let panel = tree.add(Container);
        let leaf = tree.add(Fill('x'));
        tree.attach(root, panel).unwrap();
        tree.attach(panel, leaf).unwrap();
        tree.set_focus(leaf).unwrap();
        tree.remove(panel).unwrap();
        assert!(!tree.contains(leaf));
        assert_eq!(tree.focus(), None);
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    // ── geometry ──

    #[test]
    fn negative_geometry_is_rejected() {
        let (mut tree, root) = rooted(10, 5);
        assert!(matches!(
            tree.set_geometry(root, 0, 0, -1, 3),
            Err(Error::InvalidGeometry { width: -1, .. })
        ));
        assert_eq!(tree.geometry(root), Some(Rect::new(0, 0, 10, 5)));
    }

    #[test]
    fn box_layout_places_children_and_reports_sizes() {
        let (mut tree, root) = rooted(20, 4);
        tree.set_layout(root, Layout::hbox()).unwrap();
        let a = tree.add(Fill('a'));
        let b = tree.add(Fill('b'));
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&sizes);
        tree.size_changed(b)
            .unwrap()
            .connect_ok(move |s| seen.borrow_mut().push(*s));
        tree.attach(root, a).unwrap();
        tree.attach(root, b).unwrap();
        assert_eq!(tree.geometry(a), Some(Rect::new(0, 0, 10, 4)));
        assert_eq!(tree.geometry(b), Some(Rect::new(10, 0, 10, 4)));
        assert_eq!(tree.canvas(b).map(Canvas::size), Some(Size::new(10, 4)));

        tree.set_geometry(root, 0, 0, 30, 4).unwrap();
        assert_eq!(tree.geometry(b), Some(Rect::new(15, 0, 15, 4)));
        assert_eq!(*sizes.borrow(), [(10, 4), (15, 4)]);
    }

    #[test]
    fn hiding_reflows_siblings() {
        let (mut tree, root) = rooted(20, 2);
        tree.set_layout(root, Layout::hbox()).unwrap();
        let a = tree.add(Fill('a'));
        let b = tree.add(Fill('b'));
        tree.attach(root, a).unwrap();
        tree.attach(root, b).unwrap();
        tree.hide(a).unwrap();
        assert_eq!(tree.geometry(b), Some(Rect::new(0, 0, 20, 2)));
        tree.show(a).unwrap();
        assert_eq!(tree.geometry(b), Some(Rect::new(10, 0, 10, 2)));
    }

    #[test]
    fn padding_offsets_children() {
        let (mut tree, root) = rooted(12, 6);
        tree.set_layout(root, Layout::vbox()).unwrap();
        tree.set_padding(root, 1u16).unwrap();
        let a = tree.add(Fill('a'));
        tree.attach(root, a).unwrap();
        assert_eq!(tree.geometry(a), Some(Rect::new(0, 0, 10, 4)));
        assert_eq!(tree.absolute_rect(a), Some(Rect::new(1, 1, 10, 4)));
    }

    // ── hit testing ──

    #[test]
    fn hit_test_prefers_topmost_child() {
        let (mut tree, root) = rooted(20, 10);
        let low = tree.add(Fill('l'));
        let high = tree.add(Fill('h'));
        tree.attach(root, low).unwrap();
        tree.attach(root, high).unwrap();
        tree.set_geometry(low, 0, 0, 8, 8).unwrap();
        tree.set_geometry(high, 4, 4, 8, 4).unwrap();
        assert_eq!(tree.hit_test(5, 5), Some(high));
        assert_eq!(tree.hit_test(1, 1), Some(low));
        assert_eq!(tree.hit_test(15, 9), Some(root));
        assert_eq!(tree.hit_test(25, 0), None);
        tree.raise(low).unwrap();
        assert_eq!(tree.hit_test(5, 5), Some(low));
    }

    #[test]
    fn padding_area_belongs_to_the_parent() {
        let (mut tree, root) = rooted(10, 10);
        tree.set_padding(root, 2u16).unwrap();
        let child = tree.add(Fill('c'));
        tree.attach(root, child).unwrap();
        tree.set_geometry(child, 0, 0, 20, 20).unwrap();
        assert_eq!(tree.hit_test(2, 2), Some(child));
        assert_eq!(tree.hit_test(1, 1), Some(root));
        assert_eq!(tree.hit_test(8, 8), Some(root));
    }

    // ── focus ──

    #[test]
    fn focus_moves_with_signals_in_order() {
        let (mut tree, root) = rooted(10, 4);
        let a = tree.add(Fill('a'));
        let b = tree.add(Fill('b'));
        tree.attach(root, a).unwrap();
        tree.attach(root, b).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (id, name) in [(a, "a"), (b, "b")] {
            let log = Rc::clone(&log);
            tree.focus_changed(id)
                .unwrap()
                .connect_ok(move |f| log.borrow_mut().push((name, *f)));
        }
        assert!(tree.set_focus(a).unwrap());
        assert!(tree.set_focus(b).unwrap());
        assert_eq!(*log.borrow(), [("a", true), ("a", false), ("b", true)]);
        assert!(!tree.set_focus(root).unwrap());
        assert_eq!(tree.focus(), Some(b));
    }

    #[test]
    fn focus_outside_the_tree_fails() {
        let (mut tree, _) = rooted(10, 4);
        let loose = tree.add(Fill('x'));
        assert!(matches!(tree.set_focus(loose), Err(Error::OutOfTree(_))));
    }

    #[test]
    fn tab_chain_follows_visit_order_and_wraps() {
        let (mut tree, root) = rooted(10, 4);
        let panel = tree.add(Container);
        let a = tree.add(Fill('a'));
        let b = tree.add(Fill('b'));
        let c = tree.add(Fill('c'));
        tree.attach(root, panel).unwrap();
        tree.attach(panel, a).unwrap();
        tree.attach(panel, b).unwrap();
        tree.attach(root, c).unwrap();
        tree.set_enabled(b, false).unwrap();

        let mut visited = Vec::new();
        for _ in 0..3 {
            tree.focus_next(true).unwrap();
            visited.extend(tree.focus());
        }
        assert_eq!(visited, [a, c, a]);
        tree.focus_next(false).unwrap();
        assert_eq!(tree.focus(), Some(c));
    }

    // ── rendering ──

    #[test]
    fn compose_clips_children_to_parent() {
        let (mut tree, root) = rooted(6, 3);
        let panel = tree.add(Fill('.'));
        let child = tree.add(Fill('#'));
        tree.attach(root, panel).unwrap();
        tree.set_geometry(panel, 1, 0, 4, 3).unwrap();
        tree.set_padding(panel, Sides::padding(1, 1, 1, 1)).unwrap();
        tree.attach(panel, child).unwrap();
        tree.set_geometry(child, 0, 0, 10, 10).unwrap();

        let mut frame = Canvas::new(6, 3);
        tree.render(&Theme::utf8(), &mut frame);
        assert_eq!(frame.row_text(0).unwrap(), " .... ");
        assert_eq!(frame.row_text(1).unwrap(), " .##. ");
        assert_eq!(frame.row_text(2).unwrap(), " .... ");
        assert!(!tree.needs_repaint());
    }

    #[test]
    fn only_dirty_widgets_are_repainted() {
        let (mut tree, root) = rooted(4, 1);
        let a = tree.add(Fill('a'));
        tree.attach(root, a).unwrap();
        tree.set_geometry(a, 0, 0, 2, 1).unwrap();
        let mut frame = Canvas::new(4, 1);
        assert_eq!(tree.render(&Theme::utf8(), &mut frame), 2);
        assert_eq!(tree.render(&Theme::utf8(), &mut frame), 0);
        tree.widget_mut::<Fill>(a).unwrap().0 = 'z';
        assert!(tree.needs_repaint());
        assert_eq!(tree.render(&Theme::utf8(), &mut frame), 1);
        assert_eq!(frame.get(1, 0), Some(&Cell::from_char('z')));
    }

    #[test]
    #[traced_test]
    fn failing_paint_is_logged_and_skipped() {
        let (mut tree, root) = rooted(4, 1);
        let good = tree.add(Fill('g'));
        let bad = tree.add(Broken);
        tree.attach(root, good).unwrap();
        tree.attach(root, bad).unwrap();
        tree.set_geometry(good, 0, 0, 2, 1).unwrap();
        tree.set_geometry(bad, 2, 0, 2, 1).unwrap();

        let mut frame = Canvas::new(4, 1);
        frame.fill(frame.area(), '?', &Color::RESET);
        tree.render(&Theme::utf8(), &mut frame);
        assert_eq!(frame.row_text(0).unwrap(), "gg  ");
        assert!(tree.is_dirty(bad));
        assert!(logs_contain("paint failed"));
    }
}
