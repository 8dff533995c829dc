#![forbid(unsafe_code)]

//! The [`Widget`] trait and the contexts handed to its hooks.
//!
//! A widget is the behaviour half of a tree node: the tree owns geometry,
//! canvas, layout, visibility and focus, and calls into the widget to paint
//! and to react to input. Every input hook returns `Ok(true)` when it
//! handled the event; `Ok(false)` lets the dispatcher try the parent.
//! Errors come from signal receivers and are handed to the caller of the
//! dispatch.
//!
//! Mouse coordinates passed to hooks are local to the widget canvas.

use std::any::Any;

use bitflags::bitflags;
use ttk_core::event::{KeyEvent, MouseEvent};
use ttk_core::{Point, Result, Sides, Size};
use ttk_layout::Hints;
use ttk_render::Canvas;
use ttk_style::style::Style;
use ttk_style::{Theme, WidgetState};

use crate::drag::{DragPayload, DragRequest};
use crate::tree::WidgetId;

bitflags! {
    /// How a widget may take keyboard focus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FocusPolicy: u8 {
        /// A mouse press focuses the widget.
        const CLICK = 0x01;
        /// Tab/BackTab visit the widget.
        const TAB   = 0x02;
        const STRONG = Self::CLICK.bits() | Self::TAB.bits();
    }
}

/// Downcasting support for boxed widgets.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-call context for input hooks.
///
/// Besides describing the target, it collects requests the widget cannot
/// carry out itself while the tree is borrowed: repaint, focus, and
/// starting a drag. The dispatcher applies them after the hook returns.
#[derive(Debug)]
pub struct EventCx {
    id: WidgetId,
    size: Size,
    focused: bool,
    delta: (i32, i32),
    pub(crate) update: bool,
    pub(crate) focus: bool,
    pub(crate) drag: Option<DragRequest>,
}

impl EventCx {
    pub fn new(id: WidgetId, size: Size, focused: bool) -> Self {
        Self {
            id,
            size,
            focused,
            delta: (0, 0),
            update: false,
            focus: false,
            drag: None,
        }
    }

    #[must_use]
    pub(crate) fn with_delta(mut self, delta: (i32, i32)) -> Self {
        self.delta = delta;
        self
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// Pointer movement since the previous event of this grab.
    pub fn delta(&self) -> (i32, i32) {
        self.delta
    }

    /// Whether `(x, y)` lies inside the widget.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.size.width) && y < i32::from(self.size.height)
    }

    /// Repaint this widget on the next frame.
    pub fn update(&mut self) {
        self.update = true;
    }

    pub fn request_focus(&mut self) {
        self.focus = true;
    }

    /// Begin a drag. Only honoured from a mouse hook; the dispatcher
    /// releases the mouse grab and switches to drag routing.
    pub fn start_drag(&mut self, payload: DragPayload, preview: Option<Canvas>, hotspot: Point) {
        self.drag = Some(DragRequest {
            payload,
            preview,
            hotspot,
        });
    }

    pub fn is_drag_requested(&self) -> bool {
        self.drag.is_some()
    }
}

/// Read-only context for [`Widget::paint`].
#[derive(Debug)]
pub struct PaintCx<'a> {
    pub theme: &'a Theme,
    /// Colors for the current state, already merged over the defaults.
    pub style: Style,
    pub state: WidgetState,
    pub focused: bool,
    pub size: Size,
}

/// Behaviour of a tree node. Every hook has a no-op default.
pub trait Widget: AsAny {
    /// Key into the theme's per-class styles.
    fn class_name(&self) -> &'static str {
        "Widget"
    }

    fn size_hint(&self) -> Hints {
        Hints::default()
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::empty()
    }

    /// Padding applied around the child layout when the widget is added.
    fn padding(&self) -> Sides {
        Sides::default()
    }

    /// `Some(checked)` for widgets with a checked state.
    fn checked(&self) -> Option<bool> {
        None
    }

    /// Draw into the widget's own canvas, which has been cleared.
    fn paint(&self, _canvas: &mut Canvas, _cx: &PaintCx<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after the canvas has been resized.
    fn resized(&mut self, _width: u16, _height: u16) -> Result<()> {
        Ok(())
    }

    fn focus_changed(&mut self, _focused: bool, _cx: &mut EventCx) -> Result<()> {
        Ok(())
    }

    // ── mouse ──

    fn mouse_press(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn mouse_release(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn mouse_move(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn mouse_drag(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn mouse_double_click(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn mouse_tap(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn wheel(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    // ── keyboard ──

    fn key(&mut self, _ev: &KeyEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn paste(&mut self, _text: &str, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    // ── drag and drop ──

    fn drag_enter(&mut self, _pos: Point, _payload: &DragPayload, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    /// Return `true` to accept a drop at `pos`.
    fn drag_move(&mut self, _pos: Point, _payload: &DragPayload, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }

    fn drag_leave(&mut self, _payload: &DragPayload, _cx: &mut EventCx) -> Result<()> {
        Ok(())
    }

    /// The payload is now owned by this widget.
    fn drop_payload(&mut self, _pos: Point, _payload: DragPayload, _cx: &mut EventCx) -> Result<bool> {
        Ok(false)
    }
}

/// A widget with no behaviour, used for plain containers.
#[derive(Debug, Default)]
pub struct Container;

impl Widget for Container {
    fn class_name(&self) -> &'static str {
        "Container"
    }
}
