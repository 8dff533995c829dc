#![forbid(unsafe_code)]

//! Routing of input events to widgets.
//!
//! The [`Dispatcher`] owns everything about input that outlives a single
//! event: the mouse grab, an active drag, global shortcuts and the quit
//! flag. Widgets themselves live in the [`WidgetTree`].
//!
//! # Rules
//!
//! - A mouse press goes to the deepest shown widget under the pointer and
//!   grabs the mouse: moves and the release go to that widget wherever the
//!   pointer is, moves arriving as `Drag` with the delta since the previous
//!   event.
//! - An unhandled event bubbles to the parent, coordinates re-expressed in
//!   the parent's space. Disabled widgets are skipped.
//! - Keys try global shortcuts first, then the focused widget and its
//!   ancestors. Unhandled Tab/BackTab cycle focus.
//! - A press on a widget with [`FocusPolicy::CLICK`] focuses it first.

use tracing::{debug, trace};
use ttk_core::event::{Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ttk_core::keybinding::KeyCombo;
use ttk_core::signal::Signal;
use ttk_core::{Point, Result};

use crate::drag::DragState;
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{EventCx, FocusPolicy};

struct Shortcut {
    combo: KeyCombo,
    activated: Signal<()>,
}

/// Input router between the event source and the widget tree.
#[derive(Default)]
pub struct Dispatcher {
    grab: Option<WidgetId>,
    last_pos: Option<Point>,
    drag: Option<DragState>,
    shortcuts: Vec<Shortcut>,
    quit: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("grab", &self.grab)
            .field("drag", &self.drag.as_ref().map(|d| d.source))
            .field("shortcuts", &self.shortcuts.len())
            .field("quit", &self.quit)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal fired when `combo` is pressed, created on first use.
    ///
    /// A shortcut with no receivers does not consume the key.
    pub fn shortcut(&mut self, combo: KeyCombo) -> Signal<()> {
        if let Some(existing) = self.shortcuts.iter().find(|s| s.combo == combo) {
            return existing.activated.clone();
        }
        let activated = Signal::new("shortcut");
        self.shortcuts.push(Shortcut {
            combo,
            activated: activated.clone(),
        });
        activated
    }

    pub fn remove_shortcut(&mut self, combo: &KeyCombo) -> bool {
        let before = self.shortcuts.len();
        self.shortcuts.retain(|s| s.combo != *combo);
        self.shortcuts.len() != before
    }

    /// Ask the loop to stop after the current event.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn grab(&self) -> Option<WidgetId> {
        self.grab
    }

    /// The active drag, for drawing its preview.
    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Route one event. Returns whether something handled it.
    ///
    /// Resize, focus and tick events belong to the loop and are ignored.
    pub fn dispatch(&mut self, tree: &mut WidgetTree, event: &Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.dispatch_key(tree, key),
            Event::Mouse(mouse) => self.dispatch_mouse(tree, mouse),
            Event::Paste(text) => self.dispatch_paste(tree, text),
            Event::Resize { .. } | Event::Focus(_) | Event::Tick => Ok(false),
        }
    }

    // ── keyboard ──

    pub fn dispatch_key(&mut self, tree: &mut WidgetTree, key: &KeyEvent) -> Result<bool> {
        if self.drag.is_some() && key.code == KeyCode::Escape {
            self.cancel_drag(tree)?;
            return Ok(true);
        }
        if let Some(shortcut) = self
            .shortcuts
            .iter()
            .find(|s| s.combo.matches(key) && s.activated.receiver_count() > 0)
        {
            trace!(combo = ?shortcut.combo, "shortcut");
            shortcut.activated.emit(&())?;
            return Ok(true);
        }
        if let Some(focused) = tree.focus() {
            let handled = self.bubble(tree, focused, (0, 0), |w, cx| w.key(key, cx))?;
            if handled {
                return Ok(true);
            }
        }
        match key.code {
            KeyCode::Tab if key.shift() => tree.focus_next(false),
            KeyCode::Tab => tree.focus_next(true),
            KeyCode::BackTab => tree.focus_next(false),
            _ => Ok(false),
        }
    }

    pub fn dispatch_paste(&mut self, tree: &mut WidgetTree, text: &str) -> Result<bool> {
        match tree.focus() {
            Some(focused) => self.bubble(tree, focused, (0, 0), |w, cx| w.paste(text, cx)),
            None => Ok(false),
        }
    }

    // ── mouse ──

    pub fn dispatch_mouse(&mut self, tree: &mut WidgetTree, ev: &MouseEvent) -> Result<bool> {
        if self.drag.is_some() {
            return self.drag_step(tree, ev);
        }
        let pos = ev.position();
        match ev.kind {
            MouseEventKind::Press => {
                let Some(target) = tree.hit_test(pos.x, pos.y) else {
                    return Ok(false);
                };
                if tree.focus_policy(target).contains(FocusPolicy::CLICK) && tree.is_enabled(target) {
                    tree.set_focus(target)?;
                }
                self.grab = Some(target);
                self.last_pos = Some(pos);
                tree.set_pressed(Some(target));
                trace!(widget = %target, x = pos.x, y = pos.y, "grab");
                let delivered = self.deliver(tree, target, ev, (0, 0));
                if delivered.is_err() {
                    self.grab = None;
                    self.last_pos = None;
                    tree.set_pressed(None);
                }
                delivered
            }
            MouseEventKind::Move | MouseEventKind::Drag if self.grab.is_some() => {
                let Some(target) = self.grab else {
                    return Ok(false);
                };
                let last = self.last_pos.replace(pos).unwrap_or(pos);
                let delta = (pos.x - last.x, pos.y - last.y);
                let mut drag = *ev;
                drag.kind = MouseEventKind::Drag;
                self.deliver(tree, target, &drag, delta)
            }
            MouseEventKind::Release => {
                let target = self.grab.take().or_else(|| tree.hit_test(pos.x, pos.y));
                self.last_pos = None;
                tree.set_pressed(None);
                match target {
                    Some(target) => self.deliver(tree, target, ev, (0, 0)),
                    None => Ok(false),
                }
            }
            MouseEventKind::Move | MouseEventKind::Drag => {
                let hit = tree.hit_test(pos.x, pos.y);
                tree.set_hover(hit);
                match hit {
                    Some(target) => {
                        let mut moved = *ev;
                        moved.kind = MouseEventKind::Move;
                        self.deliver(tree, target, &moved, (0, 0))
                    }
                    None => Ok(false),
                }
            }
            MouseEventKind::DoubleClick
            | MouseEventKind::Tap
            | MouseEventKind::WheelUp
            | MouseEventKind::WheelDown => match tree.hit_test(pos.x, pos.y) {
                Some(target) => self.deliver(tree, target, ev, (0, 0)),
                None => Ok(false),
            },
        }
    }

    /// Hand a mouse event to `start`, bubbling while unhandled.
    fn deliver(&mut self, tree: &mut WidgetTree, start: WidgetId, ev: &MouseEvent, delta: (i32, i32)) -> Result<bool> {
        let mut cur = Some(start);
        while let Some(id) = cur {
            cur = tree.parent(id);
            if !tree.is_enabled(id) {
                continue;
            }
            let Some(origin) = tree.absolute_origin(id) else {
                continue;
            };
            let mut local = *ev;
            local.x -= origin.x;
            local.y -= origin.y;
            let (handled, cx) = tree.call(id, delta, |w, cx| match local.kind {
                MouseEventKind::Press => w.mouse_press(&local, cx),
                MouseEventKind::Release => w.mouse_release(&local, cx),
                MouseEventKind::Move => w.mouse_move(&local, cx),
                MouseEventKind::Drag => w.mouse_drag(&local, cx),
                MouseEventKind::DoubleClick => w.mouse_double_click(&local, cx),
                MouseEventKind::Tap => w.mouse_tap(&local, cx),
                MouseEventKind::WheelUp | MouseEventKind::WheelDown => w.wheel(&local, cx),
            })?;
            self.apply_requests(tree, cx, ev.position())?;
            if handled {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Like [`deliver`](Self::deliver) for hooks without coordinates.
    fn bubble<F>(&mut self, tree: &mut WidgetTree, start: WidgetId, delta: (i32, i32), mut f: F) -> Result<bool>
    where
        F: FnMut(&mut dyn crate::widget::Widget, &mut EventCx) -> Result<bool>,
    {
        let mut cur = Some(start);
        while let Some(id) = cur {
            cur = tree.parent(id);
            if !tree.is_enabled(id) {
                continue;
            }
            let (handled, cx) = tree.call(id, delta, &mut f)?;
            let at = self.last_pos.unwrap_or_default();
            self.apply_requests(tree, cx, at)?;
            if handled {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn apply_requests(&mut self, tree: &mut WidgetTree, cx: EventCx, pos: Point) -> Result<()> {
        let id = cx.id();
        apply_update_and_focus(tree, &cx)?;
        if let Some(request) = cx.drag {
            debug!(source = %id, kind = %request.payload.drag_type, "drag started");
            self.grab = None;
            self.last_pos = None;
            tree.set_pressed(None);
            self.drag = Some(DragState::new(id, request, pos));
        }
        Ok(())
    }

    // ── drag and drop ──

    fn drag_step(&mut self, tree: &mut WidgetTree, ev: &MouseEvent) -> Result<bool> {
        let pos = ev.position();
        match ev.kind {
            MouseEventKind::Move | MouseEventKind::Drag => {
                let Some(state) = self.drag.as_mut() else {
                    return Ok(false);
                };
                state.update_position(pos);
                let hit = tree.hit_test(pos.x, pos.y);
                if hit != state.over {
                    if let Some(old) = state.over.take() {
                        let ((), cx) = tree.call(old, (0, 0), |w, cx| w.drag_leave(&state.payload, cx))?;
                        apply_drag_hook_requests(tree, &cx)?;
                        tree.update(old);
                        if state.target == Some(old) {
                            state.target = None;
                        }
                    }
                    if let Some(new) = hit {
                        let local = local_point(tree, new, pos);
                        let (_, cx) = tree.call(new, (0, 0), |w, cx| w.drag_enter(local, &state.payload, cx))?;
                        apply_drag_hook_requests(tree, &cx)?;
                        tree.update(new);
                    }
                    state.over = hit;
                }
                state.target = None;
                let mut cur = hit;
                while let Some(id) = cur {
                    cur = tree.parent(id);
                    let local = local_point(tree, id, pos);
                    let (accepted, cx) = tree.call(id, (0, 0), |w, cx| w.drag_move(local, &state.payload, cx))?;
                    apply_drag_hook_requests(tree, &cx)?;
                    if accepted {
                        state.target = Some(id);
                        break;
                    }
                }
                Ok(true)
            }
            MouseEventKind::Release => {
                let Some(state) = self.drag.take() else {
                    return Ok(false);
                };
                match state.target {
                    Some(target) => {
                        debug!(source = %state.source, target = %target, "drop");
                        let local = local_point(tree, target, pos);
                        let (_, cx) = tree.call(target, (0, 0), |w, cx| w.drop_payload(local, state.payload, cx))?;
                        apply_drag_hook_requests(tree, &cx)?;
                        tree.update(target);
                    }
                    None => {
                        debug!(source = %state.source, "drag cancelled, no target");
                        if let Some(over) = state.over {
                            let ((), cx) = tree.call(over, (0, 0), |w, cx| w.drag_leave(&state.payload, cx))?;
                            apply_drag_hook_requests(tree, &cx)?;
                        }
                    }
                }
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    /// Abort the active drag; the widget under the pointer sees a leave.
    pub fn cancel_drag(&mut self, tree: &mut WidgetTree) -> Result<()> {
        if let Some(state) = self.drag.take() {
            debug!(source = %state.source, "drag cancelled");
            if let Some(over) = state.over {
                let ((), cx) = tree.call(over, (0, 0), |w, cx| w.drag_leave(&state.payload, cx))?;
                apply_drag_hook_requests(tree, &cx)?;
                tree.update(over);
            }
        }
        Ok(())
    }
}

fn apply_update_and_focus(tree: &mut WidgetTree, cx: &EventCx) -> Result<()> {
    if cx.update {
        tree.update(cx.id());
    }
    if cx.focus {
        tree.set_focus(cx.id())?;
    }
    Ok(())
}

/// Requests from a drag-and-drop hook. A drag cannot start while another
/// one is being routed, so a drag request there is dropped.
fn apply_drag_hook_requests(tree: &mut WidgetTree, cx: &EventCx) -> Result<()> {
    if cx.drag.is_some() {
        debug!(widget = %cx.id(), "drag request ignored during drag");
    }
    apply_update_and_focus(tree, cx)
}

fn local_point(tree: &WidgetTree, id: WidgetId, pos: Point) -> Point {
    let origin = tree.absolute_origin(id).unwrap_or_default();
    Point::new(pos.x - origin.x, pos.y - origin.y)
}
