#![forbid(unsafe_code)]

//! Drag-and-drop payloads and the state of an active drag.
//!
//! A widget starts a drag from one of its mouse handlers with
//! [`EventCx::start_drag`](crate::widget::EventCx::start_drag). From then on
//! the dispatcher owns a [`DragState`] and routes the pointer as drag
//! events instead of mouse events:
//!
//! 1. `drag_enter` / `drag_leave` as the widget under the pointer changes
//! 2. `drag_move` bubbling from the widget under the pointer; the first
//!    widget returning `true` becomes the drop target
//! 3. on release, one `drop_payload` to the current target, which takes the
//!    payload by value; without a target the drag is cancelled
//!
//! Escape cancels a drag at any time.

use ttk_core::Point;
use ttk_render::Canvas;

use crate::tree::WidgetId;

/// Data carried by a drag.
///
/// The type string is MIME-like; sources and targets only need to agree on
/// it and on the byte format.
///
/// ```
/// # use ttk_widgets::drag::DragPayload;
/// let payload = DragPayload::text("hello world");
/// assert_eq!(payload.drag_type, "text/plain");
/// assert!(payload.matches_type("text/*"));
/// assert_eq!(payload.as_text(), Some("hello world"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragPayload {
    pub drag_type: String,
    pub data: Vec<u8>,
    /// Shown next to the pointer when the source gives no preview canvas.
    pub display_text: Option<String>,
}

impl DragPayload {
    #[must_use]
    pub fn new(drag_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            drag_type: drag_type.into(),
            data,
            display_text: None,
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let s: String = text.into();
        Self {
            drag_type: "text/plain".to_string(),
            data: s.as_bytes().to_vec(),
            display_text: Some(s),
        }
    }

    #[must_use]
    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.display_text = Some(text.into());
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Exact match, `*`, or a `major/*` wildcard.
    pub fn matches_type(&self, pattern: &str) -> bool {
        if pattern == "*" || pattern == "*/*" {
            return true;
        }
        match pattern.strip_suffix("/*") {
            Some(prefix) => {
                self.drag_type.starts_with(prefix)
                    && self.drag_type.as_bytes().get(prefix.len()) == Some(&b'/')
            }
            None => self.drag_type == pattern,
        }
    }
}

/// What a widget hands to the dispatcher to begin a drag.
#[derive(Debug)]
pub struct DragRequest {
    pub payload: DragPayload,
    pub preview: Option<Canvas>,
    /// Pointer position inside the preview.
    pub hotspot: Point,
}

/// An active drag. Owned by the dispatcher between start and drop/cancel.
#[derive(Debug)]
pub struct DragState {
    pub source: WidgetId,
    pub payload: DragPayload,
    pub preview: Option<Canvas>,
    pub hotspot: Point,
    pub start: Point,
    pub current: Point,
    /// Widget under the pointer, which got the last `drag_enter`.
    pub(crate) over: Option<WidgetId>,
    /// Widget that accepted the last `drag_move`.
    pub(crate) target: Option<WidgetId>,
}

impl DragState {
    pub fn new(source: WidgetId, request: DragRequest, start: Point) -> Self {
        Self {
            source,
            payload: request.payload,
            preview: request.preview,
            hotspot: request.hotspot,
            start,
            current: start,
            over: None,
            target: None,
        }
    }

    pub fn update_position(&mut self, pos: Point) {
        self.current = pos;
    }

    pub fn delta(&self) -> (i32, i32) {
        (self.current.x - self.start.x, self.current.y - self.start.y)
    }

    /// Widget that would receive the drop right now.
    pub fn target(&self) -> Option<WidgetId> {
        self.target
    }

    /// Top-left cell of the preview, or of the display text, in screen
    /// coordinates.
    pub fn preview_origin(&self) -> Point {
        Point::new(
            self.current.x - self.hotspot.x,
            self.current.y - self.hotspot.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── payload ──

    #[test]
    fn wildcard_types() {
        let p = DragPayload::new("widget/list-item", b"3".to_vec());
        assert!(p.matches_type("widget/*"));
        assert!(p.matches_type("*"));
        assert!(!p.matches_type("wid/*"));
        assert!(!p.matches_type("text/plain"));
        assert_eq!(p.display_text, None);
    }

    #[test]
    fn binary_payload_is_not_text() {
        let p = DragPayload::new("application/octet-stream", vec![0xff, 0xfe]);
        assert_eq!(p.as_text(), None);
    }

    // ── state ──

    #[test]
    fn delta_and_preview_follow_pointer() {
        let request = DragRequest {
            payload: DragPayload::text("x"),
            preview: None,
            hotspot: Point::new(1, 0),
        };
        let mut state = DragState::new(WidgetId::from_index(4), request, Point::new(10, 5));
        state.update_position(Point::new(13, 2));
        assert_eq!(state.delta(), (3, -3));
        assert_eq!(state.preview_origin(), Point::new(12, 2));
        assert_eq!(state.target(), None);
    }
}
