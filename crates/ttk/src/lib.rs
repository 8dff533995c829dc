#![forbid(unsafe_code)]

//! ttk public facade.
//!
//! Re-exports the types most applications touch, the shared [`Error`] and
//! [`Result`], and a [`prelude`]. The layer crates stay reachable as
//! [`core`], [`style`], [`text`], [`render`], [`layout`], [`vt`],
//! [`widgets`] and [`runtime`].
//!
//! ```no_run
//! use ttk::prelude::*;
//!
//! fn main() -> ttk::Result<()> {
//!     let mut tree = WidgetTree::new();
//!     let root = tree.add(Container);
//!     tree.set_root(root)?;
//!     let hello = tree.add(Label::new("hello"));
//!     tree.attach(root, hello)?;
//!     tree.set_geometry(hello, 1, 1, 10, 1)?;
//!     ttk::run(tree, AppConfig::from_env(), |app| {
//!         let quit = app.quit_handle();
//!         app.shortcut("ctrl+q".parse()?).connect_ok(move |_| quit.quit());
//!         Ok(())
//!     })
//! }
//! ```

// --- Core ------------------------------------------------------------------

pub use ttk_core::event::{
    Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use ttk_core::keybinding::KeyCombo;
pub use ttk_core::signal::{ConnectionId, Signal, SignalBus, SlotResult};
pub use ttk_core::{Error, ParseError, Point, Rect, Result, Sides, Size, SlotError};

// --- Style, text, render ---------------------------------------------------

pub use ttk_render::{Canvas, Cell, Draw, Glyph};
pub use ttk_style::{Color, ColorProfile, Mods, StyleMap, Theme, WidgetState};
pub use ttk_text::{Alignment, StyledString, TextCursor, TextDocument, TextWrap, WrapMode};

// --- Layout, widgets, terminal ---------------------------------------------

pub use ttk_layout::{BoxLayout, GridLayout, Layout};
pub use ttk_vt::Terminal;
pub use ttk_widgets::{
    Button, Container, Dispatcher, DragPayload, EventCx, FocusPolicy, Frame, Label, PaintCx,
    TerminalView, TextEdit, Widget, WidgetId, WidgetTree,
};

// --- Runtime ---------------------------------------------------------------

#[cfg(feature = "runtime")]
pub use ttk_runtime::{
    AppConfig, Compositor, EasingCurve, HeadlessEventSource, PropertyAnimation, QuitHandle,
    ScreenMode, TerminalSession, run,
};

pub mod prelude {
    pub use crate::{
        Alignment, Button, Color, Container, Draw, Error, Event, EventCx, FocusPolicy, Frame,
        KeyCode, KeyEvent, Label, Layout, Modifiers, MouseEvent, PaintCx, Result, Signal,
        StyledString, TextEdit, Theme, Widget, WidgetId, WidgetTree,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{AppConfig, Compositor, QuitHandle, ScreenMode};

    pub use crate::{core, layout, render, style, text, vt, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use ttk_core as core;
pub use ttk_layout as layout;
pub use ttk_render as render;
#[cfg(feature = "runtime")]
pub use ttk_runtime as runtime;
pub use ttk_style as style;
pub use ttk_text as text;
pub use ttk_vt as vt;
pub use ttk_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn errors_are_shared_across_layers() {
        let err: crate::Error = std::io::Error::other("gone").into();
        assert!(matches!(err, ttk_core::Error::Io(_)));
        let parsed: std::result::Result<crate::KeyCombo, _> = "ctrl+q".parse();
        assert!(parsed.is_ok());
    }

    #[test]
    fn prelude_builds_a_tree() {
        let mut tree = WidgetTree::new();
        let root = tree.add(Container);
        tree.set_root(root).unwrap();
        let label = tree.add(Label::new("hi"));
        tree.attach(root, label).unwrap();
        assert_eq!(tree.children(root), [label]);
    }
}
