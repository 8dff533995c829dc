#![forbid(unsafe_code)]

//! Widget tree, input routing and the stock widgets.
//!
//! # Role in ttk
//! `ttk-widgets` owns everything between raw [`Event`](ttk_core::event::Event)s
//! and the frame canvas:
//!
//! - [`WidgetTree`]: an arena of nodes keyed by [`WidgetId`]. Each node has
//!   geometry relative to its parent, its own canvas, a layout for its
//!   children, visibility, enablement and focus policy. Behaviour lives in a
//!   boxed [`Widget`].
//! - [`Dispatcher`]: keyboard routing (shortcuts, then the focus chain,
//!   then Tab traversal), mouse routing with press grab and hover, and
//!   drag-and-drop sessions.
//! - Painting is incremental: only dirty widgets repaint into their canvas,
//!   and [`WidgetTree::compose`] stacks the canvases into the frame with
//!   each child clipped to its parent's content area.
//!
//! The stock widgets ([`Label`], [`Button`], [`Frame`], [`TextEdit`],
//! [`TerminalView`]) are ordinary [`Widget`] impls and use nothing private.

pub mod button;
pub mod dispatch;
pub mod drag;
pub mod frame;
pub mod label;
pub mod terminal_view;
pub mod text_edit;
pub mod tree;
pub mod widget;

pub use button::Button;
pub use dispatch::Dispatcher;
pub use drag::{DragPayload, DragRequest, DragState};
pub use frame::Frame;
pub use label::Label;
pub use terminal_view::TerminalView;
pub use text_edit::TextEdit;
pub use tree::{WidgetId, WidgetTree};
pub use widget::{Container, EventCx, FocusPolicy, PaintCx, Widget};
