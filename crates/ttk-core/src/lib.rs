#![forbid(unsafe_code)]

//! Core building blocks shared by every ttk crate: error kinds, geometry,
//! typed input events, gesture tracking, key combos, and synchronous signals.

pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod keybinding;
pub mod logging;
pub mod signal;
pub mod text_width;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

pub use error::{Error, ParseError, Result, SlotError};
pub use geometry::{Point, Rect, Sides, Size};
