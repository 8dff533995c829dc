#![forbid(unsafe_code)]

//! Text model for ttk.
//!
//! - [`StyledString`]: width-aware glyph clusters, each paired with a [`Color`](ttk_style::Color)
//! - [`TextDocument`]: editable lines with snapshot undo/redo and change signals
//! - [`TextCursor`]: multi-cursor selection model over a document
//! - [`TextWrap`]: document line to screen line mapping
//!
//! # Example
//! ```
//! use ttk_style::Color;
//! use ttk_text::{Alignment, StyledString};
//!
//! let s = StyledString::styled("ok", Color::BOLD) + StyledString::from("!");
//! assert_eq!(s.width(), 3);
//! let padded = s.align(7, &Color::RESET, Alignment::Center);
//! assert_eq!(padded.as_str(), "  ok!  ");
//! ```

pub mod cursor;
pub mod document;
pub mod styled;
pub mod wrap;

pub use cursor::{CursorPos, MoveMode, MoveOperation, SelectionType, TextCursor};
pub use document::{ContentsChange, TextDocument};
pub use styled::{Alignment, StyledString};
pub use wrap::{TextWrap, WrapMode};
