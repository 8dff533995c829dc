#![forbid(unsafe_code)]

//! VT/xterm emulation for the terminal widget.
//!
//! # Role in ttk
//! `ttk-vt` turns the byte stream of a program into screen state. It has no
//! host process of its own: the embedding widget feeds it bytes and sends
//! the encoded keys, pastes and mouse reports back.
//!
//! # Pieces
//! - [`Parser`]: a byte-at-a-time state machine producing typed [`Action`]s.
//!   It never fails; malformed input is counted, logged and dropped.
//! - [`Screen`]: one cell matrix with cursor, scrolling region and scrollback.
//! - [`Terminal`]: the two screens plus modes, dispatching actions through a
//!   table keyed by the CSI final byte.
//! - [`Selection`]: text extraction that rejoins wrapped lines.
//! - [`input`]: key, paste, focus and mouse encoding.

pub mod input;
pub mod modes;
pub mod parser;
pub mod screen;
pub mod selection;
pub mod terminal;

pub use input::{encode_focus, encode_key, encode_mouse, encode_paste};
pub use modes::{Modes, MouseTracking};
pub use parser::{Action, MAX_SEQUENCE_LEN, MAX_STRING_LEN, Parser, State};
pub use screen::{Row, SavedCursor, Screen};
pub use selection::Selection;
pub use terminal::{DEFAULT_SCROLLBACK, Terminal};
