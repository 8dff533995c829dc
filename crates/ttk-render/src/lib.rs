#![forbid(unsafe_code)]

//! Render kernel: cells, canvases, drawing primitives, and ANSI output.
//!
//! # Role in ttk
//! `ttk-render` is where widget drawing turns into terminal bytes. Widgets
//! paint into a [`Canvas`] through the [`Draw`] trait, the compositor blits
//! child canvases into their parents, and the root canvas serializes either
//! a full frame or a minimal diff against the previous one.
//!
//! # Primary responsibilities
//! - **Cell / Glyph**: one terminal position, wide glyphs as head plus continuation.
//! - **Canvas**: clipped writes, blits with transparency, resize.
//! - **Draw**: lines, boxes, grids, scroll bars, tabs and menu buttons from a [`Theme`](ttk_style::Theme).
//! - **Serialization**: full frames, diffs, and double-buffered output.
//! - **TerminalModel**: a small terminal used by tests to replay output.

pub mod ansi;
pub mod canvas;
pub mod cell;
pub mod drawing;
pub mod terminal_model;

pub use canvas::{Canvas, wide_overflow_color};
pub use cell::{Cell, Glyph};
pub use drawing::{Draw, MenuButton, TAB_SPACES};
pub use terminal_model::TerminalModel;
