#![forbid(unsafe_code)]

//! Compositor loop and terminal plumbing.
//!
//! # Role in ttk
//! `ttk-runtime` turns a [`WidgetTree`] into a running application:
//!
//! - [`Compositor`]: the single-threaded loop. It waits on input, timers and
//!   the frame clock, dispatches events, repaints dirty widgets and writes the
//!   buffered ANSI diff of the frame.
//! - [`TerminalSession`]: raw mode and terminal modes, restored on drop,
//!   panic and termination signals.
//! - [`EventSource`]: the input seam, with a crossterm implementation and a
//!   scripted [`HeadlessEventSource`] for tests.
//! - [`TimerQueue`] and [`PropertyAnimation`] with the [`EasingCurve`] set.
//! - [`AppConfig`]: builder and `TTK_*` environment configuration.
//! - [`logging`]: `tracing` output to a file, since the UI owns stdout.
//!
//! [`run`] wires all of these together for the common case.

pub mod animation;
pub mod compositor;
pub mod config;
pub mod context;
pub mod event_source;
pub mod logging;
pub mod session;
pub mod timer;

use std::io::{self, BufWriter, Stdout};

pub use animation::{Animation, EasingCurve, Interpolate, Mode, PropertyAnimation, Shape};
pub use compositor::Compositor;
pub use config::{AppConfig, ColorMode, MouseMode, ScreenMode};
pub use context::{Context, QuitHandle};
pub use event_source::{CrosstermEventSource, EventSource, HeadlessEventSource};
pub use session::{SessionOptions, TerminalSession};
pub use timer::{TimerId, TimerQueue};

use ttk_core::Result;
use ttk_widgets::WidgetTree;

/// A compositor on the real terminal.
pub type TerminalCompositor = Compositor<CrosstermEventSource, BufWriter<Stdout>>;

/// Run `tree` on the terminal until quit.
///
/// Starts file logging when `config.log_path` is set, opens a
/// [`TerminalSession`], lets `setup` connect shortcuts and timers, then runs
/// the loop. The terminal is restored before this returns.
pub fn run(
    tree: WidgetTree,
    config: AppConfig,
    setup: impl FnOnce(&mut TerminalCompositor) -> Result<()>,
) -> Result<()> {
    if let Some(path) = &config.log_path {
        logging::init_file_logger(path)?;
    }
    let _session = TerminalSession::new(SessionOptions::from_config(&config))?;
    let out = BufWriter::new(io::stdout());
    let mut compositor = Compositor::new(tree, CrosstermEventSource::new(), out, config)?;
    setup(&mut compositor)?;
    compositor.run()
}
