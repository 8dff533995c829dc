#![forbid(unsafe_code)]

//! Terminal session lifecycle.
//!
//! [`TerminalSession`] enters raw mode and the requested terminal modes, and
//! restores the terminal when dropped, on panic, and (on unix) on SIGINT or
//! SIGTERM. Modes are disabled in reverse order of enabling; raw mode goes
//! last.
//!
//! Only one session should exist at a time.

use std::io::{self, Write};
use std::sync::OnceLock;

use tracing::{debug, info};
use ttk_render::ansi;

use crate::config::{AppConfig, MouseMode, ScreenMode};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Which terminal modes a session turns on. All off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// `CSI ? 1049 h`. Leave off for inline mode so scrollback survives.
    pub alternate_screen: bool,
    /// Mouse tracking level, always with SGR coordinates.
    pub mouse: MouseMode,
    /// `CSI ? 2004 h`: pastes arrive as one event.
    pub bracketed_paste: bool,
    /// `CSI ? 1004 h`: focus in/out reports.
    pub focus_events: bool,
}

impl SessionOptions {
    /// The modes an application configured with `config` needs.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            alternate_screen: matches!(config.screen_mode, ScreenMode::AltScreen),
            mouse: config.mouse,
            bracketed_paste: config.bracketed_paste,
            focus_events: config.focus_reporting,
        }
    }

    /// Bytes that switch the enabled modes on, in enabling order.
    pub fn enter_sequence(&self) -> String {
        let mut out = String::new();
        if self.alternate_screen {
            out.push_str(ansi::ALT_SCREEN_ENTER);
        }
        if self.mouse != MouseMode::Off {
            out.push_str(ansi::mouse_tracking(self.mouse));
        }
        if self.bracketed_paste {
            out.push_str(ansi::BRACKETED_PASTE_ENABLE);
        }
        if self.focus_events {
            out.push_str(ansi::FOCUS_ENABLE);
        }
        out.push_str(ansi::CURSOR_HIDE);
        out
    }

    /// Bytes that undo [`enter_sequence`](Self::enter_sequence), in reverse.
    pub fn leave_sequence(&self) -> String {
        let mut out = String::from(ansi::SGR_RESET);
        if self.focus_events {
            out.push_str(ansi::FOCUS_DISABLE);
        }
        if self.bracketed_paste {
            out.push_str(ansi::BRACKETED_PASTE_DISABLE);
        }
        if self.mouse != MouseMode::Off {
            out.push_str(ansi::mouse_tracking(MouseMode::Off));
        }
        out.push_str(ansi::CURSOR_SHOW);
        if self.alternate_screen {
            out.push_str(ansi::ALT_SCREEN_LEAVE);
        }
        out
    }
}

/// RAII guard over raw mode and the terminal modes in [`SessionOptions`].
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    active: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode, then the requested modes.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        info!("terminal raw mode enabled");

        let session = Self {
            options,
            active: true,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();
        stdout.write_all(session.options.enter_sequence().as_bytes())?;
        stdout.flush()?;
        info!(
            alternate_screen = session.options.alternate_screen,
            mouse = ?session.options.mouse,
            bracketed_paste = session.options.bracketed_paste,
            focus_events = session.options.focus_events,
            "terminal modes enabled"
        );
        Ok(session)
    }

    /// Current terminal size in (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Switch the mouse tracking level while the session runs.
    pub fn set_mouse(&mut self, mouse: MouseMode) -> io::Result<()> {
        if mouse == self.options.mouse {
            return Ok(());
        }
        let mut stdout = io::stdout();
        stdout.write_all(ansi::mouse_tracking(MouseMode::Off).as_bytes())?;
        if mouse != MouseMode::Off {
            stdout.write_all(ansi::mouse_tracking(mouse).as_bytes())?;
        }
        stdout.flush()?;
        self.options.mouse = mouse;
        debug!(?mouse, "mouse tracking changed");
        Ok(())
    }

    fn cleanup(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();
        let _ = stdout.write_all(self.options.leave_sequence().as_bytes());
        let _ = stdout.flush();
        let _ = crossterm::terminal::disable_raw_mode();
        info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Undo every mode a session may have enabled, ignoring errors.
fn best_effort_cleanup() {
    let everything = SessionOptions {
        alternate_screen: true,
        mouse: MouseMode::Any,
        bracketed_paste: true,
        focus_events: true,
    };
    let mut stdout = io::stdout();
    let _ = stdout.write_all(everything.leave_sequence().as_bytes());
    let _ = stdout.flush();
    let _ = crossterm::terminal::disable_raw_mode();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                if matches!(signal, SIGINT | SIGTERM) {
                    tracing::warn!(signal, "termination signal, restoring terminal");
                    best_effort_cleanup();
                    std::process::exit(128 + signal);
                }
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Entering raw mode would disturb the test runner's terminal, so only
    // the byte sequences are checked here.

    #[test]
    fn default_options_only_hide_the_cursor() {
        let opts = SessionOptions::default();
        assert_eq!(opts.enter_sequence(), ansi::CURSOR_HIDE);
        assert_eq!(
            opts.leave_sequence(),
            format!("{}{}", ansi::SGR_RESET, ansi::CURSOR_SHOW)
        );
    }

    #[test]
    fn leave_reverses_enter() {
        let opts = SessionOptions {
            alternate_screen: true,
            mouse: MouseMode::Drag,
            bracketed_paste: true,
            focus_events: true,
        };
        let enter = opts.enter_sequence();
        assert!(enter.starts_with(ansi::ALT_SCREEN_ENTER));
        assert!(enter.contains("\x1b[?1002h"));
        let leave = opts.leave_sequence();
        assert!(leave.ends_with(ansi::ALT_SCREEN_LEAVE));
        let focus = leave.find(ansi::FOCUS_DISABLE).unwrap();
        let paste = leave.find(ansi::BRACKETED_PASTE_DISABLE).unwrap();
        assert!(focus < paste);
    }

    #[test]
    fn inline_config_keeps_the_main_screen() {
        let opts = SessionOptions::from_config(&AppConfig::inline(5).with_mouse(MouseMode::Off));
        assert!(!opts.alternate_screen);
        assert!(!opts.enter_sequence().contains("1000h"));
    }
}
