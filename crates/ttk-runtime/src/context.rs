#![forbid(unsafe_code)]

//! Application-wide state owned by the compositor.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;
use ttk_core::signal::{Signal, SlotResult};
use ttk_style::Theme;

/// Cloneable request to stop the compositor loop.
///
/// Receivers capture a handle and call [`quit`](Self::quit); the loop checks
/// it after every event and timer.
#[derive(Debug, Clone, Default)]
pub struct QuitHandle(Rc<Cell<bool>>);

impl QuitHandle {
    pub fn quit(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }
}

/// The current theme and the quit flag.
#[derive(Debug)]
pub struct Context {
    theme: Theme,
    quit: QuitHandle,
    /// Fired after [`set_theme`](Self::set_theme) replaced the theme.
    pub theme_changed: Signal<()>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Context {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            quit: QuitHandle::default(),
            theme_changed: Signal::new("themeChanged"),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the theme and broadcast `themeChanged`. The caller repaints.
    pub fn set_theme(&mut self, theme: Theme) -> SlotResult {
        debug!(from = self.theme.name, to = theme.name, "theme changed");
        self.theme = theme;
        self.theme_changed.emit(&())
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    pub fn quit(&self) {
        self.quit.quit();
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.is_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_share_one_flag() {
        let cx = Context::default();
        let handle = cx.quit_handle();
        assert!(!cx.quit_requested());
        handle.clone().quit();
        assert!(cx.quit_requested());
    }

    #[test]
    fn set_theme_broadcasts() {
        let mut cx = Context::default();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        cx.theme_changed.connect_ok(move |_| s.set(s.get() + 1));
        cx.set_theme(Theme::ascii()).unwrap();
        assert_eq!(cx.theme().name, "ascii");
        assert_eq!(seen.get(), 1);
    }
}
