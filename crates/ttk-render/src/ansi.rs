#![forbid(unsafe_code)]

//! ANSI escape sequence helpers.
//!
//! Pure string builders, no state tracking. The canvas serializer uses the
//! cursor helpers; the runtime writes the mode toggles when it enters and
//! leaves a session.
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n m` | SGR |
//! | CSI | `ESC [ row ; col H` | CUP (1-indexed) |
//! | CSI | `ESC [ n J` | ED |
//! | CSI | `ESC [ ? 2026 h/l` | Synchronized output |
//! | OSC | `ESC ] 0 ; title BEL` | Window title |
//! | OSC | `ESC ] 8 ; ; url ST` | Hyperlink |

use std::fmt::Write as _;

/// SGR reset: `CSI 0 m`.
pub const SGR_RESET: &str = "\x1b[0m";

pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";

pub const ALT_SCREEN_ENTER: &str = "\x1b[?1049h";
pub const ALT_SCREEN_LEAVE: &str = "\x1b[?1049l";

pub const BRACKETED_PASTE_ENABLE: &str = "\x1b[?2004h";
pub const BRACKETED_PASTE_DISABLE: &str = "\x1b[?2004l";

pub const FOCUS_ENABLE: &str = "\x1b[?1004h";
pub const FOCUS_DISABLE: &str = "\x1b[?1004l";

pub const SYNC_BEGIN: &str = "\x1b[?2026h";
pub const SYNC_END: &str = "\x1b[?2026l";

/// Erase the whole display: `CSI 2 J`.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Mouse tracking levels, from `1000` (press/release) to `1003` (any motion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseTracking {
    #[default]
    Off,
    Click,
    Drag,
    Any,
}

/// Mode string that switches to `tracking` with SGR (1006) coordinates.
pub fn mouse_tracking(tracking: MouseTracking) -> &'static str {
    match tracking {
        MouseTracking::Off => "\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1006l",
        MouseTracking::Click => "\x1b[?1000h\x1b[?1006h",
        MouseTracking::Drag => "\x1b[?1000h\x1b[?1002h\x1b[?1006h",
        MouseTracking::Any => "\x1b[?1000h\x1b[?1003h\x1b[?1006h",
    }
}

/// CUP to the 0-indexed `(x, y)`.
#[inline]
pub fn cup(out: &mut String, x: usize, y: usize) {
    let _ = write!(out, "\x1b[{};{}H", y + 1, x + 1);
}

/// OSC 0: set the window and icon title. Control characters are dropped.
pub fn set_title(out: &mut String, title: &str) {
    out.push_str("\x1b]0;");
    out.extend(title.chars().filter(|c| !c.is_control()));
    out.push('\x07');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cup_is_one_based() {
        let mut s = String::new();
        cup(&mut s, 0, 0);
        cup(&mut s, 4, 2);
        assert_eq!(s, "\x1b[1;1H\x1b[3;5H");
    }

    #[test]
    fn title_strips_controls() {
        let mut s = String::new();
        set_title(&mut s, "a\x1bb\x07c");
        assert_eq!(s, "\x1b]0;abc\x07");
    }

    #[test]
    fn mouse_modes() {
        assert!(mouse_tracking(MouseTracking::Drag).contains("1002h"));
        assert!(mouse_tracking(MouseTracking::Off).ends_with("1006l"));
    }
}
