#![forbid(unsafe_code)]

//! Terminal modes toggled by `SM`/`RM` and `DECSET`/`DECRST`.

use bitflags::bitflags;

bitflags! {
    /// Boolean modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modes: u16 {
        /// DECCKM (`?1`): cursor keys send `ESC O x` instead of `ESC [ x`.
        const CURSOR_KEYS     = 1 << 0;
        /// DECOM (`?6`): cursor addressing relative to the scrolling region.
        const ORIGIN          = 1 << 1;
        /// DECAWM (`?7`).
        const AUTOWRAP        = 1 << 2;
        /// DECTCEM (`?25`).
        const CURSOR_VISIBLE  = 1 << 3;
        /// `?1006`: SGR mouse encoding.
        const SGR_MOUSE       = 1 << 4;
        /// `?1004`.
        const FOCUS_EVENTS    = 1 << 5;
        /// `?2004`.
        const BRACKETED_PASTE = 1 << 6;
        /// IRM (`4`).
        const INSERT          = 1 << 7;
        /// LNM (`20`): LF also returns the carriage.
        const NEWLINE         = 1 << 8;
        /// DECKPAM (`ESC =`).
        const APP_KEYPAD      = 1 << 9;
    }
}

impl Default for Modes {
    fn default() -> Self {
        Modes::AUTOWRAP | Modes::CURSOR_VISIBLE
    }
}

impl Modes {
    /// Flag for a DEC private mode number, if it is a plain flag.
    pub fn from_dec(mode: u16) -> Option<Modes> {
        Some(match mode {
            1 => Modes::CURSOR_KEYS,
            6 => Modes::ORIGIN,
            7 => Modes::AUTOWRAP,
            25 => Modes::CURSOR_VISIBLE,
            1004 => Modes::FOCUS_EVENTS,
            1006 => Modes::SGR_MOUSE,
            2004 => Modes::BRACKETED_PASTE,
            _ => return None,
        })
    }

    /// Flag for an ANSI mode number.
    pub fn from_ansi(mode: u16) -> Option<Modes> {
        match mode {
            4 => Some(Modes::INSERT),
            20 => Some(Modes::NEWLINE),
            _ => None,
        }
    }
}

/// Which mouse events the application asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseTracking {
    #[default]
    Off,
    /// `?1000`: press and release.
    Click,
    /// `?1002`: plus motion while a button is held.
    Drag,
    /// `?1003`: all motion.
    Any,
}

impl MouseTracking {
    pub fn from_dec(mode: u16) -> Option<MouseTracking> {
        match mode {
            1000 => Some(MouseTracking::Click),
            1002 => Some(MouseTracking::Drag),
            1003 => Some(MouseTracking::Any),
            _ => None,
        }
    }
}
