#![forbid(unsafe_code)]

//! Typed input events.
//!
//! Raw terminal bytes are decoded elsewhere (crossterm in the runtime); this
//! module only defines what the dispatcher consumes and how crossterm's
//! events map onto it.

use bitflags::bitflags;

#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

use crate::geometry::Point;

/// Input delivered to the event dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text pasted while bracketed paste is active.
    Paste(String),
    /// Host terminal changed size.
    Resize { width: u16, height: u16 },
    /// Host terminal window gained (`true`) or lost focus.
    Focus(bool),
    /// Synthetic wake-up with no input attached.
    Tick,
}

impl Event {
    /// Convert a crossterm event. Returns `None` for events the toolkit ignores
    /// (key releases, horizontal wheel).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(mouse) => map_mouse_event(mouse).map(Event::Mouse),
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::Paste(text) => Some(Event::Paste(text)),
            cte::Event::FocusGained => Some(Event::Focus(true)),
            cte::Event::FocusLost => Some(Event::Focus(false)),
        }
    }
}

/// Whether a key produces text or is a control/navigation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Character,
    SpecialKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    /// Keyboard modifiers held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Printable characters without Ctrl/Alt are `Character`; everything else
    /// is a `SpecialKey`.
    pub fn key_type(&self) -> KeyType {
        match self.code {
            KeyCode::Char(_)
                if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) =>
            {
                KeyType::Character
            }
            _ => KeyType::SpecialKey,
        }
    }

    /// Text produced by the key, if it is a `Character`.
    pub fn text(&self) -> Option<char> {
        match (self.key_type(), self.code) {
            (KeyType::Character, KeyCode::Char(c)) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Press,
    Release,
    Move,
    Drag,
    DoubleClick,
    Tap,
    WheelUp,
    WheelDown,
}

/// A mouse event in root (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub kind: MouseEventKind,
    /// Consecutive click count for `Tap`/`DoubleClick`, otherwise 0.
    pub taps: u8,
}

impl MouseEvent {
    pub const fn new(kind: MouseEventKind, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            button: MouseButton::None,
            modifiers: Modifiers::NONE,
            kind,
            taps: 0,
        }
    }

    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_taps(mut self, taps: u8) -> Self {
        self.taps = taps;
        self
    }

    #[inline]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same event moved to another coordinate space.
    #[must_use]
    pub const fn at(mut self, p: Point) -> Self {
        self.x = p.x;
        self.y = p.y;
        self
    }
}

// ── crossterm mapping ──

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    if event.kind == cte::KeyEventKind::Release {
        return None;
    }
    let code = map_key_code(event.code)?;
    Some(KeyEvent::new(code).with_modifiers(map_modifiers(event.modifiers)))
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    Some(match code {
        cte::KeyCode::Char(c) => KeyCode::Char(c),
        cte::KeyCode::Enter => KeyCode::Enter,
        cte::KeyCode::Tab => KeyCode::Tab,
        cte::KeyCode::BackTab => KeyCode::BackTab,
        cte::KeyCode::Backspace => KeyCode::Backspace,
        cte::KeyCode::Delete => KeyCode::Delete,
        cte::KeyCode::Insert => KeyCode::Insert,
        cte::KeyCode::Esc => KeyCode::Escape,
        cte::KeyCode::Up => KeyCode::Up,
        cte::KeyCode::Down => KeyCode::Down,
        cte::KeyCode::Left => KeyCode::Left,
        cte::KeyCode::Right => KeyCode::Right,
        cte::KeyCode::Home => KeyCode::Home,
        cte::KeyCode::End => KeyCode::End,
        cte::KeyCode::PageUp => KeyCode::PageUp,
        cte::KeyCode::PageDown => KeyCode::PageDown,
        cte::KeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.intersects(
        cte::KeyModifiers::SUPER | cte::KeyModifiers::HYPER | cte::KeyModifiers::META,
    ) {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_event(event: cte::MouseEvent) -> Option<MouseEvent> {
    let (kind, button) = match event.kind {
        cte::MouseEventKind::Down(b) => (MouseEventKind::Press, map_mouse_button(b)),
        cte::MouseEventKind::Up(b) => (MouseEventKind::Release, map_mouse_button(b)),
        cte::MouseEventKind::Drag(b) => (MouseEventKind::Drag, map_mouse_button(b)),
        cte::MouseEventKind::Moved => (MouseEventKind::Move, MouseButton::None),
        cte::MouseEventKind::ScrollUp => (MouseEventKind::WheelUp, MouseButton::None),
        cte::MouseEventKind::ScrollDown => (MouseEventKind::WheelDown, MouseButton::None),
        cte::MouseEventKind::ScrollLeft | cte::MouseEventKind::ScrollRight => return None,
    };
    Some(
        MouseEvent::new(kind, i32::from(event.column), i32::from(event.row))
            .with_button(button)
            .with_modifiers(map_modifiers(event.modifiers)),
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    fn ct_key(code: ct_event::KeyCode, modifiers: ct_event::KeyModifiers) -> ct_event::KeyEvent {
        ct_event::KeyEvent {
            code,
            modifiers,
            kind: ct_event::KeyEventKind::Press,
            state: ct_event::KeyEventState::NONE,
        }
    }

    fn ct_mouse(kind: ct_event::MouseEventKind) -> ct_event::MouseEvent {
        ct_event::MouseEvent {
            kind,
            column: 10,
            row: 5,
            modifiers: ct_event::KeyModifiers::NONE,
        }
    }

    // ── Key classification ──

    #[test]
    fn plain_char_is_character() {
        let key = KeyEvent::char('a');
        assert_eq!(key.key_type(), KeyType::Character);
        assert_eq!(key.text(), Some('a'));
    }

    #[test]
    fn shifted_char_is_still_character() {
        let key = KeyEvent::char('A').with_modifiers(Modifiers::SHIFT);
        assert_eq!(key.key_type(), KeyType::Character);
    }

    #[test]
    fn ctrl_char_is_special() {
        let key = KeyEvent::char('q').with_modifiers(Modifiers::CTRL);
        assert_eq!(key.key_type(), KeyType::SpecialKey);
        assert_eq!(key.text(), None);
        assert!(key.ctrl());
    }

    #[test]
    fn navigation_is_special() {
        assert_eq!(KeyEvent::new(KeyCode::Up).key_type(), KeyType::SpecialKey);
        assert_eq!(KeyEvent::new(KeyCode::F(3)).key_type(), KeyType::SpecialKey);
    }

    // ── crossterm mapping ──

    #[test]
    fn maps_key_with_modifiers() {
        let combined = ct_event::KeyModifiers::SHIFT | ct_event::KeyModifiers::CONTROL;
        let mapped = map_key_event(ct_key(ct_event::KeyCode::Char('x'), combined))
            .expect("should map");
        assert_eq!(mapped.code, KeyCode::Char('x'));
        assert!(mapped.ctrl());
        assert!(mapped.shift());
        assert!(!mapped.alt());
    }

    #[test]
    fn key_release_is_dropped() {
        let mut ev = ct_key(ct_event::KeyCode::Enter, ct_event::KeyModifiers::NONE);
        ev.kind = ct_event::KeyEventKind::Release;
        assert!(map_key_event(ev).is_none());
    }

    #[test]
    fn super_variants_collapse() {
        for m in [
            ct_event::KeyModifiers::SUPER,
            ct_event::KeyModifiers::HYPER,
            ct_event::KeyModifiers::META,
        ] {
            assert!(map_modifiers(m).contains(Modifiers::SUPER));
        }
    }

    #[test]
    fn maps_mouse_kinds() {
        let press = map_mouse_event(ct_mouse(ct_event::MouseEventKind::Down(
            ct_event::MouseButton::Left,
        )))
        .expect("press");
        assert_eq!(press.kind, MouseEventKind::Press);
        assert_eq!(press.button, MouseButton::Left);
        assert_eq!(press.position(), Point::new(10, 5));

        let release = map_mouse_event(ct_mouse(ct_event::MouseEventKind::Up(
            ct_event::MouseButton::Right,
        )))
        .expect("release");
        assert_eq!(release.kind, MouseEventKind::Release);
        assert_eq!(release.button, MouseButton::Right);

        let wheel = map_mouse_event(ct_mouse(ct_event::MouseEventKind::ScrollDown)).expect("wheel");
        assert_eq!(wheel.kind, MouseEventKind::WheelDown);

        assert!(map_mouse_event(ct_mouse(ct_event::MouseEventKind::ScrollLeft)).is_none());
    }

    #[test]
    fn maps_top_level_events() {
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Paste("hi".into())),
            Some(Event::Paste("hi".into()))
        );
        assert_eq!(
            Event::from_crossterm(ct_event::Event::FocusLost),
            Some(Event::Focus(false))
        );
    }
}
