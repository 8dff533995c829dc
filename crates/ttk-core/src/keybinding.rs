#![forbid(unsafe_code)]

//! Key combinations for global shortcuts.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::event::{KeyCode, KeyEvent, Modifiers};

/// A key plus modifiers, e.g. `ctrl+q` or `alt+shift+f5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a `+`-separated combo. Modifier names are case-insensitive;
    /// the final token names the key.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let err = || ParseError::new("key combo", text);
        let mut modifiers = Modifiers::NONE;
        let tokens: Vec<&str> = text.split('+').map(str::trim).collect();
        let (key, mods) = tokens.split_last().ok_or_else(err)?;
        for m in mods {
            modifiers |= match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "meta" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "super" | "cmd" => Modifiers::SUPER,
                _ => return Err(err()),
            };
        }
        let code = parse_key_name(key).ok_or_else(err)?;
        Ok(Self { code, modifiers })
    }

    /// Whether `event` triggers this combo. Shift is ignored for character
    /// keys because it is already reflected in the character itself.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                let mask = !Modifiers::SHIFT;
                a.eq_ignore_ascii_case(&b)
                    && (self.modifiers & mask) == (event.modifiers & mask)
                    && (!self.modifiers.contains(Modifiers::SHIFT) || event.shift() || b.is_uppercase())
            }
            (a, b) => a == b && self.modifiers == event.modifiers,
        }
    }
}

impl FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_key_name(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "esc" | "escape" => KeyCode::Escape,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        _ => {
            if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    return Some(KeyCode::F(n));
                }
                return None;
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "ctrl+"),
            (Modifiers::ALT, "alt+"),
            (Modifiers::SHIFT, "shift+"),
            (Modifiers::SUPER, "super+"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(name)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char('+') => f.write_str("plus"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "f{n}"),
            other => write!(f, "{}", format!("{other:?}").to_ascii_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifier_chain() {
        let combo = KeyCombo::parse("Ctrl+Alt+q").expect("combo");
        assert_eq!(combo.code, KeyCode::Char('q'));
        assert_eq!(combo.modifiers, Modifiers::CTRL | Modifiers::ALT);
    }

    #[test]
    fn parses_named_keys() {
        assert_eq!(KeyCombo::parse("f5").map(|c| c.code), Ok(KeyCode::F(5)));
        assert_eq!(KeyCombo::parse("esc").map(|c| c.code), Ok(KeyCode::Escape));
        assert_eq!(
            KeyCombo::parse("ctrl+space").map(|c| c.code),
            Ok(KeyCode::Char(' '))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(KeyCombo::parse("hyper+q").is_err());
        assert!(KeyCombo::parse("ctrl+").is_err());
        assert!(KeyCombo::parse("f99").is_err());
        assert!(KeyCombo::parse("ctrl+ab").is_err());
    }

    #[test]
    fn matches_ignores_case_for_ctrl_letters() {
        let combo = KeyCombo::parse("ctrl+q").expect("combo");
        assert!(combo.matches(&KeyEvent::char('q').with_modifiers(Modifiers::CTRL)));
        assert!(combo.matches(&KeyEvent::char('Q').with_modifiers(Modifiers::CTRL)));
        assert!(!combo.matches(&KeyEvent::char('q')));
        assert!(!combo.matches(&KeyEvent::char('q').with_modifiers(Modifiers::ALT)));
    }

    #[test]
    fn display_round_trips() {
        for text in ["ctrl+q", "alt+shift+f4", "ctrl+space", "tab"] {
            let combo = KeyCombo::parse(text).expect("combo");
            assert_eq!(combo.to_string(), text);
            assert_eq!(text.parse::<KeyCombo>().expect("reparse"), combo);
        }
    }
}
