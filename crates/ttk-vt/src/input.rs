#![forbid(unsafe_code)]

//! Encoding of keys, pastes and mouse events into the bytes an application
//! running inside the terminal expects.

use ttk_core::event::{KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::modes::{Modes, MouseTracking};

/// xterm modifier parameter: 1 plus shift 1, alt 2, ctrl 4.
fn modifier_param(mods: Modifiers) -> u8 {
    1 + u8::from(mods.contains(Modifiers::SHIFT))
        + 2 * u8::from(mods.contains(Modifiers::ALT))
        + 4 * u8::from(mods.contains(Modifiers::CTRL))
}

/// `CSI 1 ; m final` with modifiers, otherwise `SS3 final` in application
/// cursor mode or `CSI final`.
fn cursor_key(out: &mut Vec<u8>, final_byte: u8, mods: Modifiers, application: bool) {
    let m = modifier_param(mods);
    if m > 1 {
        out.extend_from_slice(format!("\x1b[1;{m}").as_bytes());
    } else if application {
        out.extend_from_slice(b"\x1bO");
    } else {
        out.extend_from_slice(b"\x1b[");
    }
    out.push(final_byte);
}

/// `CSI n ~` or `CSI n ; m ~`.
fn tilde_key(out: &mut Vec<u8>, n: u8, mods: Modifiers) {
    let m = modifier_param(mods);
    let seq = if m > 1 {
        format!("\x1b[{n};{m}~")
    } else {
        format!("\x1b[{n}~")
    };
    out.extend_from_slice(seq.as_bytes());
}

fn control_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' | 'A'..='Z' => Some(c.to_ascii_lowercase() as u8 & 0x1f),
        '@' | ' ' | '2' => Some(0),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

/// Bytes for a key press. Keys without an encoding yield an empty vector.
pub fn encode_key(key: &KeyEvent, modes: Modes) -> Vec<u8> {
    let mut out = Vec::new();
    let mods = key.modifiers;
    let app_cursor = modes.contains(Modes::CURSOR_KEYS);
    match key.code {
        KeyCode::Char(c) => {
            if mods.contains(Modifiers::ALT) {
                out.push(0x1b);
            }
            match control_byte(c).filter(|_| mods.contains(Modifiers::CTRL)) {
                Some(b) => out.push(b),
                None => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        KeyCode::Enter => {
            if mods.contains(Modifiers::ALT) {
                out.push(0x1b);
            }
            out.extend_from_slice(if modes.contains(Modes::NEWLINE) {
                b"\r\n"
            } else {
                b"\r"
            });
        }
        KeyCode::Tab if mods.contains(Modifiers::SHIFT) => out.extend_from_slice(b"\x1b[Z"),
        KeyCode::Tab => out.push(b'\t'),
        KeyCode::BackTab => out.extend_from_slice(b"\x1b[Z"),
        KeyCode::Backspace => {
            if mods.contains(Modifiers::ALT) {
                out.push(0x1b);
            }
            out.push(if mods.contains(Modifiers::CTRL) { 0x08 } else { 0x7f });
        }
        KeyCode::Escape => out.push(0x1b),
        KeyCode::Up => cursor_key(&mut out, b'A', mods, app_cursor),
        KeyCode::Down => cursor_key(&mut out, b'B', mods, app_cursor),
        KeyCode::Right => cursor_key(&mut out, b'C', mods, app_cursor),
        KeyCode::Left => cursor_key(&mut out, b'D', mods, app_cursor),
        KeyCode::Home => cursor_key(&mut out, b'H', mods, app_cursor),
        KeyCode::End => cursor_key(&mut out, b'F', mods, app_cursor),
        KeyCode::Insert => tilde_key(&mut out, 2, mods),
        KeyCode::Delete => tilde_key(&mut out, 3, mods),
        KeyCode::PageUp => tilde_key(&mut out, 5, mods),
        KeyCode::PageDown => tilde_key(&mut out, 6, mods),
        KeyCode::F(n @ 1..=4) => {
            let final_byte = b'P' + (n - 1);
            if modifier_param(mods) > 1 {
                cursor_key(&mut out, final_byte, mods, false);
            } else {
                out.extend_from_slice(&[0x1b, b'O', final_byte]);
            }
        }
        KeyCode::F(n @ 5..=12) => {
            const CODES: [u8; 8] = [15, 17, 18, 19, 20, 21, 23, 24];
            tilde_key(&mut out, CODES[usize::from(n - 5)], mods);
        }
        KeyCode::F(_) => {}
    }
    out
}

/// Bytes for pasted text, bracketed when the application asked for it.
pub fn encode_paste(text: &str, modes: Modes) -> Vec<u8> {
    if !modes.contains(Modes::BRACKETED_PASTE) {
        return text.as_bytes().to_vec();
    }
    let mut out = Vec::with_capacity(text.len() + 12);
    out.extend_from_slice(b"\x1b[200~");
    // A paste must not be able to close the bracket early.
    out.extend_from_slice(text.replace("\x1b[201~", "").as_bytes());
    out.extend_from_slice(b"\x1b[201~");
    out
}

/// Focus report for `?1004`.
pub fn encode_focus(focused: bool, modes: Modes) -> Vec<u8> {
    if !modes.contains(Modes::FOCUS_EVENTS) {
        return Vec::new();
    }
    if focused {
        b"\x1b[I".to_vec()
    } else {
        b"\x1b[O".to_vec()
    }
}

/// Bytes for a mouse event at terminal-local cell `(x, y)`, or `None` when
/// the tracking mode does not report it.
///
/// Uses SGR encoding under `?1006`, otherwise the X10 byte form with
/// coordinates capped at 223.
pub fn encode_mouse(
    event: &MouseEvent,
    x: u16,
    y: u16,
    tracking: MouseTracking,
    modes: Modes,
) -> Option<Vec<u8>> {
    let button = match event.button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::None => 3,
    };
    let (code, release) = match (event.kind, tracking) {
        (_, MouseTracking::Off) => return None,
        (MouseEventKind::Press, _) => (button, false),
        (MouseEventKind::Release, _) => (button, true),
        (MouseEventKind::WheelUp, _) => (64, false),
        (MouseEventKind::WheelDown, _) => (65, false),
        (MouseEventKind::Drag, MouseTracking::Drag | MouseTracking::Any) => (32 + button, false),
        (MouseEventKind::Move, MouseTracking::Any) => (32 + 3, false),
        _ => return None,
    };
    let mods = event.modifiers;
    let code = code
        + 4 * u16::from(mods.contains(Modifiers::SHIFT))
        + 8 * u16::from(mods.contains(Modifiers::ALT))
        + 16 * u16::from(mods.contains(Modifiers::CTRL));

    if modes.contains(Modes::SGR_MOUSE) {
        let tail = if release { 'm' } else { 'M' };
        let seq = format!("\x1b[<{code};{};{}{tail}", u32::from(x) + 1, u32::from(y) + 1);
        return Some(seq.into_bytes());
    }
    // X10 cannot say which button was released.
    let code = if release { 3 | (code & !3) } else { code };
    let coord = |v: u16| (v.min(222) + 33) as u8;
    Some(vec![0x1b, b'[', b'M', (code + 32) as u8, coord(x), coord(y)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    // ── keys ──

    #[test]
    fn cursor_keys_follow_decckm() {
        assert_eq!(encode_key(&key(KeyCode::Up), Modes::default()), b"\x1b[A");
        assert_eq!(
            encode_key(&key(KeyCode::Up), Modes::default() | Modes::CURSOR_KEYS),
            b"\x1bOA"
        );
        let ctrl_left = key(KeyCode::Left).with_modifiers(Modifiers::CTRL);
        assert_eq!(encode_key(&ctrl_left, Modes::CURSOR_KEYS), b"\x1b[1;5D");
    }

    #[test]
    fn control_and_alt_characters() {
        let ctrl_c = KeyEvent::char('c').with_modifiers(Modifiers::CTRL);
        assert_eq!(encode_key(&ctrl_c, Modes::default()), [0x03]);
        let alt_x = KeyEvent::char('x').with_modifiers(Modifiers::ALT);
        assert_eq!(encode_key(&alt_x, Modes::default()), b"\x1bx");
        assert_eq!(encode_key(&KeyEvent::char('é'), Modes::default()), "é".as_bytes());
    }

    #[test]
    fn editing_and_function_keys() {
        let m = Modes::default();
        assert_eq!(encode_key(&key(KeyCode::Enter), m), b"\r");
        assert_eq!(encode_key(&key(KeyCode::Enter), m | Modes::NEWLINE), b"\r\n");
        assert_eq!(encode_key(&key(KeyCode::Backspace), m), [0x7f]);
        assert_eq!(encode_key(&key(KeyCode::Delete), m), b"\x1b[3~");
        assert_eq!(encode_key(&key(KeyCode::F(1)), m), b"\x1bOP");
        assert_eq!(encode_key(&key(KeyCode::F(5)), m), b"\x1b[15~");
        let shift_f12 = key(KeyCode::F(12)).with_modifiers(Modifiers::SHIFT);
        assert_eq!(encode_key(&shift_f12, m), b"\x1b[24;2~");
        assert!(encode_key(&key(KeyCode::F(20)), m).is_empty());
    }

    // ── paste and focus ──

    #[test]
    fn bracketed_paste() {
        assert_eq!(encode_paste("hi", Modes::default()), b"hi");
        assert_eq!(
            encode_paste("hi\x1b[201~", Modes::BRACKETED_PASTE),
            b"\x1b[200~hi\x1b[201~"
        );
        assert!(encode_focus(true, Modes::default()).is_empty());
        assert_eq!(encode_focus(false, Modes::FOCUS_EVENTS), b"\x1b[O");
    }

    // ── mouse ──

    #[test]
    fn mouse_reports() {
        let press = MouseEvent::new(MouseEventKind::Press, 0, 0).with_button(MouseButton::Left);
        assert_eq!(encode_mouse(&press, 4, 2, MouseTracking::Off, Modes::SGR_MOUSE), None);
        assert_eq!(
            encode_mouse(&press, 4, 2, MouseTracking::Click, Modes::SGR_MOUSE).unwrap(),
            b"\x1b[<0;5;3M"
        );
        let release = MouseEvent::new(MouseEventKind::Release, 0, 0).with_button(MouseButton::Left);
        assert_eq!(
            encode_mouse(&release, 4, 2, MouseTracking::Click, Modes::empty()).unwrap(),
            [0x1b, b'[', b'M', 35, 37, 35]
        );
        let drag = MouseEvent::new(MouseEventKind::Drag, 0, 0).with_button(MouseButton::Left);
        assert_eq!(encode_mouse(&drag, 0, 0, MouseTracking::Click, Modes::SGR_MOUSE), None);
        assert_eq!(
            encode_mouse(&drag, 0, 0, MouseTracking::Drag, Modes::SGR_MOUSE).unwrap(),
            b"\x1b[<32;1;1M"
        );
    }
}
