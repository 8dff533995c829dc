//! SGR (Select Graphic Rendition) decoding.
//!
//! [`apply_sgr`] folds one parameter list onto a current color; both the
//! string parser ([`Color::from_ansi`]) and the VT screen use it.

use ttk_core::{Error, ParseError, Result};

use crate::color::{Color, Mods, Rgb};
use crate::palette::Palette;

/// Apply the parameters of one `CSI … m` sequence to `base`.
///
/// An empty list, or a `0`, resets to [`Color::RESET`] (the hyperlink is
/// not an SGR attribute and survives). Recognized forms:
///
/// - `1 2 3 4 5 7 8 9` set modifiers; `22 23 24 25 27 28 29` clear them,
/// - `30–37`, `90–97`, `40–47`, `100–107` pick from the 16-color palette,
/// - `38;5;n` / `48;5;n` pick from the 256-color table,
/// - `38;2;r;g;b` / `48;2;r;g;b` set truecolor,
/// - `39` / `49` restore the default foreground / background.
///
/// Anything else is logged at debug level and skipped.
pub fn apply_sgr(base: &Color, params: &[u16], palette: &Palette) -> Color {
    fold_sgr(base, params, palette).0
}

/// The folded color, and whether every `38`/`48` form in `params` was
/// complete and in range.
fn fold_sgr(base: &Color, params: &[u16], palette: &Palette) -> (Color, bool) {
    let link = base.hyperlink().map(str::to_owned);
    if params.is_empty() {
        return (Color::RESET.with_link(link.as_deref()), true);
    }
    let mut extended_ok = true;
    let mut fg = base.foreground();
    let mut bg = base.background();
    let mut mods = base.modifiers();
    let mut clean = base.is_clean();

    let mut i = 0;
    while i < params.len() {
        let p = params[i];
        match p {
            0 => {
                fg = None;
                bg = None;
                mods = Mods::empty();
                clean = true;
            }
            1 => mods |= Mods::BOLD,
            2 => mods |= Mods::FAINT,
            3 => mods |= Mods::ITALIC,
            4 | 21 => mods |= Mods::UNDERLINE,
            5 | 6 => mods |= Mods::BLINKING,
            7 => mods |= Mods::REVERSED,
            8 => mods |= Mods::HIDDEN,
            9 => mods |= Mods::STRIKETHROUGH,
            22 => mods -= Mods::BOLD | Mods::FAINT,
            23 => mods -= Mods::ITALIC,
            24 => mods -= Mods::UNDERLINE,
            25 => mods -= Mods::BLINKING,
            27 => mods -= Mods::REVERSED,
            28 => mods -= Mods::HIDDEN,
            29 => mods -= Mods::STRIKETHROUGH,
            30..=37 => fg = Some(palette.ansi16((p - 30) as u8)),
            39 => fg = None,
            40..=47 => bg = Some(palette.ansi16((p - 40) as u8)),
            49 => bg = None,
            90..=97 => fg = Some(palette.ansi16((p - 90 + 8) as u8)),
            100..=107 => bg = Some(palette.ansi16((p - 100 + 8) as u8)),
            38 | 48 => {
                let (color, used) = extended_color(&params[i + 1..], palette);
                match color {
                    Some(c) if p == 38 => fg = Some(c),
                    Some(c) => bg = Some(c),
                    None => extended_ok = false,
                }
                i += used;
            }
            other => {
                tracing::debug!(param = other, "ignoring unsupported SGR parameter");
            }
        }
        i += 1;
    }

    let color = Color::RESET
        .with_clean(clean)
        .with_fg(fg)
        .with_bg(bg)
        .with_mods(mods)
        .with_link(link.as_deref());
    (color, extended_ok)
}

/// Decode the tail of a `38`/`48` parameter. Returns the color (if valid)
/// and how many parameters were consumed after the `38`/`48` itself.
fn extended_color(rest: &[u16], palette: &Palette) -> (Option<Rgb>, usize) {
    match rest {
        [5, n, ..] => {
            if *n <= 255 {
                (Some(palette.ansi256(*n as u8)), 2)
            } else {
                tracing::debug!(index = n, "256-color index out of range");
                (None, 2)
            }
        }
        [2, r, g, b, ..] => {
            if *r <= 255 && *g <= 255 && *b <= 255 {
                (Some(Rgb::new(*r as u8, *g as u8, *b as u8)), 4)
            } else {
                tracing::debug!(r, g, b, "truecolor channel out of range");
                (None, 4)
            }
        }
        _ => {
            tracing::debug!(?rest, "truncated extended color");
            (None, rest.len())
        }
    }
}

/// Parse a string made of `ESC [ … m` and OSC 8 hyperlink segments.
///
/// Unlike [`apply_sgr`], a `38`/`48` color with an index or channel above
/// 255, or with missing parameters, fails with [`Error::InvalidColor`].
pub(crate) fn parse_ansi(ansi: &str, palette: &Palette) -> Result<Color> {
    let bad = || Error::Parse(ParseError::new("SGR sequence", ansi));
    if ansi.is_empty() {
        return Err(bad());
    }
    let mut color = Color::mods(Mods::empty());
    let mut rest = ansi;
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix("\x1b[") {
            let end = body.find('m').ok_or_else(bad)?;
            let params = parse_params(&body[..end]).ok_or_else(bad)?;
            let (next, extended_ok) = fold_sgr(&color, &params, palette);
            if !extended_ok {
                return Err(Error::InvalidColor(ansi.to_owned()));
            }
            color = next;
            rest = &body[end + 1..];
        } else if let Some(body) = rest.strip_prefix("\x1b]8;") {
            let (payload, tail) = split_osc(body).ok_or_else(bad)?;
            // payload is `params;URI`
            let uri = payload.split_once(';').map(|(_, u)| u).ok_or_else(bad)?;
            color = color.with_link((!uri.is_empty()).then_some(uri));
            rest = tail;
        } else {
            return Err(bad());
        }
    }
    Ok(color)
}

/// Split an OSC body at its ST (`ESC \`) or BEL terminator.
fn split_osc(body: &str) -> Option<(&str, &str)> {
    let st = body.find("\x1b\\").map(|i| (i, 2));
    let bel = body.find('\x07').map(|i| (i, 1));
    let (idx, len) = match (st, bel) {
        (Some(a), Some(b)) => {
            if a.0 < b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&body[..idx], &body[idx + len..]))
}

/// `;` or `:` separated decimal parameters; empty fields are `0`.
fn parse_params(s: &str) -> Option<Vec<u16>> {
    if s.is_empty() {
        return Some(Vec::new());
    }
    s.split([';', ':'])
        .map(|field| {
            if field.is_empty() {
                Some(0)
            } else if field.bytes().all(|b| b.is_ascii_digit()) {
                Some(field.parse::<u32>().map_or(u16::MAX, |v| v.min(u32::from(u16::MAX)) as u16))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn pal() -> Palette {
        Palette::default()
    }

    #[test]
    fn sixteen_color_red_uses_palette() {
        let c = apply_sgr(&Color::RESET, &[31], &pal());
        assert_eq!(c.foreground(), Some(Rgb::new(0xAA, 0, 0)));
        let c = apply_sgr(&c, &[101], &pal());
        assert_eq!(c.background(), Some(Rgb::new(0xFF, 0x55, 0x55)));
    }

    #[test]
    fn extended_forms() {
        let c = apply_sgr(&Color::RESET, &[38, 5, 196, 48, 2, 1, 2, 3, 1], &pal());
        assert_eq!(c.foreground(), Some(Rgb::new(255, 0, 0)));
        assert_eq!(c.background(), Some(Rgb::new(1, 2, 3)));
        assert!(c.has_bold());
    }

    #[test]
    fn reset_clears_everything() {
        let busy = apply_sgr(&Color::RESET, &[1, 4, 31, 42], &pal());
        let reset = apply_sgr(&busy, &[0], &pal());
        assert!(reset.is_plain());
        assert!(reset.is_clean());
        assert!(apply_sgr(&busy, &[], &pal()).is_plain());
    }

    #[test]
    fn off_codes_clear_single_attributes() {
        let c = apply_sgr(&Color::RESET, &[1, 2, 3, 4, 9], &pal());
        let c = apply_sgr(&c, &[22, 29], &pal());
        assert_eq!(c.modifiers(), Mods::ITALIC | Mods::UNDERLINE);
        let c = apply_sgr(&c, &[39, 49, 23, 24], &pal());
        assert!(c.is_plain());
    }

    #[traced_test]
    #[test]
    fn unknown_parameter_is_logged_and_skipped() {
        let c = apply_sgr(&Color::RESET, &[73, 32], &pal());
        assert_eq!(c.foreground(), Some(Rgb::new(0, 0xAA, 0)));
        assert!(logs_contain("ignoring unsupported SGR parameter"));
    }

    #[test]
    fn out_of_range_truecolor_is_ignored() {
        let c = apply_sgr(&Color::RESET, &[38, 2, 300, 0, 0, 1], &pal());
        assert_eq!(c.foreground(), None);
        assert!(c.has_bold());
    }

    #[test]
    fn parse_string_forms() {
        let c = Color::from_ansi("\x1b[38;2;255;0;0;1m").expect("parse");
        assert_eq!(c, Color::fg("#FF0000").expect("hex") + Color::BOLD);
        let c = Color::from_ansi("\x1b[0;44m").expect("parse");
        assert!(c.is_clean());
        assert_eq!(c.background(), Some(Rgb::new(0, 0, 0xAA)));
        assert!(Color::from_ansi("\x1b[m").expect("parse").is_clean());
    }

    #[test]
    fn parse_hyperlink_segment() {
        let c = Color::from_ansi("\x1b[4m\x1b]8;;https://x.y\x1b\\").expect("parse");
        assert_eq!(c.hyperlink(), Some("https://x.y"));
        assert_eq!(c.modifiers(), Mods::UNDERLINE);
    }

    #[test]
    fn parse_rejects_out_of_range_extended_colors() {
        for bad in [
            "\x1b[38;2;300;0;0m",
            "\x1b[38;5;256m",
            "\x1b[38;5;999m",
            "\x1b[1;48;2;0;0;1000m",
            "\x1b[38;2;1m",
            "\x1b[48;5m",
            "\x1b[38m",
        ] {
            assert!(
                matches!(Color::from_ansi(bad), Err(Error::InvalidColor(_))),
                "{bad:?}"
            );
        }
        let edge = Color::from_ansi("\x1b[38;2;255;255;255;48;5;255m").expect("parse");
        assert_eq!(edge.foreground(), Some(Rgb::WHITE));
        assert!(edge.background().is_some());
    }

    #[test]
    fn parse_rejects_junk() {
        for junk in ["", "hello", "\x1b[31", "\x1b[3x1m", "\x1b]8;;no-terminator"] {
            assert!(Color::from_ansi(junk).is_err(), "{junk:?}");
        }
    }

    #[test]
    fn round_trip_through_serialization() {
        let c = Color::fg_bg("#102030", "#405060").expect("hex") + Color::ITALIC;
        assert_eq!(Color::from_ansi(&c.to_ansi()).expect("parse"), c);
    }
}
