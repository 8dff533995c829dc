//! Byte streams through the full terminal.

use proptest::prelude::*;
use ttk_style::{Color, Rgb};
use ttk_vt::{MAX_STRING_LEN, Parser, Selection, Terminal};

#[test]
fn scenario_csi_colors() {
    let mut term = Terminal::new(80, 24);
    term.feed(b"Hello\r\n\x1b[31mWorld\x1b[0m").unwrap();
    let screen = term.screen();

    let row0 = screen.row_text(0).unwrap();
    assert_eq!(&row0[..5], "Hello");
    assert!(row0[5..].chars().all(|c| c == ' '));
    assert_eq!(row0.chars().count(), 80);

    assert_eq!(&screen.row_text(1).unwrap()[..5], "World");
    for x in 0..5 {
        let cell = screen.cell(x, 1).unwrap();
        assert_eq!(cell.color.foreground(), Some(Rgb::new(0xAA, 0, 0)), "column {x}");
    }
    assert_eq!(screen.pen(), &Color::RESET);
    assert_eq!(screen.cursor(), (5, 1));
}

#[test]
fn wrapped_output_selects_as_one_line() {
    let mut term = Terminal::new(10, 4);
    term.feed(b"0123456789abcdef\r\nnext").unwrap();
    let text = Selection::new((0, 0), (9, 2)).extract(term.screen());
    assert_eq!(text.as_str(), "0123456789abcdef\nnext");
}

#[test]
fn long_output_scrolls_into_scrollback() {
    let mut term = Terminal::with_scrollback(5, 3, 2);
    for i in 0..6 {
        term.feed(format!("l{i}\r\n").as_bytes()).unwrap();
    }
    let screen = term.screen();
    assert_eq!(screen.row_text(0).unwrap().trim_end(), "l4");
    assert_eq!(screen.row_text(1).unwrap().trim_end(), "l5");
    let kept: Vec<_> = screen.scrollback().iter().map(|r| r.text()).collect();
    assert_eq!(kept, ["l2   ", "l3   "]);
}

#[test]
fn sequences_split_across_feeds() {
    let mut term = Terminal::new(20, 2);
    for chunk in [&b"\x1b"[..], b"[3", b"1m", b"\xe4\xb8", b"\x96", b"x"] {
        term.feed(chunk).unwrap();
    }
    let cell = term.screen().cell(0, 0).unwrap();
    assert_eq!(cell.glyph.to_string(), "世");
    assert_eq!(cell.color.foreground(), Some(Rgb::new(0xAA, 0, 0)));
    assert_eq!(term.screen().cell(2, 0).unwrap().glyph.to_string(), "x");
}

#[test]
fn malformed_input_is_dropped() {
    let mut term = Terminal::new(20, 2);
    let mut bytes = b"\x1b[".to_vec();
    bytes.extend(std::iter::repeat_n(b'1', 300));
    bytes.extend_from_slice(b"ok");
    term.feed(&bytes).unwrap();
    assert!(term.parser().errors() >= 1);
    assert!(term.parser().is_ground());
}

proptest! {
    #[test]
    fn parser_returns_to_ground(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut parser = Parser::new();
        let _ = parser.feed(&bytes);
        let tail = vec![b'x'; MAX_STRING_LEN + 8];
        let _ = parser.feed(&tail);
        prop_assert!(parser.is_ground(), "stuck in {:?}", parser.state());
    }

    #[test]
    fn screen_invariants_hold_for_any_stream(
        bytes in prop::collection::vec(
            prop_oneof![
                any::<u8>(),
                Just(0x1b),
                Just(b'['),
                Just(b';'),
                Just(b'?'),
                (b'0'..=b'9'),
                (b'@'..=b'~'),
            ],
            0..400,
        ),
        width in 1u16..30,
        height in 1u16..12,
    ) {
        let mut term = Terminal::new(width, height);
        term.feed(&bytes).unwrap();
        let screen = term.screen();
        let (x, y) = screen.cursor();
        prop_assert!(x < screen.width() && y < screen.height());
        let (top, bottom) = screen.region();
        prop_assert!(top < bottom && bottom <= screen.height());
        prop_assert_eq!(screen.rows().len(), usize::from(screen.height()));
        for row in screen.rows() {
            prop_assert_eq!(row.cells.len(), usize::from(screen.width()));
            for (i, cell) in row.cells.iter().enumerate() {
                if cell.glyph.is_continuation() {
                    prop_assert!(i > 0 && row.cells[i - 1].glyph.is_wide());
                }
            }
        }
    }
}
