//! Canvas output checked against the terminal model.

use proptest::prelude::*;
use ttk_core::Rect;
use ttk_render::terminal_model::same_attrs;
use ttk_render::{Canvas, Cell, Draw, TerminalModel};
use ttk_style::{Color, Mods, Rgb, Theme};
use ttk_style::theme::GridStyle;

#[test]
fn scenario_box_reads_back() {
    let theme = Theme::utf8();
    let white = Color::fg("#ffffff").unwrap();
    let mut canvas = Canvas::new(10, 5);
    canvas.draw_box((1, 1), (8, 3), &white, theme.grid(GridStyle::Single));

    assert_eq!(canvas.row_text(0).as_deref(), Some("          "));
    assert_eq!(canvas.row_text(1).as_deref(), Some(" ┌──────┐ "));
    assert_eq!(canvas.row_text(2).as_deref(), Some(" │      │ "));
    assert_eq!(canvas.row_text(3).as_deref(), Some(" └──────┘ "));
    assert_eq!(canvas.row_text(4).as_deref(), Some("          "));

    let border = Rect::new(1, 1, 8, 3);
    let inner = Rect::new(2, 2, 6, 1);
    for y in 0..5u16 {
        for x in 0..10u16 {
            let cell = canvas.get(i32::from(x), i32::from(y)).unwrap();
            let on_border = border.contains(x, y) && !inner.contains(x, y);
            if on_border {
                assert_eq!(cell.color, white, "({x}, {y})");
            } else {
                assert_eq!(cell, &Cell::EMPTY, "({x}, {y})");
            }
        }
    }
}

#[test]
fn full_frame_replays_onto_blank_terminal() {
    let theme = Theme::utf8();
    let mut canvas = Canvas::new(12, 4);
    canvas.draw_box((0, 0), (12, 4), &Color::fg("#00ff00").unwrap(), theme.grid(GridStyle::Rounded));
    canvas.draw_str((1, 1), "hi 界", &Color::BOLD.with_link(Some("https://e.org")));
    let mut model = TerminalModel::new(12, 4);
    model.process(&canvas.to_ansi());
    assert_eq!(model.diff_canvas(&canvas), None);
    assert!(same_attrs(&model.pen(), &Color::RESET));
}

#[test]
fn buffered_frames_track_the_terminal() {
    let mut canvas = Canvas::new(6, 2);
    let mut model = TerminalModel::new(6, 2);
    canvas.draw_str((0, 0), "abc", &Color::fg("#ff0000").unwrap());
    model.process(&canvas.to_ansi_buffered());
    canvas.draw_str((1, 1), "界", &Color::RESET);
    canvas.draw_str((1, 0), "Z", &Color::RESET);
    let diff = canvas.to_ansi_buffered();
    assert!(!diff.contains('a'));
    model.process(&diff);
    assert_eq!(model.diff_canvas(&canvas), None);
    assert_eq!(canvas.to_ansi_buffered(), "");
}

// ── generators ──

fn rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn color() -> impl Strategy<Value = Color> {
    (
        prop::option::of(rgb()),
        prop::option::of(rgb()),
        any::<u8>(),
        prop::option::of(prop::sample::select(vec!["https://a.org", "https://b.org/x"])),
    )
        .prop_map(|(fg, bg, mods, link)| {
            Color::RESET
                .with_clean(false)
                .with_fg(fg)
                .with_bg(bg)
                .with_mods(Mods::from_bits_truncate(mods))
                .with_link(link)
        })
}

/// Few colors so runs repeat and diffs have unchanged cells.
fn small_color() -> impl Strategy<Value = Color> {
    prop::sample::select(vec![
        Color::RESET,
        Color::BOLD,
        Color::fg_rgb(Rgb::new(255, 0, 0)),
        Color::bg_rgb(Rgb::new(0, 0, 255)),
        Color::link("https://a.org"),
    ])
}

#[derive(Debug, Clone)]
struct Put {
    x: i32,
    y: i32,
    glyph: &'static str,
    color: Color,
}

fn writes(w: u16, h: u16) -> impl Strategy<Value = Vec<Put>> {
    prop::collection::vec(
        (
            -1..=i32::from(w),
            -1..=i32::from(h),
            prop::sample::select(vec!["a", "b", " ", "界", "e\u{301}", "─"]),
            small_color(),
        )
            .prop_map(|(x, y, glyph, color)| Put { x, y, glyph, color }),
        0..40,
    )
}

fn paint(w: u16, h: u16, ops: &[Put]) -> Canvas {
    let mut c = Canvas::new(w, h);
    for op in ops {
        c.set(op.x, op.y, op.glyph, &op.color);
    }
    c
}

fn rect(max_w: u16, max_h: u16) -> impl Strategy<Value = Rect> {
    (0..=max_w, 0..=max_h, 0..=max_w, 0..=max_h).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn color_transitions_compose(a in color(), b in color(), c in color()) {
        let mut chained = TerminalModel::new(1, 1);
        chained.process(&a.transition_from(&Color::RESET));
        chained.process(&b.transition_from(&a));
        chained.process(&c.transition_from(&b));

        let mut direct = TerminalModel::new(1, 1);
        direct.process(&c.transition_from(&Color::RESET));

        prop_assert!(same_attrs(&chained.pen(), &direct.pen()));
        prop_assert!(same_attrs(&chained.pen(), &c));
    }

    #[test]
    fn blit_stays_inside_clip(
        src_ops in writes(8, 5),
        dst_ops in writes(10, 6),
        src_rect in rect(9, 6),
        dst_x in -4i32..12,
        dst_y in -4i32..8,
        clip in rect(11, 7),
        transparent in any::<bool>(),
    ) {
        let mut src = paint(8, 5, &src_ops);
        src.set_transparent(transparent);
        let mut dst = paint(10, 6, &dst_ops);
        let before = dst.clone();
        dst.blit(&src, src_rect, (dst_x, dst_y), clip);
        for y in 0..6u16 {
            for x in 0..10u16 {
                if !clip.contains(x, y) {
                    prop_assert_eq!(
                        dst.get(i32::from(x), i32::from(y)),
                        before.get(i32::from(x), i32::from(y)),
                        "({}, {})", x, y
                    );
                }
            }
        }
    }

    #[test]
    fn diff_brings_terminal_to_new_frame(prev_ops in writes(9, 4), next_ops in writes(9, 4)) {
        let prev = paint(9, 4, &prev_ops);
        let mut next = prev.clone();
        for op in &next_ops {
            next.set(op.x, op.y, op.glyph, &op.color);
        }
        let mut model = TerminalModel::from_canvas(&prev);
        model.process(&next.to_ansi_diff(&prev));
        prop_assert_eq!(model.diff_canvas(&next), None);
    }

    #[test]
    fn diff_after_blit_matches(
        base_ops in writes(9, 4),
        src_ops in writes(5, 3),
        src_rect in rect(6, 4),
        dst_x in -3i32..10,
        clip in rect(10, 5),
    ) {
        let prev = paint(9, 4, &base_ops);
        let src = paint(5, 3, &src_ops);
        let mut next = prev.clone();
        next.blit(&src, src_rect, (dst_x, 1), clip);
        let mut model = TerminalModel::from_canvas(&prev);
        model.process(&next.to_ansi_diff(&prev));
        prop_assert_eq!(model.diff_canvas(&next), None);
    }
}
