#![forbid(unsafe_code)]

//! Drawing primitives for the canvas.
//!
//! Helpers on top of [`Canvas::put`] so widgets can draw text, lines, boxes,
//! grids, scroll bars, tab buttons and menu bars without repeating cell
//! loops. Box and grid glyphs come from the theme's 16-entry tables (see
//! [`ttk_style::theme`] for the index layout). Every primitive is a no-op on a
//! hidden canvas.

use ttk_core::{Point, Size};
use ttk_style::theme::{GridGlyphs, grid_index as g};
use ttk_style::{Color, Orientation, Theme};
use ttk_text::{Alignment, StyledString};

use crate::canvas::{Canvas, wide_overflow_color};
use crate::cell::Glyph;

/// Tab stop used when drawing text.
pub const TAB_SPACES: usize = 4;

/// Menu bar button layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    /// Bar entry framed by the menu bar borders.
    Bar,
    /// Drop-down entry padded to `width`, optionally with a submenu marker.
    Item { width: u16, submenu: bool },
}

pub trait Draw {
    /// Draw `text` at its natural width. Glyphs in the reset color take
    /// `color`.
    fn draw_text(&mut self, pos: impl Into<Point>, text: &StyledString, color: &Color);

    /// Draw `text` padded or truncated to `width` columns.
    fn draw_text_aligned(
        &mut self,
        pos: impl Into<Point>,
        text: &StyledString,
        width: usize,
        alignment: Alignment,
        color: &Color,
    );

    fn draw_str(&mut self, pos: impl Into<Point>, text: &str, color: &Color) {
        self.draw_text(pos, &StyledString::from(text), color);
    }

    fn draw_char(&mut self, pos: impl Into<Point>, ch: char, color: &Color);

    /// Horizontal rule with end caps.
    fn draw_hline(&mut self, pos: impl Into<Point>, len: u16, color: &Color, theme: &Theme);

    /// Vertical rule with end caps.
    fn draw_vline(&mut self, pos: impl Into<Point>, len: u16, color: &Color, theme: &Theme);

    /// Box outline.
    fn draw_box(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        color: &Color,
        grid: &GridGlyphs,
    );

    /// Box outline plus inner rules. `hlines`/`vlines` are offsets from the
    /// box origin; rules on or outside the border are skipped.
    fn draw_grid(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        hlines: &[u16],
        vlines: &[u16],
        color: &Color,
        grid: &GridGlyphs,
    );

    /// Title set into the top border of a box `width` wide, framed by tees.
    fn draw_box_title(
        &mut self,
        pos: impl Into<Point>,
        width: u16,
        title: &StyledString,
        alignment: Alignment,
        color: &Color,
        grid: &GridGlyphs,
    );

    /// Box from a 9-glyph table (corners, edges, fill in reading order).
    fn draw_button_box(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        color: &Color,
        glyphs: &[char; 9],
    );

    /// Scroll bar `len` cells long with the handle over `slider`
    /// (offsets from `pos`, end exclusive).
    fn draw_scroll(
        &mut self,
        pos: impl Into<Point>,
        len: u16,
        slider: (u16, u16),
        orientation: Orientation,
        color: &Color,
        theme: &Theme,
    );

    /// Tab label over a bottom bar. A slim tab is the label row plus the bar;
    /// otherwise the label is framed above and at the sides.
    fn draw_tab_button(
        &mut self,
        pos: impl Into<Point>,
        width: u16,
        text: &StyledString,
        slim: bool,
        border_color: &Color,
        theme: &Theme,
    );

    /// Menu bar background `width` cells long.
    fn draw_menu_bar_bg(&mut self, pos: impl Into<Point>, width: u16, color: &Color, theme: &Theme);

    /// One menu entry. Returns the columns used.
    fn draw_menu_button(
        &mut self,
        pos: impl Into<Point>,
        text: &StyledString,
        kind: MenuButton,
        color: &Color,
        theme: &Theme,
    ) -> u16;
}

fn rule(first: char, mid: char, last: char, len: u16) -> String {
    match len {
        0 => String::new(),
        1 => first.to_string(),
        n => {
            let mut s = String::with_capacity(usize::from(n) * 3);
            s.push(first);
            s.extend(std::iter::repeat_n(mid, usize::from(n) - 2));
            s.push(last);
            s
        }
    }
}

impl Canvas {
    fn draw_text_inner(
        &mut self,
        pos: Point,
        text: &StyledString,
        width: Option<usize>,
        alignment: Alignment,
        color: &Color,
    ) {
        let (x, y) = (pos.x, pos.y);
        if !self.is_visible() || y < 0 || y >= i32::from(self.height()) {
            return;
        }
        let text = text.tab_to_spaces(TAB_SPACES);
        let width = width.unwrap_or(text.width());
        let span = i32::try_from(width).unwrap_or(i32::MAX);
        if x.saturating_add(span) <= 0 || x >= i32::from(self.width()) {
            return;
        }
        let text = if width == text.width() {
            text
        } else {
            text.align(width, color, alignment)
        };
        let [left_mark, right_mark] = self.overflow();
        let right_edge = i32::from(self.width());
        let mut col = x;
        for glyph in text.glyphs() {
            let w = i32::try_from(glyph.width).unwrap_or(1);
            if w == 0 {
                continue;
            }
            if col >= right_edge {
                break;
            }
            let cell_color = if *glyph.color == Color::RESET && *color != Color::RESET {
                color
            } else {
                glyph.color
            };
            if w == 2 && col == -1 {
                self.put(0, y, Glyph::Char(left_mark), &wide_overflow_color());
            } else if w == 2 && col + 1 == right_edge {
                self.put(col, y, Glyph::Char(right_mark), &wide_overflow_color());
            } else if col >= 0
                && let Some(g) = Glyph::from_cluster(glyph.text)
            {
                self.put(col, y, g, cell_color);
            }
            col += w;
        }
    }
}

impl Draw for Canvas {
    fn draw_text(&mut self, pos: impl Into<Point>, text: &StyledString, color: &Color) {
        self.draw_text_inner(pos.into(), text, None, Alignment::Left, color);
    }

    fn draw_text_aligned(
        &mut self,
        pos: impl Into<Point>,
        text: &StyledString,
        width: usize,
        alignment: Alignment,
        color: &Color,
    ) {
        self.draw_text_inner(pos.into(), text, Some(width), alignment, color);
    }

    fn draw_char(&mut self, pos: impl Into<Point>, ch: char, color: &Color) {
        if !self.is_visible() {
            return;
        }
        let p = pos.into();
        self.put(p.x, p.y, Glyph::Char(ch), color);
    }

    fn draw_hline(&mut self, pos: impl Into<Point>, len: u16, color: &Color, theme: &Theme) {
        let [first, mid, last] = theme.hline;
        self.draw_str(pos, &rule(first, mid, last, len), color);
    }

    fn draw_vline(&mut self, pos: impl Into<Point>, len: u16, color: &Color, theme: &Theme) {
        if !self.is_visible() || len == 0 {
            return;
        }
        let p = pos.into();
        let [first, mid, last] = theme.vline;
        let len = i32::from(len);
        for i in 0..len {
            let ch = match i {
                0 => first,
                i if i == len - 1 => last,
                _ => mid,
            };
            self.put(p.x, p.y + i, Glyph::Char(ch), color);
        }
    }

    fn draw_box(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        color: &Color,
        grid: &GridGlyphs,
    ) {
        self.draw_grid(pos, size, &[], &[], color, grid);
    }

    fn draw_grid(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        hlines: &[u16],
        vlines: &[u16],
        color: &Color,
        grid: &GridGlyphs,
    ) {
        let (p, size) = (pos.into(), size.into());
        if !self.is_visible() || size.width == 0 || size.height == 0 {
            return;
        }
        let (x, y) = (p.x, p.y);
        let (w, h) = (i32::from(size.width), i32::from(size.height));
        let mut set = |cx: i32, cy: i32, idx: usize| self.put(cx, cy, Glyph::Char(grid[idx]), color);

        for ix in x + 1..x + w - 1 {
            set(ix, y, g::TOP);
            set(ix, y + h - 1, g::BOTTOM);
        }
        for iy in y + 1..y + h - 1 {
            set(x, iy, g::LEFT);
            set(x + w - 1, iy, g::RIGHT);
        }
        set(x, y, g::TOP_LEFT);
        set(x + w - 1, y, g::TOP_RIGHT);
        set(x, y + h - 1, g::BOTTOM_LEFT);
        set(x + w - 1, y + h - 1, g::BOTTOM_RIGHT);

        let inner_h: Vec<i32> = hlines
            .iter()
            .map(|&r| i32::from(r))
            .filter(|&r| 0 < r && r < h - 1)
            .collect();
        let inner_v: Vec<i32> = vlines
            .iter()
            .map(|&c| i32::from(c))
            .filter(|&c| 0 < c && c < w - 1)
            .collect();
        for &r in &inner_h {
            set(x, y + r, g::LEFT_TEE);
            set(x + w - 1, y + r, g::RIGHT_TEE);
            for ix in x + 1..x + w - 1 {
                set(ix, y + r, g::INNER_H);
            }
        }
        for &c in &inner_v {
            set(x + c, y, g::TOP_TEE);
            set(x + c, y + h - 1, g::BOTTOM_TEE);
            for iy in y + 1..y + h - 1 {
                set(x + c, iy, g::INNER_V);
            }
        }
        for &r in &inner_h {
            for &c in &inner_v {
                set(x + c, y + r, g::CROSS);
            }
        }
    }

    fn draw_box_title(
        &mut self,
        pos: impl Into<Point>,
        width: u16,
        title: &StyledString,
        alignment: Alignment,
        color: &Color,
        grid: &GridGlyphs,
    ) {
        let p = pos.into();
        if !self.is_visible() || width < 4 {
            return;
        }
        let w = usize::from(width);
        let title = if title.width() > w - 4 {
            title.slice_columns(0, w - 4)
        } else {
            title.clone()
        };
        let tw = title.width();
        let offset = match alignment {
            Alignment::Left => 1,
            Alignment::Right => w - 2 - tw,
            Alignment::Center | Alignment::Justify => (w - 2 - tw) / 2,
        };
        let left = p.x + i32::try_from(offset).unwrap_or(0);
        let right = left + i32::try_from(tw).unwrap_or(0) + 1;
        self.put(left, p.y, Glyph::Char(grid[g::RIGHT_TEE]), color);
        self.put(right, p.y, Glyph::Char(grid[g::LEFT_TEE]), color);
        self.draw_text((left + 1, p.y), &title, color);
    }

    fn draw_button_box(
        &mut self,
        pos: impl Into<Point>,
        size: impl Into<Size>,
        color: &Color,
        glyphs: &[char; 9],
    ) {
        let (p, size) = (pos.into(), size.into());
        if !self.is_visible() || size.width == 0 || size.height == 0 {
            return;
        }
        let (x, y) = (p.x, p.y);
        let (w, h) = (i32::from(size.width), i32::from(size.height));
        for ix in x + 1..x + w - 1 {
            self.put(ix, y, Glyph::Char(glyphs[1]), color);
            self.put(ix, y + h - 1, Glyph::Char(glyphs[7]), color);
        }
        for iy in y + 1..y + h - 1 {
            self.put(x, iy, Glyph::Char(glyphs[3]), color);
            self.put(x + w - 1, iy, Glyph::Char(glyphs[5]), color);
        }
        self.put(x, y, Glyph::Char(glyphs[0]), color);
        self.put(x + w - 1, y, Glyph::Char(glyphs[2]), color);
        self.put(x, y + h - 1, Glyph::Char(glyphs[6]), color);
        self.put(x + w - 1, y + h - 1, Glyph::Char(glyphs[8]), color);
    }

    fn draw_scroll(
        &mut self,
        pos: impl Into<Point>,
        len: u16,
        slider: (u16, u16),
        orientation: Orientation,
        color: &Color,
        theme: &Theme,
    ) {
        let p = pos.into();
        if !self.is_visible() || len == 0 {
            return;
        }
        let (glyphs, step) = match orientation {
            Orientation::Horizontal => (theme.hscroll, (1, 0)),
            Orientation::Vertical => (theme.vscroll, (0, 1)),
        };
        let len = i32::from(len);
        let at = |i: i32| (p.x + step.0 * i, p.y + step.1 * i);
        for i in 1..len - 1 {
            let (cx, cy) = at(i);
            self.put(cx, cy, Glyph::Char(glyphs[1]), color);
        }
        let (from, to) = (i32::from(slider.0), i32::from(slider.1));
        for i in from.max(1)..to.min(len - 1) {
            let (cx, cy) = at(i);
            self.put(cx, cy, Glyph::Char(glyphs[2]), color);
        }
        let (cx, cy) = at(0);
        self.put(cx, cy, Glyph::Char(glyphs[0]), color);
        let (cx, cy) = at(len - 1);
        self.put(cx, cy, Glyph::Char(glyphs[3]), color);
    }

    fn draw_tab_button(
        &mut self,
        pos: impl Into<Point>,
        width: u16,
        text: &StyledString,
        slim: bool,
        border_color: &Color,
        theme: &Theme,
    ) {
        let p = pos.into();
        let t = &theme.tab;
        if slim {
            let bar = rule(t.slim_left, t.slim, t.slim_right, width);
            self.draw_str((p.x, p.y + 1), &bar, border_color);
            self.draw_text_aligned(p, text, usize::from(width), Alignment::Center, &Color::RESET);
        } else {
            let top = rule(t.bar_left, t.bar, t.bar_right, width);
            self.draw_str(p, &top, border_color);
            let inner = usize::from(width.saturating_sub(2));
            self.draw_char((p.x, p.y + 1), t.button_left, border_color);
            self.draw_text_aligned((p.x + 1, p.y + 1), text, inner, Alignment::Center, &Color::RESET);
            self.draw_char((p.x + i32::from(width) - 1, p.y + 1), t.button_right, border_color);
            self.draw_hline((p.x, p.y + 2), width, border_color, theme);
        }
    }

    fn draw_menu_bar_bg(&mut self, pos: impl Into<Point>, width: u16, color: &Color, theme: &Theme) {
        let mb = &theme.menu_bar;
        let bar = rule(mb.background_start, mb.fill, mb.background_end, width);
        self.draw_str(pos, &bar, color);
    }

    fn draw_menu_button(
        &mut self,
        pos: impl Into<Point>,
        text: &StyledString,
        kind: MenuButton,
        color: &Color,
        theme: &Theme,
    ) -> u16 {
        let p = pos.into();
        let mb = &theme.menu_bar;
        let tw = u16::try_from(text.width()).unwrap_or(u16::MAX);
        match kind {
            MenuButton::Bar => {
                self.draw_char(p, mb.left_border, color);
                self.draw_text((p.x + 1, p.y), text, color);
                self.draw_char((p.x + 1 + i32::from(tw), p.y), mb.right_border, color);
                tw.saturating_add(2)
            }
            MenuButton::Item { width, submenu } => {
                self.draw_text_aligned(p, text, usize::from(width), Alignment::Left, color);
                if submenu && width > 0 {
                    self.draw_char((p.x + i32::from(width) - 1, p.y), mb.submenu, color);
                }
                width
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttk_style::theme::GridStyle;

    fn rows(c: &Canvas) -> Vec<String> {
        (0..c.height()).filter_map(|y| c.row_text(y)).collect()
    }

    // ── text ──

    #[test]
    fn text_takes_color_for_reset_glyphs() {
        let blue = Color::fg("#0000ff").unwrap();
        let bold = StyledString::styled("b", Color::BOLD);
        let text = StyledString::from("a") + &bold;
        let mut c = Canvas::new(3, 1);
        c.draw_text((0, 0), &text, &blue);
        assert_eq!(c.get(0, 0).map(|c| c.color.clone()), Some(blue));
        assert_eq!(c.get(1, 0).map(|c| c.color.clone()), Some(Color::BOLD));
    }

    #[test]
    fn text_clipped_left_and_right() {
        let mut c = Canvas::new(3, 1);
        c.draw_str((-2, 0), "abcdef", &Color::RESET);
        assert_eq!(c.row_text(0).as_deref(), Some("cde"));
    }

    #[test]
    fn aligned_text_pads() {
        let mut c = Canvas::new(6, 1);
        c.draw_text_aligned((0, 0), &"ab".into(), 6, Alignment::Right, &Color::RESET);
        assert_eq!(c.row_text(0).as_deref(), Some("    ab"));
    }

    #[test]
    fn wide_text_cut_by_edges_gets_markers() {
        let mut c = Canvas::new(3, 1);
        c.draw_str((-1, 0), "界a界", &Color::RESET);
        assert_eq!(c.row_text(0).as_deref(), Some("<a>"));
    }

    #[test]
    fn tabs_expand() {
        let mut c = Canvas::new(6, 1);
        c.draw_str((0, 0), "a\tb", &Color::RESET);
        assert_eq!(c.row_text(0).as_deref(), Some("a   b "));
    }

    #[test]
    fn hidden_canvas_ignores_drawing() {
        let mut c = Canvas::new(3, 1);
        c.hide();
        c.draw_str((0, 0), "abc", &Color::RESET);
        assert_eq!(c.row_text(0).as_deref(), Some("   "));
    }

    // ── lines ──

    #[test]
    fn hline_and_vline() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(4, 3);
        c.draw_hline((0, 0), 4, &Color::RESET, &theme);
        c.draw_vline((3, 0), 3, &Color::RESET, &theme);
        assert_eq!(rows(&c), vec!["╞══╥", "   ║", "   ╨"]);
    }

    // ── boxes ──

    #[test]
    fn grid_with_inner_rules() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(5, 5);
        let grid = theme.grid(GridStyle::Single);
        c.draw_grid((0, 0), (5, 5), &[2], &[2], &Color::RESET, grid);
        assert_eq!(rows(&c), vec!["┌─┬─┐", "│ │ │", "├─┼─┤", "│ │ │", "└─┴─┘"]);
    }

    #[test]
    fn rules_on_the_border_are_skipped() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(3, 3);
        let grid = theme.grid(GridStyle::Single);
        c.draw_grid((0, 0), (3, 3), &[0, 2, 9], &[], &Color::RESET, grid);
        assert_eq!(rows(&c), vec!["┌─┐", "│ │", "└─┘"]);
    }

    #[test]
    fn box_title_centered() {
        let theme = Theme::utf8();
        let grid = theme.grid(GridStyle::Single);
        let mut c = Canvas::new(10, 3);
        c.draw_box((0, 0), (10, 3), &Color::RESET, grid);
        c.draw_box_title((0, 0), 10, &"ab".into(), Alignment::Center, &Color::RESET, grid);
        assert_eq!(c.row_text(0).as_deref(), Some("┌──┤ab├──┐"));
    }

    #[test]
    fn button_box() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(4, 3);
        c.draw_button_box((0, 0), (4, 3), &Color::RESET, &theme.button_box);
        assert_eq!(rows(&c), vec!["╭──╮", "│  │", "╰──╯"]);
    }

    // ── widgets ──

    #[test]
    fn horizontal_scroll() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(6, 1);
        c.draw_scroll((0, 0), 6, (2, 4), Orientation::Horizontal, &Color::RESET, &theme);
        assert_eq!(c.row_text(0).as_deref(), Some("◀┄▓▓┄▶"));
    }

    #[test]
    fn vertical_scroll_clamps_slider() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(1, 4);
        c.draw_scroll((0, 0), 4, (0, 9), Orientation::Vertical, &Color::RESET, &theme);
        assert_eq!(rows(&c), vec!["▲", "▓", "▓", "▼"]);
    }

    #[test]
    fn slim_tab_button() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(5, 2);
        c.draw_tab_button((0, 0), 5, &"ab".into(), true, &Color::RESET, &theme);
        assert_eq!(rows(&c), vec![" ab  ", "┌───┐"]);
    }

    #[test]
    fn framed_tab_button() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(5, 3);
        c.draw_tab_button((0, 0), 5, &"ab".into(), false, &Color::RESET, &theme);
        assert_eq!(rows(&c), vec!["╭───╮", "│ab │", "╞═══╡"]);
    }

    #[test]
    fn menu_buttons() {
        let theme = Theme::utf8();
        let mut c = Canvas::new(8, 2);
        let used = c.draw_menu_button((0, 0), &"File".into(), MenuButton::Bar, &Color::RESET, &theme);
        assert_eq!(used, 6);
        let item = MenuButton::Item {
            width: 6,
            submenu: true,
        };
        c.draw_menu_button((0, 1), &"Open".into(), item, &Color::RESET, &theme);
        assert_eq!(rows(&c), vec!["├File┤  ", "Open ▶  "]);
    }
}
