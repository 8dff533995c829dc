#![forbid(unsafe_code)]

//! Glyph tables and per-class default styles.
//!
//! Box and grid glyphs come from a 16-entry table laid out as a 4×4 grid:
//!
//! ```text
//!  0 TL     1 top-H    2 top-T    3 TR
//!  4 left   5 fill     6 inner-V  7 right
//!  8 left-T 9 inner-H 10 cross   11 right-T
//! 12 BL    13 bottom  14 bot-T   15 BR
//! ```

use std::collections::BTreeMap;

use crate::color::{Color, Mods, Rgb};
use crate::style::{Style, StyleMap, WidgetState};

/// 16-glyph box/grid table, see the module docs for the index layout.
pub type GridGlyphs = [char; 16];

/// Index names into [`GridGlyphs`].
pub mod grid_index {
    pub const TOP_LEFT: usize = 0;
    pub const TOP: usize = 1;
    pub const TOP_TEE: usize = 2;
    pub const TOP_RIGHT: usize = 3;
    pub const LEFT: usize = 4;
    pub const FILL: usize = 5;
    pub const INNER_V: usize = 6;
    pub const RIGHT: usize = 7;
    pub const LEFT_TEE: usize = 8;
    pub const INNER_H: usize = 9;
    pub const CROSS: usize = 10;
    pub const RIGHT_TEE: usize = 11;
    pub const BOTTOM_LEFT: usize = 12;
    pub const BOTTOM: usize = 13;
    pub const BOTTOM_TEE: usize = 14;
    pub const BOTTOM_RIGHT: usize = 15;
}

const fn grid(rows: [[char; 4]; 4]) -> GridGlyphs {
    [
        rows[0][0], rows[0][1], rows[0][2], rows[0][3],
        rows[1][0], rows[1][1], rows[1][2], rows[1][3],
        rows[2][0], rows[2][1], rows[2][2], rows[2][3],
        rows[3][0], rows[3][1], rows[3][2], rows[3][3],
    ]
}

pub const GRID_SINGLE: GridGlyphs = grid([
    ['┌', '─', '┬', '┐'],
    ['│', ' ', '│', '│'],
    ['├', '─', '┼', '┤'],
    ['└', '─', '┴', '┘'],
]);
pub const GRID_DOUBLE: GridGlyphs = grid([
    ['╔', '═', '╦', '╗'],
    ['║', ' ', '║', '║'],
    ['╠', '═', '╬', '╣'],
    ['╚', '═', '╩', '╝'],
]);
pub const GRID_ROUNDED: GridGlyphs = grid([
    ['╭', '─', '┬', '╮'],
    ['│', ' ', '│', '│'],
    ['├', '─', '┼', '┤'],
    ['╰', '─', '┴', '╯'],
]);
pub const GRID_THICK: GridGlyphs = grid([
    ['┏', '━', '┳', '┓'],
    ['┃', ' ', '┃', '┃'],
    ['┣', '━', '╋', '┫'],
    ['┗', '━', '┻', '┛'],
]);
pub const GRID_DOUBLE_OUTER: GridGlyphs = grid([
    ['╔', '═', '╤', '╗'],
    ['║', ' ', '│', '║'],
    ['╟', '─', '┼', '╢'],
    ['╚', '═', '╧', '╝'],
]);
pub const GRID_DOUBLE_H: GridGlyphs = grid([
    ['╒', '═', '╤', '╕'],
    ['│', ' ', '│', '│'],
    ['╞', '═', '╪', '╡'],
    ['╘', '═', '╧', '╛'],
]);
pub const GRID_ASCII: GridGlyphs = grid([
    ['+', '-', '+', '+'],
    ['|', ' ', '|', '|'],
    ['+', '-', '+', '+'],
    ['+', '-', '+', '+'],
]);

/// Named grid variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Thick,
    DoubleOuter,
    DoubleHorizontal,
}

/// Glyphs for tab bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabGlyphs {
    pub bar_left: char,
    pub bar: char,
    pub bar_right: char,
    pub slim_left: char,
    pub slim: char,
    pub slim_right: char,
    pub button_left: char,
    pub button_right: char,
    pub scroll_left: char,
    pub scroll_right: char,
}

/// Glyphs for a menu bar, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuBarGlyphs {
    pub right_border: char,
    pub fill: char,
    pub left_border: char,
    pub background_start: char,
    pub background_end: char,
    pub submenu: char,
}

/// Theme glyph tables plus class default styles.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub grids: [GridGlyphs; 6],
    /// TL, T, TR, L, fill, R, BL, B, BR.
    pub button_box: [char; 9],
    /// Left arrow, track, handle, right arrow.
    pub hscroll: [char; 4],
    /// Up arrow, track, handle, down arrow.
    pub vscroll: [char; 4],
    pub hline: [char; 3],
    pub vline: [char; 3],
    pub menu_bar: MenuBarGlyphs,
    pub tab: TabGlyphs,
    /// Drawn in place of a wide glyph cut by the left or right clip edge.
    pub wide_overflow: [char; 2],
    pub checkbox: [&'static str; 2],
    pub radio: [&'static str; 2],
    /// Whether the braille block (U+2800) is usable for dot graphics.
    pub braille: bool,
    class_styles: BTreeMap<String, StyleMap>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::utf8()
    }
}

impl Theme {
    /// Box-drawing theme.
    pub fn utf8() -> Self {
        Self {
            name: "utf8",
            grids: [
                GRID_SINGLE,
                GRID_DOUBLE,
                GRID_ROUNDED,
                GRID_THICK,
                GRID_DOUBLE_OUTER,
                GRID_DOUBLE_H,
            ],
            button_box: ['╭', '─', '╮', '│', ' ', '│', '╰', '─', '╯'],
            hscroll: ['◀', '┄', '▓', '▶'],
            vscroll: ['▲', '┊', '▓', '▼'],
            hline: ['╞', '═', '╡'],
            vline: ['╥', '║', '╨'],
            menu_bar: MenuBarGlyphs {
                right_border: '┤',
                fill: '─',
                left_border: '├',
                background_start: '─',
                background_end: '─',
                submenu: '▶',
            },
            tab: TabGlyphs {
                bar_left: '╭',
                bar: '─',
                bar_right: '╮',
                slim_left: '┌',
                slim: '─',
                slim_right: '┐',
                button_left: '│',
                button_right: '│',
                scroll_left: '◀',
                scroll_right: '▶',
            },
            wide_overflow: ['<', '>'],
            checkbox: ["[ ]", "[X]"],
            radio: ["( )", "(X)"],
            braille: true,
            class_styles: default_class_styles(),
        }
    }

    /// 7-bit theme for terminals without box drawing.
    pub fn ascii() -> Self {
        Self {
            name: "ascii",
            grids: [GRID_ASCII; 6],
            button_box: ['+', '-', '+', '|', ' ', '|', '+', '-', '+'],
            hscroll: ['<', '-', '#', '>'],
            vscroll: ['^', '|', '#', 'v'],
            hline: ['+', '=', '+'],
            vline: ['+', '|', '+'],
            menu_bar: MenuBarGlyphs {
                right_border: '|',
                fill: '-',
                left_border: '|',
                background_start: '-',
                background_end: '-',
                submenu: '>',
            },
            tab: TabGlyphs {
                bar_left: '+',
                bar: '-',
                bar_right: '+',
                slim_left: '+',
                slim: '-',
                slim_right: '+',
                button_left: '|',
                button_right: '|',
                scroll_left: '<',
                scroll_right: '>',
            },
            wide_overflow: ['<', '>'],
            checkbox: ["[ ]", "[X]"],
            radio: ["( )", "(X)"],
            braille: false,
            class_styles: default_class_styles(),
        }
    }

    pub fn grid(&self, style: GridStyle) -> &GridGlyphs {
        let idx = match style {
            GridStyle::Single => 0,
            GridStyle::Double => 1,
            GridStyle::Rounded => 2,
            GridStyle::Thick => 3,
            GridStyle::DoubleOuter => 4,
            GridStyle::DoubleHorizontal => 5,
        };
        &self.grids[idx]
    }

    /// Default style map for a widget class; unknown classes get the base map.
    pub fn class_style(&self, class: &str) -> StyleMap {
        self.class_styles
            .get(class)
            .or_else(|| self.class_styles.get("Widget"))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_class_style(&mut self, class: impl Into<String>, map: StyleMap) {
        self.class_styles.insert(class.into(), map);
    }

    /// Braille cell for a 2×4 dot mask (bit 0 = top-left dot, U+2800 order).
    pub fn braille_dots(&self, mask: u8) -> char {
        if !self.braille {
            return if mask == 0 { ' ' } else { '#' };
        }
        char::from_u32(0x2800 + u32::from(mask)).unwrap_or(' ')
    }
}

fn default_class_styles() -> BTreeMap<String, StyleMap> {
    let border = Color::fg_rgb(Rgb::new(0xcc, 0xcc, 0xcc));
    let focus_border = Color::fg_rgb(Rgb::new(0xff, 0xff, 0x00)).with_mods(Mods::BOLD);
    let disabled = Color::fg_rgb(Rgb::new(0x88, 0x88, 0x88));

    let base = StyleMap::new(
        Style::new()
            .with("color", Color::RESET)
            .with("borderColor", border.clone()),
    )
    .with_state(
        WidgetState::Disabled,
        Style::new()
            .with("color", disabled.clone())
            .with("borderColor", disabled.clone()),
    );

    let button = StyleMap::new(
        Style::new()
            .with("color", Color::fg_rgb(Rgb::new(0xdd, 0xdd, 0xdd)))
            .with("borderColor", border.clone()),
    )
    .with_state(
        WidgetState::Focus,
        Style::new().with("borderColor", focus_border.clone()),
    )
    .with_state(
        WidgetState::Hover,
        Style::new().with("borderColor", Color::fg_rgb(Rgb::WHITE).with_mods(Mods::BOLD)),
    )
    .with_state(
        WidgetState::Clicked,
        Style::new().with("color", Color::fg_rgb(Rgb::new(0xff, 0xff, 0xdd)).with_mods(Mods::BOLD)),
    )
    .with_state(
        WidgetState::Checked,
        Style::new().with("color", Color::bg_rgb(Rgb::new(0x00, 0x44, 0x88))),
    )
    .with_state(
        WidgetState::Disabled,
        Style::new()
            .with("color", disabled.clone())
            .with("borderColor", disabled.clone()),
    );

    let frame = StyleMap::new(
        Style::new()
            .with("color", Color::RESET)
            .with("borderColor", border)
            .with("titleColor", Color::BOLD),
    )
    .with_state(WidgetState::Focus, Style::new().with("borderColor", focus_border));

    let text_edit = StyleMap::new(
        Style::new()
            .with("color", Color::RESET)
            .with("lineColor", Color::fg_rgb(Rgb::new(0x88, 0x88, 0x88)))
            .with("selectedColor", Color::bg_rgb(Rgb::new(0x00, 0x55, 0xaa))),
    )
    .with_state(WidgetState::Disabled, Style::new().with("color", disabled.clone()));

    let terminal = StyleMap::new(
        Style::new()
            .with("color", Color::RESET)
            .with("selectedColor", Color::REVERSED),
    );

    let mut map = BTreeMap::new();
    map.insert("Widget".to_string(), base.clone());
    map.insert("Label".to_string(), base);
    map.insert("Button".to_string(), button);
    map.insert("Frame".to_string(), frame);
    map.insert("TextEdit".to_string(), text_edit);
    map.insert("TerminalView".to_string(), terminal);
    map
}
