#![forbid(unsafe_code)]

//! Text selection over a [`Screen`] by cell coordinates.

use ttk_render::Glyph;
use ttk_style::Color;
use ttk_text::StyledString;

use crate::screen::Screen;

/// An inclusive range of cells in reading order, `(x, y)` at both ends.
/// The ends may be given in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: (u16, u16),
    pub head: (u16, u16),
}

impl Selection {
    pub fn new(anchor: (u16, u16), head: (u16, u16)) -> Self {
        Self { anchor, head }
    }

    /// Ends ordered by row, then column.
    pub fn ordered(&self) -> ((u16, u16), (u16, u16)) {
        let key = |(x, y): (u16, u16)| (y, x);
        if key(self.anchor) <= key(self.head) {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        let ((x0, y0), (x1, y1)) = self.ordered();
        (y0, x0) <= (y, x) && (y, x) <= (y1, x1)
    }

    /// The run of non-blank cells around `(x, y)`, or that single cell when
    /// it is blank.
    pub fn word_at(screen: &Screen, x: u16, y: u16) -> Selection {
        let Some(row) = screen.row(y) else {
            return Selection::new((x, y), (x, y));
        };
        let blank = |i: usize| matches!(row.cells[i].glyph, Glyph::Char(c) if c.is_whitespace());
        let x = usize::from(x).min(row.cells.len().saturating_sub(1));
        if blank(x) {
            return Selection::new((x as u16, y), (x as u16, y));
        }
        let mut start = x;
        while start > 0 && !blank(start - 1) {
            start -= 1;
        }
        let mut end = x;
        while end + 1 < row.cells.len() && !blank(end + 1) {
            end += 1;
        }
        Selection::new((start as u16, y), (end as u16, y))
    }

    /// Selected text with its colors.
    ///
    /// Rows that continue a wrapped line join without a newline. Blanks
    /// running to a hard line end are dropped.
    pub fn extract(&self, screen: &Screen) -> StyledString {
        let ((x0, y0), (x1, y1)) = self.ordered();
        let last = y1.min(screen.height().saturating_sub(1));
        let mut out = StyledString::new();
        for y in y0..=last {
            let Some(row) = screen.row(y) else { break };
            let from = if y == y0 { usize::from(x0) } else { 0 };
            let to = if y == y1 {
                (usize::from(x1) + 1).min(row.cells.len())
            } else {
                row.cells.len()
            };
            let hard_end = screen.row(y + 1).is_none_or(|next| next.newline);
            let mut cells = row.cells.get(from..to).unwrap_or_default();
            let blank_tail = row.cells[to..].iter().all(|c| c.glyph == Glyph::Char(' '));
            if hard_end && blank_tail {
                while let Some((tail, rest)) = cells.split_last() {
                    if tail.glyph != Glyph::Char(' ') {
                        break;
                    }
                    cells = rest;
                }
            }
            for cell in cells {
                if !cell.glyph.is_continuation() {
                    out.push_str(&cell.glyph.to_string(), &cell.color);
                }
            }
            if y < last && hard_end {
                out.push_str("\n", &Color::RESET);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with(lines: &[&str], width: u16) -> Screen {
        let mut s = Screen::new(width, lines.len() as u16 + 1, 0);
        for (y, line) in lines.iter().enumerate() {
            s.move_to(0, y as u16);
            for c in line.chars() {
                s.print(c, false, false);
            }
        }
        s
    }

    #[test]
    fn hard_lines_are_trimmed_and_joined() {
        let s = screen_with(&["ab", "cd"], 6);
        let sel = Selection::new((4, 1), (0, 0));
        assert_eq!(sel.extract(&s).as_str(), "ab\ncd");
    }

    #[test]
    fn wrapped_rows_join_without_newline() {
        let mut s = Screen::new(3, 3, 0);
        for c in "abcdef".chars() {
            s.print(c, true, false);
        }
        let sel = Selection::new((0, 0), (2, 1));
        assert_eq!(sel.extract(&s).as_str(), "abcdef");
    }

    #[test]
    fn colors_survive() {
        let mut s = Screen::new(4, 1, 0);
        s.set_pen(Color::BOLD);
        s.print('x', true, false);
        let text = Selection::new((0, 0), (0, 0)).extract(&s);
        assert_eq!(text.as_str(), "x");
        assert_eq!(text.color_at(0), Some(&Color::BOLD));
    }

    #[test]
    fn word_selection() {
        let s = screen_with(&["foo bar"], 8);
        let sel = Selection::word_at(&s, 5, 0);
        assert_eq!(sel, Selection::new((4, 0), (6, 0)));
        assert!(sel.contains(6, 0));
        assert!(!sel.contains(3, 0));
        assert_eq!(Selection::word_at(&s, 3, 0), Selection::new((3, 0), (3, 0)));
    }
}
