#![forbid(unsafe_code)]

//! Display-width helpers.
//!
//! Every glyph cluster occupies 0, 1 or 2 terminal columns. Widths come from
//! the East-Asian-Width tables, with emoji presentation (VS16, pictographic
//! ranges, ZWJ sequences) forced to 2 so that a cluster never claims more
//! than a wide cell.

use unicode_display_width::width as unicode_display_width;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

#[inline]
fn is_zero_width_codepoint(c: char) -> bool {
    let u = c as u32;
    matches!(u, 0x0000..=0x0008 | 0x000B..=0x000C | 0x000E..=0x001F | 0x007F..=0x009F)
        || matches!(u, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF)
        || matches!(u, 0xFE00..=0xFE0F | 0xFE20..=0xFE2F | 0xE0100..=0xE01EF)
        || matches!(
            u,
            0x00AD | 0x034F | 0x180E | 0x200B..=0x200F | 0x2060 | 0xFEFF
        )
        || matches!(u, 0x202A..=0x202E | 0x2066..=0x206F)
}

#[inline]
fn is_probable_emoji(c: char) -> bool {
    let u = c as u32;
    matches!(u, 0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF) && u != 0x2764
}

/// Width of a single code point, ignoring cluster context.
#[inline]
pub fn char_width(ch: char) -> usize {
    match ch {
        '\t' | '\n' | '\r' => 1,
        ' '..='~' => 1,
        c if is_zero_width_codepoint(c) => 0,
        c if is_probable_emoji(c) => 2,
        c => c.width().unwrap_or(0).min(2),
    }
}

/// Width of one extended grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (None, _) => 0,
        (Some(c), None) => char_width(c),
        _ => {
            if grapheme.chars().all(is_zero_width_codepoint) {
                return 0;
            }
            if grapheme.chars().any(|c| c == '\u{FE0F}' || c == '\u{200D}')
                || grapheme.chars().any(is_probable_emoji)
            {
                return 2;
            }
            usize::try_from(unicode_display_width(grapheme))
                .unwrap_or(2)
                .min(2)
        }
    }
}

/// Total display width of a string.
pub fn str_width(text: &str) -> usize {
    if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return text.len();
    }
    text.graphemes(true).map(grapheme_width).sum()
}

/// Iterate extended grapheme clusters.
pub fn graphemes(text: &str) -> impl Iterator<Item = &str> {
    text.graphemes(true)
}
