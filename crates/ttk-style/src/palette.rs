//! Indexed color palettes used when decoding 16- and 256-color SGR codes.

use crate::color::Rgb;

/// Levels of the 6×6×6 color cube in the xterm 256-color table.
pub const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The 16 base colors; indexes 16..=255 follow the xterm cube and gray ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    pub base: [Rgb; 16],
}

/// Classic VGA text-mode colors.
pub const VGA: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0xAA, 0x00, 0x00),
    Rgb::new(0x00, 0xAA, 0x00),
    Rgb::new(0xAA, 0x55, 0x00),
    Rgb::new(0x00, 0x00, 0xAA),
    Rgb::new(0xAA, 0x00, 0xAA),
    Rgb::new(0x00, 0xAA, 0xAA),
    Rgb::new(0xAA, 0xAA, 0xAA),
    Rgb::new(0x55, 0x55, 0x55),
    Rgb::new(0xFF, 0x55, 0x55),
    Rgb::new(0x55, 0xFF, 0x55),
    Rgb::new(0xFF, 0xFF, 0x55),
    Rgb::new(0x55, 0x55, 0xFF),
    Rgb::new(0xFF, 0x55, 0xFF),
    Rgb::new(0x55, 0xFF, 0xFF),
    Rgb::new(0xFF, 0xFF, 0xFF),
];

/// xterm's default 16 colors.
pub const XTERM: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(205, 0, 0),
    Rgb::new(0, 205, 0),
    Rgb::new(205, 205, 0),
    Rgb::new(0, 0, 238),
    Rgb::new(205, 0, 205),
    Rgb::new(0, 205, 205),
    Rgb::new(229, 229, 229),
    Rgb::new(127, 127, 127),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(92, 92, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

impl Default for Palette {
    fn default() -> Self {
        Self::vga()
    }
}

impl Palette {
    pub const fn vga() -> Self {
        Self { base: VGA }
    }

    pub const fn xterm() -> Self {
        Self { base: XTERM }
    }

    /// One of the 16 base colors; `index` is taken modulo 16.
    #[inline]
    pub fn ansi16(&self, index: u8) -> Rgb {
        self.base[usize::from(index & 0x0F)]
    }

    /// Full 256-color lookup.
    pub fn ansi256(&self, index: u8) -> Rgb {
        match index {
            0..=15 => self.ansi16(index),
            232..=255 => {
                let gray = 8 + 10 * (index - 232);
                Rgb::new(gray, gray, gray)
            }
            _ => {
                let idx = index - 16;
                Rgb::new(
                    CUBE_LEVELS[usize::from(idx / 36)],
                    CUBE_LEVELS[usize::from((idx / 6) % 6)],
                    CUBE_LEVELS[usize::from(idx % 6)],
                )
            }
        }
    }
}
