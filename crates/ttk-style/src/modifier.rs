#![forbid(unsafe_code)]

//! Per-cell color modifiers (gradients).
//!
//! A modifier rides along inside a [`Color`] and is resolved to a concrete
//! color for each cell as it is drawn.

use crate::color::{Color, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Step gradient: every row (or column) shifts each channel by
/// `increment * |val + coord| / step`, clamped to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gradient {
    pub fg_increment: i32,
    pub bg_increment: i32,
    pub orientation: Orientation,
    pub val: i32,
    pub step: i32,
}

impl Gradient {
    pub fn new(increment: i32) -> Self {
        Self {
            fg_increment: increment,
            bg_increment: increment,
            orientation: Orientation::Vertical,
            val: 0,
            step: 1,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    fn shift(&self, c: Rgb, incr: i32, coord: i32) -> Rgb {
        let step = self.step.max(1);
        let delta = (incr * (self.val + coord).abs()).div_euclid(step);
        let ch = |v: u8| (i32::from(v) + delta).clamp(0, 255) as u8;
        Rgb::new(ch(c.r), ch(c.g), ch(c.b))
    }
}

/// Linear blend from the base color towards `target` along `direction`,
/// starting at `base_pos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinearGradient {
    pub base_pos: (i32, i32),
    pub direction: (i32, i32),
    pub target: Color,
}

impl LinearGradient {
    pub fn new(base_pos: (i32, i32), direction: (i32, i32), target: Color) -> Self {
        Self {
            base_pos,
            direction,
            target,
        }
    }

    fn apply(&self, x: i32, y: i32, base: &Color) -> Color {
        let (dx, dy) = self.direction;
        let len2 = dx * dx + dy * dy;
        if len2 == 0 {
            return base.clone();
        }
        let prod = (x - self.base_pos.0) * dx + (y - self.base_pos.1) * dy;
        let beta = f64::from(prod) / f64::from(len2);
        if beta <= 0.0 {
            return base.clone();
        }
        if beta >= 1.0 {
            return self.target.clone();
        }
        let alpha = 1.0 - beta;
        let mix = |a: Option<Rgb>, b: Option<Rgb>| match (a, b) {
            (Some(a), Some(b)) => {
                let ch = |p: u8, q: u8| (alpha * f64::from(p) + beta * f64::from(q)) as u8;
                Some(Rgb::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b)))
            }
            (a, _) => a,
        };
        base.clone()
            .with_fg(mix(base.foreground(), self.target.foreground()))
            .with_bg(mix(base.background(), self.target.background()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorModifier {
    Gradient(Gradient),
    Linear(LinearGradient),
}

impl ColorModifier {
    /// Resolve for cell `(x, y)`. `base` carries no modifier.
    pub fn apply(&self, x: i32, y: i32, base: &Color) -> Color {
        match self {
            Self::Gradient(g) => {
                let coord = match g.orientation {
                    Orientation::Horizontal => x,
                    Orientation::Vertical => y,
                };
                base.clone()
                    .with_fg(base.foreground().map(|c| g.shift(c, g.fg_increment, coord)))
                    .with_bg(base.background().map(|c| g.shift(c, g.bg_increment, coord)))
            }
            Self::Linear(l) => l.apply(x, y, base),
        }
    }

    /// Copy with new runtime offset/step (only meaningful for step gradients).
    pub fn with_param(&self, val: i32, step: i32) -> Self {
        match self {
            Self::Gradient(g) => Self::Gradient(Gradient { val, step, ..*g }),
            other => other.clone(),
        }
    }
}

impl From<Gradient> for ColorModifier {
    fn from(g: Gradient) -> Self {
        Self::Gradient(g)
    }
}

impl From<LinearGradient> for ColorModifier {
    fn from(l: LinearGradient) -> Self {
        Self::Linear(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_gradient_brightens_per_row() {
        let base = Color::bg("#102030")
            .expect("hex")
            .with_modifier(Gradient::new(10).into());
        assert_eq!(base.resolve(0, 0).background(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(base.resolve(5, 2).background(), Some(Rgb::new(36, 52, 68)));
        assert!(base.resolve(0, 2).color_modifier().is_none());
    }

    #[test]
    fn gradient_clamps_channels() {
        let c = Color::fg("#F0F0F0")
            .expect("hex")
            .with_modifier(Gradient::new(100).with_orientation(Orientation::Horizontal).into());
        assert_eq!(c.resolve(3, 0).foreground(), Some(Rgb::WHITE));
        let dark = Color::fg("#101010")
            .expect("hex")
            .with_modifier(Gradient::new(-100).into());
        assert_eq!(dark.resolve(0, 4).foreground(), Some(Rgb::BLACK));
    }

    #[test]
    fn step_divides_increment() {
        let c = Color::fg("#000000")
            .expect("hex")
            .with_modifier(Gradient::new(10).into())
            .with_modifier_param(0, 2);
        assert_eq!(c.resolve(0, 3).foreground(), Some(Rgb::new(15, 15, 15)));
    }

    #[test]
    fn linear_gradient_blends_between_endpoints() {
        let target = Color::fg("#FFFFFF").expect("hex");
        let lin = LinearGradient::new((0, 0), (10, 0), target.clone());
        let base = Color::fg("#000000").expect("hex").with_modifier(lin.into());
        assert_eq!(base.resolve(-3, 0).foreground(), Some(Rgb::BLACK));
        assert_eq!(base.resolve(10, 0), target);
        let mid = base.resolve(5, 7).foreground().expect("fg");
        assert_eq!(mid, Rgb::new(127, 127, 127));
    }
}
