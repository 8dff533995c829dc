#![forbid(unsafe_code)]

//! Easing curves and property animations.
//!
//! A [`PropertyAnimation`] interpolates between two values over a duration,
//! shaped by an [`EasingCurve`]. It keeps its own elapsed time; whoever owns
//! it calls [`Animation::tick`] with the time since the previous tick. The
//! compositor does this from an internal frame timer.

use std::f64::consts::PI;
use std::fmt;
use std::time::Duration;

use ttk_core::Point;
use ttk_core::signal::{Signal, SlotResult};

// ---------------------------------------------------------------------------
// Easing curves
// ---------------------------------------------------------------------------

/// Shape of an eased curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    Elastic,
    Back,
    Bounce,
}

/// Which half of the curve accelerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
    /// Fast start and end, slow middle.
    OutIn,
}

const SHAPES: [(Shape, &str); 10] = [
    (Shape::Quad, "Quad"),
    (Shape::Cubic, "Cubic"),
    (Shape::Quart, "Quart"),
    (Shape::Quint, "Quint"),
    (Shape::Sine, "Sine"),
    (Shape::Expo, "Expo"),
    (Shape::Circ, "Circ"),
    (Shape::Elastic, "Elastic"),
    (Shape::Back, "Back"),
    (Shape::Bounce, "Bounce"),
];

// Longest prefix first so "InOut" is not read as "In".
const MODES: [(Mode, &str); 4] = [
    (Mode::InOut, "InOut"),
    (Mode::OutIn, "OutIn"),
    (Mode::In, "In"),
    (Mode::Out, "Out"),
];

/// Maps progress `t` in `[0, 1]` to an eased value. Every curve maps 0 to 0
/// and 1 to 1; `Elastic` and `Back` overshoot in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EasingCurve {
    #[default]
    Linear,
    Eased(Shape, Mode),
}

impl EasingCurve {
    pub const fn new(shape: Shape, mode: Mode) -> Self {
        Self::Eased(shape, mode)
    }

    /// Parse a name such as `"Linear"`, `"InQuad"` or `"OutInBounce"`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "Linear" {
            return Some(Self::Linear);
        }
        let (mode, rest) = MODES
            .iter()
            .find_map(|(mode, prefix)| name.strip_prefix(prefix).map(|rest| (*mode, rest)))?;
        let shape = SHAPES.iter().find(|(_, n)| *n == rest)?.0;
        Some(Self::Eased(shape, mode))
    }

    /// Every curve, `Linear` first.
    pub fn all() -> impl Iterator<Item = Self> {
        std::iter::once(Self::Linear).chain(
            SHAPES
                .iter()
                .flat_map(|(shape, _)| MODES.iter().map(move |(mode, _)| Self::Eased(*shape, *mode))),
        )
    }

    /// Eased value at `t`, clamped into `[0, 1]` first.
    pub fn value(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::Eased(shape, Mode::In) => ease_in(shape, t),
            Self::Eased(shape, Mode::Out) => ease_out(shape, t),
            Self::Eased(shape, Mode::InOut) => {
                if t < 0.5 {
                    ease_in(shape, 2.0 * t) / 2.0
                } else {
                    1.0 - ease_in(shape, 2.0 - 2.0 * t) / 2.0
                }
            }
            Self::Eased(shape, Mode::OutIn) => {
                if t < 0.5 {
                    ease_out(shape, 2.0 * t) / 2.0
                } else {
                    0.5 + ease_in(shape, 2.0 * t - 1.0) / 2.0
                }
            }
        }
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::Eased(shape, mode) => {
                let mode = MODES.iter().find(|(m, _)| m == mode).map_or("", |(_, n)| *n);
                let shape = SHAPES.iter().find(|(s, _)| s == shape).map_or("", |(_, n)| *n);
                write!(f, "{mode}{shape}")
            }
        }
    }
}

fn ease_in(shape: Shape, t: f64) -> f64 {
    match shape {
        Shape::Quad => t * t,
        Shape::Cubic => t.powi(3),
        Shape::Quart => t.powi(4),
        Shape::Quint => t.powi(5),
        Shape::Sine => 1.0 - (t * PI / 2.0).cos(),
        Shape::Expo => {
            if t <= 0.0 {
                0.0
            } else {
                2f64.powf(10.0 * t - 10.0)
            }
        }
        Shape::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        Shape::Elastic => {
            if t <= 0.0 || t >= 1.0 {
                t
            } else {
                let c4 = 2.0 * PI / 3.0;
                -(2f64.powf(10.0 * t - 10.0)) * ((10.0 * t - 10.75) * c4).sin()
            }
        }
        Shape::Back => {
            let c1 = 1.70158;
            (c1 + 1.0) * t.powi(3) - c1 * t * t
        }
        Shape::Bounce => 1.0 - bounce_out(1.0 - t),
    }
}

fn ease_out(shape: Shape, t: f64) -> f64 {
    match shape {
        Shape::Bounce => bounce_out(t),
        _ => 1.0 - ease_in(shape, 1.0 - t),
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Values a [`PropertyAnimation`] can drive.
pub trait Interpolate: Clone + PartialEq + 'static {
    /// Value at `t` between `self` (0) and `to` (1). `t` may leave `[0, 1]`
    /// for overshooting curves.
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for i32 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        let v = f64::from(*self) + (f64::from(*to) - f64::from(*self)) * t;
        v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }
}

impl Interpolate for (i32, i32) {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        (self.0.lerp(&to.0, t), self.1.lerp(&to.1, t))
    }
}

impl Interpolate for Point {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Point {
            x: self.x.lerp(&to.x, t),
            y: self.y.lerp(&to.y, t),
        }
    }
}

// ---------------------------------------------------------------------------
// Animations
// ---------------------------------------------------------------------------

/// Something advanced by elapsed time.
pub trait Animation {
    /// Advance by `dt`, emitting whatever signals the step produces.
    fn tick(&mut self, dt: Duration) -> SlotResult;

    fn is_complete(&self) -> bool;

    /// Back to the start value, without emitting.
    fn reset(&mut self);
}

/// Animates a value from `start` to `end`.
///
/// `value_changed` fires on every tick that changes the value (including the
/// first tick, which reports the start value). `finished` fires once, on the
/// tick that reaches the end.
pub struct PropertyAnimation<T: Interpolate> {
    start: T,
    end: T,
    duration: Duration,
    elapsed: Duration,
    curve: EasingCurve,
    last: Option<T>,
    done: bool,
    pub value_changed: Signal<T>,
    pub finished: Signal<()>,
}

impl<T: Interpolate + fmt::Debug> fmt::Debug for PropertyAnimation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAnimation")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

impl<T: Interpolate> PropertyAnimation<T> {
    pub fn new(start: T, end: T, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            elapsed: Duration::ZERO,
            curve: EasingCurve::Linear,
            last: None,
            done: false,
            value_changed: Signal::new("valueChanged"),
            finished: Signal::new("finished"),
        }
    }

    #[must_use]
    pub fn with_curve(mut self, curve: EasingCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn curve(&self) -> EasingCurve {
        self.curve
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress in `[0, 1]`, before easing. A zero duration is
    /// complete immediately.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Interpolated value at the current time. Exactly `end` once complete.
    pub fn current_value(&self) -> T {
        let p = self.progress();
        if p >= 1.0 {
            return self.end.clone();
        }
        self.start.lerp(&self.end, self.curve.value(p))
    }
}

impl<T: Interpolate> Animation for PropertyAnimation<T> {
    fn tick(&mut self, dt: Duration) -> SlotResult {
        if self.done {
            return Ok(());
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let value = self.current_value();
        if self.last.as_ref() != Some(&value) {
            self.last = Some(value.clone());
            self.value_changed.emit(&value)?;
        }
        if self.progress() >= 1.0 {
            self.done = true;
            self.finished.emit(&())?;
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.last = None;
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    const EPS: f64 = 1e-9;

    // ── curves ──

    #[test]
    fn every_curve_pins_the_endpoints() {
        for curve in EasingCurve::all() {
            assert!(curve.value(0.0).abs() < EPS, "{curve} at 0");
            assert!((curve.value(1.0) - 1.0).abs() < EPS, "{curve} at 1");
        }
        assert_eq!(EasingCurve::all().count(), 41);
    }

    #[test]
    fn in_is_slow_and_out_is_fast_at_the_start() {
        let t = 0.25;
        let linear = EasingCurve::Linear.value(t);
        assert!(EasingCurve::new(Shape::Quad, Mode::In).value(t) < linear);
        assert!(EasingCurve::new(Shape::Quad, Mode::Out).value(t) > linear);
        assert!((EasingCurve::new(Shape::Cubic, Mode::InOut).value(0.5) - 0.5).abs() < EPS);
        assert!((EasingCurve::new(Shape::Sine, Mode::OutIn).value(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn back_overshoots_below_zero() {
        assert!(EasingCurve::new(Shape::Back, Mode::In).value(0.2) < 0.0);
        assert!(EasingCurve::new(Shape::Back, Mode::Out).value(0.8) > 1.0);
    }

    #[test]
    fn names_round_trip() {
        for curve in EasingCurve::all() {
            assert_eq!(EasingCurve::from_name(&curve.to_string()), Some(curve));
        }
        assert_eq!(
            EasingCurve::from_name("InOutBounce"),
            Some(EasingCurve::new(Shape::Bounce, Mode::InOut))
        );
        assert_eq!(EasingCurve::from_name("Sideways"), None);
        assert_eq!(EasingCurve::from_name("InWobble"), None);
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let curve = EasingCurve::new(Shape::Quad, Mode::In);
        assert_eq!(curve.value(-3.0), 0.0);
        assert_eq!(curve.value(7.0), 1.0);
        assert_eq!(curve.value(f64::NAN), 0.0);
    }

    // ── property animation ──

    fn recorder<T: Interpolate>(anim: &PropertyAnimation<T>) -> (Rc<RefCell<Vec<T>>>, Rc<RefCell<u32>>) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let finished = Rc::new(RefCell::new(0));
        let v = Rc::clone(&values);
        anim.value_changed.connect_ok(move |x: &T| v.borrow_mut().push(x.clone()));
        let f = Rc::clone(&finished);
        anim.finished.connect_ok(move |_: &()| *f.borrow_mut() += 1);
        (values, finished)
    }

    #[test]
    fn linear_position_animation() {
        let mut anim = PropertyAnimation::new((0, 0), (10, 20), Duration::from_millis(100));
        let (values, finished) = recorder(&anim);
        anim.tick(Duration::ZERO).unwrap();
        anim.tick(Duration::from_millis(50)).unwrap();
        anim.tick(Duration::from_millis(50)).unwrap();
        anim.tick(Duration::from_millis(50)).unwrap();
        assert_eq!(*values.borrow(), [(0, 0), (5, 10), (10, 20)]);
        assert_eq!(*finished.borrow(), 1);
        assert!(anim.is_complete());
    }

    #[test]
    fn unchanged_values_are_not_re_emitted() {
        let mut anim = PropertyAnimation::new(0i32, 1, Duration::from_millis(100));
        let (values, _) = recorder(&anim);
        for _ in 0..10 {
            anim.tick(Duration::from_millis(10)).unwrap();
        }
        assert_eq!(*values.borrow(), [0, 1]);
    }

    #[test]
    fn zero_duration_jumps_to_the_end() {
        let mut anim = PropertyAnimation::new(1.0, 4.0, Duration::ZERO);
        let (values, finished) = recorder(&anim);
        anim.tick(Duration::ZERO).unwrap();
        assert_eq!(*values.borrow(), [4.0]);
        assert_eq!(*finished.borrow(), 1);
    }

    #[test]
    fn reset_replays_from_the_start() {
        let mut anim = PropertyAnimation::new(0.0, 1.0, Duration::from_millis(10));
        let (values, finished) = recorder(&anim);
        anim.tick(Duration::from_millis(20)).unwrap();
        anim.reset();
        assert!(!anim.is_complete());
        anim.tick(Duration::ZERO).unwrap();
        assert_eq!(*values.borrow(), [1.0, 0.0]);
        assert_eq!(*finished.borrow(), 1);
    }

    #[test]
    fn receiver_error_stops_the_tick() {
        let mut anim = PropertyAnimation::new(0.0, 1.0, Duration::from_millis(10));
        anim.value_changed
            .connect(|_: &f64| Err(ttk_core::SlotError::new("nope")));
        assert!(anim.tick(Duration::from_millis(5)).is_err());
    }

    proptest! {
        #[test]
        fn eased_values_stay_near_the_unit_range(t in 0.0f64..=1.0) {
            for curve in EasingCurve::all() {
                let v = curve.value(t);
                prop_assert!((-0.5..=1.5).contains(&v), "{} at {}: {}", curve, t, v);
            }
        }
    }
}
