#![forbid(unsafe_code)]

//! Click gesture recognition.
//!
//! Terminals report only press/release/drag. [`ClickTracker`] upgrades that
//! stream with `DoubleClick` (second press on the same cell within the
//! interval) and `Tap` (a release that ends a press without dragging, tagged
//! with the running click count).

use std::time::{Duration, Instant};

use crate::event::{MouseButton, MouseEvent, MouseEventKind};
use crate::geometry::Point;

/// Default double-click interval.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ClickTracker {
    interval: Duration,
    last_press: Option<(Instant, Point, MouseButton)>,
    taps: u8,
    dragged: bool,
    pressed: bool,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_INTERVAL)
    }
}

impl ClickTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_press: None,
            taps: 0,
            dragged: false,
            pressed: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed one raw event and return the events to dispatch, in order.
    ///
    /// A press is always forwarded; a second press within the interval also
    /// yields a `DoubleClick`. A release is always forwarded and is followed
    /// by a `Tap` when no drag happened since the press.
    pub fn process(&mut self, event: MouseEvent, now: Instant) -> Vec<MouseEvent> {
        match event.kind {
            MouseEventKind::Press => {
                let pos = event.position();
                let repeat = matches!(
                    self.last_press,
                    Some((t, p, b)) if p == pos && b == event.button
                        && now.saturating_duration_since(t) <= self.interval
                );
                self.taps = if repeat { self.taps.saturating_add(1) } else { 1 };
                self.last_press = Some((now, pos, event.button));
                self.dragged = false;
                self.pressed = true;
                let mut out = vec![event.with_taps(self.taps)];
                if self.taps == 2 {
                    out.push(
                        MouseEvent {
                            kind: MouseEventKind::DoubleClick,
                            ..event
                        }
                        .with_taps(2),
                    );
                }
                out
            }
            MouseEventKind::Drag => {
                self.dragged = true;
                self.last_press = None;
                vec![event]
            }
            MouseEventKind::Release => {
                let was_pressed = std::mem::replace(&mut self.pressed, false);
                let mut out = vec![event];
                if was_pressed && !self.dragged {
                    out.push(
                        MouseEvent {
                            kind: MouseEventKind::Tap,
                            ..event
                        }
                        .with_taps(self.taps),
                    );
                }
                out
            }
            _ => vec![event],
        }
    }

    /// Forget any pending click sequence.
    pub fn reset(&mut self) {
        self.last_press = None;
        self.taps = 0;
        self.dragged = false;
        self.pressed = false;
    }
}
