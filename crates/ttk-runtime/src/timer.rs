#![forbid(unsafe_code)]

//! Deadline-ordered timers.
//!
//! [`TimerQueue`] only tracks deadlines; the compositor asks it for the next
//! deadline to bound its wait, then calls [`TimerQueue::fire_due`] and emits
//! the matching signals itself.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

/// Handle of a started timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    deadline: Instant,
    seq: u64,
    id: TimerId,
    interval: Option<Duration>,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    live: HashSet<TimerId>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer firing `delay` after `now`, then every `delay` again if
    /// `repeat` is set. A repeating timer with a zero delay fires once per
    /// [`fire_due`](Self::fire_due) call.
    pub fn start(&mut self, now: Instant, delay: Duration, repeat: bool) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.push(now + delay, id, repeat.then_some(delay));
        id
    }

    /// Cancel a timer. Returns `false` if it already fired (one-shot) or was
    /// stopped before.
    pub fn stop(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.live.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Earliest deadline among live timers.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stopped();
        self.heap.peek().map(|Reverse(e)| e.deadline)
    }

    /// Pop every timer due at `now`, in deadline order (start order for equal
    /// deadlines). Repeating timers are rescheduled from their previous
    /// deadline, so a late tick does not drift the period, and fire at most
    /// once per call.
    pub fn fire_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        let mut again = Vec::new();
        loop {
            self.discard_stopped();
            match self.heap.peek() {
                Some(Reverse(e)) if e.deadline <= now => {}
                _ => break,
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            fired.push(entry.id);
            match entry.interval {
                Some(interval) => {
                    let mut next = entry.deadline + interval;
                    if next <= now {
                        next = now + interval;
                    }
                    again.push((next, entry.id, interval));
                }
                None => {
                    self.live.remove(&entry.id);
                }
            }
        }
        for (deadline, id, interval) in again {
            self.push(deadline, id, Some(interval));
        }
        fired
    }

    fn push(&mut self, deadline: Instant, id: TimerId, interval: Option<Duration>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            deadline,
            seq,
            id,
            interval,
        }));
    }

    fn discard_stopped(&mut self) {
        while let Some(Reverse(e)) = self.heap.peek() {
            if self.live.contains(&e.id) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ── ordering ──

    #[test]
    fn fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let late = q.start(t0, ms(30), false);
        let early = q.start(t0, ms(10), false);
        let mid = q.start(t0, ms(20), false);
        assert_eq!(q.next_deadline(), Some(t0 + ms(10)));
        assert!(q.fire_due(t0 + ms(5)).is_empty());
        assert_eq!(q.fire_due(t0 + ms(30)), [early, mid, late]);
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn equal_deadlines_fire_in_start_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let ids: Vec<_> = (0..4).map(|_| q.start(t0, ms(5), false)).collect();
        assert_eq!(q.fire_due(t0 + ms(5)), ids);
    }

    // ── repeat and stop ──

    #[test]
    fn repeating_timer_keeps_its_period() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let id = q.start(t0, ms(10), true);
        assert_eq!(q.fire_due(t0 + ms(12)), [id]);
        assert_eq!(q.next_deadline(), Some(t0 + ms(20)));
        // A long stall fires once and reschedules from now.
        assert_eq!(q.fire_due(t0 + ms(100)), [id]);
        assert_eq!(q.next_deadline(), Some(t0 + ms(110)));
        assert!(q.is_active(id));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let a = q.start(t0, ms(10), true);
        let b = q.start(t0, ms(20), false);
        assert!(q.stop(a));
        assert!(!q.stop(a));
        assert_eq!(q.next_deadline(), Some(t0 + ms(20)));
        assert_eq!(q.fire_due(t0 + ms(50)), [b]);
        assert!(!q.stop(b));
    }

    proptest! {
        #[test]
        fn one_shots_fire_exactly_once_sorted(delays in prop::collection::vec(0u64..100, 1..20)) {
            let t0 = Instant::now();
            let mut q = TimerQueue::new();
            let ids: Vec<_> = delays.iter().map(|d| q.start(t0, ms(*d), false)).collect();
            let fired = q.fire_due(t0 + ms(100));
            prop_assert_eq!(fired.len(), ids.len());
            let mut expected: Vec<_> = ids.iter().zip(&delays).map(|(id, d)| (*d, *id)).collect();
            expected.sort();
            let expected: Vec<_> = expected.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(fired, expected);
            prop_assert!(q.fire_due(t0 + ms(1000)).is_empty());
        }
    }
}
