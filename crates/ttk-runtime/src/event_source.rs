#![forbid(unsafe_code)]

//! Where input events come from.
//!
//! The compositor only needs to wait for the next event with a timeout and
//! to know the screen size. [`CrosstermEventSource`] reads the real terminal;
//! [`HeadlessEventSource`] replays a script, for tests and recordings.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use tracing::trace;
use ttk_core::event::Event;

pub trait EventSource {
    /// Wait up to `timeout` for one event. `Ok(None)` on timeout.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    /// Screen size in (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Whether no event will ever arrive again.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Decoded terminal input from crossterm.
#[derive(Debug, Default)]
pub struct CrosstermEventSource;

impl CrosstermEventSource {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for CrosstermEventSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        let raw = crossterm::event::read()?;
        let event = Event::from_crossterm(raw);
        if event.is_none() {
            trace!("ignored terminal event");
        }
        Ok(event)
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

/// A scripted event queue with a settable screen size.
///
/// Queued events are returned without waiting. Once the queue is empty the
/// source is closed, unless it was made with [`open`](Self::open), in which
/// case `poll` sleeps for the timeout like an idle terminal.
#[derive(Debug)]
pub struct HeadlessEventSource {
    events: VecDeque<Event>,
    size: (u16, u16),
    stay_open: bool,
}

impl HeadlessEventSource {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            events: VecDeque::new(),
            size: (width, height),
            stay_open: false,
        }
    }

    /// A source that idles instead of closing when the script runs out.
    pub fn open(width: u16, height: u16) -> Self {
        Self {
            stay_open: true,
            ..Self::new(width, height)
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for HeadlessEventSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => {
                if let Event::Resize { width, height } = event {
                    self.size = (width, height);
                }
                Ok(Some(event))
            }
            None => {
                if self.stay_open && !timeout.is_zero() {
                    std::thread::sleep(timeout);
                }
                Ok(None)
            }
        }
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn is_closed(&self) -> bool {
        !self.stay_open && self.events.is_empty()
    }
}
