#![forbid(unsafe_code)]

//! Error kinds shared across the toolkit.

use std::fmt;

/// Failure raised by a signal receiver.
///
/// Receivers return `Result<(), SlotError>`; the first failing receiver stops
/// the emission and the error is handed back to whoever called `emit`.
#[derive(Debug)]
pub struct SlotError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SlotError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary error raised inside a receiver.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal receiver failed: {}", self.message)
    }
}

impl std::error::Error for SlotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A malformed textual input (key combo, SGR string, hex color, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What was being parsed.
    pub what: &'static str,
    /// The offending input, possibly truncated.
    pub input: String,
}

impl ParseError {
    pub fn new(what: &'static str, input: impl Into<String>) -> Self {
        let mut input = input.into();
        if input.len() > 64 {
            let mut cut = 64;
            while !input.is_char_boundary(cut) {
                cut -= 1;
            }
            input.truncate(cut);
        }
        Self { what, input }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.what, self.input)
    }
}

impl std::error::Error for ParseError {}

/// Top-level error type for ttk operations.
#[derive(Debug)]
pub enum Error {
    /// Malformed hex string or out-of-range RGB triple.
    InvalidColor(String),
    /// Negative or zero dimensions where they are not allowed.
    InvalidGeometry {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    /// An item is already owned by another layout, or a grid cell is taken.
    LayoutConflict(String),
    /// The target widget is not attached to the root.
    OutOfTree(String),
    /// Textual input could not be parsed.
    Parse(ParseError),
    /// A signal receiver failed during emission.
    Slot(SlotError),
    /// I/O failure during terminal operations.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(value) => write!(f, "invalid color: {value}"),
            Self::InvalidGeometry {
                x,
                y,
                width,
                height,
            } => write!(f, "invalid geometry: ({x}, {y}, {width}x{height})"),
            Self::LayoutConflict(msg) => write!(f, "layout conflict: {msg}"),
            Self::OutOfTree(what) => write!(f, "not attached to the widget tree: {what}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Slot(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Slot(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SlotError> for Error {
    fn from(err: SlotError) -> Self {
        Self::Slot(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

/// Standard result type for ttk APIs.
pub type Result<T> = std::result::Result<T, Error>;
