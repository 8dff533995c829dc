#![forbid(unsafe_code)]

//! File logging.
//!
//! The UI owns stdout, so log output goes to a file. The filter comes from
//! `TTK_LOG_FILTER` (an `EnvFilter` directive such as `ttk_widgets=trace`)
//! and defaults to `info`.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Variable holding the log filter directive.
pub const FILTER_ENV: &str = "TTK_LOG_FILTER";

fn open(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// A subscriber appending plain (no ANSI) lines to `path`, filtered by
/// `directive`.
pub fn file_subscriber(path: &Path, directive: &str) -> std::io::Result<impl Subscriber + Send + Sync> {
    let file = open(path)?;
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    Ok(tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .finish())
}

/// Install the global subscriber writing to `path`.
///
/// Fails if the file cannot be opened or a global subscriber already exists.
pub fn init_file_logger(path: impl AsRef<Path>) -> ttk_core::Result<()> {
    let directive = std::env::var(FILTER_ENV).unwrap_or_else(|_| "info".to_string());
    let subscriber = file_subscriber(path.as_ref(), &directive)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    tracing::info!(path = %path.as_ref().display(), "file logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ttk.log");
        let subscriber = file_subscriber(&path, "debug").unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(frames = 3, "compositor idle");
            tracing::trace!("too chatty");
        });
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("compositor idle"), "{text}");
        assert!(text.contains("frames=3"), "{text}");
        assert!(!text.contains("too chatty"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn bad_directive_falls_back_to_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ttk.log");
        let subscriber = file_subscriber(&path, "ttk=loud").unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("kept");
            tracing::debug!("dropped");
        });
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("kept"));
        assert!(!text.contains("dropped"));
    }
}
