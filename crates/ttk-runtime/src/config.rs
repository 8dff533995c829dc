#![forbid(unsafe_code)]

//! Application configuration.
//!
//! [`AppConfig`] is built with `with_*` methods over a default, or from the
//! environment:
//!
//! | Variable | Values | Field |
//! |----------|--------|-------|
//! | `TTK_MOUSE` | `off`, `click`, `drag`, `any` | `mouse` |
//! | `TTK_COLOR` | `mono`, `16`, `256`, `truecolor` | `color_profile` |
//! | `TTK_FPS` | frames per second, `1..=1000` | `frame_interval` |
//! | `TTK_LOG` | file path | `log_path` |
//! | `TTK_NO_ALTSCREEN` | any non-empty value | `screen_mode` |
//!
//! Values that do not parse are ignored.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use ttk_style::ColorProfile;

pub use ttk_render::ansi::MouseTracking as MouseMode;

/// Where the UI is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    /// The alternate screen, whole terminal.
    #[default]
    AltScreen,
    /// The bottom `height` rows of the normal screen, below prior output.
    Inline { height: u16 },
}

/// How many colors to emit. `Auto` detects from `COLORTERM`/`TERM`/`NO_COLOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Fixed(ColorProfile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub screen_mode: ScreenMode,
    pub mouse: MouseMode,
    pub bracketed_paste: bool,
    pub focus_reporting: bool,
    /// Minimum time between two frames.
    pub frame_interval: Duration,
    /// Longest wait for input when no timer is due.
    pub poll_timeout: Duration,
    pub color_profile: ColorMode,
    /// Log file; `None` disables file logging.
    pub log_path: Option<PathBuf>,
    pub title: Option<String>,
    /// Second press within this interval on the same cell is a double click.
    pub double_click_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            screen_mode: ScreenMode::AltScreen,
            mouse: MouseMode::Drag,
            bracketed_paste: true,
            focus_reporting: false,
            frame_interval: Duration::from_micros(16_667),
            poll_timeout: Duration::from_millis(100),
            color_profile: ColorMode::Auto,
            log_path: None,
            title: None,
            double_click_interval: Duration::from_millis(400),
        }
    }
}

impl AppConfig {
    /// Whole-terminal application on the alternate screen.
    pub fn fullscreen() -> Self {
        Self::default()
    }

    /// `height` rows under the current output, scrollback kept.
    pub fn inline(height: u16) -> Self {
        Self {
            screen_mode: ScreenMode::Inline { height },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mouse(mut self, mouse: MouseMode) -> Self {
        self.mouse = mouse;
        self
    }

    #[must_use]
    pub fn with_bracketed_paste(mut self, enabled: bool) -> Self {
        self.bracketed_paste = enabled;
        self
    }

    #[must_use]
    pub fn with_focus_reporting(mut self, enabled: bool) -> Self {
        self.focus_reporting = enabled;
        self
    }

    /// Cap the frame rate. Zero is treated as one frame per second.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.frame_interval = Duration::from_secs(1) / fps.max(1);
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_color_profile(mut self, profile: ColorProfile) -> Self {
        self.color_profile = ColorMode::Fixed(profile);
        self
    }

    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Defaults overridden by `TTK_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `TTK_*` variables read through `get`.
    pub fn from_env_with(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = get("TTK_MOUSE") {
            match parse_mouse(&value) {
                Some(mouse) => config.mouse = mouse,
                None => debug!(value = %value, "ignoring TTK_MOUSE"),
            }
        }
        if let Some(value) = get("TTK_COLOR") {
            match ColorProfile::from_name(&value) {
                Some(profile) => config.color_profile = ColorMode::Fixed(profile),
                None => debug!(value = %value, "ignoring TTK_COLOR"),
            }
        }
        if let Some(value) = get("TTK_FPS") {
            match value.trim().parse::<u32>() {
                Ok(fps) if (1..=1000).contains(&fps) => config = config.with_fps(fps),
                _ => debug!(value = %value, "ignoring TTK_FPS"),
            }
        }
        if let Some(path) = get("TTK_LOG").filter(|p| !p.trim().is_empty()) {
            config.log_path = Some(PathBuf::from(path));
        }
        if get("TTK_NO_ALTSCREEN").is_some_and(|v| !v.is_empty()) {
            config.screen_mode = ScreenMode::Inline { height: 10 };
        }
        config
    }

    /// The concrete profile, detecting from the environment for `Auto`.
    pub fn resolve_color_profile(&self, get: impl Fn(&str) -> Option<String>) -> ColorProfile {
        match self.color_profile {
            ColorMode::Fixed(profile) => profile,
            ColorMode::Auto => ColorProfile::detect_with(get),
        }
    }
}

fn parse_mouse(value: &str) -> Option<MouseMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "none" | "0" => Some(MouseMode::Off),
        "click" => Some(MouseMode::Click),
        "drag" => Some(MouseMode::Drag),
        "any" | "all" => Some(MouseMode::Any),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── presets ──

    #[test]
    fn presets() {
        assert_eq!(AppConfig::fullscreen().screen_mode, ScreenMode::AltScreen);
        assert_eq!(
            AppConfig::inline(6).screen_mode,
            ScreenMode::Inline { height: 6 }
        );
    }

    #[test]
    fn builder_chain() {
        let config = AppConfig::default()
            .with_mouse(MouseMode::Any)
            .with_fps(30)
            .with_title("demo")
            .with_color_profile(ColorProfile::Ansi256);
        assert_eq!(config.mouse, MouseMode::Any);
        assert_eq!(config.frame_interval, Duration::from_secs(1) / 30);
        assert_eq!(config.title.as_deref(), Some("demo"));
        assert_eq!(config.resolve_color_profile(|_| None), ColorProfile::Ansi256);
    }

    // ── environment ──

    #[test]
    fn env_overrides_defaults() {
        let config = AppConfig::from_env_with(env(&[
            ("TTK_MOUSE", "click"),
            ("TTK_COLOR", "16"),
            ("TTK_FPS", "20"),
            ("TTK_LOG", "/tmp/ttk.log"),
            ("TTK_NO_ALTSCREEN", "1"),
        ]));
        assert_eq!(config.mouse, MouseMode::Click);
        assert_eq!(config.color_profile, ColorMode::Fixed(ColorProfile::Ansi16));
        assert_eq!(config.frame_interval, Duration::from_millis(50));
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/ttk.log")));
        assert!(matches!(config.screen_mode, ScreenMode::Inline { .. }));
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = AppConfig::from_env_with(env(&[
            ("TTK_MOUSE", "sometimes"),
            ("TTK_COLOR", "infrared"),
            ("TTK_FPS", "0"),
            ("TTK_LOG", "  "),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn auto_profile_follows_colorterm() {
        let config = AppConfig::default();
        let profile = config.resolve_color_profile(env(&[("COLORTERM", "truecolor")]));
        assert_eq!(profile, ColorProfile::TrueColor);
        let profile = config.resolve_color_profile(env(&[("NO_COLOR", "1")]));
        assert_eq!(profile, ColorProfile::Mono);
    }
}
