#![forbid(unsafe_code)]

//! Per-state widget styles.
//!
//! A [`Style`] is a small set of named colors (`color`, `borderColor`,
//! `selectedColor`, ...). A [`StyleMap`] holds one style per
//! [`WidgetState`]; lookups for a state fall back to the `Default` entry
//! for any key the state does not override.
//!
//! ```
//! use ttk_style::{Color, StyleMap, WidgetState};
//! use ttk_style::style::Style;
//!
//! let map = StyleMap::new(Style::new().with("color", Color::RESET))
//!     .with_state(WidgetState::Focus, Style::new().with("color", Color::BOLD));
//! assert_eq!(map.style_for(WidgetState::Focus).color("color"), Color::BOLD);
//! assert_eq!(map.style_for(WidgetState::Hover).color("color"), Color::RESET);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::color::Color;

/// Visual state used to pick a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetState {
    Default,
    Disabled,
    Focus,
    Hover,
    Clicked,
    Checked,
    Unchecked,
}

impl WidgetState {
    /// Pick the dominant state from widget flags.
    ///
    /// Precedence: disabled, clicked, focus, hover, checked/unchecked, default.
    pub fn resolve(
        enabled: bool,
        clicked: bool,
        focused: bool,
        hovered: bool,
        checked: Option<bool>,
    ) -> Self {
        if !enabled {
            Self::Disabled
        } else if clicked {
            Self::Clicked
        } else if focused {
            Self::Focus
        } else if hovered {
            Self::Hover
        } else {
            match checked {
                Some(true) => Self::Checked,
                Some(false) => Self::Unchecked,
                None => Self::Default,
            }
        }
    }
}

/// Named colors for one state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    colors: BTreeMap<String, Color>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, color: Color) -> Self {
        self.colors.insert(key.into(), color);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, color: Color) {
        self.colors.insert(key.into(), color);
    }

    pub fn get(&self, key: &str) -> Option<&Color> {
        self.colors.get(key)
    }

    /// Color for `key`, or [`Color::RESET`] when absent.
    pub fn color(&self, key: &str) -> Color {
        self.colors.get(key).cloned().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    /// `other` overrides keys present in both.
    #[must_use]
    pub fn merge(&self, other: &Style) -> Style {
        let mut merged = self.clone();
        for (k, v) in &other.colors {
            merged.colors.insert(k.clone(), v.clone());
        }
        merged
    }
}

/// Styles keyed by widget state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleMap {
    states: HashMap<WidgetState, Style>,
}

impl StyleMap {
    pub fn new(default: Style) -> Self {
        let mut states = HashMap::new();
        states.insert(WidgetState::Default, default);
        Self { states }
    }

    #[must_use]
    pub fn with_state(mut self, state: WidgetState, style: Style) -> Self {
        self.states.insert(state, style);
        self
    }

    pub fn set_state(&mut self, state: WidgetState, style: Style) {
        self.states.insert(state, style);
    }

    /// Effective style for `state`: its overrides layered on `Default`.
    pub fn style_for(&self, state: WidgetState) -> Style {
        let base = self.states.get(&WidgetState::Default).cloned().unwrap_or_default();
        match (state, self.states.get(&state)) {
            (WidgetState::Default, _) | (_, None) => base,
            (_, Some(over)) => base.merge(over),
        }
    }

    pub fn has_state(&self, state: WidgetState) -> bool {
        self.states.contains_key(&state)
    }

    /// Layer another map on top: per state, keys of `other` win.
    #[must_use]
    pub fn merge(&self, other: &StyleMap) -> StyleMap {
        let mut out = self.clone();
        for (state, style) in &other.states {
            let merged = match out.states.get(state) {
                Some(mine) => mine.merge(style),
                None => style.clone(),
            };
            out.states.insert(*state, merged);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Mods;

    fn map() -> StyleMap {
        StyleMap::new(
            Style::new()
                .with("color", Color::RESET)
                .with("borderColor", Color::mods(Mods::FAINT)),
        )
        .with_state(WidgetState::Disabled, Style::new().with("color", Color::FAINT))
    }

    #[test]
    fn state_overrides_fall_back_to_default() {
        let disabled = map().style_for(WidgetState::Disabled);
        assert_eq!(disabled.color("color"), Color::FAINT);
        assert_eq!(disabled.color("borderColor"), Color::mods(Mods::FAINT));
        assert_eq!(map().style_for(WidgetState::Clicked), map().style_for(WidgetState::Default));
    }

    #[test]
    fn missing_key_is_reset() {
        assert_eq!(map().style_for(WidgetState::Default).color("nope"), Color::RESET);
    }

    #[test]
    fn resolve_precedence() {
        assert_eq!(
            WidgetState::resolve(false, true, true, true, Some(true)),
            WidgetState::Disabled
        );
        assert_eq!(
            WidgetState::resolve(true, false, true, true, None),
            WidgetState::Focus
        );
        assert_eq!(
            WidgetState::resolve(true, false, false, false, Some(false)),
            WidgetState::Unchecked
        );
    }

    #[test]
    fn merge_layers_maps() {
        let over = StyleMap::new(Style::new().with("color", Color::BOLD));
        let merged = map().merge(&over);
        let def = merged.style_for(WidgetState::Default);
        assert_eq!(def.color("color"), Color::BOLD);
        assert_eq!(def.color("borderColor"), Color::mods(Mods::FAINT));
        assert!(merged.has_state(WidgetState::Disabled));
    }
}
