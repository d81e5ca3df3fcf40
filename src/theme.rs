//! Light/dark theme preference.
//!
//! An explicit choice is persisted under [`THEME_STORAGE_KEY`] and always
//! wins. Without one, the theme follows the OS color-scheme preference,
//! including live changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PaletteError::Config(format!("unknown theme: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreference {
    active: Theme,
    stored: Option<Theme>,
}

impl ThemePreference {
    /// Resolve the startup theme from the stored value and the OS preference.
    ///
    /// Unrecognised stored values count as absent.
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        let stored = stored.and_then(|s| s.parse::<Theme>().ok());
        Self {
            active: stored.unwrap_or(Theme::from_dark(prefers_dark)),
            stored,
        }
    }

    /// Explicit user choice. Returns the value to persist.
    pub fn choose(&mut self, theme: Theme) -> Theme {
        self.active = theme;
        self.stored = Some(theme);
        theme
    }

    /// OS preference changed. Ignored once the user has chosen.
    pub fn system_changed(&mut self, prefers_dark: bool) -> bool {
        if self.stored.is_some() {
            return false;
        }
        let theme = Theme::from_dark(prefers_dark);
        let changed = theme != self.active;
        self.active = theme;
        changed
    }

    pub fn active(&self) -> Theme {
        self.active
    }

    pub fn is_explicit(&self) -> bool {
        self.stored.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_value_wins_over_os() {
        let pref = ThemePreference::resolve(Some("light"), true);
        assert_eq!(pref.active(), Theme::Light);
        assert!(pref.is_explicit());
    }

    #[test]
    fn os_preference_used_when_nothing_stored() {
        assert_eq!(ThemePreference::resolve(None, true).active(), Theme::Dark);
        assert_eq!(ThemePreference::resolve(None, false).active(), Theme::Light);
        assert_eq!(ThemePreference::resolve(Some("sepia"), true).active(), Theme::Dark);
    }

    #[test]
    fn os_changes_followed_until_user_chooses() {
        let mut pref = ThemePreference::resolve(None, false);
        assert!(pref.system_changed(true));
        assert_eq!(pref.active(), Theme::Dark);

        assert_eq!(pref.choose(Theme::Light), Theme::Light);
        assert!(!pref.system_changed(true));
        assert_eq!(pref.active(), Theme::Light);
    }
}
