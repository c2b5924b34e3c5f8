//! Theme preference values.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use crate::config::ThemeConfig;

/// User theme choice. Light unless something says dark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Persisted form: `"true"` for dark, `"false"` for light.
    #[must_use]
    pub fn as_flag(self) -> &'static str {
        if self.is_dark() { "true" } else { "false" }
    }

    /// Icon class list shown on the toggle for this theme.
    #[must_use]
    pub fn icon_class(self, config: &ThemeConfig) -> &str {
        match self {
            Self::Light => &config.light_icon,
            Self::Dark => &config.dark_icon,
        }
    }
}
