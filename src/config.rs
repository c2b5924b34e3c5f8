//! Page configuration: selectors, class names, and timing for every controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Markup is owned by server templates and varies per page. Defaults describe
//! the stock blog templates; a page can override any subset through an inline
//! JSON block (see [`CONFIG_ELEMENT_ID`]).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Id of the optional `<script type="application/json">` override block.
pub const CONFIG_ELEMENT_ID: &str = "page-interactions-config";

/// Placeholder substituted with the content item id in [`LikeConfig::endpoint`].
pub const POST_ID_PLACEHOLDER: &str = "{post_id}";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub theme: ThemeConfig,
    pub preference: PreferenceConfig,
    pub nav: NavConfig,
    pub dismiss: DismissConfig,
    pub scroll: ScrollConfig,
    pub like: LikeConfig,
}

/// Theme toggle markup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub toggle_id: String,
    /// Selector for the icon inside the toggle.
    pub icon_selector: String,
    /// Class placed on the root element while dark mode is active.
    pub dark_class: String,
    /// Icon class list shown while dark (offers the way back to light).
    pub dark_icon: String,
    pub light_icon: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            toggle_id: "darkModeToggle".to_owned(),
            icon_selector: "i".to_owned(),
            dark_class: "dark".to_owned(),
            dark_icon: "fas fa-sun".to_owned(),
            light_icon: "fas fa-moon".to_owned(),
        }
    }
}

/// Where the theme preference is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub storage_key: String,
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_max_age_secs: u64,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            storage_key: "darkMode".to_owned(),
            cookie_name: "dark_mode".to_owned(),
            cookie_path: "/".to_owned(),
            cookie_max_age_secs: 31_536_000,
        }
    }
}

/// Mobile navigation menu and its per-item dropdowns.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub toggle_id: String,
    pub panel_id: String,
    /// Links inside the panel that close the menu when clicked.
    pub link_selector: String,
    pub open_class: String,
    /// Widths at or below this are treated as mobile.
    pub breakpoint_px: f64,
    pub dropdown_trigger_selector: String,
    pub dropdown_panel_selector: String,
    /// When set, clicks anywhere inside this wrapper never count as outside.
    pub container_selector: Option<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            toggle_id: "navToggle".to_owned(),
            panel_id: "navLinks".to_owned(),
            link_selector: "a".to_owned(),
            open_class: "active".to_owned(),
            breakpoint_px: 768.0,
            dropdown_trigger_selector: ".dropdown-toggle".to_owned(),
            dropdown_panel_selector: ".dropdown-menu".to_owned(),
            container_selector: None,
        }
    }
}

/// Hover-group dropdowns closed by clicks outside their wrapper.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DismissConfig {
    pub container_selector: String,
    pub panel_selector: String,
    pub visible_classes: Vec<String>,
    pub hidden_classes: Vec<String>,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            container_selector: ".group".to_owned(),
            panel_selector: ".dropdown-panel".to_owned(),
            visible_classes: vec!["opacity-100".to_owned(), "visible".to_owned()],
            hidden_classes: vec!["opacity-0".to_owned(), "invisible".to_owned()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub anchor_selector: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { anchor_selector: "a[href^=\"#\"]".to_owned() }
    }
}

/// Like controls and the endpoint they post to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LikeConfig {
    pub button_selector: String,
    pub post_id_attribute: String,
    pub count_selector: String,
    pub liked_class: String,
    pub liked_duration_ms: u64,
    /// Path template containing [`POST_ID_PLACEHOLDER`].
    pub endpoint: String,
}

impl Default for LikeConfig {
    fn default() -> Self {
        Self {
            button_selector: ".like-btn".to_owned(),
            post_id_attribute: "data-post-id".to_owned(),
            count_selector: ".like-count".to_owned(),
            liked_class: "liked".to_owned(),
            liked_duration_ms: 1000,
            endpoint: "/like-post/{post_id}".to_owned(),
        }
    }
}

impl LikeConfig {
    /// Build the request path for one content item.
    #[must_use]
    pub fn endpoint_for(&self, post_id: &str) -> String {
        self.endpoint.replace(POST_ID_PLACEHOLDER, post_id)
    }

    #[must_use]
    pub fn liked_duration(&self) -> Duration {
        Duration::from_millis(self.liked_duration_ms)
    }
}

impl PageConfig {
    /// Parse and validate an override block. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value cannot work at runtime.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but would break a controller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.nav.breakpoint_px.is_finite() && self.nav.breakpoint_px > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "nav.breakpoint_px must be positive, got {}",
                self.nav.breakpoint_px
            )));
        }
        if !self.like.endpoint.contains(POST_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "like.endpoint must contain {POST_ID_PLACEHOLDER}, got {:?}",
                self.like.endpoint
            )));
        }
        Ok(())
    }

    /// Resolve the effective config from the page's optional override block.
    ///
    /// Any problem with the block is logged and the defaults are used instead,
    /// so a bad override never disables the page.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err}; using default page config");
                Self::default()
            }
        }
    }
}
