//! Theme preference persistence.
//!
//! Reads the preference from durable storage and the cookie string, and
//! writes it back to both.
//!
//! TRADE-OFFS
//! ==========
//! Either location saying "dark" is enough (logical OR). The cookie is read by
//! server-side rendering, so both stay written even though they are never
//! reconciled against each other. Storage failures only ever degrade to
//! "no preference" on read and "not saved" on write.

#[cfg(test)]
#[path = "preference_test.rs"]
mod preference_test;

use std::rc::Rc;

use crate::config::PreferenceConfig;
use crate::page::Page;
use crate::state::theme::Theme;

/// Reads and writes the theme preference through a page's storage.
pub struct PreferenceStore<P: Page> {
    page: Rc<P>,
    config: PreferenceConfig,
}

impl<P: Page> PreferenceStore<P> {
    pub fn new(page: Rc<P>, config: PreferenceConfig) -> Self {
        Self { page, config }
    }

    /// `true` when durable storage holds `"true"` or the cookie string contains
    /// `<cookie_name>=true`. Unreadable locations count as absent.
    pub fn read(&self) -> bool {
        let stored = match self.page.storage_get(&self.config.storage_key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                log::warn!("preference storage read failed: {err}");
                false
            }
        };
        let cookie = match self.page.cookie() {
            Ok(cookie) => cookie_says_dark(&cookie, &self.config.cookie_name),
            Err(err) => {
                log::warn!("preference cookie read failed: {err}");
                false
            }
        };
        stored || cookie
    }

    pub fn read_theme(&self) -> Theme {
        Theme::from_dark(self.read())
    }

    /// Persist `dark` to both locations. A failing location is skipped
    /// without affecting the other.
    pub fn write(&self, dark: bool) {
        let flag = Theme::from_dark(dark).as_flag();
        if let Err(err) = self.page.storage_set(&self.config.storage_key, flag) {
            log::warn!("preference storage write failed: {err}");
        }
        if let Err(err) = self.page.set_cookie(&cookie_assignment(&self.config, dark)) {
            log::warn!("preference cookie write failed: {err}");
        }
    }
}

/// Substring test against the raw cookie string.
pub fn cookie_says_dark(cookie: &str, cookie_name: &str) -> bool {
    cookie.contains(&format!("{cookie_name}=true"))
}

/// `document.cookie` assignment for the preference, e.g.
/// `dark_mode=true; path=/; max-age=31536000`.
pub fn cookie_assignment(config: &PreferenceConfig, dark: bool) -> String {
    format!(
        "{}={}; path={}; max-age={}",
        config.cookie_name,
        Theme::from_dark(dark).as_flag(),
        config.cookie_path,
        config.cookie_max_age_secs
    )
}
