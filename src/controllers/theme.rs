//! Dark/light theme controller.
//!
//! Applies the stored preference to the root element at startup and flips it
//! when the toggle control is clicked. The root element's dark class is the
//! source of truth for the current theme.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::rc::Rc;

use crate::config::{PreferenceConfig, ThemeConfig};
use crate::controllers::preference::PreferenceStore;
use crate::page::{DomEvent, EventKind, ListenTarget, ListenerHandle, Page};
use crate::state::theme::Theme;

/// Theme currently shown on the page.
pub fn current_theme<P: Page>(page: &P, config: &ThemeConfig) -> Theme {
    let dark = page.root().is_some_and(|root| page.has_class(&root, &config.dark_class));
    Theme::from_dark(dark)
}

/// Put `theme` on the root element and sync the toggle icon, if present.
pub fn apply_theme<P: Page>(page: &P, config: &ThemeConfig, theme: Theme) {
    if let Some(root) = page.root() {
        if theme.is_dark() {
            page.add_class(&root, &config.dark_class);
        } else {
            page.remove_class(&root, &config.dark_class);
        }
    }
    let icon = page
        .element_by_id(&config.toggle_id)
        .and_then(|toggle| page.query_within(&toggle, &config.icon_selector));
    if let Some(icon) = icon {
        page.set_class_name(&icon, theme.icon_class(config));
    }
}

/// Apply the stored preference and wire the toggle control.
///
/// Without a toggle on the page the preference is still applied; there is
/// just nothing to listen to.
pub fn attach<P: Page>(page: &Rc<P>, theme: &ThemeConfig, preference: &PreferenceConfig) -> Vec<ListenerHandle> {
    let store = PreferenceStore::new(Rc::clone(page), preference.clone());
    apply_theme(page.as_ref(), theme, store.read_theme());

    let Some(toggle) = page.element_by_id(&theme.toggle_id) else {
        log::debug!("theme toggle #{} not found; theme applied without toggle", theme.toggle_id);
        return Vec::new();
    };

    let config = theme.clone();
    let handler_page = Rc::clone(page);
    let handler = Rc::new(move |_: &DomEvent<P::Node>| {
        let next = current_theme(handler_page.as_ref(), &config).toggled();
        store.write(next.is_dark());
        apply_theme(handler_page.as_ref(), &config, next);
    });
    vec![page.listen(ListenTarget::Element(toggle), EventKind::Click, handler)]
}
