//! Mobile navigation menu and per-item dropdowns.
//!
//! SYSTEM CONTEXT
//! ==============
//! The panel's open class is the menu state. It closes on outside clicks,
//! on link clicks (in-page navigation must not leave a stale open menu), and
//! whenever the viewport grows past the mobile breakpoint. Dropdowns are only
//! managed at or below the breakpoint; above it the stylesheet shows them on
//! hover and this controller leaves them alone.

#[cfg(test)]
#[path = "nav_menu_test.rs"]
mod nav_menu_test;

use std::rc::Rc;

use crate::config::NavConfig;
use crate::page::{DomEvent, EventKind, ListenTarget, ListenerHandle, Page};
use crate::state::menu::{Layout, MenuState, next_dropdown_display};

/// Elements the menu needs, resolved once at startup.
struct NavMenu<P: Page> {
    page: Rc<P>,
    config: NavConfig,
    panel: P::Node,
    toggle: Option<P::Node>,
}

impl<P: Page> NavMenu<P> {
    fn state(&self) -> MenuState {
        MenuState::from_open(self.page.has_class(&self.panel, &self.config.open_class))
    }

    fn set_state(&self, state: MenuState) {
        if state.is_open() {
            self.page.add_class(&self.panel, &self.config.open_class);
        } else {
            self.page.remove_class(&self.panel, &self.config.open_class);
        }
        if let Some(toggle) = &self.toggle {
            self.page.set_attribute(toggle, "aria-expanded", state.aria_expanded());
        }
    }

    fn close(&self) {
        if self.state().is_open() {
            self.set_state(MenuState::Closed);
        }
    }

    /// Whether a click on `target` lands outside the panel and the toggle.
    fn is_outside(&self, target: Option<&P::Node>) -> bool {
        let Some(target) = target else {
            return true;
        };
        let page = self.page.as_ref();
        if page.contains(&self.panel, target) {
            return false;
        }
        if self.toggle.as_ref().is_some_and(|toggle| page.contains(toggle, target)) {
            return false;
        }
        if let Some(container) = &self.config.container_selector {
            if page.closest(target, container).is_some() {
                return false;
            }
        }
        true
    }

    fn on_toggle(&self, event: &DomEvent<P::Node>) {
        event.prevent_default();
        event.stop_propagation();
        self.set_state(self.state().toggled());
    }

    fn on_document_click(&self, event: &DomEvent<P::Node>) {
        if self.state().is_open() && self.is_outside(event.target()) {
            self.close();
        }
    }

}

/// Drop inline display overrides so every dropdown falls back to CSS.
fn reset_dropdowns<P: Page>(page: &P, config: &NavConfig) {
    for panel in page.query_all(&config.dropdown_panel_selector) {
        if page.inline_display(&panel).is_some() {
            page.set_inline_display(&panel, None);
        }
    }
}

/// Wire the menu toggle, outside clicks, link clicks, resize, and dropdown
/// triggers. Each piece is skipped when its elements are missing; the resize
/// listener runs whenever there is a menu or a dropdown to reset.
pub fn attach<P: Page>(page: &Rc<P>, config: &NavConfig) -> Vec<ListenerHandle> {
    let mut handles = attach_dropdowns(page, config);

    let menu = match page.element_by_id(&config.panel_id) {
        Some(panel) => {
            let menu = Rc::new(NavMenu {
                page: Rc::clone(page),
                config: config.clone(),
                toggle: page.element_by_id(&config.toggle_id),
                panel,
            });
            handles.extend(attach_menu(&menu));
            Some(menu)
        }
        None => {
            log::debug!("nav panel #{} not found; mobile menu inactive", config.panel_id);
            None
        }
    };
    if handles.is_empty() {
        return handles;
    }

    let resize_page = Rc::clone(page);
    let config = config.clone();
    handles.push(page.listen(
        ListenTarget::Window,
        EventKind::Resize,
        Rc::new(move |_: &DomEvent<P::Node>| {
            if Layout::for_width(resize_page.viewport_width(), config.breakpoint_px) != Layout::Desktop {
                return;
            }
            if let Some(menu) = &menu {
                menu.close();
            }
            reset_dropdowns(resize_page.as_ref(), &config);
        }),
    ));
    handles
}

fn attach_menu<P: Page>(menu: &Rc<NavMenu<P>>) -> Vec<ListenerHandle> {
    let page = menu.page.as_ref();
    let config = &menu.config;
    let mut handles = Vec::new();

    if let Some(toggle) = menu.toggle.clone() {
        let menu = Rc::clone(menu);
        handles.push(page.listen(
            ListenTarget::Element(toggle),
            EventKind::Click,
            Rc::new(move |event: &DomEvent<P::Node>| menu.on_toggle(event)),
        ));
    }

    {
        let menu = Rc::clone(menu);
        handles.push(page.listen(
            ListenTarget::Document,
            EventKind::Click,
            Rc::new(move |event: &DomEvent<P::Node>| menu.on_document_click(event)),
        ));
    }

    // Dropdown triggers are links too, but they open a submenu.
    for link in page.query_all(&config.link_selector) {
        if !page.contains(&menu.panel, &link) || page.closest(&link, &config.dropdown_trigger_selector).is_some() {
            continue;
        }
        let menu = Rc::clone(menu);
        handles.push(page.listen(
            ListenTarget::Element(link),
            EventKind::Click,
            Rc::new(move |_: &DomEvent<P::Node>| menu.close()),
        ));
    }
    handles
}

/// Mobile tap-to-open for dropdown triggers. The panel is the first match of
/// the panel selector inside the trigger's parent.
fn attach_dropdowns<P: Page>(page: &Rc<P>, config: &NavConfig) -> Vec<ListenerHandle> {
    page.query_all(&config.dropdown_trigger_selector)
        .into_iter()
        .map(|trigger| {
            let handler_page = Rc::clone(page);
            let config = config.clone();
            let node = trigger.clone();
            let handler = Rc::new(move |event: &DomEvent<P::Node>| {
                let page = handler_page.as_ref();
                if Layout::for_width(page.viewport_width(), config.breakpoint_px) != Layout::Mobile {
                    return;
                }
                event.prevent_default();
                let panel = page
                    .parent(&node)
                    .and_then(|parent| page.query_within(&parent, &config.dropdown_panel_selector));
                if let Some(panel) = panel {
                    let next = next_dropdown_display(page.inline_display(&panel).as_deref());
                    page.set_inline_display(&panel, Some(next));
                }
            });
            page.listen(ListenTarget::Element(trigger), EventKind::Click, handler)
        })
        .collect()
}
