//! Closes hover-group dropdown panels on clicks outside their wrapper.
//!
//! Panels here are hidden by swapping opacity/visibility classes, not by
//! removing them from layout, so CSS transitions keep working. This is a
//! different dropdown style from the nav menu's tap-to-open panels and runs
//! independently of it.

#[cfg(test)]
#[path = "dropdown_test.rs"]
mod dropdown_test;

use std::rc::Rc;

use crate::config::DismissConfig;
use crate::page::{DomEvent, EventKind, ListenTarget, ListenerHandle, Page};

/// Force every visible panel into the hidden class state.
pub fn hide_visible_panels<P: Page>(page: &P, config: &DismissConfig) {
    for panel in page.query_all(&config.panel_selector) {
        if !config.visible_classes.iter().any(|class| page.has_class(&panel, class)) {
            continue;
        }
        for class in &config.visible_classes {
            page.remove_class(&panel, class);
        }
        for class in &config.hidden_classes {
            page.add_class(&panel, class);
        }
    }
}

pub fn attach<P: Page>(page: &Rc<P>, config: &DismissConfig) -> Vec<ListenerHandle> {
    let handler_page = Rc::clone(page);
    let config = config.clone();
    let handler = Rc::new(move |event: &DomEvent<P::Node>| {
        let page = handler_page.as_ref();
        let inside = event
            .target()
            .is_some_and(|target| page.closest(target, &config.container_selector).is_some());
        if !inside {
            hide_visible_panels(page, &config);
        }
    });
    vec![page.listen(ListenTarget::Document, EventKind::Click, handler)]
}
