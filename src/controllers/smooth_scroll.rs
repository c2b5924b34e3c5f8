//! Smooth scrolling for same-page anchor links.

#[cfg(test)]
#[path = "smooth_scroll_test.rs"]
mod smooth_scroll_test;

use std::rc::Rc;

use crate::config::ScrollConfig;
use crate::page::{DomEvent, EventKind, ListenTarget, ListenerHandle, Page};

/// Element id named by an in-page href (`#intro` -> `intro`).
///
/// Returns `None` for a bare `#` and for hrefs that are not fragments.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Intercept every anchor matching the configured selector. The default jump
/// is always cancelled; the scroll only happens when the target exists.
pub fn attach<P: Page>(page: &Rc<P>, config: &ScrollConfig) -> Vec<ListenerHandle> {
    page.query_all(&config.anchor_selector)
        .into_iter()
        .map(|anchor| {
            let handler_page = Rc::clone(page);
            let node = anchor.clone();
            let handler = Rc::new(move |event: &DomEvent<P::Node>| {
                event.prevent_default();
                let page = handler_page.as_ref();
                let Some(href) = page.attribute(&node, "href") else {
                    return;
                };
                match fragment_id(&href).and_then(|id| page.element_by_id(id)) {
                    Some(target) => page.scroll_into_view(&target),
                    None => log::debug!("no scroll target for {href}"),
                }
            });
            page.listen(ListenTarget::Element(anchor), EventKind::Click, handler)
        })
        .collect()
}
