//! `web-sys` implementation of the page context.
//!
//! ERROR HANDLING
//! ==============
//! DOM calls that can throw (invalid selectors, style access, listener
//! registration) are logged at debug/warn and treated as "nothing happened".
//! Storage and cookie failures are mapped to [`StorageError`] for the
//! preference store to degrade on.

use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, EventTarget, HtmlDocument, HtmlElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Storage, Window,
};

use super::{Dom, DomEvent, EventKind, Handler, LikeApi, ListenTarget, ListenerHandle, PreferenceStorage, Scheduler};
use crate::error::{LikeError, StorageError};
use crate::net::like::{LikeResponse, send_like};
use crate::state::menu::resolve_viewport_width;

pub struct BrowserPage {
    window: Window,
    document: Document,
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn log_dom_error<T>(op: &str, result: Result<T, JsValue>) {
    if let Err(err) = result {
        log::debug!("{op} failed: {}", js_error(&err));
    }
}

fn as_element(target: Option<EventTarget>) -> Option<Element> {
    target.and_then(|target| target.dyn_ref::<Element>().cloned())
}

/// Run `handler` for a native event and apply the flags it set.
fn dispatch(handler: &Handler<Element>, event: &web_sys::Event) {
    let dom_event = DomEvent::new(as_element(event.target()));
    handler(&dom_event);
    if dom_event.is_default_prevented() {
        event.prevent_default();
    }
    if dom_event.is_propagation_stopped() {
        event.stop_propagation();
    }
}

fn add_listener(target: EventTarget, kind: EventKind, handler: Handler<Element>) -> ListenerHandle {
    let callback = Closure::wrap(Box::new(move |event: web_sys::Event| dispatch(&handler, &event)) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(err) = target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref()) {
        log::warn!("could not attach {} listener: {}", kind.as_str(), js_error(&err));
    }
    ListenerHandle::new(move || {
        log_dom_error(
            "removeEventListener",
            target.remove_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref()),
        );
        drop(callback);
    })
}

impl BrowserPage {
    /// `None` outside a document context (workers, SSR).
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    /// Run `ready` once the document is parsed: now if it already is,
    /// otherwise on `DOMContentLoaded`.
    pub fn when_ready(self: Rc<Self>, ready: impl FnOnce(Rc<Self>) + 'static) {
        if self.document.ready_state() != "loading" {
            ready(self);
            return;
        }
        let document = self.document.clone();
        let callback = Closure::once_into_js(move || ready(self));
        if let Err(err) = document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref()) {
            log::warn!("could not wait for DOMContentLoaded: {}", js_error(&err));
        }
    }

    /// Text of the element with `id`, used for the inline config block.
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.text_content()
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        match self.window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable),
            Err(err) => Err(StorageError::Rejected(js_error(&err))),
        }
    }

    fn html_document(&self) -> Result<&HtmlDocument, StorageError> {
        self.document.dyn_ref::<HtmlDocument>().ok_or(StorageError::Unavailable)
    }
}

impl Dom for BrowserPage {
    type Node = Element;

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("bad selector {selector:?}: {}", js_error(&err));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_ref::<Element>().cloned())
            .collect()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        match scope.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("bad selector {selector:?}: {}", js_error(&err));
                None
            }
        }
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        match node.closest(selector) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("bad selector {selector:?}: {}", js_error(&err));
                None
            }
        }
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node.as_ref();
        ancestor.contains(Some(node))
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        log_dom_error("classList.add", node.class_list().add_1(class));
    }

    fn remove_class(&self, node: &Element, class: &str) {
        log_dom_error("classList.remove", node.class_list().remove_1(class));
    }

    fn set_class_name(&self, node: &Element, value: &str) {
        node.set_class_name(value);
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        log_dom_error("setAttribute", node.set_attribute(name, value));
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inline_display(&self, node: &Element) -> Option<String> {
        let style = node.dyn_ref::<HtmlElement>()?.style();
        match style.get_property_value("display") {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(err) => {
                log::debug!("style read failed: {}", js_error(&err));
                None
            }
        }
    }

    fn set_inline_display(&self, node: &Element, value: Option<&str>) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        match value {
            Some(value) => log_dom_error("style.setProperty", style.set_property("display", value)),
            None => log_dom_error("style.removeProperty", style.remove_property("display")),
        }
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn viewport_width(&self) -> f64 {
        let root_width = self.root().map_or(0.0, |root| f64::from(root.client_width()));
        match self.window.inner_width() {
            Ok(width) => resolve_viewport_width(width.as_f64(), root_width),
            Err(err) => {
                log::debug!("innerWidth unavailable: {}", js_error(&err));
                root_width
            }
        }
    }

    fn listen(&self, target: ListenTarget<Element>, kind: EventKind, handler: Handler<Element>) -> ListenerHandle {
        let target: EventTarget = match target {
            ListenTarget::Window => self.window.clone().unchecked_into(),
            ListenTarget::Document => self.document.clone().unchecked_into(),
            ListenTarget::Element(element) => element.unchecked_into(),
        };
        add_listener(target, kind, handler)
    }
}

impl PreferenceStorage for BrowserPage {
    fn storage_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| StorageError::Rejected(js_error(&err)))
    }

    fn storage_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::Rejected(js_error(&err)))
    }

    fn cookie(&self) -> Result<String, StorageError> {
        self.html_document()?
            .cookie()
            .map_err(|err| StorageError::Rejected(js_error(&err)))
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError> {
        self.html_document()?
            .set_cookie(assignment)
            .map_err(|err| StorageError::Rejected(js_error(&err)))
    }
}

impl Scheduler for BrowserPage {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn FnOnce()> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, callback);
        Box::new(move || drop(timeout.cancel()))
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}

impl LikeApi for BrowserPage {
    fn post_like(&self, url: String) -> LocalBoxFuture<'static, Result<LikeResponse, LikeError>> {
        Box::pin(async move { send_like(&url).await })
    }
}
