//! Page-session context shared by every controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Controllers never reach for `window`/`document` globals. They receive an
//! `Rc<P: Page>` at initialization and do all DOM access, persistence,
//! scheduling, and networking through it. The browser implementation lives in
//! [`browser`] (feature `hydrate`); tests use an in-memory fake.
//!
//! DESIGN
//! ======
//! Listener and timer handles are RAII: dropping one detaches the listener or
//! cancels the pending timer. Whoever owns the handles owns the lifetime of
//! the behavior.

#[cfg(feature = "hydrate")]
pub mod browser;
#[cfg(test)]
pub mod fake;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::error::{LikeError, StorageError};
use crate::net::like::LikeResponse;

/// Event types the interaction layer listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Resize,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Resize => "resize",
        }
    }
}

/// Where a listener is registered.
#[derive(Clone, Debug, PartialEq)]
pub enum ListenTarget<N> {
    Element(N),
    Document,
    Window,
}

/// A dispatched event as seen by a handler.
///
/// `prevent_default` and `stop_propagation` only record intent; the page
/// implementation applies them to the underlying event once the handler
/// returns.
#[derive(Debug)]
pub struct DomEvent<N> {
    target: Option<N>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl<N> DomEvent<N> {
    pub fn new(target: Option<N>) -> Self {
        Self {
            target,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Element the event originated from, if it was an element.
    pub fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

pub type Handler<N> = Rc<dyn Fn(&DomEvent<N>)>;

/// Detaches its listener when removed or dropped.
#[must_use = "dropping a ListenerHandle detaches the listener"]
pub struct ListenerHandle {
    remove: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    pub fn new(remove: impl FnOnce() + 'static) -> Self {
        Self { remove: Some(Box::new(remove)) }
    }

    pub fn remove(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle").field("attached", &self.remove.is_some()).finish()
    }
}

/// Cancels its timer when cancelled or dropped before the callback ran.
#[must_use = "dropping a TimerHandle cancels the timer"]
pub struct TimerHandle {
    pending: Rc<Cell<bool>>,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if self.pending.replace(false) {
                cancel();
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").field("pending", &self.pending.get()).finish()
    }
}

/// Element queries and mutations.
pub trait Dom {
    type Node: Clone + PartialEq + 'static;

    /// The document's root element (`<html>`).
    fn root(&self) -> Option<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    /// Replace the whole class list.
    fn set_class_name(&self, node: &Self::Node, value: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Inline `display` override, `None` when the stylesheet decides.
    fn inline_display(&self, node: &Self::Node) -> Option<String>;
    /// Set the inline `display` override; `None` removes it.
    fn set_inline_display(&self, node: &Self::Node, value: Option<&str>);

    /// Smoothly scroll so the element's top meets the viewport top.
    fn scroll_into_view(&self, node: &Self::Node);
    fn viewport_width(&self) -> f64;

    fn listen(&self, target: ListenTarget<Self::Node>, kind: EventKind, handler: Handler<Self::Node>) -> ListenerHandle;
}

/// Durable client storage plus the document cookie string.
pub trait PreferenceStorage {
    /// # Errors
    ///
    /// Returns [`StorageError`] when durable storage cannot be read.
    fn storage_get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// # Errors
    ///
    /// Returns [`StorageError`] when durable storage cannot be written.
    fn storage_set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// The `document.cookie` string: `name=value` pairs joined by `"; "`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when cookies are not accessible.
    fn cookie(&self) -> Result<String, StorageError>;
    /// Assign one cookie (`name=value; path=...; max-age=...`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when cookies are not writable.
    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError>;
}

/// Timers and detached async work on the page's event loop.
pub trait Scheduler {
    /// Schedule `callback` after `delay`. Returns a canceller; calling it must
    /// prevent the callback from running if it has not run yet.
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn FnOnce()>;
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);

    /// Schedule `callback` after `delay`, tracked by a [`TimerHandle`].
    fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle
    where
        Self: Sized,
    {
        let pending = Rc::new(Cell::new(true));
        let flag = Rc::clone(&pending);
        let cancel = self.schedule(
            delay,
            Box::new(move || {
                flag.set(false);
                callback();
            }),
        );
        TimerHandle { pending, cancel: Some(cancel) }
    }
}

/// The like endpoint.
pub trait LikeApi {
    /// POST an empty JSON request to `url` and decode the updated count.
    fn post_like(&self, url: String) -> LocalBoxFuture<'static, Result<LikeResponse, LikeError>>;
}

/// Everything a controller may touch.
pub trait Page: Dom + PreferenceStorage + Scheduler + LikeApi + 'static {}

impl<T> Page for T where T: Dom + PreferenceStorage + Scheduler + LikeApi + 'static {}
