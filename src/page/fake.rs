//! In-memory [`Page`](super::Page) for controller tests.
//!
//! Models just enough of a browser page: an element tree with a small
//! selector subset, click bubbling, a virtual clock, storage and cookies with
//! failure injection, and scripted like responses resolved on a local
//! executor.

#[path = "fake_test.rs"]
mod fake_test;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use super::{Dom, DomEvent, EventKind, Handler, LikeApi, ListenTarget, ListenerHandle, PreferenceStorage, Scheduler};
use crate::error::{LikeError, StorageError};
use crate::net::like::LikeResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: String,
    display: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

struct Registered {
    id: u64,
    target: ListenTarget<NodeId>,
    kind: EventKind,
    handler: Handler<NodeId>,
}

#[derive(Default)]
struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    entries: Vec<(u64, u64, Box<dyn FnOnce()>)>,
}

enum Scripted {
    Ready(Result<LikeResponse, LikeError>),
    Deferred(oneshot::Receiver<Result<LikeResponse, LikeError>>),
}

pub struct FakePage {
    tree: RefCell<Vec<Element>>,
    listeners: Rc<RefCell<Vec<Registered>>>,
    next_listener: Cell<u64>,
    timers: Rc<RefCell<TimerQueue>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    storage: RefCell<BTreeMap<String, String>>,
    storage_available: Cell<bool>,
    cookies: RefCell<Vec<(String, String)>>,
    cookie_assignments: RefCell<Vec<String>>,
    cookies_available: Cell<bool>,
    width: Cell<f64>,
    scrolled: RefCell<Vec<NodeId>>,
    requests: RefCell<Vec<String>>,
    responses: RefCell<VecDeque<Scripted>>,
}

impl FakePage {
    /// Empty page: `<html><body></body></html>`, 1280 px wide.
    pub fn new() -> Rc<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let page = Self {
            tree: RefCell::new(Vec::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
            timers: Rc::new(RefCell::new(TimerQueue::default())),
            pool: RefCell::new(pool),
            spawner,
            storage: RefCell::new(BTreeMap::new()),
            storage_available: Cell::new(true),
            cookies: RefCell::new(Vec::new()),
            cookie_assignments: RefCell::new(Vec::new()),
            cookies_available: Cell::new(true),
            width: Cell::new(1280.0),
            scrolled: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            responses: RefCell::new(VecDeque::new()),
        };
        page.tree.borrow_mut().push(Element { tag: "html".to_owned(), ..Element::default() });
        page.add(NodeId(0), "body");
        Rc::new(page)
    }

    pub fn body(&self) -> NodeId {
        NodeId(1)
    }

    /// Append a child described as `tag#id.class1.class2` (each part optional
    /// except the tag).
    pub fn add(&self, parent: NodeId, spec: &str) -> NodeId {
        let compound = Compound::parse(spec);
        let mut element = Element {
            tag: compound.tag.unwrap_or_else(|| "div".to_owned()),
            classes: compound.classes,
            parent: Some(parent),
            ..Element::default()
        };
        if let Some(id) = compound.id {
            element.attrs.push(("id".to_owned(), id));
        }
        let mut tree = self.tree.borrow_mut();
        let node = NodeId(tree.len());
        tree.push(element);
        tree[parent.0].children.push(node);
        node
    }

    /// Append a child and give it an attribute in one step.
    pub fn add_with(&self, parent: NodeId, spec: &str, name: &str, value: &str) -> NodeId {
        let node = self.add(parent, spec);
        self.set_attribute(&node, name, value);
        node
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree.borrow()[node.0].text.clone()
    }

    pub fn class_name(&self, node: NodeId) -> String {
        self.tree.borrow()[node.0].classes.join(" ")
    }

    /// Dispatch a click on `node`, bubbling to ancestors, the document, and
    /// the window until a handler stops propagation.
    pub fn click(&self, node: NodeId) -> DomEvent<NodeId> {
        let event = DomEvent::new(Some(node));
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            path.push(ListenTarget::Element(n));
            current = self.tree.borrow()[n.0].parent;
        }
        path.push(ListenTarget::Document);
        path.push(ListenTarget::Window);
        for target in path {
            for handler in self.handlers_for(&target, EventKind::Click) {
                handler(&event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Change the viewport width and fire window resize listeners.
    pub fn resize(&self, width: f64) {
        self.width.set(width);
        let event = DomEvent::new(None);
        for handler in self.handlers_for(&ListenTarget::Window, EventKind::Resize) {
            handler(&event);
        }
    }

    pub fn set_width(&self, width: f64) {
        self.width.set(width);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn handlers_for(&self, target: &ListenTarget<NodeId>, kind: EventKind) -> Vec<Handler<NodeId>> {
        self.listeners
            .borrow()
            .iter()
            .filter(|r| r.kind == kind && &r.target == target)
            .map(|r| Rc::clone(&r.handler))
            .collect()
    }

    /// Move the virtual clock forward, running timers as they come due.
    pub fn advance(&self, by: Duration) {
        let until = {
            let timers = self.timers.borrow();
            timers.now_ms + u64::try_from(by.as_millis()).unwrap_or(u64::MAX)
        };
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, due, _))| *due <= until)
                    .min_by_key(|(_, (id, due, _))| (*due, *id))
                    .map(|(index, _)| index);
                due.map(|index| {
                    let (_, due, callback) = timers.entries.remove(index);
                    timers.now_ms = due;
                    callback
                })
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.timers.borrow_mut().now_ms = until;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().entries.len()
    }

    /// Drive spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub fn storage_value(&self, key: &str) -> Option<String> {
        self.storage.borrow().get(key).cloned()
    }

    pub fn seed_storage(&self, key: &str, value: &str) {
        self.storage.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    pub fn clear_storage(&self) {
        self.storage.borrow_mut().clear();
    }

    pub fn set_storage_available(&self, available: bool) {
        self.storage_available.set(available);
    }

    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookies.borrow().iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    pub fn last_cookie_assignment(&self) -> Option<String> {
        self.cookie_assignments.borrow().last().cloned()
    }

    pub fn clear_cookies(&self) {
        self.cookies.borrow_mut().clear();
    }

    pub fn set_cookies_available(&self, available: bool) {
        self.cookies_available.set(available);
    }

    pub fn scrolled(&self) -> Vec<NodeId> {
        self.scrolled.borrow().clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Queue the result of the next like request.
    pub fn respond_like(&self, result: Result<LikeResponse, LikeError>) {
        self.responses.borrow_mut().push_back(Scripted::Ready(result));
    }

    /// Queue a like request that stays in flight until the sender resolves it.
    pub fn defer_like(&self) -> oneshot::Sender<Result<LikeResponse, LikeError>> {
        let (tx, rx) = oneshot::channel();
        self.responses.borrow_mut().push_back(Scripted::Deferred(rx));
        tx
    }

    fn preorder(&self, from: NodeId, out: &mut Vec<NodeId>) {
        let children = self.tree.borrow()[from.0].children.clone();
        for child in children {
            out.push(child);
            self.preorder(child, out);
        }
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        selector.split(',').any(|alternative| self.matches_descendant_chain(node, alternative))
    }

    fn matches_descendant_chain(&self, node: NodeId, selector: &str) -> bool {
        let parts: Vec<Compound> = selector.split_whitespace().map(Compound::parse).collect();
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        let tree = self.tree.borrow();
        if !last.matches(&tree[node.0]) {
            return false;
        }
        let mut remaining = rest.iter().rev().peekable();
        let mut current = tree[node.0].parent;
        while let Some(wanted) = remaining.peek() {
            let Some(ancestor) = current else {
                return false;
            };
            if wanted.matches(&tree[ancestor.0]) {
                remaining.next();
            }
            current = tree[ancestor.0].parent;
        }
        true
    }
}

impl Dom for FakePage {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(NodeId(0))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut all = vec![NodeId(0)];
        self.preorder(NodeId(0), &mut all);
        let tree = self.tree.borrow();
        all.into_iter().find(|n| tree[n.0].attr("id") == Some(id))
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let mut all = vec![NodeId(0)];
        self.preorder(NodeId(0), &mut all);
        all.into_iter().filter(|n| self.matches(*n, selector)).collect()
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        let mut all = Vec::new();
        self.preorder(*scope, &mut all);
        all.into_iter().find(|n| self.matches(*n, selector))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let mut current = Some(*node);
        while let Some(n) = current {
            if self.matches(n, selector) {
                return Some(n);
            }
            current = self.tree.borrow()[n.0].parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(*node);
        while let Some(n) = current {
            if n == *ancestor {
                return true;
            }
            current = self.tree.borrow()[n.0].parent;
        }
        false
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow()[node.0].parent
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.tree.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        let classes = &mut tree[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.tree.borrow_mut()[node.0].classes.retain(|c| c != class);
    }

    fn set_class_name(&self, node: &NodeId, value: &str) {
        self.tree.borrow_mut()[node.0].classes = value.split_whitespace().map(str::to_owned).collect();
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.tree.borrow()[node.0].attr(name).map(str::to_owned)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let attrs = &mut tree[node.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_owned(),
            None => attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.tree.borrow_mut()[node.0].text = text.to_owned();
    }

    fn inline_display(&self, node: &NodeId) -> Option<String> {
        self.tree.borrow()[node.0].display.clone()
    }

    fn set_inline_display(&self, node: &NodeId, value: Option<&str>) {
        self.tree.borrow_mut()[node.0].display = value.map(str::to_owned);
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.scrolled.borrow_mut().push(*node);
    }

    fn viewport_width(&self) -> f64 {
        self.width.get()
    }

    fn listen(&self, target: ListenTarget<NodeId>, kind: EventKind, handler: Handler<NodeId>) -> ListenerHandle {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push(Registered { id, target, kind, handler });
        let listeners = Rc::clone(&self.listeners);
        ListenerHandle::new(move || listeners.borrow_mut().retain(|r| r.id != id))
    }
}

impl PreferenceStorage for FakePage {
    fn storage_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.storage_available.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.storage.borrow().get(key).cloned())
    }

    fn storage_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.storage_available.get() {
            return Err(StorageError::Rejected("quota exceeded".to_owned()));
        }
        self.storage.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn cookie(&self) -> Result<String, StorageError> {
        if !self.cookies_available.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self
            .cookies
            .borrow()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), StorageError> {
        if !self.cookies_available.get() {
            return Err(StorageError::Unavailable);
        }
        self.cookie_assignments.borrow_mut().push(assignment.to_owned());
        let mut parts = assignment.split(';').map(str::trim);
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return Ok(());
        };
        let expired = parts
            .filter_map(|attr| attr.strip_prefix("max-age="))
            .any(|age| age.parse::<i64>().map_or(false, |age| age <= 0));
        let mut cookies = self.cookies.borrow_mut();
        cookies.retain(|(k, _)| k != name);
        if !expired {
            cookies.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }
}

impl Scheduler for FakePage {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn FnOnce()> {
        let id = {
            let mut timers = self.timers.borrow_mut();
            let id = timers.next_id;
            timers.next_id += 1;
            let due = timers.now_ms + u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            timers.entries.push((id, due, callback));
            id
        };
        let timers = Rc::clone(&self.timers);
        Box::new(move || timers.borrow_mut().entries.retain(|(entry, _, _)| *entry != id))
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(future) {
            log::warn!("fake page could not spawn task: {err}");
        }
    }
}

impl LikeApi for FakePage {
    fn post_like(&self, url: String) -> LocalBoxFuture<'static, Result<LikeResponse, LikeError>> {
        self.requests.borrow_mut().push(url);
        let scripted = self.responses.borrow_mut().pop_front();
        Box::pin(async move {
            match scripted {
                Some(Scripted::Ready(result)) => result,
                Some(Scripted::Deferred(rx)) => match rx.await {
                    Ok(result) => result,
                    Err(_) => Err(LikeError::Network("request dropped".to_owned())),
                },
                None => Err(LikeError::Network("no response scripted".to_owned())),
            }
        })
    }
}

/// One compound selector: `tag#id.class[attr][attr^="v"][attr="v"]`.
#[derive(Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug, PartialEq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
    Prefix(String, String),
}

impl Compound {
    fn parse(raw: &str) -> Self {
        let mut out = Self::default();
        let mut rest = raw;
        let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
        if tag_end > 0 && &rest[..tag_end] != "*" {
            out.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
        while let Some(sigil) = rest.chars().next() {
            rest = &rest[1..];
            if sigil == '[' {
                let close = rest.find(']').unwrap_or(rest.len());
                out.attrs.push(AttrTest::parse(&rest[..close]));
                rest = rest.get(close + 1..).unwrap_or("");
                continue;
            }
            let end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
            let name = rest[..end].to_owned();
            rest = &rest[end..];
            match sigil {
                '#' => out.id = Some(name),
                _ => out.classes.push(name),
            }
        }
        out
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_ref().map_or(true, |tag| *tag == element.tag)
            && self.id.as_deref().map_or(true, |id| element.attr("id") == Some(id))
            && self.classes.iter().all(|c| element.classes.contains(c))
            && self.attrs.iter().all(|test| test.matches(element))
    }
}

impl AttrTest {
    fn parse(inner: &str) -> Self {
        let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_owned();
        if let Some((name, value)) = inner.split_once("^=") {
            Self::Prefix(name.trim().to_owned(), unquote(value))
        } else if let Some((name, value)) = inner.split_once('=') {
            Self::Equals(name.trim().to_owned(), unquote(value))
        } else {
            Self::Present(inner.trim().to_owned())
        }
    }

    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Present(name) => element.attr(name).is_some(),
            Self::Equals(name, value) => element.attr(name) == Some(value.as_str()),
            Self::Prefix(name, value) => element.attr(name).is_some_and(|v| v.starts_with(value.as_str())),
        }
    }
}
