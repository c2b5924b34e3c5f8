//! Like buttons: post the like, show the new count, flash the liked class.
//!
//! SYSTEM CONTEXT
//! ==============
//! The count belongs to the server; the page only shows the last answer it
//! received. Clicks are not serialized: two quick clicks send two requests
//! and whichever response lands last wins the displayed count.
//!
//! ERROR HANDLING
//! ==============
//! A failed request is logged and nothing on the page changes. There is no
//! retry and no user-facing message. A response that lands after
//! [`Acknowledgments::close`] is dropped without touching the page.

#[cfg(test)]
#[path = "like_test.rs"]
mod like_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::LikeConfig;
use crate::net::like::{LikeResponse, post_id_from_attribute};
use crate::page::{DomEvent, EventKind, ListenTarget, ListenerHandle, Page, TimerHandle};

/// Outstanding "remove liked class" timers, shared by every like control and
/// the requests they spawn. Closing it cancels the timers and turns any
/// response still in flight into a no-op.
#[derive(Debug, Default)]
pub struct Acknowledgments {
    timers: RefCell<Vec<TimerHandle>>,
    closed: Cell<bool>,
}

impl Acknowledgments {
    /// Number of "liked" class removals still scheduled.
    pub fn pending(&self) -> usize {
        self.timers.borrow().iter().filter(|timer| timer.is_pending()).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn close(&self) {
        self.closed.set(true);
        self.timers.borrow_mut().clear();
    }

    fn track(&self, handle: TimerHandle) {
        if self.is_closed() {
            return;
        }
        let mut timers = self.timers.borrow_mut();
        timers.retain(TimerHandle::is_pending);
        timers.push(handle);
    }
}

/// Show `response` on `button` and start the transient acknowledgment.
fn show_liked<P: Page>(
    page: &Rc<P>,
    config: &LikeConfig,
    button: &P::Node,
    response: LikeResponse,
    acknowledgments: &Acknowledgments,
) {
    if let Some(count) = page.query_within(button, &config.count_selector) {
        page.set_text(&count, &response.display_count());
    }
    page.add_class(button, &config.liked_class);

    let timer_page = Rc::clone(page);
    let node = button.clone();
    let class = config.liked_class.clone();
    let handle = page.set_timeout(config.liked_duration(), move || timer_page.remove_class(&node, &class));
    acknowledgments.track(handle);
}

/// Handle one click on a like control.
fn like_clicked<P: Page>(page: &Rc<P>, config: &LikeConfig, button: &P::Node, acknowledgments: &Rc<Acknowledgments>) {
    let post_id = match post_id_from_attribute(page.attribute(button, &config.post_id_attribute)) {
        Ok(id) => id,
        Err(err) => {
            log::warn!("skipping like: {err}");
            return;
        }
    };
    let request = page.post_like(config.endpoint_for(&post_id));

    let page_for_task = Rc::clone(page);
    let config = config.clone();
    let button = button.clone();
    let acknowledgments = Rc::clone(acknowledgments);
    page.spawn_local(Box::pin(async move {
        let result = request.await;
        if acknowledgments.is_closed() {
            log::debug!("like response for post {post_id} arrived after teardown; ignored");
            return;
        }
        match result {
            Ok(response) => show_liked(&page_for_task, &config, &button, response, &acknowledgments),
            Err(err) => log::error!("Error liking post {post_id}: {err}"),
        }
    }));
}

pub fn attach<P: Page>(page: &Rc<P>, config: &LikeConfig, acknowledgments: &Rc<Acknowledgments>) -> Vec<ListenerHandle> {
    page.query_all(&config.button_selector)
        .into_iter()
        .map(|button| {
            let handler_page = Rc::clone(page);
            let config = config.clone();
            let acknowledgments = Rc::clone(acknowledgments);
            let node = button.clone();
            let handler =
                Rc::new(move |_: &DomEvent<P::Node>| like_clicked(&handler_page, &config, &node, &acknowledgments));
            page.listen(ListenTarget::Element(button), EventKind::Click, handler)
        })
        .collect()
}
