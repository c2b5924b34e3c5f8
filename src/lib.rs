//! # blog-interactions
//!
//! Browser interaction layer for the blog's server-rendered pages: dark/light
//! theme toggle with persisted preference, mobile navigation menu, dropdown
//! dismissal, smooth anchor scrolling, and like buttons.
//!
//! Markup, styling, and the like endpoint are owned elsewhere. This crate only
//! attaches listeners to whatever the page provides and stays quiet about
//! anything missing. All behavior is written against the [`page::Page`]
//! context so it runs natively under test; the wasm entry point in [`app`]
//! (feature `hydrate`) binds it to the real document.


#[cfg(feature = "hydrate")]
pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod net;
pub mod page;
pub mod state;

use std::rc::Rc;

use crate::config::PageConfig;
use crate::controllers::like::Acknowledgments;
use crate::controllers::{dropdown, like, nav_menu, smooth_scroll, theme};
use crate::page::{ListenerHandle, Page};

/// Everything [`init`] attached to a page.
///
/// Dropping it (or calling [`Interactions::teardown`]) detaches every
/// listener, cancels "liked" acknowledgments that have not finished yet, and
/// makes like responses still in flight leave the page alone.
#[derive(Debug)]
pub struct Interactions {
    listeners: Vec<ListenerHandle>,
    acknowledgments: Rc<Acknowledgments>,
}

impl Interactions {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of "liked" class removals still scheduled.
    pub fn pending_acknowledgments(&self) -> usize {
        self.acknowledgments.pending()
    }

    pub fn teardown(self) {
        log::debug!("detaching {} listeners", self.listeners.len());
        drop(self);
    }
}

impl Drop for Interactions {
    fn drop(&mut self) {
        self.acknowledgments.close();
        self.listeners.clear();
    }
}

/// Attach every controller to `page`.
pub fn init<P: Page>(page: &Rc<P>, config: &PageConfig) -> Interactions {
    let acknowledgments = Rc::new(Acknowledgments::default());
    let mut listeners = Vec::new();
    listeners.extend(theme::attach(page, &config.theme, &config.preference));
    listeners.extend(nav_menu::attach(page, &config.nav));
    listeners.extend(dropdown::attach(page, &config.dismiss));
    listeners.extend(smooth_scroll::attach(page, &config.scroll));
    listeners.extend(like::attach(page, &config.like, &acknowledgments));
    log::debug!("page interactions ready: {} listeners", listeners.len());
    Interactions { listeners, acknowledgments }
}
