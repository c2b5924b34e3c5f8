//! WASM entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! The blog templates load this module on every page. `start` runs as soon
//! as the module is instantiated, reads the optional JSON config block, and
//! wires the controllers once the document is parsed. The wired
//! [`Interactions`] live in a thread-local until `teardown` is called, which
//! lets pages that swap content in place detach everything cleanly.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::wasm_bindgen;

use crate::config::{CONFIG_ELEMENT_ID, PageConfig};
use crate::page::browser::BrowserPage;
use crate::{Interactions, init};

thread_local! {
    static ACTIVE: RefCell<Option<Interactions>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        // Host page already installed a logger.
        log::debug!("console logger not installed: {err}");
    }

    let Some(page) = BrowserPage::new() else {
        log::warn!("no document; page interactions disabled");
        return;
    };
    let config = PageConfig::resolve(page.text_of(CONFIG_ELEMENT_ID).as_deref());
    Rc::new(page).when_ready(move |page| {
        let interactions = init(&page, &config);
        ACTIVE.with(|active| {
            if let Some(previous) = active.borrow_mut().replace(interactions) {
                previous.teardown();
            }
        });
    });
}

/// Detach every listener and cancel pending "liked" acknowledgments.
#[wasm_bindgen]
pub fn teardown() {
    let active = ACTIVE.with(|active| active.borrow_mut().take());
    if let Some(interactions) = active {
        interactions.teardown();
        log::debug!("page interactions torn down");
    }
}
