//! Browser bindings: the real DOM, `chrome.storage` and the two
//! `wasm-bindgen` entry points.

mod content;
mod dom;
mod popup;
mod storage;

use anyhow::anyhow;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, DocumentReadyState};

use crate::watch::ReadyState;

pub use content::start_content;
pub use dom::WebFeed;
pub use popup::start_popup;
pub use storage::ChromeStorage;

pub(crate) fn js_err(err: JsValue) -> anyhow::Error {
    anyhow!(
        "{}",
        err.as_string().unwrap_or_else(|| format!("{err:?}"))
    )
}

pub(crate) fn ready_state(document: &Document) -> ReadyState {
    match document.ready_state() {
        DocumentReadyState::Interactive => ReadyState::Interactive,
        DocumentReadyState::Complete => ReadyState::Complete,
        _ => ReadyState::Loading,
    }
}

/// Run `f` now if the document is interactive, else once on
/// `DOMContentLoaded`.
pub(crate) fn when_ready<F>(document: &Document, f: F) -> Result<(), JsValue>
where
    F: FnOnce() + 'static,
{
    if ready_state(document).is_ready() {
        f();
        return Ok(());
    }

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let callback = Closure::once_into_js(f);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        callback.unchecked_ref(),
        &options,
    )
}
