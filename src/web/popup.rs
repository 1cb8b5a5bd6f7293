use std::rc::Rc;

use anyhow::Result;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlInputElement};

use super::{js_err, when_ready, ChromeStorage};
use crate::popup::{load_toggles, write_toggle, Toggle};
use crate::settings::StorageArea;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Popup entry point: binds the two checkboxes to `chrome.storage.sync`.
#[wasm_bindgen]
pub fn start_popup() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    let ready_document = document.clone();
    let result = when_ready(&document, move || {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = bind(ready_document).await {
                log_warn!("popup failed to load settings: {err:#}");
            }
        });
    });
    if let Err(err) = result {
        log_warn!("could not wait for DOMContentLoaded: {:#}", js_err(err));
    }
}

async fn bind(document: Document) -> Result<()> {
    let store = Rc::new(ChromeStorage::new(StorageArea::Sync)?);

    let inputs: Vec<(Toggle, HtmlInputElement)> = Toggle::ALL
        .into_iter()
        .filter_map(|toggle| {
            let input = document
                .get_element_by_id(toggle.element_id())?
                .dyn_into::<HtmlInputElement>()
                .ok()?;
            Some((toggle, input))
        })
        .collect();

    for (toggle, input) in &inputs {
        let toggle = *toggle;
        let source = input.clone();
        let store = Rc::clone(&store);
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let checked = source.checked();
            let store = Rc::clone(&store);
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = write_toggle(store.as_ref(), toggle, checked).await {
                    log_warn!("{err:#}");
                }
            });
        });
        input
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(js_err)?;
        on_change.forget();
    }

    for (toggle, checked) in load_toggles(store.as_ref()).await? {
        if let Some((_, input)) = inputs.iter().find(|(t, _)| *t == toggle) {
            input.set_checked(checked);
        }
    }
    Ok(())
}
