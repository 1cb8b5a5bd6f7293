use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MutationObserver, MutationObserverInit, MutationRecord, Node, Window,
};

use super::{js_err, when_ready, ChromeStorage, WebFeed};
use crate::feed::CardId;
use crate::watch::{bootstrap, Effect, WatchConfig, WatchEvent, WatchSession};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

struct Runtime {
    window: Window,
    session: WatchSession<WebFeed>,
    visibility: Option<IntersectionObserver>,
}

type Shared = Rc<RefCell<Runtime>>;

/// Content-script entry point. Starts the watch loop once the document is
/// interactive; runs for the lifetime of the page.
#[wasm_bindgen]
pub fn start_content() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let ready_document = document.clone();
    let result = when_ready(&document, move || {
        wasm_bindgen_futures::spawn_local(init(window, ready_document));
    });
    if let Err(err) = result {
        log_warn!("could not wait for DOMContentLoaded: {:#}", js_err(err));
    }
}

async fn init(window: Window, document: Document) {
    let config = WatchConfig::default();
    let store = match ChromeStorage::new(config.settings_area) {
        Ok(store) => Some(store),
        Err(err) => {
            log_warn!("{err:#}");
            None
        }
    };
    let has_store = store.is_some();

    let feed = WebFeed::new(window.clone(), document.clone());
    let session = bootstrap(feed, store.as_ref(), config).await;

    match install(window, &document, session, has_store) {
        Ok(()) => log_info!("Extension active ✔"),
        Err(err) => log_warn!("watch loop failed to start: {err:#}"),
    }
}

fn install(
    window: Window,
    document: &Document,
    session: WatchSession<WebFeed>,
    has_store: bool,
) -> Result<()> {
    let threshold = session.config().visibility_threshold;
    let sweep_interval = session.config().sweep_interval;
    let runtime: Shared = Rc::new(RefCell::new(Runtime {
        window,
        session,
        visibility: None,
    }));

    let visibility = visibility_watcher(&runtime, threshold)?;
    runtime.borrow_mut().visibility = Some(visibility);

    let effects = runtime.borrow_mut().session.start();
    apply(&runtime, effects);

    mutation_watcher(&runtime, document)?;
    sweep_timer(&runtime, sweep_interval)?;

    if has_store {
        let rt = Rc::clone(&runtime);
        ChromeStorage::on_changed(move |notice| {
            dispatch(&rt, WatchEvent::SettingsChanged(notice));
        })?;
    }
    Ok(())
}

fn dispatch(runtime: &Shared, event: WatchEvent) {
    let effects = runtime.borrow_mut().session.handle(event);
    apply(runtime, effects);
}

fn apply(runtime: &Shared, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Observe(card) => {
                let rt = runtime.borrow();
                let element = rt.session.document().element(card);
                if let (Some(visibility), Some(element)) = (rt.visibility.as_ref(), element) {
                    visibility.observe(&element);
                }
            }
            Effect::ScheduleAdvance { card, delay } => schedule_advance(runtime, card, delay),
        }
    }
}

fn schedule_advance(runtime: &Shared, card: CardId, delay: Duration) {
    let rt = Rc::clone(runtime);
    let callback = Closure::once_into_js(move || {
        dispatch(&rt, WatchEvent::AdvanceDue(card));
    });
    let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let scheduled = runtime
        .borrow()
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms);
    if let Err(err) = scheduled {
        log_warn!("could not schedule skip for {card}: {:#}", js_err(err));
    }
}

fn visibility_watcher(runtime: &Shared, threshold: f64) -> Result<IntersectionObserver> {
    let rt = Rc::clone(runtime);
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let card = rt.borrow().session.document().card_id(&entry.target());
                dispatch(
                    &rt,
                    WatchEvent::Intersection {
                        card,
                        ratio: entry.intersection_ratio(),
                        intersecting: entry.is_intersecting(),
                    },
                );
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(js_err)?;
    callback.forget();
    Ok(observer)
}

fn mutation_watcher(runtime: &Shared, document: &Document) -> Result<()> {
    let rt = Rc::clone(runtime);
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            for record in records.iter() {
                let Ok(record) = record.dyn_into::<MutationRecord>() else {
                    continue;
                };
                let added = record.added_nodes();
                for i in 0..added.length() {
                    let Some(node) = added.get(i) else { continue };
                    let found = rt.borrow().session.document().inserted_cards(&node);
                    if !found.is_empty() {
                        dispatch(&rt, WatchEvent::Inserted(found));
                    }
                }
            }
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(js_err)?;
    callback.forget();

    let root: Node = match document.body() {
        Some(body) => body.into(),
        None => match document.document_element() {
            Some(element) => element.into(),
            None => document.clone().into(),
        },
    };
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&root, &options).map_err(js_err)?;
    Ok(())
}

fn sweep_timer(runtime: &Shared, interval: Duration) -> Result<()> {
    let rt = Rc::clone(runtime);
    let callback = Closure::<dyn FnMut()>::new(move || dispatch(&rt, WatchEvent::Sweep));
    let interval_ms = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
    runtime
        .borrow()
        .window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            interval_ms,
        )
        .map_err(js_err)?;
    callback.forget();
    Ok(())
}
