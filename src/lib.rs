//! Skips sponsored and live cards in an infinite-scroll video feed.
//!
//! The core ([`feed`], [`watch`], [`settings`]) is host-agnostic and talks to
//! the page through [`feed::FeedDocument`] and [`settings::PersistedStore`].
//! On `wasm32` the `web` module binds it to the real DOM and
//! `chrome.storage`; natively the tokio-driven [`watch::WatchController`]
//! runs it over [`feed::sim::SimulatedFeed`].

pub mod feed;
pub mod popup;
pub mod settings;
pub mod utils;
pub mod watch;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{start_content, start_popup, ChromeStorage, WebFeed};

pub use feed::{CardId, FeedDocument, Verdict};
pub use settings::{Settings, SettingsPatch};
pub use watch::{WatchConfig, WatchEvent, WatchSession};

/// Module start hook: logging and panic reporting for both entry points.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    utils::logging::init();
}
