pub mod boot;
pub mod config;
pub mod event;
pub mod session;
pub mod state;

#[cfg(not(target_arch = "wasm32"))]
pub mod controller;
#[cfg(not(target_arch = "wasm32"))]
pub mod loop_worker;

pub use boot::{bootstrap, ReadyState};
pub use config::WatchConfig;
pub use event::{Effect, InsertedCard, WatchEvent};
pub use session::WatchSession;
pub use state::{CardMark, CardMarks};

#[cfg(not(target_arch = "wasm32"))]
pub use controller::WatchController;
