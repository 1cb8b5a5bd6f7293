pub mod classifier;
pub mod document;
pub mod locator;
pub mod markers;
pub mod navigator;
pub mod sim;

pub use classifier::{classify, Verdict};
pub use document::{CardId, CardRect, FeedDocument};
pub use locator::{card_selector, locate};
pub use navigator::{advance_from, plan_advance, FallbackReason, NavTarget};
