use std::time::Duration;

use crate::settings::StorageArea;

/// Tunables for the watch loop.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Intersection ratio at which a visible card gets classified
    pub visibility_threshold: f64,

    /// Period of the safety-net sweep over all located cards
    pub sweep_interval: Duration,

    /// Sweep band: a card qualifies while its top is above this fraction of
    /// the viewport and its bottom is below the viewport's top edge
    pub near_viewport_fraction: f64,

    /// Pause between a block verdict and the skip, so the feed's own initial
    /// layout and snap settle first
    pub advance_delay: Duration,

    /// Window scroll used when no neighbouring card exists, in viewports
    pub fallback_scroll_fraction: f64,

    /// Storage area whose change notifications reset the epoch
    pub settings_area: StorageArea,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.6,
            sweep_interval: Duration::from_secs(2),
            near_viewport_fraction: 0.8,
            advance_delay: Duration::from_millis(80),
            fallback_scroll_fraction: 0.9,
            settings_area: StorageArea::Sync,
        }
    }
}
