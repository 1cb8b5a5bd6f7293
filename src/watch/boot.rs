use crate::feed::FeedDocument;
use crate::settings::{load_settings, PersistedStore};

use super::config::WatchConfig;
use super::session::WatchSession;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Whether the watch loop may start now rather than waiting for
    /// `DOMContentLoaded`.
    pub fn is_ready(self) -> bool {
        matches!(self, ReadyState::Interactive | ReadyState::Complete)
    }
}

/// Load settings and build the page's session. The caller starts it.
pub async fn bootstrap<D, P>(doc: D, store: Option<&P>, config: WatchConfig) -> WatchSession<D>
where
    D: FeedDocument,
    P: PersistedStore,
{
    log_info!("Initializing…");
    let settings = load_settings(store).await;
    WatchSession::new(doc, settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_defers_start() {
        assert!(!ReadyState::Loading.is_ready());
        assert!(ReadyState::Interactive.is_ready());
        assert!(ReadyState::Complete.is_ready());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn bootstrap_reads_store() {
        use crate::feed::sim::SimulatedFeed;
        use crate::settings::{FileStore, SettingsPatch};

        let store = FileStore::in_memory();
        store
            .set(&SettingsPatch {
                sponsored_enabled: Some(false),
                live_enabled: Some(true),
            })
            .await
            .unwrap();

        let session = bootstrap(SimulatedFeed::new(600.0), Some(&store), WatchConfig::default()).await;
        assert!(!session.settings().sponsored_enabled);
        assert!(session.settings().live_enabled);
    }
}
