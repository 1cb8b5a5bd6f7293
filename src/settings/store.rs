use anyhow::Result;

use super::{Settings, SettingsPatch};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Key/value persistence for [`Settings`], modelled on `chrome.storage`.
///
/// Implementations are single-threaded on the web, so no `Send` bound is
/// placed on the returned futures.
#[allow(async_fn_in_trait)]
pub trait PersistedStore {
    /// Read the stored settings, falling back to `defaults` per missing key.
    async fn get(&self, defaults: &Settings) -> Result<Settings>;

    /// Write the keys present in `patch`.
    async fn set(&self, patch: &SettingsPatch) -> Result<()>;
}

/// Load the boot-time settings.
///
/// A missing store or a failing read is not fatal: the session runs with
/// defaults for its whole lifetime.
pub async fn load_settings<P: PersistedStore>(store: Option<&P>) -> Settings {
    let defaults = Settings::default();

    let Some(store) = store else {
        log_warn!("settings storage unavailable; running with defaults ({defaults})");
        return defaults;
    };

    match store.get(&defaults).await {
        Ok(settings) => {
            log_info!("Loaded settings: {settings}");
            settings
        }
        Err(err) => {
            log_warn!("settings read failed, running with defaults ({defaults}): {err:#}");
            defaults
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store {
    use anyhow::{anyhow, Context, Result};
    use serde_json::{Map, Value};
    use std::{fs, path::PathBuf, sync::RwLock};
    use tokio::sync::broadcast;

    use super::PersistedStore;
    use crate::settings::{
        Settings, SettingsNotice, SettingsPatch, StorageArea, StorageChange, StorageChanges,
        LIVE_KEY, SPONSORED_KEY,
    };

    const ENABLE_LOGS: bool = true;

    use crate::log_warn;

    const NOTICE_CAPACITY: usize = 16;

    /// JSON-file settings store for native hosts.
    ///
    /// Holds the raw stored object so that `get` can apply per-call defaults,
    /// and broadcasts a [`SettingsNotice`] for every `set` that changes a value.
    pub struct FileStore {
        path: Option<PathBuf>,
        area: StorageArea,
        data: RwLock<Map<String, Value>>,
        notices: broadcast::Sender<SettingsNotice>,
    }

    impl FileStore {
        pub fn new(path: PathBuf) -> Result<Self> {
            let data = if path.exists() {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                match serde_json::from_str::<Map<String, Value>>(&contents) {
                    Ok(map) => map,
                    Err(err) => {
                        log_warn!(
                            "ignoring unreadable settings file {}: {err}",
                            path.display()
                        );
                        Map::new()
                    }
                }
            } else {
                Map::new()
            };

            Ok(Self::with_data(Some(path), data))
        }

        /// A store that never touches disk.
        pub fn in_memory() -> Self {
            Self::with_data(None, Map::new())
        }

        fn with_data(path: Option<PathBuf>, data: Map<String, Value>) -> Self {
            let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
            Self {
                path,
                area: StorageArea::Sync,
                data: RwLock::new(data),
                notices,
            }
        }

        /// Subscribe to change notifications (the `onChanged` equivalent).
        pub fn subscribe(&self) -> broadcast::Receiver<SettingsNotice> {
            self.notices.subscribe()
        }

        fn persist(&self, data: &Map<String, Value>) -> Result<()> {
            let Some(path) = &self.path else {
                return Ok(());
            };
            let serialized = serde_json::to_string_pretty(data)?;
            fs::write(path, serialized)
                .with_context(|| format!("Failed to write settings to {}", path.display()))
        }
    }

    impl PersistedStore for FileStore {
        async fn get(&self, defaults: &Settings) -> Result<Settings> {
            let guard = self
                .data
                .read()
                .map_err(|_| anyhow!("settings lock poisoned"))?;
            Ok(Settings::from_stored(&Value::Object(guard.clone()), defaults))
        }

        async fn set(&self, patch: &SettingsPatch) -> Result<()> {
            let writes = [
                (SPONSORED_KEY, patch.sponsored_enabled),
                (LIVE_KEY, patch.live_enabled),
            ];

            let changes = {
                let mut guard = self
                    .data
                    .write()
                    .map_err(|_| anyhow!("settings lock poisoned"))?;

                // Stage on a copy so a failed write leaves memory matching disk.
                let mut next = guard.clone();
                let mut changes = StorageChanges::new();
                for (key, value) in writes {
                    let Some(value) = value else { continue };
                    let new_value = Value::Bool(value);
                    let old_value = next.insert(key.to_string(), new_value.clone());
                    if old_value.as_ref() != Some(&new_value) {
                        changes.insert(
                            key.to_string(),
                            StorageChange {
                                old_value,
                                new_value: Some(new_value),
                            },
                        );
                    }
                }

                self.persist(&next)?;
                *guard = next;
                changes
            };

            if !changes.is_empty() {
                // No subscribers is fine; nobody is watching yet.
                let _ = self.notices.send(SettingsNotice {
                    changes,
                    area: self.area,
                });
            }
            Ok(())
        }
    }

}
