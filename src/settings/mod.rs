pub mod store;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use store::{load_settings, PersistedStore};

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;

pub const SPONSORED_KEY: &str = "sponsoredEnabled";
pub const LIVE_KEY: &str = "liveEnabled";

/// The two user-facing toggles. Keys are the persisted storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub sponsored_enabled: bool,
    pub live_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sponsored_enabled: true,
            live_enabled: false,
        }
    }
}

impl Settings {
    /// Build settings from a stored object, filling missing keys from `defaults`.
    ///
    /// Values are coerced the way the popup reads them (`!!value`), so a stored
    /// `1` or `"yes"` still counts as enabled.
    pub fn from_stored(value: &Value, defaults: &Settings) -> Self {
        let read = |key: &str, fallback: bool| match value.get(key) {
            Some(v) => truthy(v),
            None => fallback,
        };

        Self {
            sponsored_enabled: read(SPONSORED_KEY, defaults.sponsored_enabled),
            live_enabled: read(LIVE_KEY, defaults.live_enabled),
        }
    }

    /// Apply a storage diff. Unknown keys are ignored; a removed key reverts to
    /// its default. Returns true when any toggle actually changed.
    pub fn apply_changes(&mut self, changes: &StorageChanges) -> bool {
        let defaults = Settings::default();
        let before = *self;

        for (key, change) in changes {
            let (field, fallback) = match key.as_str() {
                SPONSORED_KEY => (&mut self.sponsored_enabled, defaults.sponsored_enabled),
                LIVE_KEY => (&mut self.live_enabled, defaults.live_enabled),
                _ => continue,
            };
            *field = change.new_value.as_ref().map(truthy).unwrap_or(fallback);
        }

        *self != before
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sponsored={} live={}",
            self.sponsored_enabled, self.live_enabled
        )
    }
}

/// Partial settings, as written by the popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.sponsored_enabled.is_none() && self.live_enabled.is_none()
    }
}

/// One key's `{oldValue, newValue}` pair from a storage change notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

pub type StorageChanges = BTreeMap<String, StorageChange>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageArea {
    Sync,
    Local,
    Managed,
    Session,
}

impl StorageArea {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
            StorageArea::Managed => "managed",
            StorageArea::Session => "session",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sync" => Some(StorageArea::Sync),
            "local" => Some(StorageArea::Local),
            "managed" => Some(StorageArea::Managed),
            "session" => Some(StorageArea::Session),
            _ => None,
        }
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change notification as delivered to `onChanged` listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsNotice {
    pub changes: StorageChanges,
    pub area: StorageArea,
}

/// JavaScript `!!value`.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
