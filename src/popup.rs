//! Settings popup: two checkboxes bound 1:1 to the stored toggles.

use anyhow::{Context, Result};

use crate::settings::{PersistedStore, Settings, SettingsPatch, LIVE_KEY, SPONSORED_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Sponsored,
    Live,
}

impl Toggle {
    pub const ALL: [Toggle; 2] = [Toggle::Sponsored, Toggle::Live];

    /// `id` of the checkbox in the popup markup.
    pub fn element_id(self) -> &'static str {
        match self {
            Toggle::Sponsored => "sponsoredToggle",
            Toggle::Live => "liveToggle",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Toggle::Sponsored => SPONSORED_KEY,
            Toggle::Live => LIVE_KEY,
        }
    }

    pub fn read(self, settings: &Settings) -> bool {
        match self {
            Toggle::Sponsored => settings.sponsored_enabled,
            Toggle::Live => settings.live_enabled,
        }
    }

    /// One-key patch setting this toggle to `checked`.
    pub fn patch(self, checked: bool) -> SettingsPatch {
        match self {
            Toggle::Sponsored => SettingsPatch {
                sponsored_enabled: Some(checked),
                ..SettingsPatch::default()
            },
            Toggle::Live => SettingsPatch {
                live_enabled: Some(checked),
                ..SettingsPatch::default()
            },
        }
    }
}

/// Checkbox states to render when the popup opens.
pub async fn load_toggles<P: PersistedStore>(store: &P) -> Result<[(Toggle, bool); 2]> {
    let settings = store
        .get(&Settings::default())
        .await
        .context("failed to read settings for popup")?;
    Ok(Toggle::ALL.map(|toggle| (toggle, toggle.read(&settings))))
}

/// Persist a checkbox change.
pub async fn write_toggle<P: PersistedStore>(store: &P, toggle: Toggle, checked: bool) -> Result<()> {
    store
        .set(&toggle.patch(checked))
        .await
        .with_context(|| format!("failed to store {}", toggle.storage_key()))
}
