use anyhow::{anyhow, Context, Result};
use js_sys::{Function, Promise, Reflect, JSON};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::js_err;
use crate::settings::{
    PersistedStore, Settings, SettingsNotice, SettingsPatch, StorageArea, StorageChanges,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// `chrome.storage.<area>` through its promise API.
pub struct ChromeStorage {
    area: StorageArea,
    target: JsValue,
}

impl ChromeStorage {
    /// Fails when the page has no extension storage (e.g. the script was
    /// injected outside an extension context).
    pub fn new(area: StorageArea) -> Result<Self> {
        let storage = chrome_storage()?;
        let target = Reflect::get(&storage, &JsValue::from_str(area.as_str())).map_err(js_err)?;
        if target.is_undefined() || target.is_null() {
            return Err(anyhow!("chrome.storage.{area} is unavailable"));
        }
        Ok(Self { area, target })
    }

    /// Register a `chrome.storage.onChanged` listener for every area. The
    /// listener lives as long as the page.
    pub fn on_changed<F>(mut callback: F) -> Result<()>
    where
        F: FnMut(SettingsNotice) + 'static,
    {
        let storage = chrome_storage()?;
        let on_changed = Reflect::get(&storage, &JsValue::from_str("onChanged")).map_err(js_err)?;
        let add_listener: Function = Reflect::get(&on_changed, &JsValue::from_str("addListener"))
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        let listener = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
            match parse_notice(&changes, &area) {
                Ok(Some(notice)) => callback(notice),
                Ok(None) => {}
                Err(err) => log_warn!("ignoring malformed storage change: {err:#}"),
            }
        });
        add_listener
            .call1(&on_changed, listener.as_ref().unchecked_ref())
            .map_err(js_err)?;
        listener.forget();
        Ok(())
    }

    async fn call(&self, method: &str, arg: &JsValue) -> Result<JsValue> {
        let function: Function = Reflect::get(&self.target, &JsValue::from_str(method))
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let promise: Promise = function
            .call1(&self.target, arg)
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        JsFuture::from(promise).await.map_err(js_err)
    }
}

impl PersistedStore for ChromeStorage {
    async fn get(&self, defaults: &Settings) -> Result<Settings> {
        let stored = self
            .call("get", &to_js(defaults)?)
            .await
            .with_context(|| format!("chrome.storage.{}.get failed", self.area))?;
        Ok(Settings::from_stored(&from_js(&stored)?, defaults))
    }

    async fn set(&self, patch: &SettingsPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.call("set", &to_js(patch)?)
            .await
            .with_context(|| format!("chrome.storage.{}.set failed", self.area))?;
        Ok(())
    }
}

fn chrome_storage() -> Result<JsValue> {
    let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome")).map_err(js_err)?;
    if chrome.is_undefined() {
        return Err(anyhow!("chrome extension APIs are unavailable"));
    }
    let storage = Reflect::get(&chrome, &JsValue::from_str("storage")).map_err(js_err)?;
    if storage.is_undefined() {
        return Err(anyhow!("chrome.storage is unavailable"));
    }
    Ok(storage)
}

fn parse_notice(changes: &JsValue, area: &JsValue) -> Result<Option<SettingsNotice>> {
    let Some(area) = area.as_string().as_deref().and_then(StorageArea::parse) else {
        return Ok(None);
    };
    let changes: StorageChanges = serde_json::from_value(from_js(changes)?)?;
    Ok(Some(SettingsNotice { changes, area }))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(js_err)
}

fn from_js(value: &JsValue) -> Result<Value> {
    let json: String = JSON::stringify(value).map_err(js_err)?.into();
    Ok(serde_json::from_str(&json)?)
}
