/// chrome.* API bridge: storage, scripting and tabs behind the crate's collaborator traits

use crate::config::{FREQUENTLY_USED_KEY, OVERRIDES_KEY};
use crate::error::OverrideError;
use crate::messages::BackgroundMessage;
use crate::page::{PageMutator, TabDirectory};
use crate::storage::{OverrideStore, StorageData};
use crate::tab_data::{OriginalState, TabId, TabInfo};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn executeSetTitle(tab_id: i32, title: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn executeSetIcon(tab_id: i32, symbol: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn executeReleaseIcon(tab_id: i32, original_icon_ref: Option<String>) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn readOriginalState(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendBackgroundMessage(message: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openSettingsPage() -> Result<(), JsValue>;

    fn exportToFile(data: &str, filename: &str);
}

fn describe(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| {
            e.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{:?}", e))
}

fn from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, String> {
    if value.is_null() || value.is_undefined() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(value).map_err(|e| format!("{:?}", e))
    }
}

// Maps become plain objects, as chrome.storage cannot hold an ES Map
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("{:?}", e))
}

/// chrome.storage.local, one key per collection
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl OverrideStore for ChromeStorage {
    async fn load(&self) -> Result<StorageData, OverrideError> {
        let overrides_js = getStorage(OVERRIDES_KEY)
            .await
            .map_err(|e| OverrideError::Storage(format!("Failed to get storage: {}", describe(&e))))?;
        let recent_js = getStorage(FREQUENTLY_USED_KEY)
            .await
            .map_err(|e| OverrideError::Storage(format!("Failed to get storage: {}", describe(&e))))?;

        Ok(StorageData {
            overrides: from_js(overrides_js)
                .map_err(|e| OverrideError::Storage(format!("Failed to parse overrides: {}", e)))?,
            frequently_used: from_js(recent_js)
                .map_err(|e| OverrideError::Storage(format!("Failed to parse icon list: {}", e)))?,
        })
    }

    async fn save(&self, data: &StorageData) -> Result<(), OverrideError> {
        let overrides_js = to_js(&data.overrides)
            .map_err(|e| OverrideError::Storage(format!("Failed to serialize storage: {}", e)))?;
        let recent_js = to_js(&data.frequently_used)
            .map_err(|e| OverrideError::Storage(format!("Failed to serialize storage: {}", e)))?;

        setStorage(OVERRIDES_KEY, overrides_js)
            .await
            .map_err(|e| OverrideError::Storage(format!("Failed to save storage: {}", describe(&e))))?;
        setStorage(FREQUENTLY_USED_KEY, recent_js)
            .await
            .map_err(|e| OverrideError::Storage(format!("Failed to save storage: {}", describe(&e))))
    }
}

/// chrome.scripting.executeScript against the tab's top frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromePageMutator;

#[async_trait(?Send)]
impl PageMutator for ChromePageMutator {
    async fn apply_title(&self, tab_id: TabId, title: &str) -> Result<(), OverrideError> {
        executeSetTitle(tab_id, title)
            .await
            .map_err(|e| OverrideError::ApplyFailed(describe(&e)))
    }

    async fn apply_icon(&self, tab_id: TabId, symbol: &str) -> Result<(), OverrideError> {
        executeSetIcon(tab_id, symbol)
            .await
            .map_err(|e| OverrideError::ApplyFailed(describe(&e)))
    }

    async fn release_icon(&self, tab_id: TabId, original_icon_ref: Option<&str>) -> Result<(), OverrideError> {
        executeReleaseIcon(tab_id, original_icon_ref.map(str::to_string))
            .await
            .map_err(|e| OverrideError::ApplyFailed(describe(&e)))
    }

    async fn original_state(&self, tab_id: TabId) -> Result<OriginalState, OverrideError> {
        let state_js = readOriginalState(tab_id)
            .await
            .map_err(|e| OverrideError::ApplyFailed(describe(&e)))?;
        serde_wasm_bindgen::from_value(state_js)
            .map_err(|e| OverrideError::ApplyFailed(format!("Failed to parse page state: {:?}", e)))
    }
}

/// chrome.tabs.query
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabDirectory for ChromeTabs {
    async fn open_tabs(&self) -> Result<Vec<TabInfo>, OverrideError> {
        let tabs_js = queryTabs()
            .await
            .map_err(|e| OverrideError::ApplyFailed(format!("Failed to get tabs: {}", describe(&e))))?;
        serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| OverrideError::ApplyFailed(format!("Failed to parse tabs: {:?}", e)))
    }

    async fn active_tab(&self) -> Result<TabInfo, OverrideError> {
        let tab_js = getActiveTab()
            .await
            .map_err(|e| OverrideError::ApplyFailed(format!("Failed to get tab: {}", describe(&e))))?;
        serde_wasm_bindgen::from_value(tab_js)
            .map_err(|e| OverrideError::ApplyFailed(format!("Failed to parse tab: {:?}", e)))
    }
}

/// Tell the background worker about a saved or deleted record
pub async fn notify_background(message: &BackgroundMessage) -> Result<(), String> {
    let message_js = to_js(message)?;
    sendBackgroundMessage(message_js)
        .await
        .map_err(|e| format!("Failed to notify background: {}", describe(&e)))
}

/// Parse a message received by the background worker
pub fn parse_message(message: JsValue) -> Result<BackgroundMessage, String> {
    serde_wasm_bindgen::from_value(message).map_err(|e| format!("Unknown message: {:?}", e))
}

pub async fn open_settings() -> Result<(), String> {
    openSettingsPage()
        .await
        .map_err(|e| format!("Failed to open settings: {}", describe(&e)))
}

pub fn download_json(data: &str, filename: &str) {
    exportToFile(data, filename);
}
