/// Persisted state for chrome.storage.local: the override map and the icon recency list

use crate::error::OverrideError;
use crate::tab_data::OverrideRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most-recent-first list of icon symbols, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequentlyUsed(Vec<String>);

impl FrequentlyUsed {
    pub fn new() -> Self {
        FrequentlyUsed(Vec::new())
    }

    /// Move `symbol` to the front, evicting from the back past `capacity`
    pub fn push(&mut self, symbol: &str, capacity: usize) {
        self.0.retain(|s| s != symbol);
        self.0.insert(0, symbol.to_string());
        self.0.truncate(capacity);
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Root storage structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    #[serde(default)]
    pub overrides: BTreeMap<String, OverrideRecord>,
    #[serde(default)]
    pub frequently_used: FrequentlyUsed,
}

impl StorageData {
    pub fn new() -> Self {
        StorageData {
            overrides: BTreeMap::new(),
            frequently_used: FrequentlyUsed::new(),
        }
    }

    pub fn get(&self, saved_key: &str) -> Option<&OverrideRecord> {
        self.overrides.get(saved_key)
    }

    /// Insert or update the record stored under `record.saved_key`.
    ///
    /// The original title and icon are write-once: when a record already
    /// exists, its originals replace whatever the incoming record carries.
    pub fn upsert(&mut self, mut record: OverrideRecord) -> &OverrideRecord {
        if let Some(existing) = self.overrides.get(&record.saved_key) {
            record.original_title = existing.original_title.clone();
            record.original_icon_ref = existing.original_icon_ref.clone();
        }
        let key = record.saved_key.clone();
        self.overrides.insert(key.clone(), record);
        &self.overrides[&key]
    }

    pub fn remove(&mut self, saved_key: &str) -> Option<OverrideRecord> {
        self.overrides.remove(saved_key)
    }

    pub fn records(&self) -> impl Iterator<Item = &OverrideRecord> {
        self.overrides.values()
    }

    /// Records ordered for the settings table, most recently saved first
    pub fn records_newest_first(&self) -> Vec<&OverrideRecord> {
        let mut records: Vec<&OverrideRecord> = self.overrides.values().collect();
        records.sort_by(|a, b| {
            b.timestamp
                .total_cmp(&a.timestamp)
                .then_with(|| a.saved_key.cmp(&b.saved_key))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Async key-value persistence for [`StorageData`]
#[async_trait(?Send)]
pub trait OverrideStore {
    async fn load(&self) -> Result<StorageData, OverrideError>;

    async fn save(&self, data: &StorageData) -> Result<(), OverrideError>;
}
