/// In-memory collaborators for unit tests

use crate::error::OverrideError;
use crate::match_rule::MatchRule;
use crate::page::{PageMutator, TabDirectory};
use crate::storage::{OverrideStore, StorageData};
use crate::tab_data::{IconOverride, OriginalState, OverrideRecord, TabId, TabInfo};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub fn record(key: &str, rule: MatchRule, pattern: &str, title: &str, timestamp: f64) -> OverrideRecord {
    OverrideRecord {
        saved_key: key.to_string(),
        original_title: format!("Original {}", key),
        original_icon_ref: None,
        new_title: title.to_string(),
        icon_override: None,
        match_rule: rule,
        custom_pattern: pattern.to_string(),
        timestamp,
    }
}

pub fn with_icon(mut record: OverrideRecord, symbol: &str) -> OverrideRecord {
    record.icon_override = Some(IconOverride { symbol: symbol.to_string() });
    record
}

pub fn tab(id: TabId, url: &str, title: &str) -> TabInfo {
    TabInfo::new(id, url.to_string(), title.to_string())
}

/// Resolves to pending exactly once, waking itself, so joined futures interleave
pub struct YieldNow(bool);

pub fn yield_now() -> YieldNow {
    YieldNow(false)
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub data: RefCell<StorageData>,
    pub fail: Cell<bool>,
    pub loads: Cell<usize>,
    pub saves: Cell<usize>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<OverrideRecord>) -> Self {
        let store = MemoryStore::default();
        for record in records {
            store.data.borrow_mut().upsert(record);
        }
        store
    }
}

#[async_trait(?Send)]
impl OverrideStore for MemoryStore {
    async fn load(&self) -> Result<StorageData, OverrideError> {
        self.loads.set(self.loads.get() + 1);
        if self.fail.get() {
            return Err(OverrideError::Storage("quota exceeded".to_string()));
        }
        Ok(self.data.borrow().clone())
    }

    async fn save(&self, data: &StorageData) -> Result<(), OverrideError> {
        if self.fail.get() {
            return Err(OverrideError::Storage("quota exceeded".to_string()));
        }
        self.saves.set(self.saves.get() + 1);
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    Title(TabId, String),
    Icon(TabId, String),
    Release(TabId, Option<String>),
}

#[derive(Default)]
pub struct RecordingMutator {
    pub calls: RefCell<Vec<PageCall>>,
    pub denied_tabs: RefCell<HashSet<TabId>>,
    pub originals: RefCell<Option<OriginalState>>,
    pub yield_on_apply: Cell<bool>,
}

impl RecordingMutator {
    pub fn deny(&self, tab_id: TabId) {
        self.denied_tabs.borrow_mut().insert(tab_id);
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.borrow().clone()
    }

    fn check(&self, tab_id: TabId) -> Result<(), OverrideError> {
        if self.denied_tabs.borrow().contains(&tab_id) {
            Err(OverrideError::ApplyFailed("Cannot access contents of the page".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait(?Send)]
impl PageMutator for RecordingMutator {
    async fn apply_title(&self, tab_id: TabId, title: &str) -> Result<(), OverrideError> {
        if self.yield_on_apply.get() {
            yield_now().await;
        }
        self.check(tab_id)?;
        self.calls.borrow_mut().push(PageCall::Title(tab_id, title.to_string()));
        Ok(())
    }

    async fn apply_icon(&self, tab_id: TabId, symbol: &str) -> Result<(), OverrideError> {
        self.check(tab_id)?;
        self.calls.borrow_mut().push(PageCall::Icon(tab_id, symbol.to_string()));
        Ok(())
    }

    async fn release_icon(&self, tab_id: TabId, original_icon_ref: Option<&str>) -> Result<(), OverrideError> {
        self.check(tab_id)?;
        self.calls
            .borrow_mut()
            .push(PageCall::Release(tab_id, original_icon_ref.map(str::to_string)));
        Ok(())
    }

    async fn original_state(&self, tab_id: TabId) -> Result<OriginalState, OverrideError> {
        self.check(tab_id)?;
        self.originals
            .borrow()
            .clone()
            .ok_or_else(|| OverrideError::ApplyFailed("no script result".to_string()))
    }
}

#[derive(Default)]
pub struct FakeTabs {
    pub tabs: RefCell<Vec<TabInfo>>,
}

impl FakeTabs {
    pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
        FakeTabs { tabs: RefCell::new(tabs) }
    }
}

#[async_trait(?Send)]
impl TabDirectory for FakeTabs {
    async fn open_tabs(&self) -> Result<Vec<TabInfo>, OverrideError> {
        Ok(self.tabs.borrow().clone())
    }

    async fn active_tab(&self) -> Result<TabInfo, OverrideError> {
        let tabs = self.tabs.borrow();
        tabs.iter()
            .find(|tab| tab.active)
            .or_else(|| tabs.first())
            .cloned()
            .ok_or_else(|| OverrideError::ApplyFailed("no active tab".to_string()))
    }
}
