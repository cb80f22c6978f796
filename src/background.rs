/// Background service worker: owns the engine and feeds it browser lifecycle events

use crate::chrome::{ChromePageMutator, ChromeStorage, ChromeTabs, parse_message};
use crate::config::ExtensionConfig;
use crate::engine::{Engine, ReconcileOutcome, Trigger};
use crate::messages::BackgroundMessage;
use crate::tab_data::TabId;
use log::{debug, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

type ChromeEngine = Engine<ChromeStorage, ChromePageMutator, ChromeTabs>;

/// Handle given to background.js; each listener forwards `(tabId, url)` here
#[wasm_bindgen]
pub struct Background {
    engine: Rc<ChromeEngine>,
}

#[wasm_bindgen]
impl Background {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Background {
        Background {
            engine: Rc::new(Engine::new(
                ChromeStorage,
                ChromePageMutator,
                ChromeTabs,
                ExtensionConfig::default(),
            )),
        }
    }

    #[wasm_bindgen(js_name = onCommitted)]
    pub fn on_committed(&self, tab_id: TabId, url: String) {
        self.dispatch(tab_id, url, Trigger::NavigationCommitted);
    }

    #[wasm_bindgen(js_name = onDomReady)]
    pub fn on_dom_ready(&self, tab_id: TabId, url: String) {
        self.dispatch(tab_id, url, Trigger::DomReady);
    }

    #[wasm_bindgen(js_name = onCompleted)]
    pub fn on_completed(&self, tab_id: TabId, url: String) {
        self.dispatch(tab_id, url, Trigger::LoadCompleted);
    }

    /// chrome.tabs.onUpdated; only a finished load is interesting
    #[wasm_bindgen(js_name = onTabUpdated)]
    pub fn on_tab_updated(&self, tab_id: TabId, url: Option<String>, status: Option<String>) {
        if let (Some(url), Some("complete")) = (url, status.as_deref()) {
            self.dispatch(tab_id, url, Trigger::LoadCompleted);
        }
    }

    #[wasm_bindgen(js_name = onActivated)]
    pub fn on_activated(&self, tab_id: TabId, url: String) {
        self.dispatch(tab_id, url, Trigger::TabActivated);
    }

    /// chrome.runtime.onMessage
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message: JsValue) {
        let message = match parse_message(message) {
            Ok(message) => message,
            Err(e) => {
                debug!("{}", e);
                return;
            }
        };

        let engine = Rc::clone(&self.engine);
        spawn_local(async move {
            let outcomes = match &message {
                BackgroundMessage::OverrideUpdated { url, record } => engine.notify_updated(url, record).await,
                BackgroundMessage::OverrideRemoved { record } => engine.notify_removed(record).await,
            };
            for (tab_id, outcome) in outcomes {
                log_outcome(tab_id, &outcome);
            }
        });
    }
}

impl Background {
    fn dispatch(&self, tab_id: TabId, url: String, trigger: Trigger) {
        let engine = Rc::clone(&self.engine);
        spawn_local(async move {
            let outcome = engine.reconcile(tab_id, &url, trigger).await;
            log_outcome(tab_id, &outcome);
        });
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

fn log_outcome(tab_id: TabId, outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Failed { saved_key, error } => {
            warn!("Tab {}: could not apply {}: {}", tab_id, saved_key, error);
        }
        other => debug!("Tab {}: {:?}", tab_id, other),
    }
}
