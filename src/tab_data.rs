/// Data structures for Tab Renamer
use crate::match_rule::MatchRule;
use serde::{Deserialize, Serialize};

pub type TabId = i32;

/// Information about a browser tab, as reported by chrome.tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl TabInfo {
    pub fn new(id: TabId, url: String, title: String) -> TabInfo {
        TabInfo {
            id,
            url,
            title,
            fav_icon_url: None,
            active: false,
        }
    }
}

/// What a page looked like before any override touched it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalState {
    pub title: String,
    #[serde(default)]
    pub icon_ref: Option<String>,
}

/// Replacement favicon, drawn from a single emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconOverride {
    pub symbol: String,
}

/// A saved title/icon override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub saved_key: String,
    pub original_title: String,
    #[serde(default)]
    pub original_icon_ref: Option<String>,
    pub new_title: String,
    #[serde(default)]
    pub icon_override: Option<IconOverride>,
    #[serde(default)]
    pub match_rule: MatchRule,
    #[serde(default)]
    pub custom_pattern: String,
    pub timestamp: f64,
}

impl OverrideRecord {
    /// The pattern tested against page URLs; an unset custom pattern means the saved URL itself
    pub fn pattern(&self) -> &str {
        if self.custom_pattern.is_empty() {
            &self.saved_key
        } else {
            &self.custom_pattern
        }
    }

    pub fn icon_symbol(&self) -> Option<&str> {
        self.icon_override.as_ref().map(|icon| icon.symbol.as_str())
    }

    pub fn matches_url(&self, url: &str) -> bool {
        crate::match_rule::matches(url, self.pattern(), self.match_rule)
    }
}
