/// User-initiated operations: saving, deleting and prefilling overrides

use crate::config::ExtensionConfig;
use crate::error::{OverrideError, ValidationError};
use crate::match_rule::MatchRule;
use crate::page::PageMutator;
use crate::protected::is_protected_url;
use crate::resolver::resolve;
use crate::storage::{OverrideStore, StorageData};
use crate::tab_data::{IconOverride, OriginalState, OverrideRecord, TabInfo};
use log::{info, warn};

/// Trim a title and check it against the length limit
pub fn validate_title(input: &str, max_len: usize) -> Result<String, ValidationError> {
    let title = input.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let len = title.chars().count();
    if len > max_len {
        return Err(ValidationError::TitleTooLong { len, max: max_len });
    }

    Ok(title.to_string())
}

/// Everything the popup form submits
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub tab: TabInfo,
    pub title: String,
    pub icon: Option<String>,
    pub match_rule: MatchRule,
    pub custom_pattern: Option<String>,
}

/// Validate, apply to the tab, then persist an override for `request.tab.url`.
///
/// Nothing is stored unless the page accepted the new title (and icon). The
/// original title and icon are captured only when the URL has no record yet.
pub async fn save_override<S, M>(
    store: &S,
    mutator: &M,
    config: &ExtensionConfig,
    request: SaveRequest,
    now: f64,
) -> Result<OverrideRecord, OverrideError>
where
    S: OverrideStore,
    M: PageMutator,
{
    let title = validate_title(&request.title, config.max_title_length)?;
    let tab = request.tab;

    if is_protected_url(&tab.url, &config.protected_prefixes) {
        return Err(OverrideError::ProtectedPage { url: tab.url });
    }

    let mut data = store.load().await?;

    let originals = match data.get(&tab.url) {
        Some(existing) => OriginalState {
            title: existing.original_title.clone(),
            icon_ref: existing.original_icon_ref.clone(),
        },
        None => capture_originals(mutator, &tab).await,
    };

    let icon = request
        .icon
        .map(|symbol| symbol.trim().to_string())
        .filter(|symbol| !symbol.is_empty());

    mutator.apply_title(tab.id, &title).await?;
    if let Some(symbol) = &icon {
        mutator.apply_icon(tab.id, symbol).await?;
    }

    let custom_pattern = request
        .custom_pattern
        .map(|pattern| pattern.trim().to_string())
        .filter(|pattern| !pattern.is_empty())
        .unwrap_or_else(|| tab.url.clone());

    // Keep an icon from an earlier save when this one didn't pick a new one
    let icon_override = match icon {
        Some(symbol) => Some(IconOverride { symbol }),
        None => data.get(&tab.url).and_then(|r| r.icon_override.clone()),
    };

    if let Some(icon) = &icon_override {
        data.frequently_used
            .push(&icon.symbol, config.frequently_used_capacity);
    }

    let record = data
        .upsert(OverrideRecord {
            saved_key: tab.url.clone(),
            original_title: originals.title,
            original_icon_ref: originals.icon_ref,
            new_title: title,
            icon_override,
            match_rule: request.match_rule,
            custom_pattern,
            timestamp: now,
        })
        .clone();

    store.save(&data).await?;
    info!("Saved override for {}", record.saved_key);

    Ok(record)
}

async fn capture_originals<M: PageMutator>(mutator: &M, tab: &TabInfo) -> OriginalState {
    match mutator.original_state(tab.id).await {
        Ok(state) => OriginalState {
            icon_ref: state.icon_ref.or_else(|| tab.fav_icon_url.clone()),
            title: state.title,
        },
        Err(e) => {
            warn!("Falling back to tab metadata for {}: {}", tab.url, e);
            OriginalState {
                title: tab.title.clone(),
                icon_ref: tab.fav_icon_url.clone(),
            }
        }
    }
}

/// Remove the record saved under `saved_key`, returning it if it existed
pub async fn delete_override<S: OverrideStore>(store: &S, saved_key: &str) -> Result<Option<OverrideRecord>, OverrideError> {
    let mut data = store.load().await?;
    let removed = data.remove(saved_key);
    if removed.is_some() {
        store.save(&data).await?;
        info!("Deleted override for {}", saved_key);
    }
    Ok(removed)
}

/// Initial values for the popup form
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefaults {
    pub title: String,
    pub icon: Option<String>,
    pub match_rule: MatchRule,
    pub pattern: String,
    /// Saved key of the rule the values came from, when it is not this exact URL
    pub matched_from: Option<String>,
}

pub fn form_defaults(data: &StorageData, tab: &TabInfo) -> FormDefaults {
    let from_record = |record: &OverrideRecord, matched_from: Option<String>| FormDefaults {
        title: record.new_title.clone(),
        icon: record.icon_symbol().map(str::to_string),
        match_rule: record.match_rule,
        pattern: record.pattern().to_string(),
        matched_from,
    };

    if let Some(record) = data.get(&tab.url) {
        return from_record(record, None);
    }

    match resolve(&tab.url, data.records()) {
        Some(winner) => from_record(winner, Some(winner.saved_key.clone())),
        None => FormDefaults {
            title: tab.title.clone(),
            icon: None,
            match_rule: MatchRule::Equals,
            pattern: tab.url.clone(),
            matched_from: None,
        },
    }
}
