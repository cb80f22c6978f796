/// Reconciliation engine: reapplies the winning override whenever the browser may have reset a tab
///
/// Every lifecycle trigger funnels into [`Engine::reconcile`]. Reconciles for
/// the same tab never overlap: a trigger that arrives while its tab is busy is
/// parked, and the running handler picks it up once it finishes. Only the
/// newest parked trigger is kept since it reflects the freshest URL.

use crate::config::ExtensionConfig;
use crate::error::OverrideError;
use crate::page::{PageMutator, TabDirectory};
use crate::protected::is_protected_url;
use crate::resolver::resolve;
use crate::storage::OverrideStore;
use crate::tab_data::{OriginalState, OverrideRecord, TabId};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    NavigationCommitted,
    DomReady,
    LoadCompleted,
    TabActivated,
    OverrideNotified,
}

impl Trigger {
    /// Triggers after which the page may have rewritten its own title or icon
    pub fn may_reset_page(self) -> bool {
        matches!(
            self,
            Trigger::NavigationCommitted | Trigger::DomReady | Trigger::LoadCompleted
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Browser-internal page, left alone
    Protected,
    /// Nothing matches, the page keeps whatever it shows
    NoWinner,
    /// Saved overrides could not be read; the page is left untouched
    StorageUnavailable,
    Applied { saved_key: String },
    /// Same override already applied earlier in this handling cycle
    Unchanged { saved_key: String },
    /// Another reconcile for the tab is running and will pick this one up
    Queued,
    Failed { saved_key: String, error: OverrideError },
    /// Original title and icon put back after the last matching rule was removed
    Restored { saved_key: String },
}

#[derive(Debug, Clone, PartialEq)]
struct AppliedOverride {
    url: String,
    saved_key: String,
    title: String,
    icon: Option<String>,
}

impl AppliedOverride {
    fn from_record(url: &str, record: &OverrideRecord) -> Self {
        AppliedOverride {
            url: url.to_string(),
            saved_key: record.saved_key.clone(),
            title: record.new_title.clone(),
            icon: record.icon_symbol().map(str::to_string),
        }
    }
}

/// Per-tab bookkeeping, alive only while a handling cycle runs
#[derive(Debug, Default)]
struct TabSlot {
    pending: Option<(String, Trigger)>,
    /// Deleted record to restore from if the parked run finds no winner
    removed: Option<OverrideRecord>,
    applied: Option<AppliedOverride>,
}

pub struct Engine<S, M, T> {
    store: S,
    mutator: M,
    tabs: T,
    config: ExtensionConfig,
    busy: RefCell<HashMap<TabId, TabSlot>>,
}

impl<S, M, T> Engine<S, M, T>
where
    S: OverrideStore,
    M: PageMutator,
    T: TabDirectory,
{
    pub fn new(store: S, mutator: M, tabs: T, config: ExtensionConfig) -> Self {
        Engine {
            store,
            mutator,
            tabs,
            config,
            busy: RefCell::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn mutator(&self) -> &M {
        &self.mutator
    }

    /// Bring `tab_id` in line with the override that wins for `url`.
    ///
    /// Never fails: mutator and storage errors come back as outcomes so that a
    /// misbehaving tab cannot stall triggers for the others.
    pub async fn reconcile(&self, tab_id: TabId, url: &str, trigger: Trigger) -> ReconcileOutcome {
        self.run(tab_id, url, trigger, None).await
    }

    /// Same as [`Engine::reconcile`], restoring from `removed` when no rule is left.
    ///
    /// A removal that finds the tab busy rides along with the parked trigger,
    /// so the restore still happens once the running cycle drains.
    async fn run(
        &self,
        tab_id: TabId,
        url: &str,
        trigger: Trigger,
        removed: Option<&OverrideRecord>,
    ) -> ReconcileOutcome {
        debug!("{:?} for tab {} at {}", trigger, tab_id, url);

        if is_protected_url(url, &self.config.protected_prefixes) {
            return ReconcileOutcome::Protected;
        }

        {
            let mut busy = self.busy.borrow_mut();
            if let Some(slot) = busy.get_mut(&tab_id) {
                slot.pending = Some((url.to_string(), trigger));
                if let Some(record) = removed {
                    slot.removed = Some(record.clone());
                }
                return ReconcileOutcome::Queued;
            }
            busy.insert(tab_id, TabSlot::default());
        }

        let mut url = url.to_string();
        let mut trigger = trigger;
        let mut removed = removed.cloned();
        loop {
            let mut outcome = self.reconcile_once(tab_id, &url, trigger).await;
            if let Some(record) = removed.take() {
                if outcome == ReconcileOutcome::NoWinner {
                    outcome = self.restore(tab_id, &url, &record).await;
                }
            }

            let next = {
                let mut busy = self.busy.borrow_mut();
                let next = busy
                    .get_mut(&tab_id)
                    .and_then(|slot| slot.pending.take().map(|pending| (pending, slot.removed.take())));
                if next.is_none() {
                    busy.remove(&tab_id);
                }
                next
            };

            match next {
                Some(((next_url, next_trigger), next_removed)) => {
                    url = next_url;
                    trigger = next_trigger;
                    removed = next_removed;
                }
                None => return outcome,
            }
        }
    }

    async fn reconcile_once(&self, tab_id: TabId, url: &str, trigger: Trigger) -> ReconcileOutcome {
        let data = match self.store.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping tab {}: {}", tab_id, e);
                return ReconcileOutcome::StorageUnavailable;
            }
        };

        let Some(winner) = resolve(url, data.records()) else {
            return ReconcileOutcome::NoWinner;
        };

        let fingerprint = AppliedOverride::from_record(url, winner);
        if !trigger.may_reset_page() && self.last_applied(tab_id).as_ref() == Some(&fingerprint) {
            return ReconcileOutcome::Unchanged {
                saved_key: winner.saved_key.clone(),
            };
        }

        match self.apply(tab_id, winner).await {
            Ok(()) => {
                if let Some(slot) = self.busy.borrow_mut().get_mut(&tab_id) {
                    slot.applied = Some(fingerprint);
                }
                ReconcileOutcome::Applied {
                    saved_key: winner.saved_key.clone(),
                }
            }
            Err(error) => {
                debug!("Could not apply {} to tab {}: {}", winner.saved_key, tab_id, error);
                ReconcileOutcome::Failed {
                    saved_key: winner.saved_key.clone(),
                    error,
                }
            }
        }
    }

    async fn apply(&self, tab_id: TabId, record: &OverrideRecord) -> Result<(), OverrideError> {
        self.mutator.apply_title(tab_id, &record.new_title).await?;
        if let Some(symbol) = record.icon_symbol() {
            self.mutator.apply_icon(tab_id, symbol).await?;
        }
        Ok(())
    }

    fn last_applied(&self, tab_id: TabId) -> Option<AppliedOverride> {
        self.busy
            .borrow()
            .get(&tab_id)
            .and_then(|slot| slot.applied.clone())
    }

    /// Open tabs `record` matches, plus the tab at `saved_url` when given
    async fn affected_tabs(&self, record: &OverrideRecord, saved_url: Option<&str>) -> Vec<(TabId, String)> {
        match self.tabs.open_tabs().await {
            Ok(tabs) => tabs
                .into_iter()
                .filter(|tab| saved_url == Some(tab.url.as_str()) || record.matches_url(&tab.url))
                .map(|tab| (tab.id, tab.url))
                .collect(),
            Err(e) => {
                warn!("Could not list open tabs: {}", e);
                Vec::new()
            }
        }
    }

    /// Re-run reconciliation for every open tab the saved `record` may now cover
    pub async fn notify_updated(&self, url: &str, record: &OverrideRecord) -> Vec<(TabId, ReconcileOutcome)> {
        let mut outcomes = Vec::new();
        for (tab_id, tab_url) in self.affected_tabs(record, Some(url)).await {
            let outcome = self.reconcile(tab_id, &tab_url, Trigger::OverrideNotified).await;
            outcomes.push((tab_id, outcome));
        }
        info!("Override for {} reconciled across {} tab(s)", record.saved_key, outcomes.len());
        outcomes
    }

    /// After a record was deleted, let remaining rules take over, or restore the
    /// page's own title and icon where nothing else matches.
    pub async fn notify_removed(&self, record: &OverrideRecord) -> Vec<(TabId, ReconcileOutcome)> {
        let mut outcomes = Vec::new();
        for (tab_id, tab_url) in self.affected_tabs(record, None).await {
            let outcome = self
                .run(tab_id, &tab_url, Trigger::OverrideNotified, Some(record))
                .await;
            outcomes.push((tab_id, outcome));
        }
        outcomes
    }

    async fn restore(&self, tab_id: TabId, url: &str, record: &OverrideRecord) -> ReconcileOutcome {
        match self.restore_original(tab_id, url, record).await {
            Ok(()) => ReconcileOutcome::Restored {
                saved_key: record.saved_key.clone(),
            },
            Err(error) => ReconcileOutcome::Failed {
                saved_key: record.saved_key.clone(),
                error,
            },
        }
    }

    /// Undo `record` on a tab at `url`.
    ///
    /// Only the page the record was saved from gets the captured originals.
    /// Any other page covered by the pattern gets back the title it kept for
    /// itself before the first override.
    async fn restore_original(&self, tab_id: TabId, url: &str, record: &OverrideRecord) -> Result<(), OverrideError> {
        let original = if url == record.saved_key {
            OriginalState {
                title: record.original_title.clone(),
                icon_ref: record.original_icon_ref.clone(),
            }
        } else {
            self.mutator.original_state(tab_id).await?
        };

        self.mutator.apply_title(tab_id, &original.title).await?;
        if record.icon_override.is_some() {
            self.mutator
                .release_icon(tab_id, original.icon_ref.as_deref())
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_rule::MatchRule;
    use crate::testing::{FakeTabs, MemoryStore, PageCall, RecordingMutator, record, tab, with_icon};
    use futures::executor::block_on;

    type TestEngine = Engine<MemoryStore, RecordingMutator, FakeTabs>;

    fn engine(records: Vec<OverrideRecord>, tabs: Vec<crate::tab_data::TabInfo>) -> TestEngine {
        Engine::new(
            MemoryStore::with_records(records),
            RecordingMutator::default(),
            FakeTabs::with_tabs(tabs),
            ExtensionConfig::default(),
        )
    }

    #[test]
    fn test_applies_winner_title_and_icon() {
        let engine = engine(
            vec![with_icon(
                record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0),
                "🔥",
            )],
            vec![],
        );

        let outcome = block_on(engine.reconcile(1, "https://a.com", Trigger::LoadCompleted));

        assert_eq!(outcome, ReconcileOutcome::Applied { saved_key: "https://a.com".to_string() });
        assert_eq!(
            engine.mutator().calls(),
            vec![PageCall::Title(1, "A".to_string()), PageCall::Icon(1, "🔥".to_string())]
        );
    }

    #[test]
    fn test_no_winner_leaves_page_alone() {
        let engine = engine(
            vec![record("https://b.com", MatchRule::Equals, "https://b.com", "B", 1.0)],
            vec![],
        );

        let outcome = block_on(engine.reconcile(1, "https://a.com", Trigger::NavigationCommitted));

        assert_eq!(outcome, ReconcileOutcome::NoWinner);
        assert!(engine.mutator().calls().is_empty());
    }

    #[test]
    fn test_protected_page_is_skipped() {
        let engine = engine(
            vec![record("c", MatchRule::Contains, "extensions", "Nope", 1.0)],
            vec![],
        );

        let outcome = block_on(engine.reconcile(1, "chrome://extensions", Trigger::TabActivated));

        assert_eq!(outcome, ReconcileOutcome::Protected);
        assert!(engine.mutator().calls().is_empty());
        assert_eq!(engine.store().loads.get(), 0);
    }

    #[test]
    fn test_storage_failure_leaves_page_alone() {
        let engine = engine(
            vec![record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0)],
            vec![],
        );
        engine.store().fail.set(true);

        let outcome = block_on(engine.reconcile(1, "https://a.com", Trigger::DomReady));

        assert_eq!(outcome, ReconcileOutcome::StorageUnavailable);
        assert!(engine.mutator().calls().is_empty());
    }

    #[test]
    fn test_apply_failure_is_reported_not_raised() {
        let engine = engine(
            vec![record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0)],
            vec![],
        );
        engine.mutator().deny(1);

        let failed = block_on(engine.reconcile(1, "https://a.com", Trigger::LoadCompleted));
        let other = block_on(engine.reconcile(2, "https://a.com", Trigger::LoadCompleted));

        assert!(matches!(
            failed,
            ReconcileOutcome::Failed { error: OverrideError::ApplyFailed(_), .. }
        ));
        assert_eq!(other, ReconcileOutcome::Applied { saved_key: "https://a.com".to_string() });
    }

    #[test]
    fn test_every_trigger_reapplies_after_cycle_ends() {
        let engine = engine(
            vec![record("https://a.com", MatchRule::StartsWith, "https://a.com", "A", 1.0)],
            vec![],
        );

        for trigger in [
            Trigger::NavigationCommitted,
            Trigger::DomReady,
            Trigger::LoadCompleted,
            Trigger::TabActivated,
        ] {
            block_on(engine.reconcile(3, "https://a.com/page", trigger));
        }

        assert_eq!(engine.mutator().calls().len(), 4);
    }

    #[test]
    fn test_same_tab_reconciles_are_serialized() {
        let engine = engine(
            vec![
                record("https://a.com/1", MatchRule::Equals, "https://a.com/1", "One", 1.0),
                record("https://a.com/2", MatchRule::Equals, "https://a.com/2", "Two", 1.0),
            ],
            vec![],
        );
        engine.mutator().yield_on_apply.set(true);

        let (first, second, third) = block_on(async {
            futures::join!(
                engine.reconcile(1, "https://a.com/1", Trigger::NavigationCommitted),
                engine.reconcile(1, "https://a.com/1", Trigger::DomReady),
                engine.reconcile(1, "https://a.com/2", Trigger::NavigationCommitted),
            )
        });

        assert_eq!(second, ReconcileOutcome::Queued);
        assert_eq!(third, ReconcileOutcome::Queued);
        // The parked DomReady was superseded by the newer navigation
        assert_eq!(first, ReconcileOutcome::Applied { saved_key: "https://a.com/2".to_string() });
        assert_eq!(
            engine.mutator().calls(),
            vec![PageCall::Title(1, "One".to_string()), PageCall::Title(1, "Two".to_string())]
        );
    }

    #[test]
    fn test_different_tabs_interleave() {
        let engine = engine(
            vec![record("a", MatchRule::Contains, "a.com", "A", 1.0)],
            vec![],
        );
        engine.mutator().yield_on_apply.set(true);

        let (first, second) = block_on(async {
            futures::join!(
                engine.reconcile(1, "https://a.com/x", Trigger::LoadCompleted),
                engine.reconcile(2, "https://a.com/y", Trigger::LoadCompleted),
            )
        });

        assert_eq!(first, ReconcileOutcome::Applied { saved_key: "a".to_string() });
        assert_eq!(second, ReconcileOutcome::Applied { saved_key: "a".to_string() });
    }

    #[test]
    fn test_activation_within_cycle_skips_redundant_apply() {
        let engine = engine(
            vec![record("a", MatchRule::Contains, "a.com", "A", 1.0)],
            vec![],
        );
        engine.mutator().yield_on_apply.set(true);

        let (first, _) = block_on(async {
            futures::join!(
                engine.reconcile(1, "https://a.com/x", Trigger::LoadCompleted),
                engine.reconcile(1, "https://a.com/x", Trigger::TabActivated),
            )
        });

        assert_eq!(first, ReconcileOutcome::Unchanged { saved_key: "a".to_string() });
        assert_eq!(engine.mutator().calls(), vec![PageCall::Title(1, "A".to_string())]);
    }

    #[test]
    fn test_notify_updated_reaches_all_matching_tabs() {
        let updated = record("https://a.com/x", MatchRule::StartsWith, "https://a.com", "Shared", 5.0);
        let engine = engine(
            vec![updated.clone()],
            vec![
                tab(1, "https://a.com/x", "X"),
                tab(2, "https://a.com/y", "Y"),
                tab(3, "https://b.com", "B"),
                tab(4, "chrome://newtab", "New Tab"),
            ],
        );

        let outcomes = block_on(engine.notify_updated("https://a.com/x", &updated));

        let touched: Vec<TabId> = outcomes.iter().map(|(id, _)| *id).collect();
        assert_eq!(touched, vec![1, 2]);
        assert_eq!(
            engine.mutator().calls(),
            vec![
                PageCall::Title(1, "Shared".to_string()),
                PageCall::Title(2, "Shared".to_string()),
            ]
        );
    }

    #[test]
    fn test_notify_updated_includes_saved_tab_even_if_pattern_moved() {
        let updated = record("https://a.com/x", MatchRule::Equals, "https://elsewhere.com", "Moved", 5.0);
        let engine = engine(vec![updated.clone()], vec![tab(1, "https://a.com/x", "X")]);

        let outcomes = block_on(engine.notify_updated("https://a.com/x", &updated));

        // The tab is revisited, but the rule no longer covers it
        assert_eq!(outcomes, vec![(1, ReconcileOutcome::NoWinner)]);
    }

    #[test]
    fn test_notify_removed_restores_when_nothing_else_matches() {
        let mut removed = with_icon(
            record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0),
            "🔥",
        );
        removed.original_icon_ref = Some("https://a.com/favicon.ico".to_string());
        let engine = engine(vec![], vec![tab(1, "https://a.com", "A")]);

        let outcomes = block_on(engine.notify_removed(&removed));

        assert_eq!(
            outcomes,
            vec![(1, ReconcileOutcome::Restored { saved_key: "https://a.com".to_string() })]
        );
        assert_eq!(
            engine.mutator().calls(),
            vec![
                PageCall::Title(1, "Original https://a.com".to_string()),
                PageCall::Release(1, Some("https://a.com/favicon.ico".to_string())),
            ]
        );
    }

    #[test]
    fn test_notify_removed_hands_over_to_remaining_rule() {
        let removed = record("https://a.com", MatchRule::Equals, "https://a.com", "Exact", 2.0);
        let fallback = record("any-a", MatchRule::Contains, "a.com", "Fallback", 1.0);
        let engine = engine(vec![fallback], vec![tab(1, "https://a.com", "A")]);

        let outcomes = block_on(engine.notify_removed(&removed));

        assert_eq!(outcomes, vec![(1, ReconcileOutcome::Applied { saved_key: "any-a".to_string() })]);
        assert_eq!(engine.mutator().calls(), vec![PageCall::Title(1, "Fallback".to_string())]);
    }

    #[test]
    fn test_notify_removed_restores_each_page_to_its_own_title() {
        let mut removed = with_icon(
            record("https://a.com/inbox", MatchRule::StartsWith, "https://a.com", "Mail", 1.0),
            "📬",
        );
        removed.original_icon_ref = Some("https://a.com/inbox.ico".to_string());
        let engine = engine(
            vec![],
            vec![tab(1, "https://a.com/inbox", "Mail"), tab(2, "https://a.com/calendar", "Mail")],
        );
        *engine.mutator().originals.borrow_mut() = Some(OriginalState {
            title: "Calendar".to_string(),
            icon_ref: Some("https://a.com/calendar.ico".to_string()),
        });

        let outcomes = block_on(engine.notify_removed(&removed));

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            engine.mutator().calls(),
            vec![
                PageCall::Title(1, "Original https://a.com/inbox".to_string()),
                PageCall::Release(1, Some("https://a.com/inbox.ico".to_string())),
                PageCall::Title(2, "Calendar".to_string()),
                PageCall::Release(2, Some("https://a.com/calendar.ico".to_string())),
            ]
        );
    }

    #[test]
    fn test_notify_removed_on_busy_tab_restores_after_drain() {
        let removed = record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0);
        let engine = engine(vec![removed.clone()], vec![tab(1, "https://a.com", "A")]);
        engine.mutator().yield_on_apply.set(true);

        let (first, outcomes) = block_on(async {
            futures::join!(
                engine.reconcile(1, "https://a.com", Trigger::LoadCompleted),
                async {
                    engine.store().data.borrow_mut().remove("https://a.com");
                    engine.notify_removed(&removed).await
                },
            )
        });

        assert_eq!(outcomes, vec![(1, ReconcileOutcome::Queued)]);
        assert_eq!(first, ReconcileOutcome::Restored { saved_key: "https://a.com".to_string() });
        assert_eq!(
            engine.mutator().calls(),
            vec![
                PageCall::Title(1, "A".to_string()),
                PageCall::Title(1, "Original https://a.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_notify_removed_with_unreadable_storage_touches_nothing() {
        let removed = record("https://a.com", MatchRule::Equals, "https://a.com", "A", 1.0);
        let engine = engine(vec![], vec![tab(1, "https://a.com", "A")]);
        engine.store().fail.set(true);

        let outcomes = block_on(engine.notify_removed(&removed));

        assert_eq!(outcomes, vec![(1, ReconcileOutcome::StorageUnavailable)]);
        assert!(engine.mutator().calls().is_empty());
    }

    #[test]
    fn test_notify_removed_skips_saved_tab_outside_pattern() {
        let removed = record("https://a.com/x", MatchRule::Equals, "https://elsewhere.com", "Moved", 5.0);
        let engine = engine(vec![], vec![tab(1, "https://a.com/x", "X")]);

        let outcomes = block_on(engine.notify_removed(&removed));

        assert!(outcomes.is_empty());
        assert!(engine.mutator().calls().is_empty());
    }
}
