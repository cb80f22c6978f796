/// Conflict resolution between override records that match the same URL

use crate::tab_data::OverrideRecord;
use std::cmp::Ordering;

/// Order two matching records so that the preferred one sorts first.
///
/// Keys, in order: rule priority ascending, pattern length descending,
/// timestamp descending, saved key ascending. The last key only breaks ties
/// that are otherwise exact, keeping the outcome independent of input order.
fn precedence(a: &OverrideRecord, b: &OverrideRecord) -> Ordering {
    a.match_rule
        .priority()
        .cmp(&b.match_rule.priority())
        .then_with(|| pattern_len(b).cmp(&pattern_len(a)))
        .then_with(|| b.timestamp.total_cmp(&a.timestamp))
        .then_with(|| a.saved_key.cmp(&b.saved_key))
}

// Characters, not bytes, so non-ASCII paths compare by visible length
fn pattern_len(record: &OverrideRecord) -> usize {
    record.pattern().chars().count()
}

/// Pick the single record that applies to `url`, if any
pub fn resolve<'a, I>(url: &str, records: I) -> Option<&'a OverrideRecord>
where
    I: IntoIterator<Item = &'a OverrideRecord>,
{
    records
        .into_iter()
        .filter(|record| record.matches_url(url))
        .min_by(|a, b| precedence(a, b))
}
