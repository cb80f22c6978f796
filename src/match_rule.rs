/// URL match rules and the matcher used to test saved patterns
use serde::{Deserialize, Serialize};

/// How a saved pattern is compared against the current page URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRule {
    #[default]
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

impl MatchRule {
    pub const ALL: [MatchRule; 4] = [
        MatchRule::Equals,
        MatchRule::StartsWith,
        MatchRule::EndsWith,
        MatchRule::Contains,
    ];

    /// Rank used during conflict resolution; lower wins.
    ///
    /// Stricter comparisons outrank looser ones, so an exact rule is never
    /// shadowed by a `contains` rule that happens to be newer.
    pub fn priority(self) -> u8 {
        match self {
            MatchRule::Equals => 1,
            MatchRule::StartsWith => 2,
            MatchRule::EndsWith => 3,
            MatchRule::Contains => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchRule::Equals => "is",
            MatchRule::StartsWith => "starts with",
            MatchRule::EndsWith => "ends with",
            MatchRule::Contains => "contains",
        }
    }

    /// Stable identifier, identical to the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            MatchRule::Equals => "equals",
            MatchRule::StartsWith => "startsWith",
            MatchRule::EndsWith => "endsWith",
            MatchRule::Contains => "contains",
        }
    }

    /// Parse an identifier; anything unknown falls back to `Equals`
    pub fn from_str_or_default(value: &str) -> MatchRule {
        MatchRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == value)
            .unwrap_or_default()
    }
}

/// Test `current_url` against `pattern` under `rule`.
///
/// Comparison is case-sensitive with no normalization: no trailing-slash,
/// scheme or host canonicalization. An empty URL or pattern never matches.
pub fn matches(current_url: &str, pattern: &str, rule: MatchRule) -> bool {
    if current_url.is_empty() || pattern.is_empty() {
        return false;
    }

    match rule {
        MatchRule::Equals => current_url == pattern,
        MatchRule::StartsWith => current_url.starts_with(pattern),
        MatchRule::EndsWith => current_url.ends_with(pattern),
        MatchRule::Contains => current_url.contains(pattern),
    }
}
