/// Extension-wide constants and the tunable configuration built from them

/// chrome.storage.local key holding the override map
pub const OVERRIDES_KEY: &str = "overrides";

/// chrome.storage.local key holding the frequently used icon list
pub const FREQUENTLY_USED_KEY: &str = "frequentlyUsed";

/// Longest accepted title, counted in characters after trimming
pub const MAX_TITLE_LENGTH: usize = 200;

/// How many recently picked icons the popup remembers
pub const FREQUENTLY_USED_CAPACITY: usize = 18;

/// URL prefixes the browser never lets an extension script into
pub const PROTECTED_PREFIXES: &[&str] = &["chrome://", "edge://", "about:", "chrome-extension://"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionConfig {
    pub max_title_length: usize,
    pub frequently_used_capacity: usize,
    pub protected_prefixes: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig {
            max_title_length: MAX_TITLE_LENGTH,
            frequently_used_capacity: FREQUENTLY_USED_CAPACITY,
            protected_prefixes: PROTECTED_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}
