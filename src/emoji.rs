/// Built-in emoji catalog for the favicon picker

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Smileys,
    Animals,
    Food,
    Activity,
    Travel,
    Objects,
    Symbols,
    Flags,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Smileys,
        Category::Animals,
        Category::Food,
        Category::Activity,
        Category::Travel,
        Category::Objects,
        Category::Symbols,
        Category::Flags,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Smileys => "Smileys",
            Category::Animals => "Animals",
            Category::Food => "Food & Drink",
            Category::Activity => "Activity",
            Category::Travel => "Travel",
            Category::Objects => "Objects",
            Category::Symbols => "Symbols",
            Category::Flags => "Flags",
        }
    }

    /// Tab glyph shown in the picker header
    pub fn tab_icon(self) -> &'static str {
        match self {
            Category::Smileys => "😀",
            Category::Animals => "🐶",
            Category::Food => "🍔",
            Category::Activity => "⚽",
            Category::Travel => "✈️",
            Category::Objects => "💡",
            Category::Symbols => "❤️",
            Category::Flags => "🏁",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emoji {
    pub symbol: &'static str,
    pub category: Category,
    pub keywords: &'static [&'static str],
}

const fn emoji(symbol: &'static str, category: Category, keywords: &'static [&'static str]) -> Emoji {
    Emoji { symbol, category, keywords }
}

use Category::*;

pub const CATALOG: &[Emoji] = &[
    emoji("😀", Smileys, &["grin", "happy", "smile"]),
    emoji("😂", Smileys, &["joy", "laugh", "tears"]),
    emoji("😊", Smileys, &["blush", "happy", "smile"]),
    emoji("😍", Smileys, &["love", "heart", "eyes"]),
    emoji("🤔", Smileys, &["think", "hmm", "question"]),
    emoji("😴", Smileys, &["sleep", "tired", "zzz"]),
    emoji("😎", Smileys, &["cool", "sunglasses"]),
    emoji("🤖", Smileys, &["robot", "bot", "ai"]),
    emoji("🐶", Animals, &["dog", "puppy", "pet"]),
    emoji("🐱", Animals, &["cat", "kitten", "pet"]),
    emoji("🦊", Animals, &["fox"]),
    emoji("🐼", Animals, &["panda", "bear"]),
    emoji("🐙", Animals, &["octopus", "github"]),
    emoji("🦀", Animals, &["crab", "rust"]),
    emoji("🐍", Animals, &["snake", "python"]),
    emoji("🐝", Animals, &["bee", "busy", "insect"]),
    emoji("🍎", Food, &["apple", "fruit", "red"]),
    emoji("🍕", Food, &["pizza", "food"]),
    emoji("🍔", Food, &["burger", "hamburger", "food"]),
    emoji("☕", Food, &["coffee", "tea", "drink", "break"]),
    emoji("🍺", Food, &["beer", "drink"]),
    emoji("🍰", Food, &["cake", "dessert", "birthday"]),
    emoji("⚽", Activity, &["soccer", "football", "ball", "sport"]),
    emoji("🏀", Activity, &["basketball", "ball", "sport"]),
    emoji("🎮", Activity, &["game", "controller", "play"]),
    emoji("🎵", Activity, &["music", "note", "song"]),
    emoji("🎨", Activity, &["art", "paint", "design"]),
    emoji("🏆", Activity, &["trophy", "win", "award"]),
    emoji("✈️", Travel, &["plane", "flight", "travel"]),
    emoji("🚀", Travel, &["rocket", "launch", "deploy", "ship"]),
    emoji("🚗", Travel, &["car", "drive"]),
    emoji("🏠", Travel, &["home", "house"]),
    emoji("🌍", Travel, &["earth", "world", "globe"]),
    emoji("🏖️", Travel, &["beach", "vacation", "holiday"]),
    emoji("💡", Objects, &["idea", "light", "bulb"]),
    emoji("📧", Objects, &["email", "mail", "inbox"]),
    emoji("📬", Objects, &["mailbox", "mail", "inbox"]),
    emoji("📅", Objects, &["calendar", "date", "schedule"]),
    emoji("📝", Objects, &["memo", "note", "write", "docs"]),
    emoji("📊", Objects, &["chart", "stats", "dashboard"]),
    emoji("💻", Objects, &["laptop", "computer", "code"]),
    emoji("🔧", Objects, &["wrench", "tool", "settings"]),
    emoji("📚", Objects, &["books", "library", "read", "docs"]),
    emoji("🔒", Objects, &["lock", "secure", "private"]),
    emoji("❤️", Symbols, &["heart", "love", "red"]),
    emoji("⭐", Symbols, &["star", "favorite"]),
    emoji("🔥", Symbols, &["fire", "hot", "urgent"]),
    emoji("✅", Symbols, &["check", "done", "ok"]),
    emoji("❌", Symbols, &["cross", "no", "error"]),
    emoji("⚠️", Symbols, &["warning", "caution", "alert"]),
    emoji("🔴", Symbols, &["red", "circle", "live", "prod"]),
    emoji("🟢", Symbols, &["green", "circle", "ok", "dev"]),
    emoji("🔵", Symbols, &["blue", "circle"]),
    emoji("🟡", Symbols, &["yellow", "circle", "staging"]),
    emoji("🏁", Flags, &["checkered", "finish", "race"]),
    emoji("🚩", Flags, &["red", "flag", "triangular"]),
    emoji("🏳️", Flags, &["white", "flag"]),
    emoji("🏴", Flags, &["black", "flag"]),
];

pub fn by_category(category: Category) -> impl Iterator<Item = &'static Emoji> {
    CATALOG.iter().filter(move |e| e.category == category)
}

/// Case-insensitive keyword substring search; a blank keyword finds nothing
pub fn search(keyword: &str) -> Vec<&'static Emoji> {
    let term = keyword.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    CATALOG
        .iter()
        .filter(|e| e.keywords.iter().any(|kw| kw.to_lowercase().contains(&term)))
        .collect()
}
