/// Tab Renamer - Chrome Extension for custom tab titles and favicons
/// Built with Rust + WASM + Yew

mod background;
mod chrome;
mod config;
mod emoji;
mod engine;
mod error;
mod match_rule;
mod messages;
mod operations;
mod page;
mod protected;
mod resolver;
mod storage;
mod tab_data;
#[cfg(test)]
mod testing;
pub mod ui;

pub use background::Background;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the matcher for JavaScript access
#[wasm_bindgen(js_name = isUrlMatched)]
pub fn is_url_matched(current_url: &str, pattern: &str, rule: &str) -> bool {
    match_rule::matches(current_url, pattern, match_rule::MatchRule::from_str_or_default(rule))
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the settings page
#[wasm_bindgen]
pub fn start_settings() {
    yew::Renderer::<ui::settings::SettingsPage>::new().render();
}
