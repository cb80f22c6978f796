/// Reusable UI components: the emoji picker and the URL match rule editor

use crate::emoji::{self, Category};
use crate::match_rule::MatchRule;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct EmojiPickerProps {
    pub frequently_used: Vec<String>,
    pub on_select: Callback<String>,
}

#[function_component(EmojiPicker)]
pub fn emoji_picker(props: &EmojiPickerProps) -> Html {
    let query = use_state(String::new);
    let category = use_state(|| Category::Smileys);

    let on_search_input = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                query.set(input.value());
            }
        })
    };

    let on_clear = {
        let query = query.clone();
        Callback::from(move |_: MouseEvent| query.set(String::new()))
    };

    let emoji_item = |symbol: &str| {
        let on_select = props.on_select.clone();
        let value = symbol.to_string();
        html! {
            <div
                key={symbol.to_string()}
                class="emoji-item"
                onclick={Callback::from(move |_: MouseEvent| on_select.emit(value.clone()))}
            >
                {symbol}
            </div>
        }
    };

    let searching = !query.trim().is_empty();
    let search_results = if searching {
        let results = emoji::search(&query);
        if results.is_empty() {
            html! { <div class="no-results-message">{"No emoji found"}</div> }
        } else {
            html! {
                <div class="emoji-grid">
                    {for results.iter().map(|e| emoji_item(e.symbol))}
                </div>
            }
        }
    } else {
        html! {}
    };

    html! {
        <div class="emoji-picker">
            <div class="search-container">
                <input
                    type="text"
                    class="search-input"
                    placeholder="Search emoji..."
                    value={(*query).clone()}
                    oninput={on_search_input}
                />
                if searching {
                    <button class="search-clear" onclick={on_clear}>{"✕"}</button>
                }
            </div>

            if searching {
                {search_results}
            } else {
                <div class="emoji-tabs">
                    {for Category::ALL.iter().map(|c| {
                        let selected = *c == *category;
                        let category = category.clone();
                        let c = *c;
                        html! {
                            <span
                                class={if selected { "tab active" } else { "tab" }}
                                title={c.label()}
                                onclick={Callback::from(move |_: MouseEvent| category.set(c))}
                            >
                                {c.tab_icon()}
                            </span>
                        }
                    })}
                </div>

                if !props.frequently_used.is_empty() {
                    <div class="emoji-category">
                        <div class="category-title">{"Frequently used"}</div>
                        <div class="emoji-grid">
                            {for props.frequently_used.iter().map(|s| emoji_item(s.as_str()))}
                        </div>
                    </div>
                }

                <div class="emoji-category">
                    <div class="category-title">{category.label()}</div>
                    <div class="emoji-grid">
                        {for emoji::by_category(*category).map(|e| emoji_item(e.symbol))}
                    </div>
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct MatchRuleEditorProps {
    pub rule: MatchRule,
    pub pattern: String,
    #[prop_or_default]
    pub matched_from: Option<String>,
    pub on_rule_change: Callback<MatchRule>,
    pub on_pattern_change: Callback<String>,
}

#[function_component(MatchRuleEditor)]
pub fn match_rule_editor(props: &MatchRuleEditorProps) -> Html {
    let expanded = use_state(|| false);

    let toggle = {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| expanded.set(!*expanded))
    };

    let on_pattern_input = {
        let on_pattern_change = props.on_pattern_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                on_pattern_change.emit(input.value());
            }
        })
    };

    html! {
        <div class="url-matcher">
            if *expanded {
                <div class="url-matcher-header">
                    <span>{"URL"}</span>
                    <button type="button" class="url-matcher-collapse" onclick={toggle}>{"▲"}</button>
                </div>
                <div class="url-matcher-radio-group">
                    {for MatchRule::ALL.iter().map(|rule| {
                        let rule = *rule;
                        let checked = rule == props.rule;
                        let on_rule_change = props.on_rule_change.clone();
                        html! {
                            <label class={if checked { "url-matcher-radio active" } else { "url-matcher-radio" }}>
                                <input
                                    type="radio"
                                    name="matchRule"
                                    value={rule.as_str()}
                                    checked={checked}
                                    onchange={Callback::from(move |_: Event| on_rule_change.emit(rule))}
                                />
                                <span>{rule.label()}</span>
                            </label>
                        }
                    })}
                </div>
                <div class="url-matcher-url">
                    <input
                        type="text"
                        class="url-matcher-input"
                        placeholder="https://"
                        value={props.pattern.clone()}
                        oninput={on_pattern_input}
                    />
                </div>
                <p class="rule-priority-info">{"Higher priority rules will be applied first."}</p>
            } else {
                <div class="url-matcher-collapsed">
                    <span class="url-matcher-title">{"URL"}</span>
                    <span class="url-matcher-rule">{props.rule.label()}</span>
                    <span class="url-matcher-value">{&props.pattern}</span>
                    <button type="button" class="url-matcher-expand" onclick={toggle}>{"▼"}</button>
                </div>
            }
            if let Some(saved_key) = &props.matched_from {
                <p class="url-matcher-matched">{format!("Matched from rule: {}", saved_key)}</p>
            }
        </div>
    }
}
