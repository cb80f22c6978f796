/// Popup UI for Tab Renamer

use crate::chrome::{ChromePageMutator, ChromeStorage, ChromeTabs, notify_background, open_settings};
use crate::config::ExtensionConfig;
use crate::error::OverrideError;
use crate::match_rule::MatchRule;
use crate::messages::BackgroundMessage;
use crate::operations::{SaveRequest, form_defaults, save_override};
use crate::page::TabDirectory;
use crate::protected::is_protected_url;
use crate::storage::{FrequentlyUsed, OverrideStore};
use crate::tab_data::TabInfo;
use crate::ui::components::{EmojiPicker, MatchRuleEditor};
use log::warn;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Idle,
    Saving,
    Saved,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let active_tab = use_state(|| None::<TabInfo>);
    let title = use_state(String::new);
    let icon = use_state(|| None::<String>);
    let rule = use_state(MatchRule::default);
    let pattern = use_state(String::new);
    let matched_from = use_state(|| None::<String>);
    let frequently_used = use_state(FrequentlyUsed::new);
    let picker_open = use_state(|| false);

    // Prefill from storage and the active tab on mount
    {
        let state = state.clone();
        let active_tab = active_tab.clone();
        let title = title.clone();
        let icon = icon.clone();
        let rule = rule.clone();
        let pattern = pattern.clone();
        let matched_from = matched_from.clone();
        let frequently_used = frequently_used.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let tab = match ChromeTabs.active_tab().await {
                    Ok(tab) => tab,
                    Err(e) => {
                        state.set(AppState::Error(e.user_message()));
                        return;
                    }
                };

                let data = ChromeStorage.load().await.unwrap_or_else(|e| {
                    warn!("Opening popup without saved overrides: {}", e);
                    Default::default()
                });

                let defaults = form_defaults(&data, &tab);
                title.set(defaults.title);
                icon.set(defaults.icon);
                rule.set(defaults.match_rule);
                pattern.set(defaults.pattern);
                matched_from.set(defaults.matched_from);
                frequently_used.set(data.frequently_used);

                if is_protected_url(&tab.url, &ExtensionConfig::default().protected_prefixes) {
                    let error = OverrideError::ProtectedPage { url: tab.url.clone() };
                    state.set(AppState::Error(error.user_message()));
                } else {
                    state.set(AppState::Idle);
                }
                active_tab.set(Some(tab));
            });
            || ()
        });
    }

    let on_title_input = {
        let title = title.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                title.set(input.value());
            }
        })
    };

    let on_clear = {
        let title = title.clone();
        Callback::from(move |_: MouseEvent| title.set(String::new()))
    };

    let on_toggle_picker = {
        let picker_open = picker_open.clone();
        Callback::from(move |_: MouseEvent| picker_open.set(!*picker_open))
    };

    let on_select_emoji = {
        let icon = icon.clone();
        let picker_open = picker_open.clone();
        Callback::from(move |symbol: String| {
            icon.set(Some(symbol));
            picker_open.set(false);
        })
    };

    let on_rule_change = {
        let rule = rule.clone();
        Callback::from(move |new_rule: MatchRule| rule.set(new_rule))
    };

    let on_pattern_change = {
        let pattern = pattern.clone();
        Callback::from(move |value: String| pattern.set(value))
    };

    // Save handler
    let on_save = {
        let state = state.clone();
        let active_tab = active_tab.clone();
        let title = title.clone();
        let icon = icon.clone();
        let rule = rule.clone();
        let pattern = pattern.clone();
        let matched_from = matched_from.clone();
        let frequently_used = frequently_used.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(tab) = (*active_tab).clone() else {
                return;
            };

            let request = SaveRequest {
                tab,
                title: (*title).clone(),
                icon: (*icon).clone(),
                match_rule: *rule,
                custom_pattern: Some((*pattern).clone()),
            };

            let state = state.clone();
            let matched_from = matched_from.clone();
            let frequently_used = frequently_used.clone();
            state.set(AppState::Saving);

            spawn_local(async move {
                let config = ExtensionConfig::default();
                let url = request.tab.url.clone();
                match save_override(&ChromeStorage, &ChromePageMutator, &config, request, js_sys::Date::now()).await {
                    Ok(record) => {
                        if let Some(symbol) = record.icon_symbol() {
                            let mut recent = (*frequently_used).clone();
                            recent.push(symbol, config.frequently_used_capacity);
                            frequently_used.set(recent);
                        }
                        matched_from.set(None);

                        let message = BackgroundMessage::OverrideUpdated { url, record };
                        if let Err(e) = notify_background(&message).await {
                            warn!("{}", e);
                        }
                        state.set(AppState::Saved);
                    }
                    Err(e) => {
                        state.set(AppState::Error(e.user_message()));
                    }
                }
            });
        })
    };

    let on_open_settings = Callback::from(move |_: MouseEvent| {
        spawn_local(async move {
            if let Err(e) = open_settings().await {
                warn!("{}", e);
            }
        });
    });

    let is_busy = matches!(*state, AppState::Loading | AppState::Saving);

    html! {
        <div class="padding-20">
            <div class="popup-header">
                <h1 class="popup-title">{"Tab Renamer"}</h1>
                <button class="settings-icon" title="Settings" onclick={on_open_settings}>{"⚙️"}</button>
            </div>

            <MatchRuleEditor
                rule={*rule}
                pattern={(*pattern).clone()}
                matched_from={(*matched_from).clone()}
                on_rule_change={on_rule_change}
                on_pattern_change={on_pattern_change}
            />

            <div class="rename-row">
                <div class={if *picker_open { "favicon-box active" } else { "favicon-box" }} onclick={on_toggle_picker}>
                    {match (&*icon, &*active_tab) {
                        (Some(symbol), _) => html! { <div class="emoji-favicon">{symbol}</div> },
                        (None, Some(TabInfo { fav_icon_url: Some(src), .. })) => html! {
                            <img class="current-favicon" src={src.clone()} alt="favicon" />
                        },
                        _ => html! { <div class="emoji-favicon">{"🌐"}</div> },
                    }}
                </div>
                <input
                    type="text"
                    class="title-input"
                    maxlength={ExtensionConfig::default().max_title_length.to_string()}
                    value={(*title).clone()}
                    oninput={on_title_input}
                />
                <button class="clear-btn" onclick={on_clear}>{"✕"}</button>
            </div>

            if *picker_open {
                <EmojiPicker
                    frequently_used={frequently_used.symbols().to_vec()}
                    on_select={on_select_emoji}
                />
            }

            <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                {"Rename Tab"}
            </Button>

            // Status display
            {match &*state {
                AppState::Loading | AppState::Saving => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Saved => html! {
                    <Alert r#type={AlertType::Success} title={"Tab renamed"} inline={true}>
                    </Alert>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}
        </div>
    }
}
