/// Settings page: every saved override, with delete and export

use crate::chrome::{ChromeStorage, download_json, notify_background};
use crate::messages::BackgroundMessage;
use crate::operations::delete_override;
use crate::storage::{OverrideStore, StorageData};
use crate::tab_data::OverrideRecord;
use log::warn;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Error(String),
}

/// Case-insensitive filter over URL, pattern and both titles
fn record_matches_query(record: &OverrideRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || [
            record.saved_key.as_str(),
            record.pattern(),
            record.original_title.as_str(),
            record.new_title.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
    let state = use_state(|| ViewState::Loading);
    let storage = use_state(StorageData::new);
    let search_query = use_state(String::new);

    // Load storage on mount
    {
        let state = state.clone();
        let storage = storage.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match ChromeStorage.load().await {
                    Ok(data) => {
                        storage.set(data);
                        state.set(ViewState::Idle);
                    }
                    Err(e) => {
                        state.set(ViewState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
            }
        })
    };

    // Delete handler
    let on_delete = {
        let storage = storage.clone();
        let state = state.clone();

        Callback::from(move |saved_key: String| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Delete this saved title?").ok())
                .unwrap_or(false);
            if !confirmed {
                return;
            }

            let storage = storage.clone();
            let state = state.clone();
            spawn_local(async move {
                match delete_override(&ChromeStorage, &saved_key).await {
                    Ok(Some(record)) => {
                        let mut new_storage = (*storage).clone();
                        new_storage.remove(&saved_key);
                        storage.set(new_storage);

                        if let Err(e) = notify_background(&BackgroundMessage::OverrideRemoved { record }).await {
                            warn!("{}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        state.set(ViewState::Error(format!("Failed to delete: {}", e)));
                    }
                }
            });
        })
    };

    // Export all records
    let on_export = {
        let storage = storage.clone();

        Callback::from(move |_: MouseEvent| match serde_json::to_string_pretty(&*storage) {
            Ok(json) => {
                let filename = format!("tab-renamer-export-{}.json", js_sys::Date::now() as i64);
                download_json(&json, &filename);
            }
            Err(e) => {
                warn!("Export failed: {:?}", e);
            }
        })
    };

    let records: Vec<&OverrideRecord> = storage
        .records_newest_first()
        .into_iter()
        .filter(|record| record_matches_query(record, &search_query))
        .collect();

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"Saved Titles"}</h1>
                <Button onclick={on_export} variant={ButtonVariant::Secondary}>
                    {"📥 Export"}
                </Button>
            </div>

            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading saved titles..."}</p>
                    </div>
                },
                ViewState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Idle => html! {}
            }}

            <div class="search-container">
                <input
                    type="text"
                    placeholder="Search titles or URLs..."
                    value={(*search_query).clone()}
                    oninput={on_search_input}
                    class="search-input"
                />
            </div>

            if records.is_empty() {
                <div class="empty-state">
                    if search_query.is_empty() {
                        <p>{"No saved titles yet."}</p>
                        <p class="empty-state-hint">{"Use the popup to rename a tab."}</p>
                    } else {
                        <p>{"No saved titles match your search."}</p>
                    }
                </div>
            } else {
                <table id="historyTable" class="history-table">
                    <thead>
                        <tr>
                            <th>{"#"}</th>
                            <th>{"Original title"}</th>
                            <th>{"New title"}</th>
                            <th>{"Original icon"}</th>
                            <th>{"New icon"}</th>
                            <th>{"Rule"}</th>
                            <th>{"URL"}</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {for records.iter().enumerate().map(|(index, record)| html! {
                            <HistoryRow
                                key={record.saved_key.clone()}
                                index={index + 1}
                                record={(*record).clone()}
                                on_delete={on_delete.clone()}
                            />
                        })}
                    </tbody>
                </table>
            }

            <div class="footer">
                {format!("{} saved titles", storage.len())}
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct HistoryRowProps {
    index: usize,
    record: OverrideRecord,
    on_delete: Callback<String>,
}

#[function_component(HistoryRow)]
fn history_row(props: &HistoryRowProps) -> Html {
    let record = &props.record;

    html! {
        <tr>
            <td>{props.index.to_string()}</td>
            <td>{&record.original_title}</td>
            <td>{&record.new_title}</td>
            <td class="favicon-cell">
                <div class="favicon-display">
                    if let Some(src) = &record.original_icon_ref {
                        <img src={src.clone()} alt="original favicon" />
                    }
                </div>
            </td>
            <td class="favicon-cell">
                <div class="favicon-display">
                    if let Some(symbol) = record.icon_symbol() {
                        <div class="emoji-favicon">{symbol}</div>
                    }
                </div>
            </td>
            <td>{format!("{} {}", record.match_rule.label(), record.pattern())}</td>
            <td class="url-cell">{&record.saved_key}</td>
            <td>
                <Button
                    onclick={props.on_delete.reform({
                        let saved_key = record.saved_key.clone();
                        move |_| saved_key.clone()
                    })}
                    variant={ButtonVariant::Danger}
                    size={ButtonSize::Small}
                >
                    {"Delete"}
                </Button>
            </td>
        </tr>
    }
}
