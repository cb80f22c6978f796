/// Messages the popup and settings pages send to the background worker
use crate::tab_data::OverrideRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackgroundMessage {
    /// A record was just saved while the user was on `url`
    OverrideUpdated { url: String, record: OverrideRecord },
    /// A record was deleted from the settings page
    OverrideRemoved { record: OverrideRecord },
}
