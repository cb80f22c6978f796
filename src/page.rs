/// Collaborators that touch live tabs: the page mutator and the open-tab directory

use crate::error::OverrideError;
use crate::tab_data::{OriginalState, TabId, TabInfo};
use async_trait::async_trait;

/// Applies titles and icons to a loaded page.
///
/// Every call is idempotent. An applied icon stays applied (the page is not
/// allowed to swap its own favicon back) until [`PageMutator::release_icon`].
#[async_trait(?Send)]
pub trait PageMutator {
    async fn apply_title(&self, tab_id: TabId, title: &str) -> Result<(), OverrideError>;

    async fn apply_icon(&self, tab_id: TabId, symbol: &str) -> Result<(), OverrideError>;

    /// Stop pinning the override icon and put `original_icon_ref` back when given
    async fn release_icon(&self, tab_id: TabId, original_icon_ref: Option<&str>) -> Result<(), OverrideError>;

    /// Read the page's pre-override title and icon
    async fn original_state(&self, tab_id: TabId) -> Result<OriginalState, OverrideError>;
}

#[async_trait(?Send)]
pub trait TabDirectory {
    async fn open_tabs(&self) -> Result<Vec<TabInfo>, OverrideError>;

    async fn active_tab(&self) -> Result<TabInfo, OverrideError>;
}
