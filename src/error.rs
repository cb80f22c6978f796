/// Error taxonomy shared by the save path and background reconciliation

/// Why a title input was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is empty")]
    EmptyTitle,
    #[error("title is {len} characters, the limit is {max}")]
    TitleTooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverrideError {
    #[error("page is protected: {url}")]
    ProtectedPage { url: String },
    #[error("apply failed: {0}")]
    ApplyFailed(String),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage: {0}")]
    Storage(String),
}

impl OverrideError {
    /// Text shown in the popup when a user-initiated action fails
    pub fn user_message(&self) -> String {
        match self {
            OverrideError::ProtectedPage { .. } => {
                "This page is protected by the browser and cannot be renamed.".to_string()
            }
            OverrideError::ApplyFailed(_) => "Could not update this tab. Try reloading the page.".to_string(),
            OverrideError::Validation(ValidationError::EmptyTitle) => "Please enter a title.".to_string(),
            OverrideError::Validation(ValidationError::TitleTooLong { max, .. }) => {
                format!("Titles can be at most {} characters.", max)
            }
            OverrideError::Storage(_) => "Saving failed. Please try again.".to_string(),
        }
    }
}
