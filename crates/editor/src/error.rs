use brokerage_core::error::RuleValidationError;
use brokerage_store::StoreError;

/// Why an editor action did not go through.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Rejected client-side; nothing was sent.
    #[error(transparent)]
    Validation(#[from] RuleValidationError),

    /// The store or the network failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A submission from this editor is still outstanding.
    #[error("A submission is already in progress")]
    Busy,
}

impl EditorError {
    /// Text to show next to the form.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Store(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
