use heritage_core::types::DbId;

/// A controller operation that is not legal in the current state.
///
/// Rejections leave the controller untouched; they never reach the
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("Nothing is selected")]
    NoSelection,

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Another item is already being edited")]
    DraftActive,

    #[error("No edit is in progress")]
    NotEditing,

    #[error("Item {0} is not part of the current view")]
    UnknownItem(DbId),

    #[error("Quiz generation is already running for heritage {0}")]
    AlreadyGenerating(DbId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<heritage_core::error::CoreError> for Rejected {
    fn from(err: heritage_core::error::CoreError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
