//! Engine-level error types.

use thiserror::Error;

use crate::models::ResultItem;

/// Errors that abort a batch execution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The node could not establish its batch session. Always fatal,
    /// regardless of continue-on-fail.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// An item failed while continue-on-fail was disabled.
    #[error("item {index} failed: {message}")]
    ItemFailed {
        /// Zero-based position of the failing item.
        index: usize,
        message: String,
        /// Results collected for the items before `index`.
        completed: Vec<ResultItem>,
    },
}
