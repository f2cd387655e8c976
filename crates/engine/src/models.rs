//! Output models for a batch execution.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ResultItem
// ---------------------------------------------------------------------------

/// Outcome of a single input item.
///
/// Serialises to the raw response body on success, or to
/// `{ "error": "<message>" }` for an item that failed under
/// continue-on-fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultItem {
    Error { error: String },
    Success(Value),
}

impl ResultItem {
    pub fn is_error(&self) -> bool {
        matches!(self, ResultItem::Error { .. })
    }

    /// The JSON value the host emits for this item.
    pub fn into_value(self) -> Value {
        match self {
            ResultItem::Success(v) => v,
            ResultItem::Error { error } => serde_json::json!({ "error": error }),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

/// The result of running a full batch.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    /// One entry per input item, in input order.
    pub items: Vec<ResultItem>,
}

impl ExecutionResult {
    pub fn into_values(self) -> Vec<Value> {
        self.items.into_iter().map(ResultItem::into_value).collect()
    }
}
