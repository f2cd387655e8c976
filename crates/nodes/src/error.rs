//! Node-level error type.

use thiserror::Error;

/// Errors returned by a node's `authenticate` or `execute_item` methods.
///
/// There is no retry classification: transport failures and HTTP error
/// statuses (4xx and 5xx alike) are surfaced as-is and the engine decides
/// whether the batch continues.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The credential set is missing a field or holds an invalid value.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// An item's parameters do not resolve to a known operation.
    #[error("invalid node parameters: {0}")]
    InvalidParameters(String),

    /// The request never produced a response (connect, TLS, body read...).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status. The body renders as
    /// compact JSON, or as a quoted string when it is not JSON.
    #[error("{status} - {}", render_body(.body))]
    Status { status: u16, body: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn render_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => serde_json::Value::String(body.to_owned()).to_string(),
    }
}
