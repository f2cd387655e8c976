//! The `ExecutableNode` trait — the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::NodeError;

/// Shared context passed to every node during a batch execution.
///
/// Defined here (in the nodes crate) so both the engine and individual node
/// implementations can import it without a circular dependency.
#[derive(Clone)]
pub struct ExecutionContext {
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Credential fields scoped to this node, keyed by field name.
    pub secrets: HashMap<String, String>,
}

impl ExecutionContext {
    /// Create a context for a fresh execution run.
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self {
            execution_id: uuid::Uuid::new_v4(),
            secrets,
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("secrets", &keys)
            .finish()
    }
}

/// The core node trait.
///
/// A node runs in two steps: it authenticates once per batch, producing a
/// `Session`, and then handles every input item against that session. The
/// engine owns the loop; nodes never see the batch as a whole.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Per-batch state produced by [`authenticate`](Self::authenticate) and
    /// shared read-only by every item call.
    type Session: Send + Sync;

    /// Establish the batch session (e.g. exchange credentials for a token).
    async fn authenticate(&self, ctx: &ExecutionContext) -> Result<Self::Session, NodeError>;

    /// Handle a single input item and return its JSON output.
    async fn execute_item(
        &self,
        session: &Self::Session,
        item: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError>;
}
