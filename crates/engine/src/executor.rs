//! Batch execution engine.
//!
//! `BatchExecutor` is the central orchestrator:
//! 1. Authenticates the node once for the whole batch.
//! 2. Iterates through the input items in order, dispatching each via
//!    `ExecutableNode::execute_item` with the shared session.
//! 3. Collects one `ResultItem` per item.
//! 4. On an item failure either records `{error}` and moves on
//!    (continue-on-fail) or aborts the batch.

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use nodes::{ExecutableNode, ExecutionContext};

use crate::{EngineError, ExecutionResult, ResultItem};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Record failing items as `{error}` instead of aborting the batch.
    pub continue_on_fail: bool,
}

// ---------------------------------------------------------------------------
// BatchExecutor
// ---------------------------------------------------------------------------

/// Stateless orchestrator that runs one batch of items through a node.
#[derive(Debug, Clone, Default)]
pub struct BatchExecutor {
    config: ExecutorConfig,
}

impl BatchExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run every item through `node` and return one result per item.
    ///
    /// The node authenticates exactly once, even for an empty batch.
    ///
    /// # Errors
    /// [`EngineError::Authentication`] if the session cannot be established,
    /// [`EngineError::ItemFailed`] for the first failing item when
    /// continue-on-fail is disabled.
    #[instrument(skip_all, fields(execution_id = %ctx.execution_id, items = items.len()))]
    pub async fn run<N: ExecutableNode>(
        &self,
        node: &N,
        items: &[Value],
        ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, EngineError> {
        // ------------------------------------------------------------------
        // One session for the whole batch; not covered by continue-on-fail.
        // ------------------------------------------------------------------
        let session = node.authenticate(ctx).await.map_err(|e| {
            error!("authentication failed: {e}");
            EngineError::Authentication {
                message: e.to_string(),
            }
        })?;

        // ------------------------------------------------------------------
        // Execute items sequentially.
        // ------------------------------------------------------------------
        let mut results: Vec<ResultItem> = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match node.execute_item(&session, item, ctx).await {
                Ok(output) => results.push(ResultItem::Success(output)),

                Err(e) if self.config.continue_on_fail => {
                    warn!("item {index} failed, continuing: {e}");
                    results.push(ResultItem::Error {
                        error: e.to_string(),
                    });
                }

                Err(e) => {
                    error!("item {index} failed, aborting batch: {e}");
                    return Err(EngineError::ItemFailed {
                        index,
                        message: e.to_string(),
                        completed: results,
                    });
                }
            }
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(
            "execution {} finished: {} items, {} failed",
            ctx.execution_id,
            results.len(),
            failed
        );

        Ok(ExecutionResult {
            execution_id: ctx.execution_id,
            items: results,
        })
    }
}
