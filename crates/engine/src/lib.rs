//! `engine` crate — the batch executor that drives an `ExecutableNode`
//! over a sequence of input items.

pub mod models;
pub mod error;
pub mod executor;

pub use models::{ExecutionResult, ResultItem};
pub use error::EngineError;
pub use executor::{BatchExecutor, ExecutorConfig};
