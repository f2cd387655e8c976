//! `nodes` crate — the `ExecutableNode` trait and the MedX65 node.
//!
//! Every node must implement [`ExecutableNode`]. The engine crate drives the
//! authenticate-once, per-item loop through this trait.

pub mod error;
pub mod traits;
pub mod mock;
pub mod medx65;

pub use error::NodeError;
pub use traits::{ExecutableNode, ExecutionContext};
