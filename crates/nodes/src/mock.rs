//! `MockNode` — a test double for `ExecutableNode`.
//!
//! Useful in engine tests where a real HTTP-backed node is irrelevant.
//! Items carrying a `"fail"` string field fail with that message; every
//! other item is echoed back together with the node name and session token.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{traits::ExecutionContext, ExecutableNode, NodeError};

/// Behaviour of the authentication step, injected at construction time.
pub enum MockAuth {
    /// Hand out the given session token.
    Token(String),
    /// Fail authentication with the given message.
    Fail(String),
}

/// A mock node that records every call it receives.
pub struct MockNode {
    /// Label used in test assertions.
    pub name: String,
    /// What `authenticate` will do.
    pub auth: MockAuth,
    /// Number of `authenticate` calls.
    pub auth_calls: Arc<Mutex<usize>>,
    /// All items seen by this node (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    /// Create a mock that authenticates with `token` and echoes items.
    pub fn echoing(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auth: MockAuth::Token(token.into()),
            auth_calls: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose authentication always fails.
    pub fn failing_auth(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auth: MockAuth::Fail(msg.into()),
            auth_calls: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times `authenticate` has been called.
    pub fn auth_count(&self) -> usize {
        *self.auth_calls.lock().unwrap()
    }

    /// Number of items this node has handled.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExecutableNode for MockNode {
    type Session = String;

    async fn authenticate(&self, _ctx: &ExecutionContext) -> Result<Self::Session, NodeError> {
        *self.auth_calls.lock().unwrap() += 1;

        match &self.auth {
            MockAuth::Token(token) => Ok(token.clone()),
            MockAuth::Fail(msg) => Err(NodeError::Status {
                status: 401,
                body: msg.clone(),
            }),
        }
    }

    async fn execute_item(
        &self,
        session: &Self::Session,
        item: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        self.calls.lock().unwrap().push(item.clone());

        if let Some(msg) = item.get("fail").and_then(Value::as_str) {
            return Err(NodeError::Status {
                status: 500,
                body: msg.to_owned(),
            });
        }

        // Merge the item into the node's own output so tests can trace it.
        let mut out = json!({ "node": self.name, "token": session });
        if let (Some(out_obj), Some(item_obj)) = (out.as_object_mut(), item.as_object()) {
            for (k, val) in item_obj {
                out_obj.insert(k.clone(), val.clone());
            }
        }
        Ok(out)
    }
}
