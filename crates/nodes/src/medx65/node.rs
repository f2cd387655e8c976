//! `MedX65Node` — the `ExecutableNode` implementation for the MedX65 API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::client::{BearerToken, MedX65Client};
use super::credentials::Credential;
use super::operation::Operation;
use crate::traits::ExecutionContext;
use crate::{ExecutableNode, NodeError};

/// Per-batch session: the client for the resolved base URL plus the bearer
/// token every item call is authorised with.
#[derive(Debug, Clone)]
pub struct MedX65Session {
    pub client: MedX65Client,
    pub token: BearerToken,
}

/// The MedX65 integration node.
#[derive(Debug, Clone, Default)]
pub struct MedX65Node {
    http: reqwest::Client,
    /// Replaces the environment-derived base URL when set.
    base_url_override: Option<String>,
}

impl MedX65Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the node at a fixed base URL regardless of the credential's
    /// environment.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url_override: Some(base_url.into()),
        }
    }

    fn client_for(&self, credential: &Credential) -> Result<MedX65Client, NodeError> {
        let base_url = self
            .base_url_override
            .as_deref()
            .unwrap_or_else(|| credential.base_url());
        MedX65Client::new(self.http.clone(), base_url)
    }

    /// Host-driven credential check: the token endpoint must answer 200.
    pub async fn test_credentials(&self, credential: &Credential) -> Result<(), NodeError> {
        let client = self.client_for(credential)?;
        client.test_connection(&credential.integration_token).await?;
        info!(environment = %credential.environment, "credential test passed");
        Ok(())
    }
}

#[async_trait]
impl ExecutableNode for MedX65Node {
    type Session = MedX65Session;

    async fn authenticate(&self, ctx: &ExecutionContext) -> Result<Self::Session, NodeError> {
        let credential = Credential::from_secrets(&ctx.secrets)?;
        let client = self.client_for(&credential)?;
        info!(
            environment = %credential.environment,
            base_url = %client.base_url(),
            "requesting bearer token"
        );
        let token = client.fetch_token(&credential.integration_token).await?;
        Ok(MedX65Session { client, token })
    }

    async fn execute_item(
        &self,
        session: &Self::Session,
        item: &Value,
        _ctx: &ExecutionContext,
    ) -> Result<Value, NodeError> {
        let operation = Operation::from_parameters(item)?;
        let kind = operation.kind();
        debug!(resource = %kind.resource(), operation = kind.name(), "dispatching");

        let request = operation.request()?;
        session.client.send(&session.token, &request).await
    }
}
