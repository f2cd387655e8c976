//! Thin reqwest wrapper for the MedX65 integration API.

use std::fmt;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::operation::OperationRequest;
use crate::NodeError;

/// Path of the token exchange endpoint.
pub const TOKEN_PATH: &str = "/api/integration/GetAuthorizedToken";

/// Bearer token obtained from the integration token. Lives for one batch.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// MedX65 API client bound to one base URL.
#[derive(Debug, Clone)]
pub struct MedX65Client {
    http: reqwest::Client,
    base_url: Url,
}

impl MedX65Client {
    /// Create a client for `base_url`. No timeout is configured; the
    /// reqwest defaults apply.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, NodeError> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, NodeError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn token_response(&self, integration_token: &str) -> Result<reqwest::Response, NodeError> {
        let url = self.url(TOKEN_PATH)?;
        let response = self
            .http
            .get(url)
            .query(&[("token", integration_token)])
            .send()
            .await
            .map_err(|e| NodeError::Http(e.without_url()))?;
        Ok(response)
    }

    /// Exchange the integration token for a bearer token.
    ///
    /// The response body is the token itself: a JSON string literal is
    /// unquoted, anything else is used as trimmed text.
    pub async fn fetch_token(&self, integration_token: &str) -> Result<BearerToken, NodeError> {
        let response = self.token_response(integration_token).await?;
        let text = read_success_body(response).await.map_err(strip_url)?;

        let token = match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(s)) => s,
            _ => text.trim().to_owned(),
        };
        debug!("bearer token acquired");
        Ok(BearerToken(token))
    }

    /// Connectivity test: the token endpoint must answer exactly `200 OK`.
    pub async fn test_connection(&self, integration_token: &str) -> Result<(), NodeError> {
        let response = self.token_response(integration_token).await?;
        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(NodeError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    /// Issue an operation request with the batch bearer token.
    pub async fn send(
        &self,
        token: &BearerToken,
        request: &OperationRequest,
    ) -> Result<Value, NodeError> {
        let url = self.url(request.path)?;
        debug!(method = %request.method, path = request.path, "sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            // Sets `Content-Type: application/json`.
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let text = read_success_body(response).await?;
        Ok(decode_body(&text))
    }
}

/// Return the body text of a 2xx response, or a `Status` error.
async fn read_success_body(response: reqwest::Response) -> Result<String, NodeError> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        Ok(text)
    } else {
        Err(NodeError::Status {
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Drop the request URL from transport errors. The token endpoint carries
/// the integration token in its query string.
fn strip_url(err: NodeError) -> NodeError {
    match err {
        NodeError::Http(e) => NodeError::Http(e.without_url()),
        other => other,
    }
}

/// JSON bodies are decoded; an empty body is `null`; anything else is kept
/// as a string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}
