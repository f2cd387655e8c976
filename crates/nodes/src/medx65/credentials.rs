//! MedX65 credential set and base-URL resolution.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Host serving both MedX65 environments.
pub const DEFAULT_BASE_URL: &str = "https://medx65-v65teste.azurewebsites.net";

/// Secret-map key holding the integration token.
pub const INTEGRATION_TOKEN_KEY: &str = "integrationToken";
/// Secret-map key holding the environment selector.
pub const ENVIRONMENT_KEY: &str = "environment";

/// Which MedX65 deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Test,
}

impl Environment {
    /// Base URL of the environment.
    ///
    /// Production currently points at the test host as well. Keep both arms
    /// until a distinct production endpoint is confirmed.
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => DEFAULT_BASE_URL,
            Environment::Test => DEFAULT_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(NodeError::Credentials(format!(
                "unknown environment '{other}' (expected 'production' or 'test')"
            ))),
        }
    }
}

/// The MedX65 API credential: an integration token plus an environment.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub integration_token: String,
    #[serde(default)]
    pub environment: Environment,
}

impl Credential {
    pub fn new(integration_token: impl Into<String>, environment: Environment) -> Self {
        Self {
            integration_token: integration_token.into(),
            environment,
        }
    }

    /// Read the credential from an execution context's secret map.
    ///
    /// The environment falls back to `test` when absent.
    pub fn from_secrets(secrets: &HashMap<String, String>) -> Result<Self, NodeError> {
        let integration_token = secrets
            .get(INTEGRATION_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                NodeError::Credentials(format!("'{INTEGRATION_TOKEN_KEY}' is missing or empty"))
            })?
            .clone();

        let environment = match secrets.get(ENVIRONMENT_KEY) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        Ok(Self {
            integration_token,
            environment,
        })
    }

    /// Inverse of [`Credential::from_secrets`].
    pub fn into_secrets(self) -> HashMap<String, String> {
        HashMap::from([
            (INTEGRATION_TOKEN_KEY.to_owned(), self.integration_token),
            (ENVIRONMENT_KEY.to_owned(), self.environment.as_str().to_owned()),
        ])
    }

    pub fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("integration_token", &"<redacted>")
            .field("environment", &self.environment)
            .finish()
    }
}
