//! `medx65` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`              — run a batch of items through the MedX65 node.
//! - `test-credentials` — check the integration token against the API.
//! - `operations`       — print the supported (resource, operation) table.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::{BatchExecutor, EngineError, ExecutorConfig};
use nodes::medx65::{Credential, Environment, MedX65Node, OperationKind};
use nodes::ExecutionContext;

#[derive(Parser)]
#[command(
    name = "medx65",
    about = "Run MedX65 API operations as a workflow node",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Credential and endpoint settings shared by the networked commands.
#[derive(Args)]
struct Connection {
    /// Integration token issued by MedX65.
    #[arg(long, env = "MEDX65_INTEGRATION_TOKEN", hide_env_values = true)]
    integration_token: String,

    /// Target environment (`production` or `test`).
    #[arg(long, env = "MEDX65_ENVIRONMENT", default_value = "test")]
    environment: Environment,

    /// Override the environment's base URL.
    #[arg(long, env = "MEDX65_BASE_URL")]
    base_url: Option<String>,
}

impl Connection {
    fn node(&self) -> MedX65Node {
        match &self.base_url {
            Some(url) => MedX65Node::with_base_url(url.clone()),
            None => MedX65Node::new(),
        }
    }

    fn credential(&self) -> Credential {
        Credential::new(self.integration_token.clone(), self.environment)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON array of item parameters and print the results.
    Run {
        /// Path to the items JSON file, or `-` for stdin.
        items: PathBuf,

        /// Record failing items as `{"error": ...}` instead of aborting.
        #[arg(long)]
        continue_on_fail: bool,

        #[command(flatten)]
        connection: Connection,
    },
    /// Verify the integration token against the token endpoint.
    TestCredentials {
        #[command(flatten)]
        connection: Connection,
    },
    /// List the supported (resource, operation) pairs.
    Operations,
}

fn read_items(path: &Path) -> Result<Vec<Value>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read items from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read file {}", path.display()))?
    };

    match serde_json::from_str::<Value>(&content).context("invalid items JSON")? {
        Value::Array(items) => Ok(items),
        single @ Value::Object(_) => Ok(vec![single]),
        _ => bail!("items must be a JSON array of objects"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; flags and the process environment still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            items,
            continue_on_fail,
            connection,
        } => {
            let items = read_items(&items)?;
            info!("running {} items against {}", items.len(), connection.environment);

            let node = connection.node();
            let ctx = ExecutionContext::new(connection.credential().into_secrets());
            let executor = BatchExecutor::new(ExecutorConfig { continue_on_fail });

            match executor.run(&node, &items, &ctx).await {
                Ok(result) => {
                    let output = serde_json::to_string_pretty(&result.into_values())?;
                    println!("{output}");
                }
                Err(EngineError::ItemFailed {
                    index,
                    message,
                    completed,
                }) => {
                    bail!(
                        "item {index} failed: {message} ({} earlier items discarded)",
                        completed.len()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::TestCredentials { connection } => {
            connection
                .node()
                .test_credentials(&connection.credential())
                .await
                .context("credential test failed")?;
            println!("Connection successful ({})", connection.environment);
        }
        Command::Operations => {
            for kind in OperationKind::ALL {
                println!(
                    "{:<8} {:<15} {:<5} {}",
                    kind.resource().as_str(),
                    kind.name(),
                    kind.method().as_str(),
                    kind.path()
                );
            }
        }
    }

    Ok(())
}
