//! Token acquisition through the Azure CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;

use super::{AccessToken, TokenCredential};
use crate::error::FoundryError;

/// Runs `az account get-access-token` for each request.
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: "az".to_string(),
        }
    }

    /// Use a different executable (e.g. a full path to `az`).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

pub(crate) fn parse_cli_output(stdout: &[u8]) -> Result<AccessToken, FoundryError> {
    let output: CliTokenOutput = serde_json::from_slice(stdout).map_err(|e| {
        FoundryError::Authentication(format!("unexpected Azure CLI output: {e}"))
    })?;
    Ok(AccessToken {
        token: output.access_token,
        expires_on: output
            .expires_on
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    })
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &str {
        "azure-cli"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, FoundryError> {
        let output = Command::new(&self.program)
            .args(["account", "get-access-token", "--scope", scope, "--output", "json"])
            .output()
            .await
            .map_err(|e| FoundryError::Authentication(format!("could not run Azure CLI: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FoundryError::Authentication(format!(
                "Azure CLI exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_cli_output(&output.stdout)
    }
}
