//! Credentials for the project's management and agent APIs.

pub mod azure_cli;
pub mod token;

pub use azure_cli::AzureCliCredential;
pub use token::AccessToken;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::FoundryError;

/// Scope requested for every project-level call.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Source of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    async fn get_token(&self, scope: &str) -> Result<AccessToken, FoundryError>;
}

/// A fixed token, typically read from `AZURE_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }

    /// Read `AZURE_ACCESS_TOKEN`; `None` when unset or empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("AZURE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &str {
        "environment"
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken, FoundryError> {
        if self.token.is_expired() {
            return Err(FoundryError::Authentication(
                "AZURE_ACCESS_TOKEN has expired".into(),
            ));
        }
        Ok(self.token.clone())
    }
}

/// Cached tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Tries each credential in order and returns the first token obtained.
///
/// Tokens are cached per scope and reused until they are within five
/// minutes of expiry.
pub struct DefaultAzureCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl DefaultAzureCredential {
    /// Environment token first, then the Azure CLI.
    pub fn new() -> Self {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();
        if let Some(env) = StaticTokenCredential::from_env() {
            sources.push(Arc::new(env));
        }
        sources.push(Arc::new(AzureCliCredential::new()));
        Self::with_sources(sources)
    }

    pub fn with_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    fn name(&self) -> &str {
        "default"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, FoundryError> {
        // Held across the fetch so concurrent callers share one refresh.
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope) {
            if !token.expires_within(chrono::Duration::seconds(REFRESH_MARGIN_SECS)) {
                return Ok(token.clone());
            }
        }

        let mut failures = Vec::new();
        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    debug!(credential = source.name(), "Acquired access token");
                    cache.insert(scope.to_string(), token.clone());
                    return Ok(token);
                }
                Err(e) => failures.push(format!("{}: {e}", source.name())),
            }
        }

        if failures.is_empty() {
            failures.push("no credential sources configured".to_string());
        }
        Err(FoundryError::Authentication(format!(
            "DefaultAzureCredential failed to retrieve a token ({})",
            failures.join("; ")
        )))
    }
}
