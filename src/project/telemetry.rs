//! Application Insights lookup for the project.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::auth::{TokenCredential, MANAGEMENT_SCOPE};
use crate::error::FoundryError;
use crate::http::{bearer_headers, read_json, shared_client};

const WORKSPACE_API_VERSION: &str = "2024-07-01-preview";
const APP_INSIGHTS_API_VERSION: &str = "2015-05-01";

#[derive(Deserialize)]
struct Workspace {
    properties: WorkspaceProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceProperties {
    #[serde(default)]
    application_insights: Option<String>,
}

#[derive(Deserialize)]
struct AppInsights {
    properties: AppInsightsProperties,
}

#[derive(Deserialize)]
struct AppInsightsProperties {
    #[serde(default, rename = "ConnectionString")]
    connection_string: Option<String>,
}

/// Resolves the telemetry connection string of a project.
#[derive(Clone)]
pub struct TelemetryClient {
    management_base: String,
    resource_path: String,
    credential: Arc<dyn TokenCredential>,
}

impl TelemetryClient {
    pub fn new(
        management_base: impl Into<String>,
        resource_path: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            management_base: management_base.into(),
            resource_path: resource_path.into(),
            credential,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        api_version: &str,
    ) -> Result<T, FoundryError> {
        let token = self.credential.get_token(MANAGEMENT_SCOPE).await?;
        let resp = shared_client()
            .get(format!("{}{}", self.management_base, path))
            .query(&[("api-version", api_version)])
            .headers(bearer_headers(&token.token))
            .send()
            .await?;
        read_json(resp).await
    }

    /// Application Insights connection string.
    ///
    /// Returns [`FoundryError::TelemetryNotConfigured`] when the project has
    /// no Application Insights resource attached.
    pub async fn get_connection_string(&self) -> Result<String, FoundryError> {
        let workspace: Workspace = self.get(&self.resource_path, WORKSPACE_API_VERSION).await?;
        let resource_id = workspace
            .properties
            .application_insights
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                FoundryError::TelemetryNotConfigured(
                    "Application Insights was not enabled for this project".into(),
                )
            })?;
        debug!(resource_id = %resource_id, "Resolving Application Insights resource");

        let insights: AppInsights = self.get(&resource_id, APP_INSIGHTS_API_VERSION).await?;
        insights
            .properties
            .connection_string
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                FoundryError::TelemetryNotConfigured(
                    "Application Insights resource has no connection string".into(),
                )
            })
    }
}
