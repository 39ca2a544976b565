//! Project client: the entry point built from a project connection string.

pub mod connections;
pub mod telemetry;

pub use connections::{ConnectionProperties, ConnectionType, ConnectionsClient};
pub use telemetry::TelemetryClient;

use std::sync::Arc;

use crate::agents::AgentsClient;
use crate::auth::TokenCredential;
use crate::config::ProjectConnectionString;
use crate::error::FoundryError;

pub const MANAGEMENT_BASE_URL: &str = "https://management.azure.com";

/// Handle to one AI project. Cheap to clone; safe to share across tasks.
#[derive(Clone)]
pub struct ProjectClient {
    scope: ProjectConnectionString,
    credential: Arc<dyn TokenCredential>,
    project_endpoint: String,
    management_base: String,
}

impl ProjectClient {
    pub fn new(scope: ProjectConnectionString, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            project_endpoint: scope.project_endpoint(),
            management_base: MANAGEMENT_BASE_URL.to_string(),
            scope,
            credential,
        }
    }

    /// Parse `conn_str` and build a client.
    pub fn from_connection_string(
        conn_str: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, FoundryError> {
        Ok(Self::new(conn_str.parse()?, credential))
    }

    /// Send data-plane calls to `base` instead of the project host.
    pub fn with_project_base_url(mut self, base: &str) -> Self {
        self.project_endpoint = self.scope.project_endpoint_on(base);
        self
    }

    pub fn with_management_base_url(mut self, base: &str) -> Self {
        self.management_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn scope(&self) -> &ProjectConnectionString {
        &self.scope
    }

    pub fn project_endpoint(&self) -> &str {
        &self.project_endpoint
    }

    pub fn agents(&self) -> AgentsClient {
        AgentsClient::new(self.project_endpoint.clone(), self.credential.clone())
    }

    pub fn connections(&self) -> ConnectionsClient {
        ConnectionsClient::new(self.project_endpoint.clone(), self.credential.clone())
    }

    pub fn telemetry(&self) -> TelemetryClient {
        TelemetryClient::new(
            self.management_base.clone(),
            self.scope.resource_path(),
            self.credential.clone(),
        )
    }
}
