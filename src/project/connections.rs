//! Project connections to attached services (AI Services, AI Search, ...).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::auth::{TokenCredential, MANAGEMENT_SCOPE};
use crate::error::FoundryError;
use crate::http::{bearer_headers, read_json, shared_client};

const CONNECTIONS_API_VERSION: &str = "2024-07-01-preview";

/// Service category of a connection, as named by the project API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum ConnectionType {
    #[serde(rename = "AzureOpenAI")]
    #[strum(serialize = "AzureOpenAI")]
    AzureOpenAi,
    Serverless,
    AzureBlobStorage,
    #[serde(rename = "AIServices")]
    #[strum(serialize = "AIServices")]
    AiServices,
    CognitiveSearch,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthenticationType {
    ApiKey,
    #[serde(rename = "AAD")]
    EntraId,
    #[serde(rename = "SAS")]
    Sas,
    #[serde(other)]
    Other,
}

/// A resolved connection. `key` is only present when fetched with credentials.
#[derive(Clone, PartialEq)]
pub struct ConnectionProperties {
    pub name: String,
    pub connection_type: ConnectionType,
    pub endpoint_url: String,
    pub authentication_type: AuthenticationType,
    pub key: Option<String>,
}

impl fmt::Debug for ConnectionProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProperties")
            .field("name", &self.name)
            .field("connection_type", &self.connection_type)
            .field("endpoint_url", &self.endpoint_url)
            .field("authentication_type", &self.authentication_type)
            .field("key", &self.key.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Deserialize)]
struct ConnectionList {
    #[serde(default)]
    value: Vec<ConnectionResource>,
}

#[derive(Deserialize)]
struct ConnectionResource {
    name: String,
    properties: ResourceProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceProperties {
    category: String,
    target: String,
    auth_type: AuthenticationType,
    #[serde(default)]
    credentials: Option<ResourceCredentials>,
}

#[derive(Deserialize)]
struct ResourceCredentials {
    #[serde(default)]
    key: Option<String>,
}

impl TryFrom<ConnectionResource> for ConnectionProperties {
    type Error = FoundryError;

    fn try_from(resource: ConnectionResource) -> Result<Self, Self::Error> {
        let props = resource.properties;
        let connection_type = props.category.parse::<ConnectionType>().map_err(|_| {
            FoundryError::Configuration(format!(
                "connection '{}' has unsupported category '{}'",
                resource.name, props.category
            ))
        })?;
        Ok(Self {
            name: resource.name,
            connection_type,
            endpoint_url: props.target,
            authentication_type: props.auth_type,
            key: props.credentials.and_then(|c| c.key),
        })
    }
}

/// Lists and resolves the project's connections.
#[derive(Clone)]
pub struct ConnectionsClient {
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
}

impl ConnectionsClient {
    pub fn new(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential,
        }
    }

    /// Connections of one type, in service order.
    pub async fn list(
        &self,
        connection_type: ConnectionType,
    ) -> Result<Vec<ConnectionProperties>, FoundryError> {
        let token = self.credential.get_token(MANAGEMENT_SCOPE).await?;
        let category = connection_type.to_string();
        let resp = shared_client()
            .get(format!("{}/connections", self.endpoint))
            .query(&[
                ("api-version", CONNECTIONS_API_VERSION),
                ("category", category.as_str()),
                ("includeAll", "true"),
            ])
            .headers(bearer_headers(&token.token))
            .send()
            .await?;
        let list: ConnectionList = read_json(resp).await?;
        Ok(list
            .value
            .into_iter()
            .filter_map(|r| ConnectionProperties::try_from(r).ok())
            .filter(|c| c.connection_type == connection_type)
            .collect())
    }

    /// One connection by name, with its secrets.
    pub async fn get_with_credentials(&self, name: &str) -> Result<ConnectionProperties, FoundryError> {
        let token = self.credential.get_token(MANAGEMENT_SCOPE).await?;
        let resp = shared_client()
            .post(format!("{}/connections/{name}/listsecrets", self.endpoint))
            .query(&[("api-version", CONNECTIONS_API_VERSION)])
            .headers(bearer_headers(&token.token))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let resource: ConnectionResource = read_json(resp).await?;
        resource.try_into()
    }

    /// The first connection of `connection_type`.
    pub async fn get_default(
        &self,
        connection_type: ConnectionType,
        with_credentials: bool,
    ) -> Result<ConnectionProperties, FoundryError> {
        let first = self
            .list(connection_type)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                FoundryError::Configuration(format!(
                    "project has no {connection_type} connection"
                ))
            })?;
        debug!(name = %first.name, %connection_type, "Using default connection");

        if with_credentials {
            self.get_with_credentials(&first.name).await
        } else {
            Ok(first)
        }
    }
}
