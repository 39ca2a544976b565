//! Azure AI Search REST client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DocumentSearch, SearchRecord, SearchRequest, VectorizedQuery};
use crate::error::FoundryError;
use crate::http::{api_key_headers, read_json, shared_client};
use crate::project::ConnectionProperties;

pub const SEARCH_API_VERSION: &str = "2024-07-01";

/// Queries one index of an Azure AI Search service.
#[derive(Clone)]
pub struct AzureSearchClient {
    endpoint: String,
    index_name: String,
    api_key: String,
}

impl AzureSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        index_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from an AI Search connection fetched with credentials.
    pub fn from_connection(
        connection: &ConnectionProperties,
        index_name: impl Into<String>,
    ) -> Result<Self, FoundryError> {
        let key = connection.key.clone().ok_or_else(|| {
            FoundryError::Configuration(format!("connection '{}' has no API key", connection.name))
        })?;
        Ok(Self::new(connection.endpoint_url.clone(), index_name, key))
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<VectorQueryBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    select: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top: Option<usize>,
}

#[derive(Serialize)]
struct VectorQueryBody<'a> {
    kind: &'static str,
    #[serde(flatten)]
    query: &'a VectorizedQuery,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchRecord>,
}

#[async_trait]
impl DocumentSearch for AzureSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, FoundryError> {
        let body = SearchBody {
            search: &request.search_text,
            vector_queries: request
                .vector_queries
                .iter()
                .map(|query| VectorQueryBody {
                    kind: "vector",
                    query,
                })
                .collect(),
            select: (!request.select.is_empty()).then(|| request.select.join(",")),
            top: request.top,
        };

        debug!(index = %self.index_name, top = ?request.top, "Hybrid search");

        let resp = shared_client()
            .post(format!(
                "{}/indexes/{}/docs/search",
                self.endpoint, self.index_name
            ))
            .query(&[("api-version", SEARCH_API_VERSION)])
            .headers(api_key_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;
        let response: SearchResponse = read_json(resp).await?;
        Ok(response.value)
    }
}
