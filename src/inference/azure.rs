//! Azure AI model inference over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ChatCompletions, ChatCompletionsClient, ChatCompletionsRequest, EmbeddingsClient};
use crate::error::FoundryError;
use crate::http::{api_key_headers, read_json, shared_client};
use crate::project::ConnectionProperties;

pub const INFERENCE_API_VERSION: &str = "2024-05-01-preview";

/// Chat and embeddings client for an Azure AI Services `/models` endpoint.
#[derive(Clone)]
pub struct AzureInferenceClient {
    endpoint: String,
    api_key: String,
}

impl AzureInferenceClient {
    /// `endpoint` is the full model inference base, e.g. `https://res.services.ai.azure.com/models`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from an AI Services connection fetched with credentials.
    pub fn from_connection(connection: &ConnectionProperties) -> Result<Self, FoundryError> {
        let key = connection.key.clone().ok_or_else(|| {
            FoundryError::Configuration(format!("connection '{}' has no API key", connection.name))
        })?;
        let base = connection.endpoint_url.trim_end_matches('/');
        Ok(Self::new(format!("{base}/models"), key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, FoundryError>
    where
        T: for<'de> Deserialize<'de>,
        B: serde::Serialize + ?Sized,
    {
        let resp = shared_client()
            .post(format!("{}{}", self.endpoint, path))
            .query(&[("api-version", INFERENCE_API_VERSION)])
            .headers(api_key_headers(&self.api_key))
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl ChatCompletionsClient for AzureInferenceClient {
    async fn complete(&self, request: &ChatCompletionsRequest) -> Result<ChatCompletions, FoundryError> {
        debug!(model = %request.model, messages = request.messages.len(), "Chat completion");
        self.post("/chat/completions", request).await
    }
}

#[async_trait]
impl EmbeddingsClient for AzureInferenceClient {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, FoundryError> {
        debug!(model, "Embedding request");
        let body = serde_json::json!({ "model": model, "input": [input] });
        let response: EmbeddingsResponse = self.post("/embeddings", &body).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| FoundryError::api(200, "No embeddings in response"))
    }
}
