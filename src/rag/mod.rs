//! Product document retrieval: intent rewrite, embedding, hybrid search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::FoundryConfig;
use crate::error::FoundryError;
use crate::inference::{
    AzureInferenceClient, ChatCompletionsClient, ChatCompletionsRequest, EmbeddingsClient,
};
use crate::project::{ConnectionType, ProjectClient};
use crate::prompty::PromptTemplate;
use crate::search::{AzureSearchClient, DocumentSearch, SearchRecord, SearchRequest, VectorizedQuery};

pub const DEFAULT_TOP: usize = 5;
pub const VECTOR_FIELD: &str = "contentVector";
pub const DOCUMENT_FIELDS: [&str; 5] = ["id", "content", "filepath", "title", "url"];
pub const QUERY_THOUGHT_TITLE: &str = "Generated search query";

/// One turn of the conversation being answered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchOverrides {
    /// Nearest-neighbor count and result cap.
    pub top: usize,
}

impl Default for SearchOverrides {
    fn default() -> Self {
        Self { top: DEFAULT_TOP }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thought {
    pub title: String,
    pub description: String,
}

/// A search result narrowed to the fields the chat app cites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Document {
    /// Keep only the five document fields of a raw record.
    pub fn from_record(record: &SearchRecord) -> Result<Self, FoundryError> {
        let narrowed: serde_json::Map<String, serde_json::Value> = DOCUMENT_FIELDS
            .iter()
            .filter_map(|field| record.get(*field).map(|v| (field.to_string(), v.clone())))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(narrowed))?)
    }
}

/// Provenance accumulated across retrieval calls. Owned by the caller;
/// retrieval only appends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalContext {
    #[serde(default)]
    pub overrides: SearchOverrides,
    #[serde(default)]
    pub thoughts: Vec<Thought>,
    #[serde(default)]
    pub grounding_data: Vec<Vec<Document>>,
}

impl RetrievalContext {
    pub fn with_top(top: usize) -> Self {
        Self {
            overrides: SearchOverrides { top },
            ..Default::default()
        }
    }
}

/// Runs the retrieval pipeline against shared, read-only clients.
#[derive(Clone)]
pub struct ProductRetriever {
    chat: Arc<dyn ChatCompletionsClient>,
    embeddings: Arc<dyn EmbeddingsClient>,
    search: Arc<dyn DocumentSearch>,
    intent_prompt: PromptTemplate,
    intent_model: String,
    embeddings_model: String,
}

impl ProductRetriever {
    pub fn new(
        chat: Arc<dyn ChatCompletionsClient>,
        embeddings: Arc<dyn EmbeddingsClient>,
        search: Arc<dyn DocumentSearch>,
        intent_prompt: PromptTemplate,
        intent_model: impl Into<String>,
        embeddings_model: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            embeddings,
            search,
            intent_prompt,
            intent_model: intent_model.into(),
            embeddings_model: embeddings_model.into(),
        }
    }

    /// Wire clients from config: direct endpoint overrides when set,
    /// otherwise the project's default AI Services and AI Search connections.
    pub async fn from_config(
        config: &FoundryConfig,
        project: Option<&ProjectClient>,
    ) -> Result<Self, FoundryError> {
        let intent_prompt = PromptTemplate::from_prompty(config.intent_prompt_path())?;
        let index_name = config.require_search_index()?;

        let inference = match &config.inference_override {
            Some(service) => AzureInferenceClient::new(&service.endpoint, &service.key),
            None => {
                let connection = require_project(project)?
                    .connections()
                    .get_default(ConnectionType::AiServices, true)
                    .await?;
                AzureInferenceClient::from_connection(&connection)?
            }
        };

        let search = match &config.search_override {
            Some(service) => AzureSearchClient::new(&service.endpoint, index_name, &service.key),
            None => {
                let connection = require_project(project)?
                    .connections()
                    .get_default(ConnectionType::CognitiveSearch, true)
                    .await?;
                AzureSearchClient::from_connection(&connection, index_name)?
            }
        };

        let inference = Arc::new(inference);
        Ok(Self::new(
            inference.clone(),
            inference,
            Arc::new(search),
            intent_prompt,
            config.require_intent_mapping_model()?,
            config.require_embeddings_model()?,
        ))
    }

    /// Map the conversation to a search query, embed it, run a hybrid search,
    /// and record the query and documents in `context`.
    ///
    /// On failure nothing is appended to `context`.
    #[instrument(name = "get_product_documents", skip_all, fields(top = context.overrides.top))]
    pub async fn get_product_documents(
        &self,
        messages: &[ConversationTurn],
        context: &mut RetrievalContext,
    ) -> Result<Vec<Document>, FoundryError> {
        let top = context.overrides.top;

        let search_query = self.map_intent(messages).await?;
        info!(query = %search_query, "Intent mapping");

        let vector = self.embed_query(&search_query).await?;

        let request = SearchRequest {
            search_text: search_query.clone(),
            vector_queries: vec![VectorizedQuery::new(vector, top, VECTOR_FIELD)],
            select: DOCUMENT_FIELDS.iter().map(|f| f.to_string()).collect(),
            top: Some(top),
        };
        let records = self
            .search
            .search(&request)
            .await
            .map_err(|e| FoundryError::search("hybrid search request failed", Some(e)))?;

        let documents = records
            .iter()
            .take(top)
            .map(Document::from_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FoundryError::search("malformed search result", Some(e)))?;

        context.thoughts.push(Thought {
            title: QUERY_THOUGHT_TITLE.to_string(),
            description: search_query,
        });
        context.grounding_data.push(documents.clone());

        info!(count = documents.len(), "Documents retrieved");
        debug!(?documents, "Retrieved documents");
        Ok(documents)
    }

    async fn map_intent(&self, messages: &[ConversationTurn]) -> Result<String, FoundryError> {
        let rendered = self
            .intent_prompt
            .render(&serde_json::json!({ "conversation": messages }))
            .map_err(|e| FoundryError::intent_mapping("could not render intent prompt", Some(e)))?;

        let request = ChatCompletionsRequest {
            model: self.intent_model.clone(),
            messages: rendered,
            parameters: self.intent_prompt.parameters().clone(),
        };
        let response = self
            .chat
            .complete(&request)
            .await
            .map_err(|e| FoundryError::intent_mapping("chat completion failed", Some(e)))?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| FoundryError::intent_mapping("chat completion returned no choices or no text", None))
    }

    async fn embed_query(&self, search_query: &str) -> Result<Vec<f32>, FoundryError> {
        if search_query.trim().is_empty() {
            return Err(FoundryError::embedding("search query is empty", None));
        }
        let vector = self
            .embeddings
            .embed(&self.embeddings_model, search_query)
            .await
            .map_err(|e| FoundryError::embedding("embedding request failed", Some(e)))?;
        if vector.is_empty() {
            return Err(FoundryError::embedding("embedding service returned an empty vector", None));
        }
        Ok(vector)
    }
}

fn require_project(project: Option<&ProjectClient>) -> Result<&ProjectClient, FoundryError> {
    project.ok_or_else(|| {
        FoundryError::Configuration(
            "set AIPROJECT_CONNECTION_STRING or the AZURE_INFERENCE_*/AZURE_SEARCH_* overrides".into(),
        )
    })
}
