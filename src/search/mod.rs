//! Hybrid (text + vector) document search.

pub mod azure;

pub use azure::AzureSearchClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FoundryError;

/// One raw result record, with every field the service returned.
pub type SearchRecord = serde_json::Map<String, serde_json::Value>;

/// Nearest-neighbor leg of a hybrid query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VectorizedQuery {
    pub vector: Vec<f32>,
    #[serde(rename = "k")]
    pub k_nearest_neighbors: usize,
    /// Comma-separated vector field names.
    pub fields: String,
}

impl VectorizedQuery {
    pub fn new(vector: Vec<f32>, k_nearest_neighbors: usize, fields: impl Into<String>) -> Self {
        Self {
            vector,
            k_nearest_neighbors,
            fields: fields.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub search_text: String,
    pub vector_queries: Vec<VectorizedQuery>,
    pub select: Vec<String>,
    pub top: Option<usize>,
}

#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Results in service ranking order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, FoundryError>;
}
