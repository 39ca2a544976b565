//! Hosted agent service: agents, threads, messages, and streamed runs.

pub mod events;
pub mod handler;
pub mod stream;
pub mod types;

pub use events::StreamEvent;
pub use handler::{dispatch, AgentEventHandler, ConsoleEventHandler, DispatchFlow};
pub use stream::{AgentRunStream, StreamState};
pub use types::*;

use std::sync::Arc;

use reqwest::Method;
use reqwest_eventsource::EventSource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::{TokenCredential, MANAGEMENT_SCOPE};
use crate::error::FoundryError;
use crate::http::{bearer_headers, read_json, shared_client};

pub const AGENTS_API_VERSION: &str = "2024-07-01-preview";

/// Client for the project's agent endpoints.
#[derive(Clone)]
pub struct AgentsClient {
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
}

impl AgentsClient {
    /// `endpoint` is the project data-plane base URL.
    pub fn new(endpoint: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, FoundryError> {
        let token = self.credential.get_token(MANAGEMENT_SCOPE).await?;
        let url = format!("{}{}", self.endpoint, path);
        Ok(shared_client()
            .request(method, url)
            .query(&[("api-version", AGENTS_API_VERSION)])
            .headers(bearer_headers(&token.token)))
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, FoundryError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        read_json(builder.send().await?).await
    }

    pub async fn create_agent(&self, options: &CreateAgentOptions) -> Result<Agent, FoundryError> {
        debug!(model = %options.model, "Creating agent");
        self.send(Method::POST, "/assistants", Some(options)).await
    }

    pub async fn delete_agent(&self, agent_id: &str) -> Result<AgentDeletionStatus, FoundryError> {
        debug!(agent_id, "Deleting agent");
        self.send::<_, ()>(Method::DELETE, &format!("/assistants/{agent_id}"), None)
            .await
    }

    pub async fn create_thread(&self) -> Result<AgentThread, FoundryError> {
        self.send(Method::POST, "/threads", Some(&serde_json::json!({})))
            .await
    }

    pub async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, FoundryError> {
        let body = serde_json::json!({ "role": role, "content": content });
        self.send(Method::POST, &format!("/threads/{thread_id}/messages"), Some(&body))
            .await
    }

    pub async fn list_messages(&self, thread_id: &str) -> Result<ThreadMessages, FoundryError> {
        self.send::<_, ()>(Method::GET, &format!("/threads/{thread_id}/messages"), None)
            .await
    }

    /// Start a run on `thread_id` and open its event stream.
    pub async fn create_stream(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<AgentRunStream, FoundryError> {
        debug!(thread_id, assistant_id, "Opening run stream");
        let body = serde_json::json!({ "assistant_id": assistant_id, "stream": true });
        let builder = self
            .request(Method::POST, &format!("/threads/{thread_id}/runs"))
            .await?
            .json(&body);
        let source = EventSource::new(builder)
            .map_err(|e| FoundryError::Stream(format!("cannot open run stream: {e}")))?;
        Ok(AgentRunStream::from_event_source(source))
    }
}
