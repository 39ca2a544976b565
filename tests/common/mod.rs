//! Shared test helpers: recording collaborators and a recording handler.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use foundry_kit::agents::{AgentEventHandler, MessageDeltaChunk, RunStep, ThreadMessage, ThreadRun};
use foundry_kit::auth::{StaticTokenCredential, TokenCredential};
use foundry_kit::error::FoundryError;
use foundry_kit::inference::{
    ChatChoice, ChatCompletions, ChatCompletionsClient, ChatCompletionsRequest, ChatResponseMessage,
    ChatRole, EmbeddingsClient,
};
use foundry_kit::prompty::PromptTemplate;
use foundry_kit::rag::ProductRetriever;
use foundry_kit::search::{DocumentSearch, SearchRecord, SearchRequest};

pub const CONNECTION_STRING: &str = "eastus.api.azureml.ms;sub-1;rg-1;proj-1";
pub const RESOURCE_PATH: &str =
    "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.MachineLearningServices/workspaces/proj-1";

/// Data-plane path prefix for the test project.
pub fn project_path() -> String {
    format!("/agents/v1.0{RESOURCE_PATH}")
}

pub fn credential() -> Arc<dyn TokenCredential> {
    Arc::new(StaticTokenCredential::new("test-token"))
}

/// The intent prompt bundled with the crate.
pub fn intent_prompt() -> PromptTemplate {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/intent_mapping.prompty");
    PromptTemplate::from_prompty(path).unwrap()
}

pub fn completion(text: &str) -> ChatCompletions {
    ChatCompletions {
        id: Some("chatcmpl-1".to_string()),
        model: Some("gpt-4o-mini".to_string()),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatResponseMessage {
                role: ChatRole::Assistant,
                content: Some(text.to_string()),
            },
            finish_reason: Some("stop".to_string()),
        }],
    }
}

/// Chat collaborator returning queued results and recording every request.
#[derive(Default)]
pub struct MockChat {
    responses: Mutex<VecDeque<Result<ChatCompletions, FoundryError>>>,
    pub requests: Mutex<Vec<ChatCompletionsRequest>>,
}

impl MockChat {
    pub fn replying(text: &str) -> Arc<Self> {
        let mock = Self::default();
        mock.queue(Ok(completion(text)));
        Arc::new(mock)
    }

    pub fn responding(response: ChatCompletions) -> Arc<Self> {
        let mock = Self::default();
        mock.queue(Ok(response));
        Arc::new(mock)
    }

    pub fn failing(error: FoundryError) -> Arc<Self> {
        let mock = Self::default();
        mock.queue(Err(error));
        Arc::new(mock)
    }

    pub fn queue(&self, response: Result<ChatCompletions, FoundryError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletionsClient for MockChat {
    async fn complete(&self, request: &ChatCompletionsRequest) -> Result<ChatCompletions, FoundryError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FoundryError::InvalidState("no queued completion".into())))
    }
}

/// Embeddings collaborator returning a fixed vector, or failing once.
pub struct MockEmbeddings {
    failure: Mutex<Option<FoundryError>>,
    vector: Vec<f32>,
    pub inputs: Mutex<Vec<(String, String)>>,
}

impl MockEmbeddings {
    pub fn with_vector(vector: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(None),
            vector,
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: FoundryError) -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(Some(error)),
            vector: Vec::new(),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait]
impl EmbeddingsClient for MockEmbeddings {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, FoundryError> {
        self.inputs
            .lock()
            .unwrap()
            .push((model.to_string(), input.to_string()));
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(self.vector.clone()),
        }
    }
}

/// Search collaborator returning fixed records, or failing once.
pub struct MockSearch {
    failure: Mutex<Option<FoundryError>>,
    records: Vec<SearchRecord>,
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearch {
    pub fn with_records(records: Vec<serde_json::Value>) -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(None),
            records: records
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: FoundryError) -> Arc<Self> {
        Arc::new(Self {
            failure: Mutex::new(Some(error)),
            records: Vec::new(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentSearch for MockSearch {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchRecord>, FoundryError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(self.records.clone()),
        }
    }
}

pub fn retriever(
    chat: Arc<MockChat>,
    embeddings: Arc<MockEmbeddings>,
    search: Arc<MockSearch>,
) -> ProductRetriever {
    ProductRetriever::new(
        chat,
        embeddings,
        search,
        intent_prompt(),
        "gpt-4o-mini",
        "text-embedding-ada-002",
    )
}

/// Handler that records one line per callback.
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Vec<String>,
}

impl AgentEventHandler for RecordingHandler {
    fn on_message_delta(&mut self, delta: &MessageDeltaChunk) -> Result<(), FoundryError> {
        self.calls.push(format!("delta:{}", delta.text()));
        Ok(())
    }

    fn on_thread_message(&mut self, message: &ThreadMessage) -> Result<(), FoundryError> {
        self.calls
            .push(format!("message:{}:{}", message.id, message.status));
        Ok(())
    }

    fn on_thread_run(&mut self, run: &ThreadRun) -> Result<(), FoundryError> {
        self.calls.push(format!("run:{}", run.status));
        Ok(())
    }

    fn on_run_step(&mut self, step: &RunStep) -> Result<(), FoundryError> {
        self.calls
            .push(format!("step:{}:{}", step.step_type, step.status));
        Ok(())
    }

    fn on_error(&mut self, data: &str) -> Result<(), FoundryError> {
        self.calls.push(format!("error:{data}"));
        Ok(())
    }

    fn on_done(&mut self) -> Result<(), FoundryError> {
        self.calls.push("done".to_string());
        Ok(())
    }

    fn on_unhandled_event(&mut self, event_type: &str, data: &str) -> Result<(), FoundryError> {
        self.calls.push(format!("unhandled:{event_type}:{data}"));
        Ok(())
    }
}
