//! Convenience re-exports for common use.

pub use crate::agents::{
    AgentEventHandler, AgentRunStream, AgentsClient, ConsoleEventHandler, CreateAgentOptions,
    MessageRole, StreamEvent,
};
pub use crate::auth::{DefaultAzureCredential, TokenCredential};
pub use crate::config::FoundryConfig;
pub use crate::error::{FoundryError, Result};
pub use crate::project::ProjectClient;
pub use crate::rag::{ConversationTurn, Document, ProductRetriever, RetrievalContext};
