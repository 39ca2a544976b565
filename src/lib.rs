//! foundry-kit — Azure AI Foundry agents and product retrieval for Rust.
//!
//! Two independent flows share one client stack:
//!
//! - **Agent runs**: create an agent, thread, and message, then stream the
//!   run's events into an [`agents::AgentEventHandler`].
//! - **Product retrieval**: rewrite a conversation into a search query,
//!   embed it, run a hybrid search, and record provenance in a
//!   [`rag::RetrievalContext`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use foundry_kit::prelude::*;
//!
//! # async fn example() -> foundry_kit::error::Result<()> {
//! let config = FoundryConfig::from_env();
//! let project = ProjectClient::new(
//!     config.require_connection_string()?,
//!     Arc::new(DefaultAzureCredential::new()),
//! );
//!
//! let agents = project.agents();
//! let agent = agents
//!     .create_agent(&CreateAgentOptions::builder().model("gpt-4o").name("my-assistant").build())
//!     .await?;
//! let thread = agents.create_thread().await?;
//! agents.create_message(&thread.id, MessageRole::User, "Hello, tell me a joke").await?;
//!
//! let mut stream = agents.create_stream(&thread.id, &agent.id).await?;
//! stream.until_done(&mut ConsoleEventHandler::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod inference;
pub mod observability;
pub mod prelude;
pub mod project;
pub mod prompty;
pub mod rag;
pub mod search;

#[cfg(feature = "cli")]
pub mod cli;
