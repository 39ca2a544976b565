//! CLI entry point for foundry-kit.

use clap::{Parser, Subcommand};

pub const DEFAULT_QUERY: &str = "I need a new tent for 4 people, what would you recommend?";
pub const DEFAULT_AGENT_MESSAGE: &str = "Hello, tell me a joke";

/// foundry-kit CLI
#[derive(Parser, Debug)]
#[command(name = "foundry-kit", version, about = "Azure AI Foundry agent and retrieval samples")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an agent and print its streamed events
    AgentStream(AgentStreamArgs),
    /// Retrieve product documents for a query
    ProductDocs(ProductDocsArgs),
}

/// Arguments for `foundry-kit agent-stream`.
#[derive(Parser, Debug)]
pub struct AgentStreamArgs {
    /// Model deployment for the agent (defaults to AGENT_MODEL or gpt-4o)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Agent name
    #[arg(long, default_value = "my-assistant")]
    pub name: String,

    /// Agent instructions
    #[arg(long, default_value = "You are a helpful assistant")]
    pub instructions: String,

    /// User message posted to the thread
    #[arg(long, default_value = DEFAULT_AGENT_MESSAGE)]
    pub message: String,
}

/// Arguments for `foundry-kit product-docs`.
#[derive(Parser, Debug)]
pub struct ProductDocsArgs {
    /// Query to use to search product
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Number of documents to retrieve
    #[arg(long, default_value_t = crate::rag::DEFAULT_TOP)]
    pub top: usize,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_product_docs_with_defaults() {
        let cli = Cli::try_parse_from(["foundry-kit", "product-docs"]).unwrap();
        match cli.command {
            Commands::ProductDocs(args) => {
                assert_eq!(args.query, DEFAULT_QUERY);
                assert_eq!(args.top, 5);
            }
            other => panic!("expected ProductDocs, got {other:?}"),
        }
    }

    #[test]
    fn parse_product_docs_with_query() {
        let cli = Cli::try_parse_from([
            "foundry-kit",
            "product-docs",
            "--query",
            "lightweight sleeping bag",
            "--top",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::ProductDocs(args) => {
                assert_eq!(args.query, "lightweight sleeping bag");
                assert_eq!(args.top, 3);
            }
            other => panic!("expected ProductDocs, got {other:?}"),
        }
    }

    #[test]
    fn parse_agent_stream_with_defaults() {
        let cli = Cli::try_parse_from(["foundry-kit", "agent-stream"]).unwrap();
        match cli.command {
            Commands::AgentStream(args) => {
                assert!(args.model.is_none());
                assert_eq!(args.name, "my-assistant");
                assert_eq!(args.instructions, "You are a helpful assistant");
                assert_eq!(args.message, DEFAULT_AGENT_MESSAGE);
            }
            other => panic!("expected AgentStream, got {other:?}"),
        }
    }

    #[test]
    fn parse_agent_stream_with_model() {
        let cli =
            Cli::try_parse_from(["foundry-kit", "agent-stream", "-m", "gpt-4o-mini"]).unwrap();
        match cli.command {
            Commands::AgentStream(args) => assert_eq!(args.model.as_deref(), Some("gpt-4o-mini")),
            other => panic!("expected AgentStream, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["foundry-kit"]).is_err());
    }

    #[test]
    fn parse_invalid_top_is_error() {
        assert!(Cli::try_parse_from(["foundry-kit", "product-docs", "--top", "many"]).is_err());
    }
}
