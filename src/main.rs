//! foundry-kit CLI binary entry point.

use std::sync::Arc;

use foundry_kit::agents::{AgentsClient, ConsoleEventHandler, CreateAgentOptions, MessageRole};
use foundry_kit::auth::{DefaultAzureCredential, TokenCredential};
use foundry_kit::cli::{AgentStreamArgs, Cli, Commands, ProductDocsArgs};
use foundry_kit::config::FoundryConfig;
use foundry_kit::error::FoundryError;
use foundry_kit::project::ProjectClient;
use foundry_kit::rag::{ConversationTurn, ProductRetriever, RetrievalContext};
use tracing::{info, info_span, warn, Instrument};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    foundry_kit::observability::init_tracing();

    let config = FoundryConfig::from_env();
    let result = match cli.command {
        Commands::AgentStream(args) => handle_agent_stream(&config, args).await,
        Commands::ProductDocs(args) => handle_product_docs(&config, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn credential() -> Arc<dyn TokenCredential> {
    Arc::new(DefaultAzureCredential::new())
}

async fn handle_agent_stream(config: &FoundryConfig, args: AgentStreamArgs) -> Result<(), FoundryError> {
    let project = ProjectClient::new(config.require_connection_string()?, credential());

    let telemetry = match project.telemetry().get_connection_string().await {
        Ok(_) => true,
        Err(e) if !e.is_fatal() => {
            println!("Application Insights was not enabled for this project.");
            println!("Enable it via the 'Tracing' tab in your AI Studio project page.");
            false
        }
        Err(e) => return Err(e),
    };

    let span = info_span!(
        "agent_stream",
        telemetry,
        gen_ai.user.message = tracing::field::Empty
    );
    if config.content_recording {
        span.record("gen_ai.user.message", args.message.as_str());
    }

    let model = args.model.clone().unwrap_or_else(|| config.agent_model.clone());
    run_agent(project.agents(), model, args).instrument(span).await
}

async fn run_agent(agents: AgentsClient, model: String, args: AgentStreamArgs) -> Result<(), FoundryError> {
    let options = CreateAgentOptions::builder()
        .model(model)
        .name(args.name)
        .instructions(args.instructions)
        .build();
    let agent = agents.create_agent(&options).await?;
    println!("Created agent, agent ID {}", agent.id);

    let outcome = async {
        let thread = agents.create_thread().await?;
        println!("Created thread, thread ID {}", thread.id);

        let message = agents
            .create_message(&thread.id, MessageRole::User, &args.message)
            .await?;
        println!("Created message, message ID {}", message.id);

        let mut stream = agents.create_stream(&thread.id, &agent.id).await?;
        stream.until_done(&mut ConsoleEventHandler::stdout()).await?;
        Ok::<_, FoundryError>(thread.id)
    }
    .await;

    // The agent is removed even when the run failed.
    match agents.delete_agent(&agent.id).await {
        Ok(_) => println!("Deleted agent"),
        Err(e) => warn!(agent_id = %agent.id, error = %e, "Failed to delete agent"),
    }

    let thread_id = outcome?;
    let messages = agents.list_messages(&thread_id).await?;
    println!("Messages: {}", serde_json::to_string_pretty(&messages)?);
    Ok(())
}

async fn handle_product_docs(config: &FoundryConfig, args: ProductDocsArgs) -> Result<(), FoundryError> {
    let project = match &config.project_connection_string {
        Some(conn) => Some(ProjectClient::from_connection_string(conn, credential())?),
        None => None,
    };
    let retriever = ProductRetriever::from_config(config, project.as_ref()).await?;

    let mut context = RetrievalContext::with_top(args.top);
    let documents = retriever
        .get_product_documents(&[ConversationTurn::user(args.query)], &mut context)
        .await?;

    info!(thoughts = context.thoughts.len(), "Retrieval finished");
    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}
