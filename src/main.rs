use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use pokebot::agent::Agent;
use pokebot::cli::run_chat_loop;
use pokebot::config::AppConfig;
use pokebot::llm::groq::GroqProvider;
use pokebot::llm::tool_definitions;
use pokebot::mcp::session::{StdioSession, ToolSession};

/// Chat client that answers Pokémon questions through MCP tools.
#[derive(Parser, Debug)]
#[command(name = "pokebot", version, about)]
struct Args {
    /// Path to the config file (default: ~/.pokebot/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the conversation transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Auto-generate config file on first run
    if args.config.is_none() {
        let config_path = AppConfig::config_path()?;
        if !config_path.exists() {
            let path = AppConfig::save_default()?;
            println!("[Config] Created default config: {}", path.display());
            println!("[Config] Edit it to set your api_key, model, etc.");
        }
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::load_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(model) = args.model {
        config.llm.model = model;
    }

    let api_key = config.api_key()?;
    let provider = GroqProvider::new(api_key, config.llm.api_base.clone());

    let mut session = StdioSession::connect(&config.server).await?;
    let descriptors = session.list_tools().await?;
    let names: Vec<&str> = descriptors.iter().map(|tool| tool.name.as_str()).collect();
    println!("\nConnected to MCP server with tools: {:?}", names);

    let tools = tool_definitions(&descriptors);
    let agent = Agent::new(
        Box::new(provider),
        Box::new(session),
        tools,
        config.llm.model.clone(),
    );

    run_chat_loop(agent).await
}
