use anyhow::Result;
use clap::Parser;

use pokebot::pokeapi::{PokeClient, DEFAULT_BASE_URL};
use pokebot::server::serve_stdio;
use pokebot::server::tools::create_registry;

/// MCP server exposing Pokémon lookup tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "pokemon-mcp-server", version, about)]
struct Args {
    /// Base URL of the PokéAPI instance to query
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON-RPC stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = PokeClient::new(args.base_url)?;
    let registry = create_registry(client);
    serve_stdio(registry).await
}
