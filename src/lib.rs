//! pokebot - a Pokémon chat assistant backed by MCP tools.
//!
//! The crate builds two binaries that talk to each other over stdio:
//! `pokebot`, the interactive chat client, and `pokemon-mcp-server`, the
//! tool server that answers Pokémon lookups from PokéAPI.

pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod mcp;
pub mod pokeapi;
pub mod server;
pub mod types;
