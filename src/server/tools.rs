//! The Pokémon data tools.
//!
//! Both tools follow the same lifecycle:
//!
//! 1. Tool defines its name, description, and parameter schema
//! 2. Schema is advertised to the client via `tools/list`
//! 3. The model decides to call the tool and provides arguments
//! 4. Tool validates the arguments, fetches from the PokéAPI, and
//!    reshapes the JSON into its result value
//! 5. The serving loop wraps the value as tool-result content

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::time::{sleep, Duration};
use tracing::warn;

use super::{Tool, ToolRegistry};
use crate::pokeapi::{
    require_array, require_bool, require_field, require_str, require_u64, ApiError, PokeClient,
};

/// Pause between ability detail fetches to stay friendly to the upstream API.
const DETAIL_FETCH_PAUSE: Duration = Duration::from_millis(100);

/// Create a ToolRegistry with both Pokémon tools registered.
pub fn create_registry(client: PokeClient) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetPokemonAbilitiesTool::new(client.clone())));
    registry.register(Box::new(GetPokemonStatsTool::new(client)));
    registry
}

// --- get_pokemon_abilities ---

/// Tool that fetches a Pokémon's abilities, enriched with per-ability
/// detail (description, effect, generation).
pub struct GetPokemonAbilitiesTool {
    client: PokeClient,
}

impl GetPokemonAbilitiesTool {
    pub fn new(client: PokeClient) -> Self {
        Self { client }
    }
}

/// Accepts a Pokémon name (case-insensitive, surrounding whitespace
/// ignored) or a positive numeric id.
fn ability_ident(args: &Value) -> Result<String, ApiError> {
    match args.get("pokemon_name") {
        Some(Value::String(name)) => {
            let cleaned = name.trim().to_lowercase();
            if cleaned.is_empty() {
                Err(ApiError::Validation(
                    "Pokemon identifier cannot be empty".to_string(),
                ))
            } else {
                Ok(cleaned)
            }
        }
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) if id > 0 => Ok(id.to_string()),
            Some(_) => Err(ApiError::Validation(
                "Pokemon ID must be a positive integer".to_string(),
            )),
            None => Err(ApiError::Validation(
                "Pokemon identifier must be a string or positive integer".to_string(),
            )),
        },
        _ => Err(ApiError::Validation(
            "Pokemon identifier must be a string or positive integer".to_string(),
        )),
    }
}

/// The enrichment fields pulled from an ability's detail page.
#[derive(Debug)]
struct AbilityDetail {
    description: String,
    effect: String,
    generation: String,
}

fn ability_detail_fields(detail: &Value) -> Result<AbilityDetail, ApiError> {
    // English flavor text, with line and page breaks flattened to spaces.
    let mut description = "No description available".to_string();
    if let Some(entries) = detail.get("flavor_text_entries").and_then(Value::as_array) {
        for entry in entries {
            let language = require_field(entry, "language")?;
            if require_str(language, "name")? == "en" {
                description = require_str(entry, "flavor_text")?
                    .replace('\n', " ")
                    .replace('\u{000C}', " ");
                break;
            }
        }
    }

    let mut effect = "No effect description available".to_string();
    if let Some(entries) = detail.get("effect_entries").and_then(Value::as_array) {
        for entry in entries {
            let language = require_field(entry, "language")?;
            if require_str(language, "name")? == "en" {
                effect = require_str(entry, "effect")?.to_string();
                break;
            }
        }
    }

    let generation = require_str(require_field(detail, "generation")?, "name")?.to_string();

    Ok(AbilityDetail {
        description,
        effect,
        generation,
    })
}

#[async_trait]
impl Tool for GetPokemonAbilitiesTool {
    fn name(&self) -> &str {
        "get_pokemon_abilities"
    }

    fn description(&self) -> &str {
        "Fetch abilities for a specific Pokémon from the PokéAPI, \
         including each ability's description, effect, and generation."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pokemon_name": {
                    "type": "string",
                    "description": "The Pokémon name (e.g. \"pikachu\") or numeric id"
                }
            },
            "required": ["pokemon_name"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ApiError> {
        let ident = ability_ident(&args)?;
        let pokemon = self.client.fetch_pokemon(&ident).await?;

        let mut abilities: Vec<(u64, Value)> = Vec::new();
        for entry in require_array(&pokemon, "abilities")? {
            let ability = require_field(entry, "ability")?;
            let name = require_str(ability, "name")?.to_string();
            let slot = require_u64(entry, "slot")?;
            let mut info = json!({
                "name": name,
                "is_hidden": require_bool(entry, "is_hidden")?,
                "slot": slot,
            });

            // Detail enrichment is best-effort across the network: a
            // transport failure keeps the entry with base fields only.
            // A malformed detail page still fails the whole call.
            let url = require_str(ability, "url")?;
            match self.client.fetch_json(url).await {
                Ok(detail) => {
                    let fields = ability_detail_fields(&detail)?;
                    if let Some(obj) = info.as_object_mut() {
                        obj.insert("description".to_string(), json!(fields.description));
                        obj.insert("effect".to_string(), json!(fields.effect));
                        obj.insert("generation".to_string(), json!(fields.generation));
                    }
                    sleep(DETAIL_FETCH_PAUSE).await;
                }
                Err(ApiError::Transport(e)) => {
                    warn!("Could not fetch detailed info for ability '{}': {}", name, e);
                }
                Err(e) => return Err(e),
            }

            abilities.push((slot, info));
        }

        // Sort abilities by slot for consistent ordering.
        abilities.sort_by_key(|(slot, _)| *slot);
        let abilities: Vec<Value> = abilities.into_iter().map(|(_, info)| info).collect();

        Ok(json!({
            "pokemon_name": require_str(&pokemon, "name")?,
            "pokemon_id": require_u64(&pokemon, "id")?,
            "abilities": abilities,
        }))
    }
}

// --- get_pokemon_stats ---

/// Tool that fetches a Pokémon's base stats.
pub struct GetPokemonStatsTool {
    client: PokeClient,
}

impl GetPokemonStatsTool {
    pub fn new(client: PokeClient) -> Self {
        Self { client }
    }
}

fn stats_name(args: &Value) -> Result<String, ApiError> {
    match args.get("pokemon_name") {
        Some(Value::String(name)) => {
            let cleaned = name.trim().to_lowercase();
            if cleaned.is_empty() {
                Err(ApiError::Validation("Pokemon name cannot be empty".to_string()))
            } else {
                Ok(cleaned)
            }
        }
        _ => Err(ApiError::Validation("Pokemon name must be a string".to_string())),
    }
}

#[async_trait]
impl Tool for GetPokemonStatsTool {
    fn name(&self) -> &str {
        "get_pokemon_stats"
    }

    fn description(&self) -> &str {
        "Fetch base stats for a specific Pokémon by name from the PokéAPI."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pokemon_name": {
                    "type": "string",
                    "description": "The name of the Pokémon"
                }
            },
            "required": ["pokemon_name"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ApiError> {
        let name = stats_name(&args)?;
        let pokemon = self.client.fetch_pokemon(&name).await?;

        let mut base_stats = Map::new();
        let mut stat_details = Vec::new();
        let mut total_base_stats: u64 = 0;

        for entry in require_array(&pokemon, "stats")? {
            let stat = require_field(entry, "stat")?;
            let stat_name = require_str(stat, "name")?;
            let base_stat = require_u64(entry, "base_stat")?;
            let effort = require_u64(entry, "effort")?;

            base_stats.insert(stat_name.to_string(), json!(base_stat));
            stat_details.push(json!({
                "stat_name": stat_name,
                "base_stat": base_stat,
                "effort": effort,
            }));
            total_base_stats += base_stat;
        }

        Ok(json!({
            "pokemon_name": require_str(&pokemon, "name")?,
            "pokemon_id": require_u64(&pokemon, "id")?,
            "base_stats": base_stats,
            "total_base_stats": total_base_stats,
            "stat_details": stat_details,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().unwrap()
    }

    // Points at a closed port: any accidental network attempt would come
    // back as a Transport error instead of the expected Validation.
    fn offline_client() -> PokeClient {
        PokeClient::new("http://127.0.0.1:9").unwrap()
    }

    #[test]
    fn test_abilities_metadata() {
        let tool = GetPokemonAbilitiesTool::new(offline_client());
        assert_eq!(tool.name(), "get_pokemon_abilities");
        assert!(!tool.description().is_empty());
        let schema = tool.input_schema();
        assert_eq!(schema["required"][0], "pokemon_name");
    }

    #[test]
    fn test_stats_metadata() {
        let tool = GetPokemonStatsTool::new(offline_client());
        assert_eq!(tool.name(), "get_pokemon_stats");
        assert!(!tool.description().is_empty());
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["pokemon_name"]["type"], "string");
    }

    #[test]
    fn test_registry_serves_both_tools_in_order() {
        let registry = create_registry(offline_client());
        let names: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["get_pokemon_abilities", "get_pokemon_stats"]);
    }

    #[test]
    fn test_abilities_rejects_empty_name_before_any_request() {
        let rt = rt();
        rt.block_on(async {
            let tool = GetPokemonAbilitiesTool::new(offline_client());
            let err = tool.call(json!({ "pokemon_name": "" })).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
            assert_eq!(err.to_string(), "Pokemon identifier cannot be empty");
        });
    }

    #[test]
    fn test_abilities_rejects_non_positive_id() {
        let rt = rt();
        rt.block_on(async {
            let tool = GetPokemonAbilitiesTool::new(offline_client());
            let err = tool.call(json!({ "pokemon_name": -3 })).await.unwrap_err();
            assert_eq!(err.to_string(), "Pokemon ID must be a positive integer");
        });
    }

    #[test]
    fn test_abilities_rejects_other_types() {
        let rt = rt();
        rt.block_on(async {
            let tool = GetPokemonAbilitiesTool::new(offline_client());
            for args in [json!({}), json!({ "pokemon_name": true }), json!({ "pokemon_name": 1.5 })] {
                let err = tool.call(args).await.unwrap_err();
                assert_eq!(
                    err.to_string(),
                    "Pokemon identifier must be a string or positive integer"
                );
            }
        });
    }

    #[test]
    fn test_ability_ident_cleans_name() {
        let ident = ability_ident(&json!({ "pokemon_name": "  PIKACHU " })).unwrap();
        assert_eq!(ident, "pikachu");
    }

    #[test]
    fn test_ability_ident_accepts_positive_id() {
        let ident = ability_ident(&json!({ "pokemon_name": 25 })).unwrap();
        assert_eq!(ident, "25");
    }

    #[test]
    fn test_stats_rejects_non_string_name() {
        let rt = rt();
        rt.block_on(async {
            let tool = GetPokemonStatsTool::new(offline_client());
            let err = tool.call(json!({ "pokemon_name": 25 })).await.unwrap_err();
            assert_eq!(err.to_string(), "Pokemon name must be a string");
        });
    }

    #[test]
    fn test_stats_rejects_blank_name() {
        let rt = rt();
        rt.block_on(async {
            let tool = GetPokemonStatsTool::new(offline_client());
            for name in ["", "   "] {
                let err = tool.call(json!({ "pokemon_name": name })).await.unwrap_err();
                assert_eq!(err.to_string(), "Pokemon name cannot be empty");
            }
        });
    }

    #[test]
    fn test_detail_fields_default_when_no_english_entries() {
        let detail = json!({
            "flavor_text_entries": [
                { "language": { "name": "fr" }, "flavor_text": "Paralyse au contact." }
            ],
            "effect_entries": [],
            "generation": { "name": "generation-i" },
        });
        let fields = ability_detail_fields(&detail).unwrap();
        assert_eq!(fields.description, "No description available");
        assert_eq!(fields.effect, "No effect description available");
        assert_eq!(fields.generation, "generation-i");
    }

    #[test]
    fn test_detail_fields_flatten_breaks_in_flavor_text() {
        let detail = json!({
            "flavor_text_entries": [
                { "language": { "name": "en" }, "flavor_text": "May paralyze\non\u{000C}contact." }
            ],
            "generation": { "name": "generation-iii" },
        });
        let fields = ability_detail_fields(&detail).unwrap();
        assert_eq!(fields.description, "May paralyze on contact.");
    }

    #[test]
    fn test_detail_fields_require_generation() {
        let detail = json!({ "flavor_text_entries": [], "effect_entries": [] });
        let err = ability_detail_fields(&detail).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected API response structure. Missing key: 'generation'"
        );
    }
}
