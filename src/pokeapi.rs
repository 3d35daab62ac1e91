//! PokéAPI HTTP client and the error taxonomy for the data tools.
//!
//! Every upstream failure is translated into an `ApiError` variant here,
//! at the edge, so the tools themselves deal only in ordinary `Result`
//! values. The display text of an `ApiError` is exactly what reaches the
//! model as tool-result content.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors surfaced by the Pokémon data tools.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Bad tool arguments, rejected before any network call.
    #[error("{0}")]
    Validation(String),
    /// The requested Pokémon does not exist upstream (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// Timeout, connection, or other HTTP-level failure.
    #[error("{0}")]
    Transport(String),
    /// The upstream JSON is missing a field we depend on.
    #[error("{0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// A required key was absent (or had an unusable type) in an upstream
    /// response.
    pub fn missing_key(key: &str) -> Self {
        Self::MalformedResponse(format!(
            "Unexpected API response structure. Missing key: '{}'",
            key
        ))
    }
}

/// Thin async client over the public PokéAPI.
#[derive(Clone)]
pub struct PokeClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch a Pokémon record by name or numeric id.
    pub async fn fetch_pokemon(&self, ident: &str) -> Result<Value, ApiError> {
        let url = format!("{}/pokemon/{}", self.base_url.trim_end_matches('/'), ident);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!(
                "Pokémon '{}' not found. Please check the spelling and try again.",
                ident
            )));
        }
        let response = response.error_for_status().map_err(transport_error)?;
        response.json().await.map_err(transport_error)
    }

    /// Fetch an absolute URL. Ability detail pages are linked off the
    /// Pokémon record, so these are full URLs rather than paths.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let response = response.error_for_status().map_err(transport_error)?;
        response.json().await.map_err(transport_error)
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport("Request timed out. Please try again.".to_string())
    } else if e.is_connect() {
        ApiError::Transport("Connection error. Please check your internet connection.".to_string())
    } else if e.is_decode() {
        ApiError::MalformedResponse(format!("API returned invalid JSON: {}", e))
    } else {
        ApiError::Transport(format!("API request failed: {}", e))
    }
}

// --- Response field accessors ---
//
// The upstream schema is taken on faith; a missing or mistyped field is a
// MalformedResponse naming the key, matching the error surface of the rest
// of the taxonomy.

pub fn require_field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, ApiError> {
    value.get(key).ok_or_else(|| ApiError::missing_key(key))
}

pub fn require_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, ApiError> {
    require_field(value, key)?
        .as_str()
        .ok_or_else(|| ApiError::missing_key(key))
}

pub fn require_u64(value: &Value, key: &str) -> Result<u64, ApiError> {
    require_field(value, key)?
        .as_u64()
        .ok_or_else(|| ApiError::missing_key(key))
}

pub fn require_bool(value: &Value, key: &str) -> Result<bool, ApiError> {
    require_field(value, key)?
        .as_bool()
        .ok_or_else(|| ApiError::missing_key(key))
}

pub fn require_array<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], ApiError> {
    require_field(value, key)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ApiError::missing_key(key))
}
