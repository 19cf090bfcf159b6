//! ModelClient trait — the abstraction over the external generative model.
//!
//! A ModelClient knows how to send a system + user prompt pair to an LLM
//! and get the raw completion text back. The pipeline uses it twice per
//! call: once for file ranking (JSON response mode) and once for the final
//! summary. It never interprets the payload itself — validation of the
//! ranking response is the selector protocol's job.
//!
//! Implementations: OpenAI-compatible, Anthropic.

use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// System prompt.
    pub system: String,

    /// User message.
    pub user: String,

    /// Temperature (0.0 = deterministic).
    #[serde(default)]
    pub temperature: f32,

    /// Ask the provider to constrain output to a JSON object, where the
    /// backend supports it. Used by the file-ranking call.
    #[serde(default)]
    pub json_response: bool,
}

impl ModelRequest {
    /// A deterministic JSON-mode request (used for file ranking).
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
            json_response: true,
        }
    }

    /// A plain-text request with the given temperature.
    pub fn text(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
            json_response: false,
        }
    }
}

/// The external generative model contract.
///
/// Every backend implements this trait. The pipeline calls `complete()`
/// without knowing which provider is being used — pure polymorphism.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Send a request and return the raw completion text.
    async fn complete(&self, request: ModelRequest) -> std::result::Result<String, ModelError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ModelError> {
        Ok(true)
    }
}
