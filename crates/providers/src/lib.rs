//! Model backends for RepoLens.
//!
//! Two `ModelClient` implementations (OpenAI-compatible and native
//! Anthropic) plus a factory that builds the configured one. The
//! factory also serves per-request key overrides from the gateway.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiCompatClient;

use repolens_config::AppConfig;
use repolens_core::ModelClient;
use std::sync::Arc;

/// Build the model client selected by configuration.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn ModelClient> {
    let api_key = config.api_key.clone().unwrap_or_default();
    build_with_key(config, &api_key)
}

/// Build the configured client with an explicit API key (per-request
/// override from the HTTP layer).
pub fn build_with_key(config: &AppConfig, api_key: &str) -> Arc<dyn ModelClient> {
    match config.provider.as_str() {
        "anthropic" => {
            let mut client = AnthropicClient::new(api_key, &config.model);
            if let Some(url) = &config.api_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
        _ => {
            let base_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
            Arc::new(OpenAiCompatClient::new(
                config.provider.clone(),
                base_url,
                api_key,
                &config.model,
            ))
        }
    }
}
