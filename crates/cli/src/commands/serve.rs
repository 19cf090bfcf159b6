//! `repolens serve` — Start the HTTP gateway server.

use repolens_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        tracing::warn!(
            "No API key configured — requests must supply one via the api_key field"
        );
    }

    repolens_gateway::start(config).await
}
