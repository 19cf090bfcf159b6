//! HTTP API gateway for RepoLens.
//!
//! Exposes the summarization service over REST:
//! - `POST /summarize` — summarize a GitHub repository
//! - `GET /health` — liveness check
//!
//! Built on Axum. CORS is permissive (any origin may call the service,
//! matching the public nature of the API); fatal pipeline errors are
//! translated into structured JSON error bodies here — the core never
//! formats user-facing text.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use repolens_config::AppConfig;
use repolens_core::{Error, PipelineError, PriorityFilter};
use repolens_pipeline::{AssemblyMetadata, SummarizeOptions, SummaryService};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub service: Arc<SummaryService>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// The service to use for one request, honoring a per-request key.
    fn service_for(&self, api_key: Option<&str>) -> Arc<SummaryService> {
        match api_key {
            Some(key) => {
                let model = repolens_providers::build_with_key(&self.config, key);
                Arc::new(SummaryService::from_config(model, &self.config))
            }
            None => self.service.clone(),
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/summarize", post(summarize_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let model = repolens_providers::build_from_config(&config);
    let service = Arc::new(SummaryService::from_config(model, &config));
    let state = Arc::new(GatewayState {
        config,
        service,
        started_at: chrono::Utc::now(),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    url: String,

    /// "all" (default), "high", or "high+medium".
    #[serde(default)]
    priority: Option<String>,

    /// Per-request API key; falls back to the configured one.
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResponse {
    url: String,
    summary: String,
    metadata: AssemblyMetadata,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

async fn summarize_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let priority = match payload.priority.as_deref() {
        None => PriorityFilter::All,
        Some(raw) => PriorityFilter::parse(raw).ok_or_else(|| {
            bad_request("priority must be 'all', 'high', or 'high+medium'")
        })?,
    };

    let options = SummarizeOptions {
        priority,
        max_files: state.config.selector.max_files,
        token_budget: state.config.pipeline.token_budget,
        require_selector: false,
    };

    info!(url = %payload.url, ?priority, "Summarize request received");

    let service = state.service_for(payload.api_key.as_deref());
    match service.summarize_url(&payload.url, &options).await {
        Ok(result) => Ok(Json(SummarizeResponse {
            url: result.url,
            summary: result.summary,
            metadata: result.metadata,
        })),
        Err(Error::Pipeline(PipelineError::InvalidLocator(message))) => {
            Err(bad_request(message))
        }
        Err(e) => {
            error!(url = %payload.url, error = %e, "Summarization failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("Failed to process repo: {e}"),
                }),
            ))
        }
    }
}
