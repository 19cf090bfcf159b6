//! Error types for the RepoLens domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all RepoLens operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Pipeline errors ---
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the external generative model call.
///
/// All of these are recoverable from the pipeline's point of view: the
/// file-ranking call falls back to the heuristic ordering. Only the final
/// summarization call treats them as fatal.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the summarization pipeline itself.
///
/// `SourceUnavailable` and `EmptyCandidateSet` are the only kinds that
/// surface to callers as hard failures; selector anomalies are absorbed
/// into the fallback ranking and reported via response metadata.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source tree unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No candidate files survived filtering")]
    EmptyCandidateSet,

    #[error("Invalid repository locator: {0}")]
    InvalidLocator(String),

    #[error("Selector required but unavailable: {0}")]
    SelectorRequired(ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_displays_correctly() {
        let err = Error::Model(ModelError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn pipeline_error_displays_correctly() {
        let err = Error::Pipeline(PipelineError::SourceUnavailable(
            "/tmp/missing: no such directory".into(),
        ));
        assert!(err.to_string().contains("/tmp/missing"));

        let err = Error::Pipeline(PipelineError::EmptyCandidateSet);
        assert!(err.to_string().contains("candidate"));
    }

    #[test]
    fn selector_required_wraps_model_error() {
        let err = PipelineError::SelectorRequired(ModelError::Timeout("60s elapsed".into()));
        assert!(err.to_string().contains("60s elapsed"));
    }
}
