//! End-to-end summary service: URL → clone → context → model summary.
//!
//! Owns the scoped lifetime of the cloned tree; the scratch directory is
//! deleted when the `SourceTree` drops, on every exit path.

use crate::source::{RepoLocator, SourceTree};
use crate::{AssemblyMetadata, Pipeline, SummarizeOptions};
use repolens_core::{ModelClient, ModelRequest, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// System prompt for the final summarization call.
pub(crate) const SUMMARY_PROMPT: &str = "\
You are a code analyst. Given a repository's directory structure and selected \
file contents, produce a clear, human-readable summary.

Your summary should include these sections:
1. **Purpose** — What does this project do? (1-2 sentences)
2. **Tech Stack** — Languages, frameworks, and key dependencies
3. **Architecture** — How is the codebase organized? Key modules/packages
4. **Key Components** — The most important files/classes/functions and what they do
5. **Getting Started** — How to install and run the project (if discernible)

Keep it concise but informative. Focus on what matters most to someone seeing \
this project for the first time.
Do NOT include a title or heading like \"Repository Summary\" at the top. \
Start directly with the content.";

/// Temperature for the summarization call; the ranking call stays at 0.
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// The generated summary plus pipeline statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub url: String,
    pub summary: String,
    pub metadata: AssemblyMetadata,
}

/// Drives the full summarization flow for one repository.
pub struct SummaryService {
    model: Arc<dyn ModelClient>,
    pipeline: Pipeline,
}

impl SummaryService {
    pub fn new(model: Arc<dyn ModelClient>, pipeline: Pipeline) -> Self {
        Self { model, pipeline }
    }

    /// Build a service from application configuration.
    pub fn from_config(
        model: Arc<dyn ModelClient>,
        config: &repolens_config::AppConfig,
    ) -> Self {
        let pipeline = Pipeline::from_config(model.clone(), config);
        Self::new(model, pipeline)
    }

    /// Summarize a remote GitHub repository.
    ///
    /// The clone lives in a scratch directory owned by the `SourceTree`
    /// value; it is removed when this function returns, whether through
    /// success, any error, or cancellation.
    pub async fn summarize_url(
        &self,
        url: &str,
        options: &SummarizeOptions,
    ) -> Result<RepoSummary> {
        let locator = RepoLocator::parse(url)?;
        let tree = SourceTree::clone_shallow(&locator).await?;
        let summary = self.summarize_root(url, tree.root(), options).await;
        drop(tree);
        summary
    }

    /// Summarize an already-materialized local tree (no cloning, no
    /// cleanup — the caller owns the directory).
    pub async fn summarize_local(
        &self,
        root: &Path,
        options: &SummarizeOptions,
    ) -> Result<RepoSummary> {
        let tree = SourceTree::local(root);
        self.summarize_root(&root.display().to_string(), tree.root(), options)
            .await
    }

    async fn summarize_root(
        &self,
        url: &str,
        root: &Path,
        options: &SummarizeOptions,
    ) -> Result<RepoSummary> {
        let context = self.pipeline.summarize(root, options).await?;

        info!(
            tokens_used = context.metadata.tokens_used,
            "Requesting summary from model"
        );
        let request = ModelRequest::text(
            SUMMARY_PROMPT,
            format!("Summarize this repository:\n\n{}", context.text),
            SUMMARY_TEMPERATURE,
        );
        let summary = self.model.complete(request).await?;

        Ok(RepoSummary {
            url: url.to_string(),
            summary,
            metadata: context.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterConfig;
    use async_trait::async_trait;
    use repolens_core::ModelError;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Stub that answers the ranking call (JSON mode) and the summary
    /// call (text mode) differently, like the real backend would.
    struct TwoPhaseModel {
        ranking: String,
        summary: std::result::Result<String, ModelError>,
    }

    #[async_trait]
    impl ModelClient for TwoPhaseModel {
        fn name(&self) -> &str {
            "two-phase"
        }

        async fn complete(
            &self,
            request: ModelRequest,
        ) -> std::result::Result<String, ModelError> {
            if request.json_response {
                Ok(self.ranking.clone())
            } else {
                self.summary.clone()
            }
        }
    }

    fn service(model: Arc<dyn ModelClient>) -> SummaryService {
        let pipeline = Pipeline::new(
            model.clone(),
            FilterConfig::default(),
            Duration::from_secs(5),
        );
        SummaryService::new(model, pipeline)
    }

    #[tokio::test]
    async fn local_tree_summarized_end_to_end() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("README.md"), "# Demo").unwrap();
        std::fs::write(temp.path().join("main.py"), "print('x')").unwrap();

        let model = Arc::new(TwoPhaseModel {
            ranking: r#"{"files": ["README.md", "main.py"]}"#.into(),
            summary: Ok("A demo project.".into()),
        });
        let svc = service(model);

        let result = svc
            .summarize_local(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();

        assert_eq!(result.summary, "A demo project.");
        assert_eq!(result.metadata.files_included, 2);
        assert!(!result.metadata.fallback_used);
        // The caller's directory is untouched.
        assert!(temp.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn summarization_failure_is_fatal() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("README.md"), "# Demo").unwrap();

        let model = Arc::new(TwoPhaseModel {
            ranking: r#"{"files": ["README.md"]}"#.into(),
            summary: Err(ModelError::RateLimited {
                retry_after_secs: 5,
            }),
        });
        let svc = service(model);

        let err = svc
            .summarize_local(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            repolens_core::Error::Model(ModelError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_url_rejected_before_any_clone() {
        let model = Arc::new(TwoPhaseModel {
            ranking: "{}".into(),
            summary: Ok("unused".into()),
        });
        let svc = service(model);

        let err = svc
            .summarize_url("https://example.com/not/github", &SummarizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            repolens_core::Error::Pipeline(repolens_core::PipelineError::InvalidLocator(_))
        ));
    }

    #[test]
    fn summary_serializes_for_the_wire() {
        let summary = RepoSummary {
            url: "https://github.com/o/r".into(),
            summary: "text".into(),
            metadata: AssemblyMetadata {
                files_considered: 4,
                files_ranked: 2,
                files_included: 2,
                tokens_used: 1200,
                token_budget: 100_000,
                truncated: false,
                tree_elided: false,
                fallback_used: false,
            },
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"files_included\":2"));
        assert!(json.contains("\"fallback_used\":false"));
    }
}
