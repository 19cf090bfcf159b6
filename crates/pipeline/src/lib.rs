//! # RepoLens Pipeline
//!
//! Turns a materialized source tree into a bounded, priority-ordered
//! textual context: structural filtering → heuristic tiering → external
//! ranking (with deterministic fallback) → token-budgeted assembly.
//!
//! The pipeline is call-scoped: every intermediate value lives only for
//! the duration of one `summarize` call, so concurrent invocations share
//! no mutable state.

pub mod assemble;
pub mod classify;
pub mod filter;
pub mod select;
pub mod service;
pub mod source;
pub mod token;
pub mod tree;

pub use assemble::{AssembledContext, AssemblyMetadata, ContextAssembler};
pub use filter::{FilterConfig, TreeFilter};
pub use select::{SelectorProtocol, SelectorStatus};
pub use service::{RepoSummary, SummaryService};
pub use source::{RepoLocator, SourceTree};

use repolens_core::{
    FileCandidate, ModelClient, PipelineError, PriorityFilter, PriorityTier, RankedFile, Result,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-call knobs for `Pipeline::summarize`.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Restrict the candidate set by tier before ranking.
    pub priority: PriorityFilter,
    /// Maximum files the selector may rank.
    pub max_files: usize,
    /// Total token budget for tree listing + file contents.
    pub token_budget: usize,
    /// Surface selector unavailability as an error instead of falling
    /// back to the heuristic ranking.
    pub require_selector: bool,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            priority: PriorityFilter::All,
            max_files: 20,
            token_budget: 100_000,
            require_selector: false,
        }
    }
}

/// The pipeline orchestrator.
///
/// Holds the external model handle and the structural filter rules;
/// everything else is created per call.
pub struct Pipeline {
    model: Arc<dyn ModelClient>,
    filter_config: FilterConfig,
    selector_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        model: Arc<dyn ModelClient>,
        filter_config: FilterConfig,
        selector_timeout: Duration,
    ) -> Self {
        Self {
            model,
            filter_config,
            selector_timeout,
        }
    }

    /// Build a pipeline from application configuration.
    pub fn from_config(model: Arc<dyn ModelClient>, config: &repolens_config::AppConfig) -> Self {
        Self::new(
            model,
            FilterConfig::default().with_max_file_size(config.pipeline.max_file_size_bytes),
            Duration::from_secs(config.selector.timeout_secs),
        )
    }

    /// Assemble the summarization context for the tree rooted at `root`.
    ///
    /// Fatal errors: the root is missing/unreadable (`SourceUnavailable`)
    /// or no file survives filtering (`EmptyCandidateSet`). Selector
    /// anomalies are absorbed into the fallback ranking and reported via
    /// `metadata.fallback_used`, unless `require_selector` is set.
    pub async fn summarize(
        &self,
        root: &Path,
        options: &SummarizeOptions,
    ) -> Result<AssembledContext> {
        if !root.is_dir() {
            return Err(PipelineError::SourceUnavailable(format!(
                "{} is not a readable directory",
                root.display()
            ))
            .into());
        }

        // Stage 1: structural filtering.
        let candidates = TreeFilter::new(self.filter_config.clone()).collect(root);
        if candidates.is_empty() {
            return Err(PipelineError::EmptyCandidateSet.into());
        }

        // Stage 2: heuristic tiering + optional request-time narrowing.
        let tiered: Vec<(FileCandidate, PriorityTier)> = candidates
            .into_iter()
            .map(|c| {
                let tier = classify::classify(&c);
                (c, tier)
            })
            .filter(|(_, tier)| options.priority.admits(*tier))
            .collect();
        if tiered.is_empty() {
            return Err(PipelineError::EmptyCandidateSet.into());
        }

        // Stage 3: tree serialization + authoritative ranking.
        let tree_candidates: Vec<FileCandidate> =
            tiered.iter().map(|(c, _)| c.clone()).collect();
        let tree_listing = tree::render_tree(&tree_candidates);

        let protocol = SelectorProtocol::new(
            self.model.clone(),
            self.selector_timeout,
            options.max_files,
        );
        let (ranking, status) = protocol.rank(&tree_listing, &tiered).await;

        if options.require_selector
            && let SelectorStatus::FallbackUnavailable(e) = &status
        {
            return Err(PipelineError::SelectorRequired(e.clone()).into());
        }

        // Stage 4: read ranked files and assemble under the budget.
        let by_path: HashMap<&str, &FileCandidate> = tiered
            .iter()
            .map(|(c, _)| (c.path.as_str(), c))
            .collect();

        let mut ranked_files: Vec<RankedFile> = Vec::with_capacity(ranking.len());
        for (rank, path) in ranking.iter().enumerate() {
            let Some(candidate) = by_path.get(path.as_str()) else {
                continue;
            };
            match read_candidate(root, candidate, rank) {
                Some(file) => ranked_files.push(file),
                None => warn!(path = %path, "Skipping unreadable ranked file"),
            }
        }

        let assembler = ContextAssembler::new(options.token_budget);
        let mut context = assembler.assemble(&tree_listing, &ranked_files, tiered.len());
        context.metadata.fallback_used = status.fallback_used();

        info!(
            files_considered = context.metadata.files_considered,
            files_included = context.metadata.files_included,
            tokens_used = context.metadata.tokens_used,
            fallback_used = context.metadata.fallback_used,
            "Context assembled"
        );
        Ok(context)
    }
}

/// Read one ranked candidate's content, lossily decoded as UTF-8.
fn read_candidate(root: &Path, candidate: &FileCandidate, rank: usize) -> Option<RankedFile> {
    let mut path = root.to_path_buf();
    for segment in candidate.path.split('/') {
        path.push(segment);
    }
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Read failed");
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes).into_owned();
    let token_count = token::count_tokens(&content);
    Some(RankedFile {
        candidate: candidate.clone(),
        rank,
        content,
        token_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repolens_core::{Error, ModelError, ModelRequest};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Stub model: canned ranking response, records the ranking prompt.
    struct StubModel {
        response: std::result::Result<String, ModelError>,
        seen_user_prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn ranking(paths: &[&str]) -> Arc<Self> {
            let raw = serde_json::to_string(&serde_json::json!({ "files": paths })).unwrap();
            Arc::new(Self {
                response: Ok(raw),
                seen_user_prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: ModelError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(error),
                seen_user_prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for StubModel {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: ModelRequest,
        ) -> std::result::Result<String, ModelError> {
            self.seen_user_prompts.lock().unwrap().push(request.user);
            self.response.clone()
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn sample_repo() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "README.md", "# Sample project");
        write(root, "src/main.py", "print('entry')");
        write(root, "src/util.py", "def helper(): pass");
        write(root, "tests/test_x.py", "def test_x(): pass");
        temp
    }

    fn pipeline(model: Arc<dyn ModelClient>) -> Pipeline {
        Pipeline::new(model, FilterConfig::default(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn summarize_includes_ranked_files_in_order() {
        let temp = sample_repo();
        let model = StubModel::ranking(&["src/main.py", "README.md"]);
        let p = pipeline(model);

        let out = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();

        assert!(out.text.starts_with("# Directory Structure"));
        let main_pos = out.text.find("## File: src/main.py").unwrap();
        let readme_pos = out.text.find("## File: README.md").unwrap();
        assert!(main_pos < readme_pos);
        assert_eq!(out.metadata.files_included, 2);
        assert!(!out.metadata.fallback_used);
    }

    #[tokio::test]
    async fn selection_is_authoritative_not_just_ordering() {
        let temp = sample_repo();
        // util.py is never mentioned by the selector, so it is excluded
        // even though the budget has plenty of room.
        let model = StubModel::ranking(&["README.md"]);
        let p = pipeline(model);

        let out = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();

        assert!(out.text.contains("## File: README.md"));
        assert!(!out.text.contains("## File: src/util.py"));
        assert_eq!(out.metadata.files_included, 1);
        // The tree listing still shows every surviving candidate.
        assert!(out.text.contains("util.py"));
    }

    #[tokio::test]
    async fn missing_root_is_source_unavailable() {
        let model = StubModel::ranking(&[]);
        let p = pipeline(model);

        let err = p
            .summarize(Path::new("/nonexistent/repo"), &SummarizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn empty_tree_is_empty_candidate_set() {
        let temp = tempdir().unwrap();
        let model = StubModel::ranking(&[]);
        let p = pipeline(model);

        let err = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::EmptyCandidateSet)
        ));
    }

    #[tokio::test]
    async fn priority_filter_narrows_before_ranking() {
        let temp = sample_repo();
        let model = StubModel::ranking(&["README.md", "src/main.py"]);
        let p = pipeline(model.clone());

        let options = SummarizeOptions {
            priority: PriorityFilter::High,
            ..Default::default()
        };
        let out = p.summarize(temp.path(), &options).await.unwrap();

        // util.py (Medium) and tests (Low) never reach the selector.
        let prompts = model.seen_user_prompts.lock().unwrap();
        assert!(!prompts[0].contains("util.py"));
        assert!(!prompts[0].contains("test_x.py"));
        drop(prompts);
        assert_eq!(out.metadata.files_considered, 2);
    }

    #[tokio::test]
    async fn over_narrowed_filter_is_empty_candidate_set() {
        let temp = tempdir().unwrap();
        write(temp.path(), "notes.txt", "just notes"); // Low tier
        let model = StubModel::ranking(&["notes.txt"]);
        let p = pipeline(model);

        let options = SummarizeOptions {
            priority: PriorityFilter::High,
            ..Default::default()
        };
        let err = p.summarize(temp.path(), &options).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::EmptyCandidateSet)
        ));
    }

    #[tokio::test]
    async fn selector_failure_falls_back_and_marks_metadata() {
        let temp = sample_repo();
        let model = StubModel::failing(ModelError::Network("down".into()));
        let p = pipeline(model);

        let out = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();

        assert!(out.metadata.fallback_used);
        // Fallback order: High (README, main) then Medium (util) then Low.
        let readme = out.text.find("## File: README.md").unwrap();
        let main = out.text.find("## File: src/main.py").unwrap();
        let util = out.text.find("## File: src/util.py").unwrap();
        let test = out.text.find("## File: tests/test_x.py").unwrap();
        assert!(readme < main && main < util && util < test);
    }

    #[tokio::test]
    async fn require_selector_surfaces_unavailability() {
        let temp = sample_repo();
        let model = StubModel::failing(ModelError::AuthenticationFailed("bad key".into()));
        let p = pipeline(model);

        let options = SummarizeOptions {
            require_selector: true,
            ..Default::default()
        };
        let err = p.summarize(temp.path(), &options).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::SelectorRequired(_))
        ));
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_context() {
        let temp = sample_repo();
        let model = StubModel::ranking(&["README.md", "src/main.py", "src/util.py"]);
        let p = pipeline(model);

        let out1 = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();
        let out2 = p
            .summarize(temp.path(), &SummarizeOptions::default())
            .await
            .unwrap();

        assert_eq!(out1.text, out2.text);
        assert_eq!(out1.metadata.tokens_used, out2.metadata.tokens_used);
    }

    #[tokio::test]
    async fn budget_is_never_exceeded() {
        let temp = tempdir().unwrap();
        for i in 0..8 {
            write(
                temp.path(),
                &format!("src/module_{i}.py"),
                &"x = 1\n".repeat(200),
            );
        }
        let names: Vec<String> = (0..8).map(|i| format!("src/module_{i}.py")).collect();
        let model =
            StubModel::ranking(&names.iter().map(String::as_str).collect::<Vec<_>>());
        let p = pipeline(model);

        for budget in [50, 200, 1000, 5000] {
            let options = SummarizeOptions {
                token_budget: budget,
                ..Default::default()
            };
            let out = p.summarize(temp.path(), &options).await.unwrap();
            assert!(
                token::count_tokens(&out.text) <= budget,
                "budget {budget} exceeded"
            );
        }
    }
}
