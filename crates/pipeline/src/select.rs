//! Selector protocol — external file ranking with validation and fallback.
//!
//! The external model receives the serialized directory tree (paths only)
//! and returns `{"files": [...]}`, most-important first, at most
//! `max_files` entries. The raw payload is validated and repaired by a
//! pure function; when it is unusable, or the call itself fails, a
//! deterministic heuristic ranking (tier, then path) takes over.

use repolens_core::{FileCandidate, ModelClient, ModelError, ModelRequest, PriorityTier};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// System prompt for the file-ranking call.
pub(crate) const FILE_RANKING_PROMPT: &str = "\
You are a repository analyst. You will receive the full directory tree of a \
codebase. Your job is to select the **up to 20 most important files** that \
would give someone the best understanding of the project.

Prioritize (in rough order):
- README / docs at the root
- Entry points (main.py, index.ts, app.py, etc.)
- Core business-logic / domain modules
- Configuration files that reveal the stack (package.json, pyproject.toml, \
Cargo.toml, Dockerfile, etc.)
- API route definitions
- Key data models / schemas

Avoid:
- Test files (unless the project IS a test framework)
- Generated / config-only files (tsconfig, eslint, .prettierrc, etc.)
- Lock files, CI configs, changelogs

Return **only** a JSON object with a single key \"files\" whose value is an \
array of relative file paths, ordered from MOST important to LEAST important. \
No explanation, no markdown fences — just the raw JSON object.

Example:
{\"files\": [\"README.md\", \"src/main.py\", \"src/core/engine.py\"]}";

/// The expected response payload shape.
#[derive(Debug, Deserialize)]
struct RankingPayload {
    files: Vec<String>,
}

/// Outcome of validating a raw ranking response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingOutcome {
    /// At least one valid path, in the order the model gave.
    Ranked(Vec<String>),
    /// Unparseable payload, or no valid paths at all.
    Malformed,
}

/// How the final ranking was produced, for response metadata.
#[derive(Debug, Clone)]
pub enum SelectorStatus {
    /// The external ranking was used (possibly after repair).
    Ranked,
    /// Payload was unusable; heuristic fallback ordering applied.
    FallbackMalformed,
    /// The call itself failed; heuristic fallback ordering applied.
    FallbackUnavailable(ModelError),
}

impl SelectorStatus {
    pub fn fallback_used(&self) -> bool {
        !matches!(self, Self::Ranked)
    }
}

/// Validate and repair a raw ranking payload against the candidate set.
///
/// Pure function: no transport, unit-testable in isolation. Invalid paths
/// (not in the candidate set) and duplicates are silently dropped; the
/// remainder keeps its given relative order, capped at `max_files`. A
/// payload that fails to parse, or that references zero valid paths, is
/// `Malformed` in its entirety.
pub fn validate_ranking(
    raw: &str,
    candidates: &HashSet<&str>,
    max_files: usize,
) -> RankingOutcome {
    let payload: RankingPayload = match serde_json::from_str(raw.trim()) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "Ranking payload failed to parse");
            return RankingOutcome::Malformed;
        }
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut valid = Vec::new();
    for path in &payload.files {
        if !candidates.contains(path.as_str()) {
            debug!(path = %path, "Dropping ranked path not in candidate set");
            continue;
        }
        if !seen.insert(path.as_str()) {
            continue;
        }
        valid.push(path.clone());
        if valid.len() >= max_files {
            break;
        }
    }

    if valid.is_empty() {
        RankingOutcome::Malformed
    } else {
        RankingOutcome::Ranked(valid)
    }
}

/// Deterministic heuristic ranking: sort by tier (High, Medium, Low) then
/// by path lexical order, truncated to `max_files`.
pub fn heuristic_ranking(
    candidates: &[(FileCandidate, PriorityTier)],
    max_files: usize,
) -> Vec<String> {
    let mut ordered: Vec<(&PriorityTier, &str)> = candidates
        .iter()
        .map(|(c, t)| (t, c.path.as_str()))
        .collect();
    ordered.sort();
    ordered
        .into_iter()
        .take(max_files)
        .map(|(_, path)| path.to_string())
        .collect()
}

/// Drives the external ranking call and owns its failure policy.
pub struct SelectorProtocol {
    model: Arc<dyn ModelClient>,
    timeout: Duration,
    max_files: usize,
}

impl SelectorProtocol {
    pub fn new(model: Arc<dyn ModelClient>, timeout: Duration, max_files: usize) -> Self {
        Self {
            model,
            timeout,
            max_files,
        }
    }

    /// Produce the authoritative ranking for the candidate set.
    ///
    /// Always yields a ranking: selector anomalies degrade to the
    /// heuristic ordering and are reported via the returned status.
    pub async fn rank(
        &self,
        tree: &str,
        candidates: &[(FileCandidate, PriorityTier)],
    ) -> (Vec<String>, SelectorStatus) {
        let request = ModelRequest::json(FILE_RANKING_PROMPT, tree);

        let raw = match tokio::time::timeout(self.timeout, self.model.complete(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(model = %self.model.name(), error = %e, "Selector call failed, using heuristic ranking");
                return (
                    heuristic_ranking(candidates, self.max_files),
                    SelectorStatus::FallbackUnavailable(e),
                );
            }
            Err(_) => {
                warn!(
                    model = %self.model.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Selector call timed out, using heuristic ranking"
                );
                let err = ModelError::Timeout(format!(
                    "Selector timed out after {}s",
                    self.timeout.as_secs()
                ));
                return (
                    heuristic_ranking(candidates, self.max_files),
                    SelectorStatus::FallbackUnavailable(err),
                );
            }
        };

        let candidate_paths: HashSet<&str> =
            candidates.iter().map(|(c, _)| c.path.as_str()).collect();

        match validate_ranking(&raw, &candidate_paths, self.max_files) {
            RankingOutcome::Ranked(paths) => {
                debug!(ranked = paths.len(), "Selector ranking accepted");
                (paths, SelectorStatus::Ranked)
            }
            RankingOutcome::Malformed => {
                warn!("Selector payload malformed, using heuristic ranking");
                (
                    heuristic_ranking(candidates, self.max_files),
                    SelectorStatus::FallbackMalformed,
                )
            }
        }
    }
}
