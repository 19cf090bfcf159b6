//! Candidate files and their priority classification.
//!
//! A `FileCandidate` is a file that survived structural filtering and is
//! eligible for ranking. Candidates are immutable once created and live
//! only for the duration of a single `summarize` call.

use serde::{Deserialize, Serialize};

/// A file surviving noise/size exclusion, eligible for ranking.
///
/// `path` is repo-relative with POSIX separators and is the unique key
/// for the candidate throughout the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// Repo-relative path, POSIX-style.
    pub path: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Lowercased extension without the dot; empty if none.
    pub extension: String,
    /// Number of directory components above the file (0 = repo root).
    pub depth: usize,
}

impl FileCandidate {
    /// Create a candidate from a repo-relative POSIX path and size.
    /// Extension and depth are derived from the path.
    pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
        let path = path.into();
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(stem, ext)| if stem.is_empty() { "" } else { ext })
            .unwrap_or("")
            .to_ascii_lowercase();
        let depth = path.matches('/').count();
        Self {
            path,
            size_bytes,
            extension,
            depth,
        }
    }

    /// The final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Coarse importance bucket assigned by the heuristic classifier.
///
/// Ordering is `High < Medium < Low`, so sorting candidates ascending by
/// tier (then path) yields the deterministic fallback ranking directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

/// Request-time coarse filter over candidate tiers.
///
/// This is advisory narrowing applied *before* ranking; the authoritative
/// order always comes from the selector (or its fallback).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "high+medium")]
    HighAndMedium,
}

impl PriorityFilter {
    /// Whether a candidate of the given tier passes this filter.
    pub fn admits(&self, tier: PriorityTier) -> bool {
        match self {
            Self::All => true,
            Self::High => tier == PriorityTier::High,
            Self::HighAndMedium => tier != PriorityTier::Low,
        }
    }

    /// Parse the wire form used by the HTTP API and CLI.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "high" => Some(Self::High),
            "high+medium" => Some(Self::HighAndMedium),
            _ => None,
        }
    }
}

/// A candidate with its authoritative rank and, once read, its content.
///
/// Rank 0 is the most important file. Ranks form a total order with no
/// ties; any candidate the selector did not mention has no rank and is
/// excluded from assembly.
#[derive(Debug, Clone)]
pub struct RankedFile {
    pub candidate: FileCandidate,
    /// Position in the validated ranking (0 = most important).
    pub rank: usize,
    /// File content, lossily decoded as UTF-8.
    pub content: String,
    /// Token count of `content` under the fixed tokenizer contract.
    pub token_count: usize,
}
