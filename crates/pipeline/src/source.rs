//! Source acquisition — repository locators and scoped source trees.
//!
//! A `SourceTree` owns the scratch directory its files live in: the
//! `TempDir` guard travels with the value, so the clone is deleted when
//! the tree goes out of scope on every exit path — success, any error,
//! or cancellation.

use repolens_core::PipelineError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A parsed GitHub repository locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    pub owner: String,
    pub repo: String,
}

impl RepoLocator {
    /// Extract owner and repo name from a GitHub URL.
    ///
    /// Accepts `http(s)://github.com/<owner>/<repo>[.git][/...]` and the
    /// `www.` host variant; anything else is `InvalidLocator`.
    pub fn parse(url: &str) -> Result<Self, PipelineError> {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| {
                PipelineError::InvalidLocator(format!("Not an http(s) URL: {url}"))
            })?;

        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = host.split(':').next().unwrap_or(host);
        if !matches!(host, "github.com" | "www.github.com") {
            return Err(PipelineError::InvalidLocator(format!(
                "Not a GitHub URL: {url}"
            )));
        }

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next().unwrap_or("");
        let repo = segments.next().unwrap_or("");
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if owner.is_empty() || repo.is_empty() {
            return Err(PipelineError::InvalidLocator(format!(
                "URL must include owner and repo: {url}"
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// The https clone URL for this repository.
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A materialized source tree with scoped cleanup.
pub struct SourceTree {
    root: PathBuf,
    _scratch: Option<TempDir>,
}

impl SourceTree {
    /// Wrap an already-materialized local tree. The caller keeps ownership
    /// of the directory; nothing is deleted on drop.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            root: path.into(),
            _scratch: None,
        }
    }

    /// Shallow-clone a repository into a scratch directory.
    ///
    /// The scratch directory is deleted when the returned value drops.
    pub async fn clone_shallow(locator: &RepoLocator) -> Result<Self, PipelineError> {
        let scratch = tempfile::Builder::new()
            .prefix("repolens-")
            .tempdir()
            .map_err(|e| {
                PipelineError::SourceUnavailable(format!("Failed to create scratch dir: {e}"))
            })?;

        let clone_url = locator.clone_url();
        info!(repo = %locator, "Cloning repository (depth 1)");

        let output = tokio::process::Command::new("git")
            .args(["clone", "--depth", "1", &clone_url])
            .arg(scratch.path())
            .output()
            .await
            .map_err(|e| {
                PipelineError::SourceUnavailable(format!("Failed to run git: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::SourceUnavailable(format!(
                "git clone failed for {locator}: {}",
                stderr.trim()
            )));
        }

        debug!(root = %scratch.path().display(), "Clone complete");
        Ok(Self {
            root: scratch.path().to_path_buf(),
            _scratch: Some(scratch),
        })
    }

    /// Root of the materialized tree.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
