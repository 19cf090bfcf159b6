//! Tree filtering — walks a source tree and produces candidate files.
//!
//! Decisions are purely structural (path / suffix / size); file content is
//! never inspected. Exclusion rules apply in order: noise directory,
//! skip suffix, size limit. Symlinks and unreadable entries are skipped,
//! not fatal.

use ignore::WalkBuilder;
use repolens_core::FileCandidate;
use std::path::Path;
use tracing::{debug, warn};

/// Directories excluded from traversal entirely.
const SKIP_DIRS: &[&str] = &[
    // Version control / editor metadata
    ".git",
    ".idea",
    ".vscode",
    // Dependencies / vendored code
    "node_modules",
    "vendor",
    // Python environments / caches
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    // Build output
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
];

/// File name suffixes excluded from candidacy. Matched as suffixes (not
/// bare extensions) so compound forms like `.min.js` work.
const SKIP_SUFFIXES: &[&str] = &[
    // Images
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp",
    // Audio / video
    ".mp4", ".mp3", ".wav", ".mov",
    // Fonts
    ".woff", ".woff2", ".ttf", ".eot",
    // Archives / documents
    ".pdf", ".zip", ".tar", ".gz", ".bz2",
    // Locks / minified / compiled
    ".lock", ".min.js", ".min.css", ".pyc", ".pyo", ".so", ".dll", ".dylib",
    // OS / VCS noise
    ".DS_Store", ".gitignore",
];

/// Structural exclusion rules, passed in explicitly — no global state.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub skip_dirs: Vec<String>,
    pub skip_suffixes: Vec<String>,
    pub max_file_size_bytes: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            skip_suffixes: SKIP_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            max_file_size_bytes: 100_000,
        }
    }
}

impl FilterConfig {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }
}

/// Walks a materialized source tree and yields candidate files.
pub struct TreeFilter {
    config: FilterConfig,
}

impl TreeFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Collect all candidate files under `root`, sorted by repo-relative
    /// path for determinism.
    ///
    /// Traversal is depth-first with directories visited in lexical order;
    /// gitignore semantics are deliberately disabled so the fixed noise
    /// sets are the single source of exclusion truth.
    pub fn collect(&self, root: &Path) -> Vec<FileCandidate> {
        let mut candidates = Vec::new();

        let skip_dirs = self.config.skip_dirs.clone();
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !skip_dirs.iter().any(|d| d == name.as_ref())
        });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let name = entry.file_name().to_string_lossy();
            if self.matches_skip_suffix(&name) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping file without metadata");
                    continue;
                }
            };
            if size > self.config.max_file_size_bytes {
                debug!(
                    path = %path.display(),
                    size,
                    limit = self.config.max_file_size_bytes,
                    "Skipping oversized file"
                );
                continue;
            }

            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let rel_posix = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            candidates.push(FileCandidate::new(rel_posix, size));
        }

        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = candidates.len(), "Tree filter collected candidates");
        candidates
    }

    fn matches_skip_suffix(&self, file_name: &str) -> bool {
        self.config
            .skip_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}
