//! Directory tree serialization.
//!
//! Renders the candidate set as an indented text listing. The listing is
//! both the selector's input and the first block of the assembled context,
//! so it must be deterministic for a given candidate set.

use repolens_core::FileCandidate;
use std::collections::HashSet;

/// Render the directory tree of `candidates` (assumed sorted by path).
///
/// Format:
/// ```text
/// # Directory Structure
/// ```
/// followed by a fenced block where each directory appears once, indented
/// two spaces per level, with files listed under their directories.
pub fn render_tree(candidates: &[FileCandidate]) -> String {
    let mut lines = vec!["# Directory Structure".to_string(), "```".to_string()];
    let mut seen_dirs: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let parts: Vec<&str> = candidate.path.split('/').collect();

        // Emit any ancestor directories not seen yet, shallowest first.
        for i in 1..parts.len() {
            let dir_path = parts[..i].join("/");
            if seen_dirs.insert(dir_path) {
                let indent = "  ".repeat(i - 1);
                lines.push(format!("{indent}{}/", parts[i - 1]));
            }
        }

        let indent = "  ".repeat(parts.len() - 1);
        lines.push(format!("{indent}{}", parts[parts.len() - 1]));
    }

    lines.push("```".to_string());
    lines.join("\n")
}
