//! Context assembly — tree listing plus ranked file contents, never
//! exceeding the token budget.
//!
//! Inclusion follows the **prefix policy**: files are taken in ascending
//! rank order and assembly stops entirely at the first file whose block
//! would overflow the budget, even if a smaller lower-ranked file would
//! still fit. The included set is therefore always a gap-free prefix of
//! the ranking, which keeps output reproducible and the perceived ranking
//! intact.

use crate::token::{count_tokens, truncate_to_tokens};
use repolens_core::RankedFile;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Separator between the tree listing and file blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Format a single file entry: path header plus fenced content.
pub fn format_file_block(path: &str, content: &str) -> String {
    format!("## File: {path}\n```\n{content}\n```")
}

/// The assembled context, ready for the summarization call.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Tree listing + file blocks, joined in rank order.
    pub text: String,
    /// Assembly statistics for the response metadata.
    pub metadata: AssemblyMetadata,
}

/// Statistics about a single assembly run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Candidates that survived filtering (and the priority filter).
    pub files_considered: usize,
    /// Files the validated ranking mentioned.
    pub files_ranked: usize,
    /// Files whose content made it into the context.
    pub files_included: usize,
    /// Upper-bound token count of the assembled text.
    pub tokens_used: usize,
    /// The budget assembly ran against.
    pub token_budget: usize,
    /// Whether anything was dropped or cut for budget reasons.
    pub truncated: bool,
    /// Whether even the bare tree listing had to be cut (degenerate case).
    pub tree_elided: bool,
    /// Whether the heuristic fallback ranking was used.
    pub fallback_used: bool,
}

/// Accumulates ranked file blocks under a fixed token budget.
pub struct ContextAssembler {
    token_budget: usize,
}

impl ContextAssembler {
    pub fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    /// Assemble the tree listing plus ranked files (ascending rank order).
    ///
    /// Per-part token counts are summed; since the ceil-count of a
    /// concatenation never exceeds the sum of its parts' ceil-counts, the
    /// reported `tokens_used` upper-bounds the real count and the budget
    /// invariant holds exactly.
    pub fn assemble(
        &self,
        tree: &str,
        files: &[RankedFile],
        files_considered: usize,
    ) -> AssembledContext {
        let tree_tokens = count_tokens(tree);

        // Degenerate case: the tree alone meets or exceeds the budget.
        // Emit a cut listing and no file contents.
        if tree_tokens >= self.token_budget {
            warn!(
                tree_tokens,
                token_budget = self.token_budget,
                "Tree listing alone exceeds the token budget; eliding"
            );
            let text = truncate_to_tokens(tree, self.token_budget);
            let tokens_used = count_tokens(&text);
            return AssembledContext {
                text,
                metadata: AssemblyMetadata {
                    files_considered,
                    files_ranked: files.len(),
                    files_included: 0,
                    tokens_used,
                    token_budget: self.token_budget,
                    truncated: true,
                    tree_elided: true,
                    fallback_used: false,
                },
            };
        }

        let sep_tokens = count_tokens(BLOCK_SEPARATOR);
        let mut used = tree_tokens;
        let mut parts = vec![tree.to_string()];
        let mut included = 0;

        let mut ordered: Vec<&RankedFile> = files.iter().collect();
        ordered.sort_by_key(|f| f.rank);

        for file in &ordered {
            let block = format_file_block(&file.candidate.path, &file.content);
            let cost = sep_tokens + count_tokens(&block);
            if used + cost > self.token_budget {
                // Prefix policy: the first overflow ends inclusion, even
                // if a later, smaller file would fit.
                debug!(
                    path = %file.candidate.path,
                    rank = file.rank,
                    cost,
                    remaining = self.token_budget - used,
                    "Budget exhausted; stopping at first overflowing rank"
                );
                break;
            }
            parts.push(block);
            used += cost;
            included += 1;
        }

        AssembledContext {
            text: parts.join(BLOCK_SEPARATOR),
            metadata: AssemblyMetadata {
                files_considered,
                files_ranked: files.len(),
                files_included: included,
                tokens_used: used,
                token_budget: self.token_budget,
                truncated: included < files.len(),
                tree_elided: false,
                fallback_used: false,
            },
        }
    }
}
