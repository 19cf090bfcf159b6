//! Token counting — the fixed tokenizer contract.
//!
//! Uses a byte-length heuristic: ~4 bytes per token, rounded up. This
//! approximation is accurate within ~10% for BPE tokenizers on typical
//! source text, and every call site in the pipeline (budget check, tree
//! count, truncation) shares it, so budget arithmetic is self-consistent.

/// Count tokens for a string. 1 token ≈ 4 bytes, rounded up.
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() + 3) / 4
}

/// Marker appended when text is cut to fit a budget.
pub const ELISION_MARKER: &str = "\n\n... [truncated] ...";

/// Truncate `text` so that `count_tokens` of the result never exceeds
/// `max_tokens`, cutting at a line boundary where possible and appending
/// the elision marker.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    if count_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let max_bytes = max_tokens * 4;
    if max_bytes <= ELISION_MARKER.len() {
        // Not even room for the marker; return the largest clean prefix.
        let mut end = max_bytes.min(text.len());
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        return text[..end].to_string();
    }

    // Reserve room for the marker, then cut at a char boundary.
    let mut end = max_bytes - ELISION_MARKER.len();
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut head = &text[..end];

    // Prefer a line boundary so we never emit a half line.
    if let Some(newline) = head.rfind('\n')
        && newline > 0
    {
        head = &head[..newline];
    }

    format!("{head}{ELISION_MARKER}")
}
