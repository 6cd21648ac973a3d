//! Token-budget batching for embedding requests
//!
//! Embedding endpoints cap the tokens a single call may carry. Texts are
//! packed greedily, in order, into batches that stay within the budget.
//! A text that alone exceeds the budget is replaced by a single-space
//! placeholder so the output stays aligned with the input.

/// Replacement for texts too long to embed
pub const OVERSIZE_PLACEHOLDER: &str = " ";

/// Approximate bytes per token for English text
const BYTES_PER_TOKEN: f32 = 4.0;

/// Estimate the token count of `text`
pub fn estimate_tokens(text: &str) -> usize {
    ((text.len() as f32) / BYTES_PER_TOKEN).ceil() as usize
}

/// Split `texts` into consecutive batches of at most `max_tokens` each
///
/// Concatenating the batches yields the input with every oversize text
/// replaced by [`OVERSIZE_PLACEHOLDER`]. Placeholders do not count toward
/// the budget.
pub fn plan_batches(texts: &[String], max_tokens: usize) -> Vec<Vec<String>> {
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_tokens = 0usize;

    for (i, text) in texts.iter().enumerate() {
        let tokens = estimate_tokens(text);
        if tokens > max_tokens {
            tracing::warn!(
                target: "litrank::embed",
                index = i,
                tokens,
                max_tokens,
                "Text exceeds token budget, embedding placeholder"
            );
            current.push(OVERSIZE_PLACEHOLDER.to_string());
            continue;
        }
        if current_tokens + tokens > max_tokens && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(text.clone());
        current_tokens += tokens;
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
