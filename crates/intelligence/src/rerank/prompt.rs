//! Prompt template for setwise comparisons via chat completions

use super::RerankCandidate;

/// Passage labels, one per candidate in a comparison set
pub const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// System prompt for picking the most relevant passage.
pub const SYSTEM_PROMPT: &str = "\
You are RankGPT, an intelligent assistant specialized in selecting the most relevant \
passage from a pool of passages based on their relevance to the query.";

/// Label of the passage at `index` (0-based)
pub fn label(index: usize) -> Option<char> {
    LABELS.get(index).map(|b| *b as char)
}

/// Keep at most `max_words` words of `text`
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the messages array for a setwise comparison request.
///
/// The user message lists the candidates as `Passage A`, `Passage B`, ...
/// and asks for the label of the most relevant one.
pub fn build_compare_messages(
    query: &str,
    candidates: &[RerankCandidate],
    max_words: usize,
) -> serde_json::Value {
    let mut user_content = format!(
        "Given a query \"{}\", which of the following passages is the most relevant one to the query?\n",
        query
    );
    for (i, candidate) in candidates.iter().enumerate() {
        if let Some(l) = label(i) {
            user_content.push_str(&format!(
                "\nPassage {}: \"{}\"",
                l,
                truncate_words(&candidate.text, max_words)
            ));
        }
    }
    user_content.push_str("\n\nOutput only the passage label of the most relevant passage:");

    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": user_content}
    ])
}

/// Parse the chosen passage index from the model's answer.
///
/// Accepts "Passage C", a bare "C" and surrounding noise. Returns `None`
/// when no label within `count` is found.
pub fn parse_choice(text: &str, count: usize) -> Option<usize> {
    let valid = |c: char| {
        LABELS
            .iter()
            .position(|b| *b as char == c)
            .filter(|i| *i < count)
    };

    if let Some(pos) = text.find("Passage ") {
        if let Some(c) = text[pos + "Passage ".len()..].chars().next() {
            if let Some(i) = valid(c) {
                return Some(i);
            }
        }
    }

    let trimmed = text.trim().trim_matches(|c: char| !c.is_ascii_alphanumeric());
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => valid(c.to_ascii_uppercase()),
        _ => None,
    }
}
