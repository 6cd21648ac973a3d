//! Text tokenizer for lexical search
//!
//! Pipeline: UAX#29 word boundaries → strip possessives → remove non-alphanumeric
//!           → lowercase → filter short tokens → remove stopwords

use unicode_segmentation::UnicodeSegmentation;

/// Standard English stopwords (Lucene's default set).
///
/// These high-frequency words carry little discriminative value for BM25
/// and are filtered out during tokenization.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Minimum token length in bytes
const MIN_TOKEN_LEN: usize = 2;

#[inline]
fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Strip English possessive suffix (`'s` / `\u{2019}s`).
#[inline]
fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

/// Tokenize text into searchable terms.
///
/// 1. UAX#29 word boundaries (`unicode_words`)
/// 2. Strip English possessives (`'s`)
/// 3. Remove non-alphanumeric characters (e.g. internal apostrophes)
/// 4. Lowercase
/// 5. Filter tokens shorter than 2 characters
/// 6. Remove stopwords
///
/// # Example
///
/// ```
/// use litrank_engine::search::tokenize;
///
/// let tokens = tokenize("The Resilience of Coral Reefs");
/// assert_eq!(tokens, vec!["resilience", "coral", "reefs"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(strip_possessive)
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .map(|w| w.to_lowercase())
        .filter(|s| s.len() >= MIN_TOKEN_LEN)
        .filter(|s| !is_stopword(s))
        .collect()
}

/// Tokenize and deduplicate for query processing, keeping first-seen order.
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
