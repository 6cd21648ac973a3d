//! Lexical retrieval
//!
//! This module contains:
//! - `index`: inverted index with BM25 scoring
//! - `scorer`: BM25 parameters and IDF
//! - `tokenizer`: UAX#29 text tokenization

mod index;
pub mod scorer;
pub mod tokenizer;

pub use index::{LexicalIndex, PostingEntry, PostingList};
pub use scorer::{idf, Bm25Params};
pub use tokenizer::{tokenize, tokenize_unique};
