//! Customized summaries of retrieved works

use crate::generate::{run_task, CompletionProvider, CustomizedSummary};
use litrank_core::{Result, SummarizedWork, Work};
use serde_json::Value;
use std::sync::Arc;

/// Summarizes works with respect to an area of research
pub struct Summarizer {
    completer: Arc<dyn CompletionProvider>,
}

impl Summarizer {
    /// Create a summarizer
    pub fn new(completer: Arc<dyn CompletionProvider>) -> Self {
        Summarizer { completer }
    }

    /// Summarize every work that has an abstract, in input order
    ///
    /// Works without an abstract are left out of the result.
    ///
    /// # Errors
    /// Returns `Error::Completion` on the first failed completion.
    pub fn summarize(&self, area_of_research: &str, works: &[Work]) -> Result<Vec<SummarizedWork>> {
        let mut summarized = Vec::with_capacity(works.len());
        for work in works {
            let Some(abstract_text) = work.abstract_text().filter(|a| !a.trim().is_empty()) else {
                tracing::debug!(target: "litrank::summarize", work = %work.id(), "No abstract, skipping");
                continue;
            };
            let task = CustomizedSummary::new(area_of_research, abstract_text);
            let response = run_task(self.completer.as_ref(), &task)?;
            summarized.push(SummarizedWork::new(work.clone(), extract_final_answer(&response)));
        }
        tracing::debug!(
            target: "litrank::summarize",
            requested = works.len(),
            summarized = summarized.len(),
            "Summaries complete"
        );
        Ok(summarized)
    }
}

/// Pull the final answer out of a model response
///
/// Some prompts make the model answer with a fenced JSON object of the form
/// `{"Reasoning Structure": {..., "FINAL_ANSWER": "..."}}`. When that shape
/// is present its `FINAL_ANSWER` is returned, otherwise the trimmed response.
pub fn extract_final_answer(response: &str) -> String {
    let trimmed = response.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.strip_suffix("```").unwrap_or(s))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/Reasoning Structure/FINAL_ANSWER")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| trimmed.to_string())
}
