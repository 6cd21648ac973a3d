//! API-based comparison oracle using an OpenAI-compatible chat completions endpoint
//!
//! Sends the query and labelled passages, asks the model for the label of
//! the most relevant one, and answers with that candidate first followed by
//! the rest in input order.

use super::prompt::{build_compare_messages, parse_choice, LABELS};
use super::{ComparisonOracle, RerankCandidate};
use crate::llm_client::{call_chat_completions, retry_once, LlmClientError};
use crate::usage::UsageTracker;
use litrank_core::{Error, Result, WorkId};
use litrank_engine::ModelConfig;
use std::sync::Arc;
use std::time::Duration;

/// Default comparison temperature, deterministic for consistent choices.
const DEFAULT_TEMPERATURE: f32 = 0.0;
/// Passages are cut to this many words.
const DEFAULT_MAX_PASSAGE_WORDS: usize = 300;

/// Oracle that calls an OpenAI-compatible chat completions endpoint.
pub struct ApiComparisonOracle {
    /// Full URL to the chat completions endpoint
    url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    temperature: f32,
    max_passage_words: usize,
    usage: Option<Arc<UsageTracker>>,
}

impl ApiComparisonOracle {
    /// Create a new ApiComparisonOracle.
    ///
    /// `endpoint` should be the base URL (e.g. "http://localhost:11434/v1").
    /// The `/chat/completions` path is appended automatically.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            url: format!("{}/chat/completions", base),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            temperature: DEFAULT_TEMPERATURE,
            max_passage_words: DEFAULT_MAX_PASSAGE_WORDS,
            usage: None,
        }
    }

    /// Create from the `[model]` section, comparing with the budget model
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.budget_model,
            config.api_key.as_deref(),
            config.timeout_ms,
        )
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the passage length limit.
    pub fn with_max_passage_words(mut self, words: usize) -> Self {
        self.max_passage_words = words.max(1);
        self
    }

    /// Record usage on a shared tracker.
    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = Some(usage);
        self
    }

    fn call_api(
        &self,
        query: &str,
        candidates: &[RerankCandidate],
    ) -> std::result::Result<String, LlmClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": build_compare_messages(query, candidates, self.max_passage_words),
            "temperature": self.temperature,
            "max_tokens": 8,
        });
        let reply = call_chat_completions(&self.url, self.api_key.as_deref(), self.timeout, &body)?;
        if let Some(usage) = &self.usage {
            usage.record(&self.model, reply.total_tokens);
        }
        Ok(reply.content)
    }
}

/// Put the chosen candidate first, the rest in input order
fn preference_order(candidates: &[RerankCandidate], best: usize) -> Vec<WorkId> {
    let mut order = Vec::with_capacity(candidates.len());
    order.push(candidates[best].id);
    order.extend(
        candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != best)
            .map(|(_, c)| c.id),
    );
    order
}

impl ComparisonOracle for ApiComparisonOracle {
    fn compare(&self, query: &str, candidates: &[RerankCandidate]) -> Result<Vec<WorkId>> {
        match candidates.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![candidates[0].id]),
            n if n > LABELS.len() => {
                return Err(Error::invalid_input(format!(
                    "cannot compare {} passages at once (max {})",
                    n,
                    LABELS.len()
                )))
            }
            _ => {}
        }

        let choice = retry_once(
            || self.call_api(query, candidates),
            |text| parse_choice(text, candidates.len()),
            |choice| choice.is_none(),
            || LlmClientError::Parse("model named no passage after retry".to_string()),
            "rerank",
        );

        match choice {
            Ok(Some(best)) => Ok(preference_order(candidates, best)),
            Ok(None) | Err(LlmClientError::Parse(_)) => {
                tracing::warn!(
                    target: "litrank::rerank",
                    candidates = candidates.len(),
                    "Unparseable comparison, keeping input order"
                );
                Ok(preference_order(candidates, 0))
            }
            Err(e) => Err(e.tag(Error::Rerank)),
        }
    }
}
