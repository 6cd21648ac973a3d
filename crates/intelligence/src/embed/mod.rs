//! Remote text embeddings
//!
//! `ApiEmbedder` implements [`Embedder`] over an OpenAI-compatible
//! `/embeddings` endpoint. Batches are packed under a per-call token
//! budget (see [`batch`]) and every call's usage is recorded on the shared
//! [`UsageTracker`].

pub mod batch;

use crate::llm_client::{parse_embeddings_response, post_json};
use crate::usage::UsageTracker;
use litrank_core::{Embedder, Error, Result};
use litrank_engine::EmbeddingConfig;
use std::sync::Arc;
use std::time::Duration;

pub use batch::{estimate_tokens, plan_batches, OVERSIZE_PLACEHOLDER};

/// Embedder that calls an OpenAI-compatible embeddings endpoint.
pub struct ApiEmbedder {
    /// Full URL to the embeddings endpoint
    url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
    timeout: Duration,
    max_tokens_per_call: usize,
    usage: Option<Arc<UsageTracker>>,
}

impl ApiEmbedder {
    /// Create a new ApiEmbedder.
    ///
    /// `endpoint` is the base URL (e.g. "https://api.openai.com/v1"); the
    /// `/embeddings` path is appended automatically.
    pub fn new(
        endpoint: &str,
        model: &str,
        dimensions: usize,
        api_key: Option<&str>,
        timeout_ms: u64,
    ) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            url: format!("{}/embeddings", base),
            model: model.to_string(),
            dimensions,
            api_key: api_key.map(|s| s.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            max_tokens_per_call: 8191,
            usage: None,
        }
    }

    /// Create from the `[embedding]` section
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            config.dimensions,
            config.api_key.as_deref(),
            config.timeout_ms,
        )
        .with_max_tokens_per_call(config.max_tokens_per_call)
    }

    /// Override the per-call token budget.
    pub fn with_max_tokens_per_call(mut self, max_tokens: usize) -> Self {
        self.max_tokens_per_call = max_tokens.max(1);
        self
    }

    /// Record usage on a shared tracker.
    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Output dimensionality requested from the endpoint
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn call_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
            "dimensions": self.dimensions,
        });
        let json = post_json(&self.url, self.api_key.as_deref(), self.timeout, &body)
            .map_err(|e| e.tag(Error::Embedding))?;
        let (vectors, tokens) =
            parse_embeddings_response(&json, inputs.len()).map_err(|e| e.tag(Error::Embedding))?;

        if let Some(usage) = &self.usage {
            usage.record(&self.model, tokens);
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(Error::Embedding(format!(
                "endpoint returned {} dimensions, expected {}",
                bad.len(),
                self.dimensions
            )));
        }
        Ok(vectors)
    }
}

impl Embedder for ApiEmbedder {
    /// Embed one text
    ///
    /// # Errors
    /// Returns `Error::Embedding` if `text` alone exceeds the per-call token
    /// budget. Only batch ingestion substitutes a placeholder.
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = estimate_tokens(text);
        if tokens > self.max_tokens_per_call {
            tracing::warn!(
                target: "litrank::embed",
                tokens,
                max_tokens = self.max_tokens_per_call,
                "Query exceeds token budget"
            );
            return Err(Error::Embedding(format!(
                "text of ~{} tokens exceeds the token budget of {}",
                tokens, self.max_tokens_per_call
            )));
        }
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Embedding("endpoint returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batches = plan_batches(texts, self.max_tokens_per_call);
        let mut out = Vec::with_capacity(texts.len());
        for (i, batch) in batches.iter().enumerate() {
            tracing::debug!(
                target: "litrank::embed",
                batch = i,
                batches = batches.len(),
                size = batch.len(),
                "Embedding batch"
            );
            out.extend(self.call_batch(batch)?);
        }
        Ok(out)
    }
}
