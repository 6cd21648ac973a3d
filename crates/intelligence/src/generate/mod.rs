//! Chat completions
//!
//! This module provides:
//! - `Message` / `Role`: chat messages as sent on the wire
//! - `ModelTier`: budget vs quality model selection
//! - `CompletionProvider`: object-safe completion seam
//! - `ApiCompleter`: OpenAI-compatible implementation with usage tracking
//! - `tasks`: prompt builders for alignment and customized summaries

pub mod tasks;

use crate::llm_client::{call_chat_completions, retry_once, ChatReply, LlmClientError};
use crate::usage::UsageTracker;
use litrank_core::{Error, Result};
use litrank_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use tasks::{run_task, AlignToExamples, CompletionTask, CustomizedSummary, ALIGNMENT_EXAMPLES};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// Input
    User,
    /// Model output
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

impl Message {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Which configured model serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// Cheaper model
    Budget,
    /// Larger model, used when quality matters more than cost
    Quality,
}

impl ModelTier {
    /// `Quality` if `prioritize_quality`, else `Budget`
    pub fn for_quality(prioritize_quality: bool) -> Self {
        if prioritize_quality {
            ModelTier::Quality
        } else {
            ModelTier::Budget
        }
    }
}

/// Trait for chat completion implementations.
///
/// The trait is object-safe for use as `Arc<dyn CompletionProvider>`.
pub trait CompletionProvider: Send + Sync {
    /// Complete `messages` and return the trimmed response text
    ///
    /// # Errors
    /// Returns `Error::Completion` if the provider fails or answers empty.
    fn complete(&self, messages: &[Message], tier: ModelTier) -> Result<String>;
}

/// Completer that calls an OpenAI-compatible chat completions endpoint.
pub struct ApiCompleter {
    /// Full URL to the chat completions endpoint
    url: String,
    budget_model: String,
    quality_model: String,
    api_key: Option<String>,
    timeout: Duration,
    usage: Option<Arc<UsageTracker>>,
}

impl ApiCompleter {
    /// Create a new ApiCompleter.
    ///
    /// The `/chat/completions` path is appended to `endpoint` automatically.
    pub fn new(
        endpoint: &str,
        budget_model: &str,
        quality_model: &str,
        api_key: Option<&str>,
        timeout_ms: u64,
    ) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            url: format!("{}/chat/completions", base),
            budget_model: budget_model.to_string(),
            quality_model: quality_model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            usage: None,
        }
    }

    /// Create from the `[model]` section
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.budget_model,
            &config.quality_model,
            config.api_key.as_deref(),
            config.timeout_ms,
        )
    }

    /// Record usage on a shared tracker.
    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Model name serving `tier`
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Budget => &self.budget_model,
            ModelTier::Quality => &self.quality_model,
        }
    }

    fn call_api(&self, model: &str, messages: &[Message]) -> std::result::Result<ChatReply, LlmClientError> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });
        let reply = call_chat_completions(&self.url, self.api_key.as_deref(), self.timeout, &body)?;
        if let Some(usage) = &self.usage {
            usage.record(model, reply.total_tokens);
        }
        Ok(reply)
    }
}

impl CompletionProvider for ApiCompleter {
    fn complete(&self, messages: &[Message], tier: ModelTier) -> Result<String> {
        let model = self.model_for(tier);
        retry_once(
            || self.call_api(model, messages),
            |reply| reply.content.trim().to_string(),
            |text| text.is_empty(),
            || LlmClientError::Parse("model returned an empty completion after retry".to_string()),
            "completion",
        )
        .map_err(|e| e.tag(Error::Completion))
    }
}
