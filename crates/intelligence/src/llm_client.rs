//! Shared HTTP client infrastructure for the model-backed modules
//!
//! Provides a unified error type, JSON call helpers, response parsing and
//! retry logic shared by `ApiEmbedder`, `ApiCompleter`,
//! `ApiComparisonOracle` and `OpenAlexClient`.

use litrank_core::Error;
use serde_json::Value;
use std::time::Duration;

// ============================================================================
// Unified Error Type
// ============================================================================

/// Errors that can occur when calling an external endpoint
#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    /// HTTP request failed (network unreachable, connection refused, error status)
    #[error("network error: {0}")]
    Network(String),
    /// Failed to parse the response
    #[error("parse error: {0}")]
    Parse(String),
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// The `remote` cargo feature is not enabled
    #[error("feature '{0}' not enabled")]
    FeatureDisabled(&'static str),
}

impl LlmClientError {
    /// Convert into the stage-tagged core error, e.g. `e.tag(Error::Embedding)`
    pub fn tag(self, stage: fn(String) -> Error) -> Error {
        stage(self.to_string())
    }
}

/// Content and token usage of one chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// `choices[0].message.content`
    pub content: String,
    /// `usage.total_tokens`, 0 when the endpoint does not report it
    pub total_tokens: u64,
}

// ============================================================================
// Shared HTTP Client
// ============================================================================

#[cfg(feature = "remote")]
fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

#[cfg(feature = "remote")]
fn classify(e: ureq::Error) -> LlmClientError {
    let msg = e.to_string();
    if msg.contains("timed out") || msg.contains("Timeout") {
        LlmClientError::Timeout
    } else {
        LlmClientError::Network(msg)
    }
}

#[cfg(feature = "remote")]
fn read_json(mut response: ureq::http::Response<ureq::Body>) -> Result<Value, LlmClientError> {
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmClientError::Network(format!("failed to read response: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| {
        LlmClientError::Parse(format!(
            "invalid JSON response: {} ({})",
            e,
            &text[..text.len().min(200)]
        ))
    })
}

/// POST a JSON body and parse the JSON response.
///
/// Handles agent construction with timeout, the bearer token header and
/// timeout detection.
#[cfg(feature = "remote")]
pub fn post_json(
    url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    body: &Value,
) -> Result<Value, LlmClientError> {
    let body_bytes = serde_json::to_vec(body)
        .map_err(|e| LlmClientError::Parse(format!("failed to serialize request: {}", e)))?;

    let mut request = agent(timeout)
        .post(url)
        .header("Content-Type", "application/json");
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key));
    }

    let response = request.send(&body_bytes[..]).map_err(classify)?;
    read_json(response)
}

/// Placeholder for when the `remote` feature is not enabled.
#[cfg(not(feature = "remote"))]
pub fn post_json(
    _url: &str,
    _api_key: Option<&str>,
    _timeout: Duration,
    _body: &Value,
) -> Result<Value, LlmClientError> {
    Err(LlmClientError::FeatureDisabled("remote"))
}

/// GET `url` with encoded query parameters and parse the JSON response.
#[cfg(feature = "remote")]
pub fn get_json(
    url: &str,
    params: &[(&str, String)],
    timeout: Duration,
) -> Result<Value, LlmClientError> {
    let mut request = agent(timeout).get(url);
    for (key, value) in params {
        request = request.query(*key, value);
    }
    let response = request.call().map_err(classify)?;
    read_json(response)
}

/// Placeholder for when the `remote` feature is not enabled.
#[cfg(not(feature = "remote"))]
pub fn get_json(
    _url: &str,
    _params: &[(&str, String)],
    _timeout: Duration,
) -> Result<Value, LlmClientError> {
    Err(LlmClientError::FeatureDisabled("remote"))
}

/// Call an OpenAI-compatible chat completions endpoint.
pub fn call_chat_completions(
    url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    body: &Value,
) -> Result<ChatReply, LlmClientError> {
    post_json(url, api_key, timeout, body).and_then(|json| parse_chat_response(&json))
}

// ============================================================================
// Response Parsing
// ============================================================================

fn total_tokens(json: &Value) -> u64 {
    json.pointer("/usage/total_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Extract `choices[0].message.content` and the token usage.
pub fn parse_chat_response(json: &Value) -> Result<ChatReply, LlmClientError> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            let raw = json.to_string();
            LlmClientError::Parse(format!(
                "unexpected response format: {}",
                &raw[..raw.len().min(200)]
            ))
        })?;
    Ok(ChatReply {
        content: content.to_string(),
        total_tokens: total_tokens(json),
    })
}

/// Extract the embeddings of an `/embeddings` response in input order.
///
/// Items are ordered by their `index` field; the response must hold exactly
/// `expected` of them.
pub fn parse_embeddings_response(
    json: &Value,
    expected: usize,
) -> Result<(Vec<Vec<f32>>, u64), LlmClientError> {
    let data = json
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmClientError::Parse("response has no 'data' array".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(Value::as_u64)
            .map(|i| i as usize)
            .unwrap_or(pos);
        let vector = item
            .get("embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| LlmClientError::Parse(format!("item {} has no embedding", pos)))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| LlmClientError::Parse("non-numeric embedding component".into()))
            })
            .collect::<Result<Vec<f32>, _>>()?;
        indexed.push((index, vector));
    }

    if indexed.len() != expected {
        return Err(LlmClientError::Parse(format!(
            "expected {} embeddings, got {}",
            expected,
            indexed.len()
        )));
    }
    indexed.sort_by_key(|(i, _)| *i);
    Ok((
        indexed.into_iter().map(|(_, v)| v).collect(),
        total_tokens(json),
    ))
}

// ============================================================================
// Retry Helper
// ============================================================================

/// Execute a model call with a single retry on failure or empty results.
///
/// 1. Calls `call_fn()` to get the raw reply
/// 2. Calls `parse_fn()` to parse it
/// 3. If parsing succeeds but `is_empty_fn()` returns true, retries once
/// 4. If the call itself fails, retries once
///
/// `operation` is a label for tracing messages (e.g. "summary" or "rerank").
pub fn retry_once<R, T>(
    call_fn: impl Fn() -> Result<R, LlmClientError>,
    parse_fn: impl Fn(&R) -> T,
    is_empty_fn: impl Fn(&T) -> bool,
    on_empty_err: impl Fn() -> LlmClientError,
    operation: &str,
) -> Result<T, LlmClientError> {
    // First attempt
    match call_fn() {
        Ok(raw) => {
            let result = parse_fn(&raw);
            if !is_empty_fn(&result) {
                return Ok(result);
            }
            tracing::warn!(
                target: "litrank::llm_client",
                op = operation,
                "First call returned no usable result, retrying"
            );
        }
        Err(LlmClientError::FeatureDisabled(feat)) => {
            return Err(LlmClientError::FeatureDisabled(feat));
        }
        Err(e) => {
            tracing::warn!(
                target: "litrank::llm_client",
                op = operation,
                error = %e,
                "First call failed, retrying"
            );
        }
    }

    // Retry once
    match call_fn() {
        Ok(raw) => {
            let result = parse_fn(&raw);
            if is_empty_fn(&result) {
                tracing::warn!(
                    target: "litrank::llm_client",
                    op = operation,
                    "Retry also returned no usable result"
                );
                Err(on_empty_err())
            } else {
                Ok(result)
            }
        }
        Err(e) => {
            tracing::warn!(
                target: "litrank::llm_client",
                op = operation,
                error = %e,
                "Retry also failed"
            );
            Err(e)
        }
    }
}
