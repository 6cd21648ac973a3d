//! Token usage and cost accounting
//!
//! One `UsageTracker` is shared (as `Arc<UsageTracker>`) by every client that
//! talks to a paid endpoint. Counters are atomic so concurrent calls can
//! record without locking.

use dashmap::DashMap;
use litrank_engine::LitrankConfig;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cost is accumulated in nano-USD to keep the counter integral.
const NANOS_PER_USD: f64 = 1e9;

/// Accumulates tokens and USD cost per model
#[derive(Debug, Default)]
pub struct UsageTracker {
    /// USD per million tokens, by model name
    prices: BTreeMap<String, f64>,
    tokens_by_model: DashMap<String, u64>,
    total_tokens: AtomicU64,
    cost_nanos: AtomicU64,
}

impl UsageTracker {
    /// Create a tracker with explicit prices (USD per million tokens)
    pub fn new(prices: BTreeMap<String, f64>) -> Self {
        UsageTracker {
            prices,
            ..Default::default()
        }
    }

    /// Create a tracker with the prices from `[pricing]`
    pub fn from_config(config: &LitrankConfig) -> Self {
        Self::new(config.pricing.clone())
    }

    /// Record `tokens` used by `model` and return the cost of this call in USD
    ///
    /// Models without a price are counted with zero cost.
    pub fn record(&self, model: &str, tokens: u64) -> f64 {
        self.total_tokens.fetch_add(tokens, Ordering::Relaxed);
        *self.tokens_by_model.entry(model.to_string()).or_insert(0) += tokens;

        let Some(price) = self.prices.get(model) else {
            tracing::warn!(target: "litrank::usage", model, tokens, "No price configured for model");
            return 0.0;
        };
        let cost = price * tokens as f64 / 1_000_000.0;
        self.cost_nanos
            .fetch_add((cost * NANOS_PER_USD).round() as u64, Ordering::Relaxed);
        tracing::debug!(target: "litrank::usage", model, tokens, cost, "Recorded usage");
        cost
    }

    /// Tokens recorded across all models
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }

    /// Tokens recorded for one model
    pub fn tokens_for(&self, model: &str) -> u64 {
        self.tokens_by_model.get(model).map(|t| *t).unwrap_or(0)
    }

    /// Accumulated cost in USD
    pub fn accumulated_cost(&self) -> f64 {
        self.cost_nanos.load(Ordering::Relaxed) as f64 / NANOS_PER_USD
    }
}
