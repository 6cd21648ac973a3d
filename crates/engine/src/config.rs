//! Configuration via `litrank.toml`
//!
//! A single config file in the data directory. On first use a commented
//! default `litrank.toml` is created; to change settings, edit the file and
//! restart.

use litrank_core::{Error, Result, SearchMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "litrank.toml";

// ============================================================================
// Sections
// ============================================================================

/// `[search]`: retrieval and fusion parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Weight of the dense branch in hybrid fusion
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,
    /// Weight of the lexical branch in hybrid fusion
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,
    /// Each hybrid branch fetches `overfetch_factor × top_n` candidates
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
    /// Reranking fetches `rerank_factor × n` candidates
    #[serde(default = "default_rerank_factor")]
    pub rerank_factor: usize,
    /// Mode used when the caller does not pick one
    #[serde(default)]
    pub default_mode: SearchMode,
    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,
    /// BM25 length normalization
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,
}

fn default_vector_weight() -> f32 {
    0.8
}
fn default_lexical_weight() -> f32 {
    0.2
}
fn default_overfetch_factor() -> usize {
    2
}
fn default_rerank_factor() -> usize {
    10
}
fn default_bm25_k1() -> f32 {
    1.2
}
fn default_bm25_b() -> f32 {
    0.75
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            vector_weight: default_vector_weight(),
            lexical_weight: default_lexical_weight(),
            overfetch_factor: default_overfetch_factor(),
            rerank_factor: default_rerank_factor(),
            default_mode: SearchMode::default(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
        }
    }
}

/// `[embedding]`: embedding endpoint and batching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Requested vector dimension
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Token budget per embedding request
    #[serde(default = "default_max_tokens_per_call")]
    pub max_tokens_per_call: usize,
    /// Number of works embedded per ingestion chunk
    #[serde(default = "default_ingest_chunk_size")]
    pub ingest_chunk_size: usize,
    /// Optional API key (falls back to `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}
fn default_dimensions() -> usize {
    1024
}
fn default_max_tokens_per_call() -> usize {
    8191
}
fn default_ingest_chunk_size() -> usize {
    2000
}
fn default_embedding_timeout_ms() -> u64 {
    30_000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            endpoint: default_endpoint(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            max_tokens_per_call: default_max_tokens_per_call(),
            ingest_chunk_size: default_ingest_chunk_size(),
            api_key: None,
            timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

/// `[model]`: chat-completion endpoint used for alignment, summaries and
/// reranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// OpenAI-compatible API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used when cost matters more than quality
    #[serde(default = "default_budget_model")]
    pub budget_model: String,
    /// Model used when quality is prioritized
    #[serde(default = "default_quality_model")]
    pub quality_model: String,
    /// Optional API key (falls back to `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_model_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_budget_model() -> String {
    "gpt-3.5-turbo-0125".to_string()
}
fn default_quality_model() -> String {
    "gpt-4o-2024-05-13".to_string()
}
fn default_model_timeout_ms() -> u64 {
    60_000
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            endpoint: default_endpoint(),
            budget_model: default_budget_model(),
            quality_model: default_quality_model(),
            api_key: None,
            timeout_ms: default_model_timeout_ms(),
        }
    }
}

/// `[rerank]`: setwise reranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankConfig {
    /// Rerank unless the caller says otherwise
    #[serde(default)]
    pub enabled: bool,
    /// Children per heap node (candidates per comparison = children + 1)
    #[serde(default = "default_children")]
    pub children: usize,
}

fn default_children() -> usize {
    2
}

impl Default for RerankConfig {
    fn default() -> Self {
        RerankConfig {
            enabled: false,
            children: default_children(),
        }
    }
}

/// `[openalex]`: bibliographic metadata source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAlexConfig {
    /// API base URL
    #[serde(default = "default_openalex_url")]
    pub base_url: String,
    /// Contact address for the polite pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
    /// Results per page when listing works by topic
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Request timeout in milliseconds
    #[serde(default = "default_openalex_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_openalex_url() -> String {
    "https://api.openalex.org".to_string()
}
fn default_per_page() -> usize {
    200
}
fn default_openalex_timeout_ms() -> u64 {
    30_000
}

impl Default for OpenAlexConfig {
    fn default() -> Self {
        OpenAlexConfig {
            base_url: default_openalex_url(),
            mailto: None,
            per_page: default_per_page(),
            timeout_ms: default_openalex_timeout_ms(),
        }
    }
}

fn default_pricing() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("gpt-4o-2024-05-13".to_string(), 5.00),
        ("gpt-3.5-turbo-0125".to_string(), 0.50),
        ("text-embedding-3-large".to_string(), 0.13),
    ])
}

// ============================================================================
// LitrankConfig
// ============================================================================

/// Configuration loaded from `litrank.toml`.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # Example
///
/// ```toml
/// [search]
/// vector_weight = 0.8
/// lexical_weight = 0.2
///
/// [rerank]
/// enabled = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LitrankConfig {
    /// Retrieval and fusion
    #[serde(default)]
    pub search: SearchConfig,
    /// Embedding endpoint and batching
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chat-completion endpoint
    #[serde(default)]
    pub model: ModelConfig,
    /// Setwise reranking
    #[serde(default)]
    pub rerank: RerankConfig,
    /// OpenAlex client
    #[serde(default)]
    pub openalex: OpenAlexConfig,
    /// USD per million tokens, by model name
    #[serde(default = "default_pricing")]
    pub pricing: BTreeMap<String, f64>,
}

impl Default for LitrankConfig {
    fn default() -> Self {
        LitrankConfig {
            search: SearchConfig::default(),
            embedding: EmbeddingConfig::default(),
            model: ModelConfig::default(),
            rerank: RerankConfig::default(),
            openalex: OpenAlexConfig::default(),
            pricing: default_pricing(),
        }
    }
}

impl LitrankConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# litrank configuration

[search]
# Hybrid fusion weights (both >= 0)
vector_weight = 0.8
lexical_weight = 0.2
# Each hybrid branch fetches overfetch_factor x top_n candidates
overfetch_factor = 2
# Reranking fetches rerank_factor x n candidates
rerank_factor = 10
# "vector", "lexical" or "hybrid"
default_mode = "hybrid"
bm25_k1 = 1.2
bm25_b = 0.75

[embedding]
endpoint = "https://api.openai.com/v1"
model = "text-embedding-3-large"
dimensions = 1024
# Token budget per embedding request
max_tokens_per_call = 8191
# Works embedded per ingestion chunk
ingest_chunk_size = 2000
# api_key = "sk-..."              # optional, defaults to $OPENAI_API_KEY
timeout_ms = 30000

[model]
endpoint = "https://api.openai.com/v1"
budget_model = "gpt-3.5-turbo-0125"
quality_model = "gpt-4o-2024-05-13"
# api_key = "sk-..."              # optional, defaults to $OPENAI_API_KEY
timeout_ms = 60000

[rerank]
enabled = false
# Children per heap node
children = 2

[openalex]
base_url = "https://api.openalex.org"
# mailto = "you@example.org"      # optional, joins the polite pool
per_page = 200
timeout_ms = 30000

# USD per million tokens
[pricing]
"gpt-4o-2024-05-13" = 5.00
"gpt-3.5-turbo-0125" = 0.50
"text-embedding-3-large" = 0.13
"#
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let s = &self.search;
        for (name, w) in [("vector_weight", s.vector_weight), ("lexical_weight", s.lexical_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Config(format!(
                    "search.{} must be a finite non-negative number, got {}",
                    name, w
                )));
            }
        }
        if s.overfetch_factor == 0 || s.rerank_factor == 0 {
            return Err(Error::Config(
                "search.overfetch_factor and search.rerank_factor must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::Config("embedding.dimensions must be at least 1".to_string()));
        }
        if self.embedding.max_tokens_per_call == 0 || self.embedding.ingest_chunk_size == 0 {
            return Err(Error::Config(
                "embedding.max_tokens_per_call and embedding.ingest_chunk_size must be at least 1"
                    .to_string(),
            ));
        }
        if self.rerank.children == 0 {
            return Err(Error::Config("rerank.children must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: LitrankConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Load `litrank.toml` from `dir`, creating the default file first.
    pub fn load_or_create(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        Self::write_default_if_missing(&path)?;
        let config = Self::from_file(&path)?;
        tracing::debug!(target: "litrank::config", path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
