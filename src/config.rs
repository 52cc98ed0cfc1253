use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum results returned by a search call.
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
    /// Semantic candidates kept after similarity ranking.
    #[serde(default = "default_semantic_top_k")]
    pub semantic_top_k: usize,
    /// Semantic search runs only when lexical hits fall below this count.
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: usize,
    /// Minimum token length considered meaningful; shorter query tokens
    /// are discarded.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            final_limit: default_final_limit(),
            semantic_top_k: default_semantic_top_k(),
            semantic_threshold: default_semantic_threshold(),
            min_token_len: default_min_token_len(),
        }
    }
}

fn default_final_limit() -> usize {
    10
}
fn default_semantic_top_k() -> usize {
    5
}
fn default_semantic_threshold() -> usize {
    5
}
fn default_min_token_len() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fixed pause between consecutive provider calls in a catalog sweep,
    /// a rate-limit courtesy rather than a correctness requirement.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dims: None,
            timeout_secs: default_timeout_secs(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_throttle_ms() -> u64 {
    50
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntentConfig {
    /// `"keywords"` (deterministic, no external call) or `"model"`
    /// (one constrained chat-completion call per utterance).
    #[serde(default = "default_intent_strategy")]
    pub strategy: String,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            strategy: default_intent_strategy(),
        }
    }
}

fn default_intent_strategy() -> String {
    "keywords".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Response cache entry lifetime in seconds.
    #[serde(default = "default_response_ttl_secs")]
    pub response_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            response_ttl_secs: default_response_ttl_secs(),
        }
    }
}

fn default_response_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.final_limit < 1 {
        anyhow::bail!("retrieval.final_limit must be >= 1");
    }

    if config.retrieval.semantic_top_k < 1 {
        anyhow::bail!("retrieval.semantic_top_k must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    match config.intent.strategy.as_str() {
        "keywords" | "model" => {}
        other => anyhow::bail!(
            "Unknown intent strategy: '{}'. Must be keywords or model.",
            other
        ),
    }

    Ok(config)
}
