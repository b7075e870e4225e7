use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tome_store::Distance;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub chunking: ChunkingConfig,
    pub index: IndexConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    pub collection: String,
    pub distance: Distance,
    pub top_k: u64,
    pub qdrant_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryConfig {
    pub expansions: usize,
    pub max_context_chars: usize,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Check the cross-field invariants the types cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("chunking.chunk_size must be positive");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            anyhow::bail!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            );
        }
        if self.index.top_k == 0 {
            anyhow::bail!("index.top_k must be positive");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be positive");
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TOME_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("TOME_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("TOME_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("TOME_COLLECTION") {
            self.index.collection = v;
        }
    }

    fn default() -> Self {
        Self {
            llm: LlmConfig {
                base_url: "http://localhost:11434".into(),
                model: "gemma2".into(),
                embedding_model: "mxbai-embed-large".into(),
                timeout_secs: 60,
            },
            chunking: ChunkingConfig {
                chunk_size: 7500,
                chunk_overlap: 100,
            },
            index: IndexConfig {
                collection: "rag-collection".into(),
                distance: Distance::Cosine,
                top_k: 4,
                qdrant_url: None,
            },
            query: QueryConfig {
                expansions: 5,
                max_context_chars: 24_000,
            },
        }
    }
}
