// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for sdgalign
//!
//! Loads configuration from `--config`, `.sdgalignrc.toml` in the current
//! directory, or `~/.config/sdgalign/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::embedding::{
    ChunkConfig, RetryPolicy, DEFAULT_CHUNK_SIZE, DEFAULT_HASHING_DIM, DEFAULT_MAX_RETRIES,
    DEFAULT_OLLAMA_HOST, DEFAULT_OVERLAP_SIZE,
};
use crate::table::TableFormat;

/// Default model for the Ollama and command providers.
pub const DEFAULT_SERVICE_MODEL: &str = "bge-m3";

/// Default model for the in-process fastembed provider.
pub const DEFAULT_BUILTIN_MODEL: &str = "multilingual-e5-small";

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".sdgalignrc.toml";

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Ollama-compatible HTTP service
    #[default]
    Ollama,
    /// External command speaking JSON over stdin/stdout
    Command,
    /// In-process fastembed model
    Builtin,
    /// Offline feature hashing, for tests and dry runs
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (ollama, command, builtin, hashing)
    pub provider: Option<EmbeddingProviderType>,
    /// Model identifier for the embedding provider
    pub model: Option<String>,
    /// Base URL of the embedding service
    pub host: Option<String>,
    /// Command to execute for command provider
    pub command: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Attempts per chunk before giving up
    pub max_retries: Option<usize>,
    /// Pause between attempts in milliseconds
    pub retry_delay_ms: Option<u64>,
    /// Bucket count for the hashing provider
    pub hashing_dim: Option<usize>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Ollama)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get model identifier. Defaults to "bge-m3", or
    /// "multilingual-e5-small" for the builtin provider.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider() {
            EmbeddingProviderType::Builtin => DEFAULT_BUILTIN_MODEL,
            _ => DEFAULT_SERVICE_MODEL,
        })
    }

    /// Get service host. `OLLAMA_HOST` wins over the file value.
    pub fn host(&self) -> String {
        std::env::var("OLLAMA_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string())
    }

    /// Get command (defaults to "embedder")
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("embedder")
    }

    /// Get request timeout (defaults to 120s)
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(120))
    }

    /// Get max retries (defaults to 3)
    pub fn max_retries(&self) -> usize {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Get retry delay (defaults to 2s)
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.unwrap_or(2_000))
    }

    /// Get hashing dimension (defaults to 256)
    pub fn hashing_dim(&self) -> usize {
        self.hashing_dim.unwrap_or(DEFAULT_HASHING_DIM)
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Characters per chunk
    pub chunk_size: Option<usize>,
    /// Characters shared by consecutive chunks
    pub overlap_size: Option<usize>,
}

impl ChunkingConfig {
    /// Get chunk size (defaults to 100)
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Get overlap size (defaults to 0)
    pub fn overlap_size(&self) -> usize {
        self.overlap_size.unwrap_or(DEFAULT_OVERLAP_SIZE)
    }
}

/// Stopword configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StopwordConfig {
    /// Stopword list files, one word per line
    pub paths: Vec<PathBuf>,
    /// Additional inline stopwords
    pub extra: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Table format when the output extension does not decide it
    pub format: Option<TableFormat>,
}

/// Configuration loaded from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,

    /// Chunking configuration
    pub chunking: ChunkingConfig,

    /// Stopword configuration
    pub stopwords: StopwordConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .sdgalignrc.toml in current directory
    /// 2. ~/.config/sdgalign/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(LOCAL_CONFIG_FILE)) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("sdgalign").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Load an explicitly requested file. Unlike [`Config::load`], a missing
    /// or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Resolve the explicit pipeline settings from this file's values.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            embedding_model: self.embeddings.model().to_string(),
            chunk_size: self.chunking.chunk_size(),
            overlap_size: self.chunking.overlap_size(),
            max_retries: self.embeddings.max_retries(),
            retry_delay: self.embeddings.retry_delay(),
            stopword_paths: self.stopwords.paths.clone(),
        }
    }
}

/// Settings handed to each pipeline component at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub embedding_model: String,
    pub chunk_size: usize,
    pub overlap_size: usize,
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub stopword_paths: Vec<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline()
    }
}

impl PipelineConfig {
    /// Validated chunking parameters.
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        ChunkConfig::new(self.chunk_size, self.overlap_size)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }
}
