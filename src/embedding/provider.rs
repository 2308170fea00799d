// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider interface and implementations.
//!
//! Providers only talk to a model and report what came back. Validation of
//! the returned numbers happens here, at the boundary; retries and
//! normalization live in [`super::client`].

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::{EmbeddingConfig, EmbeddingProviderType, PipelineConfig};

/// Default host of a local Ollama server.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default number of hashing buckets for [`HashingProvider`].
pub const DEFAULT_HASHING_DIM: usize = 256;

/// A vector as returned by a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEmbedding {
    pub vector: Vec<f32>,
    /// False when the vector is empty or holds a NaN or infinite component.
    pub is_valid: bool,
}

impl RawEmbedding {
    pub fn new(vector: Vec<f32>) -> Self {
        let is_valid = !vector.is_empty() && vector.iter().all(|v| v.is_finite());
        Self { vector, is_valid }
    }
}

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send {
    /// Returns the model identifier.
    fn model_id(&self) -> &str;

    /// Generates an embedding for a single text.
    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding> {
        (**self).embed_raw(text)
    }
}

/// Builds the provider selected by the configuration.
///
/// Connection details come from `config`; the model name comes from the
/// resolved `pipeline` settings.
pub fn create_provider(
    config: &EmbeddingConfig,
    pipeline: &PipelineConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    let model = pipeline.embedding_model.as_str();
    let provider: Box<dyn EmbeddingProvider> = match config.provider() {
        EmbeddingProviderType::Ollama => {
            Box::new(OllamaProvider::new(&config.host(), model, config.timeout())?)
        }
        EmbeddingProviderType::Command => Box::new(CommandProvider::new(
            config.command().to_string(),
            model.to_string(),
        )),
        EmbeddingProviderType::Builtin => builtin_provider(model)?,
        EmbeddingProviderType::Hashing => Box::new(HashingProvider::new(config.hashing_dim())),
    };
    Ok(provider)
}

#[cfg(not(all(target_os = "macos", target_arch = "x86_64")))]
fn builtin_provider(model: &str) -> Result<Box<dyn EmbeddingProvider>> {
    Ok(Box::new(FastEmbedder::new(model)?))
}

#[cfg(all(target_os = "macos", target_arch = "x86_64"))]
fn builtin_provider(_model: &str) -> Result<Box<dyn EmbeddingProvider>> {
    bail!("the builtin provider is not available on this platform; use ollama or command")
}

/// Client for an Ollama-compatible `/api/embeddings` endpoint.
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl OllamaProvider {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build embedding HTTP client")?;
        let endpoint = format!("{}/api/embeddings", host.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EmbeddingProvider for OllamaProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding> {
        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .with_context(|| format!("embedding request to {} failed", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("embedding request failed ({}): {}", status, body.trim());
        }

        let parsed: OllamaResponse = resp
            .json()
            .context("failed to parse embedding response")?;
        Ok(RawEmbedding::new(parsed.embedding))
    }
}

/// Command provider that shells out to an external process.
///
/// The command receives `{"model": ..., "texts": [...]}` on stdin and must
/// print either a JSON array of vectors or an object holding one under
/// `embeddings`, `vectors` or `data`.
pub struct CommandProvider {
    command: String,
    model: String,
}

impl CommandProvider {
    pub fn new(command: String, model: String) -> Self {
        Self { command, model }
    }

    fn run_command(&self, text: &str) -> Result<Vec<f32>> {
        let payload = serde_json::json!({
            "model": self.model,
            "texts": [text],
        });

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn embedding command: {}", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(payload.to_string().as_bytes())
                .context("Failed to write embeddings payload to stdin")?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to read embeddings command output")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Embedding command failed (status {}): {}",
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: Value = serde_json::from_str(stdout.trim())
            .context("Failed to parse embeddings command output as JSON")?;
        parse_command_vectors(parsed)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Embedding command returned no vectors"))
    }
}

impl EmbeddingProvider for CommandProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding> {
        Ok(RawEmbedding::new(self.run_command(text)?))
    }
}

fn parse_command_vectors(parsed: Value) -> Result<Vec<Vec<f32>>> {
    let rows = match parsed {
        Value::Array(arr) => arr,
        Value::Object(mut obj) => {
            let value = ["embeddings", "vectors", "data"]
                .iter()
                .find_map(|key| obj.remove(*key))
                .ok_or_else(|| anyhow::anyhow!("Embeddings command output missing 'embeddings' field"))?;
            match value {
                Value::Array(arr) => arr,
                _ => bail!("Embeddings output must be a JSON array"),
            }
        }
        _ => bail!("Embeddings command output must be JSON array or object"),
    };

    rows.iter()
        .map(|row| {
            row.as_array()
                .ok_or_else(|| anyhow::anyhow!("Embedding row must be an array"))?
                .iter()
                .map(|value| {
                    value
                        .as_f64()
                        .ok_or_else(|| anyhow::anyhow!("Embedding value must be a number"))
                        .map(|v| v as f32)
                })
                .collect::<Result<Vec<f32>>>()
        })
        .collect()
}

/// In-process embedding through fastembed.
#[cfg(not(all(target_os = "macos", target_arch = "x86_64")))]
pub struct FastEmbedder {
    embedder: fastembed::TextEmbedding,
    model_id: String,
}

#[cfg(not(all(target_os = "macos", target_arch = "x86_64")))]
impl FastEmbedder {
    pub fn new(model: &str) -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model = match model.trim().to_lowercase().as_str() {
            "" | "minilm" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
                EmbeddingModel::AllMiniLML6V2
            }
            "multilingual-e5-small" | "intfloat/multilingual-e5-small" => {
                EmbeddingModel::MultilingualE5Small
            }
            "paraphrase-multilingual" | "paraphrase-multilingual-minilm-l12-v2" => {
                EmbeddingModel::ParaphraseMLMiniLML12V2
            }
            other => bail!(
                "Unsupported builtin model '{}'. Supported values: minilm, multilingual-e5-small, paraphrase-multilingual",
                other
            ),
        };
        let model_id = model.to_string();
        let embedder = TextEmbedding::try_new(InitOptions::new(model))
            .context("Failed to initialize fastembed model")?;

        Ok(Self { embedder, model_id })
    }
}

#[cfg(not(all(target_os = "macos", target_arch = "x86_64")))]
impl EmbeddingProvider for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding> {
        let mut embeddings = self.embedder.embed(&[text], None)?;
        let vector = embeddings
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))?;
        Ok(RawEmbedding::new(vector))
    }
}

/// Deterministic offline embedder based on feature hashing.
///
/// Character unigrams and bigrams (whitespace excluded) are hashed with
/// blake3 into `dimension` buckets and counted. Texts that share characters
/// land close together, which is enough for dry runs and tests.
pub struct HashingProvider {
    model: String,
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            model: format!("hashing-{}", dimension),
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, feature: &str) -> usize {
        let hash = blake3::hash(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(bytes) % self.dimension as u64) as usize
    }
}

impl EmbeddingProvider for HashingProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_raw(&mut self, text: &str) -> Result<RawEmbedding> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut prev: Option<char> = None;
        let mut buf = [0u8; 8];

        for ch in text.chars() {
            if ch.is_whitespace() {
                prev = None;
                continue;
            }
            vector[self.bucket(ch.encode_utf8(&mut buf))] += 1.0;
            if let Some(p) = prev {
                let bigram: String = [p, ch].iter().collect();
                vector[self.bucket(&bigram)] += 1.0;
            }
            prev = Some(ch);
        }

        Ok(RawEmbedding::new(vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::vector::Embedding;

    #[test]
    fn raw_embedding_validation() {
        assert!(RawEmbedding::new(vec![0.1, 0.2]).is_valid);
        assert!(!RawEmbedding::new(Vec::new()).is_valid);
        assert!(!RawEmbedding::new(vec![0.1, f32::NAN]).is_valid);
    }

    #[test]
    fn hashing_provider_is_deterministic() {
        let mut provider = HashingProvider::new(64);
        assert_eq!(provider.model_id(), "hashing-64");

        let a = provider.embed_raw("经济发展").unwrap();
        let b = provider.embed_raw("经济发展").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.vector.len(), 64);
        // 4 unigrams + 3 bigrams
        assert_eq!(a.vector.iter().sum::<f32>(), 7.0);
    }

    #[test]
    fn hashing_provider_separates_unrelated_text() {
        let mut provider = HashingProvider::new(DEFAULT_HASHING_DIM);
        let base = Embedding::from_raw(provider.embed_raw("经济发展 城市建设").unwrap().vector).unwrap();
        let near = Embedding::from_raw(provider.embed_raw("经济发展").unwrap().vector).unwrap();
        let far = Embedding::from_raw(provider.embed_raw("海洋保护").unwrap().vector).unwrap();

        assert!(base.dot(&near).unwrap() > base.dot(&far).unwrap());
    }

    #[test]
    fn hashing_provider_whitespace_only_is_zero() {
        let mut provider = HashingProvider::new(16);
        let raw = provider.embed_raw(" \n\t ").unwrap();
        assert!(raw.is_valid);
        assert!(raw.vector.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn parse_command_output_shapes() {
        let array = serde_json::json!([[1.0, 2.0]]);
        assert_eq!(parse_command_vectors(array).unwrap(), vec![vec![1.0, 2.0]]);

        let object = serde_json::json!({"embeddings": [[0.5]]});
        assert_eq!(parse_command_vectors(object).unwrap(), vec![vec![0.5]]);

        let missing = serde_json::json!({"other": []});
        assert!(parse_command_vectors(missing).is_err());

        let bad_value = serde_json::json!([["x"]]);
        assert!(parse_command_vectors(bad_value).is_err());
    }

    #[test]
    fn ollama_endpoint_is_built_from_host() {
        let provider =
            OllamaProvider::new("http://127.0.0.1:11434/", "bge-m3", Duration::from_secs(1)).unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:11434/api/embeddings");
        assert_eq!(provider.model_id(), "bge-m3");
        assert!(OllamaProvider::new(DEFAULT_OLLAMA_HOST, " ", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn create_provider_takes_model_from_pipeline() {
        let config = crate::config::Config::parse(
            "[embeddings]\nprovider = \"command\"\nmodel = \"nomic-embed-text\"\n",
        )
        .unwrap();
        let mut pipeline = config.pipeline();
        let provider = create_provider(&config.embeddings, &pipeline).unwrap();
        assert_eq!(provider.model_id(), "nomic-embed-text");

        pipeline.embedding_model = "bge-m3".to_string();
        let provider = create_provider(&config.embeddings, &pipeline).unwrap();
        assert_eq!(provider.model_id(), "bge-m3");
    }

    #[test]
    fn command_provider_reads_stdout() {
        let mut provider = CommandProvider::new(
            "cat > /dev/null; echo '{\"embeddings\": [[3.0, 4.0]]}'".to_string(),
            "test".to_string(),
        );
        let raw = provider.embed_raw("hello").unwrap();
        assert_eq!(raw.vector, vec![3.0, 4.0]);
    }
}
