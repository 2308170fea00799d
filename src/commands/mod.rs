// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations

pub mod chunks;
pub mod compare;
pub mod keywords;
pub mod score;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::{CliProvider, CliTableFormat, PipelineArgs};
use sdgalign::config::{Config, EmbeddingProviderType};
use sdgalign::embedding::{create_provider, EmbeddingClient, EmbeddingProvider};
use sdgalign::stopwords::StopwordSet;
use sdgalign::table::TableFormat;

/// Client type used by every command.
pub type Client = EmbeddingClient<Box<dyn EmbeddingProvider>>;

/// Load the configuration file. An explicit `--config` must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load()),
    }
}

/// Fold command-line overrides into the file configuration.
pub fn apply_overrides(config: &mut Config, args: &PipelineArgs) {
    if let Some(provider) = args.provider {
        config.embeddings.provider = Some(match provider {
            CliProvider::Ollama => EmbeddingProviderType::Ollama,
            CliProvider::Command => EmbeddingProviderType::Command,
            CliProvider::Builtin => EmbeddingProviderType::Builtin,
            CliProvider::Hashing => EmbeddingProviderType::Hashing,
        });
    }
    if let Some(model) = &args.model {
        config.embeddings.model = Some(model.clone());
    }
    if let Some(max_retries) = args.max_retries {
        config.embeddings.max_retries = Some(max_retries);
    }
    if let Some(delay) = args.retry_delay_ms {
        config.embeddings.retry_delay_ms = Some(delay);
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunking.chunk_size = Some(chunk_size);
    }
    if let Some(overlap) = args.overlap {
        config.chunking.overlap_size = Some(overlap);
    }
    add_stopword_paths(config, &args.stopwords);
}

/// Append extra stopword list files to the configured ones.
pub fn add_stopword_paths(config: &mut Config, paths: &[PathBuf]) {
    config.stopwords.paths.extend(paths.iter().cloned());
}

/// Stopwords from the configured files plus inline extras.
pub fn build_stopwords(config: &Config) -> StopwordSet {
    let mut stopwords = StopwordSet::load(&config.pipeline().stopword_paths);
    stopwords.extend(&config.stopwords.extra);
    tracing::debug!("{} stopword(s) loaded", stopwords.len());
    stopwords
}

/// Provider plus retry policy, as configured.
pub fn build_client(config: &Config) -> Result<Client> {
    let pipeline = config.pipeline();
    let provider = create_provider(&config.embeddings, &pipeline)
        .context("Failed to create embedding provider")?;
    let policy = pipeline.retry_policy();
    tracing::info!(
        "embedding with {} ({} attempt(s), {:?} apart)",
        provider.model_id(),
        policy.max_retries,
        policy.delay
    );
    Ok(EmbeddingClient::new(provider, policy))
}

/// Output format: explicit flag, then file extension, then config, then CSV.
///
/// A known extension that disagrees with the chosen format is an error.
pub fn resolve_format(
    flag: Option<CliTableFormat>,
    output: &Path,
    config: &Config,
) -> Result<TableFormat> {
    let from_extension = TableFormat::from_path(output);
    let format = flag
        .map(|f| match f {
            CliTableFormat::Csv => TableFormat::Csv,
            CliTableFormat::Json => TableFormat::Json,
            CliTableFormat::Xlsx => TableFormat::Xlsx,
        })
        .or(from_extension)
        .or(config.output.format)
        .unwrap_or_default();

    if let Some(extension) = from_extension.filter(|e| *e != format) {
        bail!(
            "Output {} has a .{} extension but the format is {}",
            output.display(),
            extension.extension(),
            format.extension()
        );
    }
    Ok(format)
}

/// Character-count preview of a text, for terminal output.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out.replace(['\n', '\r'], " ")
}
