// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference documents: discovery, naming and embedding.
//!
//! A reference folder holds the overall goal text as `sdg.txt` plus one file
//! per goal. Goal files are recognised in the spellings the source data
//! uses (`sdg - 副本 (3).txt`, `sdg (3).txt`, `sdg3.txt`) and all map to
//! `sdg3`.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::documents::{document_name, list_documents, load_document};
use crate::embedding::{embed_document, ChunkConfig, EmbeddingClient, EmbeddingProvider};
use crate::errors::PipelineError;
use crate::similarity::NamedEmbedding;
use crate::stopwords::StopwordSet;

/// Name of the overall reference.
pub const TOTAL_REFERENCE: &str = "total";

static GOAL_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^sdg(?:\s*-\s*副本)?\s*(?:\((\d+)\)|(\d+))$").expect("valid goal file regex")
});

/// A reference file and the column name it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSource {
    pub name: String,
    pub path: PathBuf,
    /// When true, failing to embed this reference aborts the run.
    pub required: bool,
}

/// Maps a reference file stem to its logical name.
pub fn reference_name(stem: &str) -> String {
    let stem = stem.trim();
    if stem.eq_ignore_ascii_case("sdg") {
        return TOTAL_REFERENCE.to_string();
    }
    if let Some(caps) = GOAL_FILE_RE.captures(stem) {
        if let Some(num) = caps.get(1).or_else(|| caps.get(2)) {
            if let Ok(n) = num.as_str().parse::<u32>() {
                return format!("sdg{}", n);
            }
        }
    }
    stem.to_string()
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum ColumnKey<'a> {
    Total,
    Goal(u32),
    Other(&'a str),
}

fn column_key(name: &str) -> ColumnKey<'_> {
    if name == TOTAL_REFERENCE {
        return ColumnKey::Total;
    }
    name.strip_prefix("sdg")
        .and_then(|n| n.parse::<u32>().ok())
        .map(ColumnKey::Goal)
        .unwrap_or(ColumnKey::Other(name))
}

/// Column ordering: `total`, then `sdgN` numerically, then the rest by name.
pub fn compare_columns(a: &str, b: &str) -> Ordering {
    column_key(a).cmp(&column_key(b))
}

/// Finds the reference files under `path`.
///
/// A single file becomes one required reference called `single_name`. In a
/// folder every `*.txt` file is a reference; only `total` is required.
pub fn discover_references(
    path: &Path,
    single_name: &str,
) -> Result<Vec<ReferenceSource>, PipelineError> {
    if path.is_file() {
        return Ok(vec![ReferenceSource {
            name: single_name.to_string(),
            path: path.to_path_buf(),
            required: true,
        }]);
    }

    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for file in list_documents(path)? {
        let name = reference_name(&document_name(&file));
        if !seen.insert(name.clone()) {
            warn!(
                "duplicate reference {} from {}, keeping the first",
                name,
                file.display()
            );
            continue;
        }
        sources.push(ReferenceSource {
            required: name == TOTAL_REFERENCE,
            name,
            path: file,
        });
    }
    sources.sort_by(|a, b| compare_columns(&a.name, &b.name));
    Ok(sources)
}

fn embed_reference<P: EmbeddingProvider>(
    client: &mut EmbeddingClient<P>,
    source: &ReferenceSource,
    stopwords: &StopwordSet,
    chunking: &ChunkConfig,
) -> Result<NamedEmbedding, PipelineError> {
    let doc = load_document(&source.path)?;
    let embedded = embed_document(client, &doc.text, stopwords, chunking)?;
    info!(
        "reference {} embedded from {} chunk(s)",
        source.name, embedded.chunks
    );
    Ok(NamedEmbedding::new(source.name.clone(), embedded.embedding))
}

/// Embeds every reference, in column order.
///
/// Required references that fail abort with an error; optional ones are
/// skipped with a warning. At least one reference must survive.
pub fn load_references<P: EmbeddingProvider>(
    client: &mut EmbeddingClient<P>,
    sources: &[ReferenceSource],
    stopwords: &StopwordSet,
    chunking: &ChunkConfig,
) -> Result<Vec<NamedEmbedding>> {
    let mut references = Vec::with_capacity(sources.len());
    for source in sources {
        match embed_reference(client, source, stopwords, chunking) {
            Ok(reference) => references.push(reference),
            Err(err) if source.required => {
                return Err(err).with_context(|| {
                    format!(
                        "Failed to embed reference {} ({})",
                        source.name,
                        source.path.display()
                    )
                });
            }
            Err(err) => warn!(
                "skipping reference {} ({}): {}",
                source.name,
                source.path.display(),
                err
            ),
        }
    }

    if references.is_empty() {
        bail!("No usable reference documents");
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{HashingProvider, RetryPolicy};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn goal_file_names() {
        assert_eq!(reference_name("sdg"), "total");
        assert_eq!(reference_name("sdg - 副本 (3)"), "sdg3");
        assert_eq!(reference_name("sdg (12)"), "sdg12");
        assert_eq!(reference_name("SDG7"), "sdg7");
        assert_eq!(reference_name("sdg07"), "sdg7");
        assert_eq!(reference_name("海洋"), "海洋");
        assert_eq!(reference_name("sdg-notes"), "sdg-notes");
    }

    #[test]
    fn columns_sort_total_goals_then_others() {
        let mut names = vec!["sdg10", "climate", "sdg2", "total", "sdg1", "biodiversity"];
        names.sort_by(|a, b| compare_columns(a, b));
        assert_eq!(
            names,
            vec!["total", "sdg1", "sdg2", "sdg10", "biodiversity", "climate"]
        );
    }

    #[test]
    fn discover_folder_marks_total_required() {
        let dir = TempDir::new().unwrap();
        for name in ["sdg.txt", "sdg - 副本 (10).txt", "sdg - 副本 (2).txt", "sdg2.txt"] {
            std::fs::write(dir.path().join(name), "text").unwrap();
        }

        let sources = discover_references(dir.path(), "ignored").unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["total", "sdg2", "sdg10"]);
        assert!(sources[0].required);
        assert!(!sources[1].required);
    }

    #[test]
    fn discover_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.txt");
        std::fs::write(&path, "text").unwrap();

        let sources = discover_references(&path, "total").unwrap();
        assert_eq!(
            sources,
            vec![ReferenceSource {
                name: "total".to_string(),
                path,
                required: true,
            }]
        );
    }

    #[test]
    fn optional_failures_are_skipped_required_abort() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sdg.txt"), "经济发展").unwrap();
        std::fs::write(dir.path().join("sdg1.txt"), "").unwrap();
        let sources = discover_references(dir.path(), "total").unwrap();

        let mut client =
            EmbeddingClient::new(HashingProvider::new(32), RetryPolicy::new(1, Duration::ZERO));
        let refs = load_references(
            &mut client,
            &sources,
            &StopwordSet::new(),
            &ChunkConfig::default(),
        )
        .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "total");

        std::fs::write(dir.path().join("sdg.txt"), "").unwrap();
        let err = load_references(
            &mut client,
            &sources,
            &StopwordSet::new(),
            &ChunkConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("reference total"));
    }
}
