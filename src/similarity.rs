// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity scoring against named reference vectors.
//!
//! Two granularities are supported: a single document vector scored
//! against each reference, or every chunk of the candidate scored on its
//! own and the per-chunk similarities averaged.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::embedding::{ChunkConfig, Embedding, EmbeddingClient, EmbeddingProvider};
use crate::stopwords::StopwordSet;

/// A reference vector with its logical name (`total`, `sdg3`, ...).
#[derive(Debug, Clone)]
pub struct NamedEmbedding {
    pub name: String,
    pub embedding: Embedding,
}

impl NamedEmbedding {
    pub fn new(name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            name: name.into(),
            embedding,
        }
    }
}

/// Averaged chunk-level similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkScore {
    /// Mean similarity over scored chunks, or 0.0 when none were scored.
    pub similarity: f32,
    /// Number of chunks that contributed.
    pub chunks: usize,
}

impl ChunkScore {
    fn from_sum(sum: f32, chunks: usize) -> Self {
        if chunks == 0 {
            return Self {
                similarity: 0.0,
                chunks: 0,
            };
        }
        Self {
            similarity: sum / chunks as f32,
            chunks,
        }
    }
}

/// Cosine similarity of two unit vectors, clamped to [-1, 1].
///
/// Vectors of different dimension score 0.0.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    match a.dot(b) {
        Some(dot) => dot.clamp(-1.0, 1.0),
        None => 0.0,
    }
}

/// Document-level score of a candidate against one reference.
pub fn score(candidate: &Embedding, reference: &Embedding) -> f32 {
    cosine_similarity(candidate, reference)
}

/// Document-level scores against every reference, keyed by name.
pub fn score_against(candidate: &Embedding, references: &[NamedEmbedding]) -> BTreeMap<String, f32> {
    references
        .iter()
        .map(|r| (r.name.clone(), score(candidate, &r.embedding)))
        .collect()
}

/// Chunk-level score of `text` against one reference.
///
/// The text is stopword-filtered and chunked; each chunk is embedded and
/// compared with `reference`. Chunks that fail to embed are skipped. Zero
/// scored chunks yields a similarity of 0.0 with a count of 0.
pub fn score_chunks<P: EmbeddingProvider>(
    client: &mut EmbeddingClient<P>,
    text: &str,
    reference: &Embedding,
    stopwords: &StopwordSet,
    chunking: &ChunkConfig,
) -> ChunkScore {
    let reference = NamedEmbedding::new("reference", reference.clone());
    score_chunks_against(client, text, std::slice::from_ref(&reference), stopwords, chunking)
        .remove("reference")
        .unwrap_or(ChunkScore {
            similarity: 0.0,
            chunks: 0,
        })
}

/// Chunk-level scores against every reference.
///
/// Each chunk is embedded once and compared with all references, so the
/// embedding service sees one request per chunk regardless of how many
/// references there are.
pub fn score_chunks_against<P: EmbeddingProvider>(
    client: &mut EmbeddingClient<P>,
    text: &str,
    references: &[NamedEmbedding],
    stopwords: &StopwordSet,
    chunking: &ChunkConfig,
) -> BTreeMap<String, ChunkScore> {
    let filtered = stopwords.filter(text);
    let chunks = chunking.chunk(&filtered);
    let total = chunks.len();
    let mut sums = vec![(0.0f32, 0usize); references.len()];

    for (idx, chunk) in chunks.iter().enumerate() {
        debug!("scoring chunk {}/{}", idx + 1, total);
        let embedding = match client.embed(chunk) {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!("skipping chunk {}/{}: {}", idx + 1, total, err);
                continue;
            }
        };
        for (reference, (sum, count)) in references.iter().zip(sums.iter_mut()) {
            match embedding.dot(&reference.embedding) {
                Some(dot) => {
                    *sum += dot.clamp(-1.0, 1.0);
                    *count += 1;
                }
                None => warn!(
                    "chunk {}/{} has dimension {}, reference {} has {}",
                    idx + 1,
                    total,
                    embedding.dim(),
                    reference.name,
                    reference.embedding.dim()
                ),
            }
        }
    }

    references
        .iter()
        .zip(sums)
        .map(|(reference, (sum, count))| (reference.name.clone(), ChunkScore::from_sum(sum, count)))
        .collect()
}
