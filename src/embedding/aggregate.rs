// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-document embeddings built from chunk embeddings.

use tracing::{debug, warn};

use super::chunker::ChunkConfig;
use super::client::EmbeddingClient;
use super::provider::EmbeddingProvider;
use super::vector::Embedding;
use crate::errors::PipelineError;
use crate::stopwords::StopwordSet;

/// A document vector together with the number of chunks behind it.
#[derive(Debug, Clone)]
pub struct DocumentEmbedding {
    pub embedding: Embedding,
    /// Chunks that embedded successfully and went into the mean.
    pub chunks: usize,
}

/// Embeds a whole document.
///
/// The text is stopword-filtered, chunked, and each chunk embedded. Chunks
/// that fail are skipped. The normalized chunk vectors are averaged and the
/// mean renormalized. Fails with [`PipelineError::NoValidEmbeddings`] when
/// no chunk succeeds.
pub fn embed_document<P: EmbeddingProvider>(
    client: &mut EmbeddingClient<P>,
    text: &str,
    stopwords: &StopwordSet,
    chunking: &ChunkConfig,
) -> Result<DocumentEmbedding, PipelineError> {
    let filtered = stopwords.filter(text);
    let chunks = chunking.chunk(&filtered);
    let total = chunks.len();
    let mut embeddings: Vec<Embedding> = Vec::with_capacity(total);

    for (idx, chunk) in chunks.iter().enumerate() {
        debug!(
            "embedding chunk {}/{} ({} chars)",
            idx + 1,
            total,
            chunk.chars().count()
        );
        match client.embed(chunk) {
            Ok(embedding) => {
                if let Some(first) = embeddings.first() {
                    if first.dim() != embedding.dim() {
                        warn!(
                            "skipping chunk {}/{}: dimension {} differs from {}",
                            idx + 1,
                            total,
                            embedding.dim(),
                            first.dim()
                        );
                        continue;
                    }
                }
                embeddings.push(embedding);
            }
            Err(err) => warn!("skipping chunk {}/{}: {}", idx + 1, total, err),
        }
    }

    let embedding =
        Embedding::mean(&embeddings).ok_or(PipelineError::NoValidEmbeddings { chunks: total })?;

    Ok(DocumentEmbedding {
        embedding,
        chunks: embeddings.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::client::tests::ScriptedProvider;
    use crate::embedding::client::RetryPolicy;
    use crate::embedding::provider::{HashingProvider, RawEmbedding};
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::ZERO)
    }

    #[test]
    fn single_chunk_matches_chunk_embedding() {
        let text = "经济发展";
        let chunking = ChunkConfig::new(100, 0).unwrap();
        let mut client = EmbeddingClient::new(HashingProvider::new(64), policy());

        let doc = embed_document(&mut client, text, &StopwordSet::new(), &chunking).unwrap();
        let direct = client.embed(text).unwrap();

        assert_eq!(doc.chunks, 1);
        for (a, b) in doc.embedding.as_slice().iter().zip(direct.as_slice()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn all_failures_yield_no_valid_embeddings() {
        let chunking = ChunkConfig::new(2, 0).unwrap();
        let mut client = EmbeddingClient::new(ScriptedProvider::failing(), policy());

        let err = embed_document(&mut client, "abcdef", &StopwordSet::new(), &chunking).unwrap_err();
        assert!(matches!(err, PipelineError::NoValidEmbeddings { chunks: 3 }));
        // three chunks, two attempts each
        assert_eq!(client.provider().calls, 6);
    }

    #[test]
    fn failed_chunks_are_skipped() {
        let chunking = ChunkConfig::new(2, 0).unwrap();
        let provider = ScriptedProvider::new(vec![
            Ok(RawEmbedding::new(vec![1.0, 0.0])),
            Err(anyhow::anyhow!("timeout")),
            Err(anyhow::anyhow!("timeout")),
            Ok(RawEmbedding::new(vec![0.0, 2.0])),
        ]);
        let mut client = EmbeddingClient::new(provider, policy());

        let doc = embed_document(&mut client, "aabbcc", &StopwordSet::new(), &chunking).unwrap();
        assert_eq!(doc.chunks, 2);
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((doc.embedding.as_slice()[0] - expected).abs() < 1e-6);
        assert!((doc.embedding.as_slice()[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn mismatched_dimensions_are_skipped() {
        let chunking = ChunkConfig::new(1, 0).unwrap();
        let provider = ScriptedProvider::new(vec![
            Ok(RawEmbedding::new(vec![1.0, 0.0])),
            Ok(RawEmbedding::new(vec![1.0, 0.0, 0.0])),
        ]);
        let mut client = EmbeddingClient::new(provider, policy());

        let doc = embed_document(&mut client, "ab", &StopwordSet::new(), &chunking).unwrap();
        assert_eq!(doc.chunks, 1);
        assert_eq!(doc.embedding.dim(), 2);
    }

    #[test]
    fn stopwords_are_removed_before_chunking() {
        let chunking = ChunkConfig::new(100, 0).unwrap();
        let stopwords: StopwordSet = ["建设"].into_iter().collect();
        let mut client = EmbeddingClient::new(HashingProvider::new(64), policy());

        let filtered = embed_document(&mut client, "经济 建设", &stopwords, &chunking).unwrap();
        let plain = client.embed("经济").unwrap();
        for (a, b) in filtered.embedding.as_slice().iter().zip(plain.as_slice()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_document_has_no_embeddings() {
        let mut client = EmbeddingClient::new(HashingProvider::new(8), policy());
        let err = embed_document(&mut client, "", &StopwordSet::new(), &ChunkConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoValidEmbeddings { chunks: 0 }));
    }
}
