// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for per-document pipeline work.
//!
//! Everything that can go wrong while turning one document into scores is a
//! [`PipelineError`]. The batch driver matches on the variant to decide
//! whether to skip a chunk, skip a document, or abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, embedding or scoring documents.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required file or folder does not exist.
    #[error("missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A file could not be decoded as UTF-8.
    #[error("{} is not valid UTF-8", path.display())]
    DecodeError { path: PathBuf },

    /// A file exists but holds no text.
    #[error("{} is empty", path.display())]
    EmptyContent { path: PathBuf },

    /// Any other I/O failure while reading an input.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The embedding service did not yield a usable vector within the
    /// retry budget.
    #[error("embedding unavailable after {attempts} attempt(s): {last_error}")]
    EmbeddingUnavailable { attempts: usize, last_error: String },

    /// Not a single chunk of a document could be embedded.
    #[error("no valid embeddings for any of {chunks} chunk(s)")]
    NoValidEmbeddings { chunks: usize },
}

impl PipelineError {
    /// Short machine-friendly tag for logs and skip reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "missing_input",
            Self::DecodeError { .. } => "decode_error",
            Self::EmptyContent { .. } => "empty_content",
            Self::Io { .. } => "io",
            Self::EmbeddingUnavailable { .. } => "embedding_unavailable",
            Self::NoValidEmbeddings { .. } => "no_valid_embeddings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_and_attempts() {
        let err = PipelineError::MissingInput {
            path: PathBuf::from("refs/sdg.txt"),
        };
        assert_eq!(err.to_string(), "missing input: refs/sdg.txt");
        assert_eq!(err.kind(), "missing_input");

        let err = PipelineError::EmbeddingUnavailable {
            attempts: 3,
            last_error: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.to_string().contains("connection refused"));
    }
}
