// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - turns text into unit-norm vectors
//!
//! Chunking, provider access with retry, and aggregation of chunk vectors
//! into a single document vector.

pub mod aggregate;
pub mod chunker;
pub mod client;
pub mod provider;
pub mod vector;

pub use aggregate::{embed_document, DocumentEmbedding};
pub use chunker::{chunk_text, ChunkConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP_SIZE};
pub use client::{EmbeddingClient, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
pub use provider::{
    create_provider, CommandProvider, EmbeddingProvider, HashingProvider, OllamaProvider,
    RawEmbedding, DEFAULT_HASHING_DIM, DEFAULT_OLLAMA_HOST,
};
#[cfg(not(all(target_os = "macos", target_arch = "x86_64")))]
pub use provider::FastEmbedder;
pub use vector::{l2_norm, Embedding};
