// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text chunker for embedding generation.
//!
//! Documents are split into fixed-width character windows with optional
//! overlap. Widths count characters rather than bytes so that CJK text is
//! chunked the same way regardless of its UTF-8 encoding length.

use anyhow::{bail, Result};

/// Default number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Default overlap between consecutive chunks.
pub const DEFAULT_OVERLAP_SIZE: usize = 0;

/// Validated chunking parameters.
///
/// Construction through [`ChunkConfig::new`] guarantees
/// `0 <= overlap_size < chunk_size`, so the window always advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    overlap_size: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
        }
    }
}

impl ChunkConfig {
    /// Creates a new ChunkConfig with the specified parameters.
    pub fn new(chunk_size: usize, overlap_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            bail!("chunk_size must be greater than 0");
        }
        if overlap_size >= chunk_size {
            bail!(
                "overlap_size ({}) must be less than chunk_size ({})",
                overlap_size,
                chunk_size
            );
        }
        Ok(Self {
            chunk_size,
            overlap_size,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// Distance between consecutive window starts.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap_size
    }

    /// Splits `text` according to this configuration.
    pub fn chunk<'a>(&self, text: &'a str) -> Vec<&'a str> {
        chunk_text(text, self.chunk_size, self.overlap_size)
    }
}

/// Splits text into overlapping character windows.
///
/// Algorithm:
/// ```text
/// start = 0
/// step = chunk_size - overlap_size
/// while start < total_chars:
///   end = min(start + chunk_size, total_chars)
///   emit text[start..end]
///   start += step
/// ```
///
/// The last chunk may be shorter than `chunk_size`. Callers must keep
/// `overlap_size < chunk_size`; an invalid pair falls back to a step of one
/// character instead of looping forever.
pub fn chunk_text(text: &str, chunk_size: usize, overlap_size: usize) -> Vec<&str> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // Byte offset of every character boundary, plus the end of the text.
    let mut bounds: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
    let total_chars = bounds.len();
    bounds.push(text.len());

    let step = chunk_size.saturating_sub(overlap_size).max(1);
    let mut chunks = Vec::with_capacity(total_chars.div_ceil(step));
    let mut start = 0_usize;

    while start < total_chars {
        let end = (start + chunk_size).min(total_chars);
        chunks.push(&text[bounds[start]..bounds[end]]);
        start += step;
    }

    chunks
}
