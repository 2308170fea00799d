// SPDX-License-Identifier: MIT OR Apache-2.0

//! sdgalign - SDG alignment scoring library
//!
//! Shared modules for the sdgalign CLI tool: stopword filtering, chunked
//! embeddings, cosine similarity against reference texts, batch scoring and
//! keyword TF-IDF.

pub mod batch;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod keywords;
pub mod output;
pub mod similarity;
pub mod stopwords;
pub mod table;
