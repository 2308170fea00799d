// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch scoring of a folder of candidate documents.
//!
//! Every `*.txt` file in the folder is scored against the reference
//! vectors. A document that fails (unreadable, empty, no embeddings) is
//! recorded as skipped and the batch moves on.

pub mod documents;
pub mod references;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::embedding::{embed_document, ChunkConfig, EmbeddingClient, EmbeddingProvider};
use crate::errors::PipelineError;
use crate::similarity::{score_against, score_chunks_against, NamedEmbedding};
use crate::stopwords::StopwordSet;
use crate::table::{Cell, Table};

pub use documents::{document_name, list_documents, load_document, Document};
pub use references::{
    compare_columns, discover_references, load_references, reference_name, ReferenceSource,
    TOTAL_REFERENCE,
};

/// Scoring granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Average of per-chunk similarities
    #[default]
    Chunked,
    /// One similarity between the averaged document vector and each reference
    Document,
}

/// Score of one document against one reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceScore {
    pub reference: String,
    pub similarity: f32,
    /// Chunks behind the score (scored chunks, or chunks in the document vector).
    pub chunks: usize,
}

/// All scores for one document, in reference order.
#[derive(Debug, Clone)]
pub struct DocumentScores {
    pub name: String,
    pub scores: Vec<ReferenceScore>,
}

impl DocumentScores {
    /// Human-readable chunk counts, e.g. `total=12; sdg1=12`.
    pub fn chunk_info(&self) -> String {
        self.scores
            .iter()
            .map(|s| format!("{}={}", s.reference, s.chunks))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn similarity(&self, reference: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|s| s.reference == reference)
            .map(|s| s.similarity)
    }
}

/// A document left out of the results, with the reason.
#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rows: Vec<DocumentScores>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchReport {
    /// Results table: `document`, one column per reference, `chunk_info`.
    pub fn to_table(&self, references: &[NamedEmbedding]) -> Table {
        let mut headers = vec!["document".to_string()];
        headers.extend(references.iter().map(|r| r.name.clone()));
        headers.push("chunk_info".to_string());

        let mut table = Table::new(headers);
        for row in &self.rows {
            let mut cells: Vec<Cell> = vec![row.name.as_str().into()];
            for reference in references {
                cells.push(row.similarity(&reference.name).unwrap_or(0.0).into());
            }
            cells.push(row.chunk_info().into());
            table.push_row(cells);
        }
        table
    }
}

/// Scores candidate documents against a fixed set of references.
pub struct BatchDriver<'a, P> {
    client: &'a mut EmbeddingClient<P>,
    references: &'a [NamedEmbedding],
    stopwords: &'a StopwordSet,
    chunking: ChunkConfig,
    mode: ScoreMode,
    progress: bool,
}

impl<'a, P: EmbeddingProvider> BatchDriver<'a, P> {
    pub fn new(
        client: &'a mut EmbeddingClient<P>,
        references: &'a [NamedEmbedding],
        stopwords: &'a StopwordSet,
        chunking: ChunkConfig,
    ) -> Self {
        Self {
            client,
            references,
            stopwords,
            chunking,
            mode: ScoreMode::default(),
            progress: false,
        }
    }

    pub fn with_mode(mut self, mode: ScoreMode) -> Self {
        self.mode = mode;
        self
    }

    /// Show a progress bar on stderr while running.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Scores one loaded document.
    pub fn score_document(&mut self, doc: &Document) -> Result<DocumentScores, PipelineError> {
        let scores = match self.mode {
            ScoreMode::Document => {
                let embedded =
                    embed_document(self.client, &doc.text, self.stopwords, &self.chunking)?;
                score_against(&embedded.embedding, self.references)
                    .into_iter()
                    .map(|(reference, similarity)| (reference, similarity, embedded.chunks))
                    .collect::<Vec<_>>()
            }
            ScoreMode::Chunked => score_chunks_against(
                self.client,
                &doc.text,
                self.references,
                self.stopwords,
                &self.chunking,
            )
            .into_iter()
            .map(|(reference, score)| (reference, score.similarity, score.chunks))
            .collect(),
        };

        let mut ordered = Vec::with_capacity(self.references.len());
        for reference in self.references {
            if let Some((name, similarity, chunks)) =
                scores.iter().find(|(name, _, _)| *name == reference.name)
            {
                ordered.push(ReferenceScore {
                    reference: name.clone(),
                    similarity: *similarity,
                    chunks: *chunks,
                });
            }
        }

        if ordered.iter().all(|s| s.chunks == 0) {
            warn!("{}: no chunk could be scored, similarities are 0.0", doc.name);
        }

        Ok(DocumentScores {
            name: doc.name.clone(),
            scores: ordered,
        })
    }

    /// Loads and scores one file.
    pub fn process_path(&mut self, path: &Path) -> Result<DocumentScores, PipelineError> {
        let doc = load_document(path)?;
        self.score_document(&doc)
    }

    /// Scores every `*.txt` file in `dir`.
    ///
    /// Only a missing folder is an error; per-document failures end up in
    /// [`BatchReport::skipped`].
    pub fn run(&mut self, dir: &Path) -> Result<BatchReport, PipelineError> {
        let files = list_documents(dir)?;
        info!("scoring {} document(s) from {}", files.len(), dir.display());

        let pb = if self.progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} documents | {msg}")
                    .expect("valid progress bar template")
                    .progress_chars("##."),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut report = BatchReport::default();
        for path in files {
            pb.set_message(document_name(&path));
            match self.process_path(&path) {
                Ok(row) => {
                    info!("{}: {}", row.name, row.chunk_info());
                    report.rows.push(row);
                }
                Err(error) => {
                    warn!("skipping {}: {}", path.display(), error);
                    report.skipped.push(SkippedDocument { path, error });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(report)
    }
}
