// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// sdgalign - Score planning documents against SDG reference texts
///
/// Documents are chunked, embedded through an embedding model, and compared
/// with reference embeddings by cosine similarity.
#[derive(Parser, Debug)]
#[command(name = "sdgalign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to .sdgalignrc.toml or ~/.config/sdgalign/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress progress bars and summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for result tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliTableFormat {
    Csv,
    Json,
    /// Excel workbook
    Xlsx,
}

/// Scoring granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliScoreMode {
    /// Average of per-chunk similarities
    #[default]
    Chunked,
    /// Averaged document vector against each reference
    Document,
}

/// Embedding provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliProvider {
    /// Ollama-compatible HTTP service
    Ollama,
    /// External command (JSON over stdin/stdout)
    Command,
    /// In-process fastembed model
    Builtin,
    /// Offline feature hashing
    Hashing,
}

/// Options that override the embedding and chunking configuration
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Embedding provider
    #[arg(long, value_enum, help_heading = "Embedding")]
    pub provider: Option<CliProvider>,

    /// Embedding model name
    #[arg(long, help_heading = "Embedding")]
    pub model: Option<String>,

    /// Attempts per chunk before giving up
    #[arg(long, help_heading = "Embedding")]
    pub max_retries: Option<usize>,

    /// Pause between attempts in milliseconds
    #[arg(long, help_heading = "Embedding")]
    pub retry_delay_ms: Option<u64>,

    /// Characters per chunk
    #[arg(long, help_heading = "Chunking")]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long, help_heading = "Chunking")]
    pub overlap: Option<usize>,

    /// Stopword list file (repeatable, added to configured lists)
    #[arg(long = "stopwords", help_heading = "Chunking")]
    pub stopwords: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every .txt document in a folder against reference texts
    Score {
        /// Folder of candidate .txt documents
        candidates: PathBuf,

        /// Reference file, or folder holding sdg.txt and per-goal files
        #[arg(short, long)]
        references: PathBuf,

        /// Column name when --references is a single file
        #[arg(long, default_value = "total")]
        reference_name: String,

        /// Output table path
        #[arg(short, long, default_value = "similarity_result.csv")]
        output: PathBuf,

        /// Output format (inferred from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<CliTableFormat>,

        /// Scoring granularity
        #[arg(long, value_enum)]
        mode: Option<CliScoreMode>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the document-level similarity of two text files
    Compare {
        /// First document
        first: PathBuf,

        /// Second document
        second: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show how a document would be chunked, without embedding it
    Chunks {
        /// Document to inspect
        file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Corpus-level TF-IDF for a keyword list
    Keywords {
        /// Keyword list (comma or whitespace separated)
        #[arg(short, long)]
        keywords: PathBuf,

        /// Folder of .txt documents
        #[arg(short, long)]
        corpus: PathBuf,

        /// Output table path
        #[arg(short, long, default_value = "keyword_tfidf.csv")]
        output: PathBuf,

        /// Output format (inferred from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<CliTableFormat>,

        /// Stopword list file (repeatable, added to configured lists)
        #[arg(long = "stopwords")]
        stopwords: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
