// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score a folder of candidate documents against the references

use anyhow::{Context, Result};
use std::path::Path;

use super::{build_client, build_stopwords, resolve_format};
use crate::cli::{CliScoreMode, CliTableFormat};
use sdgalign::batch::{discover_references, load_references, BatchDriver, ScoreMode};
use sdgalign::config::Config;
use sdgalign::output::{
    colorize_detail, colorize_name, colorize_path, colorize_score, success_mark, use_colors,
    warning_mark,
};

/// Run the score command
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    candidates: &Path,
    references: &Path,
    reference_name: &str,
    output: &Path,
    format: Option<CliTableFormat>,
    mode: Option<CliScoreMode>,
    quiet: bool,
) -> Result<()> {
    let format = resolve_format(format, output, config)?;
    let pipeline = config.pipeline();
    let chunking = pipeline.chunk_config()?;
    let stopwords = build_stopwords(config);
    let mut client = build_client(config)?;

    let sources = discover_references(references, reference_name)
        .with_context(|| format!("Failed to read references from {}", references.display()))?;
    let refs = load_references(&mut client, &sources, &stopwords, &chunking)?;

    let mode = match mode.unwrap_or_default() {
        CliScoreMode::Chunked => ScoreMode::Chunked,
        CliScoreMode::Document => ScoreMode::Document,
    };
    let report = BatchDriver::new(&mut client, &refs, &stopwords, chunking)
        .with_mode(mode)
        .with_progress(!quiet)
        .run(candidates)
        .with_context(|| format!("Failed to score {}", candidates.display()))?;

    let table = report.to_table(&refs);
    table.write(output, format)?;

    if quiet {
        return Ok(());
    }

    let use_color = use_colors();
    println!(
        "{} Scored {} document(s) against {} reference(s) -> {}",
        success_mark(use_color),
        report.rows.len(),
        refs.len(),
        colorize_path(&output.display().to_string(), use_color)
    );
    if let Some(first) = refs.first() {
        for row in &report.rows {
            let score = row.similarity(&first.name).unwrap_or(0.0);
            println!(
                "  {}  {} {}",
                colorize_name(&row.name, use_color),
                colorize_detail(&first.name, use_color),
                colorize_score(score, use_color)
            );
        }
    }
    for skipped in &report.skipped {
        println!(
            "{} Skipped {}: {}",
            warning_mark(use_color),
            colorize_path(&skipped.path.display().to_string(), use_color),
            skipped.error
        );
    }

    Ok(())
}
