// SPDX-License-Identifier: MIT OR Apache-2.0

//! Show the chunk plan for a document

use anyhow::{Context, Result};
use std::path::Path;

use super::{build_stopwords, preview};
use sdgalign::batch::load_document;
use sdgalign::config::Config;
use sdgalign::output::{colorize_detail, colorize_name, use_colors};

const PREVIEW_CHARS: usize = 24;

/// Run the chunks command
pub fn run(config: &Config, file: &Path, quiet: bool) -> Result<()> {
    let chunking = config.pipeline().chunk_config()?;
    let stopwords = build_stopwords(config);
    let doc = load_document(file).with_context(|| format!("Failed to load {}", file.display()))?;

    let filtered = stopwords.filter(&doc.text);
    let chunks = chunking.chunk(&filtered);

    let use_color = use_colors();
    println!(
        "{}: {} chunk(s) {}",
        colorize_name(&doc.name, use_color),
        chunks.len(),
        colorize_detail(
            &format!(
                "(size {}, overlap {}, {} chars after stopwords)",
                chunking.chunk_size(),
                chunking.overlap_size(),
                filtered.chars().count()
            ),
            use_color
        )
    );
    if quiet {
        return Ok(());
    }
    for (idx, chunk) in chunks.iter().enumerate() {
        println!(
            "  {:>4}  {:>4} chars  {}",
            idx + 1,
            chunk.chars().count(),
            colorize_detail(&preview(chunk, PREVIEW_CHARS), use_color)
        );
    }
    Ok(())
}
