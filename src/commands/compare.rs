// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document-level similarity of two files

use anyhow::{Context, Result};
use std::path::Path;

use super::{build_client, build_stopwords};
use sdgalign::batch::load_document;
use sdgalign::config::Config;
use sdgalign::embedding::embed_document;
use sdgalign::output::{colorize_detail, colorize_name, colorize_score, use_colors};
use sdgalign::similarity::cosine_similarity;

/// Run the compare command
pub fn run(config: &Config, first: &Path, second: &Path, quiet: bool) -> Result<()> {
    let chunking = config.pipeline().chunk_config()?;
    let stopwords = build_stopwords(config);
    let mut client = build_client(config)?;

    let mut embedded = Vec::with_capacity(2);
    for path in [first, second] {
        let doc = load_document(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let embedding = embed_document(&mut client, &doc.text, &stopwords, &chunking)
            .with_context(|| format!("Failed to embed {}", path.display()))?;
        embedded.push((doc.name, embedding));
    }

    let similarity = cosine_similarity(&embedded[0].1.embedding, &embedded[1].1.embedding);
    if quiet {
        println!("{:.6}", similarity);
        return Ok(());
    }

    let use_color = use_colors();
    println!(
        "{} vs {}: {} {}",
        colorize_name(&embedded[0].0, use_color),
        colorize_name(&embedded[1].0, use_color),
        colorize_score(similarity, use_color),
        colorize_detail(
            &format!(
                "({} / {} chunks, {})",
                embedded[0].1.chunks,
                embedded[1].1.chunks,
                client.model_id()
            ),
            use_color
        )
    );
    Ok(())
}
