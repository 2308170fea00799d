// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword TF-IDF over a corpus folder

use anyhow::{bail, Context, Result};
use std::path::Path;

use super::{build_stopwords, resolve_format};
use crate::cli::CliTableFormat;
use sdgalign::config::Config;
use sdgalign::keywords::{keyword_tfidf, load_corpus, load_keywords, Segmenter};
use sdgalign::output::{colorize_path, success_mark, use_colors};
use sdgalign::table::{Cell, Table};

/// Run the keywords command
pub fn run(
    config: &Config,
    keywords: &Path,
    corpus: &Path,
    output: &Path,
    format: Option<CliTableFormat>,
    quiet: bool,
) -> Result<()> {
    let format = resolve_format(format, output, config)?;
    let stopwords = build_stopwords(config);
    let list = load_keywords(keywords, &stopwords)
        .with_context(|| format!("Failed to read keywords from {}", keywords.display()))?;
    if list.is_empty() {
        bail!("No keywords found in {}", keywords.display());
    }

    let segmenter = Segmenter::new(&list);
    let docs = load_corpus(corpus, &segmenter, &stopwords)
        .with_context(|| format!("Failed to read corpus {}", corpus.display()))?;
    let scores = keyword_tfidf(&list, &docs);

    let mut table = Table::new(["keyword", "tfidf", "idf", "doc_freq"]);
    for score in &scores {
        table.push_row(vec![
            Cell::from(score.keyword.as_str()),
            Cell::from(score.tfidf),
            Cell::from(score.idf),
            Cell::from(score.doc_freq),
        ]);
    }
    table.write(output, format)?;

    if !quiet {
        let present = scores.iter().filter(|s| s.present()).count();
        println!(
            "{} {} of {} keyword(s) present in {} document(s) -> {}",
            success_mark(use_colors()),
            present,
            scores.len(),
            docs.len(),
            colorize_path(&output.display().to_string(), use_colors())
        );
    }
    Ok(())
}
