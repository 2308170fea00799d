// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus-level TF-IDF weights for a fixed keyword list.
//!
//! Documents are segmented with jieba, with the keywords added to its
//! dictionary so multi-character Chinese keywords survive as whole tokens.
//! For each keyword:
//!
//! ```text
//! idf   = ln((N + 1) / (df + 0.5))
//! tf    = count(keyword, doc) / tokens(doc)
//! score = sum(tf * idf over docs) / N
//! ```

use jieba_rs::Jieba;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::batch::{list_documents, load_document};
use crate::errors::PipelineError;
use crate::stopwords::StopwordSet;

/// TF-IDF result for one keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScore {
    pub keyword: String,
    /// Mean TF-IDF across the corpus.
    pub tfidf: f64,
    pub idf: f64,
    /// Documents containing the keyword at least once.
    pub doc_freq: usize,
}

impl KeywordScore {
    /// Whether the keyword occurs anywhere in the corpus.
    pub fn present(&self) -> bool {
        self.doc_freq > 0
    }
}

/// Reads a keyword list. Keywords are separated by commas (ASCII or
/// full-width) or whitespace; duplicates and stopwords are dropped.
pub fn load_keywords(path: &Path, stopwords: &StopwordSet) -> Result<Vec<String>, PipelineError> {
    let doc = load_document(path)?;
    Ok(parse_keywords(&doc.text, stopwords))
}

/// Splits keyword text, keeping first-occurrence order.
pub fn parse_keywords(text: &str, stopwords: &StopwordSet) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c == ',' || c == '，' || c.is_whitespace())
        .map(str::trim)
        .filter(|w| !w.is_empty() && !stopwords.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

/// Dictionary weight given to keywords so jieba keeps them whole.
pub const KEYWORD_FREQ: usize = 1000;

/// Chinese word segmenter: jieba's default dictionary plus the keywords.
///
/// Whitespace tokens are dropped; punctuation stays as its own token.
pub struct Segmenter {
    jieba: Jieba,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Segmenter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segmenter = Self::default();
        for word in words {
            segmenter.add_word(word.as_ref());
        }
        segmenter
    }

    pub fn add_word(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.jieba.add_word(word, Some(KEYWORD_FREQ), None);
    }

    /// Splits `text` into tokens.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect()
    }

    /// Segments `text` and drops stopword tokens.
    pub fn tokenize(&self, text: &str, stopwords: &StopwordSet) -> Vec<String> {
        self.segment(text)
            .into_iter()
            .filter(|t| !stopwords.contains(t))
            .map(str::to_string)
            .collect()
    }
}

/// TF-IDF of each keyword over a tokenized corpus, in keyword order.
pub fn keyword_tfidf(keywords: &[String], corpus: &[Vec<String>]) -> Vec<KeywordScore> {
    let total_docs = corpus.len();
    let counts: Vec<HashMap<&str, usize>> = corpus
        .iter()
        .map(|doc| {
            let mut counts = HashMap::new();
            for token in doc {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    keywords
        .iter()
        .map(|keyword| {
            let doc_freq = counts
                .iter()
                .filter(|c| c.contains_key(keyword.as_str()))
                .count();
            let idf = ((total_docs as f64 + 1.0) / (doc_freq as f64 + 0.5)).ln();
            let total: f64 = corpus
                .iter()
                .zip(&counts)
                .filter(|(doc, _)| !doc.is_empty())
                .map(|(doc, c)| {
                    let tf = *c.get(keyword.as_str()).unwrap_or(&0) as f64 / doc.len() as f64;
                    tf * idf
                })
                .sum();
            let tfidf = if total_docs == 0 {
                0.0
            } else {
                total / total_docs as f64
            };
            KeywordScore {
                keyword: keyword.clone(),
                tfidf,
                idf,
                doc_freq,
            }
        })
        .collect()
}

/// Loads and tokenizes every `*.txt` file in `dir`. Unreadable or empty
/// files are skipped with a warning.
pub fn load_corpus(
    dir: &Path,
    segmenter: &Segmenter,
    stopwords: &StopwordSet,
) -> Result<Vec<Vec<String>>, PipelineError> {
    let mut corpus = Vec::new();
    for path in list_documents(dir)? {
        match load_document(&path) {
            Ok(doc) => {
                let tokens = segmenter.tokenize(&doc.text, stopwords);
                debug!("{}: {} tokens", doc.name, tokens.len());
                corpus.push(tokens);
            }
            Err(err) => warn!("skipping {}: {}", path.display(), err),
        }
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn parse_keywords_splits_and_dedups() {
        let stopwords: StopwordSet = ["发展"].into_iter().collect();
        let parsed = parse_keywords("生态文明, 绿色低碳，发展\n生态文明 海洋", &stopwords);
        assert_eq!(parsed, words(&["生态文明", "绿色低碳", "海洋"]));
    }

    #[test]
    fn segmenter_keeps_words_and_keywords_whole() {
        let segmenter = Segmenter::new(["生态文明", "海洋保护"]);
        let tokens = segmenter.segment("推进生态文明建设，加强海洋保护。");
        assert_eq!(
            tokens,
            vec!["推进", "生态文明", "建设", "，", "加强", "海洋保护", "。"]
        );
    }

    #[test]
    fn added_keyword_is_not_split() {
        let segmenter = Segmenter::new(["绿色低碳转型"]);
        let tokens = segmenter.segment("推动绿色低碳转型 发展");
        assert!(tokens.contains(&"绿色低碳转型"));
        assert!(tokens.iter().all(|t| !t.trim().is_empty()));
    }

    #[test]
    fn tokenize_drops_stopwords() {
        let segmenter = Segmenter::new(["城市建设"]);
        let stopwords: StopwordSet = ["的"].into_iter().collect();
        let tokens = segmenter.tokenize("城市建设的", &stopwords);
        assert_eq!(tokens, words(&["城市建设"]));
    }

    #[test]
    fn tfidf_matches_formula() {
        let corpus = vec![
            words(&["海洋", "保护", "海洋", "生态"]),
            words(&["城市", "建设"]),
            Vec::new(),
        ];
        let scores = keyword_tfidf(&words(&["海洋", "湿地"]), &corpus);

        let n = 3.0f64;
        let idf = ((n + 1.0) / 1.5).ln();
        assert_eq!(scores[0].doc_freq, 1);
        assert!((scores[0].idf - idf).abs() < 1e-12);
        assert!((scores[0].tfidf - (0.5 * idf) / n).abs() < 1e-12);
        assert!(scores[0].present());

        assert_eq!(scores[1].doc_freq, 0);
        assert!(!scores[1].present());
        assert_eq!(scores[1].tfidf, 0.0);
        assert!((scores[1].idf - (4.0f64 / 0.5).ln()).abs() < 1e-12);
    }

    #[test]
    fn empty_corpus_scores_zero() {
        let scores = keyword_tfidf(&words(&["海洋"]), &[]);
        assert_eq!(scores[0].tfidf, 0.0);
        assert!((scores[0].idf - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn corpus_loading_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "海洋保护").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        let keywords = dir.path().join("keywords.txt");
        std::fs::write(&keywords, "海洋保护").unwrap();

        let list = load_keywords(&keywords, &StopwordSet::new()).unwrap();
        let segmenter = Segmenter::new(&list);
        // keywords.txt itself sits in the corpus folder too
        let corpus = load_corpus(dir.path(), &segmenter, &StopwordSet::new()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.iter().all(|doc| doc == &words(&["海洋保护"])));
    }
}
