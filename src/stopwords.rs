// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stopword lists and whitespace-token filtering.
//!
//! Filtering splits on whitespace only. Contiguous CJK text without spaces
//! passes through untouched unless a stopword happens to be space-delimited.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Union of one or more stopword lists. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and unions the given stopword files.
    ///
    /// Missing files are skipped silently. Files that exist but cannot be
    /// read as UTF-8 are reported and contribute nothing.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut set = Self::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!("stopword list {} not found, skipping", path.display());
                continue;
            }
            match std::fs::read(path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => {
                        let before = set.len();
                        set.extend(content.lines());
                        debug!(
                            "loaded {} stopwords from {}",
                            set.len() - before,
                            path.display()
                        );
                    }
                    Err(_) => warn!("stopword list {} is not valid UTF-8, skipping", path.display()),
                },
                Err(err) => warn!("failed to read stopword list {}: {}", path.display(), err),
            }
        }
        set
    }

    /// Adds words to the set, stripping each and ignoring blanks.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                self.words.insert(word.to_string());
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Removes whitespace-delimited tokens found in the set and rejoins the
    /// rest with single spaces. An empty set returns the text unchanged.
    pub fn filter(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        text.split_whitespace()
            .filter(|token| !self.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn filter_removes_listed_tokens() {
        let set: StopwordSet = ["B"].into_iter().collect();
        assert_eq!(set.filter("A B C"), "A C");
    }

    #[test]
    fn filter_collapses_whitespace() {
        let set: StopwordSet = ["的"].into_iter().collect();
        assert_eq!(set.filter("城市  的\n建设\t规划"), "城市 建设 规划");
    }

    #[test]
    fn filter_leaves_unspaced_text_alone() {
        let set: StopwordSet = ["发展"].into_iter().collect();
        assert_eq!(set.filter("经济发展"), "经济发展");
    }

    #[test]
    fn empty_set_is_identity() {
        let set = StopwordSet::new();
        assert_eq!(set.filter("  keep   spacing "), "  keep   spacing ");
    }

    #[test]
    fn load_unions_files_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("hit_stop.txt");
        let second = dir.path().join("custom_stop.txt");
        std::fs::write(&first, "的\n  了  \n\n").unwrap();
        std::fs::write(&second, "了\n原则同意\n").unwrap();

        let set = StopwordSet::load(&[
            first,
            dir.path().join("missing.txt"),
            second,
        ]);

        assert_eq!(set.len(), 3);
        assert!(set.contains("的"));
        assert!(set.contains("了"));
        assert!(set.contains("原则同意"));
    }

    #[test]
    fn load_skips_undecodable_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.txt");
        let good = dir.path().join("good.txt");
        std::fs::write(&bad, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        std::fs::write(&good, "and\n").unwrap();

        let set = StopwordSet::load(&[bad, good]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("and"));
    }
}
