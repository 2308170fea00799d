// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading plain-text documents from disk.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::errors::PipelineError;

/// A named unit of text. The name is the file stem.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

/// Stable identifier for a document path: its file stem.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Lists `*.txt` files directly inside `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 => {
                // dangling symlink or unreadable entry inside the folder
                warn!("skipping {}: {}", err.path().unwrap_or(dir).display(), err);
                continue;
            }
            Err(err) => {
                return Err(PipelineError::Io {
                    path: dir.to_path_buf(),
                    source: err.into(),
                })
            }
        };
        if entry.file_type().is_file() && is_txt(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Reads a UTF-8 document. A leading byte-order mark is dropped.
///
/// Empty or whitespace-only files fail with
/// [`PipelineError::EmptyContent`].
pub fn load_document(path: &Path) -> Result<Document, PipelineError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            PipelineError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut text = String::from_utf8(bytes).map_err(|_| PipelineError::DecodeError {
        path: path.to_path_buf(),
    })?;
    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }

    if text.trim().is_empty() {
        return Err(PipelineError::EmptyContent {
            path: path.to_path_buf(),
        });
    }

    Ok(Document {
        name: document_name(path),
        path: path.to_path_buf(),
        text,
    })
}
