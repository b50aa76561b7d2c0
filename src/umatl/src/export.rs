//! Writing documents to the export tree

use glob_match::glob_match;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::document::DialogueDocument;
use crate::Error;

/// What [`export`] did with a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Written,
    /// Destination existed and overwrite was off
    Skipped,
}

/// Remove control characters (code points below 32) from a title
pub fn clean_title(title: &str) -> String {
    title.chars().filter(|c| u32::from(*c) > 31).collect()
}

/// File name for an export: `003 (Title).json`, or `003.json` when the
/// title is empty after cleaning.
pub fn export_file_name(index: &str, title: &str) -> String {
    let title = clean_title(title);
    if title.is_empty() {
        format!("{index}.json")
    } else {
        format!("{index} ({title}).json")
    }
}

/// Every `<index>*.json` file in `dir`, sorted by name
fn existing_exports(dir: &Path, index: &str) -> Vec<PathBuf> {
    let pattern = format!("{index}*.json");
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| glob_match(&pattern, &e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// First `<index>*.json` file in `dir`, by name
pub fn find_existing_export(dir: &Path, index: &str) -> Option<PathBuf> {
    existing_exports(dir, index).into_iter().next()
}

/// Delete every `<index>*.json` file in `dir` except `keep`.
///
/// A retitled story is written under a new file name; the export under the
/// old title is removed so one index maps to one file.
pub fn remove_stale_exports(dir: &Path, index: &str, keep: &Path) -> Result<Vec<PathBuf>, Error> {
    let stale: Vec<PathBuf> = existing_exports(dir, index)
        .into_iter()
        .filter(|p| p != keep)
        .collect();

    for path in &stale {
        std::fs::remove_file(path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "removed superseded export");
    }
    Ok(stale)
}

/// Write `doc` to `path` unless it exists and `overwrite` is off
pub fn export(doc: &DialogueDocument, path: &Path, overwrite: bool) -> Result<ExportOutcome, Error> {
    if !overwrite && path.exists() {
        tracing::debug!(path = %path.display(), "export exists, not overwriting");
        return Ok(ExportOutcome::Skipped);
    }

    write_document(doc, path)?;
    tracing::info!(path = %path.display(), blocks = doc.blocks.len(), "exported");
    Ok(ExportOutcome::Written)
}

/// Serialize with 4-space indentation and write, creating parent directories
pub fn write_document(doc: &DialogueDocument, path: &Path) -> Result<(), Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, buf).map_err(io_err)
}
