use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::language::Language;

/// One file submitted for review. Snapshotted into history at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInput {
    pub filename: String,
    pub code: String,
    pub language: Language,
}

/// Files read from disk plus the paths that were skipped as unsupported.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub files: Vec<FileInput>,
    pub skipped: Vec<String>,
}

/// Read a batch of paths into review inputs.
///
/// Paths with an unrecognized extension are collected into `skipped` so the
/// caller can notify the user; they do not fail the rest of the batch.
/// Unreadable files are an error.
pub fn load_batch<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedBatch> {
    let mut batch = LoadedBatch::default();

    for path in paths {
        let path = path.as_ref();
        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension);

        let Some(language) = language else {
            warn!(path = %path.display(), "unsupported file type, skipping");
            batch.skipped.push(path.display().to_string());
            continue;
        };

        let code = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        batch.files.push(FileInput {
            filename,
            code,
            language,
        });
    }

    Ok(batch)
}
