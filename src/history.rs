use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::files::FileInput;
use crate::review::ReviewResult;

/// Sessions kept on disk; older entries fall off the end.
pub const HISTORY_LIMIT: usize = 20;

/// A persisted record of one batch review: the file snapshot at submit time,
/// the results, and the creation instant. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub files_json: String,
    pub language_tag: String,
    pub results: Vec<ReviewResult>,
    pub timestamp: u64,
}

impl ReviewSession {
    pub fn new(files: &[FileInput], results: &[ReviewResult]) -> Result<Self> {
        let files_json = serde_json::to_string(files)
            .map_err(|e| Error::History(format!("failed to serialize file snapshot: {e}")))?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(Self {
            files_json,
            language_tag: "multi".to_string(),
            results: results.to_vec(),
            timestamp,
        })
    }

    /// Decode the file snapshot back into editable inputs.
    pub fn restore_files(&self) -> Result<Vec<FileInput>> {
        serde_json::from_str(&self.files_json)
            .map_err(|e| Error::History(format!("failed to load history: {e}")))
    }
}

/// Durable, capped log of past review sessions, most-recent-first, persisted
/// as JSON in `<state_dir>/history.json` after every mutation.
pub struct HistoryStore {
    state_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Default state directory relative to a working directory.
    pub fn default_dir(base: &Path) -> PathBuf {
        base.join(".revu")
    }

    fn history_file(&self) -> PathBuf {
        self.state_dir.join("history.json")
    }

    /// Load all sessions. A missing or corrupted file is treated as "no
    /// history" rather than an error.
    pub fn load(&self) -> Vec<ReviewSession> {
        let path = self.history_file();
        if !path.exists() {
            return Vec::new();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<ReviewSession>>(&content) {
                Ok(sessions) => sessions,
                Err(e) => {
                    warn!("corrupted history file {}: {e}, resetting", path.display());
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(
                    "failed to read history file {}: {e}, resetting",
                    path.display()
                );
                Vec::new()
            }
        }
    }

    fn save(&self, sessions: &[ReviewSession]) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir)
            .map_err(|e| Error::History(format!("failed to create state dir: {e}")))?;

        let content = serde_json::to_string_pretty(sessions)
            .map_err(|e| Error::History(format!("failed to serialize history: {e}")))?;

        std::fs::write(self.history_file(), content)
            .map_err(|e| Error::History(format!("failed to write history file: {e}")))?;

        Ok(())
    }

    /// Insert a session at the front and drop entries beyond the cap.
    pub fn append(&self, session: ReviewSession) -> Result<()> {
        let mut sessions = self.load();
        sessions.insert(0, session);
        sessions.truncate(HISTORY_LIMIT);
        self.save(&sessions)
    }

    /// Delete the session at `index` (0 = most recent).
    pub fn remove(&self, index: usize) -> Result<()> {
        let mut sessions = self.load();
        if index >= sessions.len() {
            return Err(Error::History(format!("no history entry at index {index}")));
        }
        sessions.remove(index);
        self.save(&sessions)
    }

    /// Empty the history.
    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }

    /// Decode the session at `index` back into its inputs and results.
    /// Never mutates the store, even when decoding fails.
    pub fn select(&self, index: usize) -> Result<(Vec<FileInput>, Vec<ReviewResult>)> {
        let sessions = self.load();
        let session = sessions
            .get(index)
            .ok_or_else(|| Error::History(format!("no history entry at index {index}")))?;
        let files = session.restore_files()?;
        Ok((files, session.results.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Category, FeedbackItem};
    use crate::language::Language;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, HistoryStore) {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("state"));
        (dir, store)
    }

    fn sample_files() -> Vec<FileInput> {
        vec![FileInput {
            filename: "a.py".to_string(),
            code: "print(1)".to_string(),
            language: Language::Python,
        }]
    }

    fn sample_results() -> Vec<ReviewResult> {
        vec![ReviewResult {
            filename: "a.py".to_string(),
            language: "python".to_string(),
            feedback: vec![FeedbackItem {
                line: 1,
                category: Category::Suggestion,
                comment: "use logging".to_string(),
                suggestion: "import logging".to_string(),
            }],
        }]
    }

    fn sample_session() -> ReviewSession {
        ReviewSession::new(&sample_files(), &sample_results()).unwrap()
    }

    #[test]
    fn test_load_empty_returns_no_sessions() {
        let (_dir, store) = test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_append_and_load_roundtrip() {
        let (_dir, store) = test_store();
        let session = sample_session();
        store.append(session.clone()).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], session);
    }

    #[test]
    fn test_corrupted_history_returns_empty() {
        let (_dir, store) = test_store();
        std::fs::create_dir_all(&store.state_dir).unwrap();
        std::fs::write(store.history_file(), "this is not valid json [[[").unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_append_inserts_at_front() {
        let (_dir, store) = test_store();
        let mut first = sample_session();
        first.language_tag = "first".to_string();
        let mut second = sample_session();
        second.language_tag = "second".to_string();

        store.append(first).unwrap();
        store.append(second).unwrap();

        let loaded = store.load();
        assert_eq!(loaded[0].language_tag, "second");
        assert_eq!(loaded[1].language_tag, "first");
    }

    #[test]
    fn test_append_caps_at_limit() {
        let (_dir, store) = test_store();
        for i in 0..25 {
            let mut session = sample_session();
            session.language_tag = format!("batch-{i}");
            store.append(session).unwrap();
        }

        let loaded = store.load();
        assert_eq!(loaded.len(), HISTORY_LIMIT);
        // Most recent first; the 5 oldest (batch-0..batch-4) are gone.
        assert_eq!(loaded[0].language_tag, "batch-24");
        assert_eq!(loaded[HISTORY_LIMIT - 1].language_tag, "batch-5");
        assert!(!loaded.iter().any(|s| s.language_tag == "batch-0"));
        assert!(!loaded.iter().any(|s| s.language_tag == "batch-4"));
    }

    #[test]
    fn test_remove_by_index() {
        let (_dir, store) = test_store();
        let mut first = sample_session();
        first.language_tag = "first".to_string();
        let mut second = sample_session();
        second.language_tag = "second".to_string();

        store.append(first).unwrap();
        store.append(second).unwrap();
        store.remove(0).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].language_tag, "first");
    }

    #[test]
    fn test_remove_out_of_range() {
        let (_dir, store) = test_store();
        store.append(sample_session()).unwrap();
        let err = store.remove(5).unwrap_err();
        assert!(err.to_string().contains("no history entry at index 5"));
        // Store untouched
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_clear() {
        let (_dir, store) = test_store();
        store.append(sample_session()).unwrap();
        store.append(sample_session()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_select_roundtrips_snapshot() {
        let (_dir, store) = test_store();
        store.append(sample_session()).unwrap();

        let (files, results) = store.select(0).unwrap();
        assert_eq!(files, sample_files());
        assert_eq!(results, sample_results());
    }

    #[test]
    fn test_select_out_of_range() {
        let (_dir, store) = test_store();
        assert!(store.select(0).is_err());
    }

    #[test]
    fn test_select_corrupt_snapshot_does_not_mutate() {
        let (_dir, store) = test_store();
        let mut session = sample_session();
        session.files_json = "{broken".to_string();
        store.append(session).unwrap();

        let err = store.select(0).unwrap_err();
        assert!(err.to_string().contains("failed to load history"));
        // Entry still present
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_history_survives_reload() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("state");

        {
            let store = HistoryStore::new(&state_path);
            store.append(sample_session()).unwrap();
        }

        {
            let store = HistoryStore::new(&state_path);
            assert_eq!(store.load().len(), 1);
        }
    }

    #[test]
    fn test_history_file_is_valid_json() {
        let (_dir, store) = test_store();
        store.append(sample_session()).unwrap();

        let content = std::fs::read_to_string(store.history_file()).unwrap();
        let _: serde_json::Value = serde_json::from_str(&content).unwrap();
    }

    #[test]
    fn test_session_timestamp_set() {
        let session = sample_session();
        assert!(session.timestamp > 0);
        assert_eq!(session.language_tag, "multi");
    }
}
