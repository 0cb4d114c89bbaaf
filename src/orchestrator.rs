use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::files::FileInput;
use crate::history::{HistoryStore, ReviewSession};
use crate::provider::ReviewProvider;
use crate::review::{ReviewResult, Reviewer};

/// Outcome of a completed batch. `clean` is set when every file came back
/// with empty feedback.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<ReviewResult>,
    pub clean: bool,
}

/// Coordinates one review cycle across a batch of files: per-file fan-out,
/// aggregation in input order, and the history snapshot on success.
pub struct Orchestrator<P> {
    reviewer: Reviewer<P>,
    history: HistoryStore,
}

impl<P> Orchestrator<P>
where
    P: ReviewProvider + Clone + Send + Sync + 'static,
{
    pub fn new(reviewer: Reviewer<P>, history: HistoryStore) -> Self {
        Self { reviewer, history }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Review every file in the batch concurrently and wait for all outcomes.
    ///
    /// Any single failure fails the whole batch with that file's error (first
    /// in input order) and nothing is stored; on success one session is
    /// appended to history.
    pub async fn run_batch(&self, files: &[FileInput]) -> Result<BatchReport> {
        if files.is_empty() || files.iter().all(|f| f.code.trim().is_empty()) {
            return Err(Error::Validation(
                "provide code in at least one file".to_string(),
            ));
        }

        info!(count = files.len(), "starting review batch");

        let mut join_set = JoinSet::new();
        for (index, file) in files.iter().cloned().enumerate() {
            let reviewer = self.reviewer.clone();
            join_set.spawn(async move {
                let outcome = reviewer.review(&file.code, file.language).await;
                (index, file, outcome)
            });
        }

        // Every outcome is captured as a value and collected before the batch
        // is judged, so a failing file cannot discard completed siblings.
        let mut collected = Vec::with_capacity(files.len());
        while let Some(joined) = join_set.join_next().await {
            let entry =
                joined.map_err(|e| Error::UnknownReview(format!("review task failed: {e}")))?;
            collected.push(entry);
        }
        collected.sort_by_key(|(index, _, _)| *index);

        let mut results = Vec::with_capacity(collected.len());
        for (_, file, outcome) in collected {
            match outcome {
                Ok(feedback) => results.push(ReviewResult {
                    filename: file.filename,
                    language: file.language.to_string(),
                    feedback,
                }),
                Err(e) => {
                    warn!(filename = file.filename, error = %e, "file review failed");
                    return Err(e);
                }
            }
        }

        let session = ReviewSession::new(files, &results)?;
        self.history.append(session)?;

        let clean = results.iter().all(|r| r.feedback.is_empty());
        info!(files = results.len(), clean, "batch complete");
        Ok(BatchReport { results, clean })
    }
}
