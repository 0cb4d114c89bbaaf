use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::feedback::{FeedbackItem, parse_feedback};
use crate::language::Language;
use crate::prompt::PromptEngine;
use crate::provider::ReviewProvider;

/// The validated outcome for one file. Feedback keeps the order the provider
/// returned it; an empty list means "no issues found", which is distinct from
/// a failed review (a failure produces no result at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub filename: String,
    pub language: String,
    pub feedback: Vec<FeedbackItem>,
}

/// The request/response contract: one (code, language) pair in, one validated
/// feedback list out. Stateless; clones are cheap and independent, so a batch
/// can run many reviews concurrently.
#[derive(Debug, Clone)]
pub struct Reviewer<P> {
    provider: P,
    prompts: PromptEngine,
}

impl<P: ReviewProvider> Reviewer<P> {
    pub fn new(provider: P, prompts: PromptEngine) -> Self {
        Self { provider, prompts }
    }

    /// Review one snippet. Empty code is forwarded as-is; filtering empty
    /// files is the caller's concern.
    pub async fn review(&self, code: &str, language: Language) -> Result<Vec<FeedbackItem>> {
        let prompt = self.prompts.review_prompt(language, code)?;
        let raw = self.provider.generate(&prompt).await?;
        debug!(language = %language, reply_len = raw.len(), "provider replied");
        parse_feedback(&raw)
    }
}
