#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use revu::error::{Error, Result};
use revu::files::FileInput;
use revu::language::Language;
use revu::provider::ReviewProvider;

/// Canned reply for one matched prompt.
#[derive(Clone)]
pub enum Reply {
    /// Return this text as the provider output.
    Text(String),
    /// Return this text after a delay, to force out-of-order completion.
    DelayedText(u64, String),
    /// Fail with a transport-style error.
    Unavailable(String),
}

/// Provider that matches prompts by substring (the file's code is embedded in
/// the prompt) and replies per rule. Unmatched prompts get an empty array.
#[derive(Clone)]
pub struct ScriptedProvider {
    rules: Arc<Vec<(String, Reply)>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(rules: Vec<(&str, Reply)>) -> Self {
        Self {
            rules: Arc::new(
                rules
                    .into_iter()
                    .map(|(needle, reply)| (needle.to_string(), reply))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReviewProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (needle, reply) in self.rules.iter() {
            if prompt.contains(needle) {
                return match reply {
                    Reply::Text(text) => Ok(text.clone()),
                    Reply::DelayedText(millis, text) => {
                        tokio::time::sleep(Duration::from_millis(*millis)).await;
                        Ok(text.clone())
                    }
                    Reply::Unavailable(message) => {
                        Err(Error::ProviderUnavailable(message.clone()))
                    }
                };
            }
        }
        Ok("[]".to_string())
    }
}

pub fn file(filename: &str, code: &str, language: Language) -> FileInput {
    FileInput {
        filename: filename.to_string(),
        code: code.to_string(),
        language,
    }
}

pub fn bug_item_json(comment: &str) -> String {
    format!(
        r#"[{{"line": 1, "category": "BUG", "comment": "{comment}", "suggestion": "fix it"}}]"#
    )
}
