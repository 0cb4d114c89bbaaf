use crate::error::{Error, Result};
use crate::review::ReviewResult;

/// Render one file's feedback as a human-readable Markdown document.
pub fn feedback_markdown(result: &ReviewResult) -> String {
    let mut doc = format!("# Review: {} ({})\n\n", result.filename, result.language);

    if result.feedback.is_empty() {
        doc.push_str("No issues found.\n");
        return doc;
    }

    for item in &result.feedback {
        let location = if item.line == 0 {
            "general".to_string()
        } else {
            format!("line {}", item.line)
        };
        doc.push_str(&format!(
            "## {} ({location})\n\n{}\n\n**Suggestion:**\n\n```\n{}\n```\n\n",
            item.category.as_str(),
            item.comment,
            item.suggestion
        ));
    }

    doc
}

/// Render one file's feedback as raw JSON of the item sequence.
pub fn feedback_json(result: &ReviewResult) -> Result<String> {
    serde_json::to_string_pretty(&result.feedback)
        .map_err(|e| Error::Export(format!("failed to serialize feedback: {e}")))
}
