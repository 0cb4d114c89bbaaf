use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Bug,
    Performance,
    Style,
    Suggestion,
    Security,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "BUG",
            Category::Performance => "PERFORMANCE",
            Category::Style => "STYLE",
            Category::Suggestion => "SUGGESTION",
            Category::Security => "SECURITY",
        }
    }
}

/// One review comment. `line` is 0 when the issue is general rather than
/// tied to a specific line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub line: u32,
    pub category: Category,
    pub comment: String,
    pub suggestion: String,
}

/// The response-shape constraint sent with every provider request: an array
/// of four-field objects with an enumerated category.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "line": {
                    "type": "INTEGER",
                    "description": "The line number where the issue is located. If the issue is general, use 0.",
                },
                "category": {
                    "type": "STRING",
                    "enum": ["BUG", "PERFORMANCE", "STYLE", "SUGGESTION", "SECURITY"],
                    "description": "The category of the feedback.",
                },
                "comment": {
                    "type": "STRING",
                    "description": "A concise explanation of the issue.",
                },
                "suggestion": {
                    "type": "STRING",
                    "description": "A code snippet or clear text suggesting the improvement.",
                },
            },
            "required": ["line", "category", "comment", "suggestion"],
        },
    })
}

/// Normalize a raw provider reply into feedback items.
///
/// An empty (trimmed) reply means "no issues", not an error. Markdown code
/// fences are stripped before parsing since models sometimes wrap JSON in
/// them despite instructions.
pub fn parse_feedback(raw: &str) -> Result<Vec<FeedbackItem>> {
    let json = strip_markdown_fences(raw);
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| Error::MalformedResponse(format!("response is not valid JSON: {e}")))?;

    if !value.is_array() {
        return Err(Error::MalformedResponse(
            "expected a JSON array of feedback items".to_string(),
        ));
    }

    let items: Vec<FeedbackItem> = serde_json::from_value(value).map_err(|e| {
        Error::MalformedResponse(format!("feedback item has an unexpected shape: {e}"))
    })?;

    validate_items(&items)?;
    Ok(items)
}

/// Reject items the requested schema constraint should have ruled out but the
/// provider violated anyway.
fn validate_items(items: &[FeedbackItem]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if item.comment.trim().is_empty() {
            return Err(Error::MalformedResponse(format!(
                "feedback item {i} has an empty comment"
            )));
        }
        if item.suggestion.trim().is_empty() {
            return Err(Error::MalformedResponse(format!(
                "feedback item {i} has an empty suggestion"
            )));
        }
    }
    Ok(())
}

/// Remove markdown code fences from a string, returning the inner content.
/// Handles ` ```json `, ` ``` `, and bare JSON.
fn strip_markdown_fences(input: &str) -> String {
    let trimmed = input.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the optional language tag (e.g. "json") on the opening fence line
        let after_tag = if let Some(pos) = rest.find('\n') {
            &rest[pos + 1..]
        } else {
            return String::new();
        };

        if let Some(pos) = after_tag.rfind("```") {
            return after_tag[..pos].trim().to_string();
        }
        // No closing fence — return everything after opening
        return after_tag.trim().to_string();
    }

    trimmed.to_string()
}
