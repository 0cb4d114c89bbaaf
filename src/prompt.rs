use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::language::Language;

const DEFAULT_REVIEW: &str = include_str!("default_prompts/review.md");

/// Known template variable names for validation.
const KNOWN_VARIABLES: &[&str] = &["language", "code"];

/// Prompt template engine with an embedded default and user overrides.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    override_dir: Option<String>,
}

impl PromptEngine {
    pub fn new(override_dir: Option<String>) -> Self {
        Self { override_dir }
    }

    /// Load the review prompt template. A `review.md` in the override
    /// directory takes precedence over the embedded default.
    pub fn load_template(&self) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = Path::new(dir).join("review.md");
            if path.exists() {
                return std::fs::read_to_string(&path).map_err(|e| {
                    Error::Prompt(format!(
                        "failed to read override template {}: {e}",
                        path.display()
                    ))
                });
            }
        }

        Ok(DEFAULT_REVIEW.to_string())
    }

    /// Render the review directive for one (code, language) pair.
    pub fn review_prompt(&self, language: Language, code: &str) -> Result<String> {
        let template = self.load_template()?;
        let mut vars = HashMap::new();
        vars.insert("language".to_string(), language.as_str().to_string());
        vars.insert("code".to_string(), code.to_string());
        render_template(&template, &vars)
    }
}

/// Render a template string by substituting `{{variable}}` placeholders.
/// Errors on unknown variables (strict mode).
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // consume second {
            let mut var_name = String::new();
            let mut found_close = false;

            while let Some(c2) = chars.next() {
                if c2 == '}' && chars.peek() == Some(&'}') {
                    chars.next(); // consume second }
                    found_close = true;
                    break;
                }
                var_name.push(c2);
            }

            if !found_close {
                return Err(Error::Prompt(format!(
                    "unclosed template variable: {{{{{var_name}"
                )));
            }

            let var_name = var_name.trim();
            if !KNOWN_VARIABLES.contains(&var_name) {
                return Err(Error::Prompt(format!(
                    "unknown template variable: {var_name}"
                )));
            }

            match vars.get(var_name) {
                Some(value) => result.push_str(value),
                None => {
                    return Err(Error::Prompt(format!(
                        "missing value for template variable: {var_name}"
                    )));
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}
