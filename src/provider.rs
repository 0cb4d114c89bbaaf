use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::feedback::response_schema;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Near-deterministic output for analysis.
const TEMPERATURE: f64 = 0.2;

/// The outbound side of the review contract: one logical "generate structured
/// content" operation. Implementations must be safe to invoke concurrently
/// for independent prompts.
pub trait ReviewProvider {
    fn generate(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model,
            timeout,
        }
    }

    /// Point the client at a different base URL. Used by tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Build the request body: the prompt plus the output-shape constraint.
    pub fn build_request_body(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            },
        })
    }

    fn generate_blocking(&self, prompt: &str) -> Result<String> {
        let body = Self::build_request_body(prompt);
        let url = self.url();
        debug!(model = self.model, "calling provider");

        let mut request = ureq::post(&url)
            .set("x-goog-api-key", &self.api_key)
            .set("Content-Type", "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send_json(&body).map_err(classify_error)?;

        let reply: GenerateContentResponse = response
            .into_json()
            .map_err(|e| Error::UnknownReview(format!("failed to read provider response: {e}")))?;

        extract_text(reply)
    }
}

impl ReviewProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let client = self.clone();
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || client.generate_blocking(&prompt))
            .await
            .map_err(|e| Error::UnknownReview(format!("provider task failed: {e}")))?
    }
}

/// HTTP status and transport failures both mean the provider could not be
/// reached usefully; the user is told to retry. No automatic retry here.
fn classify_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, _) => {
            Error::ProviderUnavailable(format!("provider returned HTTP {code}"))
        }
        ureq::Error::Transport(t) => Error::ProviderUnavailable(format!("transport error: {t}")),
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

fn extract_text(reply: GenerateContentResponse) -> Result<String> {
    let candidate = reply
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnknownReview("provider response contained no candidates".into()))?;

    let content = candidate
        .content
        .ok_or_else(|| Error::UnknownReview("provider candidate contained no content".into()))?;

    Ok(content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join(""))
}
