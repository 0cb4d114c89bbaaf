use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("AI provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("the AI returned an invalid review format: {0}")]
    MalformedResponse(String),

    #[error("history error: {0}")]
    History(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("review failed unexpectedly: {0}")]
    UnknownReview(String),
}

pub type Result<T> = std::result::Result<T, Error>;
