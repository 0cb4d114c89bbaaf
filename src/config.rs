use std::path::Path;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "revu.toml";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub state_dir: Option<String>,
    pub prompt_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: String,
    pub api_key_env: String,
    /// Provider request timeout. 0 disables the timeout.
    pub timeout_secs: u64,
    pub state_dir: Option<String>,
    pub prompt_dir: Option<String>,
}

impl Config {
    /// Load configuration: an explicit `--config` path must exist; otherwise
    /// `revu.toml` in the working directory is used when present.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = if let Some(ref path) = cli.config {
            let path = Path::new(path);
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            parse_config(&std::fs::read_to_string(path)?)?
        } else {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                parse_config(&std::fs::read_to_string(path)?)?
            } else {
                ConfigFile::default()
            }
        };

        Ok(merge(file_config, cli))
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref model) = config.model
        && model.trim().is_empty()
    {
        return Err(Error::ConfigValidation("model must not be empty".to_string()));
    }
    if let Some(ref env) = config.api_key_env
        && env.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "api_key_env must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        model: cli
            .model
            .clone()
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        api_key_env: cli
            .api_key_env
            .clone()
            .or(file.api_key_env)
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
        timeout_secs: cli
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        state_dir: cli.state_dir.clone().or(file.state_dir),
        prompt_dir: cli.prompt_dir.clone().or(file.prompt_dir),
    }
}

/// Resolve the provider API key from the configured environment variable.
pub fn resolve_api_key(api_key_env: &str) -> Result<String> {
    std::env::var(api_key_env).map_err(|_| {
        Error::ConfigValidation(format!("provider API key not found in ${api_key_env}"))
    })
}
