use clap::{Parser, Subcommand};

/// revu — AI code review from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "revu", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Source files to review (.js, .py, .ts, .java)
    pub files: Vec<String>,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// State directory for review history
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    /// Model to request from the provider (default: gemini-2.5-flash)
    #[arg(long)]
    pub model: Option<String>,

    /// Environment variable holding the provider API key (default: GEMINI_API_KEY)
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Provider request timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory with prompt template overrides
    #[arg(long)]
    pub prompt_dir: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Inspect or manage past review sessions
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Export one file's feedback from a stored session
    Export {
        /// Filename within the session (as submitted)
        filename: String,

        /// Session index (0 = most recent)
        #[arg(long, default_value_t = 0)]
        session: usize,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// List stored sessions (default)
    List,

    /// Display a stored session
    Show { index: usize },

    /// Delete a stored session
    Delete { index: usize },

    /// Delete all stored sessions
    Clear,
}
