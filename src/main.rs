use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use revu::cli::{Cli, CliCommand, HistoryAction};
use revu::config::{self, Config};
use revu::error::{Error, Result};
use revu::export;
use revu::files;
use revu::history::HistoryStore;
use revu::orchestrator::Orchestrator;
use revu::prompt::PromptEngine;
use revu::provider::GeminiClient;
use revu::review::Reviewer;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let history = HistoryStore::new(state_dir(&config));

    let outcome = match cli.command.clone() {
        Some(CliCommand::History { action }) => {
            run_history(&history, action.unwrap_or(HistoryAction::List))
        }
        Some(CliCommand::Export {
            filename,
            session,
            format,
            output,
        }) => run_export(&history, &filename, session, &format, output.as_deref()),
        None => run_review(&cli, &config, history).await,
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn state_dir(config: &Config) -> PathBuf {
    match config.state_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            HistoryStore::default_dir(&cwd)
        }
    }
}

async fn run_review(cli: &Cli, config: &Config, history: HistoryStore) -> Result<()> {
    if cli.files.is_empty() {
        return Err(Error::Validation(
            "provide code in at least one file".to_string(),
        ));
    }

    let batch = files::load_batch(&cli.files)?;
    for skipped in &batch.skipped {
        eprintln!("skipping unsupported file type: {skipped}");
    }

    let api_key = config::resolve_api_key(&config.api_key_env)?;
    let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
    let provider = GeminiClient::new(api_key, config.model.clone(), timeout);
    let reviewer = Reviewer::new(provider, PromptEngine::new(config.prompt_dir.clone()));
    let orchestrator = Orchestrator::new(reviewer, history);

    info!(model = config.model, files = batch.files.len(), "reviewing");
    let report = orchestrator.run_batch(&batch.files).await?;

    for result in &report.results {
        println!("{}", export::feedback_markdown(result));
    }
    if report.clean {
        println!("No issues found in any file. Great job!");
    }

    Ok(())
}

fn run_history(store: &HistoryStore, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let sessions = store.load();
            if sessions.is_empty() {
                println!("No review history.");
                return Ok(());
            }
            for (index, session) in sessions.iter().enumerate() {
                let findings: usize = session.results.iter().map(|r| r.feedback.len()).sum();
                println!(
                    "{index}: {} file(s), {findings} finding(s), at {}",
                    session.results.len(),
                    session.timestamp
                );
            }
            Ok(())
        }
        HistoryAction::Show { index } => {
            let (files, results) = store.select(index)?;
            let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
            println!("Files: {}\n", names.join(", "));
            for result in &results {
                println!("{}", export::feedback_markdown(result));
            }
            Ok(())
        }
        HistoryAction::Delete { index } => {
            store.remove(index)?;
            println!("History deleted.");
            Ok(())
        }
        HistoryAction::Clear => {
            store.clear()?;
            println!("All history cleared.");
            Ok(())
        }
    }
}

fn run_export(
    store: &HistoryStore,
    filename: &str,
    session: usize,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    let (_files, results) = store.select(session)?;
    let result = results
        .iter()
        .find(|r| r.filename == filename)
        .ok_or_else(|| {
            Error::Validation(format!("no results for file {filename} in session {session}"))
        })?;

    let rendered = match format {
        "markdown" | "md" => export::feedback_markdown(result),
        "json" => export::feedback_json(result)?,
        other => {
            return Err(Error::Validation(format!(
                "unknown export format: {other} (expected: markdown, json)"
            )));
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path, "feedback exported");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
