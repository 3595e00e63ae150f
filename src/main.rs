//! git-whisper - CLI entry point.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_whisper::commit::{MessageRequest, generate_commit_message};
use git_whisper::config::{WhisperConfig, normalize_host};
use git_whisper::editor::edit_in_editor;
use git_whisper::git::{WhisperRepo, commit_staged};
use git_whisper::llm::OllamaBackend;
use git_whisper::review::{TerminalAnswers, review_message};

/// Generate a commit message for the staged changes with a local LLM.
#[derive(Parser, Debug)]
#[command(name = "git-whisper")]
#[command(about = "Generate a commit message for staged changes with a local Ollama model")]
#[command(version)]
struct Cli {
    /// Hint describing WHY this change is made
    #[arg(long)]
    intent: Option<String>,

    /// Model to use (overrides git config git-whisper.model)
    #[arg(long)]
    model: Option<String>,

    /// Ollama server URL (overrides git config git-whisper.host and OLLAMA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Show debug logs on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the streamed message on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "git_whisper=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Step 1: Open git repository
    let repo = WhisperRepo::discover(".")
        .context("Run git-whisper from within a git repository")?;

    // Step 2: Resolve settings
    let mut config = WhisperConfig::load(repo.inner());
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(host) = cli.host.as_deref() {
        config.host = normalize_host(host);
    }

    // Step 3: Collect the diff to summarize
    let diff_text = repo
        .diff_for_generation()
        .context("Cannot generate a commit message")?;

    // Step 4: Stream the message from the model
    println!("Generating commit message with {} (streaming). Please wait…\n", config.model);

    let backend = OllamaBackend::new(config.host.as_str());
    let request = MessageRequest {
        diff_text: &diff_text,
        model: &config.model,
        prompt_template: config.prompt_template.as_deref(),
        intent: cli.intent.as_deref(),
    };

    let message = generate_commit_message(&request, &backend, &mut io::stdout())
        .await
        .context("Failed to generate commit message")?;

    println!("\n{message}\n");
    println!("[Commit message preview above]");

    // Step 5: Accept, reject or edit
    let workdir = repo
        .workdir()
        .context("Cannot commit in a bare repository")?;

    let outcome = review_message(
        message,
        &mut TerminalAnswers,
        edit_in_editor,
        |msg: &str| commit_staged(workdir, msg),
        &mut io::stdout(),
    )
    .context("Review did not complete")?;

    Ok(ExitCode::from(outcome.exit_code()))
}
