//! Storyloom CLI binary.
//!
//! This binary provides command-line access to the story engine:
//! - Generate a story tree from a constitution
//! - Resume an interrupted story
//! - Inspect the resume plan and the persisted tree

use clap::Parser;
use std::process::ExitCode;
use storyloom::{GenerationMode, StoryloomConfig};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, print_plan, run_generation, show_tree};

    // Load .env before anything reads the API key
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = StoryloomConfig::load_with(cli.config.as_deref())?;

    let (story_id, constitution, mode) = match cli.command {
        Commands::Generate {
            story_id,
            constitution,
        } => (story_id, constitution, GenerationMode::Fresh),
        Commands::Resume {
            story_id,
            constitution,
        } => (story_id, constitution, GenerationMode::Resume),
        Commands::Plan { story_id } => {
            print_plan(&config, &story_id).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Show { story_id } => {
            show_tree(&config, &story_id).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let report = run_generation(&config, &story_id, &constitution, mode).await?;
    println!("{}", cli::to_pretty_json(&report)?);

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(
            failures = report.failures.len(),
            remaining = report.tasks_remaining,
            "Story is incomplete; run `storyloom resume` to continue"
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Logs go to stderr so JSON output on stdout stays clean.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
