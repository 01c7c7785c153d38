//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storyloom - branching interactive story generation
#[derive(Parser, Debug)]
#[command(name = "storyloom")]
#[command(about = "Generate and resume branching interactive stories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the standard locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new story from its constitution
    Generate {
        /// Story identifier, also the storage directory name
        #[arg(long)]
        story_id: String,

        /// Path to the story constitution text
        #[arg(long)]
        constitution: PathBuf,
    },

    /// Continue an interrupted story from its persisted scenelets
    Resume {
        /// Story identifier
        #[arg(long)]
        story_id: String,

        /// Path to the story constitution text
        #[arg(long)]
        constitution: PathBuf,
    },

    /// Print the pending generation tasks of a story as JSON
    Plan {
        /// Story identifier
        #[arg(long)]
        story_id: String,
    },

    /// Print a story tree as an indented outline
    Show {
        /// Story identifier
        #[arg(long)]
        story_id: String,
    },
}
