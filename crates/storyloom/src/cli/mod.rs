//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyloom binary.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{print_plan, run_generation, show_tree, to_pretty_json};
