//! CLI module - argument parsing, interactive prompts and subcommands

pub mod args;
pub mod prompts;
pub mod score;
pub mod train;

pub use args::{Cli, Commands, ScoreArgs, TrainArgs};
pub use prompts::*;
