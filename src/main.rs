//! Credrisk: Loan Default Risk CLI
//!
//! `train` runs the offline pipeline and writes model artifacts;
//! `score` assesses one applicant against them.

use std::process::ExitCode;

use clap::Parser;

use credrisk::cli::score::run_score;
use credrisk::cli::train::run_train;
use credrisk::cli::{Cli, Commands};
use credrisk::pipeline::PipelineError;
use credrisk::utils::print_error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Score(args) => run_score(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Pipeline errors carry user-facing messages; show them without the chain
            let message = match e.downcast_ref::<PipelineError>() {
                Some(pipeline_error) => pipeline_error.to_string(),
                None => format!("{:#}", e),
            };
            print_error(&message);
            ExitCode::FAILURE
        }
    }
}
