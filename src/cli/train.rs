//! `train` subcommand

use anyhow::Result;

use super::args::TrainArgs;
use crate::pipeline::run_training;
use crate::report::{display_importance, display_training_summary};
use crate::utils::{print_banner, print_completion, print_config, print_info};

/// Features listed per model after training
const TOP_FEATURES: usize = 5;

pub fn run_train(args: &TrainArgs) -> Result<()> {
    let config = args.to_config()?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config);

    let outcome = run_training(&config)?;

    for importance in &outcome.report.importance {
        display_importance(importance, TOP_FEATURES);
    }
    display_training_summary(&outcome.report);

    println!();
    print_info(&format!("Report written to {}", outcome.report_path.display()));
    print_completion("Training complete!");

    Ok(())
}
