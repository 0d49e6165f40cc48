//! `score` subcommand: the terminal stand-in for the scoring dashboard

use anyhow::{Context, Result};

use super::args::ScoreArgs;
use super::prompts::prompt_applicant;
use crate::pipeline::{RiskAssessment, RiskEngine};
use crate::report::display_assessment;

/// Load the artifacts, collect the applicant and assess them.
pub fn assess_applicant(args: &ScoreArgs) -> Result<RiskAssessment> {
    let engine = RiskEngine::load(&args.models_dir, args.model)?;

    let applicant = if args.interactive {
        prompt_applicant(&args.applicant())?
    } else {
        args.applicant()
    };

    Ok(engine.assess(&applicant)?)
}

pub fn run_score(args: &ScoreArgs) -> Result<()> {
    let assessment = assess_applicant(args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&assessment).context("Failed to serialize assessment")?;
        println!("{}", json);
    } else {
        display_assessment(&assessment, args.top);
    }

    Ok(())
}
