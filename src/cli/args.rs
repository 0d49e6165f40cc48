//! Command-line argument definitions using clap

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::pipeline::{
    ApplicantRecord, ModelKind, SmoteConfig, TargetMapping, TrainingConfig, DEFAULT_BACKGROUND_SIZE,
    DEFAULT_IMPORTANCE_ROWS,
};

/// Credrisk - Loan default risk scoring with per-applicant explanations
#[derive(Parser, Debug)]
#[command(name = "credrisk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train, evaluate and persist every classifier from a labeled dataset
    Train(TrainArgs),

    /// Score one applicant with a trained model and explain the result
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Input file path (CSV or Parquet) with a `loan_status` column
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the preprocessor, models and training report are written to
    #[arg(short, long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Seed for the split, oversampling and model training
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Fraction of rows held out for evaluation (0.0 to <1.0)
    #[arg(long, default_value = "0.2", value_parser = validate_holdout_fraction)]
    pub holdout_fraction: f64,

    /// Number of nearest minority neighbors used by SMOTE
    #[arg(long, default_value = "5", value_parser = validate_k_neighbors)]
    pub k_neighbors: usize,

    /// Minority/majority ratio to oversample to (0.0 to 1.0)
    #[arg(long, default_value = "1.0", value_parser = validate_unit_interval)]
    pub target_ratio: f64,

    /// Probability above which an applicant is predicted to default
    #[arg(long, default_value = "0.5", value_parser = validate_unit_interval)]
    pub threshold: f64,

    /// Value in `loan_status` that represents a default (maps to 1).
    /// Required with --non-event-value when the label is not binary 0/1.
    #[arg(long)]
    pub event_value: Option<String>,

    /// Value in `loan_status` that represents repayment (maps to 0).
    /// Required with --event-value when the label is not binary 0/1.
    #[arg(long)]
    pub non_event_value: Option<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl TrainArgs {
    pub fn to_config(&self) -> Result<TrainingConfig> {
        let target_mapping = match (&self.event_value, &self.non_event_value) {
            (Some(event), Some(non_event)) => Some(TargetMapping::new(event.clone(), non_event.clone())),
            (None, None) => None,
            _ => anyhow::bail!("--event-value and --non-event-value must be given together"),
        };

        Ok(TrainingConfig {
            input: self.input.clone(),
            models_dir: self.models_dir.clone(),
            seed: self.seed,
            holdout_fraction: self.holdout_fraction,
            smote: SmoteConfig {
                k_neighbors: self.k_neighbors,
                target_ratio: self.target_ratio,
                seed: self.seed,
            },
            threshold: self.threshold,
            background_size: DEFAULT_BACKGROUND_SIZE,
            importance_rows: DEFAULT_IMPORTANCE_ROWS,
            target_mapping,
            infer_schema_length: self.infer_schema_length,
        })
    }
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Model to score with: logistic_regression, random_forest or xgboost
    #[arg(long, default_value = "xgboost")]
    pub model: ModelKind,

    /// Directory holding the trained artifacts
    #[arg(short, long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Prompt for the applicant's details instead of reading flags
    #[arg(long, default_value = "false")]
    pub interactive: bool,

    /// Number of features shown in the attribution waterfall
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Print the assessment as JSON instead of tables
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Age in years
    #[arg(long)]
    pub age: Option<f64>,

    /// Annual income
    #[arg(long)]
    pub income: Option<f64>,

    /// Home ownership: RENT, OWN, MORTGAGE or OTHER
    #[arg(long)]
    pub home_ownership: Option<String>,

    /// Employment length in years
    #[arg(long)]
    pub emp_length: Option<f64>,

    /// Loan intent, e.g. EDUCATION, MEDICAL, VENTURE
    #[arg(long)]
    pub loan_intent: Option<String>,

    /// Loan grade A to G
    #[arg(long)]
    pub loan_grade: Option<String>,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: Option<f64>,

    /// Interest rate in percent
    #[arg(long)]
    pub interest_rate: Option<f64>,

    /// Previous default on file: Y or N
    #[arg(long)]
    pub prior_default: Option<String>,

    /// Credit history length in years
    #[arg(long)]
    pub credit_history_length: Option<f64>,
}

impl ScoreArgs {
    /// Applicant built from flags; omitted fields stay missing and are imputed
    pub fn applicant(&self) -> ApplicantRecord {
        ApplicantRecord {
            age: self.age,
            income: self.income,
            employment_length: self.emp_length,
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            credit_history_length: self.credit_history_length,
            home_ownership: self.home_ownership.as_ref().map(|s| s.to_uppercase()),
            loan_intent: self.loan_intent.as_ref().map(|s| s.to_uppercase()),
            loan_grade: self.loan_grade.as_ref().map(|s| s.to_uppercase()),
            prior_default: self.prior_default.as_ref().map(|s| s.to_uppercase()),
        }
    }
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for holdout_fraction
fn validate_holdout_fraction(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if !(0.0..1.0).contains(&value) {
        Err(format!("holdout_fraction must be in [0.0, 1.0), got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for ratios and probabilities
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for k_neighbors
fn validate_k_neighbors(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid positive integer", s))?;
    if value == 0 {
        Err("k_neighbors must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
