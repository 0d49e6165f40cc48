//! End-to-end training run
//!
//! load → missing profile → split → fit/transform → resample → train →
//! evaluate → importance → persist. Each stage hands a new value to the next;
//! the transformer is fitted on the training partition only and oversampling
//! never sees holdout rows.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::TrainingConfig;
use super::error::{PipelineResult, TrainingFailure};
use super::evaluate::{evaluate, EvaluationRecord};
use super::explain::global_importance;
use super::loader::load_labeled_dataset;
use super::matrix::Matrix;
use super::missing::{analyze_missing_values, columns_with_missing};
use super::models::{train_all, TrainedModel};
use super::resample::resample;
use super::store::{ArtifactStore, PREPROCESSOR_KEY, TRAINING_REPORT_FILE};
use super::transform::{FeatureTransformer, FittedTransformer};
use crate::report::{
    display_evaluation, export_training_report, ClassBalance, DatasetSummary, MissingValueEntry,
    ModelImportance, RunMetadata, TrainingReport,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_count, print_info,
    print_step_header, print_step_time, print_success, print_warning,
};

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub transformer: FittedTransformer,
    pub models: Vec<TrainedModel>,
    pub failures: Vec<TrainingFailure>,
    pub evaluations: Vec<EvaluationRecord>,
    pub report: TrainingReport,
    pub report_path: PathBuf,
}

/// Run the full training pipeline and persist its artifacts.
///
/// Structural failures (unreadable data, too few defaults to oversample,
/// schema disagreement) abort the run. Individual classifiers that fail to
/// fit are reported and skipped; the run fails only if none trained.
pub fn run_training(config: &TrainingConfig) -> Result<TrainingOutcome> {
    // Step 1: Load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading applicant records...");
    let (dataset, load_stats) =
        load_labeled_dataset(&config.input, config.target_mapping.as_ref(), config.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    let (non_default, default) = dataset.class_counts();
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", load_stats.rows);
    println!("      Columns: {}", load_stats.columns);
    println!("      Estimated memory: {:.2} MB", load_stats.memory_mb);
    println!("      Defaults: {} / Non-defaults: {}", default, non_default);
    print_step_time(step_start.elapsed());

    // Step 2: Missing value profile
    print_step_header(2, "Missing Value Profile");
    let missing_ratios = analyze_missing_values(&dataset.records);
    let with_missing = columns_with_missing(&missing_ratios);
    if with_missing.is_empty() {
        print_info("No missing values in attribute columns");
    } else {
        print_count("column(s) with missing values", with_missing.len(), Some("(imputed)"));
        for (column, ratio) in &with_missing {
            println!("        {} {} {}", style("•").dim(), column, style(format!("{:.1}%", ratio * 100.0)).dim());
        }
    }

    // Step 3: Split
    print_step_header(3, "Stratified Split");
    let split = dataset.stratified_split(config.holdout_fraction, config.seed)?;
    print_success(&format!(
        "{} training rows, {} holdout rows ({:.0}% holdout)",
        split.train.len(),
        split.holdout.len(),
        config.holdout_fraction * 100.0
    ));

    // Step 4: Fit and transform
    print_step_header(4, "Feature Transformation");
    let step_start = Instant::now();
    let transformer = FeatureTransformer::fit(&split.train.records)?;
    let train_matrix = transformer.transform(&split.train.records);
    let holdout_matrix = transformer.transform(&split.holdout.records);
    print_success(&format!("{} transformed features", transformer.schema().len()));
    print_step_time(step_start.elapsed());

    // Step 5: Oversample the training partition
    print_step_header(5, "Oversampling (SMOTE)");
    let spinner = create_spinner("Synthesizing minority samples...");
    let resampled = resample(&train_matrix, &split.train.labels, &config.smote)?;
    finish_with_success(&spinner, "Training set balanced");
    let before = split.train.class_counts();
    let after = resampled.class_counts();
    println!(
        "      Non-defaults: {} → {}    Defaults: {} → {}",
        before.0, after.0, before.1, after.1
    );
    print_count("synthetic row(s) added", resampled.synthetic_rows, None);

    // Step 6: Train every variant
    print_step_header(6, "Model Training");
    let step_start = Instant::now();
    let background = background_sample(&train_matrix, config.background_size, config.seed);
    let spinner = create_spinner("Training logistic regression, random forest and xgboost...");
    let outcome = train_all(&resampled, transformer.schema().names(), &background, config.seed)?;
    if outcome.failures.is_empty() {
        finish_with_success(&spinner, &format!("{} model(s) trained", outcome.models.len()));
    } else {
        finish_with_warning(
            &spinner,
            &format!(
                "{} model(s) trained, {} failed",
                outcome.models.len(),
                outcome.failures.len()
            ),
        );
        for failure in &outcome.failures {
            print_warning(&failure.to_string());
        }
    }
    if outcome.models.is_empty() {
        anyhow::bail!("no classifier trained successfully");
    }
    print_step_time(step_start.elapsed());

    // Step 7: Holdout evaluation
    print_step_header(7, "Evaluation");
    let evaluations = evaluate(&outcome.models, &holdout_matrix, &split.holdout.labels, config.threshold)?;
    display_evaluation(&evaluations);

    // Step 8: Global importance on holdout rows (training rows when no holdout)
    print_step_header(8, "Feature Importance");
    let step_start = Instant::now();
    let importance_rows = if holdout_matrix.is_empty() {
        &train_matrix
    } else {
        &holdout_matrix
    };
    let mut importance = Vec::with_capacity(outcome.models.len());
    for model in &outcome.models {
        let ranked = global_importance(model, importance_rows, config.importance_rows)?;
        if let Some(top) = ranked.first() {
            print_info(&format!("{}: top feature {}", model.kind().display_name(), top.feature));
        }
        importance.push(ModelImportance {
            model: model.kind().key().to_string(),
            features: ranked,
        });
    }
    print_step_time(step_start.elapsed());

    // Step 9: Persist
    print_step_header(9, "Save Artifacts");
    let spinner = create_spinner("Writing model artifacts...");
    let store = ArtifactStore::new(&config.models_dir);
    for key in clear_failed_artifacts(&store, &outcome.failures)? {
        print_warning(&format!("Removed stale '{}' artifact from a previous run", key));
    }
    store.save(PREPROCESSOR_KEY, &transformer)?;
    for model in &outcome.models {
        store.save(model.kind().key(), model)?;
    }

    let report = TrainingReport {
        metadata: RunMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            credrisk_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.input.display().to_string(),
            seed: config.seed,
            holdout_fraction: config.holdout_fraction,
            threshold: config.threshold,
            smote_k_neighbors: config.smote.k_neighbors,
            smote_target_ratio: config.smote.target_ratio,
        },
        dataset: DatasetSummary {
            loaded_rows: load_stats.rows,
            dropped_rows: load_stats.dropped_rows,
            train_rows: split.train.len(),
            holdout_rows: split.holdout.len(),
            features: transformer.schema().len(),
            train_before_resampling: ClassBalance::from(before),
            train_after_resampling: ClassBalance::from(after),
            synthetic_rows: resampled.synthetic_rows,
        },
        missing_values: missing_ratios
            .iter()
            .map(|(column, ratio)| MissingValueEntry {
                column: column.clone(),
                ratio: *ratio,
            })
            .collect(),
        evaluations: evaluations.clone(),
        failures: outcome.failures.clone(),
        importance,
    };

    let report_path = store.dir().join(TRAINING_REPORT_FILE);
    export_training_report(&report, &report_path).context("Failed to save training report")?;
    finish_with_success(&spinner, &format!("Saved to {}", store.dir().display()));

    Ok(TrainingOutcome {
        transformer,
        models: outcome.models,
        failures: outcome.failures,
        evaluations,
        report,
        report_path,
    })
}

/// Delete any earlier artifact for variants that failed this run, so an old
/// model is never paired with the new preprocessor. Returns the removed keys.
fn clear_failed_artifacts(store: &ArtifactStore, failures: &[TrainingFailure]) -> PipelineResult<Vec<String>> {
    let mut removed = Vec::new();
    for failure in failures {
        if store.remove(&failure.model)? {
            removed.push(failure.model.clone());
        }
    }
    Ok(removed)
}

/// Seeded sample of up to `size` rows, kept in original order
fn background_sample(matrix: &Matrix, size: usize, seed: u64) -> Matrix {
    let n = matrix.n_rows();
    if n <= size {
        return matrix.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, n, size).into_vec();
    picked.sort_unstable();
    matrix.select_rows(&picked)
}
