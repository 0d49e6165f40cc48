//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

use credrisk::pipeline::{
    records_from_frame, resample, ApplicantRecord, FeatureTransformer, FittedTransformer, Matrix,
    ResampledTrainingSet, SmoteConfig, TrainingConfig,
};

const HOME: [&str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];
const INTENT: [&str; 6] = [
    "PERSONAL",
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "HOMEIMPROVEMENT",
    "DEBTCONSOLIDATION",
];
const GRADE: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

/// Create a seeded synthetic applicant dataset with a `loan_status` label.
///
/// Default probability rises with loan-to-income ratio, loan grade, renting
/// and a prior default, so every model has real signal to learn. About 5% of
/// employment lengths and 10% of interest rates are missing. A bogus
/// `loan_percent_income` column is included; loaders must ignore it.
pub fn create_applicant_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut age = Vec::with_capacity(rows);
    let mut income = Vec::with_capacity(rows);
    let mut home = Vec::with_capacity(rows);
    let mut emp_length: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut intent = Vec::with_capacity(rows);
    let mut grade = Vec::with_capacity(rows);
    let mut amount = Vec::with_capacity(rows);
    let mut rate: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut prior = Vec::with_capacity(rows);
    let mut history = Vec::with_capacity(rows);
    let mut status = Vec::with_capacity(rows);

    for _ in 0..rows {
        let a = rng.gen_range(20.0..65.0f64).round();
        let inc = rng.gen_range(15_000.0..150_000.0f64).round();
        let h = HOME[rng.gen_range(0..HOME.len())];
        let g = rng.gen_range(0..GRADE.len());
        let amt = rng.gen_range(1_000.0..35_000.0f64).round();
        let p = if rng.gen_bool(0.2) { "Y" } else { "N" };
        let r = 6.0 + g as f64 * 2.0 + rng.gen_range(-1.0..1.0);

        let logit = -4.0
            + 6.0 * (amt / inc)
            + 0.5 * g as f64
            + if h == "RENT" { 1.0 } else { 0.0 }
            + if p == "Y" { 0.8 } else { 0.0 };
        let probability = 1.0 / (1.0 + (-logit).exp());

        age.push(a);
        income.push(inc);
        home.push(h);
        emp_length.push(if rng.gen_bool(0.05) {
            None
        } else {
            Some(rng.gen_range(0..25) as f64)
        });
        intent.push(INTENT[rng.gen_range(0..INTENT.len())]);
        grade.push(GRADE[g]);
        amount.push(amt);
        rate.push(if rng.gen_bool(0.1) { None } else { Some(r) });
        prior.push(p);
        history.push(rng.gen_range(2..20) as f64);
        status.push(rng.gen_bool(probability) as i32);
    }

    df! {
        "person_age" => age,
        "person_income" => income,
        "person_home_ownership" => home,
        "person_emp_length" => emp_length,
        "loan_intent" => intent,
        "loan_grade" => grade,
        "loan_amnt" => amount,
        "loan_int_rate" => rate,
        "loan_status" => status,
        "loan_percent_income" => vec![9.99f64; rows],
        "cb_person_default_on_file" => prior,
        "cb_person_cred_hist_length" => history,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("applicants.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("applicants.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Training config writing models inside `temp_dir`, with a small
/// importance sample to keep test runs quick
pub fn test_config(input: PathBuf, temp_dir: &TempDir) -> TrainingConfig {
    TrainingConfig {
        importance_rows: 20,
        ..TrainingConfig::new(input, temp_dir.path().join("models"))
    }
}

/// A complete applicant record with typical values
pub fn typical_applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: Some(30.0),
        income: Some(50_000.0),
        employment_length: Some(5.0),
        loan_amount: Some(10_000.0),
        interest_rate: Some(10.0),
        credit_history_length: Some(5.0),
        home_ownership: Some("RENT".to_string()),
        loan_intent: Some("EDUCATION".to_string()),
        loan_grade: Some("B".to_string()),
        prior_default: Some("N".to_string()),
    }
}

/// Transformed training and holdout partitions of a synthetic dataset
pub struct PreparedSplit {
    pub transformer: FittedTransformer,
    pub train: ResampledTrainingSet,
    pub holdout: Matrix,
    pub holdout_labels: Vec<u8>,
}

impl PreparedSplit {
    pub fn feature_names(&self) -> Vec<String> {
        self.transformer.schema().names().to_vec()
    }
}

/// Split, transform and resample a synthetic dataset without touching disk
pub fn prepared_split(rows: usize, seed: u64) -> PreparedSplit {
    let df = create_applicant_dataframe(rows, seed);
    let dataset = records_from_frame(&df, None).unwrap();
    let split = dataset.stratified_split(0.2, seed).unwrap();

    let transformer = FeatureTransformer::fit(&split.train.records).unwrap();
    let train_matrix = transformer.transform(&split.train.records);
    let train = resample(
        &train_matrix,
        &split.train.labels,
        &SmoteConfig {
            seed,
            ..SmoteConfig::default()
        },
    )
    .unwrap();

    PreparedSplit {
        holdout: transformer.transform(&split.holdout.records),
        holdout_labels: split.holdout.labels,
        transformer,
        train,
    }
}
