//! Applicant records and the labeled dataset
//!
//! Attributes are typed by declaration: every column belongs to either
//! [`NumericAttribute`] or [`CategoricalAttribute`], never by sniffing values.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Name of the binary default label column
pub const LABEL_COLUMN: &str = "loan_status";

/// Numeric applicant attributes, in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericAttribute {
    Age,
    Income,
    EmploymentLength,
    LoanAmount,
    InterestRate,
    LoanPercentIncome,
    CreditHistoryLength,
}

impl NumericAttribute {
    pub const ALL: [NumericAttribute; 7] = [
        NumericAttribute::Age,
        NumericAttribute::Income,
        NumericAttribute::EmploymentLength,
        NumericAttribute::LoanAmount,
        NumericAttribute::InterestRate,
        NumericAttribute::LoanPercentIncome,
        NumericAttribute::CreditHistoryLength,
    ];

    /// Column name in the source dataset
    pub fn column(&self) -> &'static str {
        match self {
            NumericAttribute::Age => "person_age",
            NumericAttribute::Income => "person_income",
            NumericAttribute::EmploymentLength => "person_emp_length",
            NumericAttribute::LoanAmount => "loan_amnt",
            NumericAttribute::InterestRate => "loan_int_rate",
            NumericAttribute::LoanPercentIncome => "loan_percent_income",
            NumericAttribute::CreditHistoryLength => "cb_person_cred_hist_length",
        }
    }

    /// Derived attributes are computed from other fields and never read from input.
    pub fn is_derived(&self) -> bool {
        matches!(self, NumericAttribute::LoanPercentIncome)
    }
}

/// Categorical applicant attributes, in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalAttribute {
    HomeOwnership,
    LoanIntent,
    LoanGrade,
    PriorDefault,
}

impl CategoricalAttribute {
    pub const ALL: [CategoricalAttribute; 4] = [
        CategoricalAttribute::HomeOwnership,
        CategoricalAttribute::LoanIntent,
        CategoricalAttribute::LoanGrade,
        CategoricalAttribute::PriorDefault,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            CategoricalAttribute::HomeOwnership => "person_home_ownership",
            CategoricalAttribute::LoanIntent => "loan_intent",
            CategoricalAttribute::LoanGrade => "loan_grade",
            CategoricalAttribute::PriorDefault => "cb_person_default_on_file",
        }
    }
}

/// One applicant's raw attributes. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: Option<f64>,
    pub income: Option<f64>,
    pub employment_length: Option<f64>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub credit_history_length: Option<f64>,
    pub home_ownership: Option<String>,
    pub loan_intent: Option<String>,
    pub loan_grade: Option<String>,
    pub prior_default: Option<String>,
}

impl ApplicantRecord {
    /// Loan amount as a fraction of income.
    ///
    /// 0 when income is 0; missing when either operand is missing.
    pub fn loan_percent_income(&self) -> Option<f64> {
        match (self.loan_amount, self.income) {
            (Some(_), Some(income)) if income == 0.0 => Some(0.0),
            (Some(amount), Some(income)) => Some(amount / income),
            _ => None,
        }
    }

    pub fn numeric(&self, attribute: NumericAttribute) -> Option<f64> {
        let value = match attribute {
            NumericAttribute::Age => self.age,
            NumericAttribute::Income => self.income,
            NumericAttribute::EmploymentLength => self.employment_length,
            NumericAttribute::LoanAmount => self.loan_amount,
            NumericAttribute::InterestRate => self.interest_rate,
            NumericAttribute::LoanPercentIncome => self.loan_percent_income(),
            NumericAttribute::CreditHistoryLength => self.credit_history_length,
        };
        // NaN is treated as missing so it is imputed rather than propagated
        value.filter(|v| !v.is_nan())
    }

    pub fn categorical(&self, attribute: CategoricalAttribute) -> Option<&str> {
        let value = match attribute {
            CategoricalAttribute::HomeOwnership => &self.home_ownership,
            CategoricalAttribute::LoanIntent => &self.loan_intent,
            CategoricalAttribute::LoanGrade => &self.loan_grade,
            CategoricalAttribute::PriorDefault => &self.prior_default,
        };
        value.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Set a stored numeric attribute. Derived attributes are ignored.
    pub fn set_numeric(&mut self, attribute: NumericAttribute, value: Option<f64>) {
        match attribute {
            NumericAttribute::Age => self.age = value,
            NumericAttribute::Income => self.income = value,
            NumericAttribute::EmploymentLength => self.employment_length = value,
            NumericAttribute::LoanAmount => self.loan_amount = value,
            NumericAttribute::InterestRate => self.interest_rate = value,
            NumericAttribute::LoanPercentIncome => {}
            NumericAttribute::CreditHistoryLength => self.credit_history_length = value,
        }
    }

    pub fn set_categorical(&mut self, attribute: CategoricalAttribute, value: Option<String>) {
        match attribute {
            CategoricalAttribute::HomeOwnership => self.home_ownership = value,
            CategoricalAttribute::LoanIntent => self.loan_intent = value,
            CategoricalAttribute::LoanGrade => self.loan_grade = value,
            CategoricalAttribute::PriorDefault => self.prior_default = value,
        }
    }
}

/// Ordered (record, default label) pairs
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub records: Vec<ApplicantRecord>,
    pub labels: Vec<u8>,
}

/// Training and holdout partitions of a [`LabeledDataset`]
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: LabeledDataset,
    pub holdout: LabeledDataset,
}

impl LabeledDataset {
    pub fn new(records: Vec<ApplicantRecord>, labels: Vec<u8>) -> PipelineResult<Self> {
        if records.len() != labels.len() {
            return Err(PipelineError::DataLoad(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        Ok(Self { records, labels })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of (non-default, default) labels
    pub fn class_counts(&self) -> (usize, usize) {
        let defaults = self.labels.iter().filter(|&&l| l == 1).count();
        (self.labels.len() - defaults, defaults)
    }

    fn subset(&self, indices: &[usize]) -> LabeledDataset {
        LabeledDataset {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Split into training and holdout partitions, stratified on the label.
    ///
    /// Each class is shuffled with its own draw from a `StdRng` seeded by `seed`
    /// and `round(class_size * holdout_fraction)` rows go to the holdout.
    /// Both partitions keep the original row order.
    pub fn stratified_split(&self, holdout_fraction: f64, seed: u64) -> PipelineResult<DatasetSplit> {
        if self.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "cannot split a dataset with no rows".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&holdout_fraction) {
            return Err(PipelineError::DataLoad(format!(
                "holdout fraction must be in [0, 1), got {}",
                holdout_fraction
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut holdout_mask = vec![false; self.len()];

        for class in [0u8, 1u8] {
            let mut members: Vec<usize> = (0..self.len()).filter(|&i| self.labels[i] == class).collect();
            members.shuffle(&mut rng);
            let take = (members.len() as f64 * holdout_fraction).round() as usize;
            for &i in members.iter().take(take) {
                holdout_mask[i] = true;
            }
        }

        let (holdout_idx, train_idx): (Vec<usize>, Vec<usize>) =
            (0..self.len()).partition(|&i| holdout_mask[i]);

        Ok(DatasetSplit {
            train: self.subset(&train_idx),
            holdout: self.subset(&holdout_idx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(income: Option<f64>, amount: Option<f64>) -> ApplicantRecord {
        ApplicantRecord {
            income,
            loan_amount: amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_loan_percent_income_is_derived() {
        let record = record_with(Some(50000.0), Some(10000.0));
        assert_eq!(record.loan_percent_income(), Some(0.2));
        assert_eq!(record.numeric(NumericAttribute::LoanPercentIncome), Some(0.2));
    }

    #[test]
    fn test_loan_percent_income_zero_income() {
        let record = record_with(Some(0.0), Some(10000.0));
        assert_eq!(record.loan_percent_income(), Some(0.0));
    }

    #[test]
    fn test_loan_percent_income_missing_operand() {
        assert_eq!(record_with(None, Some(10000.0)).loan_percent_income(), None);
        assert_eq!(record_with(Some(50000.0), None).loan_percent_income(), None);
    }

    #[test]
    fn test_set_numeric_ignores_derived() {
        let mut record = record_with(Some(1000.0), Some(100.0));
        record.set_numeric(NumericAttribute::LoanPercentIncome, Some(0.9));
        assert_eq!(record.loan_percent_income(), Some(0.1));
    }

    #[test]
    fn test_blank_category_is_missing() {
        let record = ApplicantRecord {
            loan_grade: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.categorical(CategoricalAttribute::LoanGrade), None);
    }

    #[test]
    fn test_stratified_split_preserves_proportion() {
        let labels: Vec<u8> = (0..100).map(|i| if i % 10 == 0 { 1 } else { 0 }).collect();
        let records = vec![ApplicantRecord::default(); 100];
        let dataset = LabeledDataset::new(records, labels).unwrap();

        let split = dataset.stratified_split(0.2, 42).unwrap();
        assert_eq!(split.holdout.len(), 20);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.holdout.class_counts(), (18, 2));
        assert_eq!(split.train.class_counts(), (72, 8));
    }

    #[test]
    fn test_stratified_split_is_deterministic() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 3 == 0) as u8).collect();
        let records: Vec<ApplicantRecord> = (0..50)
            .map(|i| ApplicantRecord {
                age: Some(i as f64),
                ..Default::default()
            })
            .collect();
        let dataset = LabeledDataset::new(records, labels).unwrap();

        let a = dataset.stratified_split(0.3, 7).unwrap();
        let b = dataset.stratified_split(0.3, 7).unwrap();
        assert_eq!(a.holdout.records, b.holdout.records);
        assert_eq!(a.train.labels, b.train.labels);
    }

    #[test]
    fn test_split_empty_dataset_errors() {
        let dataset = LabeledDataset::default();
        assert!(matches!(
            dataset.stratified_split(0.2, 42),
            Err(PipelineError::EmptyDataset(_))
        ));
    }
}
