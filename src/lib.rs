//! Credrisk: Loan Default Risk Library
//!
//! Fits a leakage-safe feature transformer, balances the training set with
//! SMOTE, trains logistic regression, random forest and gradient-boosted
//! classifiers, evaluates them on a holdout split, and explains individual
//! scores with additive feature attributions.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
