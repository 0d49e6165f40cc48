//! Pipeline module - training and serving stages

pub mod config;
pub mod error;
pub mod evaluate;
pub mod explain;
pub mod loader;
pub mod matrix;
pub mod missing;
pub mod models;
pub mod orchestrator;
pub mod record;
pub mod resample;
pub mod serving;
pub mod store;
pub mod target;
pub mod transform;

pub use config::*;
pub use error::*;
pub use evaluate::*;
pub use explain::{
    explain, explain_rows, explainer_for, global_importance, Attribution, Explainer,
    FeatureImportance, SamplingExplainer, TreeExplainer,
};
pub use loader::*;
pub use matrix::Matrix;
pub use missing::*;
pub use models::{
    train_all, Classifier, ClassifierModel, FitError, ModelKind, RegistryOutcome, TrainedModel,
};
pub use orchestrator::{run_training, TrainingOutcome};
pub use record::*;
pub use resample::*;
pub use serving::*;
pub use store::*;
pub use target::*;
pub use transform::*;
