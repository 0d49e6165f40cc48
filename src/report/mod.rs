//! Report module - terminal tables and the training report export

pub mod assessment;
pub mod summary;
pub mod training_export;

pub use assessment::*;
pub use summary::*;
pub use training_export::*;
