//! Type definitions for the math score service

pub mod prediction;
pub mod record;

pub use prediction::{ModelInfo, PredictionResponse, PredictionResult};
pub use record::{FeatureRecord, ValidatedRecord, FEATURE_COUNT, FEATURE_NAMES};
