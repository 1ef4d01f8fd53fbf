//! Math Score Service Library
//!
//! Serves a pre-trained linear regression that predicts a student's math
//! score from seven demographic and test-preparation features, over HTTP
//! and from the command line.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod types;
pub mod validator;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::ServiceError;
pub use feature_extractor::FeatureExtractor;
pub use models::inference::InferenceEngine;
pub use models::loader::ModelLoader;
pub use types::{FeatureRecord, PredictionResult, ValidatedRecord};
pub use validator::InputValidator;
