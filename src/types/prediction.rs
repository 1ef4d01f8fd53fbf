//! Prediction results and the merged API response

use crate::types::record::ValidatedRecord;
use serde::{Deserialize, Serialize};

/// Diagnostic metadata about the model that produced a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Runtime class name of the model
    #[serde(rename = "type")]
    pub model_type: String,

    /// Number of input features
    pub features_used: usize,
}

/// Output of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Clamped score in [0, 100], rounded to 2 decimals
    pub math_score: f64,

    /// Static cross-validation figure, not a per-request statistic
    pub confidence: f64,

    pub model_info: ModelInfo,
}

/// Keys the prediction adds to the response body. Caller keys with these
/// names are replaced, not echoed.
pub const PREDICTION_KEYS: [&str; 3] = ["math_score_prediction", "confidence", "model_info"];

/// Body returned by the predicting endpoints: the validated record plus the prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub record: ValidatedRecord,

    pub math_score_prediction: f64,

    pub confidence: f64,

    pub model_info: ModelInfo,
}

impl PredictionResponse {
    pub fn new(mut record: ValidatedRecord, result: PredictionResult) -> Self {
        for key in PREDICTION_KEYS {
            record.extra.remove(key);
        }

        Self {
            record,
            math_score_prediction: result.math_score,
            confidence: result.confidence,
            model_info: result.model_info,
        }
    }
}
