//! Feature extraction for math score model inference.
//!
//! Produces the feature vector in the column order the regression was
//! trained on.

use crate::types::record::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};

/// Feature extractor that transforms validated records into model input.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the feature vector from a record.
    ///
    /// Order matches [`FEATURE_NAMES`]. The model does not check names, so
    /// this ordering is the only thing keeping reading and writing scores
    /// from being swapped.
    pub fn extract(&self, record: &FeatureRecord) -> Vec<f64> {
        let mut features = Vec::with_capacity(FEATURE_COUNT);

        // Demographic and preparation flags
        features.push(record.gender);
        features.push(record.lunch);
        features.push(record.test_preparation_course);

        // Scores
        features.push(record.reading_score);
        features.push(record.writing_score);

        // One-hot encoded columns kept after feature selection
        features.push(record.race_ethnicity_group_e);
        features.push(record.parental_level_of_education_high_school);

        features
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names (matching training order).
    pub fn feature_names(&self) -> Vec<&'static str> {
        FEATURE_NAMES.to_vec()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
