//! Math score inference on top of a loaded regressor

use crate::error::{Result, ServiceError};
use crate::feature_extractor::FeatureExtractor;
use crate::models::linear::Regressor;
use crate::types::prediction::{ModelInfo, PredictionResult};
use crate::types::record::FeatureRecord;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cross-validated R² of the shipped model, reported as the confidence of
/// every prediction. It is not derived from the request.
pub const MODEL_CONFIDENCE: f64 = 0.872151;

/// Lowest score the service reports
pub const MIN_SCORE: f64 = 0.0;

/// Highest score the service reports
pub const MAX_SCORE: f64 = 100.0;

/// Fractional digits needed to print any `f64` exactly
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Round `value` to `decimals` places.
///
/// Rounds the exact decimal expansion of the stored binary value, ties to
/// even: 45.815 is stored as 45.81499... and becomes 45.81, while the exact
/// tie 80.125 becomes 80.12.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, dropped) = fraction.split_at(decimals.min(fraction.len()));

    let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
    let round_up = match dropped.as_bytes().split_first() {
        Some((&first, rest)) => match first.cmp(&b'5') {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                rest.iter().any(|&d| d != b'0')
                    || digits.last().is_some_and(|&d| (d - b'0') % 2 == 1)
            }
        },
        None => false,
    };

    if round_up {
        let overflow = digits.iter_mut().rev().all(|d| {
            if *d == b'9' {
                *d = b'0';
                true
            } else {
                *d += 1;
                false
            }
        });
        if overflow {
            digits.insert(0, b'1');
        }
    }

    let point = digits.len() - kept.len();
    let mut text = String::with_capacity(digits.len() + 1);
    for (i, &d) in digits.iter().enumerate() {
        if i == point {
            text.push('.');
        }
        text.push(char::from(d));
    }

    text.parse::<f64>().map_or(value, |rounded| rounded.copysign(value))
}

/// Clamp a raw model output to the score range.
///
/// Out-of-range values snap to the bound; in-range values are rounded to
/// two decimals.
pub fn clamp_score(raw: f64) -> f64 {
    if raw < MIN_SCORE {
        MIN_SCORE
    } else if raw > MAX_SCORE {
        MAX_SCORE
    } else {
        round_to(raw, 2)
    }
}

/// Inference engine wrapping the shared, read-only model
#[derive(Clone)]
pub struct InferenceEngine {
    /// Loaded model
    model: Arc<dyn Regressor>,
    /// Builds vectors in training column order
    extractor: Arc<FeatureExtractor>,
}

impl InferenceEngine {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self {
            model,
            extractor: Arc::new(FeatureExtractor::new()),
        }
    }

    /// Runtime class name of the wrapped model
    pub fn model_type(&self) -> &str {
        self.model.type_name()
    }

    /// Predict the math score for one record
    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult> {
        let features = self.extractor.extract(record);

        let raw = self.model.predict(&features)?;
        if raw.is_nan() {
            return Err(ServiceError::PredictionFailure(
                "model returned NaN".to_string(),
            ));
        }

        if raw < MIN_SCORE {
            warn!(raw_score = raw, "Negative prediction, clamping to 0");
        } else if raw > MAX_SCORE {
            warn!(raw_score = raw, "Prediction above 100, clamping to 100");
        }

        let math_score = clamp_score(raw);

        debug!(
            features = ?features,
            raw_score = raw,
            math_score = math_score,
            "Prediction complete"
        );

        Ok(PredictionResult {
            math_score,
            confidence: round_to(MODEL_CONFIDENCE, 3),
            model_info: ModelInfo {
                model_type: self.model.type_name().to_string(),
                features_used: features.len(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::linear::LinearRegression;

    /// Model that returns a fixed value regardless of input
    struct ConstantModel(f64);

    impl Regressor for ConstantModel {
        fn predict(&self, _features: &[f64]) -> Result<f64> {
            Ok(self.0)
        }

        fn type_name(&self) -> &str {
            "ConstantModel"
        }

        fn n_features(&self) -> usize {
            7
        }
    }

    fn sample_record() -> FeatureRecord {
        FeatureRecord::from_values([1.0, 1.0, 1.0, 85.5, 82.3, 0.0, 1.0])
    }

    #[test]
    fn test_clamp_law() {
        for raw in [-1e9, -0.001, 0.0, 0.004, 42.4242, 99.995, 100.0, 100.01, 1e9] {
            let score = clamp_score(raw);
            assert!((MIN_SCORE..=MAX_SCORE).contains(&score), "{} -> {}", raw, score);
            if (MIN_SCORE..=MAX_SCORE).contains(&raw) {
                assert_eq!(score, round_to(raw, 2));
            }
        }

        assert_eq!(clamp_score(-3.2), 0.0);
        assert_eq!(clamp_score(120.7), 100.0);
        assert_eq!(clamp_score(42.4242), 42.42);
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
    }

    #[test]
    fn test_rounding_uses_exact_binary_value() {
        // Stored just below the written value
        assert_eq!(clamp_score(45.815), 45.81);
        assert_eq!(clamp_score(65.205), 65.2);
        // Stored just above
        assert_eq!(clamp_score(99.995), 100.0);
        // Exact ties go to even
        assert_eq!(clamp_score(80.125), 80.12);
        assert_eq!(clamp_score(80.375), 80.38);
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        // Carry through the integer part
        assert_eq!(round_to(9.996, 2), 10.0);
        assert_eq!(round_to(-1.237, 2), -1.24);
        assert_eq!(round_to(MODEL_CONFIDENCE, 3), 0.872);
    }

    #[test]
    fn test_confidence_is_static() {
        for value in [-50.0, 12.5, 250.0] {
            let engine = InferenceEngine::new(Arc::new(ConstantModel(value)));
            let result = engine.predict(&sample_record()).unwrap();
            assert_eq!(result.confidence, 0.872);
        }
    }

    #[test]
    fn test_model_info() {
        let engine = InferenceEngine::new(Arc::new(LinearRegression::new(vec![0.5; 7], 1.0)));
        let result = engine.predict(&sample_record()).unwrap();

        assert_eq!(result.model_info.model_type, "LinearRegression");
        assert_eq!(result.model_info.features_used, 7);
        assert_eq!(engine.model_type(), "LinearRegression");
    }

    #[test]
    fn test_feature_order_matters() {
        let model = LinearRegression::new(vec![0.0, 0.0, 0.0, 0.3, 0.6, 0.0, 0.0], 5.0);
        let engine = InferenceEngine::new(Arc::new(model));

        let record = sample_record();
        let mut swapped = record;
        std::mem::swap(&mut swapped.reading_score, &mut swapped.writing_score);

        let a = engine.predict(&record).unwrap().math_score;
        let b = engine.predict(&swapped).unwrap().math_score;
        assert_ne!(a, b);
        // 5 + 0.3 * 85.5 + 0.6 * 82.3 = 80.03
        assert_eq!(a, 80.03);
    }

    #[test]
    fn test_deterministic() {
        let engine = InferenceEngine::new(Arc::new(LinearRegression::new(
            vec![-12.9, 3.1, 3.5, 0.24, 0.72, 4.7, -1.2],
            -10.3,
        )));

        let first = engine.predict(&sample_record()).unwrap();
        let second = engine.predict(&sample_record()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nan_is_prediction_failure() {
        let engine = InferenceEngine::new(Arc::new(ConstantModel(f64::NAN)));
        let err = engine.predict(&sample_record()).unwrap_err();
        assert!(matches!(err, ServiceError::PredictionFailure(_)));
    }

    #[test]
    fn test_shape_error_propagates() {
        let engine = InferenceEngine::new(Arc::new(LinearRegression::new(vec![1.0; 6], 0.0)));
        let err = engine.predict(&sample_record()).unwrap_err();
        assert!(matches!(err, ServiceError::PredictionFailure(_)));
    }
}
