//! Regression model abstraction and the linear model shipped with the service

use crate::error::{Result, ServiceError};
use crate::types::record::FEATURE_NAMES;
use serde::{Deserialize, Serialize};

/// Anything that maps a fixed-length numeric vector to one prediction.
///
/// Implementations must be immutable after loading so they can be shared
/// across request tasks without locking.
pub trait Regressor: Send + Sync {
    /// Predict a single value from one row of features
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Runtime class name, exposed for diagnostics only
    fn type_name(&self) -> &str;

    /// Number of features the model expects
    fn n_features(&self) -> usize;
}

/// Ordinary least squares model: `intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// One coefficient per input feature, in training column order
    pub coefficients: Vec<f64>,

    pub intercept: f64,

    /// Column names recorded at training time, when available
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            feature_names: None,
        }
    }

    /// Attach the training column names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Reject artifacts whose recorded column order differs from the one
    /// the service builds its vectors in.
    pub fn check_feature_order(&self) -> std::result::Result<(), String> {
        let Some(names) = &self.feature_names else {
            return Ok(());
        };

        if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(format!(
                "feature order {:?} does not match expected {:?}",
                names, FEATURE_NAMES
            ));
        }

        Ok(())
    }
}

impl Regressor for LinearRegression {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(ServiceError::PredictionFailure(format!(
                "X has {} features, but LinearRegression is expecting {} features as input",
                features.len(),
                self.coefficients.len()
            )));
        }

        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();

        Ok(self.intercept + dot)
    }

    fn type_name(&self) -> &str {
        "LinearRegression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}
