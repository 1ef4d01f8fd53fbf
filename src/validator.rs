//! Presence and type validation of incoming feature payloads.
//!
//! Only presence and numeric castability are enforced. Categorical values
//! outside their documented domain (e.g. `gender = 7`) are accepted as-is.

use crate::error::{Result, ServiceError};
use crate::types::record::{
    FeatureRecord, ValidatedRecord, FEATURE_COUNT, FEATURE_NAMES, VALIDATED_FLAG_KEY,
    VALIDATED_VARIABLES_KEY,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Validator turning a raw JSON payload into a [`ValidatedRecord`]
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate any JSON value. Anything other than an object is rejected.
    pub fn validate(&self, payload: &Value) -> Result<ValidatedRecord> {
        match payload {
            Value::Object(map) => self.validate_object(map),
            other => Err(ServiceError::InvalidPayload {
                reason: format!("se esperaba un objeto JSON, se recibió {}", json_kind(other)),
            }),
        }
    }

    /// Validate a JSON object.
    ///
    /// All keys are checked for presence in model order before any cast is
    /// attempted, so a missing key is reported even when an earlier key
    /// holds garbage.
    pub fn validate_object(&self, payload: &Map<String, Value>) -> Result<ValidatedRecord> {
        if let Some(field) = FEATURE_NAMES
            .iter()
            .copied()
            .find(|name| !payload.contains_key(*name))
        {
            return Err(ServiceError::MissingField { field });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(FEATURE_NAMES) {
            *slot = cast_to_float(field, &payload[field])?;
        }

        let extra: Map<String, Value> = payload
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        debug!(
            features = ?values,
            extra_keys = extra.len(),
            "Payload validated"
        );

        Ok(ValidatedRecord::new(FeatureRecord::from_values(values), extra))
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cast a JSON value to `f64` following permissive float-cast rules:
/// numbers pass through, booleans map to 1/0, strings are trimmed and parsed.
pub fn cast_to_float(field: &'static str, value: &Value) -> Result<f64> {
    let cast = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    cast.ok_or_else(|| ServiceError::CastFailure {
        field,
        value: value.to_string(),
    })
}

fn is_reserved_key(key: &str) -> bool {
    FEATURE_NAMES.contains(&key) || key == VALIDATED_VARIABLES_KEY || key == VALIDATED_FLAG_KEY
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "un booleano",
        Value::Number(_) => "un número",
        Value::String(_) => "un texto",
        Value::Array(_) => "una lista",
        Value::Object(_) => "un objeto",
    }
}
