//! Input and output helpers for the command-line tools

use crate::error::{Result, ServiceError};
use crate::types::record::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
use crate::validator::{cast_to_float, InputValidator};
use serde_json::{json, Value};
use std::io::{self, Read};

/// `tipo_error` reported when configuration cannot be loaded
pub const CONFIG_ERROR_KIND: &str = "ConfigError";

/// Read the JSON input from the first argument, or from stdin when absent
pub fn read_input() -> Result<String> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(arg);
    }

    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| ServiceError::InvalidPayload {
            reason: format!("no se pudo leer stdin ({})", e),
        })?;
    Ok(buf.trim().to_string())
}

/// Parse raw input text as JSON
pub fn parse_input(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| ServiceError::InvalidPayload {
        reason: format!("JSON inválido ({})", e),
    })
}

/// Interpret CLI input as a feature record.
///
/// A list must hold exactly seven values in model order. An object goes
/// through the same validation as the HTTP API.
pub fn record_from_input(input: &Value) -> Result<FeatureRecord> {
    match input {
        Value::Array(items) => {
            if items.len() != FEATURE_COUNT {
                return Err(ServiceError::FeatureCount {
                    expected: FEATURE_COUNT,
                    actual: items.len(),
                });
            }

            let mut values = [0.0; FEATURE_COUNT];
            for ((slot, field), item) in values.iter_mut().zip(FEATURE_NAMES).zip(items) {
                *slot = cast_to_float(field, item)?;
            }
            Ok(FeatureRecord::from_values(values))
        }
        Value::Object(_) => Ok(InputValidator::new().validate(input)?.features),
        _ => Err(ServiceError::InvalidPayload {
            reason: "se esperaba una lista de 7 valores".to_string(),
        }),
    }
}

/// Error object printed by the prediction tool
pub fn error_report(err: &ServiceError) -> Value {
    json!({
        "error": err.to_string(),
        "tipo_error": err.kind(),
    })
}

/// Error object printed by either tool when configuration cannot be loaded
pub fn config_error_report(err: &anyhow::Error) -> Value {
    json!({
        "error": format!("{:#}", err),
        "tipo_error": CONFIG_ERROR_KIND,
    })
}
