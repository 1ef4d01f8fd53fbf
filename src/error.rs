//! Error taxonomy shared by the HTTP handlers and the command-line tools

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Message returned to HTTP callers when no model was loaded at startup
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Modelo no disponible";

/// Message returned to HTTP callers for every other server-side failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Errors produced while validating, loading or predicting
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required feature key is absent from the payload
    #[error("Variable faltante: {field}")]
    MissingField { field: &'static str },

    /// A required feature is present but not convertible to a float
    #[error("Valor no numérico para {field}: {value}")]
    CastFailure { field: &'static str, value: String },

    /// The request body is not a JSON object
    #[error("Datos de entrada inválidos: {reason}")]
    InvalidPayload { reason: String },

    /// Positional input with the wrong number of values
    #[error("Se esperaban {expected} variables, se recibieron {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// No candidate path exists on disk
    #[error("No se pudo cargar el modelo desde ninguna ubicación (buscado en {} rutas)", searched.len())]
    ModelNotFound { searched: Vec<PathBuf> },

    /// A candidate exists but every decoding strategy failed
    #[error("Error al cargar el modelo desde {}: {reason}", path.display())]
    ModelLoadFailure { path: PathBuf, reason: String },

    /// Prediction requested while the server runs without a model
    #[error("{}", MODEL_UNAVAILABLE_MESSAGE)]
    ModelUnavailable,

    /// The model rejected the feature vector or produced an unusable value
    #[error("Error en predicción: {0}")]
    PredictionFailure(String),
}

impl ServiceError {
    /// Stable name of the error kind, reported as `tipo_error` by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::MissingField { .. } => "MissingField",
            ServiceError::CastFailure { .. } => "CastFailure",
            ServiceError::InvalidPayload { .. } => "InvalidPayload",
            ServiceError::FeatureCount { .. } => "FeatureCount",
            ServiceError::ModelNotFound { .. } => "ModelNotFound",
            ServiceError::ModelLoadFailure { .. } => "ModelLoadFailure",
            ServiceError::ModelUnavailable => "ModelUnavailable",
            ServiceError::PredictionFailure(_) => "PredictionFailure",
        }
    }

    /// Whether the caller is at fault (reported as 400)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::MissingField { .. }
                | ServiceError::CastFailure { .. }
                | ServiceError::InvalidPayload { .. }
                | ServiceError::FeatureCount { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message safe to hand to an HTTP caller. Server-side details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            e if e.is_client_error() => e.to_string(),
            ServiceError::ModelUnavailable => MODEL_UNAVAILABLE_MESSAGE.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
