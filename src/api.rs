//! HTTP API for math score validation and prediction
//!
//! - `GET /health` - liveness plus model status
//! - `POST /api/escalar` - validate a payload and echo it back
//! - `POST /api/predict`, `POST /predict` - validate, then predict

use crate::error::{Result, ServiceError};
use crate::metrics::ServiceMetrics;
use crate::models::inference::InferenceEngine;
use crate::models::linear::Regressor;
use crate::models::loader::LoadedModel;
use crate::types::prediction::PredictionResponse;
use crate::types::record::ValidatedRecord;
use crate::validator::InputValidator;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Inference engine, absent when the model failed to load
    engine: Option<InferenceEngine>,
    /// Path the model was loaded from
    model_path: Option<String>,
    validator: Arc<InputValidator>,
    metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Build state from the startup load result. `None` puts the server in
    /// degraded mode: health checks work, predictions are refused.
    pub fn new(loaded: Option<LoadedModel>, metrics: Arc<ServiceMetrics>) -> Self {
        let (engine, model_path) = match loaded {
            Some(loaded) => (
                Some(InferenceEngine::new(loaded.model)),
                Some(loaded.path.display().to_string()),
            ),
            None => (None, None),
        };

        Self {
            engine,
            model_path,
            validator: Arc::new(InputValidator::new()),
            metrics,
        }
    }

    /// Build state around an in-memory model
    pub fn with_model(model: Arc<dyn Regressor>, model_path: impl Into<String>) -> Self {
        Self {
            engine: Some(InferenceEngine::new(model)),
            model_path: Some(model_path.into()),
            validator: Arc::new(InputValidator::new()),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// State without a model
    pub fn degraded() -> Self {
        Self::new(None, Arc::new(ServiceMetrics::new()))
    }

    pub fn model_loaded(&self) -> bool {
        self.engine.is_some()
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_path: Option<String>,
}

/// Successful result of the shared request path
#[derive(Debug)]
pub enum ApiOutcome {
    Validated(ValidatedRecord),
    Predicted(Box<PredictionResponse>),
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/escalar", post(validate_handler))
        .route("/api/predict", post(predict_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.model_loaded(),
        model_path: state.model_path.clone(),
    })
}

async fn validate_handler(State(state): State<AppState>, body: Bytes) -> Response {
    handle(&state, &body, false)
}

async fn predict_handler(State(state): State<AppState>, body: Bytes) -> Response {
    handle(&state, &body, true)
}

/// Run the shared request path and turn its outcome into a response
fn handle(state: &AppState, body: &[u8], predict: bool) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("request", request_id = %request_id, predict = predict);
    let _guard = span.enter();

    let start = Instant::now();
    let outcome = process(state, body, predict);
    state.metrics.record_request(start.elapsed());

    match outcome {
        Ok(ApiOutcome::Validated(record)) => {
            state.metrics.record_validation();
            debug!("Payload validated");
            Json(record).into_response()
        }
        Ok(ApiOutcome::Predicted(response)) => {
            state.metrics.record_prediction(response.math_score_prediction);
            info!(
                math_score = response.math_score_prediction,
                processing_time_us = start.elapsed().as_micros() as u64,
                "Prediction served"
            );
            Json(response).into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                warn!(kind = e.kind(), error = %e, "Request rejected");
            } else {
                error!(kind = e.kind(), error = %e, "Request failed");
            }
            state.metrics.record_error(e.kind(), e.is_client_error());
            e.into_response()
        }
    }
}

/// Validate a raw body and, when `predict` is set, score it.
///
/// Model availability is checked before the body is parsed, so a degraded
/// server refuses predictions even for malformed input.
pub fn process(state: &AppState, body: &[u8], predict: bool) -> Result<ApiOutcome> {
    let engine = if predict {
        Some(state.engine.as_ref().ok_or(ServiceError::ModelUnavailable)?)
    } else {
        None
    };

    let payload: Value = serde_json::from_slice(body).map_err(|e| ServiceError::InvalidPayload {
        reason: format!("JSON inválido ({})", e),
    })?;

    let record = state.validator.validate(&payload)?;

    match engine {
        None => Ok(ApiOutcome::Validated(record)),
        Some(engine) => {
            let result = engine.predict(&record.features)?;
            Ok(ApiOutcome::Predicted(Box::new(PredictionResponse::new(
                record, result,
            ))))
        }
    }
}
