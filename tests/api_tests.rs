//! Integration tests for the HTTP API
//!
//! The router is driven in-process; no socket is opened.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use math_score_service::api::{create_router, AppState, HealthResponse};
use math_score_service::metrics::ServiceMetrics;
use math_score_service::models::artifact;
use math_score_service::models::linear::LinearRegression;
use math_score_service::models::loader::ModelLoader;
use math_score_service::types::FEATURE_NAMES;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn sample_model() -> LinearRegression {
    LinearRegression::new(vec![13.06, 3.52, -3.41, 0.31, 0.66, 4.73, 0.45], -7.2)
}

fn app() -> Router {
    create_router(AppState::with_model(
        Arc::new(sample_model()),
        "models/lin_reg_model_opt.bin",
    ))
}

fn degraded_app() -> Router {
    create_router(AppState::degraded())
}

fn sample_payload() -> Value {
    json!({
        "gender": 1,
        "lunch": 1,
        "test_preparation_course": 1,
        "reading_score": 85.5,
        "writing_score": 82.3,
        "race_ethnicity_group_E": 0,
        "parental_level_of_education_high_school": 1
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_with_model() {
    let (status, body) = get(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);
    assert_eq!(health.model_path.as_deref(), Some("models/lin_reg_model_opt.bin"));
}

#[tokio::test]
async fn test_health_degraded() {
    let (status, body) = get(degraded_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["model_path"], Value::Null);
}

#[tokio::test]
async fn test_prediction_scenario() {
    let (status, body) = post_json(app(), "/api/predict", &sample_payload()).await;

    assert_eq!(status, StatusCode::OK);
    let score = body["math_score_prediction"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    // -7.2 + 13.06 + 3.52 - 3.41 + 0.31 * 85.5 + 0.66 * 82.3 + 0.45
    assert_eq!(score, 87.24);
    assert_eq!(body["confidence"], 0.872);
    assert_eq!(body["model_info"]["type"], "LinearRegression");
    assert_eq!(body["model_info"]["features_used"], 7);

    // Validated record is merged into the response
    assert_eq!(body["reading_score"], 85.5);
    assert_eq!(body["gender"], 1.0);
    assert_eq!(body["_validado"], true);
    assert_eq!(body["_variables_validadas"], json!(FEATURE_NAMES));
}

#[tokio::test]
async fn test_predict_routes_agree() {
    let (_, api) = post_json(app(), "/api/predict", &sample_payload()).await;
    let (_, direct) = post_json(app(), "/predict", &sample_payload()).await;

    assert_eq!(api, direct);
}

#[tokio::test]
async fn test_prediction_is_idempotent() {
    let router = app();
    let (_, first) = post_json(router.clone(), "/api/predict", &sample_payload()).await;
    let (_, second) = post_json(router, "/api/predict", &sample_payload()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_swapping_scores_changes_prediction() {
    let mut swapped = sample_payload();
    swapped["reading_score"] = json!(82.3);
    swapped["writing_score"] = json!(85.5);

    let (_, original) = post_json(app(), "/predict", &sample_payload()).await;
    let (_, reordered) = post_json(app(), "/predict", &swapped).await;

    assert_ne!(
        original["math_score_prediction"],
        reordered["math_score_prediction"]
    );
}

#[tokio::test]
async fn test_missing_writing_score() {
    let mut payload = sample_payload();
    payload.as_object_mut().unwrap().remove("writing_score");

    let (status, body) = post_json(app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Variable faltante: writing_score" }));
}

#[tokio::test]
async fn test_every_missing_field_is_reported() {
    for name in FEATURE_NAMES {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove(name);

        for uri in ["/api/escalar", "/api/predict", "/predict"] {
            let (status, body) = post_json(app(), uri, &payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} without {}", uri, name);
            assert_eq!(body["error"], format!("Variable faltante: {}", name));
        }
    }
}

#[tokio::test]
async fn test_non_numeric_value() {
    let mut payload = sample_payload();
    payload["reading_score"] = json!("abc");

    let (status, body) = post_json(app(), "/api/escalar", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("reading_score"), "{}", message);
}

#[tokio::test]
async fn test_escalar_echoes_validated_record() {
    let mut payload = sample_payload();
    payload["reading_score"] = json!("85.5");
    payload["student"] = json!("s-1");

    let (status, body) = post_json(degraded_app(), "/api/escalar", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reading_score"], 85.5);
    assert_eq!(body["student"], "s-1");
    assert_eq!(body["_validado"], true);
    assert!(body.get("math_score_prediction").is_none());
}

#[tokio::test]
async fn test_prediction_fields_replace_caller_keys() {
    let mut payload = sample_payload();
    payload["confidence"] = json!("client");
    payload["math_score_prediction"] = json!(-1);

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert_eq!(text.matches("\"confidence\"").count(), 1, "{}", text);
    assert_eq!(text.matches("\"math_score_prediction\"").count(), 1, "{}", text);

    let body: Value = serde_json::from_str(text).unwrap();
    assert_eq!(body["confidence"], 0.872);
    assert_eq!(body["math_score_prediction"], 87.24);
}

#[tokio::test]
async fn test_escalar_echoes_caller_confidence() {
    let mut payload = sample_payload();
    payload["confidence"] = json!("client");

    let (status, body) = post_json(app(), "/api/escalar", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confidence"], "client");
}

#[tokio::test]
async fn test_degraded_prediction_is_500() {
    for uri in ["/api/predict", "/predict"] {
        let (status, body) = post_json(degraded_app(), uri, &sample_payload()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Modelo no disponible" }));
    }
}

#[tokio::test]
async fn test_model_failure_is_generic_500() {
    // Six coefficients for a seven-feature vector
    let router = create_router(AppState::with_model(
        Arc::new(LinearRegression::new(vec![1.0; 6], 0.0)),
        "broken.bin",
    ));

    let (status, body) = post_json(router, "/predict", &sample_payload()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error interno del servidor" }));
}

#[tokio::test]
async fn test_clamped_prediction() {
    let router = create_router(AppState::with_model(
        Arc::new(LinearRegression::new(vec![0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0], 0.0)),
        "models/lin_reg_model_opt.bin",
    ));

    let (status, body) = post_json(router, "/predict", &sample_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["math_score_prediction"], 100.0);
}

#[tokio::test]
async fn test_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/escalar")
        .header("content-type", "application/json")
        .body(Body::from("{\"gender\": 1,"))
        .unwrap();

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_model_loaded_from_disk() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("models")).unwrap();
    artifact::save_binary(&sample_model(), dir.path().join("models/lin_reg_model_opt.bin")).unwrap();

    let loaded = ModelLoader::default().with_root(dir.path()).load().unwrap();
    let metrics = Arc::new(ServiceMetrics::new());
    let router = create_router(AppState::new(Some(loaded), metrics.clone()));

    let (status, body) = post_json(router.clone(), "/predict", &sample_payload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["math_score_prediction"], 87.24);

    let (_, health) = get(router, "/health").await;
    assert!(health["model_path"]
        .as_str()
        .unwrap()
        .ends_with("models/lin_reg_model_opt.bin"));

    assert_eq!(metrics.get_score_distribution()[8], 1);
}
