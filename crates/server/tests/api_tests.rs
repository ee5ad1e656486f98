//! Integration tests for the server API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use heart_risk_server::{create_router, AppState};
use risk_lib::{
    health::{components, HealthRegistry},
    Predictor, PredictorConfig, ScriptPredictor, ServerMetrics, StructuredLogger,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const SAMPLE_FORM: &str = r#"{"age":"45","sex":"1","trestbps":"120","chol":"200","fbs":"0","thalach":"150","exang":"0"}"#;

/// Write a shell script that stands in for the prediction script
fn predictor_script(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

async fn setup_test_app(script: &NamedTempFile) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.register(components::PREDICTOR).await;

    let predictor: Arc<dyn Predictor> = Arc::new(ScriptPredictor::new(PredictorConfig {
        program: "sh".to_string(),
        script: script.path().to_path_buf(),
        ..PredictorConfig::default()
    }));

    let state = Arc::new(AppState::new(
        health_registry,
        ServerMetrics::new(),
        StructuredLogger::new("test-instance"),
        predictor,
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn post_predict(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_predict_passes_result_through_verbatim() {
    let script = predictor_script(r#"echo '{"probability":0.82,"risk_level":"high"}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, SAMPLE_FORM).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"probability": 0.82, "risk_level": "high"}));
}

#[tokio::test]
async fn test_predict_non_zero_exit_returns_prediction_failed() {
    let script = predictor_script("echo 'model missing' >&2; exit 1");
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, SAMPLE_FORM).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Prediction failed"}));
}

#[tokio::test]
async fn test_predict_non_json_output_returns_invalid_result() {
    let script = predictor_script("echo not-json");
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, SAMPLE_FORM).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Invalid prediction result"}));
}

#[tokio::test]
async fn test_predict_malformed_body_returns_processing_error() {
    let script = predictor_script(r#"echo '{"probability":0.1}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error processing request"}));
}

#[tokio::test]
async fn test_predict_null_body_returns_processing_error() {
    let script = predictor_script(r#"echo '{"probability":0.1}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, "null").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error processing request"}));
}

#[tokio::test]
async fn test_predict_array_body_reaches_predictor_with_missing_values() {
    let script = predictor_script(r#"printf '{"probability":0.4,"features":%s}' "$1""#);
    let (app, _state) = setup_test_app(&script).await;

    let (status, result) = post_predict(app, "[]").await;

    assert_eq!(status, StatusCode::OK);
    let features = result["features"].as_array().unwrap();
    assert_eq!(features.len(), 13);
    assert!(features[0].is_null(), "missing age is sent as null");
    assert_eq!(features[7], 150.0, "missing thalach falls back to 150");
    assert_eq!(features[12], 1.0);
}

#[tokio::test]
async fn test_predict_accepts_body_over_two_megabytes() {
    let script = predictor_script(r#"echo '{"probability":0.3}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let note = "x".repeat(3 * 1024 * 1024);
    let body = json!({"age": "45", "trestbps": "120", "chol": "200", "note": note}).to_string();
    let (status, result) = post_predict(app.clone(), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result, json!({"probability": 0.3}));

    let garbage = format!("{{{}", note);
    let (status, result) = post_predict(app, &garbage).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(result, json!({"error": "Error processing request"}));
}

#[tokio::test]
async fn test_predict_sends_constant_slots_to_predictor() {
    // Echo the received vector back so the test can inspect it
    let script = predictor_script(r#"printf '{"probability":0.4,"features":%s}' "$1""#);
    let (app, _state) = setup_test_app(&script).await;

    let body = r#"{"age":"45","sex":"1","cp":"3","trestbps":"120","chol":"200","fbs":"0","restecg":"2","thalach":"150","exang":"0","thal":"6"}"#;
    let (status, result) = post_predict(app, body).await;

    assert_eq!(status, StatusCode::OK);
    let features = result["features"].as_array().unwrap();
    assert_eq!(features.len(), 13);
    assert_eq!(features[0], 45.0);
    assert_eq!(features[2], 0.0, "cp slot is pinned to 0");
    assert_eq!(features[6], 0.0, "restecg slot is pinned to 0");
    assert_eq!(features[12], 1.0, "thal slot is pinned to 1");
}

#[tokio::test]
async fn test_predict_error_field_from_predictor_is_relayed_with_ok() {
    // A predictor that reports its own error but exits 0 is passed through
    let script = predictor_script(r#"echo '{"error":"scaler mismatch"}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let (status, body) = post_predict(app, SAMPLE_FORM).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "scaler mismatch"}));
}

#[tokio::test]
async fn test_predictor_failure_degrades_health() {
    let script = predictor_script("exit 2");
    let (app, state) = setup_test_app(&script).await;

    let (status, _) = post_predict(app.clone(), SAMPLE_FORM).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, health) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["predictor"]["status"], "degraded");

    assert_eq!(
        state.health_registry.status_of(components::API).await,
        Some(risk_lib::ComponentStatus::Healthy)
    );
}

#[tokio::test]
async fn test_missing_predictor_program_marks_predictor_unhealthy() {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.register(components::PREDICTOR).await;
    health_registry.set_ready(true).await;

    let predictor: Arc<dyn Predictor> = Arc::new(ScriptPredictor::new(PredictorConfig {
        program: "heart-risk-no-such-interpreter".to_string(),
        ..PredictorConfig::default()
    }));
    let state = Arc::new(AppState::new(
        health_registry,
        ServerMetrics::new(),
        StructuredLogger::new("test-instance"),
        predictor,
    ));
    let app = create_router(state);

    let (status, body) = post_predict(app.clone(), SAMPLE_FORM).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Prediction failed"}));

    let (status, health) = get_json(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["components"]["predictor"]["status"], "unhealthy");

    let (status, readiness) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);
}

#[tokio::test]
async fn test_bad_request_does_not_degrade_predictor() {
    let script = predictor_script(r#"echo '{"probability":0.1}'"#);
    let (app, _state) = setup_test_app(&script).await;

    let _ = post_predict(app.clone(), "garbage").await;

    let (_, health) = get_json(app, "/healthz").await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_reflects_initialization() {
    let script = predictor_script(r#"echo '{"probability":0.1}'"#);
    let (app, state) = setup_test_app(&script).await;

    let (status, readiness) = get_json(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;

    let (status, readiness) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let script = predictor_script(r#"echo '{"probability":0.1}'"#);
    let (app, state) = setup_test_app(&script).await;

    state
        .health_registry
        .set_unhealthy(components::PREDICTOR, "Predictor script not found")
        .await;

    let (status, health) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint_reports_prediction_metrics() {
    let script = predictor_script(r#"echo '{"probability":0.6}'"#);
    let (app, state) = setup_test_app(&script).await;

    let _ = post_predict(app.clone(), SAMPLE_FORM).await;
    state.metrics.inc_prediction_errors("timeout");
    state.metrics.set_predictor_info("sh", "predict.sh");

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("heart_risk_prediction_latency_seconds_bucket"));
    assert!(metrics_text.contains("heart_risk_predictions_total"));
    assert!(metrics_text.contains("heart_risk_prediction_errors_total"));
    assert!(metrics_text.contains("heart_risk_predictor_info"));
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let script = predictor_script(r#"echo '{"probability":0.35,"risk_level":"Low"}'"#);
    let (_app, state) = setup_test_app(&script).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(heart_risk_server::serve(listener, state));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/predict", addr))
        .json(&serde_json::from_str::<Value>(SAMPLE_FORM).unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["probability"], 0.35);
    assert_eq!(body["risk_level"], "Low");

    server.abort();
}
