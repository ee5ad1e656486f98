//! HTTP API: the prediction route plus health checks and Prometheus metrics

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use risk_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    ErrorResponse, FeatureVector, PredictError, Predictor, ServerMetrics, StructuredLogger,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: ServerMetrics,
    pub logger: StructuredLogger,
    pub predictor: Arc<dyn Predictor>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: ServerMetrics,
        logger: StructuredLogger,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            predictor,
        }
    }
}

/// Parse the body, build the feature vector and run the predictor
async fn run_prediction(predictor: &dyn Predictor, body: &[u8]) -> Result<Value, PredictError> {
    let submission: Value = serde_json::from_slice(body).map_err(PredictError::Request)?;

    // Non-object values have no fields, so every slot takes its missing-value rule
    let no_fields = Map::new();
    let fields = match &submission {
        Value::Null => return Err(PredictError::NullBody),
        Value::Object(fields) => fields,
        _ => &no_fields,
    };

    let features = FeatureVector::from_submission(fields);
    debug!(features = ?features.as_slice(), "Built feature vector");

    predictor.predict(&features).await
}

fn error_response(err: &PredictError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Prediction route - 200 with the predictor's JSON, 500 with `{error}` otherwise
async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let _in_flight = state.metrics.track_in_flight();
    let start = Instant::now();

    let outcome = run_prediction(state.predictor.as_ref(), &body).await;

    let elapsed = start.elapsed();
    let duration_ms = elapsed.as_millis() as u64;

    match outcome {
        Ok(prediction) => {
            state.metrics.observe_prediction_latency(elapsed.as_secs_f64());
            state.metrics.inc_predictions();
            state
                .logger
                .log_prediction(prediction.get("probability").and_then(Value::as_f64), duration_ms);
            state
                .health_registry
                .set_healthy(components::PREDICTOR)
                .await;

            (StatusCode::OK, Json(prediction)).into_response()
        }
        Err(err) => {
            state.metrics.inc_prediction_errors(err.kind());
            state
                .logger
                .log_prediction_failure(err.kind(), &format!("{:?}", err), duration_ms);
            if matches!(err, PredictError::Spawn(_)) {
                state
                    .health_registry
                    .set_unhealthy(components::PREDICTOR, "Predictor could not be started")
                    .await;
            } else if err.is_predictor_fault() {
                state
                    .health_registry
                    .set_degraded(components::PREDICTOR, format!("Last run failed: {}", err.kind()))
                    .await;
            }

            error_response(&err)
        }
    }
}

/// Health check response - returns 200 while operational, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        // Bodies of any size reach the handler, which owns every error reply
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Start the API server on an already bound listener
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %listener.local_addr()?, "Starting API server");
    axum::serve(listener, app).await?;

    Ok(())
}
