//! Observability infrastructure for the prediction server
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, in-flight requests, predictor info)
//! - Structured JSON logging with tracing

use crate::risk::RiskBand;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for predictor round trips (in seconds); the predictor
/// is a fresh interpreter per request, so latencies start in the tens of ms
const PREDICTION_LATENCY_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServerMetricsInner> = OnceLock::new();

struct ServerMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    requests_in_flight: IntGauge,
    predictor_info: GaugeVec,
}

impl ServerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "heart_risk_prediction_latency_seconds",
                "Time from request receipt to predictor exit",
                PREDICTION_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "heart_risk_predictions_total",
                "Total number of predictions served successfully"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "heart_risk_prediction_errors_total",
                "Total number of failed prediction requests by failure kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            requests_in_flight: register_int_gauge!(
                "heart_risk_requests_in_flight",
                "Prediction requests currently waiting on a predictor process"
            )
            .expect("Failed to register requests_in_flight"),

            predictor_info: register_gauge_vec!(
                "heart_risk_predictor_info",
                "Information about the configured external predictor",
                &["program", "script"]
            )
            .expect("Failed to register predictor_info"),
        }
    }
}

/// Server metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServerMetrics {
    _private: (),
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServerMetricsInner {
        GLOBAL_METRICS.get_or_init(ServerMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Mark a request as waiting on the predictor until the guard drops
    pub fn track_in_flight(&self) -> InFlightGuard {
        let gauge = self.inner().requests_in_flight.clone();
        gauge.inc();
        InFlightGuard { gauge }
    }

    pub fn set_predictor_info(&self, program: &str, script: &str) {
        self.inner().predictor_info.reset();
        self.inner()
            .predictor_info
            .with_label_values(&[program, script])
            .set(1.0);
    }
}

/// Decrements the in-flight gauge when dropped
pub struct InFlightGuard {
    gauge: IntGauge,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

/// Structured logger for server events
///
/// Provides consistent JSON-formatted logging for predictions and
/// lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance_name: String,
}

impl StructuredLogger {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
        }
    }

    /// Log a successfully served prediction
    pub fn log_prediction(&self, probability: Option<f64>, duration_ms: u64) {
        let band = probability.map(|p| RiskBand::from_probability(p).as_str());
        info!(
            event = "prediction_served",
            instance = %self.instance_name,
            probability = ?probability,
            risk_band = ?band,
            duration_ms = duration_ms,
            "Served risk prediction"
        );
    }

    /// Log a failed prediction request
    pub fn log_prediction_failure(&self, kind: &str, detail: &str, duration_ms: u64) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance_name,
            kind = %kind,
            detail = %detail,
            duration_ms = duration_ms,
            "Prediction request failed"
        );
    }

    pub fn log_startup(&self, version: &str, predictor: &str) {
        info!(
            event = "server_started",
            instance = %self.instance_name,
            server_version = %version,
            predictor = %predictor,
            "Heart risk server started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            instance = %self.instance_name,
            reason = %reason,
            "Heart risk server shutting down"
        );
    }

    /// Log a predictor script that could not be found at startup
    pub fn log_missing_script(&self, script: &str) {
        warn!(
            event = "predictor_script_missing",
            instance = %self.instance_name,
            script = %script,
            "Predictor script not found; predictions will fail until it exists"
        );
    }
}
