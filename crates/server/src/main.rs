//! Heart risk server - prediction route in front of an external model script
//!
//! Each `POST /api/predict` spawns the configured predictor once and relays
//! its JSON output.

use anyhow::{Context, Result};
use heart_risk_server::{api, ServerConfig};
use risk_lib::{
    health::{components, HealthRegistry},
    Predictor, ScriptPredictor, ServerMetrics, StructuredLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting heart-risk-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        addr = %config.listen_addr(),
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.register(components::PREDICTOR).await;

    let predictor = ScriptPredictor::new(config.predictor_config());
    let logger = StructuredLogger::new(&config.instance_name);

    let metrics = ServerMetrics::new();
    metrics.set_predictor_info(
        &config.predictor_program,
        &config.predictor_script.display().to_string(),
    );

    let script = predictor.script_path();
    if tokio::fs::metadata(&script).await.is_err() {
        logger.log_missing_script(&script.display().to_string());
        health_registry
            .set_degraded(components::PREDICTOR, "Predictor script not found")
            .await;
    }

    logger.log_startup(SERVER_VERSION, &predictor.describe());

    let predictor: Arc<dyn Predictor> = Arc::new(predictor);
    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
        predictor,
    ));

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;

    health_registry.set_ready(true).await;

    tokio::select! {
        result = api::serve(listener, app_state) => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
