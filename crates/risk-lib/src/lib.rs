//! Shared library for heart disease risk assessment
//!
//! This crate provides the core functionality for:
//! - The assessment form data model and field validation
//! - Building the fixed-order feature vector for the predictor
//! - Invoking the external predictor process
//! - Risk banding for display
//! - Health checks and observability

pub mod features;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod risk;
pub mod validation;

pub use features::{FeatureVector, FEATURE_COUNT};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServerMetrics, StructuredLogger};
pub use predictor::{PredictError, Predictor, PredictorConfig, ScriptPredictor};
pub use risk::RiskBand;
pub use validation::{validate, ValidationError};
