//! Heart risk prediction server
//!
//! Serves `POST /api/predict`, which turns a submitted assessment form into a
//! feature vector, hands it to the external predictor script and relays the
//! result, alongside health and metrics endpoints.

pub mod api;
pub mod config;

pub use api::{create_router, serve, AppState};
pub use config::ServerConfig;
