//! External prediction boundary
//!
//! The trained model lives outside this workspace. A [`Predictor`] turns a
//! [`FeatureVector`] into the predictor's JSON output; [`ScriptPredictor`]
//! does so by running the prediction script as a child process.

mod process;

pub use process::{PredictorConfig, ScriptPredictor};

use crate::features::FeatureVector;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Failures on the way from a request body to a parsed prediction.
///
/// The `Display` text of each variant is the message returned to clients.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// The request body was not a usable JSON object
    #[error("Error processing request")]
    Request(#[source] serde_json::Error),

    /// The request body was JSON `null`, which has no fields to read
    #[error("Error processing request")]
    NullBody,

    /// The predictor process could not be started
    #[error("Prediction failed")]
    Spawn(#[source] std::io::Error),

    /// Waiting on the predictor process failed
    #[error("Prediction failed")]
    Io(#[source] std::io::Error),

    /// The predictor exited unsuccessfully; `None` when killed by a signal
    #[error("Prediction failed")]
    NonZeroExit { code: Option<i32> },

    /// The predictor did not finish within the configured deadline
    #[error("Prediction failed")]
    Timeout(Duration),

    /// The predictor exited cleanly but its output was not JSON
    #[error("Invalid prediction result")]
    InvalidOutput(#[source] serde_json::Error),
}

impl PredictError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Request(_) | PredictError::NullBody => "bad_request",
            PredictError::Spawn(_) => "spawn",
            PredictError::Io(_) => "io",
            PredictError::NonZeroExit { .. } => "non_zero_exit",
            PredictError::Timeout(_) => "timeout",
            PredictError::InvalidOutput(_) => "invalid_output",
        }
    }

    /// Whether the failure points at the predictor rather than the caller
    pub fn is_predictor_fault(&self) -> bool {
        !matches!(self, PredictError::Request(_) | PredictError::NullBody)
    }
}

/// Trait for prediction implementations
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Run one prediction, returning the predictor's output verbatim
    async fn predict(&self, features: &FeatureVector) -> Result<Value, PredictError>;

    /// Human-readable description of the backing predictor
    fn describe(&self) -> String;
}
