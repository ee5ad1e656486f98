//! Child-process predictor
//!
//! Runs `<program> <script> <json-array>` once per prediction. The child has
//! no stdin, both output streams are captured until exit, and the process is
//! killed if the invocation future is dropped (deadline or caller going
//! away), so every path ends with the child reaped.

use super::{PredictError, Predictor};
use crate::features::FeatureVector;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Configuration for the prediction script invocation
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Interpreter or executable to launch (e.g. "python")
    pub program: String,
    /// Script passed as the first argument
    pub script: PathBuf,
    /// Working directory for the child; inherits ours when unset
    pub working_dir: Option<PathBuf>,
    /// Deadline for one invocation; unset means wait indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            script: PathBuf::from("predict.py"),
            working_dir: None,
            timeout: None,
        }
    }
}

/// Predictor backed by an external script
#[derive(Debug, Clone)]
pub struct ScriptPredictor {
    config: PredictorConfig,
}

impl ScriptPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Resolved location of the script, relative to the working directory
    pub fn script_path(&self) -> PathBuf {
        match &self.config.working_dir {
            Some(dir) if self.config.script.is_relative() => dir.join(&self.config.script),
            _ => self.config.script.clone(),
        }
    }

    fn command(&self, payload: &str) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg(&self.config.script)
            .arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl Predictor for ScriptPredictor {
    async fn predict(&self, features: &FeatureVector) -> Result<Value, PredictError> {
        let payload = features.to_json().map_err(PredictError::Request)?;
        let start = Instant::now();

        let child = self.command(&payload).spawn().map_err(PredictError::Spawn)?;
        let wait = child.wait_with_output();

        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| PredictError::Timeout(limit))?,
            None => wait.await,
        }
        .map_err(PredictError::Io)?;

        if !output.stderr.is_empty() {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "Predictor wrote to stderr"
            );
        }

        if !output.status.success() {
            return Err(PredictError::NonZeroExit {
                code: output.status.code(),
            });
        }

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "Predictor exited cleanly"
        );

        serde_json::from_slice(&output.stdout).map_err(PredictError::InvalidOutput)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.config.program, self.config.script.display())
    }
}
