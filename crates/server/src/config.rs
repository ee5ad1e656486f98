//! Server configuration

use anyhow::{Context, Result};
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use risk_lib::PredictorConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Base name of the optional configuration file in the working directory
const CONFIG_FILE: &str = "heart-risk-server";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Address the HTTP listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP listener port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Interpreter used to run the predictor script
    #[serde(default = "default_predictor_program")]
    pub predictor_program: String,

    /// Path of the predictor script
    #[serde(default = "default_predictor_script")]
    pub predictor_script: PathBuf,

    /// Working directory for the predictor process
    #[serde(default)]
    pub predictor_working_dir: Option<PathBuf>,

    /// Deadline for one predictor run in seconds; unset waits indefinitely
    #[serde(default)]
    pub predictor_timeout_secs: Option<u64>,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "heart-risk-server".to_string())
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    3000
}

fn default_predictor_program() -> String {
    "python".to_string()
}

fn default_predictor_script() -> PathBuf {
    PathBuf::from("predict.py")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            bind_address: default_bind_address(),
            api_port: default_api_port(),
            predictor_program: default_predictor_program(),
            predictor_script: default_predictor_script(),
            predictor_working_dir: None,
            predictor_timeout_secs: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the optional config file, then `RISK_*`
    /// environment variables
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix("RISK")),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Invalid server configuration")
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }

    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            program: self.predictor_program.clone(),
            script: self.predictor_script.clone(),
            working_dir: self.predictor_working_dir.clone(),
            timeout: self
                .predictor_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}
