//! Output formatting utilities

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use risk_lib::RiskBand;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and coloured text (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Orange is not one of the 16 ANSI colours
fn orange(text: &str) -> ColoredString {
    text.truecolor(255, 140, 0)
}

/// Colour text by risk band: red, orange or green
pub fn color_risk(text: &str, band: RiskBand) -> ColoredString {
    match band {
        RiskBand::High => text.red(),
        RiskBand::Elevated => orange(text),
        RiskBand::Low => text.green(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" | "warning" => status.yellow().to_string(),
        "unhealthy" | "error" | "failed" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}
