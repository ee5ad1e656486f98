//! Qualitative risk bands derived from a predicted probability

use serde::{Deserialize, Serialize};

/// Probability above which a result is shown as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probability above which a result is shown as elevated risk and the
/// recommendation switches to consulting a professional
pub const ELEVATED_RISK_THRESHOLD: f64 = 0.5;

/// Display band for a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Elevated,
    High,
}

impl RiskBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskBand::High
        } else if probability > ELEVATED_RISK_THRESHOLD {
            RiskBand::Elevated
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Elevated => "elevated",
            RiskBand::High => "high",
        }
    }
}

/// Whether the recommendation should advise seeing a professional
pub fn needs_consultation(probability: f64) -> bool {
    probability > ELEVATED_RISK_THRESHOLD
}

/// Recommendation shown under the risk percentage
pub fn recommendation(probability: f64) -> &'static str {
    if needs_consultation(probability) {
        "High risk - Please consult a healthcare professional for a thorough evaluation"
    } else {
        "Lower risk - Continue maintaining a healthy lifestyle and regular check-ups"
    }
}

/// Probability as a percentage with two decimals, e.g. `82.00%`
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
