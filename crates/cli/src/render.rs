//! Rendering of the assessment screen
//!
//! Pure functions from [`FormState`] to text, so the commands only decide
//! what to print and where.

use colored::Colorize;
use risk_lib::risk::{format_probability, recommendation};
use risk_lib::{Field, PredictionResult, RiskBand};
use tabled::{settings::Style, Table, Tabled};

use crate::form::FormState;

const DISCLAIMER: &str = "Note: This assessment is for informational purposes only and should not replace professional medical advice.";

/// One band of a risk-factor reference table
#[derive(Tabled)]
struct GuideRow {
    #[tabled(rename = "Level")]
    level: &'static str,
    #[tabled(rename = "Range")]
    range: &'static str,
}

/// Reference bands shown alongside the form
pub const RISK_FACTOR_GUIDE: [(&str, [(&str, &str); 3]); 3] = [
    (
        "Blood Pressure",
        [
            ("Normal", "Less than 120/80 mmHg"),
            ("Elevated", "120-129/<80 mmHg"),
            ("High", "130/80 mmHg or higher"),
        ],
    ),
    (
        "Cholesterol Levels",
        [
            ("Desirable", "Less than 200 mg/dL"),
            ("Borderline", "200-239 mg/dL"),
            ("High", "240 mg/dL and above"),
        ],
    ),
    (
        "Fasting Blood Sugar",
        [
            ("Normal", "Less than 100 mg/dL"),
            ("Prediabetes", "100-125 mg/dL"),
            ("Diabetes", "126 mg/dL or higher"),
        ],
    ),
];

/// Heart disease risk factors guide
pub fn render_guide() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Heart Disease Risk Factors Guide".bold()));
    out.push_str(&format!("{}\n", "=".repeat(50)));

    for (title, bands) in RISK_FACTOR_GUIDE {
        let rows: Vec<GuideRow> = bands
            .iter()
            .map(|&(level, range)| GuideRow { level, range })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        out.push_str(&format!("\n{}\n{}\n", title.bold().blue(), table));
    }

    out
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    label: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Values that will be (or were) submitted
pub fn render_form_summary(state: &FormState) -> String {
    let rows: Vec<FieldRow> = Field::ALL
        .iter()
        .map(|field| {
            let value = state.form.get(*field);
            FieldRow {
                label: field.label(),
                value: if value.is_empty() {
                    "-".to_string()
                } else {
                    display_value(*field, value)
                },
            }
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn display_value(field: Field, value: &str) -> String {
    match (field, value) {
        (Field::Sex, "1") => "Male".to_string(),
        (Field::Sex, "0") => "Female".to_string(),
        _ => value.to_string(),
    }
}

/// Assessment result block for a prediction
pub fn render_prediction(prediction: &PredictionResult) -> String {
    let probability = prediction.probability;
    let band = RiskBand::from_probability(probability);

    let headline = format!("Risk level: {}", format_probability(probability));
    let advice = recommendation(probability);
    let advice = if risk_lib::risk::needs_consultation(probability) {
        advice.red().bold()
    } else {
        advice.green()
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", "Assessment Result".bold()));
    out.push_str(&format!("{}\n", "-".repeat(50)));
    out.push_str(&format!("{}\n", crate::output::color_risk(&headline, band).bold()));
    out.push_str(&format!("{}\n", advice));
    if let Some(level) = &prediction.risk_level {
        out.push_str(&format!("Model label: {}\n", level));
    }
    out.push_str(&format!(
        "Assessed at: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    ));
    out.push_str(&format!("\n{}\n", DISCLAIMER.dimmed()));
    out
}

/// Full assessment screen: heading, error box, submit state and result
pub fn render_assessment(state: &FormState) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Heart Disease Risk Assessment".bold()));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&render_form_summary(state));
    out.push('\n');

    if let Some(error) = &state.error {
        out.push_str(&format!("{} {}\n", "✗".red().bold(), error.red()));
    }

    if state.loading {
        out.push_str(&format!("{}\n", state.submit_label().dimmed()));
    }

    if let Some(prediction) = &state.prediction {
        out.push('\n');
        out.push_str(&render_prediction(prediction));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: f64) -> PredictionResult {
        PredictionResult {
            probability,
            risk_level: None,
            debug_info: None,
        }
    }

    #[test]
    fn test_guide_lists_all_bands() {
        let guide = render_guide();
        for (title, bands) in RISK_FACTOR_GUIDE {
            assert!(guide.contains(title));
            for (level, range) in bands {
                assert!(guide.contains(level));
                assert!(guide.contains(range));
            }
        }
    }

    #[test]
    fn test_high_risk_prediction_rendering() {
        let text = render_prediction(&prediction(0.82));
        assert!(text.contains("Risk level: 82.00%"));
        assert!(text.contains("High risk - Please consult a healthcare professional"));
        assert!(text.contains("informational purposes only"));
    }

    #[test]
    fn test_low_risk_prediction_rendering() {
        let text = render_prediction(&prediction(0.5));
        assert!(text.contains("Risk level: 50.00%"));
        assert!(text.contains("Lower risk - Continue maintaining a healthy lifestyle"));
    }

    #[test]
    fn test_model_label_shown_when_present() {
        let mut result = prediction(0.3);
        result.risk_level = Some("Low".to_string());
        assert!(render_prediction(&result).contains("Model label: Low"));
    }

    #[test]
    fn test_assessment_shows_error_and_hides_missing_prediction() {
        let mut state = FormState::new();
        state.error = Some("Prediction failed".to_string());

        let text = render_assessment(&state);
        assert!(text.contains("Prediction failed"));
        assert!(!text.contains("Assessment Result"));
    }

    #[test]
    fn test_form_summary_shows_labels_and_values() {
        let mut state = FormState::new();
        state.on_field_change(Field::Age, "61");

        let text = render_form_summary(&state);
        assert!(text.contains("Age"));
        assert!(text.contains("61"));
        assert!(text.contains("Male"));
        assert!(text.contains("Cholesterol (mg/dl)"));
    }
}
