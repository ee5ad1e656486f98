//! Risk assessment command

use anyhow::{Context, Result};
use clap::Args;
use risk_lib::Field;
use std::io::{BufRead, Write};

use crate::client::PredictionApi;
use crate::form::FormState;
use crate::output::{print_error, OutputFormat};
use crate::render::{render_assessment, render_guide};

/// Form values for an assessment; omitted fields keep their defaults
#[derive(Args, Debug, Default)]
pub struct AssessArgs {
    /// Age in years (1-120)
    #[arg(long)]
    pub age: Option<String>,

    /// Sex: male/female (or 1/0)
    #[arg(long)]
    pub sex: Option<String>,

    /// Chest pain type (0-3)
    #[arg(long)]
    pub cp: Option<String>,

    /// Resting blood pressure in mm Hg (0-300)
    #[arg(long, visible_alias = "blood-pressure")]
    pub trestbps: Option<String>,

    /// Serum cholesterol in mg/dl (0-600)
    #[arg(long, visible_alias = "cholesterol")]
    pub chol: Option<String>,

    /// Fasting blood sugar above 120 mg/dl (1) or not (0)
    #[arg(long)]
    pub fbs: Option<String>,

    /// Resting ECG result (0-2)
    #[arg(long)]
    pub restecg: Option<String>,

    /// Maximum heart rate achieved
    #[arg(long, visible_alias = "max-heart-rate")]
    pub thalach: Option<String>,

    /// Exercise induced angina (1) or not (0)
    #[arg(long)]
    pub exang: Option<String>,

    /// ST depression induced by exercise relative to rest
    #[arg(long)]
    pub oldpeak: Option<String>,

    /// Slope of the peak exercise ST segment (0-2)
    #[arg(long)]
    pub slope: Option<String>,

    /// Number of major vessels coloured by fluoroscopy (0-3)
    #[arg(long)]
    pub ca: Option<String>,

    /// Thalassemia
    #[arg(long)]
    pub thal: Option<String>,

    /// Set a field by its form name, e.g. `--set oldpeak=1.4` (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Prompt for age, sex, blood pressure and cholesterol on stdin
    #[arg(long, short)]
    pub interactive: bool,
}

impl AssessArgs {
    /// Values given on the command line, in form order
    pub fn provided(&self) -> Vec<(Field, &str)> {
        let values = [
            &self.age,
            &self.sex,
            &self.cp,
            &self.trestbps,
            &self.chol,
            &self.fbs,
            &self.restecg,
            &self.thalach,
            &self.exang,
            &self.oldpeak,
            &self.slope,
            &self.ca,
            &self.thal,
        ];
        Field::ALL
            .iter()
            .zip(values)
            .filter_map(|(field, value)| value.as_deref().map(|v| (*field, v)))
            .collect()
    }
}

/// Map select-style input onto the encoded form value
pub fn normalize_input(field: Field, value: &str) -> String {
    let value = value.trim();
    match field {
        Field::Sex => match value.to_ascii_lowercase().as_str() {
            "male" | "m" => "1".to_string(),
            "female" | "f" => "0".to_string(),
            _ => value.to_string(),
        },
        _ => value.to_string(),
    }
}

/// Ask for each user-editable field; an empty answer keeps the current value
pub fn prompt_fields<R: BufRead, W: Write>(
    state: &mut FormState,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    for field in Field::EDITABLE {
        let current = state.form.get(field);
        let hint = match field {
            Field::Sex => " (male/female)",
            _ => "",
        };
        write!(output, "{}{} [{}]: ", field.label(), hint, current)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        let answer = line.trim();
        if !answer.is_empty() {
            state.on_field_change(field, normalize_input(field, answer));
        }
    }
    Ok(())
}

/// Collect the form, submit it and print the outcome.
///
/// Returns `false` when no prediction was produced.
pub async fn run_assessment(
    api: &dyn PredictionApi,
    args: AssessArgs,
    format: OutputFormat,
) -> Result<bool> {
    let mut state = FormState::new();
    for (field, value) in args.provided() {
        state.on_field_change(field, normalize_input(field, value));
    }

    for entry in &args.set {
        let (name, value) = entry
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE, got '{}'", entry))?;
        state.on_named_change(name.trim(), value.trim())?;
    }

    if args.interactive {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        prompt_fields(&mut state, &mut stdin.lock(), &mut stdout)?;
    }

    if format == OutputFormat::Table {
        println!("{}", render_guide());
        println!("{}", state.submit_label());
    }

    state.submit(api).await;

    match format {
        OutputFormat::Json => match (&state.prediction, &state.error) {
            (Some(prediction), None) => {
                println!("{}", serde_json::to_string_pretty(prediction)?);
            }
            (_, error) => {
                let message = error.as_deref().unwrap_or("Error making prediction");
                println!("{}", serde_json::json!({ "error": message }));
            }
        },
        OutputFormat::Table => {
            println!("{}", render_assessment(&state));
            if state.error.is_some() {
                print_error("No prediction was made");
            }
        }
    }

    Ok(state.error.is_none() && state.prediction.is_some())
}
