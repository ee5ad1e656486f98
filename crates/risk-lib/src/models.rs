//! Core data models for the risk assessment

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single assessment form field, in feature vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Age,
    Sex,
    /// Chest pain type
    Cp,
    /// Resting blood pressure (mm Hg)
    Trestbps,
    /// Serum cholesterol (mg/dl)
    Chol,
    /// Fasting blood sugar > 120 mg/dl
    Fbs,
    /// Resting ECG result
    Restecg,
    /// Maximum heart rate achieved
    Thalach,
    /// Exercise induced angina
    Exang,
    /// ST depression induced by exercise
    Oldpeak,
    /// Slope of the peak exercise ST segment
    Slope,
    /// Number of major vessels coloured by fluoroscopy
    Ca,
    /// Thalassemia
    Thal,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Age,
        Field::Sex,
        Field::Cp,
        Field::Trestbps,
        Field::Chol,
        Field::Fbs,
        Field::Restecg,
        Field::Thalach,
        Field::Exang,
        Field::Oldpeak,
        Field::Slope,
        Field::Ca,
        Field::Thal,
    ];

    /// Fields the user edits directly; the rest keep their defaults
    pub const EDITABLE: [Field; 4] = [Field::Age, Field::Sex, Field::Trestbps, Field::Chol];

    /// Wire name of the field
    pub fn name(&self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Sex => "sex",
            Field::Cp => "cp",
            Field::Trestbps => "trestbps",
            Field::Chol => "chol",
            Field::Fbs => "fbs",
            Field::Restecg => "restecg",
            Field::Thalach => "thalach",
            Field::Exang => "exang",
            Field::Oldpeak => "oldpeak",
            Field::Slope => "slope",
            Field::Ca => "ca",
            Field::Thal => "thal",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Sex => "Sex",
            Field::Cp => "Chest Pain Type",
            Field::Trestbps => "Resting Blood Pressure (mm Hg)",
            Field::Chol => "Cholesterol (mg/dl)",
            Field::Fbs => "Fasting Blood Sugar",
            Field::Restecg => "Resting ECG",
            Field::Thalach => "Maximum Heart Rate",
            Field::Exang => "Exercise Induced Angina",
            Field::Oldpeak => "ST Depression",
            Field::Slope => "Slope of Peak Exercise ST",
            Field::Ca => "Number of Major Vessels",
            Field::Thal => "Thalassemia",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a field name is not part of the form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Assessment form values, string-encoded as entered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub age: String,
    pub sex: String,
    pub cp: String,
    pub trestbps: String,
    pub chol: String,
    pub fbs: String,
    pub restecg: String,
    pub thalach: String,
    pub exang: String,
    pub oldpeak: String,
    pub slope: String,
    pub ca: String,
    pub thal: String,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            age: String::new(),
            sex: "1".to_string(),
            cp: "0".to_string(),
            trestbps: String::new(),
            chol: String::new(),
            fbs: "0".to_string(),
            restecg: "0".to_string(),
            thalach: String::new(),
            exang: "0".to_string(),
            oldpeak: String::new(),
            slope: "0".to_string(),
            ca: "0".to_string(),
            thal: "0".to_string(),
        }
    }
}

impl FormData {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Age => &self.age,
            Field::Sex => &self.sex,
            Field::Cp => &self.cp,
            Field::Trestbps => &self.trestbps,
            Field::Chol => &self.chol,
            Field::Fbs => &self.fbs,
            Field::Restecg => &self.restecg,
            Field::Thalach => &self.thalach,
            Field::Exang => &self.exang,
            Field::Oldpeak => &self.oldpeak,
            Field::Slope => &self.slope,
            Field::Ca => &self.ca,
            Field::Thal => &self.thal,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Age => &mut self.age,
            Field::Sex => &mut self.sex,
            Field::Cp => &mut self.cp,
            Field::Trestbps => &mut self.trestbps,
            Field::Chol => &mut self.chol,
            Field::Fbs => &mut self.fbs,
            Field::Restecg => &mut self.restecg,
            Field::Thalach => &mut self.thalach,
            Field::Exang => &mut self.exang,
            Field::Oldpeak => &mut self.oldpeak,
            Field::Slope => &mut self.slope,
            Field::Ca => &mut self.ca,
            Field::Thal => &mut self.thal,
        };
        *slot = value.into();
    }
}

/// Prediction produced by the external predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<serde_json::Value>,
}

/// Error body returned by the prediction route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
