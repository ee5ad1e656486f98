//! Feature vector construction for the external predictor
//!
//! Maps a submitted form (as loosely typed JSON) onto the fixed 13-slot
//! order the predictor was trained on. Three slots are pinned to constants
//! and never read from the submission: `cp` and `restecg` are always 0 and
//! `thal` is always 1.

use crate::models::Field;
use serde_json::{Map, Value};

/// Number of slots in the feature vector
pub const FEATURE_COUNT: usize = 13;

/// Constant sent in the chest pain slot
pub const CP_CONSTANT: f64 = 0.0;

/// Constant sent in the resting ECG slot
pub const RESTECG_CONSTANT: f64 = 0.0;

/// Constant sent in the thalassemia slot
pub const THAL_CONSTANT: f64 = 1.0;

/// Fallback maximum heart rate when none was submitted
pub const DEFAULT_THALACH: f64 = 150.0;

/// Ordered numeric input for the predictor; position carries meaning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build the vector from a submitted form object.
    ///
    /// Missing or unparseable values become NaN. `thalach`, `oldpeak` and
    /// `slope` fall back to their defaults when the submitted value is falsy.
    pub fn from_submission(data: &Map<String, Value>) -> Self {
        let field = |f: Field| data.get(f.name());

        Self([
            parse_float(field(Field::Age)),
            parse_float(field(Field::Sex)),
            CP_CONSTANT,
            parse_float(field(Field::Trestbps)),
            parse_float(field(Field::Chol)),
            parse_float(field(Field::Fbs)),
            RESTECG_CONSTANT,
            parse_float_or(field(Field::Thalach), DEFAULT_THALACH),
            parse_float(field(Field::Exang)),
            parse_float_or(field(Field::Oldpeak), 0.0),
            parse_float_or(field(Field::Slope), 0.0),
            parse_float(field(Field::Ca)),
            THAL_CONSTANT,
        ])
    }

    /// Value in the slot for `field`
    pub fn get(&self, field: Field) -> f64 {
        self.0[field as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Serialize as a JSON array; NaN slots are written as `null`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n == 0.0 || n.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

fn parse_float_or(value: Option<&Value>, fallback: f64) -> f64 {
    if is_falsy(value) {
        fallback
    } else {
        parse_float(value)
    }
}

/// Lenient float conversion: numbers pass through, strings yield their
/// leading numeric prefix, everything else is NaN.
fn parse_float(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_leading_float(s),
        Some(Value::Array(items)) if !items.is_empty() => parse_float(items.first()),
        _ => f64::NAN,
    }
}

fn parse_leading_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
