//! Range validation for assessment form fields

use crate::models::FormData;
use std::ops::RangeInclusive;

const AGE_RANGE: RangeInclusive<f64> = 1.0..=120.0;
const BLOOD_PRESSURE_RANGE: RangeInclusive<f64> = 0.0..=300.0;
const CHOLESTEROL_RANGE: RangeInclusive<f64> = 0.0..=600.0;

/// A failed range check on a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Age must be between 1 and 120")]
    Age,
    #[error("Blood pressure must be between 0 and 300")]
    BloodPressure,
    #[error("Cholesterol must be between 0 and 600")]
    Cholesterol,
}

/// Check the range-constrained fields, returning every failure in form order
pub fn validate(data: &FormData) -> Vec<ValidationError> {
    let checks = [
        (&data.age, AGE_RANGE, ValidationError::Age),
        (&data.trestbps, BLOOD_PRESSURE_RANGE, ValidationError::BloodPressure),
        (&data.chol, CHOLESTEROL_RANGE, ValidationError::Cholesterol),
    ];

    checks
        .into_iter()
        .filter(|(value, range, _)| !range.contains(&to_number(value)))
        .map(|(_, _, error)| error)
        .collect()
}

/// Strict numeric conversion of a whole input string.
///
/// Blank input is zero. Unsigned `0x`/`0o`/`0b` literals are read in their
/// radix. Anything else that is not entirely a decimal number is NaN, which
/// fails every range check.
pub fn to_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(value) = radix_literal(trimmed) {
        return value;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust's float parser also accepts "inf" and "NaN" spellings
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

/// `Some` for input starting with a radix prefix; NaN when the digits are bad
fn radix_literal(input: &str) -> Option<f64> {
    let (radix, digits) = match input.get(..2)? {
        "0x" | "0X" => (16, &input[2..]),
        "0o" | "0O" => (8, &input[2..]),
        "0b" | "0B" => (2, &input[2..]),
        _ => return None,
    };

    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}
