//! Risk factor reference guide

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::output::OutputFormat;
use crate::render::{render_guide, RISK_FACTOR_GUIDE};

/// Guide as a JSON object keyed by factor
pub fn guide_json() -> Value {
    let factors: Map<String, Value> = RISK_FACTOR_GUIDE
        .iter()
        .map(|(title, bands)| {
            let bands: Vec<Value> = bands
                .iter()
                .map(|(level, range)| json!({ "level": level, "range": range }))
                .collect();
            (title.to_string(), Value::Array(bands))
        })
        .collect();
    Value::Object(factors)
}

/// Print the heart disease risk factors guide
pub fn show_guide(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&guide_json())?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("{}", render_guide());
        }
    }
    Ok(())
}
