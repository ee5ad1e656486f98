//! Assessment form state
//!
//! All mutable UI state lives in [`FormState`], which the commands drive and
//! the renderer reads. Submission validates first, then talks to the server
//! through a [`PredictionApi`].

use crate::client::PredictionApi;
use risk_lib::models::UnknownField;
use risk_lib::{validate, Field, FormData, PredictionResult};
use tracing::debug;

/// State of one assessment form session
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub form: FormData,
    pub prediction: Option<PredictionResult>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update one field; any pending error is cleared
    pub fn on_field_change(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        self.error = None;
    }

    /// Update a field by its wire name
    pub fn on_named_change(&mut self, name: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let field = name.parse::<Field>()?;
        self.on_field_change(field, value);
        Ok(())
    }

    /// Validation messages for the current form, empty when it may be sent
    pub fn validation_errors(&self) -> Vec<String> {
        validate(&self.form)
            .into_iter()
            .map(|err| err.to_string())
            .collect()
    }

    /// Validate, send the form, and record the outcome.
    ///
    /// `loading` is cleared before the outcome is applied, whichever way the
    /// request went. A successful prediction replaces the previous one; a
    /// failure leaves the previous prediction in place and sets `error`.
    pub async fn submit(&mut self, api: &dyn PredictionApi) {
        let problems = self.validation_errors();
        if !problems.is_empty() {
            self.error = Some(problems.join("; "));
            return;
        }

        self.loading = true;
        self.error = None;
        debug!(form = ?self.form, "Submitting form data");

        let outcome = api.predict(&self.form).await;
        self.loading = false;

        match outcome {
            Ok(prediction) => {
                debug!(probability = prediction.probability, "Received prediction");
                self.prediction = Some(prediction);
            }
            Err(err) => {
                debug!(error = ?err, "Prediction request failed");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Label of the submit control
    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Processing..."
        } else {
            "Check Risk"
        }
    }
}
