//! Form state controller
//!
//! Owns the record being edited, the error map and the per-field status.
//!
//! ```text
//! field:  Pristine ──set──▶ Touched ──blur/submit──▶ Valid | Invalid
//! form:   Editing ──submit──▶ Submitting ──▶ Settled | Editing
//! ```

use crate::domain::record::{self, FormRecord};
use crate::error::{Result, SubmitError};
use crate::validation::{ValidationResult, Validator};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-field lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    #[default]
    Pristine,
    Touched,
    Valid,
    Invalid,
}

/// Whole-form lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormPhase {
    #[default]
    Editing,
    Submitting,
    /// Record was handed to the submit handler successfully
    Settled,
}

/// Why a submit attempt did not start
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// Another submit is still in flight
    InFlight,
    /// Validation failed; nothing reaches the handler
    Invalid(ValidationResult),
}

/// Form state controller
pub struct FormState<R> {
    initial: R,
    record: R,
    validator: Arc<dyn Validator<R>>,
    errors: ValidationResult,
    /// Input the record could not take; cleared only by a successful write
    input_errors: ValidationResult,
    statuses: HashMap<String, FieldStatus>,
    phase: FormPhase,
    submit_error: Option<String>,
}

impl<R: FormRecord> FormState<R> {
    pub fn new(initial: R, validator: Arc<dyn Validator<R>>) -> Self {
        Self {
            record: initial.clone(),
            initial,
            validator,
            errors: ValidationResult::new(),
            input_errors: ValidationResult::new(),
            statuses: HashMap::new(),
            phase: FormPhase::Editing,
            submit_error: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn record(&self) -> &R { &self.record }
    pub fn errors(&self) -> &ValidationResult { &self.errors }
    pub fn error(&self, field: &str) -> Option<&str> { self.errors.get(field) }
    pub fn phase(&self) -> FormPhase { self.phase }
    pub fn submit_error(&self) -> Option<&str> { self.submit_error.as_deref() }

    pub fn status(&self, field: &str) -> FieldStatus {
        self.statuses.get(field).copied().unwrap_or_default()
    }

    pub fn value(&self, field: &str) -> Result<Value> {
        record::read_field(&self.record, field)
    }

    /// Record differs from the initial one
    pub fn is_dirty(&self) -> bool {
        match (record::to_object(&self.record), record::to_object(&self.initial)) {
            (Ok(current), Ok(initial)) => current != initial,
            _ => false,
        }
    }

    // =========================================================================
    // Field operations
    // =========================================================================

    /// Write a value, mark the field touched and clear its error.
    /// The error is recomputed on the next blur or submit, not per keystroke.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        self.record = record::write_field(&self.record, field, value)?;
        self.statuses.insert(field.to_string(), FieldStatus::Touched);
        self.errors.remove(field);
        self.input_errors.remove(field);
        if self.phase == FormPhase::Settled {
            self.phase = FormPhase::Editing;
        }
        Ok(())
    }

    /// Attach an error that did not come from the validator (bad input, server
    /// side checks). Survives `validate_all` unless the validator covers the field.
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field, message);
        if self.errors.contains(field) {
            self.statuses.insert(field.to_string(), FieldStatus::Invalid);
        }
    }

    /// Record rejected raw input for a field. The record keeps its previous
    /// value, so the error holds until the field is successfully written;
    /// validation never clears it.
    pub fn reject_input(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        self.input_errors.insert(field, message.clone());
        self.errors.insert(field, message);
        self.statuses.insert(field.to_string(), FieldStatus::Invalid);
    }

    pub fn input_error(&self, field: &str) -> Option<&str> {
        self.input_errors.get(field)
    }

    /// Blur handler: mark touched and validate just this field
    pub fn blur(&mut self, field: &str) -> Option<String> {
        self.validate_field(field)
    }

    pub fn validate_field(&mut self, field: &str) -> Option<String> {
        let error = self
            .input_errors
            .get(field)
            .map(str::to_owned)
            .or_else(|| self.validator.validate_field(&self.record, field));
        match &error {
            Some(message) => {
                self.errors.insert(field, message.clone());
                self.statuses.insert(field.to_string(), FieldStatus::Invalid);
            }
            None => {
                self.errors.remove(field);
                self.statuses.insert(field.to_string(), FieldStatus::Valid);
            }
        }
        error
    }

    /// Validate the whole record and merge into the error map. Errors on
    /// fields the validator does not cover are kept.
    pub fn validate_all(&mut self) -> &ValidationResult {
        let result = self.validator.validate(&self.record);
        for field in self.validator.covered_fields() {
            match result.get(&field) {
                Some(message) => {
                    self.errors.insert(field.clone(), message);
                    self.statuses.insert(field, FieldStatus::Invalid);
                }
                None => {
                    self.errors.remove(&field);
                    self.statuses.insert(field, FieldStatus::Valid);
                }
            }
        }
        for (field, message) in self.input_errors.iter() {
            self.errors.insert(field, message);
            self.statuses.insert(field.to_string(), FieldStatus::Invalid);
        }
        &self.errors
    }

    // =========================================================================
    // Submit lifecycle
    // =========================================================================

    /// Validate and enter `Submitting`, handing out the record to submit
    pub fn begin_submit(&mut self) -> std::result::Result<R, SubmitBlocked> {
        if self.phase == FormPhase::Submitting {
            return Err(SubmitBlocked::InFlight);
        }
        if !self.validate_all().is_valid() {
            return Err(SubmitBlocked::Invalid(self.errors.clone()));
        }
        self.phase = FormPhase::Submitting;
        self.submit_error = None;
        Ok(self.record.clone())
    }

    /// Leave `Submitting`; a rejection returns the form to `Editing`
    pub fn finish_submit(&mut self, outcome: std::result::Result<(), SubmitError>) {
        match outcome {
            Ok(()) => {
                self.phase = FormPhase::Settled;
                self.submit_error = None;
            }
            Err(e) => {
                self.phase = FormPhase::Editing;
                self.submit_error = Some(e.message);
            }
        }
    }

    /// Back to the initial record with no errors
    pub fn reset(&mut self) {
        self.record = self.initial.clone();
        self.errors.clear();
        self.input_errors.clear();
        self.statuses.clear();
        self.submit_error = None;
        if self.phase != FormPhase::Submitting {
            self.phase = FormPhase::Editing;
        }
    }
}
