//! Dynamic form engine
//!
//! Turns a [`FormConfig`], a validator and initial data into a live
//! [`FormInstance`] without per-form code. The engine itself never touches the
//! network; the caller's [`SubmitHandler`] does.

use super::renderer::{RawInput, RenderedField, RenderedSection, RendererRegistry};
use super::state::{FieldStatus, FormPhase, FormState, SubmitBlocked};
use crate::config::FormMode;
use crate::domain::field::FormConfig;
use crate::domain::record::{self, FormRecord};
use crate::error::{FormsError, Result, SubmitError};
use crate::validation::{ValidationResult, Validator};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives the validated record
#[async_trait]
pub trait SubmitHandler<R>: Send + Sync {
    async fn submit(&self, record: R) -> std::result::Result<(), SubmitError>;
}

/// Adapts an async closure into a [`SubmitHandler`]
pub struct FnSubmit<F>(pub F);

#[async_trait]
impl<R, F, Fut> SubmitHandler<R> for FnSubmit<F>
where
    R: Send + 'static,
    F: Fn(R) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<(), SubmitError>> + Send,
{
    async fn submit(&self, record: R) -> std::result::Result<(), SubmitError> {
        (self.0)(record).await
    }
}

/// Cancel callback
pub type CancelHandler = Box<dyn Fn() + Send + Sync>;

/// Result of a submit attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Handler resolved
    Submitted,
    /// Validation failed; handler not called
    Invalid(ValidationResult),
    /// Handler rejected; message is shown above the form
    Rejected(String),
    /// A submit is already in flight or the caller is loading
    Busy,
}

/// Enabled state of the form-level buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub submit_enabled: bool,
    pub cancel_enabled: bool,
    /// Internal submitting flag merged with the caller's loading flag
    pub busy: bool,
}

/// Field error for a coerced value the record type refused
fn mismatch_message(value: &Value) -> String {
    match value {
        Value::Number(n) if n.as_f64().is_some_and(|f| f < 0.0) => "Must be zero or more".into(),
        Value::Number(n) if !n.is_i64() && !n.is_u64() => "Must be a whole number".into(),
        Value::Number(_) => "Number is out of range".into(),
        _ => "Invalid value".into(),
    }
}

/// Builds form instances
#[derive(Clone)]
pub struct DynamicForm {
    registry: Arc<RendererRegistry>,
    mode: FormMode,
    is_loading: bool,
}

impl Default for DynamicForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicForm {
    pub fn new() -> Self {
        Self::with_registry(RendererRegistry::new())
    }

    /// Engine with custom renderers
    pub fn with_registry(registry: RendererRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            mode: FormMode::Create,
            is_loading: false,
        }
    }

    pub fn mode(mut self, mode: FormMode) -> Self {
        self.mode = mode;
        self
    }

    /// Initial external loading flag
    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    /// Mount a form.
    ///
    /// Fails if field names repeat or a field does not address a property of `R`.
    pub fn render<R, V, S>(
        &self,
        config: FormConfig,
        initial: R,
        schema: V,
        on_submit: S,
        on_cancel: Option<CancelHandler>,
    ) -> Result<FormInstance<R>>
    where
        R: FormRecord,
        V: Validator<R> + 'static,
        S: SubmitHandler<R> + 'static,
    {
        config.check_unique_names()?;
        let object = record::to_object(&initial)?;
        if let Some(missing) = config.fields().find(|f| !object.contains_key(&f.name)) {
            return Err(FormsError::UnknownField(missing.name.clone()));
        }

        info!(
            "Rendering form: {} sections, {} fields, mode={:?}",
            config.sections.len(),
            config.fields().count(),
            self.mode
        );

        Ok(FormInstance {
            config,
            mode: self.mode,
            registry: Arc::clone(&self.registry),
            state: Mutex::new(FormState::new(initial, Arc::new(schema))),
            on_submit: Arc::new(on_submit),
            on_cancel,
            external_loading: AtomicBool::new(self.is_loading),
        })
    }
}

/// A mounted form.
///
/// All methods take `&self`; wrap in an `Arc` to drive it from several tasks.
/// Fields stay editable while a submit is in flight.
pub struct FormInstance<R> {
    config: FormConfig,
    mode: FormMode,
    registry: Arc<RendererRegistry>,
    state: Mutex<FormState<R>>,
    on_submit: Arc<dyn SubmitHandler<R>>,
    on_cancel: Option<CancelHandler>,
    external_loading: AtomicBool,
}

impl<R: FormRecord> FormInstance<R> {
    pub fn config(&self) -> &FormConfig { &self.config }
    pub fn mode(&self) -> FormMode { self.mode }
    pub fn record(&self) -> R { self.state.lock().record().clone() }
    pub fn errors(&self) -> ValidationResult { self.state.lock().errors().clone() }
    pub fn phase(&self) -> FormPhase { self.state.lock().phase() }
    pub fn is_dirty(&self) -> bool { self.state.lock().is_dirty() }

    pub fn error(&self, field: &str) -> Option<String> {
        self.state.lock().error(field).map(str::to_owned)
    }

    pub fn status(&self, field: &str) -> FieldStatus {
        self.state.lock().status(field)
    }

    /// Top-level message from the last rejected submit
    pub fn submit_error(&self) -> Option<String> {
        self.state.lock().submit_error().map(str::to_owned)
    }

    /// View models for every section, in declaration order
    pub fn sections(&self) -> Vec<RenderedSection> {
        let state = self.state.lock();
        self.config
            .sections
            .iter()
            .map(|section| RenderedSection {
                title: section.title.clone(),
                description: section.description.clone(),
                fields: section
                    .fields
                    .iter()
                    .map(|field| {
                        let value = state.value(&field.name).unwrap_or(Value::Null);
                        self.registry.render_field(
                            field,
                            &value,
                            state.status(&field.name),
                            state.error(&field.name),
                            self.mode,
                        )
                    })
                    .collect(),
            })
            .collect()
    }

    /// View model for one field
    pub fn field(&self, name: &str) -> Option<RenderedField> {
        let descriptor = self.config.field(name)?;
        let state = self.state.lock();
        let value = state.value(name).unwrap_or(Value::Null);
        Some(self.registry.render_field(
            descriptor,
            &value,
            state.status(name),
            state.error(name),
            self.mode,
        ))
    }

    /// Raw input from a control. Input the renderer cannot coerce becomes a
    /// field error, as does a value the record type cannot hold (a negative
    /// number into an unsigned field). The record keeps its previous value and
    /// submit stays blocked until the field is written successfully.
    ///
    /// Only unknown and disabled fields are returned as `Err`.
    pub fn input(&self, name: &str, input: impl Into<RawInput>) -> Result<()> {
        let descriptor = self
            .config
            .field(name)
            .ok_or_else(|| FormsError::UnknownField(name.to_string()))?;
        if descriptor.is_disabled_in(self.mode) {
            return Err(FormsError::FieldDisabled(name.to_string()));
        }

        let coerced = self.registry.get(descriptor.kind).coerce(descriptor, input.into());
        let mut state = self.state.lock();
        let message = match coerced {
            Ok(value) => {
                let hint = mismatch_message(&value);
                match state.set_field(name, value) {
                    Err(FormsError::InvalidValue { reason, .. }) => {
                        debug!("Value for {} does not fit the record: {}", name, reason);
                        hint
                    }
                    other => return other,
                }
            }
            Err(message) => message,
        };
        debug!("Rejected input for {}: {}", name, message);
        state.reject_input(name, message);
        Ok(())
    }

    /// Programmatic write, e.g. merging uploaded files or a signature into the
    /// record. Works for record properties without a descriptor too.
    pub fn set_value(&self, name: &str, value: Value) -> Result<()> {
        if let Some(descriptor) = self.config.field(name) {
            if descriptor.is_disabled_in(self.mode) {
                return Err(FormsError::FieldDisabled(name.to_string()));
            }
        }
        self.state.lock().set_field(name, value)
    }

    /// Blur: validate just this field
    pub fn blur(&self, name: &str) -> Option<String> {
        self.state.lock().blur(name)
    }

    pub fn validate_all(&self) -> ValidationResult {
        self.state.lock().validate_all().clone()
    }

    /// Attach an externally produced error (e.g. a server-side uniqueness check)
    pub fn set_error(&self, field: &str, message: impl Into<String>) {
        self.state.lock().set_error(field, message);
    }

    /// Caller-side loading flag, merged into [`ControlState::busy`]
    pub fn set_loading(&self, is_loading: bool) {
        self.external_loading.store(is_loading, Ordering::SeqCst);
    }

    pub fn controls(&self) -> ControlState {
        let submitting = self.phase() == FormPhase::Submitting;
        let busy = submitting || self.external_loading.load(Ordering::SeqCst);
        ControlState {
            submit_enabled: !busy,
            cancel_enabled: !busy,
            busy,
        }
    }

    /// Validate, then hand the record to the submit handler.
    ///
    /// Invalid records never reach the handler. Whatever the handler does, the
    /// form leaves `Submitting` afterwards so the controls re-enable.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.external_loading.load(Ordering::SeqCst) {
            return SubmitOutcome::Busy;
        }

        let record = {
            let mut state = self.state.lock();
            match state.begin_submit() {
                Ok(record) => record,
                Err(SubmitBlocked::InFlight) => return SubmitOutcome::Busy,
                Err(SubmitBlocked::Invalid(errors)) => {
                    debug!("Submit blocked by {} field errors", errors.len());
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        info!("Submitting form");
        let handler = Arc::clone(&self.on_submit);
        let result = handler.submit(record).await;

        let outcome = match &result {
            Ok(()) => {
                info!("Form submitted");
                SubmitOutcome::Submitted
            }
            Err(e) => {
                warn!("Form submit rejected: {}", e);
                SubmitOutcome::Rejected(e.message.clone())
            }
        };
        self.state.lock().finish_submit(result);
        outcome
    }

    /// Invoke the cancel callback; ignored while busy
    pub fn cancel(&self) -> bool {
        if !self.controls().cancel_enabled {
            return false;
        }
        match &self.on_cancel {
            Some(on_cancel) => {
                on_cancel();
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        self.state.lock().reset();
    }
}
