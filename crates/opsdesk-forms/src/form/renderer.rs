//! Field renderers
//!
//! Maps a [`FieldDescriptor`] to a concrete control and converts raw user
//! input back into a record value. Renderers are looked up by [`FieldKind`]
//! in a [`RendererRegistry`]; adding a control means adding a kind and
//! registering a renderer for it.

use super::state::FieldStatus;
use crate::config::FormMode;
use crate::domain::field::{EmptyNumber, FieldDescriptor, FieldKind, FieldOption};
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// HTML-style input type for single-line inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Email,
    Tel,
    Number,
    Date,
}

/// Concrete control a UI surface should draw
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "lowercase")]
pub enum Control {
    Input { input_type: InputType },
    Select { options: Vec<FieldOption> },
    TextArea { rows: u16 },
    Checkbox,
}

/// Raw value coming from a control
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Checked(bool),
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for RawInput {
    fn from(b: bool) -> Self {
        Self::Checked(b)
    }
}

/// View model for one field
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub control: Control,
    /// Current value as the control displays it
    pub display: String,
    pub checked: bool,
    pub required: bool,
    pub disabled: bool,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub error: Option<String>,
    pub status: FieldStatus,
}

/// View model for one section
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<RenderedField>,
}

/// Binds one field kind to a control
pub trait FieldRenderer: Send + Sync {
    /// Control for this descriptor
    fn control(&self, field: &FieldDescriptor) -> Control;

    /// Record value to display text
    fn display(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Raw input to record value; `Err` carries a field error message
    fn coerce(&self, field: &FieldDescriptor, input: RawInput) -> Result<Value, String>;
}

/// Single-line text-like inputs
pub struct TextRenderer {
    input_type: InputType,
}

impl TextRenderer {
    pub const fn new(input_type: InputType) -> Self {
        Self { input_type }
    }
}

impl FieldRenderer for TextRenderer {
    fn control(&self, _field: &FieldDescriptor) -> Control {
        Control::Input {
            input_type: self.input_type,
        }
    }

    fn coerce(&self, _field: &FieldDescriptor, input: RawInput) -> Result<Value, String> {
        match input {
            RawInput::Text(s) => Ok(Value::String(s)),
            RawInput::Checked(b) => Ok(Value::String(b.to_string())),
        }
    }
}

/// Numeric input
pub struct NumberRenderer;

impl FieldRenderer for NumberRenderer {
    fn control(&self, _field: &FieldDescriptor) -> Control {
        Control::Input {
            input_type: InputType::Number,
        }
    }

    fn coerce(&self, field: &FieldDescriptor, input: RawInput) -> Result<Value, String> {
        let RawInput::Text(text) = input else {
            return Err("Must be a number".into());
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(match field.empty_number {
                EmptyNumber::Zero => Value::from(0),
                EmptyNumber::Absent => Value::Null,
            });
        }
        let n: f64 = text.parse().map_err(|_| "Must be a number".to_string())?;
        number_value(n).ok_or_else(|| "Must be a number".to_string())
    }
}

/// Integral values stay integers so they deserialize into integer fields
fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Option list
pub struct SelectRenderer;

impl FieldRenderer for SelectRenderer {
    fn control(&self, field: &FieldDescriptor) -> Control {
        Control::Select {
            options: field.options.clone(),
        }
    }

    fn coerce(&self, field: &FieldDescriptor, input: RawInput) -> Result<Value, String> {
        let RawInput::Text(text) = input else {
            return Err("Select a valid option".into());
        };
        if text.is_empty() || field.options.iter().any(|o| o.value == text) {
            Ok(Value::String(text))
        } else {
            Err("Select a valid option".into())
        }
    }
}

/// Multi-line text
pub struct TextareaRenderer;

impl FieldRenderer for TextareaRenderer {
    fn control(&self, field: &FieldDescriptor) -> Control {
        Control::TextArea {
            rows: field.rows.unwrap_or(3),
        }
    }

    fn coerce(&self, _field: &FieldDescriptor, input: RawInput) -> Result<Value, String> {
        match input {
            RawInput::Text(s) => Ok(Value::String(s)),
            RawInput::Checked(_) => Err("Expected text".into()),
        }
    }
}

/// Boolean toggle
pub struct CheckboxRenderer;

impl FieldRenderer for CheckboxRenderer {
    fn control(&self, _field: &FieldDescriptor) -> Control {
        Control::Checkbox
    }

    fn coerce(&self, _field: &FieldDescriptor, input: RawInput) -> Result<Value, String> {
        match input {
            RawInput::Checked(b) => Ok(Value::Bool(b)),
            RawInput::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "off" | "0" | "no" | "" => Ok(Value::Bool(false)),
                _ => Err("Expected a yes/no value".into()),
            },
        }
    }
}

/// Kind to renderer lookup table
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<FieldKind, Arc<dyn FieldRenderer>>,
    fallback: Arc<dyn FieldRenderer>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererRegistry {
    /// Registry with a renderer for every built-in kind
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(FieldKind::Text, TextRenderer::new(InputType::Text));
        registry.register(FieldKind::Email, TextRenderer::new(InputType::Email));
        registry.register(FieldKind::Tel, TextRenderer::new(InputType::Tel));
        registry.register(FieldKind::Date, TextRenderer::new(InputType::Date));
        registry.register(FieldKind::Number, NumberRenderer);
        registry.register(FieldKind::Select, SelectRenderer);
        registry.register(FieldKind::Textarea, TextareaRenderer);
        registry.register(FieldKind::Checkbox, CheckboxRenderer);
        registry
    }

    /// Registry where every kind falls back to a plain text input
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Arc::new(TextRenderer::new(InputType::Text)),
        }
    }

    /// Install or replace the renderer for a kind
    pub fn register(&mut self, kind: FieldKind, renderer: impl FieldRenderer + 'static) {
        self.renderers.insert(kind, Arc::new(renderer));
    }

    /// Renderer for a kind, plain text input if none registered
    pub fn get(&self, kind: FieldKind) -> &dyn FieldRenderer {
        self.renderers
            .get(&kind)
            .map(|r| r.as_ref())
            .unwrap_or_else(|| self.fallback.as_ref())
    }

    /// Build the view model for one field
    pub fn render_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        status: FieldStatus,
        error: Option<&str>,
        mode: FormMode,
    ) -> RenderedField {
        let renderer = self.get(field.kind);
        RenderedField {
            name: field.name.clone(),
            label: field.label.clone(),
            control: renderer.control(field),
            display: renderer.display(value),
            checked: value.as_bool().unwrap_or(false),
            required: field.required,
            disabled: field.is_disabled_in(mode),
            placeholder: field.placeholder.clone(),
            help: field.help.clone(),
            error: error.map(str::to_owned),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_kind() {
        let registry = RendererRegistry::new();
        let field = FieldDescriptor::new("email", "Email", FieldKind::Email);
        assert_eq!(
            registry.get(field.kind).control(&field),
            Control::Input {
                input_type: InputType::Email
            }
        );
        let notes = FieldDescriptor::new("notes", "Notes", FieldKind::Textarea).rows(6);
        assert_eq!(registry.get(notes.kind).control(&notes), Control::TextArea { rows: 6 });
    }

    #[test]
    fn test_unregistered_kind_falls_back_to_text() {
        let registry = RendererRegistry::empty();
        let field = FieldDescriptor::number("age", "Age");
        assert_eq!(
            registry.get(field.kind).control(&field),
            Control::Input {
                input_type: InputType::Text
            }
        );
    }

    #[test]
    fn test_number_coercion() {
        let renderer = NumberRenderer;
        let zero = FieldDescriptor::number("age", "Age");
        let absent = FieldDescriptor::number("cost", "Cost").empty_number(EmptyNumber::Absent);
        assert_eq!(renderer.coerce(&zero, "5".into()), Ok(json!(5)));
        assert_eq!(renderer.coerce(&zero, "2.5".into()), Ok(json!(2.5)));
        assert_eq!(renderer.coerce(&zero, "".into()), Ok(json!(0)));
        assert_eq!(renderer.coerce(&absent, " ".into()), Ok(Value::Null));
        assert_eq!(renderer.coerce(&zero, "abc".into()), Err("Must be a number".into()));
        assert_eq!(renderer.coerce(&zero, "NaN".into()), Err("Must be a number".into()));
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let field = FieldDescriptor::select(
            "vehicle",
            "Vehicle",
            vec![FieldOption::new("van", "Van"), FieldOption::new("bike", "Bike")],
        );
        assert_eq!(SelectRenderer.coerce(&field, "van".into()), Ok(json!("van")));
        assert!(SelectRenderer.coerce(&field, "truck".into()).is_err());
    }

    #[test]
    fn test_checkbox_coercion() {
        let field = FieldDescriptor::new("active", "Active", FieldKind::Checkbox);
        assert_eq!(CheckboxRenderer.coerce(&field, true.into()), Ok(json!(true)));
        assert_eq!(CheckboxRenderer.coerce(&field, "on".into()), Ok(json!(true)));
    }

    #[test]
    fn test_render_field_view_model() {
        let registry = RendererRegistry::new();
        let field = FieldDescriptor::text("code", "Code").required().lock_on_edit();
        let rendered = registry.render_field(
            &field,
            &json!("CR-1"),
            FieldStatus::Invalid,
            Some("Code taken"),
            FormMode::Edit,
        );
        assert_eq!(rendered.display, "CR-1");
        assert!(rendered.disabled);
        assert!(rendered.required);
        assert_eq!(rendered.error.as_deref(), Some("Code taken"));
    }
}
