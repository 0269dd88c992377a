//! Field and form descriptors
//!
//! A [`FormConfig`] is plain data: it can be built in code with the builder
//! methods below or deserialized from JSON.

use crate::config::FormMode;
use crate::error::{FormsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Input kind tag; selects the renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Date,
    Select,
    Textarea,
    Checkbox,
}

impl FieldKind {
    /// All kinds in declaration order
    pub const ALL: [FieldKind; 8] = [
        FieldKind::Text,
        FieldKind::Email,
        FieldKind::Tel,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::Textarea,
        FieldKind::Checkbox,
    ];
}

/// How an empty number input is stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyNumber {
    /// Store `0`
    #[default]
    Zero,
    /// Store `null` (record field must be an `Option`)
    Absent,
}

/// Select option
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One input on a form
///
/// # Invariants
/// - `name` is unique within a form
/// - `name` addresses a property of the record the form edits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub disabled: bool,
    /// Disabled once the record exists (e.g. identifying codes)
    #[serde(default)]
    pub lock_on_edit: bool,
    #[serde(default)]
    pub empty_number: EmptyNumber,
    /// Textarea height
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub help: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            options: Vec::new(),
            disabled: false,
            lock_on_edit: false,
            empty_number: EmptyNumber::default(),
            rows: None,
            help: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<FieldOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select).with_options(options)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn lock_on_edit(mut self) -> Self {
        self.lock_on_edit = true;
        self
    }

    pub fn empty_number(mut self, policy: EmptyNumber) -> Self {
        self.empty_number = policy;
        self
    }

    pub fn rows(mut self, rows: u16) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Effective disabled state for a mode
    pub fn is_disabled_in(&self, mode: FormMode) -> bool {
        self.disabled || (self.lock_on_edit && mode == FormMode::Edit)
    }
}

/// Titled group of fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl FormSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Ordered sections; render order is declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub sections: Vec<FormSection>,
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: FormSection) -> Self {
        self.sections.push(section);
        self
    }

    /// All fields across sections, in render order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|f| f.name == name)
    }

    /// Reject duplicate field names
    pub fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.name.as_str()) {
                return Err(FormsError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }
}
