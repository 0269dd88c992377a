//! Validation adapter
//!
//! Two validator shapes share one trait:
//! - [`Schema`]: declarative per-field rules plus whole-record refinements
//! - [`FieldFnMap`]: one plain function per field
//!
//! Both produce a [`ValidationResult`], so the form engine never cares which
//! one a caller picked.

pub mod function_map;
pub mod rules;
pub mod schema;

pub use function_map::FieldFnMap;
pub use rules::{parse_date, FieldRules, Rule};
pub use schema::Schema;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to error message; absent means valid
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. Empty messages count as valid and are ignored.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.errors.insert(field.into(), message);
        }
    }

    /// Record an error only if the field has none yet
    pub fn insert_if_absent(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if !self.errors.contains_key(&field) {
            self.insert(field, message);
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.errors.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors ordered by field name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Record validator
pub trait Validator<R>: Send + Sync {
    /// Validate the whole record
    fn validate(&self, record: &R) -> ValidationResult;

    /// Validate a single field; cross-field rules targeting it are included
    fn validate_field(&self, record: &R, field: &str) -> Option<String> {
        self.validate(record).get(field).map(str::to_owned)
    }

    /// Fields this validator may report on. Errors on other fields are left
    /// alone when results are merged into a form.
    fn covered_fields(&self) -> Vec<String>;
}
