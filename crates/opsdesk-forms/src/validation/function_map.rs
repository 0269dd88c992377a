//! Function-map validator

use super::{ValidationResult, Validator};

/// Check for one field; `Some(message)` marks it invalid
pub type FieldCheck<R> = Box<dyn Fn(&R) -> Option<String> + Send + Sync>;

/// `{ field: fn(&record) -> Option<message> }`, evaluated in insertion order
pub struct FieldFnMap<R> {
    checks: Vec<(String, FieldCheck<R>)>,
}

impl<R> Default for FieldFnMap<R> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<R> FieldFnMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&R) -> Option<String> + Send + Sync + 'static,
    {
        self.checks.push((name.into(), Box::new(check)));
        self
    }
}

impl<R> Validator<R> for FieldFnMap<R> {
    fn validate(&self, record: &R) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (name, check) in &self.checks {
            if let Some(message) = check(record) {
                result.insert_if_absent(name.clone(), message);
            }
        }
        result
    }

    fn validate_field(&self, record: &R, field: &str) -> Option<String> {
        self.checks
            .iter()
            .filter(|(name, _)| name == field)
            .find_map(|(_, check)| check(record).filter(|m| !m.trim().is_empty()))
    }

    fn covered_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.checks.iter().map(|(name, _)| name.clone()).collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldRules, Schema};

    #[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
    struct Penalty {
        reason: String,
        amount: f64,
    }

    fn fn_map() -> FieldFnMap<Penalty> {
        FieldFnMap::new()
            .field("reason", |p: &Penalty| {
                p.reason.trim().is_empty().then(|| "Reason is required".to_string())
            })
            .field("amount", |p: &Penalty| {
                (p.amount <= 0.0).then(|| "Amount must be positive".to_string())
            })
    }

    #[test]
    fn test_function_map_errors() {
        let result = fn_map().validate(&Penalty::default());
        assert_eq!(result.get("reason"), Some("Reason is required"));
        assert_eq!(result.get("amount"), Some("Amount must be positive"));
    }

    #[test]
    fn test_validate_single_field() {
        let penalty = Penalty {
            reason: "Late".into(),
            amount: 0.0,
        };
        let validator = fn_map();
        assert_eq!(validator.validate_field(&penalty, "reason"), None);
        assert!(validator.validate_field(&penalty, "amount").is_some());
    }

    #[test]
    fn test_blank_message_falls_through_to_next_check() {
        let validator = FieldFnMap::new()
            .field("reason", |_: &Penalty| Some(" ".to_string()))
            .field("reason", |p: &Penalty| {
                (p.reason.len() < 3).then(|| "Reason is too short".to_string())
            });
        let penalty = Penalty {
            reason: "no".into(),
            amount: 1.0,
        };
        assert_eq!(
            validator.validate_field(&penalty, "reason").as_deref(),
            Some("Reason is too short")
        );
        assert_eq!(validator.validate(&penalty).get("reason"), Some("Reason is too short"));
    }

    #[test]
    fn test_same_output_shape_as_schema() {
        let schema: Schema<Penalty> = Schema::new()
            .field("reason", FieldRules::new().required("Reason is required"))
            .field("amount", FieldRules::new().positive("Amount must be positive"));
        let penalty = Penalty::default();
        assert_eq!(schema.validate(&penalty), fn_map().validate(&penalty));
    }
}
