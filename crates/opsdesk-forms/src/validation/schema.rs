//! Declarative schema validator

use super::rules::FieldRules;
use super::{ValidationResult, Validator};
use crate::domain::record::{to_object, FormRecord};
use serde_json::{Map, Value};
use std::sync::Arc;

type RecordPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Whole-record rule whose error lands on one designated field
struct Refinement<R> {
    field: String,
    message: String,
    check: RecordPredicate<R>,
}

impl<R> Clone for Refinement<R> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            message: self.message.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

/// Per-field rules plus cross-field refinements.
///
/// ```ignore
/// let schema = Schema::<Building>::new()
///     .field("capacity", FieldRules::new().required("Required").positive("Must be positive"))
///     .refine("current_occupancy", "Occupancy cannot exceed capacity", |b| {
///         b.current_occupancy <= b.capacity
///     });
/// ```
pub struct Schema<R> {
    fields: Vec<(String, FieldRules)>,
    refinements: Vec<Refinement<R>>,
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            refinements: self.refinements.clone(),
        }
    }
}

impl<R> Default for Schema<R> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            refinements: Vec::new(),
        }
    }
}

impl<R: FormRecord> Schema<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach rules to a field. Calling twice for the same field appends.
    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        self.fields.push((name.into(), rules));
        self
    }

    /// Cross-field rule; `check` returns `true` when the record is valid.
    /// Never overrides an error the field's own rules produced.
    pub fn refine<F>(mut self, field: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            field: field.into(),
            message: message.into(),
            check: Arc::new(check),
        });
        self
    }

    fn object(record: &R) -> Map<String, Value> {
        match to_object(record) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("schema validation on non-object record: {}", e);
                Map::new()
            }
        }
    }

    fn check_field(&self, object: &Map<String, Value>, name: &str) -> Option<String> {
        let value = object.get(name).unwrap_or(&Value::Null);
        self.fields
            .iter()
            .filter(|(field, _)| field == name)
            .find_map(|(_, rules)| rules.check(value))
    }
}

impl<R: FormRecord> Validator<R> for Schema<R> {
    fn validate(&self, record: &R) -> ValidationResult {
        let object = Self::object(record);
        let mut result = ValidationResult::new();

        for (name, _) in &self.fields {
            if result.contains(name) {
                continue;
            }
            if let Some(message) = self.check_field(&object, name) {
                result.insert(name.clone(), message);
            }
        }

        for refinement in &self.refinements {
            if !(refinement.check)(record) {
                result.insert_if_absent(refinement.field.clone(), refinement.message.clone());
            }
        }

        result
    }

    fn validate_field(&self, record: &R, field: &str) -> Option<String> {
        let object = Self::object(record);
        self.check_field(&object, field).or_else(|| {
            self.refinements
                .iter()
                .filter(|r| r.field == field)
                .find(|r| !(r.check)(record))
                .map(|r| r.message.clone())
        })
    }

    fn covered_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, _)| name.clone())
            .chain(self.refinements.iter().map(|r| r.field.clone()))
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_date;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    struct Stay {
        guest: String,
        check_in: String,
        check_out: String,
        capacity: u32,
        occupancy: u32,
    }

    fn schema() -> Schema<Stay> {
        Schema::new()
            .field("guest", FieldRules::new().required("Guest is required"))
            .field("check_in", FieldRules::new().required("Check-in is required").date("Invalid date"))
            .field("check_out", FieldRules::new().required("Check-out is required").date("Invalid date"))
            .refine("check_out", "Check-out must be after check-in", |s: &Stay| {
                match (parse_date(&s.check_in), parse_date(&s.check_out)) {
                    (Some(a), Some(b)) => b > a,
                    _ => true,
                }
            })
            .refine("occupancy", "Occupancy cannot exceed capacity", |s: &Stay| {
                s.occupancy <= s.capacity
            })
    }

    fn valid_stay() -> Stay {
        Stay {
            guest: "Ann".into(),
            check_in: "2024-03-01".into(),
            check_out: "2024-03-05".into(),
            capacity: 4,
            occupancy: 2,
        }
    }

    #[test]
    fn test_valid_record() {
        assert!(schema().validate(&valid_stay()).is_valid());
    }

    #[test]
    fn test_cross_field_attaches_to_designated_field() {
        let stay = Stay {
            check_out: "2024-02-28".into(),
            ..valid_stay()
        };
        let result = schema().validate(&stay);
        assert_eq!(result.get("check_out"), Some("Check-out must be after check-in"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_occupancy_over_capacity() {
        let stay = Stay {
            occupancy: 5,
            ..valid_stay()
        };
        let result = schema().validate(&stay);
        assert_eq!(result.get("occupancy"), Some("Occupancy cannot exceed capacity"));
    }

    #[test]
    fn test_field_error_beats_refinement() {
        let stay = Stay {
            check_out: "not a date".into(),
            ..valid_stay()
        };
        assert_eq!(schema().validate(&stay).get("check_out"), Some("Invalid date"));
    }

    #[test]
    fn test_validate_field_includes_refinements() {
        let stay = Stay {
            occupancy: 9,
            ..valid_stay()
        };
        let schema = schema();
        assert_eq!(
            schema.validate_field(&stay, "occupancy").as_deref(),
            Some("Occupancy cannot exceed capacity")
        );
        assert_eq!(schema.validate_field(&stay, "guest"), None);
    }

    #[test]
    fn test_covered_fields() {
        assert_eq!(
            schema().covered_fields(),
            vec!["check_in", "check_out", "guest", "occupancy"]
        );
    }

    proptest! {
        #[test]
        fn prop_validate_is_idempotent(
            guest in ".{0,8}",
            check_in in "(2024-0[1-9]-[0-2][0-9]|junk|)",
            check_out in "(2024-0[1-9]-[0-2][0-9]|junk|)",
            capacity in 0u32..10,
            occupancy in 0u32..10,
        ) {
            let stay = Stay { guest, check_in, check_out, capacity, occupancy };
            let schema = schema();
            prop_assert_eq!(schema.validate(&stay), schema.validate(&stay));
        }
    }
}
