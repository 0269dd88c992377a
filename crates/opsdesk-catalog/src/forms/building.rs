//! Staff housing buildings

use super::{options, CatalogForm};
use opsdesk_forms::{FieldDescriptor, FieldKind, FieldRules, FormConfig, FormMode, FormSection, Schema};
use serde::{Deserialize, Serialize};

pub const BUILDING_TYPES: &[(&str, &str)] = &[
    ("hostel", "Hostel"),
    ("apartment", "Apartment block"),
    ("guest_house", "Guest house"),
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub code: String,
    pub name: String,
    pub building_type: String,
    pub address: String,
    pub capacity: i64,
    pub current_occupancy: i64,
    pub manager_name: String,
    pub notes: String,
}

impl Building {
    /// Free beds, never negative
    pub fn vacancies(&self) -> i64 {
        (self.capacity - self.current_occupancy).max(0)
    }
}

impl CatalogForm for Building {
    const KEY: &'static str = "building";
    const TITLE: &'static str = "Building";

    type Validator = Schema<Building>;

    fn form_config(_mode: FormMode) -> FormConfig {
        FormConfig::new()
            .section(
                FormSection::new("Building")
                    .field(FieldDescriptor::text("code", "Code").required().lock_on_edit())
                    .field(FieldDescriptor::text("name", "Name").required())
                    .field(
                        FieldDescriptor::select("building_type", "Type", options(BUILDING_TYPES))
                            .required(),
                    )
                    .field(FieldDescriptor::new("address", "Address", FieldKind::Textarea).rows(2)),
            )
            .section(
                FormSection::new("Occupancy")
                    .description("Occupancy cannot exceed capacity")
                    .field(FieldDescriptor::number("capacity", "Capacity").required())
                    .field(FieldDescriptor::number("current_occupancy", "Current occupancy"))
                    .field(FieldDescriptor::text("manager_name", "Manager")),
            )
            .section(
                FormSection::new("Notes")
                    .field(FieldDescriptor::new("notes", "Notes", FieldKind::Textarea)),
            )
    }

    fn validator() -> Schema<Building> {
        Schema::new()
            .field("code", FieldRules::new().required("Code is required"))
            .field("name", FieldRules::new().required("Name is required"))
            .field(
                "building_type",
                FieldRules::new()
                    .required("Type is required")
                    .one_of(BUILDING_TYPES.iter().map(|(v, _)| *v), "Select a building type"),
            )
            .field(
                "capacity",
                FieldRules::new()
                    .integer("Capacity must be a whole number")
                    .positive("Capacity must be greater than zero"),
            )
            .field(
                "current_occupancy",
                FieldRules::new()
                    .integer("Occupancy must be a whole number")
                    .non_negative("Occupancy cannot be negative"),
            )
            .refine(
                "current_occupancy",
                "Occupancy cannot exceed capacity",
                |b: &Building| b.current_occupancy <= b.capacity,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::mount;
    use opsdesk_forms::{FnSubmit, SubmitError, SubmitOutcome, Validator};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn valid() -> Building {
        Building {
            code: "BLD-01".into(),
            name: "Harbour View".into(),
            building_type: "hostel".into(),
            capacity: 100,
            current_occupancy: 80,
            ..Default::default()
        }
    }

    #[test]
    fn test_occupancy_over_capacity() {
        let building = Building {
            current_occupancy: 120,
            ..valid()
        };
        let errors = Building::validator().validate(&building);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("current_occupancy"),
            Some("Occupancy cannot exceed capacity")
        );
        assert_eq!(building.vacancies(), 0);
    }

    #[test]
    fn test_occupancy_error_independent_of_other_fields() {
        let building = Building {
            name: String::new(),
            building_type: String::new(),
            current_occupancy: 120,
            ..valid()
        };
        let errors = Building::validator().validate(&building);
        assert!(errors.contains("name"));
        assert!(errors.contains("building_type"));
        assert_eq!(
            errors.get("current_occupancy"),
            Some("Occupancy cannot exceed capacity")
        );
    }

    #[test]
    fn test_own_rule_wins_over_refinement() {
        let building = Building {
            capacity: -5,
            current_occupancy: -1,
            ..valid()
        };
        let errors = Building::validator().validate(&building);
        assert_eq!(errors.get("current_occupancy"), Some("Occupancy cannot be negative"));
        assert_eq!(errors.get("capacity"), Some("Capacity must be greater than zero"));
    }

    #[tokio::test]
    async fn test_occupancy_blocks_submit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = FnSubmit(move |_: Building| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), SubmitError>(()) }
        });

        let form = mount::<Building, _>(
            &json!({"code": "BLD-01", "name": "Harbour View", "building_type": "hostel", "capacity": 10}),
            FormMode::Create,
            handler,
            None,
        )
        .unwrap();
        form.input("current_occupancy", "12").unwrap();

        match form.submit().await {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(
                    errors.get("current_occupancy"),
                    Some("Occupancy cannot exceed capacity")
                );
            }
            other => panic!("expected invalid, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        form.input("current_occupancy", "10").unwrap();
        assert_eq!(form.submit().await, SubmitOutcome::Submitted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fractional_capacity_blocks_submit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = FnSubmit(move |_: Building| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), SubmitError>(()) }
        });

        let form = mount::<Building, _>(
            &json!({"code": "BLD-01", "name": "Harbour View", "building_type": "hostel", "capacity": 10}),
            FormMode::Create,
            handler,
            None,
        )
        .unwrap();
        assert_eq!(form.input("capacity", "10.5"), Ok(()));
        assert_eq!(form.record().capacity, 10);

        match form.submit().await {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.get("capacity"), Some("Must be a whole number"));
            }
            other => panic!("expected invalid, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        form.input("capacity", "12").unwrap();
        assert_eq!(form.submit().await, SubmitOutcome::Submitted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
