//! Courier onboarding and profile edits

use super::{options, CatalogForm};
use opsdesk_forms::{FieldDescriptor, FieldKind, FieldRules, FormConfig, FormMode, FormSection, Schema};
use serde::{Deserialize, Serialize};

pub const VEHICLE_TYPES: &[(&str, &str)] = &[
    ("bicycle", "Bicycle"),
    ("motorcycle", "Motorcycle"),
    ("car", "Car"),
    ("van", "Van"),
    ("truck", "Truck"),
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub courier_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_type: String,
    pub license_number: String,
    pub hire_date: String,
    pub is_active: bool,
}

impl CatalogForm for Courier {
    const KEY: &'static str = "courier";
    const TITLE: &'static str = "Courier";

    type Validator = Schema<Courier>;

    /// Status is only editable once the courier exists
    fn form_config(mode: FormMode) -> FormConfig {
        let config = FormConfig::new()
            .section(
                FormSection::new("Identity")
                    .field(
                        FieldDescriptor::text("courier_code", "Courier code")
                            .required()
                            .placeholder("CR-0001")
                            .lock_on_edit(),
                    )
                    .field(FieldDescriptor::text("full_name", "Full name").required()),
            )
            .section(
                FormSection::new("Contact")
                    .field(
                        FieldDescriptor::new("email", "Email", FieldKind::Email)
                            .required()
                            .placeholder("name@example.com"),
                    )
                    .field(FieldDescriptor::new("phone", "Phone", FieldKind::Tel).required()),
            )
            .section(
                FormSection::new("Assignment")
                    .field(
                        FieldDescriptor::select("vehicle_type", "Vehicle type", options(VEHICLE_TYPES))
                            .required(),
                    )
                    .field(FieldDescriptor::text("license_number", "Licence number"))
                    .field(FieldDescriptor::date("hire_date", "Hire date").required()),
            );

        match mode {
            FormMode::Create => config,
            FormMode::Edit => config.section(
                FormSection::new("Status")
                    .field(FieldDescriptor::new("is_active", "Active", FieldKind::Checkbox)),
            ),
        }
    }

    fn validator() -> Schema<Courier> {
        Schema::new()
            .field(
                "courier_code",
                FieldRules::new()
                    .required("Courier code is required")
                    .pattern(r"^[A-Z]{2,4}-\d{3,6}$", "Use a code like CR-0001"),
            )
            .field(
                "full_name",
                FieldRules::new()
                    .required("Full name is required")
                    .min_len(2, "Full name must be at least 2 characters"),
            )
            .field(
                "email",
                FieldRules::new()
                    .required("Email is required")
                    .email("Enter a valid email address"),
            )
            .field(
                "phone",
                FieldRules::new()
                    .required("Phone is required")
                    .phone("Enter a valid phone number"),
            )
            .field(
                "vehicle_type",
                FieldRules::new()
                    .required("Vehicle type is required")
                    .one_of(VEHICLE_TYPES.iter().map(|(v, _)| *v), "Select a vehicle type"),
            )
            .field(
                "license_number",
                FieldRules::new().max_len(20, "Licence number is too long"),
            )
            .field(
                "hire_date",
                FieldRules::new()
                    .required("Hire date is required")
                    .date("Enter a valid date"),
            )
            .refine("license_number", "Motor vehicles need a licence number", |c: &Courier| {
                c.vehicle_type == "bicycle" || !c.license_number.trim().is_empty()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::forms::mount;
    use opsdesk_forms::{FnSubmit, FormsError, SubmitError, Validator};
    use serde_json::json;
    use tokio_test::assert_ok;

    fn valid() -> Courier {
        Courier {
            courier_code: "CR-0042".into(),
            full_name: "Amaka Obi".into(),
            email: "amaka@example.com".into(),
            phone: "+234 803 555 0199".into(),
            vehicle_type: "motorcycle".into(),
            license_number: "LAG-77812".into(),
            hire_date: "2024-03-01".into(),
            is_active: true,
        }
    }

    #[test]
    fn test_valid_courier() {
        assert!(Courier::validator().validate(&valid()).is_valid());
    }

    #[test]
    fn test_field_errors() {
        let courier = Courier {
            courier_code: "cr42".into(),
            email: "not-an-email".into(),
            phone: "12".into(),
            ..valid()
        };
        let errors = Courier::validator().validate(&courier);
        assert_eq!(errors.get("courier_code"), Some("Use a code like CR-0001"));
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
        assert_eq!(errors.get("phone"), Some("Enter a valid phone number"));
    }

    #[test]
    fn test_licence_required_for_motor_vehicles() {
        let courier = Courier {
            license_number: String::new(),
            ..valid()
        };
        let errors = Courier::validator().validate(&courier);
        assert_eq!(
            errors.get("license_number"),
            Some("Motor vehicles need a licence number")
        );

        let cyclist = Courier {
            vehicle_type: "bicycle".into(),
            ..courier
        };
        assert!(Courier::validator().validate(&cyclist).is_valid());
    }

    #[test]
    fn test_edit_mode_adds_status_and_locks_code() {
        let create = Courier::form_config(FormMode::Create);
        let edit = Courier::form_config(FormMode::Edit);
        assert!(create.field("is_active").is_none());
        assert!(edit.field("is_active").is_some());

        let code = edit.field("courier_code").unwrap();
        assert!(code.is_disabled_in(FormMode::Edit));
        assert!(!code.is_disabled_in(FormMode::Create));
    }

    #[test]
    fn test_edit_form_rejects_code_change() {
        let form = mount::<Courier, _>(
            &json!({"courier_code": "CR-0042", "full_name": "Amaka Obi"}),
            FormMode::Edit,
            FnSubmit(|_: Courier| async { Ok::<(), SubmitError>(()) }),
            None,
        )
        .unwrap();

        assert_eq!(
            form.input("courier_code", "CR-9999"),
            Err(FormsError::FieldDisabled("courier_code".into()))
        );
        assert_ok!(form.input("full_name", "Amaka N. Obi"));
        assert_eq!(form.record().courier_code, "CR-0042");
        assert!(form.field("courier_code").unwrap().disabled);
    }

    #[test]
    fn test_initial_data_rejects_unknown_keys() {
        let result = mount::<Courier, _>(
            &json!({"salary": 1000}),
            FormMode::Create,
            FnSubmit(|_: Courier| async { Ok::<(), SubmitError>(()) }),
            None,
        );
        assert!(matches!(
            result,
            Err(CatalogError::Forms(FormsError::UnknownField(key))) if key == "salary"
        ));
    }
}
