//! Room allocations in staff housing

use super::{strictly_after, CatalogForm};
use opsdesk_forms::{
    EmptyNumber, FieldDescriptor, FieldKind, FieldRules, FormConfig, FormMode, FormSection, Schema,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingAllocation {
    pub employee_id: String,
    pub building_code: String,
    pub room_number: String,
    pub check_in: String,
    pub check_out: String,
    /// Unset means no rent is charged
    pub monthly_rent: Option<f64>,
    pub notes: String,
}

impl CatalogForm for HousingAllocation {
    const KEY: &'static str = "housing_allocation";
    const TITLE: &'static str = "Housing allocation";

    type Validator = Schema<HousingAllocation>;

    fn form_config(_mode: FormMode) -> FormConfig {
        FormConfig::new()
            .section(
                FormSection::new("Allocation")
                    .field(FieldDescriptor::text("employee_id", "Employee ID").required())
                    .field(FieldDescriptor::text("building_code", "Building").required())
                    .field(FieldDescriptor::text("room_number", "Room").required()),
            )
            .section(
                FormSection::new("Stay")
                    .field(FieldDescriptor::date("check_in", "Check-in").required())
                    .field(FieldDescriptor::date("check_out", "Check-out"))
                    .field(
                        FieldDescriptor::number("monthly_rent", "Monthly rent")
                            .empty_number(EmptyNumber::Absent)
                            .help("Leave blank when rent is waived"),
                    ),
            )
            .section(
                FormSection::new("Notes")
                    .field(FieldDescriptor::new("notes", "Notes", FieldKind::Textarea)),
            )
    }

    fn validator() -> Schema<HousingAllocation> {
        Schema::new()
            .field("employee_id", FieldRules::new().required("Employee ID is required"))
            .field("building_code", FieldRules::new().required("Building is required"))
            .field("room_number", FieldRules::new().required("Room is required"))
            .field(
                "check_in",
                FieldRules::new()
                    .required("Check-in date is required")
                    .date("Enter a valid date"),
            )
            .field("check_out", FieldRules::new().date("Enter a valid date"))
            .field(
                "monthly_rent",
                FieldRules::new().non_negative("Rent cannot be negative"),
            )
            .refine("check_out", "Check-out must be after check-in", |h: &HousingAllocation| {
                strictly_after(&h.check_in, &h.check_out)
            })
    }
}
