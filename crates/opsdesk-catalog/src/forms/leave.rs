//! Employee leave requests

use super::{not_before, options, CatalogForm};
use opsdesk_forms::validation::parse_date;
use opsdesk_forms::{FieldDescriptor, FieldKind, FieldRules, FormConfig, FormMode, FormSection, Schema};
use serde::{Deserialize, Serialize};

pub const LEAVE_TYPES: &[(&str, &str)] = &[
    ("annual", "Annual leave"),
    ("sick", "Sick leave"),
    ("unpaid", "Unpaid leave"),
    ("maternity", "Maternity leave"),
    ("paternity", "Paternity leave"),
    ("compassionate", "Compassionate leave"),
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee_id: String,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

impl LeaveRequest {
    /// Calendar days requested, both ends inclusive
    pub fn days(&self) -> Option<i64> {
        let start = parse_date(&self.start_date)?.date();
        let end = parse_date(&self.end_date)?.date();
        (end >= start).then(|| (end - start).num_days() + 1)
    }
}

impl CatalogForm for LeaveRequest {
    const KEY: &'static str = "leave_request";
    const TITLE: &'static str = "Leave request";

    type Validator = Schema<LeaveRequest>;

    fn form_config(_mode: FormMode) -> FormConfig {
        FormConfig::new()
            .section(
                FormSection::new("Request")
                    .field(FieldDescriptor::text("employee_id", "Employee ID").required().lock_on_edit())
                    .field(FieldDescriptor::select("leave_type", "Leave type", options(LEAVE_TYPES)).required()),
            )
            .section(
                FormSection::new("Dates")
                    .field(FieldDescriptor::date("start_date", "Start date").required())
                    .field(FieldDescriptor::date("end_date", "End date").required()),
            )
            .section(
                FormSection::new("Details").field(
                    FieldDescriptor::new("reason", "Reason", FieldKind::Textarea)
                        .required()
                        .rows(4),
                ),
            )
    }

    fn validator() -> Schema<LeaveRequest> {
        Schema::new()
            .field("employee_id", FieldRules::new().required("Employee ID is required"))
            .field(
                "leave_type",
                FieldRules::new()
                    .required("Leave type is required")
                    .one_of(LEAVE_TYPES.iter().map(|(v, _)| *v), "Select a leave type"),
            )
            .field(
                "start_date",
                FieldRules::new()
                    .required("Start date is required")
                    .date("Enter a valid date"),
            )
            .field(
                "end_date",
                FieldRules::new()
                    .required("End date is required")
                    .date("Enter a valid date"),
            )
            .field(
                "reason",
                FieldRules::new()
                    .required("Reason is required")
                    .max_len(500, "Reason must be 500 characters or fewer"),
            )
            .refine("end_date", "End date cannot be before start date", |l: &LeaveRequest| {
                not_before(&l.start_date, &l.end_date)
            })
    }
}
