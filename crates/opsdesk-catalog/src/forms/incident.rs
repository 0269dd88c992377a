//! Fleet incident reports
//!
//! Validated with per-field functions instead of a declarative schema.

use super::{options, CatalogForm};
use opsdesk_forms::validation::parse_date;
use opsdesk_forms::{
    EmptyNumber, FieldDescriptor, FieldFnMap, FieldKind, FormConfig, FormMode, FormSection,
};
use serde::{Deserialize, Serialize};

pub const SEVERITIES: &[(&str, &str)] = &[
    ("low", "Low"),
    ("medium", "Medium"),
    ("high", "High"),
    ("critical", "Critical"),
];

const MIN_DESCRIPTION: usize = 20;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub title: String,
    pub incident_date: String,
    pub location: String,
    pub vehicle_id: String,
    pub severity: String,
    pub description: String,
    pub estimated_cost: Option<f64>,
    pub police_report_filed: bool,
}

impl CatalogForm for IncidentReport {
    const KEY: &'static str = "incident_report";
    const TITLE: &'static str = "Incident report";

    type Validator = FieldFnMap<IncidentReport>;

    fn form_config(_mode: FormMode) -> FormConfig {
        FormConfig::new()
            .section(
                FormSection::new("Incident")
                    .field(FieldDescriptor::text("title", "Title").required())
                    .field(FieldDescriptor::date("incident_date", "Date").required())
                    .field(FieldDescriptor::text("location", "Location"))
                    .field(FieldDescriptor::text("vehicle_id", "Vehicle")),
            )
            .section(
                FormSection::new("Assessment")
                    .field(FieldDescriptor::select("severity", "Severity", options(SEVERITIES)).required())
                    .field(
                        FieldDescriptor::new("description", "Description", FieldKind::Textarea)
                            .required()
                            .rows(5),
                    )
                    .field(
                        FieldDescriptor::number("estimated_cost", "Estimated cost")
                            .empty_number(EmptyNumber::Absent),
                    )
                    .field(FieldDescriptor::new(
                        "police_report_filed",
                        "Police report filed",
                        FieldKind::Checkbox,
                    )),
            )
    }

    fn validator() -> FieldFnMap<IncidentReport> {
        FieldFnMap::new()
            .field("title", |r: &IncidentReport| {
                r.title.trim().is_empty().then(|| "Title is required".to_string())
            })
            .field("incident_date", |r: &IncidentReport| {
                if r.incident_date.trim().is_empty() {
                    Some("Date is required".into())
                } else if parse_date(&r.incident_date).is_none() {
                    Some("Enter a valid date".into())
                } else {
                    None
                }
            })
            .field("severity", |r: &IncidentReport| {
                (!SEVERITIES.iter().any(|(v, _)| *v == r.severity))
                    .then(|| "Select a severity".to_string())
            })
            .field("description", |r: &IncidentReport| {
                (r.description.trim().chars().count() < MIN_DESCRIPTION).then(|| {
                    format!("Description must be at least {} characters", MIN_DESCRIPTION)
                })
            })
            .field("estimated_cost", |r: &IncidentReport| match r.estimated_cost {
                Some(cost) if cost < 0.0 => Some("Cost cannot be negative".into()),
                _ => None,
            })
    }
}
