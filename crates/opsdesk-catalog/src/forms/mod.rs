//! Domain forms
//!
//! Each form is a record type with defaults, a form configuration and a
//! validator. Hosts mount them through [`mount`].

pub mod building;
pub mod courier;
pub mod housing;
pub mod incident;
pub mod leave;

pub use building::Building;
pub use courier::Courier;
pub use housing::HousingAllocation;
pub use incident::IncidentReport;
pub use leave::LeaveRequest;

use crate::error::Result;
use opsdesk_forms::form::CancelHandler;
use opsdesk_forms::validation::parse_date;
use opsdesk_forms::{
    merge_initial, DynamicForm, FieldOption, FormConfig, FormInstance, FormMode, FormRecord,
    SubmitHandler, Validator,
};
use serde_json::Value;
use tracing::info;

/// A form the catalog can mount
pub trait CatalogForm: FormRecord + Default {
    /// Stable lookup key
    const KEY: &'static str;
    /// Heading shown above the form
    const TITLE: &'static str;

    type Validator: Validator<Self> + 'static;

    fn form_config(mode: FormMode) -> FormConfig;
    fn validator() -> Self::Validator;
}

/// Mount a catalog form with `initial_data` merged over the record defaults
pub fn mount<F, S>(
    initial_data: &Value,
    mode: FormMode,
    on_submit: S,
    on_cancel: Option<CancelHandler>,
) -> Result<FormInstance<F>>
where
    F: CatalogForm,
    S: SubmitHandler<F> + 'static,
{
    let initial: F = merge_initial(initial_data)?;
    info!("Mounting {} form ({:?})", F::KEY, mode);
    let form = DynamicForm::new().mode(mode).render(
        F::form_config(mode),
        initial,
        F::validator(),
        on_submit,
        on_cancel,
    )?;
    Ok(form)
}

/// Select options from `(value, label)` pairs
pub(crate) fn options(pairs: &[(&str, &str)]) -> Vec<FieldOption> {
    pairs
        .iter()
        .map(|(value, label)| FieldOption::new(*value, *label))
        .collect()
}

/// `later` is on or after `earlier`; passes when either side is missing
pub(crate) fn not_before(earlier: &str, later: &str) -> bool {
    match (parse_date(earlier), parse_date(later)) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

/// `later` is strictly after `earlier`; passes when either side is missing
pub(crate) fn strictly_after(earlier: &str, later: &str) -> bool {
    match (parse_date(earlier), parse_date(later)) {
        (Some(start), Some(end)) => end > start,
        _ => true,
    }
}
