//! OpsDesk Form Catalog
//!
//! Fleet, HR and facilities forms built on `opsdesk-forms`.
//!
//! ## Forms
//!
//! - **Courier**: onboarding and profile edits; code locked on edit
//! - **Building**: capacity and occupancy
//! - **Leave request**: leave type and date range
//! - **Housing allocation**: room, check-in and check-out
//! - **Incident report**: validated with per-field functions

pub mod catalog;
pub mod error;
pub mod forms;

pub use catalog::{CatalogEntry, FormCatalog};
pub use error::{CatalogError, Result};
pub use forms::{
    mount, Building, CatalogForm, Courier, HousingAllocation, IncidentReport, LeaveRequest,
};
