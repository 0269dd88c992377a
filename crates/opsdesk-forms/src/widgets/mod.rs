//! Standalone input widgets consumed by forms

pub mod checklist;
pub mod signature;

pub use checklist::{Checklist, ChecklistItem, ChecklistProgress};
pub use signature::{Point, SignatureError, SignaturePad, PNG_DATA_URI_PREFIX};
