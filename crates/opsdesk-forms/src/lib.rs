//! OpsDesk Forms
//!
//! Headless, schema-driven form engine for operations back-office screens.
//! Produces view models and state transitions; any UI surface binds to them.
//!
//! ## Architecture
//!
//! - **Domain**: field descriptors, sections, form configuration, record access
//! - **Validation**: one `Validator` trait, declarative `Schema` and `FieldFnMap` adapters
//! - **Form**: renderer registry, state controller, `DynamicForm` engine
//! - **Upload**: bounded, ordered file pipeline over an HTTP transport
//! - **Widgets**: signature capture and checklist
//!
//! ## Example
//!
//! ```ignore
//! let form = DynamicForm::new()
//!     .mode(FormMode::Create)
//!     .render(config, Person::default(), schema, handler, None)?;
//! form.input("name", "Ann")?;
//! form.submit().await;
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod form;
pub mod ids;
pub mod upload;
pub mod validation;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use config::{FormMode, SignatureConfig, UploadConfig};
pub use domain::{
    merge_initial, EmptyNumber, FieldDescriptor, FieldKind, FieldOption, FormConfig, FormRecord,
    FormSection,
};
pub use error::{FormsError, Result, SubmitError};
pub use form::{
    ControlState, DynamicForm, FieldStatus, FnSubmit, FormInstance, FormPhase, RawInput,
    RenderedField, RenderedSection, RendererRegistry, SubmitHandler, SubmitOutcome,
};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use upload::{
    FileCandidate, FileUploadPipeline, HttpUploadTransport, TransportError, UploadError,
    UploadProgress, UploadTransport, UploadedFile,
};
pub use validation::{FieldFnMap, FieldRules, Schema, ValidationResult, Validator};
pub use widgets::{Checklist, ChecklistItem, SignatureError, SignaturePad};
