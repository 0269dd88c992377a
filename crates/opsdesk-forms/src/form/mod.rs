//! Form module
//!
//! Renderer registry, state controller and the dynamic form engine.

pub mod engine;
pub mod renderer;
pub mod state;

pub use engine::{CancelHandler, ControlState, DynamicForm, FnSubmit, FormInstance, SubmitHandler, SubmitOutcome};
pub use renderer::{Control, FieldRenderer, InputType, RawInput, RenderedField, RenderedSection, RendererRegistry};
pub use state::{FieldStatus, FormPhase, FormState, SubmitBlocked};
