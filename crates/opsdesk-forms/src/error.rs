//! Error types for the form engine

use thiserror::Error;

/// Form engine error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormsError {
    /// A field descriptor names a property the record does not have
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The same field name appears twice in one form configuration
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// Field is disabled in the current mode
    #[error("field is disabled: {0}")]
    FieldDisabled(String),

    /// The record does not serialize to a JSON object
    #[error("record must serialize to an object")]
    NotAnObject,

    /// Value could not be written back into the record type
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Deserializer message
        reason: String,
    },

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Config file could not be read or written
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FormsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Rejection raised by a caller's submit handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmitError {
    /// Top-level message shown above the form
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for the form engine
pub type Result<T> = std::result::Result<T, FormsError>;
