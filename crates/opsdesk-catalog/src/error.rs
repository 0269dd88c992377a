//! Catalog errors

use opsdesk_forms::FormsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown form: {0}")]
    UnknownForm(String),

    #[error(transparent)]
    Forms(#[from] FormsError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
