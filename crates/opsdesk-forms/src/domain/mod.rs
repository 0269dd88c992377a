//! Domain module
//!
//! Form descriptors and record access.

pub mod field;
pub mod record;

pub use field::*;
pub use record::{merge_initial, FormRecord};
