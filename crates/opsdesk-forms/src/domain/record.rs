//! Record access by field name
//!
//! Any serde type works as a form record. Fields are read and written through
//! the record's JSON object form, so a write that does not fit the Rust type
//! (a string into a `u32`, say) is rejected instead of corrupting state.

use crate::error::{FormsError, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Marker for types a form can edit
pub trait FormRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> FormRecord for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Record as a JSON object
pub fn to_object<R: FormRecord>(record: &R) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(FormsError::NotAnObject),
    }
}

/// Whether the record has a property called `name`
pub fn has_field<R: FormRecord>(record: &R, name: &str) -> bool {
    to_object(record).map(|m| m.contains_key(name)).unwrap_or(false)
}

/// Read one field
pub fn read_field<R: FormRecord>(record: &R, name: &str) -> Result<Value> {
    to_object(record)?
        .remove(name)
        .ok_or_else(|| FormsError::UnknownField(name.to_string()))
}

/// Return a copy of `record` with `name` set to `value`
pub fn write_field<R: FormRecord>(record: &R, name: &str, value: Value) -> Result<R> {
    let mut map = to_object(record)?;
    if !map.contains_key(name) {
        return Err(FormsError::UnknownField(name.to_string()));
    }
    map.insert(name.to_string(), value);
    serde_json::from_value(Value::Object(map)).map_err(|e| FormsError::InvalidValue {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Build a record from partial initial data laid over the type's defaults.
///
/// Keys in `partial` the record does not know are rejected.
pub fn merge_initial<R: FormRecord + Default>(partial: &Value) -> Result<R> {
    let mut base = to_object(&R::default())?;
    match partial {
        Value::Null => {}
        Value::Object(overrides) => {
            for (key, value) in overrides {
                if !base.contains_key(key) {
                    return Err(FormsError::UnknownField(key.clone()));
                }
                base.insert(key.clone(), value.clone());
            }
        }
        _ => return Err(FormsError::NotAnObject),
    }
    serde_json::from_value(Value::Object(base)).map_err(FormsError::from)
}
