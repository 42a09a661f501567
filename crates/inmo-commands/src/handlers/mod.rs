//! One handler module per resource. Handlers translate validated command
//! parameters into service calls and fold the outcome into a
//! [`CommandResult`]; they never send messages themselves.

pub(crate) mod clients;
pub(crate) mod properties;
pub(crate) mod users;

use inmo_core::error::InmoError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A required string parameter.
pub(crate) fn param_str<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a str, InmoError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| InmoError::MalformedRequest(format!("falta el parámetro '{key}'")))
}

/// A required structured parameter, deserialized into its domain type.
pub(crate) fn param_typed<T: DeserializeOwned>(
    params: &Map<String, Value>,
    key: &str,
) -> Result<T, InmoError> {
    let value = params
        .get(key)
        .ok_or_else(|| InmoError::MalformedRequest(format!("falta el parámetro '{key}'")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| InmoError::MalformedRequest(format!("parámetro '{key}' inválido: {e}")))
}
