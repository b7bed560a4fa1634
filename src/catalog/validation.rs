//! Decoding of request bodies into records and patches.
//!
//! Every kind lists its fields by hand (see `models.rs`); the helpers here
//! turn "key missing", "key null" and "key of the wrong type" into distinct
//! [`ValidationError`]s so the caller can name the offending field.

use super::models::NewRecord;
use super::resource::{Resource, ID_COLUMN};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub type JsonObject = serde_json::Map<String, Value>;

/// Client-facing decode failures. Messages are returned verbatim in the
/// response body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("O corpo da requisição deve ser um objeto JSON")]
    NotAnObject,

    #[error("Campo obrigatório ausente: '{field}'")]
    MissingField { field: &'static str },

    #[error("Campo '{field}' não pode ser nulo")]
    NullField { field: &'static str },

    #[error("Campo '{field}' inválido: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn as_object(body: &Value) -> ValidationResult<&JsonObject> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

fn convert<T: DeserializeOwned>(field: &'static str, value: &Value) -> ValidationResult<T> {
    if value.is_null() {
        return Err(ValidationError::NullField { field });
    }
    serde_json::from_value(value.clone()).map_err(|e| ValidationError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

/// Value of a field that must be present on creation.
pub fn required<T: DeserializeOwned>(body: &JsonObject, field: &'static str) -> ValidationResult<T> {
    match body.get(field) {
        Some(value) => convert(field, value),
        None => Err(ValidationError::MissingField { field }),
    }
}

/// Value of a patch field: `None` when absent. An explicit `null` is an
/// error, never "leave unchanged".
pub fn optional<T: DeserializeOwned>(
    body: &JsonObject,
    field: &'static str,
) -> ValidationResult<Option<T>> {
    body.get(field).map(|value| convert(field, value)).transpose()
}

/// Round a monetary amount to two decimal places.
pub fn to_cents_precision(amount: f64) -> f64 {
    let cents = amount * 100.0;
    // Amounts this large carry no fractional cents.
    if !cents.is_finite() {
        return amount;
    }
    cents.round() / 100.0
}

/// Decode a creation body for kind `R`, keeping a caller-supplied id.
pub fn decode_new<R: Resource>(body: &Value) -> ValidationResult<NewRecord<R>> {
    let body = as_object(body)?;
    let id = optional::<i64>(body, ID_COLUMN)?;
    let fields = R::decode(body)?;
    Ok(NewRecord { id, fields })
}

/// Decode a patch body for kind `R`. Keys that are not fields of `R`
/// (including `id`) are ignored.
pub fn decode_patch<R: Resource>(body: &Value) -> ValidationResult<R::Patch> {
    R::decode_patch(as_object(body)?)
}
