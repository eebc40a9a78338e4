//! Domain models for quick test data exchanged with the Corona-Warn-App.

mod result_record;
mod test_record;

pub use result_record::*;
pub use test_record::*;

use thiserror::Error;

/// Record validation errors.
///
/// Raised locally and synchronously, before anything is encoded or sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "partial personal data: either all of the personal data fields have to be set, or none of them (fields: fn, ln, dob, testid)"
    )]
    PartialPersonalData,

    #[error("required field missing: `{0}`")]
    MissingField(&'static str),

    #[error("invalid timestamp: `timestamp` must be a positive unix timestamp")]
    InvalidTimestamp,

    #[error("invalid salt format: `salt` must be an uppercase 128-bit hex string of 32 characters")]
    InvalidSalt,

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid result code {0} (possible values: 6, 7, 8)")]
    InvalidResultCode(i64),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("JSON parse error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Json(e.to_string())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Read an integer field that must be a positive `i64`.
///
/// Floats, strings and values beyond `i64::MAX` are not integers here.
pub(crate) fn positive_integer(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().filter(|v| *v > 0)
}
