//! CWA Quicktest Core Library
//!
//! Prepares quick test data for the Corona-Warn-App (CWA) and the result
//! records that are pushed to the CWA test result server.
//!
//! # Architecture
//!
//! ```text
//!   flat fields / typed input
//!              │
//!              ▼
//!     ┌─────────────────┐     mode detection, required fields,
//!     │   TestRecord    │◀─── timestamp, salt (in that order)
//!     └────────┬────────┘
//!              │
//!   ┌──────────┴───────────┐
//!   ▼                      ▼
//! SHA-256 hash      JSON (+hash) → base64
//!   │                      │
//!   ▼                      ▼
//! ResultRecord.id   https://s.coronawarn.app?v=1#<payload>
//! ```
//!
//! # Core Principle
//!
//! **The wire format is byte-stable.** Field order for the hash input and the
//! JSON payload is fixed per transfer mode and must match what the app expects.
//!
//! # Modules
//!
//! - [`models`]: Domain types (TestRecord, ResultRecord, TestResult)
//! - [`encoder`]: Hashing, payload encoding, app URL and salt generation

pub mod encoder;
pub mod models;

// Re-export commonly used types
pub use encoder::{
    build_app_url, build_app_url_from_fields, decode_payload, generate_salt, hash,
    is_valid_salt, to_encoded_payload, to_json, EncodeError, EncodeResult, APP_BASE_URL,
};
pub use models::{
    PersonalData, ResultRecord, TestRecord, TestResult, TransferMode, ValidationError,
    ValidationResult, PERSONAL_DATA_FIELDS,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use serde_json::{Map, Value};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum QuicktestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Random source error: {0}")]
    RandomSourceError(String),
}

impl From<ValidationError> for QuicktestError {
    fn from(e: ValidationError) -> Self {
        QuicktestError::InvalidInput(e.to_string())
    }
}

impl From<EncodeError> for QuicktestError {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::Validation(inner) => inner.into(),
            EncodeError::RandomSource(msg) => QuicktestError::RandomSourceError(msg),
            other => QuicktestError::SerializationError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for QuicktestError {
    fn from(e: serde_json::Error) -> Self {
        QuicktestError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Exported Functions
// =========================================================================

/// Generate a fresh 128-bit uppercase hex salt.
#[uniffi::export]
pub fn new_salt() -> Result<String, QuicktestError> {
    Ok(generate_salt()?)
}

/// Validate a record and return its hash.
#[uniffi::export]
pub fn record_hash(record: FfiTestRecord) -> Result<String, QuicktestError> {
    let record = TestRecord::try_from(record)?;
    Ok(record.hash())
}

/// Validate a record and return its base64 payload.
#[uniffi::export]
pub fn record_payload(record: FfiTestRecord) -> Result<String, QuicktestError> {
    let record = TestRecord::try_from(record)?;
    Ok(record.to_encoded_payload()?)
}

/// Validate a record and return the app URL for it.
#[uniffi::export]
pub fn record_app_url(record: FfiTestRecord) -> Result<String, QuicktestError> {
    let record = TestRecord::try_from(record)?;
    Ok(record.app_url()?)
}

/// Validate a JSON object of app fields and return the app URL for it.
#[uniffi::export]
pub fn record_app_url_from_json(json: String) -> Result<String, QuicktestError> {
    let record = TestRecord::from_json(&json)?;
    Ok(record.app_url()?)
}

/// Build the result record for a previously issued test.
#[uniffi::export]
pub fn result_for_record(
    record: FfiTestRecord,
    result: u8,
    sc: i64,
) -> Result<FfiResultRecord, QuicktestError> {
    let record = TestRecord::try_from(record)?;
    let result = TestResult::try_from(result)?;
    Ok(ResultRecord::for_test(&record, result, sc)?.into())
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe test record input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTestRecord {
    pub timestamp: i64,
    pub salt: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub test_id: Option<String>,
}

impl TryFrom<FfiTestRecord> for TestRecord {
    type Error = ValidationError;

    // Goes through the flat-field path so FFI callers get the same
    // validation order and partial-data detection as everyone else.
    fn try_from(record: FfiTestRecord) -> Result<Self, Self::Error> {
        let mut fields = Map::new();
        fields.insert(models::FIELD_TIMESTAMP.into(), Value::from(record.timestamp));
        fields.insert(models::FIELD_SALT.into(), Value::from(record.salt));

        let personal = [
            (models::FIELD_FIRST_NAME, record.first_name),
            (models::FIELD_LAST_NAME, record.last_name),
            (models::FIELD_DATE_OF_BIRTH, record.date_of_birth),
            (models::FIELD_TEST_ID, record.test_id),
        ];
        for (field, value) in personal {
            if let Some(value) = value {
                fields.insert(field.into(), Value::from(value));
            }
        }

        TestRecord::from_fields(&fields)
    }
}

impl From<TestRecord> for FfiTestRecord {
    fn from(record: TestRecord) -> Self {
        let personal = record.personal_data().cloned();
        Self {
            timestamp: record.timestamp(),
            salt: record.salt().to_string(),
            first_name: personal.as_ref().map(|p| p.first_name.clone()),
            last_name: personal.as_ref().map(|p| p.last_name.clone()),
            date_of_birth: personal.as_ref().map(|p| p.date_of_birth.clone()),
            test_id: personal.map(|p| p.test_id),
        }
    }
}

/// FFI-safe result record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResultRecord {
    pub id: String,
    pub result: u8,
    pub sc: i64,
}

impl From<ResultRecord> for FfiResultRecord {
    fn from(record: ResultRecord) -> Self {
        Self {
            id: record.id().to_string(),
            result: record.result().code(),
            sc: record.sc(),
        }
    }
}

impl TryFrom<FfiResultRecord> for ResultRecord {
    type Error = ValidationError;

    fn try_from(record: FfiResultRecord) -> Result<Self, Self::Error> {
        ResultRecord::new(record.id, TestResult::try_from(record.result)?, record.sc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffi_record() -> FfiTestRecord {
        FfiTestRecord {
            timestamp: 1618386548,
            salt: "759F8FF3554F0E1BBF6EFF8DE298D9E9".into(),
            first_name: None,
            last_name: None,
            date_of_birth: None,
            test_id: None,
        }
    }

    #[test]
    fn test_ffi_record_hash() {
        assert_eq!(
            record_hash(ffi_record()).unwrap(),
            "80232838046d2a65ab1b7a1be3dd1250ba9c91c969476c093bc34001ef460af8"
        );
    }

    #[test]
    fn test_ffi_partial_personal_data() {
        let mut record = ffi_record();
        record.first_name = Some("Max".into());

        match record_app_url(record) {
            Err(QuicktestError::InvalidInput(msg)) => {
                assert!(msg.starts_with("partial personal data"))
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_ffi_result_for_record() {
        let result = result_for_record(ffi_record(), 6, 1625125748).unwrap();
        assert_eq!(result.result, 6);
        assert_eq!(result.id.len(), 64);

        assert!(matches!(
            result_for_record(ffi_record(), 9, 1625125748),
            Err(QuicktestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ffi_record_roundtrip() {
        let record = TestRecord::try_from(ffi_record()).unwrap();
        let back: FfiTestRecord = record.clone().into();
        assert_eq!(TestRecord::try_from(back).unwrap(), record);
    }
}
