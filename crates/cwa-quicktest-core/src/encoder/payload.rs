//! JSON / base64 payload and app URL construction.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{EncodeError, EncodeResult};
use crate::models::{TestRecord, ValidationError};

/// Base URL of the app's data exchange, including the format version.
pub const APP_BASE_URL: &str = "https://s.coronawarn.app?v=1";

/// Wire layout of the payload. Variant field order is the canonical order.
#[derive(Serialize)]
#[serde(untagged)]
enum AppPayload<'a> {
    Anonymous {
        timestamp: i64,
        salt: &'a str,
        hash: String,
    },
    Personal {
        dob: &'a str,
        #[serde(rename = "fn")]
        first_name: &'a str,
        ln: &'a str,
        timestamp: i64,
        testid: &'a str,
        salt: &'a str,
        hash: String,
    },
}

impl<'a> From<&'a TestRecord> for AppPayload<'a> {
    fn from(record: &'a TestRecord) -> Self {
        let hash = record.hash();
        match record.personal_data() {
            None => AppPayload::Anonymous {
                timestamp: record.timestamp(),
                salt: record.salt(),
                hash,
            },
            Some(p) => AppPayload::Personal {
                dob: &p.date_of_birth,
                first_name: &p.first_name,
                ln: &p.last_name,
                timestamp: record.timestamp(),
                testid: &p.test_id,
                salt: record.salt(),
                hash,
            },
        }
    }
}

/// Compact JSON of the record's fields with `hash` appended last.
pub fn to_json(record: &TestRecord) -> EncodeResult<String> {
    Ok(serde_json::to_string(&AppPayload::from(record))?)
}

/// Standard-alphabet base64 of [`to_json`].
pub fn to_encoded_payload(record: &TestRecord) -> EncodeResult<String> {
    Ok(STANDARD.encode(to_json(record)?))
}

/// URL for a QR code, or for redirecting straight into the app.
pub fn build_app_url(record: &TestRecord) -> EncodeResult<String> {
    Ok(format!("{}#{}", APP_BASE_URL, to_encoded_payload(record)?))
}

/// Validate a flat field mapping and build its app URL.
pub fn build_app_url_from_fields(fields: &Map<String, Value>) -> EncodeResult<String> {
    let record = TestRecord::from_fields(fields)?;
    build_app_url(&record)
}

/// Decode a base64 payload back into its JSON object.
pub fn decode_payload(encoded: &str) -> EncodeResult<Map<String, Value>> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| EncodeError::Payload(e.to_string()))?;

    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject.into()),
    }
}

/// The base64 payload carried in an app URL's fragment.
pub fn payload_from_app_url(url: &str) -> Option<&str> {
    url.strip_prefix(APP_BASE_URL)?.strip_prefix('#')
}
