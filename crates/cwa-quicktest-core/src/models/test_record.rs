//! Test subject records destined for the Corona-Warn-App.

use serde_json::{Map, Value};

use super::{positive_integer, ValidationError, ValidationResult};
use crate::encoder::{self, is_valid_salt, EncodeResult};

/// Wire key of the unix timestamp.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Wire key of the salt.
pub const FIELD_SALT: &str = "salt";
/// Wire key of the first name.
pub const FIELD_FIRST_NAME: &str = "fn";
/// Wire key of the last name.
pub const FIELD_LAST_NAME: &str = "ln";
/// Wire key of the date of birth.
pub const FIELD_DATE_OF_BIRTH: &str = "dob";
/// Wire key of the test ID.
pub const FIELD_TEST_ID: &str = "testid";
/// Wire key of the computed hash.
pub const FIELD_HASH: &str = "hash";

/// Personal data fields; either all or none of them must be set.
pub const PERSONAL_DATA_FIELDS: [&str; 4] = [
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_DATE_OF_BIRTH,
    FIELD_TEST_ID,
];

/// How much the app is told about the test subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Only timestamp and salt are transferred
    Anonymous,
    /// Name, date of birth and test ID are transferred as well
    Personal,
}

/// Personal data of the test subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalData {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth (documented as ISO 8601 date, not checked)
    pub date_of_birth: String,
    /// Test ID, typically a UUID
    pub test_id: String,
}

impl PersonalData {
    /// Create personal data from its four fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        test_id: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: date_of_birth.into(),
            test_id: test_id.into(),
        }
    }

    /// Values paired with their wire keys, in `PERSONAL_DATA_FIELDS` order.
    fn entries(&self) -> [(&'static str, &str); 4] {
        [
            (FIELD_FIRST_NAME, &self.first_name),
            (FIELD_LAST_NAME, &self.last_name),
            (FIELD_DATE_OF_BIRTH, &self.date_of_birth),
            (FIELD_TEST_ID, &self.test_id),
        ]
    }
}

/// A validated quick test record.
///
/// Immutable once constructed; every constructor enforces the same rules:
/// all-or-nothing personal data, a positive timestamp and a 32 character
/// uppercase hex salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    timestamp: i64,
    salt: String,
    personal: Option<PersonalData>,
}

impl TestRecord {
    /// Create an anonymous record.
    pub fn anonymous(timestamp: i64, salt: impl Into<String>) -> ValidationResult<Self> {
        Self::validated(timestamp, salt.into(), None)
    }

    /// Create a record carrying personal data.
    pub fn personal(
        personal: PersonalData,
        timestamp: i64,
        salt: impl Into<String>,
    ) -> ValidationResult<Self> {
        for (field, value) in personal.entries() {
            if value.is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        Self::validated(timestamp, salt.into(), Some(personal))
    }

    /// Create a record from a flat mapping keyed by the app's field names.
    ///
    /// Checks run in a fixed order so the reported error is deterministic:
    /// mode detection, required fields, timestamp, salt.
    pub fn from_fields(fields: &Map<String, Value>) -> ValidationResult<Self> {
        let mode = detect_mode(fields)?;

        let salt = required(fields, FIELD_SALT)?;
        let timestamp = required(fields, FIELD_TIMESTAMP)?;

        let personal = match mode {
            TransferMode::Anonymous => None,
            TransferMode::Personal => Some(PersonalData {
                first_name: required_string(fields, FIELD_FIRST_NAME)?,
                last_name: required_string(fields, FIELD_LAST_NAME)?,
                date_of_birth: required_string(fields, FIELD_DATE_OF_BIRTH)?,
                test_id: required_string(fields, FIELD_TEST_ID)?,
            }),
        };

        let timestamp = positive_integer(timestamp).ok_or(ValidationError::InvalidTimestamp)?;
        let salt = salt.as_str().ok_or(ValidationError::InvalidSalt)?;

        Self::validated(timestamp, salt.to_string(), personal)
    }

    /// Parse a JSON object and create a record from it.
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(fields) => Self::from_fields(&fields),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    fn validated(
        timestamp: i64,
        salt: String,
        personal: Option<PersonalData>,
    ) -> ValidationResult<Self> {
        if timestamp <= 0 {
            return Err(ValidationError::InvalidTimestamp);
        }
        if !is_valid_salt(&salt) {
            return Err(ValidationError::InvalidSalt);
        }
        Ok(Self {
            timestamp,
            salt,
            personal,
        })
    }

    /// Unix timestamp of the test.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Uppercase hex salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Personal data, if this is not an anonymous record.
    pub fn personal_data(&self) -> Option<&PersonalData> {
        self.personal.as_ref()
    }

    /// Transfer mode of this record.
    pub fn mode(&self) -> TransferMode {
        match self.personal {
            Some(_) => TransferMode::Personal,
            None => TransferMode::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.personal.is_none()
    }

    /// Ordered field view of the record.
    ///
    /// IMPORTANT: the order is part of the wire format. Anonymous records use
    /// `timestamp, salt`; personal records use
    /// `dob, fn, ln, timestamp, testid, salt`. The hash input and the JSON
    /// payload are both built from this order, with `hash` appended last.
    pub fn fields(&self, include_hash: bool) -> Vec<(&'static str, Value)> {
        let mut fields = match &self.personal {
            None => vec![
                (FIELD_TIMESTAMP, Value::from(self.timestamp)),
                (FIELD_SALT, Value::from(self.salt.as_str())),
            ],
            Some(p) => vec![
                (FIELD_DATE_OF_BIRTH, Value::from(p.date_of_birth.as_str())),
                (FIELD_FIRST_NAME, Value::from(p.first_name.as_str())),
                (FIELD_LAST_NAME, Value::from(p.last_name.as_str())),
                (FIELD_TIMESTAMP, Value::from(self.timestamp)),
                (FIELD_TEST_ID, Value::from(p.test_id.as_str())),
                (FIELD_SALT, Value::from(self.salt.as_str())),
            ],
        };

        if include_hash {
            fields.push((FIELD_HASH, Value::from(self.hash())));
        }

        fields
    }

    /// SHA-256 hash of the record (lowercase hex).
    pub fn hash(&self) -> String {
        encoder::hash(self)
    }

    /// Compact JSON of the record including its hash.
    pub fn to_json(&self) -> EncodeResult<String> {
        encoder::to_json(self)
    }

    /// Base64 of `to_json`, as embedded in the app URL.
    pub fn to_encoded_payload(&self) -> EncodeResult<String> {
        encoder::to_encoded_payload(self)
    }

    /// Deep link / QR code URL for the app.
    pub fn app_url(&self) -> EncodeResult<String> {
        encoder::build_app_url(self)
    }
}

impl TryFrom<&Map<String, Value>> for TestRecord {
    type Error = ValidationError;

    fn try_from(fields: &Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

/// Anonymous if no personal field key is present, personal if all are.
fn detect_mode(fields: &Map<String, Value>) -> ValidationResult<TransferMode> {
    let present = PERSONAL_DATA_FIELDS
        .iter()
        .filter(|field| fields.contains_key(**field))
        .count();

    match present {
        0 => Ok(TransferMode::Anonymous),
        n if n == PERSONAL_DATA_FIELDS.len() => Ok(TransferMode::Personal),
        _ => Err(ValidationError::PartialPersonalData),
    }
}

/// A key holding `null` counts as missing.
fn required<'a>(fields: &'a Map<String, Value>, field: &'static str) -> ValidationResult<&'a Value> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn required_string(fields: &Map<String, Value>, field: &'static str) -> ValidationResult<String> {
    match required(fields, field)? {
        Value::String(s) if s.is_empty() => Err(ValidationError::MissingField(field)),
        Value::String(s) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidField {
            field,
            reason: "expected a string",
        }),
    }
}
