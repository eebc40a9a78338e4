//! Test results reported to the test result server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{positive_integer, TestRecord, ValidationError, ValidationResult};

/// Outcome of a quick test, encoded as the server's status code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "i64")]
pub enum TestResult {
    Negative,
    Positive,
    Invalid,
}

impl TestResult {
    /// All known results, in code order.
    pub const ALL: [TestResult; 3] = [TestResult::Negative, TestResult::Positive, TestResult::Invalid];

    /// Status code sent to the server.
    pub fn code(self) -> u8 {
        match self {
            TestResult::Negative => 6,
            TestResult::Positive => 7,
            TestResult::Invalid => 8,
        }
    }
}

impl From<TestResult> for u8 {
    fn from(result: TestResult) -> Self {
        result.code()
    }
}

impl TryFrom<i64> for TestResult {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            6 => Ok(TestResult::Negative),
            7 => Ok(TestResult::Positive),
            8 => Ok(TestResult::Invalid),
            other => Err(ValidationError::InvalidResultCode(other)),
        }
    }
}

impl TryFrom<u8> for TestResult {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        TestResult::try_from(i64::from(code))
    }
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TestResult::Negative => "negative",
            TestResult::Positive => "positive",
            TestResult::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// A single result to push to the server.
///
/// Field order matches the server's `{id, result, sc}` layout.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResultRecord {
    /// Hash of the quick test (the CWA test ID)
    id: String,
    /// Test outcome
    result: TestResult,
    /// Unix timestamp of when the result was obtained
    sc: i64,
}

impl ResultRecord {
    /// Create a result record, validating every field.
    pub fn new(id: impl Into<String>, result: TestResult, sc: i64) -> ValidationResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        if sc <= 0 {
            return Err(ValidationError::InvalidField {
                field: "sc",
                reason: "must be a positive unix timestamp integer",
            });
        }
        Ok(Self { id, result, sc })
    }

    /// Result for a test record issued earlier; its hash is the ID.
    pub fn for_test(record: &TestRecord, result: TestResult, sc: i64) -> ValidationResult<Self> {
        Self::new(record.hash(), result, sc)
    }

    /// Create a result record from a flat `{id, result, sc}` mapping.
    pub fn from_fields(fields: &Map<String, Value>) -> ValidationResult<Self> {
        for field in ["id", "result", "sc"] {
            if matches!(fields.get(field), None | Some(Value::Null)) {
                return Err(ValidationError::MissingField(field));
            }
        }

        let id = match &fields["id"] {
            Value::String(s) => s.clone(),
            _ => {
                return Err(ValidationError::InvalidField {
                    field: "id",
                    reason: "expected a string",
                })
            }
        };

        let result = match fields["result"].as_i64() {
            Some(code) => TestResult::try_from(code)?,
            None => {
                return Err(ValidationError::InvalidField {
                    field: "result",
                    reason: "expected an integer status code",
                })
            }
        };

        let sc = positive_integer(&fields["sc"]).ok_or(ValidationError::InvalidField {
            field: "sc",
            reason: "must be a positive unix timestamp integer",
        })?;

        Self::new(id, result, sc)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn result(&self) -> TestResult {
        self.result
    }

    pub fn sc(&self) -> i64 {
        self.sc
    }
}
