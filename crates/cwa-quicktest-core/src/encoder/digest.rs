//! Integrity hash over the record's canonical field values.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::TestRecord;

/// Separator between field values in the hash input.
pub const HASH_SEPARATOR: &str = "#";

/// Build the hash input: the record's field values in canonical order,
/// joined by `#`.
pub fn hash_input(record: &TestRecord) -> String {
    record
        .fields(false)
        .iter()
        .map(|(_, value)| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(HASH_SEPARATOR)
}

/// SHA-256 hash of the record as 64 lowercase hex characters.
pub fn hash(record: &TestRecord) -> String {
    hash_data(hash_input(record).as_bytes())
}

/// Compute SHA-256 hash of data.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}
