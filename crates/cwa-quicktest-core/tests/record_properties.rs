//! Property tests for record validation, salts and payload round trips.

use std::collections::HashSet;

use cwa_quicktest_core::encoder::{decode_payload, generate_salt, is_valid_salt};
use cwa_quicktest_core::models::{PersonalData, TestRecord, ValidationError};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn prop_valid_salts_accepted(salt in "[A-F0-9]{32}", timestamp in 1i64..=i64::MAX) {
        prop_assert!(TestRecord::anonymous(timestamp, salt).is_ok());
    }

    #[test]
    fn prop_lowercase_salts_rejected(salt in "[a-f0-9]{32}") {
        prop_assume!(salt.chars().any(|c| c.is_ascii_lowercase()));
        prop_assert_eq!(TestRecord::anonymous(1, salt).unwrap_err(), ValidationError::InvalidSalt);
    }

    #[test]
    fn prop_wrong_length_salts_rejected(salt in "[A-F0-9]{0,64}") {
        prop_assume!(salt.len() != 32);
        prop_assert!(!is_valid_salt(&salt));
    }

    #[test]
    fn prop_non_positive_timestamps_rejected(timestamp in i64::MIN..=0) {
        prop_assert_eq!(
            TestRecord::anonymous(timestamp, "759F8FF3554F0E1BBF6EFF8DE298D9E9").unwrap_err(),
            ValidationError::InvalidTimestamp
        );
    }

    #[test]
    fn prop_hash_is_deterministic(salt in "[A-F0-9]{32}", timestamp in 1i64..=i64::MAX) {
        let a = TestRecord::anonymous(timestamp, salt.clone()).unwrap();
        let b = TestRecord::anonymous(timestamp, salt).unwrap();
        prop_assert_eq!(a.hash(), b.hash());
        prop_assert_eq!(a.hash().len(), 64);
    }

    #[test]
    fn prop_personal_roundtrip(
        first_name in "\\PC{1,20}",
        last_name in "\\PC{1,20}",
        date_of_birth in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        test_id in "[a-f0-9-]{1,36}",
        salt in "[A-F0-9]{32}",
        timestamp in 1i64..=i64::MAX,
    ) {
        let record = TestRecord::personal(
            PersonalData::new(first_name.clone(), last_name.clone(), date_of_birth.clone(), test_id.clone()),
            timestamp,
            salt.clone(),
        ).unwrap();

        let mut decoded = decode_payload(&record.to_encoded_payload().unwrap()).unwrap();
        prop_assert_eq!(decoded.remove("hash"), Some(json!(record.hash())));

        let expected = json!({
            "fn": first_name,
            "ln": last_name,
            "dob": date_of_birth,
            "testid": test_id,
            "timestamp": timestamp,
            "salt": salt,
        });
        prop_assert_eq!(serde_json::Value::Object(decoded), expected);
    }
}

#[test]
fn test_generated_salts_are_valid_and_unique() {
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let salt = generate_salt().unwrap();
        assert!(is_valid_salt(&salt), "generated salt {} is malformed", salt);
        assert!(seen.insert(salt), "generated salt repeated");
    }
}
