//! Salt generation and validation.

use rand::rngs::OsRng;
use rand::RngCore;

use super::{EncodeError, EncodeResult};

/// Salt entropy in bytes (128 bits).
pub const SALT_BYTES: usize = 16;

/// Salt length in hex characters.
pub const SALT_LENGTH: usize = SALT_BYTES * 2;

/// Generate a salt from the operating system's secure random source.
///
/// Returns 32 uppercase hex characters. Fails if the OS cannot provide
/// randomness instead of falling back to a weaker generator.
pub fn generate_salt() -> EncodeResult<String> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| EncodeError::RandomSource(e.to_string()))?;

    Ok(hex::encode_upper(bytes))
}

/// Check a salt against `^[A-F0-9]{32}$`.
pub fn is_valid_salt(salt: &str) -> bool {
    salt.len() == SALT_LENGTH && salt.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_salt_format() {
        let salt = generate_salt().unwrap();
        assert_eq!(salt.len(), 32);
        assert!(is_valid_salt(&salt));
    }

    #[test]
    fn test_is_valid_salt() {
        assert!(is_valid_salt("759F8FF3554F0E1BBF6EFF8DE298D9E9"));
        assert!(is_valid_salt("00000000000000000000000000000000"));

        assert!(!is_valid_salt(""));
        assert!(!is_valid_salt("759f8ff3554f0e1bbf6eff8de298d9e9")); // lowercase
        assert!(!is_valid_salt("759F8FF3554F0E1BBF6EFF8DE298D9E")); // 31 chars
        assert!(!is_valid_salt("759F8FF3554F0E1BBF6EFF8DE298D9E9A")); // 33 chars
        assert!(!is_valid_salt("759F8FF3554F0E1BBF6EFF8DE298D9G9"));
        assert!(!is_valid_salt("759F8FF3554F0E1BBF6EFF8DE298D9É"));
    }
}
