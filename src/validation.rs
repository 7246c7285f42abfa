use crate::error::{Error, Result};

/// Normalizes a short (8 digit) or long (16 digit) hex key ID.
///
/// An optional `0x`/`0X` prefix is dropped and the digits are uppercased,
/// which is the form listings print in their key ID field. Fingerprints
/// are rejected: every lookup scans listings by key ID, and a 40 digit
/// fingerprint never matches that field. Nothing is spawned for an ID
/// that fails here.
pub fn validate_keyid(keyid: &str) -> Result<String> {
    let invalid = |reason: String| Error::InvalidKeyId {
        keyid: keyid.to_string(),
        reason,
    };

    let digits = keyid
        .strip_prefix("0x")
        .or_else(|| keyid.strip_prefix("0X"))
        .unwrap_or(keyid);

    if !matches!(digits.len(), 8 | 16) {
        return Err(invalid(format!(
            "expected 8 or 16 hex digits, got {}",
            digits.len()
        )));
    }
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(invalid(format!("'{c}' is not a hex digit")));
    }

    Ok(digits.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_short_keyid() {
        assert_eq!(validate_keyid("DEADBEEF").unwrap(), "DEADBEEF");
        assert_eq!(validate_keyid("deadbeef").unwrap(), "DEADBEEF");
    }

    #[test]
    fn test_valid_long_keyid() {
        assert_eq!(
            validate_keyid("E6AA90171392B174").unwrap(),
            "E6AA90171392B174"
        );
    }

    #[test]
    fn test_valid_with_0x_prefix() {
        assert_eq!(validate_keyid("0xDEADBEEF").unwrap(), "DEADBEEF");
        assert_eq!(validate_keyid("0XDEADBEEF").unwrap(), "DEADBEEF");
        assert_eq!(
            validate_keyid("0xe6aa90171392b174").unwrap(),
            "E6AA90171392B174"
        );
    }

    #[test]
    fn test_invalid_empty() {
        let err = validate_keyid("").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
        let err = validate_keyid("0x").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
    }

    #[test]
    fn test_invalid_non_hex() {
        let err = validate_keyid("DEADBEEG").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
    }

    #[test]
    fn test_invalid_lengths() {
        let hex = "0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF";
        for len in (0..=hex.len()).filter(|l| *l != 8 && *l != 16) {
            let err = validate_keyid(&hex[..len]).unwrap_err();
            assert!(matches!(err, Error::InvalidKeyId { .. }), "length {len}");
        }
    }

    #[test]
    fn test_fingerprint_is_rejected() {
        let err = validate_keyid("2BABC6254E66E7B8450AC3E1E6AA90171392B174").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
    }

    #[test]
    fn test_invalid_contains_spaces() {
        let err = validate_keyid("DEAD BEEF").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
    }
}
