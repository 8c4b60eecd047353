//! Decoding of URL-encoded policy documents.
//!
//! The identity service returns trust and inline policy documents
//! percent-encoded. Decoding follows path-unescape rules: every `%XX` escape
//! is decoded, `+` stays a literal plus, and a `%` not followed by two hex
//! digits is an error rather than being passed through.

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Error decoding a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` was not followed by two hexadecimal digits.
    #[error("invalid escape {escape:?} at byte {offset}")]
    InvalidEscape { offset: usize, escape: String },

    /// The decoded bytes are not valid UTF-8.
    #[error("decoded document is not valid UTF-8")]
    InvalidUtf8,
}

/// Decodes a percent-encoded policy document into its raw JSON form.
pub fn decode_policy_document(encoded: &str) -> Result<String, DecodeError> {
    validate_escapes(encoded)?;

    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

fn validate_escapes(encoded: &str) -> Result<(), DecodeError> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let digits = bytes.get(i + 1..i + 3);
            let valid = digits.is_some_and(|d| d.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(DecodeError::InvalidEscape {
                    offset: i,
                    escape: String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    #[test_case("%7B%22a%22%3A1%7D", r#"{"a":1}"#; "encoded json")]
    #[test_case(r#"{"a":1}"#, r#"{"a":1}"#; "already raw")]
    #[test_case("a+b", "a+b"; "plus is literal")]
    #[test_case("%2b%2B", "++"; "mixed case hex")]
    #[test_case("", ""; "empty")]
    #[test_case("%E2%9C%93", "✓"; "multibyte utf8")]
    fn decodes(input: &str, expected: &str) {
        assert_eq!(decode_policy_document(input).unwrap(), expected);
    }

    #[test_case("%zz", 0, "%zz"; "non hex digits")]
    #[test_case("abc%4", 3, "%4"; "truncated escape")]
    #[test_case("%", 0, "%"; "lone percent")]
    #[test_case("%41%G1", 3, "%G1"; "second escape bad")]
    fn rejects_malformed_escapes(input: &str, offset: usize, escape: &str) {
        assert_eq!(
            decode_policy_document(input),
            Err(DecodeError::InvalidEscape {
                offset,
                escape: escape.to_string(),
            })
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(decode_policy_document("%FF%FE"), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn decodes_realistic_trust_policy() {
        let encoded = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%7B%22Effect%22%3A%22Allow%22%2C%22Principal%22%3A%7B%22Service%22%3A%22ec2.amazonaws.com%22%7D%2C%22Action%22%3A%22sts%3AAssumeRole%22%7D%5D%7D";
        let decoded = decode_policy_document(encoded).unwrap();
        assert_eq!(
            decoded,
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"Service":"ec2.amazonaws.com"},"Action":"sts:AssumeRole"}]}"#
        );
    }

    proptest! {
        /// Property: text without `%` decodes to itself.
        #[test]
        fn prop_text_without_escapes_is_unchanged(s in "[^%]*") {
            prop_assert_eq!(decode_policy_document(&s).unwrap(), s);
        }

        /// Property: fully escaping every byte round-trips.
        #[test]
        fn prop_full_escape_decodes(s in "\\PC*") {
            let encoded: String = s.bytes().map(|b| format!("%{b:02X}")).collect();
            prop_assert_eq!(decode_policy_document(&encoded).unwrap(), s);
        }
    }
}
