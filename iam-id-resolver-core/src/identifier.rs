//! Syntactic validation of candidate identifiers.

/// Alphabet of the 17 characters that follow the unique ID type prefix.
pub const BASE32_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Unique ID prefix of IAM roles
pub const ROLE_PREFIX: &str = "AROA";

/// Unique ID prefix of IAM users
pub const USER_PREFIX: &str = "AIDA";

/// Length of a role or user unique ID
pub const UNIQUE_ID_LEN: usize = 21;

/// Length of an AWS account ID
pub const ACCOUNT_ID_LEN: usize = 12;

/// Check whether `candidate` looks like an identifier worth probing.
///
/// With `resolve_accounts`, a 12-character string is valid iff it is all
/// decimal digits. Otherwise the candidate must be a 21-character role or
/// user unique ID: `AROA`/`AIDA` followed by 17 base-32 characters.
pub fn validate_id(candidate: &str, resolve_accounts: bool) -> bool {
    if resolve_accounts && candidate.len() == ACCOUNT_ID_LEN {
        return candidate.bytes().all(|b| b.is_ascii_digit());
    }

    if candidate.len() != UNIQUE_ID_LEN {
        return false;
    }

    // Bytes, not chars: any non-ASCII input fails the alphabet check anyway.
    let (prefix, rest) = candidate.as_bytes().split_at(ROLE_PREFIX.len());
    (prefix == ROLE_PREFIX.as_bytes() || prefix == USER_PREFIX.as_bytes())
        && rest.iter().all(|b| BASE32_ALPHABET.as_bytes().contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_and_user_ids() {
        assert!(validate_id("AROA234567ABCDEFGHJKM", false));
        assert!(validate_id("AIDA234567ABCDEFGHJKM", false));
        assert!(validate_id("AROAZZZZZZZZZZZZZZZZZ", true));
    }

    #[test]
    fn test_rejects_other_prefixes_and_alphabet() {
        // access key prefix
        assert!(!validate_id("AKIA1234567890ABCDE12", false));
        // 0, 1, 8, 9 are outside the alphabet
        assert!(!validate_id("AROA1234567890ABCDE10", false));
        assert!(!validate_id("AROA1234567890ABCDE18", false));
        assert!(!validate_id("aroa1234567890abcde12", false));
        assert!(!validate_id("not-an-id", false));
        assert!(!validate_id("", true));
    }

    #[test]
    fn test_account_ids_only_in_account_mode() {
        assert!(validate_id("123456789012", true));
        assert!(!validate_id("123456789012", false));
        assert!(!validate_id("12345678901a", true));
        assert!(!validate_id("1234567890123", true));
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        // 21 bytes, but the prefix boundary falls inside a character
        assert!(!validate_id("AR\u{e9}A1234567890ABCDE1", false));
        assert!(!validate_id("\u{1F600}\u{1F600}\u{1F600}\u{1F600}AAAAA", false));
    }

    fn base32_tail() -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::sample::select(BASE32_ALPHABET.as_bytes().to_vec()), 17)
            .prop_map(|bytes| String::from_utf8(bytes).unwrap())
    }

    proptest! {
        #[test]
        fn prop_wrong_length_is_invalid(s in "\\PC{0,40}", accounts in any::<bool>()) {
            prop_assume!(s.len() != UNIQUE_ID_LEN);
            prop_assume!(!(accounts && s.len() == ACCOUNT_ID_LEN));
            prop_assert!(!validate_id(&s, accounts));
        }

        #[test]
        fn prop_prefixed_base32_is_valid(
            prefix in prop_oneof![Just(ROLE_PREFIX), Just(USER_PREFIX)],
            tail in base32_tail(),
            accounts in any::<bool>(),
        ) {
            let id = format!("{prefix}{tail}");
            prop_assert!(validate_id(&id, accounts));
        }

        #[test]
        fn prop_other_21_char_strings_match_rule(s in "[A-Z0-9]{21}") {
            let expected = (s.starts_with(ROLE_PREFIX) || s.starts_with(USER_PREFIX))
                && s[4..].chars().all(|c| BASE32_ALPHABET.contains(c));
            prop_assert_eq!(validate_id(&s, false), expected);
        }

        #[test]
        fn prop_twelve_digits_valid_in_account_mode(s in "[0-9]{12}") {
            prop_assert!(validate_id(&s, true));
            prop_assert!(!validate_id(&s, false));
        }
    }
}
