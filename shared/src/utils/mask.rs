//! Identifier masking for log output

/// Number of leading characters left visible
const VISIBLE_PREFIX: usize = 2;

/// Number of trailing characters left visible
const VISIBLE_SUFFIX: usize = 4;

/// Shortest identifier that is partially revealed
pub const MIN_MASKABLE_LENGTH: usize = 10;

/// Token replacing the hidden middle section
pub const MASK_TOKEN: &str = "****";

/// Mask an identifier for logging (e.g., 98****3210)
///
/// Identifiers shorter than [`MIN_MASKABLE_LENGTH`] are fully replaced by the
/// mask token, so the raw value never reaches a log line.
pub fn mask_identifier(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    if chars.len() < MIN_MASKABLE_LENGTH {
        return MASK_TOKEN.to_string();
    }

    let prefix: String = chars[..VISIBLE_PREFIX].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{}{}{}", prefix, MASK_TOKEN, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_ten_digit_number() {
        assert_eq!(mask_identifier("9876543210"), "98****3210");
    }

    #[test]
    fn test_mask_international_number() {
        assert_eq!(mask_identifier("+919876543210"), "+9****3210");
    }

    #[test]
    fn test_short_identifiers_are_fully_hidden() {
        for input in ["", "1", "12345", "123456789"] {
            assert_eq!(mask_identifier(input), MASK_TOKEN, "input: {:?}", input);
        }
    }

    #[test]
    fn test_never_returns_raw_input() {
        for input in ["9876543210", "98765432101234", "abcdefghijkl"] {
            assert_ne!(mask_identifier(input), input);
        }
    }

    #[test]
    fn test_multibyte_characters_do_not_panic() {
        assert_eq!(mask_identifier("ab€€€€€€cdef"), "ab****cdef");
    }
}
