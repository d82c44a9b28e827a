//! North American phone parsing.
//!
//! Numbers are parsed against the US region only. Line type is guessed from
//! a small area-code allow-list; there is no carrier lookup.

use alphaleads_core::{PhoneType, PhoneValidation};

const MOBILE_AREA_CODES: [&str; 6] = ["310", "323", "424", "747", "818", "213"];

/// Parses a NANP number into E.164 (`+1XXXXXXXXXX`).
///
/// Accepts ten digits, or eleven with a leading `1`, in any punctuation.
/// Area code and exchange must start with 2–9.
#[must_use]
pub fn parse_nanp(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_alphabetic) {
        return None;
    }
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let national = match digits.len() {
        10 if !trimmed.starts_with('+') => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return None,
    };

    let bytes = national.as_bytes();
    if !(b'2'..=b'9').contains(&bytes[0]) || !(b'2'..=b'9').contains(&bytes[3]) {
        return None;
    }
    Some(format!("+1{national}"))
}

#[must_use]
pub fn validate_phone(raw: &str) -> PhoneValidation {
    let Some(formatted) = parse_nanp(raw) else {
        return PhoneValidation::invalid();
    };
    let area_code = &formatted[2..5];
    let phone_type = if MOBILE_AREA_CODES.contains(&area_code) {
        PhoneType::Mobile
    } else {
        PhoneType::Landline
    };
    PhoneValidation {
        valid: true,
        formatted: Some(formatted),
        phone_type: Some(phone_type),
        carrier: Some("Unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_formats() {
        assert_eq!(parse_nanp("(512) 555-0100").as_deref(), Some("+15125550100"));
        assert_eq!(parse_nanp("+1 512.555.0100").as_deref(), Some("+15125550100"));
        assert_eq!(parse_nanp("1-512-555-0100").as_deref(), Some("+15125550100"));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert_eq!(parse_nanp("555-0100"), None);
        assert_eq!(parse_nanp("(112) 555-0100"), None, "area code starts with 1");
        assert_eq!(parse_nanp("(512) 155-0100"), None, "exchange starts with 1");
        assert_eq!(parse_nanp("+8801711223344"), None);
        assert_eq!(parse_nanp("+4420794609"), None, "foreign ten-digit with plus");
        assert_eq!(parse_nanp("call 512 555 0100"), None);
        assert_eq!(parse_nanp(""), None);
    }

    #[test]
    fn mobile_allow_list() {
        let v = validate_phone("(310) 555-0199");
        assert!(v.valid);
        assert_eq!(v.phone_type, Some(PhoneType::Mobile));
        assert_eq!(v.carrier.as_deref(), Some("Unknown"));

        let v = validate_phone("512-555-0100");
        assert_eq!(v.phone_type, Some(PhoneType::Landline));
        assert_eq!(v.formatted.as_deref(), Some("+15125550100"));
    }

    #[test]
    fn invalid_has_no_type_or_carrier() {
        let v = validate_phone("12");
        assert!(!v.valid);
        assert!(v.phone_type.is_none());
        assert!(v.carrier.is_none());
    }
}
