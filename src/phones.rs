// Phone list validation
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Mainland mobile numbers: 11 digits, leading 1, second digit 3-9.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").unwrap());

pub fn is_valid_phone(s: &str) -> bool {
    PHONE_RE.is_match(s)
}

/// Splits raw user input into a validated phone list. Invalid lines are
/// dropped with a warning; the caller decides what an empty result means.
pub fn validate_phone_list(input: &str) -> Vec<String> {
    let mut valid = Vec::new();
    for line in input.lines() {
        let phone = line.trim();
        if phone.is_empty() {
            continue;
        }
        if is_valid_phone(phone) {
            valid.push(phone.to_string());
        } else {
            warn!("dropping invalid phone number: {}", phone);
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_valid_prefixes() {
        for second in '3'..='9' {
            let phone = format!("1{}912345678", second);
            assert!(is_valid_phone(&phone), "{phone} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_numbers() {
        for phone in [
            "12912345678", // second digit 2
            "10912345678", // second digit 0
            "1391234567",  // 10 digits
            "139123456789", // 12 digits
            "2391234567a",
            "a3912345678",
            "13912 45678",
            "",
        ] {
            assert!(!is_valid_phone(phone), "{phone:?} should be rejected");
        }
    }

    #[test]
    fn filters_and_keeps_input_order() {
        let list = validate_phone_list("13800138000\ninvalid\n13900139000");
        assert_eq!(list, vec!["13800138000", "13900139000"]);
    }

    #[test]
    fn trims_surrounding_whitespace_and_blank_lines() {
        let list = validate_phone_list("  13800138000 \n\n\t13900139000\n");
        assert_eq!(list, vec!["13800138000", "13900139000"]);
    }

    #[test]
    fn all_invalid_yields_empty_list() {
        assert!(validate_phone_list("hello\nworld\n+8613800138000").is_empty());
    }
}
