use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::errors::{ValidationError, ValidationIssue};
use crate::registry::codes::US_STATES;

fn zip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern is valid"))
}

/// Returns `true` for a two-letter US state or territory code, in any case.
pub fn is_valid_state_code(value: &str) -> bool {
    let upper = value.trim().to_ascii_uppercase();
    US_STATES.contains(&upper.as_str()) || matches!(upper.as_str(), "DC" | "PR" | "VI" | "GU")
}

/// Returns `true` for a 5-digit or ZIP+4 code.
pub fn is_valid_zip(value: &str) -> bool {
    zip_pattern().is_match(value.trim())
}

/// Returns `true` if the provided string parses as an absolute http(s) URL.
pub fn is_valid_base_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Fails with one issue per blank field, in the order given.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ValidationError> {
    let issues: Vec<ValidationIssue> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| ValidationIssue::new(*field, "required", format!("{} is required", field)))
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes() {
        assert!(is_valid_state_code("az"));
        assert!(is_valid_state_code("DC"));
        assert!(!is_valid_state_code("Arizona"));
    }

    #[test]
    fn zip_codes() {
        assert!(is_valid_zip("85004"));
        assert!(is_valid_zip("85004-1234"));
        assert!(!is_valid_zip("8500"));
    }

    #[test]
    fn base_urls() {
        assert!(is_valid_base_url("https://api.batchdata.com/api/v1"));
        assert!(!is_valid_base_url("ftp://example.com"));
        assert!(!is_valid_base_url("not-a-url"));
    }

    #[test]
    fn required_fields_report_each_blank() {
        let err = require_fields(&[("street", ""), ("city", "Phoenix"), ("state", "  ")]).unwrap_err();
        assert_eq!(err.fields(), vec!["street", "state"]);
        assert_eq!(err.to_string(), "street is required; state is required");
        assert!(require_fields(&[("city", "Phoenix")]).is_ok());
    }
}
