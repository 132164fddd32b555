//! Common normalizer functions for filter values

use chrono::NaiveDate;
use serde_json::Number;

use crate::errors::ExplorerError;
use crate::registry::NumericInput;

/// Maximum length of a text-match value.
pub const MAX_TEXT_LENGTH: usize = 255;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Restricts a numeric bound to the characters its input mode allows.
///
/// Partial input such as a lone `-` collapses to an empty string, which callers treat as
/// "no bound". Applying the function twice yields the same string.
///
/// ```
/// use batchscope::filters::restrict_numeric_input;
/// use batchscope::registry::NumericInput;
///
/// assert_eq!(restrict_numeric_input("$1,500", NumericInput::Integer), "1500");
/// assert_eq!(restrict_numeric_input("2.5 acres", NumericInput::Decimal), "2.5");
/// assert_eq!(restrict_numeric_input("1.2.3", NumericInput::Decimal), "1.23");
/// ```
pub fn restrict_numeric_input(raw: &str, mode: NumericInput) -> String {
    let mut restricted = String::with_capacity(raw.len());
    let mut seen_point = false;
    for ch in raw.chars() {
        match ch {
            '0'..='9' => restricted.push(ch),
            '.' if mode == NumericInput::Decimal && !seen_point => {
                seen_point = true;
                restricted.push(ch);
            }
            _ => {}
        }
    }
    restricted
}

/// Truncates a text-match value to [`MAX_TEXT_LENGTH`] characters.
pub fn clamp_text(raw: &str) -> String {
    raw.chars().take(MAX_TEXT_LENGTH).collect()
}

/// Validates an ISO `YYYY-MM-DD` date bound.
///
/// Blank input means "no bound" and yields `Ok(None)`; the stored value is the trimmed input,
/// never reformatted.
pub fn parse_date_bound(raw: &str, category: &str, operator: &str) -> Result<Option<String>, ExplorerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map(|_| Some(trimmed.to_string()))
        .map_err(|err| ExplorerError::InvalidValue {
            category: category.to_string(),
            operator: operator.to_string(),
            message: format!("expected YYYY-MM-DD, got '{}' ({})", trimmed, err),
        })
}

/// Coerces a stored numeric bound into a JSON number.
///
/// Digit-only strings become integers so `"2000"` serializes as `2000`, not `2000.0`.
/// Returns `None` for text that is not a finite number.
///
/// ```
/// use batchscope::filters::coerce_numeric;
///
/// assert_eq!(coerce_numeric("2000").unwrap().as_u64(), Some(2000));
/// assert_eq!(coerce_numeric("007").unwrap().as_u64(), Some(7));
/// assert_eq!(coerce_numeric("0.5").unwrap().as_f64(), Some(0.5));
/// assert!(coerce_numeric(".").is_none());
/// ```
pub fn coerce_numeric(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit())
        && let Ok(value) = trimmed.parse::<u64>()
    {
        return Some(Number::from(value));
    }
    number_from_f64(trimmed.parse::<f64>().ok()?)
}

/// Converts a float to a JSON number, using an integer representation for whole values.
pub fn number_from_f64(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// Parses a boolean flag written on the command line or in a config file.
pub fn parse_flag(raw: &str, category: &str) -> Result<bool, ExplorerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(ExplorerError::InvalidValue {
            category: category.to_string(),
            operator: "equals".to_string(),
            message: format!("Invalid boolean value: {}", other),
        }),
    }
}

/// Splits a multi-select value list on `|`, dropping empty segments.
///
/// Commas are part of some codes (`Daylight, Partial`), so they never separate values.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_input_keeps_digits_only() {
        assert_eq!(restrict_numeric_input("-", NumericInput::Integer), "");
        assert_eq!(restrict_numeric_input("12ab3", NumericInput::Integer), "123");
        assert_eq!(restrict_numeric_input("1.5", NumericInput::Integer), "15");
    }

    #[test]
    fn decimal_input_keeps_first_point() {
        assert_eq!(restrict_numeric_input(".5", NumericInput::Decimal), ".5");
        assert_eq!(restrict_numeric_input("1..2", NumericInput::Decimal), "1.2");
    }

    #[test]
    fn restriction_is_idempotent() {
        for raw in ["x1y2", "3.1.4", "", "--", "9,999"] {
            for mode in [NumericInput::Integer, NumericInput::Decimal] {
                let once = restrict_numeric_input(raw, mode);
                assert_eq!(restrict_numeric_input(&once, mode), once);
            }
        }
    }

    #[test]
    fn clamp_text_counts_characters() {
        let long = "é".repeat(300);
        assert_eq!(clamp_text(&long).chars().count(), MAX_TEXT_LENGTH);
        assert_eq!(clamp_text("short"), "short");
    }

    #[test]
    fn date_bounds() {
        assert_eq!(
            parse_date_bound(" 2024-02-29 ", "soldDate", "minDate").unwrap(),
            Some("2024-02-29".to_string())
        );
        assert_eq!(parse_date_bound("", "soldDate", "minDate").unwrap(), None);
        assert!(parse_date_bound("2023-02-29", "soldDate", "minDate").is_err());
        assert!(parse_date_bound("02/01/2024", "soldDate", "minDate").is_err());
    }

    #[test]
    fn coerce_numeric_handles_edge_cases() {
        assert_eq!(coerce_numeric("1.0").unwrap().as_i64(), Some(1));
        assert_eq!(coerce_numeric("99999999999999999999").unwrap().as_f64(), Some(1e20));
        assert!(coerce_numeric("").is_none());
        assert!(coerce_numeric("1.2.3").is_none());
        assert!(number_from_f64(f64::NAN).is_none());
        assert_eq!(number_from_f64(3.0).unwrap().as_i64(), Some(3));
    }

    #[test]
    fn flags_and_lists() {
        assert!(parse_flag("Yes", "ownerOccupied").unwrap());
        assert!(!parse_flag("false", "ownerOccupied").unwrap());
        assert!(parse_flag("maybe", "ownerOccupied").is_err());
        assert_eq!(split_list("Pool & Spa| Heated Pool||"), vec!["Pool & Spa", "Heated Pool"]);
        assert_eq!(split_list("Daylight, Partial|Daylight, Full"), vec!["Daylight, Partial", "Daylight, Full"]);
    }
}
