use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by the criteria builder and the API client.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Required request fields were missing or malformed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The free-form additional criteria could not be parsed as a JSON object.
    #[error("Invalid JSON format in additional criteria: {message}")]
    AdditionalCriteria { message: String },

    /// The category is not part of the group's catalog.
    #[error("unknown filter category '{group}.{category}'")]
    UnknownCategory { group: String, category: String },

    /// The operator does not apply to the category's filter kind.
    #[error("operator '{operator}' is not supported for {kind} category '{category}'")]
    UnsupportedOperator {
        category: String,
        operator: String,
        kind: &'static str,
    },

    /// The raw value has the wrong shape or format for the operator.
    #[error("invalid value for '{category}' {operator}: {message}")]
    InvalidValue {
        category: String,
        operator: String,
        message: String,
    },

    /// Invalid input supplied to a builder or parser.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Transport-level failure (connection, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {message}")]
    UnexpectedResponse { message: Cow<'static, str> },

    /// A newer request was issued on the same slot before this one completed.
    #[error("request superseded by a newer submission")]
    Superseded,
}

impl ExplorerError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised before any network traffic happened.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::AdditionalCriteria { .. }
                | Self::UnknownCategory { .. }
                | Self::UnsupportedOperator { .. }
                | Self::InvalidValue { .. }
                | Self::InvalidRequest { .. }
        )
    }
}

/// Collection of validation issues encountered while preparing a request.
#[derive(Debug, Error)]
#[error("{}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|issue| issue.message.as_str()).collect::<Vec<_>>().join("; ")
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Field names that failed, in reporting order.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_joins_messages() {
        let err = ValidationError::new([
            ValidationIssue::new("city", "required", "city is required"),
            ValidationIssue::new("state", "required", "state is required"),
        ]);
        assert_eq!(err.to_string(), "city is required; state is required");
        assert_eq!(err.fields(), vec!["city", "state"]);
    }

    #[test]
    fn client_side_errors_are_flagged() {
        let err = ExplorerError::AdditionalCriteria {
            message: "EOF".to_string(),
        };
        assert!(err.is_client_side());
        assert!(!ExplorerError::Superseded.is_client_side());
        assert!(
            !ExplorerError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_client_side()
        );
    }
}
