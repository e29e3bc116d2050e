use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One offending field in a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Live data source is not configured for {what}; supply the data in the request or use synthetic mode")]
    NotConfigured { what: &'static str },
}

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Request validation failed: {}", join_violations(.violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("Request parse error: {message}")]
    Parse { message: String },

    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = RiskError::Validation {
            violations: vec![
                FieldViolation::new("nearbySources[0].distance", "must be non-negative"),
                FieldViolation::new("radius", "must be positive"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Request validation failed: nearbySources[0].distance: must be non-negative; radius: must be positive"
        );
    }
}
