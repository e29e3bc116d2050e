//! Request boundary: parse request documents and reject malformed shapes
//! before anything reaches a scorer.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{FieldViolation, Result, RiskError};

/// Shape checks a request performs on itself beyond what serde enforces.
pub trait Validate {
    /// Push every violation found under `prefix` (empty for the document root).
    fn validate(&self, prefix: &str, out: &mut Vec<FieldViolation>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Yaml,
}

impl RequestFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RequestFormat::Json,
            _ => RequestFormat::Yaml,
        }
    }
}

/// Join a field name onto a parent path.
pub fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Index into a list field.
pub fn indexed(prefix: &str, name: &str, index: usize) -> String {
    format!("{}[{}]", field(prefix, name), index)
}

pub fn check_non_negative(out: &mut Vec<FieldViolation>, field: String, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        out.push(FieldViolation::new(field, "must be a finite, non-negative number"));
    }
}

pub fn check_positive(out: &mut Vec<FieldViolation>, field: String, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        out.push(FieldViolation::new(field, "must be a finite, positive number"));
    }
}

pub fn check_unit_interval(out: &mut Vec<FieldViolation>, field: String, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        out.push(FieldViolation::new(field, "must be between 0 and 1"));
    }
}

/// Parse and validate a request document.
pub fn parse_request<T>(content: &str, format: RequestFormat) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let request: T = match format {
        RequestFormat::Json => serde_json::from_str(content).map_err(|e| RiskError::Parse {
            message: e.to_string(),
        })?,
        RequestFormat::Yaml => serde_saphyr::from_str(content).map_err(|e| RiskError::Parse {
            message: e.to_string(),
        })?,
    };

    let mut violations = Vec::new();
    request.validate("", &mut violations);
    if !violations.is_empty() {
        debug!(count = violations.len(), "request rejected");
        return Err(RiskError::Validation { violations });
    }
    Ok(request)
}

/// Read, parse and validate a request file.
pub fn load_request<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), "loaded request");
    parse_request(&content, RequestFormat::from_path(path))
}
