use serde::Serialize;
use thiserror::Error;

/// Why a single field of an inbound payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorReason {
    Missing,
    ExpectedString,
    ExpectedArray,
    ExpectedObject,
    ExpectedInteger,
    InvalidJson,
}

/// A single field-level validation failure.
///
/// `field` is the path to the offending value, e.g. `meals[0].foods[1].name`.
/// The empty string denotes the document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: FieldErrorReason,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: FieldErrorReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Every problem found in a payload. Serializes as a bare JSON array so it can
/// be returned verbatim in a response body.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
#[error("Payload failed validation with {} field error(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// A payload that could not be parsed as JSON at all.
    pub fn invalid_json() -> Self {
        Self(vec![FieldError::new("", FieldErrorReason::InvalidJson)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}
