//! Domain error model.

use thiserror::Error;

/// Parsing failures for domain values. Rule-set violations are reported as
/// [`crate::ValidationErrors`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A free-text value did not map onto a known enumeration member.
    #[error("unrecognized {kind}: {value}")]
    Unrecognized { kind: &'static str, value: String },
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unrecognized(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unrecognized {
            kind,
            value: value.into(),
        }
    }
}
