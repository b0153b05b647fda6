//! Declarative, stateless validation rules.
//!
//! Every aggregate and credential value object exposes its rule set through
//! [`Validate`]. Rules are evaluated with a [`Validator`] builder that collects
//! *all* field violations instead of stopping at the first one, so callers can
//! surface a complete list of field + message pairs.

use std::sync::LazyLock;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::tax_id;

static EMAIL_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .expect("EMAIL_RE is a valid regex pattern")
});

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Collected rule violations for one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether any violation concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Rule set attached to a domain value.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulating rule evaluator.
#[derive(Debug, Default)]
#[must_use = "call `finish` to obtain the validation result"]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Identifier must be present and non-nil.
    pub fn id(mut self, field: &str, id: &Uuid) -> Self {
        if id.is_nil() {
            self.push(field, format!("'{field}' must be a valid identifier."));
        }
        self
    }

    /// Character count (not bytes) must lie in `min..=max`.
    pub fn length(mut self, field: &str, value: &str, min: usize, max: usize) -> Self {
        let n = value.chars().count();
        if n < min || n > max {
            self.push(
                field,
                format!("'{field}' must be between {min} and {max} characters; {n} were given."),
            );
        }
        self
    }

    pub fn exact_length(mut self, field: &str, value: &str, len: usize) -> Self {
        let n = value.chars().count();
        if n != len {
            self.push(
                field,
                format!("'{field}' must be exactly {len} characters; {n} were given."),
            );
        }
        self
    }

    pub fn not_empty(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.push(field, format!("'{field}' must not be empty."));
        }
        self
    }

    pub fn email(mut self, field: &str, value: &str) -> Self {
        if !EMAIL_RE.is_match(value) {
            self.push(field, format!("'{field}' is not a valid e-mail address."));
        }
        self
    }

    /// Eleven-digit CPF with valid check digits.
    pub fn tax_id(mut self, field: &str, value: &str) -> Self {
        if !tax_id::is_valid_cpf(value) {
            self.push(field, format!("'{field}' is not a valid tax id."));
        }
        self
    }

    /// Inclusive range check.
    pub fn range<T>(mut self, field: &str, value: T, min: T, max: T) -> Self
    where
        T: PartialOrd + core::fmt::Display,
    {
        if value < min || value > max {
            self.push(
                field,
                format!("'{field}' must be between {min} and {max}; {value} was given."),
            );
        }
        self
    }

    /// Arbitrary predicate with a caller-provided message.
    pub fn check(mut self, field: &str, ok: bool, message: impl Into<String>) -> Self {
        if !ok {
            self.push(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                violations: self.violations,
            })
        }
    }
}

/// Stand-alone e-mail format predicate.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
