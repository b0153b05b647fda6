//! `backoffice-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the entity contract, the domain error model and the
//! declarative validation rules shared by every aggregate.

pub mod entity;
pub mod error;
pub mod id;
pub mod tax_id;
pub mod validation;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{CustomerId, EmployeeId, ProductId};
pub use validation::{FieldViolation, Validate, ValidationErrors, Validator};
